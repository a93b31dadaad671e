//! Event delivery from workers and the supervisor to a front end.

use pl_protocol::ipc::Event;
use tokio::sync::mpsc::UnboundedSender;

/// Where pipeline events go.
///
/// Sending never blocks a worker. A closed or absent receiver silently drops
/// events; they are observability only.
#[derive(Debug, Clone, Default)]
pub struct EventSink {
    tx: Option<UnboundedSender<Event>>,
}

impl EventSink {
    /// A sink that discards everything.
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    pub fn new(tx: UnboundedSender<Event>) -> Self {
        Self { tx: Some(tx) }
    }

    pub fn emit(&self, event: Event) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(event);
        }
    }
}

impl From<UnboundedSender<Event>> for EventSink {
    fn from(tx: UnboundedSender<Event>) -> Self {
        Self::new(tx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pl_protocol::stage_models::Stage;
    use pl_protocol::worker_models::WorkerId;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn test_emit_delivers_event() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let sink = EventSink::from(tx);
        let worker = WorkerId::new(Stage::Inspection, 0);

        sink.emit(Event::StageEmpty { worker });

        assert_eq!(rx.recv().await, Some(Event::StageEmpty { worker }));
    }

    #[tokio::test]
    async fn test_emit_after_receiver_dropped_is_silent() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let sink = EventSink::new(tx);

        sink.emit(Event::StageEmpty {
            worker: WorkerId::new(Stage::Sharpening, 1),
        });
        EventSink::disabled().emit(Event::StageEmpty {
            worker: WorkerId::new(Stage::Sharpening, 1),
        });
    }
}
