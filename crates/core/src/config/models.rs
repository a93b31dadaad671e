//! Command-line overrides layered on top of the file configuration.

use pl_protocol::config_models::PipelineConfig;

/// Values given on the command line. `None` keeps the file/default value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub inspectors: Option<usize>,
    pub sharpeners: Option<usize>,
    pub controllers: Option<usize>,
    pub initial_inventory: Option<u64>,
    pub min_delay_ms: Option<u64>,
    pub max_delay_ms: Option<u64>,
    pub seed: Option<u64>,
}

impl ConfigOverrides {
    /// Apply every set override to `config`.
    pub fn apply(self, mut config: PipelineConfig) -> PipelineConfig {
        if let Some(n) = self.inspectors {
            config.workers.inspection = n;
        }
        if let Some(n) = self.sharpeners {
            config.workers.sharpening = n;
        }
        if let Some(n) = self.controllers {
            config.workers.quality_control = n;
        }
        if let Some(n) = self.initial_inventory {
            config.initial_inventory = n;
        }
        if let Some(ms) = self.min_delay_ms {
            config.delay.min_ms = ms;
        }
        if let Some(ms) = self.max_delay_ms {
            config.delay.max_ms = ms;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        config
    }
}
