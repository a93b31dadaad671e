//! Inspection outcome sources.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Decides whether an inspected item passes.
pub trait Coin: Send {
    fn flip(&mut self) -> bool;
}

/// A fair coin: each flip passes with probability 0.5, independently.
#[derive(Debug)]
pub struct RandomCoin {
    rng: StdRng,
}

impl RandomCoin {
    pub fn new(rng: StdRng) -> Self {
        Self { rng }
    }
}

impl Coin for RandomCoin {
    fn flip(&mut self) -> bool {
        self.rng.random_bool(0.5)
    }
}

/// A coin that always lands the same way.
#[derive(Debug, Clone, Copy)]
pub struct FixedCoin(pub bool);

impl Coin for FixedCoin {
    fn flip(&mut self) -> bool {
        self.0
    }
}

/// How inspection workers get their coins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CoinPolicy {
    /// One independent fair coin per worker.
    #[default]
    Fair,
    /// Every flip returns the given outcome.
    Fixed(bool),
}

impl CoinPolicy {
    /// Build a coin, drawing its seed from `rng` when it needs one.
    pub fn make(self, rng: &mut StdRng) -> Box<dyn Coin> {
        match self {
            CoinPolicy::Fair => Box::new(RandomCoin::new(StdRng::from_rng(rng))),
            CoinPolicy::Fixed(outcome) => Box::new(FixedCoin(outcome)),
        }
    }
}
