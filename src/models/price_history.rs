use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Maximum number of observations retained per item.
pub const DEFAULT_RETENTION_CAP: usize = 30;

/// A single price reading. Immutable once recorded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriceObservation {
    pub price: Decimal,
    pub observed_at: DateTime<Utc>,
}

impl PriceObservation {
    pub fn new(price: Decimal) -> Self {
        Self::at(price, Utc::now())
    }

    pub fn at(price: Decimal, observed_at: DateTime<Utc>) -> Self {
        Self { price, observed_at }
    }
}

/// Append-bounded ledger of price observations, oldest first.
///
/// Inserting past the cap evicts the oldest entries (FIFO), so the cap
/// invariant and the time ordering hold at all times. A history is seeded
/// with the registration-time observation and is never empty afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriceHistory {
    observations: VecDeque<PriceObservation>,
    cap: usize,
}

impl PriceHistory {
    pub fn new() -> Self {
        Self::with_cap(DEFAULT_RETENTION_CAP)
    }

    pub fn with_cap(cap: usize) -> Self {
        Self {
            observations: VecDeque::new(),
            cap: cap.max(1),
        }
    }

    pub fn seeded(seed: PriceObservation, cap: usize) -> Self {
        let mut history = Self::with_cap(cap);
        history.record(seed);
        history
    }

    /// Rebuilds a history from rows already ordered by time ascending.
    pub fn from_observations(observations: Vec<PriceObservation>, cap: usize) -> Self {
        let mut history = Self::with_cap(cap);
        for observation in observations {
            history.record(observation);
        }
        history
    }

    pub fn record(&mut self, observation: PriceObservation) {
        self.observations.push_back(observation);
        while self.observations.len() > self.cap {
            self.observations.pop_front();
        }
    }

    pub fn latest(&self) -> Option<&PriceObservation> {
        self.observations.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PriceObservation> {
        self.observations.iter()
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn cap(&self) -> usize {
        self.cap
    }
}

impl Default for PriceHistory {
    fn default() -> Self {
        Self::new()
    }
}
