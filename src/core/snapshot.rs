//! Rate snapshot type shared by the cache, poller and providers.

use anyhow::{Result, anyhow};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One fetched set of exchange rates for a base currency.
///
/// Every rate is the value of 1 unit of `base` in the keyed currency. The
/// base currency itself is implicit and need not appear in `rates`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateSnapshot {
    pub base: String,
    pub rates: HashMap<String, f64>,
    pub fetched_at: DateTime<Utc>,
}

impl RateSnapshot {
    pub fn new(base: &str, rates: HashMap<String, f64>, fetched_at: DateTime<Utc>) -> Self {
        Self {
            base: base.to_string(),
            rates,
            fetched_at,
        }
    }

    pub fn rate(&self, code: &str) -> Option<f64> {
        self.rates.get(code).copied()
    }

    /// Rejects snapshots a provider should never hand out: an empty rate
    /// map, or any rate that is not a strictly positive finite number.
    pub fn validate(&self) -> Result<()> {
        if self.rates.is_empty() {
            return Err(anyhow!("No rates in response for base: {}", self.base));
        }
        for (code, rate) in &self.rates {
            if !rate.is_finite() || *rate <= 0.0 {
                return Err(anyhow!(
                    "Invalid rate {} for currency {} (base: {})",
                    rate,
                    code,
                    self.base
                ));
            }
        }
        Ok(())
    }
}
