//! Rate source abstraction.

use crate::core::snapshot::RateSnapshot;
use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait RateProvider: Send + Sync {
    /// Fetches the latest rates quoted against `base`.
    async fn fetch_rates(&self, base: &str) -> Result<RateSnapshot>;
}
