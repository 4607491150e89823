//! Amount conversion over the rate cache.

use crate::core::cache::RateCache;

/// Converts amounts from the cache's base currency into a target currency.
///
/// Infallible on purpose: unknown codes resolve to a rate of 1 through the
/// cache, and the amount is passed through unchecked (the calling surface
/// decides what amounts are acceptable to show).
#[derive(Clone)]
pub struct Converter {
    cache: RateCache,
}

impl Converter {
    pub fn new(cache: RateCache) -> Self {
        Self { cache }
    }

    pub async fn convert(&self, amount: f64, target: &str) -> f64 {
        amount * self.cache.rate(target).await
    }
}
