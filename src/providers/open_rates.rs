use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::core::rates::RateProvider;
use crate::core::snapshot::RateSnapshot;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for the hosted rates endpoint: `GET /latest?base=<CODE>`.
pub struct OpenRatesProvider {
    base_url: String,
}

impl OpenRatesProvider {
    pub fn new(base_url: &str) -> Self {
        OpenRatesProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct LatestRatesResponse {
    success: bool,
    base: Option<String>,
    rates: Option<HashMap<String, f64>>,
    timestamp: Option<String>,
}

fn parse_timestamp(raw: Option<&str>) -> DateTime<Utc> {
    // A bad timestamp alone never fails a fetch; fall back to fetch time.
    raw.and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|t| t.with_timezone(&Utc))
        .unwrap_or_else(Utc::now)
}

#[async_trait]
impl RateProvider for OpenRatesProvider {
    #[instrument(
        name = "LatestRatesFetch",
        skip(self),
        fields(base = %base)
    )]
    async fn fetch_rates(&self, base: &str) -> Result<RateSnapshot> {
        let url = format!("{}/latest?base={}", self.base_url, base);
        debug!("Requesting rates from {}", url);

        let client = reqwest::Client::builder()
            .user_agent("ratewatch/0.1")
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        let response = client
            .get(&url)
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} for base: {} URL: {}", e, base, url))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} for base: {}",
                response.status(),
                base
            ));
        }

        let text = response.text().await?;

        let data: LatestRatesResponse = serde_json::from_str(&text)
            .map_err(|e| anyhow!("Failed to parse JSON response for base {}: {}", base, e))?;

        if !data.success {
            return Err(anyhow!("Rate service reported failure for base: {base}"));
        }

        let rates = data
            .rates
            .ok_or_else(|| anyhow!("No rates in response for base: {base}"))?;

        let snapshot = RateSnapshot::new(
            data.base.as_deref().unwrap_or(base),
            rates,
            parse_timestamp(data.timestamp.as_deref()),
        );
        snapshot.validate()?;

        debug!(count = snapshot.rates.len(), "Fetched rates");
        Ok(snapshot)
    }
}
