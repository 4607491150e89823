use std::fs;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

mod test_utils {
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub async fn create_mock_server(base: &str, mock_response: &str) -> MockServer {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/latest"))
            .and(query_param("base", base))
            .respond_with(ResponseTemplate::new(200).set_body_string(mock_response))
            .mount(&mock_server)
            .await;

        mock_server
    }

    pub fn write_config(mock_uri: &str) -> tempfile::NamedTempFile {
        let config_file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
        let config_content = format!(
            r#"
            base_currency: "USD"
            watchlist:
              - "EUR"
            provider:
              base_url: {mock_uri}
            refresh_interval_secs: 1
            animation_millis: 100
        "#
        );
        std::fs::write(config_file.path(), &config_content).expect("Failed to write config file");
        config_file
    }
}

#[test_log::test(tokio::test)]
async fn test_convert_command_with_mock() {
    let mock_response = r#"{
        "success": true,
        "base": "USD",
        "rates": { "EUR": 0.90, "GBP": 0.78 },
        "timestamp": "2026-08-05T10:00:00Z"
    }"#;

    let mock_server = test_utils::create_mock_server("USD", mock_response).await;
    let config_file = test_utils::write_config(&mock_server.uri());

    let result = ratewatch::run_command(
        ratewatch::AppCommand::Convert {
            amount: 100.0,
            target: "EUR".to_string(),
        },
        Some(config_file.path().to_str().unwrap()),
    )
    .await;
    assert!(
        result.is_ok(),
        "Convert command failed with: {:?}",
        result.err()
    );
}

#[test_log::test(tokio::test)]
async fn test_rates_command_with_mock() {
    let mock_response = r#"{
        "success": true,
        "base": "USD",
        "rates": { "EUR": 0.90, "GBP": 0.78, "JPY": 151.35 },
        "timestamp": "2026-08-05T10:00:00Z"
    }"#;

    let mock_server = test_utils::create_mock_server("USD", mock_response).await;
    let config_file = test_utils::write_config(&mock_server.uri());

    let result = ratewatch::run_command(
        ratewatch::AppCommand::Rates {
            sort: ratewatch::cli::rates::RateSort::Rate,
            descending: true,
            filter: None,
            favorites: vec!["JPY".to_string()],
        },
        Some(config_file.path().to_str().unwrap()),
    )
    .await;
    assert!(
        result.is_ok(),
        "Rates command failed with: {:?}",
        result.err()
    );
}

#[test_log::test(tokio::test)]
async fn test_convert_command_fails_on_provider_error() {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/latest"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;
    let config_file = test_utils::write_config(&mock_server.uri());

    let result = ratewatch::run_command(
        ratewatch::AppCommand::Convert {
            amount: 100.0,
            target: "EUR".to_string(),
        },
        Some(config_file.path().to_str().unwrap()),
    )
    .await;
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("HTTP error: 500"));
}

#[test_log::test(tokio::test)]
async fn test_missing_config_file_is_an_error() {
    let result = ratewatch::run_command(
        ratewatch::AppCommand::Convert {
            amount: 1.0,
            target: "EUR".to_string(),
        },
        Some("/nonexistent/ratewatch-config.yaml"),
    )
    .await;
    assert!(result.is_err());
    assert!(
        result
            .unwrap_err()
            .to_string()
            .contains("Failed to read config file")
    );
}

// Full poll -> cache -> convert flow against a server whose rates move
// between fetches.
#[test_log::test(tokio::test)]
async fn test_live_rate_flow_with_mock() {
    use ratewatch::core::{Converter, RateCache, RatePoller};
    use ratewatch::providers::OpenRatesProvider;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    let mock_server = MockServer::start().await;

    // First fetch sees 0.90, every later fetch sees 0.92
    Mock::given(method("GET"))
        .and(path("/latest"))
        .and(query_param("base", "USD"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{ "success": true, "base": "USD", "rates": { "EUR": 0.90 } }"#,
        ))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/latest"))
        .and(query_param("base", "USD"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{ "success": true, "base": "USD", "rates": { "EUR": 0.92 } }"#,
        ))
        .mount(&mock_server)
        .await;

    let provider = Arc::new(OpenRatesProvider::new(&mock_server.uri()));
    let cache = RateCache::new();
    let poller = RatePoller::new(provider, cache.clone());
    let converter = Converter::new(cache.clone());

    // Long interval so only explicit refreshes drive fetches here
    poller.start("USD", Duration::from_secs(3600));
    let mut state = poller.subscribe();

    state
        .wait_for(|state| state.snapshot.is_some())
        .await
        .expect("poller state channel closed");
    info!("First snapshot applied");
    assert_eq!(converter.convert(100.0, "EUR").await, 90.0);

    poller.refresh_now();
    state
        .wait_for(|state| {
            state
                .snapshot
                .as_ref()
                .and_then(|snapshot| snapshot.rate("EUR"))
                == Some(0.92)
        })
        .await
        .expect("poller state channel closed");
    info!("Second snapshot applied");

    assert_eq!(converter.convert(100.0, "EUR").await, 92.0);
    assert!((cache.delta("EUR").await - 0.02).abs() < 1e-12);

    poller.stop();
}

#[test_log::test(tokio::test)]
async fn test_setup_then_load_roundtrip() {
    let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("config.yaml");

    ratewatch::cli::setup::setup_at_path(&config_path).expect("setup failed");

    let config = ratewatch::config::AppConfig::load_from_path(&config_path)
        .expect("generated config must load");
    assert_eq!(config.base_currency, "USD");
    assert!(config.refresh_interval() >= Duration::from_secs(1));

    // The generated file is valid YAML end to end
    let raw = fs::read_to_string(&config_path).unwrap();
    assert!(raw.contains("watchlist"));
}
