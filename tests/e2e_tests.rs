//! End-to-end integration tests
//!
//! These tests validate the complete commission pipeline using predefined test
//! fixtures. Each fixture directory under tests/fixtures/ holds:
//! - `config.yaml` - configuration with a static rate table
//! - `input.csv` - the operations
//! - `expected.txt` - one commission per processed row
//!
//! Each fixture is run twice: once with the sync strategy and once with the async one.

#[cfg(test)]
mod tests {
    use commission_engine::cli::StrategyType;
    use commission_engine::config::{CalculatorConfig, ExchangeRatesConfig};
    use commission_engine::rates::{load_rate_table, RateCache, RateTable};
    use commission_engine::strategy::{create_strategy, BatchConfig, ProcessingContext};
    use rstest::rstest;
    use std::fs;
    use std::io::Write;
    use std::path::Path;
    use std::sync::Arc;
    use tempfile::{tempdir, NamedTempFile};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn block_on_rates(config: &ExchangeRatesConfig) -> RateTable {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("Failed to create runtime")
            .block_on(load_rate_table(config))
            .unwrap_or_else(|e| panic!("Failed to load rates: {}", e))
    }

    /// Run a fixture by processing input.csv and comparing with expected.txt
    fn run_test_fixture(fixture_name: &str, strategy_type: StrategyType, batch: Option<BatchConfig>) {
        let fixture_dir = format!("tests/fixtures/{}", fixture_name);
        let config_path = format!("{}/config.yaml", fixture_dir);
        let input_path = format!("{}/input.csv", fixture_dir);
        let expected_path = format!("{}/expected.txt", fixture_dir);

        let config = CalculatorConfig::load_from_path(Path::new(&config_path))
            .unwrap_or_else(|e| panic!("Failed to load {}: {}", config_path, e));
        let rates = block_on_rates(config.exchange_rates());
        let context = ProcessingContext::new(Arc::new(config), rates);

        let strategy = create_strategy(strategy_type, batch, context);
        let mut temp_output = NamedTempFile::new().expect("Failed to create temp file");

        strategy
            .process(Path::new(&input_path), &mut temp_output)
            .unwrap_or_else(|e| panic!("Failed to process operations: {}", e));
        temp_output.flush().expect("Failed to flush temp file");

        let actual_output = fs::read_to_string(temp_output.path())
            .unwrap_or_else(|e| panic!("Failed to read temp output file: {}", e));
        let expected_output = fs::read_to_string(&expected_path)
            .unwrap_or_else(|e| panic!("Failed to read expected file {}: {}", expected_path, e));

        assert_eq!(
            actual_output, expected_output,
            "\n\nOutput mismatch for fixture: {} (strategy: {:?})\n\nActual output:\n{}\n\nExpected output:\n{}\n",
            fixture_name, strategy_type, actual_output, expected_output
        );
    }

    #[rstest]
    #[case("paysera_sample")]
    #[case("malformed_rows")]
    #[case("unknown_currency")]
    #[case("week_boundaries")]
    #[case("custom_config")]
    fn test_fixtures(
        #[case] fixture: &str,
        #[values(StrategyType::Sync, StrategyType::Async)] strategy: StrategyType,
    ) {
        run_test_fixture(fixture, strategy, None);
    }

    #[rstest]
    #[case("paysera_sample")]
    #[case("week_boundaries")]
    fn test_fixtures_with_tiny_batches(#[case] fixture: &str) {
        run_test_fixture(fixture, StrategyType::Async, Some(BatchConfig::new(1, 4)));
    }

    #[test]
    fn test_missing_input_is_fatal() {
        for strategy_type in [StrategyType::Sync, StrategyType::Async] {
            let context = ProcessingContext::new(
                Arc::new(CalculatorConfig::default()),
                RateTable::default(),
            );
            let strategy = create_strategy(strategy_type, None, context);
            let mut output = Vec::new();

            let result = strategy.process(Path::new("tests/fixtures/missing.csv"), &mut output);

            assert!(result.is_err(), "{:?} accepted a missing file", strategy_type);
        }
    }

    #[tokio::test]
    async fn test_rates_fetched_once_then_served_from_cache() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rates"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"base": "EUR", "rates": {"EUR": 1, "USD": 1.1497, "JPY": 129.53}}"#,
            ))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempdir().unwrap();
        let rates_config = ExchangeRatesConfig {
            url: format!("{}/rates", server.uri()),
            cache_path: Some(dir.path().join("rates.json")),
            ..ExchangeRatesConfig::default()
        };

        let fetched = load_rate_table(&rates_config).await.unwrap();
        let cached = load_rate_table(&rates_config).await.unwrap();

        assert_eq!(fetched, cached);
        assert_eq!(RateCache::new(&dir.path().join("rates.json")).load(), Some(fetched.clone()));

        let config = CalculatorConfig::default().with_exchange_rates(rates_config);
        let context = ProcessingContext::new(Arc::new(config), cached);
        let strategy = create_strategy(StrategyType::Sync, None, context);
        let mut output = Vec::new();

        strategy
            .process(Path::new("tests/fixtures/paysera_sample/input.csv"), &mut output)
            .unwrap();

        assert_eq!(
            String::from_utf8(output).unwrap(),
            fs::read_to_string("tests/fixtures/paysera_sample/expected.txt").unwrap()
        );
    }
}
