//! Exchange rates over HTTP
//!
//! The endpoint answers `GET` with `{"base": "EUR", "date": "...", "rates": {"USD": 1.1497, ...}}`.
//! Rates may be JSON numbers or strings; both are read from their decimal text.

use super::RateTable;
use crate::config::ExchangeRatesConfig;
use crate::types::CommissionError;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt::Display;
use std::future::Future;
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct RatesResponse {
    #[serde(default)]
    base: Option<String>,
    #[serde(default)]
    rates: HashMap<String, Value>,
}

/// Retries an async operation with a fixed delay
///
/// Runs `operation` once plus up to `retries` more times and returns the first
/// success, or the last error.
pub async fn with_retry<F, Fut, T, E>(mut operation: F, retries: u32, delay: Duration) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let mut attempt = 1;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if attempt > retries {
                    return Err(err);
                }
                debug!(attempt, retries, error = %err, "request failed, retrying");
                attempt += 1;
                tokio::time::sleep(delay).await;
            }
        }
    }
}

/// Client for the exchange rates endpoint
#[derive(Debug, Clone)]
pub struct HttpRateSource {
    client: reqwest::Client,
    url: String,
    retries: u32,
    retry_delay: Duration,
}

impl HttpRateSource {
    pub fn new(url: &str) -> Self {
        let defaults = ExchangeRatesConfig::default();
        HttpRateSource {
            client: reqwest::Client::new(),
            url: url.to_string(),
            retries: defaults.retries,
            retry_delay: Duration::from_millis(defaults.retry_delay_ms),
        }
    }

    pub fn from_config(config: &ExchangeRatesConfig) -> Self {
        Self::new(&config.url).with_retry_policy(
            config.retries,
            Duration::from_millis(config.retry_delay_ms),
        )
    }

    pub fn with_retry_policy(mut self, retries: u32, retry_delay: Duration) -> Self {
        self.retries = retries;
        self.retry_delay = retry_delay;
        self
    }

    /// Fetch and decode the current rate table
    ///
    /// Transport failures and non-success statuses are retried; a body that
    /// cannot be decoded is not.
    pub async fn fetch(&self) -> Result<RateTable, CommissionError> {
        let response = with_retry(
            move || {
                let request = self.client.get(&self.url);
                async move { request.send().await?.error_for_status() }
            },
            self.retries,
            self.retry_delay,
        )
        .await
        .map_err(|e| CommissionError::rate_fetch(format!("request to {} failed: {}", self.url, e)))?;

        let body: RatesResponse = response
            .json()
            .await
            .map_err(|e| CommissionError::rate_fetch(format!("invalid response body: {}", e)))?;

        if body.rates.is_empty() {
            return Err(CommissionError::rate_fetch("response contains no rates"));
        }
        debug!(base = ?body.base, currencies = body.rates.len(), "decoded exchange rates");

        let mut rates = HashMap::with_capacity(body.rates.len());
        for (currency, value) in body.rates {
            rates.insert(currency, parse_rate(&value)?);
        }
        Ok(RateTable::new(rates))
    }
}

fn parse_rate(value: &Value) -> Result<Decimal, CommissionError> {
    let text = match value {
        Value::Number(number) => number.to_string(),
        Value::String(text) => text.trim().to_string(),
        other => {
            return Err(CommissionError::rate_fetch(format!(
                "rate {} is not a number",
                other
            )))
        }
    };
    Decimal::from_str(&text)
        .map_err(|e| CommissionError::rate_fetch(format!("rate '{}' is invalid: {}", text, e)))
}
