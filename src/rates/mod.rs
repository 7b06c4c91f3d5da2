//! Exchange rates
//!
//! This module provides the rate table, the [`ExchangeRateProvider`]
//! implementation the private withdraw calculator converts amounts with, and the
//! loader that assembles the table from configuration, a local cache or the rates
//! API.
//!
//! # Sources
//!
//! [`load_rate_table`] tries, in order:
//! 1. the static `rates` table of the configuration
//! 2. a cache file that has not expired yet
//! 3. the HTTP endpoint, writing the result back to the cache
//!
//! All sources are resolved once, before any operation is processed; the
//! calculators never wait on the network.

pub mod cache;
pub mod http;

pub use cache::RateCache;
pub use http::HttpRateSource;

use crate::config::ExchangeRatesConfig;
use crate::core::math;
use crate::core::traits::{ConfigProvider, ExchangeRateProvider};
use crate::types::CommissionError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Units of each currency per one unit of the default currency
///
/// Keys are lower case. Zero and negative rates are kept but treated as
/// unavailable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RateTable {
    rates: HashMap<String, Decimal>,
}

impl RateTable {
    /// Build a table, lower-casing the currency codes
    pub fn new(rates: HashMap<String, Decimal>) -> Self {
        Self::from_pairs(rates)
    }

    /// Build a table from `(currency, rate)` pairs
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, Decimal)>,
        S: AsRef<str>,
    {
        RateTable {
            rates: pairs
                .into_iter()
                .map(|(currency, rate)| (currency.as_ref().trim().to_lowercase(), rate))
                .collect(),
        }
    }

    /// Usable rate for a currency: present and strictly positive
    pub fn rate(&self, currency: &str) -> Option<Decimal> {
        self.rates
            .get(&currency.to_lowercase())
            .copied()
            .filter(|rate| *rate > Decimal::ZERO)
    }

    /// All rates, including unusable ones
    pub fn as_map(&self) -> &HashMap<String, Decimal> {
        &self.rates
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

/// Converts amounts between the default currency and the others
///
/// Conversions work one digit past the target currency's decimal places and
/// round up to them.
pub struct CurrencyExchangeRateProvider {
    config: Arc<dyn ConfigProvider>,
    rates: RateTable,
}

impl CurrencyExchangeRateProvider {
    pub fn new(config: Arc<dyn ConfigProvider>, rates: RateTable) -> Self {
        CurrencyExchangeRateProvider { config, rates }
    }

    fn base_places(&self) -> u32 {
        self.config.decimal_places(self.config.default_currency())
    }

    /// Reject amounts below zero at `decimal_places`
    fn check_amount(
        amount: Decimal,
        currency: &str,
        decimal_places: u32,
    ) -> Result<(), CommissionError> {
        if math::compare(amount, Decimal::ZERO, decimal_places as i32)? == Ordering::Less {
            return Err(CommissionError::invalid_amount(amount, currency));
        }
        Ok(())
    }

    fn rate(&self, currency: &str) -> Result<Decimal, CommissionError> {
        self.rates
            .rate(currency)
            .ok_or_else(|| CommissionError::unknown_currency(currency))
    }
}

impl ExchangeRateProvider for CurrencyExchangeRateProvider {
    fn rates(&self) -> &HashMap<String, Decimal> {
        self.rates.as_map()
    }

    fn convert_to_base_currency(
        &self,
        amount: Decimal,
        currency: &str,
    ) -> Result<Decimal, CommissionError> {
        let currency = currency.to_lowercase();
        Self::check_amount(amount, &currency, self.config.decimal_places(&currency))?;
        let rate = self.rate(&currency)?;

        let base_places = self.base_places();
        let converted = math::divide(amount, rate, math::working_precision(base_places))?;
        math::round_up(converted, base_places as i32)
    }

    fn convert_from_base_currency(
        &self,
        amount: Decimal,
        currency: &str,
    ) -> Result<Decimal, CommissionError> {
        let currency = currency.to_lowercase();
        Self::check_amount(amount, self.config.default_currency(), self.base_places())?;
        let rate = self.rate(&currency)?;

        let target_places = self.config.decimal_places(&currency);
        let converted = math::multiply(amount, rate, math::working_precision(target_places))?;
        math::round_up(converted, target_places as i32)
    }
}

/// Resolve the rate table from the configured sources
///
/// # Errors
///
/// `RateFetchError` when no static table is configured, no fresh cache exists and
/// the HTTP request fails on every attempt.
pub async fn load_rate_table(config: &ExchangeRatesConfig) -> Result<RateTable, CommissionError> {
    if let Some(rates) = &config.rates {
        debug!(currencies = rates.len(), "using configured exchange rates");
        return Ok(RateTable::from_pairs(
            rates.iter().map(|(currency, rate)| (currency, rate.0)),
        ));
    }

    let cache = config.cache_path.as_deref().map(RateCache::new);
    if let Some(rates) = cache.as_ref().and_then(RateCache::load) {
        debug!(currencies = rates.len(), "using cached exchange rates");
        return Ok(rates);
    }

    let rates = HttpRateSource::from_config(config).fetch().await?;
    info!(currencies = rates.len(), url = %config.url, "fetched exchange rates");

    if let Some(cache) = &cache {
        if let Err(e) = cache.store(&rates) {
            warn!(error = %e, "could not cache exchange rates");
        }
    }
    Ok(rates)
}
