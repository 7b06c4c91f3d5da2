//! Calculator configuration
//!
//! Loads and validates the YAML configuration file and exposes it through
//! [`ConfigProvider`]. A configuration that loads successfully is complete: every
//! client type has a deposit percentage and a withdraw rule, private clients have a
//! weekly free allowance, and the default currency has decimal places.
//!
//! ```yaml
//! currency:
//!   default: eur
//!   decimal_places: { eur: 2, usd: 2, jpy: 0 }
//! commission:
//!   deposit: { private: 0.03, business: 0.03 }
//!   withdraw:
//!     private:
//!       percentage: 0.3
//!       free_per_week: { max_amount: 1000.00, max_transactions: 3 }
//!     business: { percentage: 0.5 }
//! exchange_rates:
//!   rates: { eur: 1, usd: 1.1497, jpy: 129.53 }
//! ```
//!
//! Mapping keys are case-insensitive. Numbers may be written as YAML numbers or as
//! strings; either way they are parsed from their decimal text, so `0.3` is exactly
//! `0.3`.

use crate::core::math::MAX_PRECISION;
use crate::core::traits::{ConfigProvider, FreeAllowance, WithdrawCommission};
use crate::types::{ClientType, CommissionError};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_yaml::Value;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

/// Largest number of decimal places a currency may have
///
/// Conversions work one digit past the currency's places, and rounding needs one
/// more on top of that.
pub const MAX_DECIMAL_PLACES: u32 = MAX_PRECISION - 1;

/// Rates endpoint used when the configuration names none
pub const DEFAULT_RATES_URL: &str = "https://developers.paysera.com/tasks/api/currency-exchange-rates";

/// A number read from configuration, as a YAML number or a string
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RawNumber {
    Integer(i64),
    Float(f64),
    Text(String),
}

/// Decimal parsed from its shortest textual form
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(try_from = "RawNumber")]
pub struct ConfigDecimal(pub Decimal);

impl TryFrom<RawNumber> for ConfigDecimal {
    type Error = String;

    fn try_from(raw: RawNumber) -> Result<Self, Self::Error> {
        let text = match raw {
            RawNumber::Integer(i) => return Ok(ConfigDecimal(Decimal::from(i))),
            RawNumber::Float(f) => f.to_string(),
            RawNumber::Text(s) => s.trim().to_string(),
        };
        Decimal::from_str(&text)
            .map(ConfigDecimal)
            .map_err(|e| format!("'{}' is not a decimal number: {}", text, e))
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    #[serde(default)]
    currency: RawCurrency,
    #[serde(default)]
    commission: RawCommission,
    #[serde(default)]
    exchange_rates: ExchangeRatesConfig,
}

#[derive(Debug, Default, Deserialize)]
struct RawCurrency {
    default: Option<String>,
    decimal_places: Option<HashMap<String, i64>>,
}

#[derive(Debug, Default, Deserialize)]
struct RawCommission {
    #[serde(default)]
    deposit: HashMap<String, ConfigDecimal>,
    #[serde(default)]
    withdraw: HashMap<String, RawWithdraw>,
}

#[derive(Debug, Default, Deserialize)]
struct RawWithdraw {
    percentage: Option<ConfigDecimal>,
    free_per_week: Option<RawFreeAllowance>,
}

#[derive(Debug, Default, Deserialize)]
struct RawFreeAllowance {
    max_amount: Option<ConfigDecimal>,
    max_transactions: Option<u32>,
}

/// Where exchange rates come from
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ExchangeRatesConfig {
    /// HTTP endpoint returning `{"base": ..., "rates": {...}}`
    pub url: String,

    /// File rates are cached in until the end of the day; no caching when unset
    pub cache_path: Option<PathBuf>,

    /// Additional attempts after a failed request
    pub retries: u32,

    /// Pause between attempts, in milliseconds
    pub retry_delay_ms: u64,

    /// Static rate table; when set no request is made
    pub rates: Option<HashMap<String, ConfigDecimal>>,
}

impl Default for ExchangeRatesConfig {
    fn default() -> Self {
        ExchangeRatesConfig {
            url: DEFAULT_RATES_URL.to_string(),
            cache_path: None,
            retries: 2,
            retry_delay_ms: 250,
            rates: None,
        }
    }
}

/// Validated calculator configuration
#[derive(Debug, Clone, PartialEq)]
pub struct CalculatorConfig {
    default_currency: String,
    decimal_places: HashMap<String, u32>,
    private_deposit: Decimal,
    business_deposit: Decimal,
    private_withdraw: WithdrawCommission,
    business_withdraw: WithdrawCommission,
    exchange_rates: ExchangeRatesConfig,
}

impl Default for CalculatorConfig {
    /// Default currency eur; eur and usd with 2 decimal places, jpy with none;
    /// 0.03% deposits; 0.3% private withdrawals with 1000.00 eur over at most 3
    /// withdrawals free per week; 0.5% business withdrawals
    fn default() -> Self {
        let decimal_places = [("eur", 2), ("usd", 2), ("jpy", 0)]
            .into_iter()
            .map(|(currency, places)| (currency.to_string(), places))
            .collect();

        CalculatorConfig {
            default_currency: "eur".to_string(),
            decimal_places,
            private_deposit: Decimal::new(3, 2),
            business_deposit: Decimal::new(3, 2),
            private_withdraw: WithdrawCommission {
                percentage: Decimal::new(3, 1),
                free_per_week: Some(FreeAllowance {
                    max_amount: Decimal::new(100000, 2),
                    max_transactions: 3,
                }),
            },
            business_withdraw: WithdrawCommission {
                percentage: Decimal::new(5, 1),
                free_per_week: None,
            },
            exchange_rates: ExchangeRatesConfig::default(),
        }
    }
}

impl CalculatorConfig {
    /// Load and validate a YAML configuration file
    ///
    /// # Errors
    ///
    /// - `FileNotFound` if the file does not exist
    /// - `IoError` if it cannot be read
    /// - `ConfigError` if it is not valid YAML or fails validation
    pub fn load_from_path(path: &Path) -> Result<Self, CommissionError> {
        debug!(path = %path.display(), "loading configuration");
        if !path.exists() {
            return Err(CommissionError::FileNotFound {
                path: path.display().to_string(),
            });
        }
        let text = fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    /// Parse and validate a YAML configuration document
    pub fn from_yaml_str(yaml: &str) -> Result<Self, CommissionError> {
        let value: Value = serde_yaml::from_str(yaml)?;
        let raw: RawConfig = if value.is_null() {
            RawConfig::default()
        } else {
            serde_yaml::from_value(lowercase_keys(value))?
        };
        Self::validate(raw)
    }

    fn validate(raw: RawConfig) -> Result<Self, CommissionError> {
        let default_currency = raw
            .currency
            .default
            .map(|c| c.trim().to_lowercase())
            .filter(|c| !c.is_empty())
            .ok_or_else(|| CommissionError::config("Default currency is not set"))?;

        let raw_places = raw
            .currency
            .decimal_places
            .ok_or_else(|| CommissionError::config("Decimal places config is not set"))?;

        let mut decimal_places = HashMap::with_capacity(raw_places.len());
        for (currency, places) in raw_places {
            let places = u32::try_from(places)
                .ok()
                .filter(|p| *p <= MAX_DECIMAL_PLACES)
                .ok_or_else(|| {
                    CommissionError::config(format!(
                        "Decimal places for currency {} must be between 0 and {}",
                        currency, MAX_DECIMAL_PLACES
                    ))
                })?;
            decimal_places.insert(currency, places);
        }

        if !decimal_places.contains_key(&default_currency) {
            return Err(CommissionError::config(
                "Default currency decimal places is not set",
            ));
        }

        let deposit = |client_type: ClientType| -> Result<Decimal, CommissionError> {
            let percentage = raw
                .commission
                .deposit
                .get(client_type.as_str())
                .map(|d| d.0)
                .ok_or_else(|| {
                    CommissionError::config(format!(
                        "{} deposit commission is not set",
                        client_type
                    ))
                })?;
            non_negative(percentage, &format!("{} deposit commission", client_type))
        };
        let private_deposit = deposit(ClientType::Private)?;
        let business_deposit = deposit(ClientType::Business)?;

        let private_withdraw = withdraw_rule(&raw.commission.withdraw, ClientType::Private)?;
        if private_withdraw.free_per_week.is_none() {
            return Err(CommissionError::config(
                "private withdraw commission free per week is not set",
            ));
        }
        let business_withdraw = withdraw_rule(&raw.commission.withdraw, ClientType::Business)?;

        let mut exchange_rates = raw.exchange_rates;
        exchange_rates.rates = exchange_rates.rates.map(|rates| {
            rates
                .into_iter()
                .map(|(currency, rate)| (currency.to_lowercase(), rate))
                .collect()
        });

        Ok(CalculatorConfig {
            default_currency,
            decimal_places,
            private_deposit,
            business_deposit,
            private_withdraw,
            business_withdraw,
            exchange_rates,
        })
    }

    /// Exchange rate source settings
    pub fn exchange_rates(&self) -> &ExchangeRatesConfig {
        &self.exchange_rates
    }

    /// Replace the exchange rate source settings
    pub fn with_exchange_rates(mut self, exchange_rates: ExchangeRatesConfig) -> Self {
        self.exchange_rates = exchange_rates;
        self
    }
}

fn non_negative(value: Decimal, what: &str) -> Result<Decimal, CommissionError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(CommissionError::config(format!(
            "{} must not be negative",
            what
        )));
    }
    Ok(value)
}

fn withdraw_rule(
    rules: &HashMap<String, RawWithdraw>,
    client_type: ClientType,
) -> Result<WithdrawCommission, CommissionError> {
    let rule = rules.get(client_type.as_str()).ok_or_else(|| {
        CommissionError::config(format!("{} withdraw commission is not set", client_type))
    })?;

    let percentage = rule.percentage.map(|p| p.0).ok_or_else(|| {
        CommissionError::config(format!(
            "{} withdraw commission percentage is not set",
            client_type
        ))
    })?;
    let percentage = non_negative(
        percentage,
        &format!("{} withdraw commission percentage", client_type),
    )?;

    let free_per_week = match &rule.free_per_week {
        None => None,
        Some(allowance) => {
            let max_amount = allowance.max_amount.map(|a| a.0).ok_or_else(|| {
                CommissionError::config(format!(
                    "{} withdraw commission free per week max amount is not set",
                    client_type
                ))
            })?;
            let max_transactions = allowance.max_transactions.ok_or_else(|| {
                CommissionError::config(format!(
                    "{} withdraw commission free per week max transactions is not set",
                    client_type
                ))
            })?;
            Some(FreeAllowance {
                max_amount: non_negative(
                    max_amount,
                    &format!("{} free per week max amount", client_type),
                )?,
                max_transactions,
            })
        }
    };

    Ok(WithdrawCommission {
        percentage,
        free_per_week,
    })
}

/// Lower-case every mapping key in a YAML document
fn lowercase_keys(value: Value) -> Value {
    match value {
        Value::Mapping(mapping) => Value::Mapping(
            mapping
                .into_iter()
                .map(|(key, value)| {
                    let key = match key {
                        Value::String(s) => Value::String(s.to_lowercase()),
                        other => other,
                    };
                    (key, lowercase_keys(value))
                })
                .collect(),
        ),
        Value::Sequence(items) => Value::Sequence(items.into_iter().map(lowercase_keys).collect()),
        other => other,
    }
}

impl ConfigProvider for CalculatorConfig {
    fn default_currency(&self) -> &str {
        &self.default_currency
    }

    fn decimal_places(&self, currency: &str) -> u32 {
        self.decimal_places
            .get(&currency.to_lowercase())
            .or_else(|| self.decimal_places.get(&self.default_currency))
            .copied()
            .unwrap_or(0)
    }

    fn deposit_commission(&self, client_type: ClientType) -> Decimal {
        match client_type {
            ClientType::Private => self.private_deposit,
            ClientType::Business => self.business_deposit,
        }
    }

    fn withdraw_commission(&self, client_type: ClientType) -> &WithdrawCommission {
        match client_type {
            ClientType::Private => &self.private_withdraw,
            ClientType::Business => &self.business_withdraw,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const VALID: &str = r#"
currency:
  default: eur
  decimal_places:
    eur: 2
    jpy: 0
commission:
  deposit:
    private: 0.03
    business: 0.03
  withdraw:
    private:
      percentage: "0.3"
      free_per_week:
        max_amount: "1000.00"
        max_transactions: 3
    business:
      percentage: "0.5"
"#;

    #[test]
    fn test_valid_config_loads() {
        let config = CalculatorConfig::from_yaml_str(VALID).unwrap();

        assert_eq!(config.default_currency(), "eur");
        assert_eq!(config.decimal_places("eur"), 2);
        assert_eq!(config.decimal_places("JPY"), 0);
        assert_eq!(
            config.deposit_commission(ClientType::Private),
            Decimal::new(3, 2)
        );
        assert_eq!(
            config.deposit_commission(ClientType::Business),
            Decimal::new(3, 2)
        );
        assert_eq!(
            config.withdraw_commission(ClientType::Private),
            &WithdrawCommission {
                percentage: Decimal::new(3, 1),
                free_per_week: Some(FreeAllowance {
                    max_amount: Decimal::new(100000, 2),
                    max_transactions: 3,
                }),
            }
        );
        assert_eq!(
            config.withdraw_commission(ClientType::Business).percentage,
            Decimal::new(5, 1)
        );
        assert_eq!(config.withdraw_commission(ClientType::Business).free_per_week, None);
        assert_eq!(config.exchange_rates(), &ExchangeRatesConfig::default());
    }

    #[test]
    fn test_unknown_currency_uses_default_places() {
        let config = CalculatorConfig::from_yaml_str(VALID).unwrap();
        assert_eq!(config.decimal_places("gbp"), 2);
    }

    #[test]
    fn test_keys_are_case_insensitive() {
        let yaml = VALID
            .replace("eur: 2", "EUR: 2")
            .replace("default: eur", "default: EUR")
            .replace("private:", "Private:");
        let config = CalculatorConfig::from_yaml_str(&yaml).unwrap();

        assert_eq!(config.default_currency(), "eur");
        assert_eq!(config.decimal_places("eur"), 2);
        assert_eq!(
            config.withdraw_commission(ClientType::Private).percentage,
            Decimal::new(3, 1)
        );
    }

    #[test]
    fn test_float_numbers_parse_exactly() {
        let yaml = VALID.replace("percentage: \"0.3\"", "percentage: 0.3");
        let config = CalculatorConfig::from_yaml_str(&yaml).unwrap();

        let percentage = config.withdraw_commission(ClientType::Private).percentage;
        assert_eq!(percentage.to_string(), "0.3");
    }

    #[test]
    fn test_default_matches_standard_settings() {
        let loaded = CalculatorConfig::from_yaml_str(VALID).unwrap();
        let default = CalculatorConfig::default();

        assert_eq!(default.default_currency(), loaded.default_currency());
        for client_type in ClientType::ALL {
            assert_eq!(
                default.deposit_commission(client_type),
                loaded.deposit_commission(client_type)
            );
            assert_eq!(
                default.withdraw_commission(client_type),
                loaded.withdraw_commission(client_type)
            );
        }
        assert_eq!(default.decimal_places("usd"), 2);
    }

    #[rstest]
    #[case::missing_default("  default: eur\n", "", "Default currency is not set")]
    #[case::missing_default_places("    eur: 2\n", "", "Default currency decimal places is not set")]
    #[case::negative_places("eur: 2", "eur: -1", "Decimal places for currency eur")]
    #[case::too_many_places("eur: 2", "eur: 27", "must be between 0 and 26")]
    #[case::missing_deposit("    business: 0.03\n", "", "business deposit commission is not set")]
    #[case::negative_deposit("private: 0.03", "private: -0.03", "private deposit commission must not be negative")]
    #[case::bad_number("percentage: \"0.5\"", "percentage: abc", "is not a decimal number")]
    #[case::missing_business_withdraw(
        "    business:\n      percentage: \"0.5\"\n",
        "",
        "business withdraw commission is not set"
    )]
    #[case::missing_max_transactions(
        "        max_transactions: 3\n",
        "",
        "free per week max transactions is not set"
    )]
    fn test_invalid_config_is_rejected(
        #[case] from: &str,
        #[case] to: &str,
        #[case] expected: &str,
    ) {
        let yaml = VALID.replacen(from, to, 1);
        let err = CalculatorConfig::from_yaml_str(&yaml).unwrap_err();

        assert!(matches!(err, CommissionError::ConfigError { .. }));
        assert!(
            err.to_string().contains(expected),
            "expected '{}' in '{}'",
            expected,
            err
        );
    }

    #[test]
    fn test_private_without_allowance_is_rejected() {
        let yaml = VALID
            .replace("      free_per_week:\n", "")
            .replace("        max_amount: \"1000.00\"\n", "")
            .replace("        max_transactions: 3\n", "");
        let err = CalculatorConfig::from_yaml_str(&yaml).unwrap_err();

        assert!(err.to_string().contains("free per week is not set"));
    }

    #[test]
    fn test_exchange_rates_section() {
        let yaml = format!(
            "{}exchange_rates:\n  retries: 5\n  rates:\n    EUR: 1\n    USD: 1.1497\n    JPY: \"129.53\"\n",
            VALID
        );
        let config = CalculatorConfig::from_yaml_str(&yaml).unwrap();
        let rates = config.exchange_rates().rates.as_ref().unwrap();

        assert_eq!(config.exchange_rates().retries, 5);
        assert_eq!(config.exchange_rates().url, DEFAULT_RATES_URL);
        assert_eq!(rates["usd"].0.to_string(), "1.1497");
        assert_eq!(rates["jpy"].0.to_string(), "129.53");
        assert_eq!(rates["eur"].0, Decimal::ONE);
    }

    #[test]
    fn test_load_from_path() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(VALID.as_bytes()).unwrap();

        let config = CalculatorConfig::load_from_path(file.path()).unwrap();
        assert_eq!(config.default_currency(), "eur");
    }

    #[test]
    fn test_load_from_missing_path() {
        let err = CalculatorConfig::load_from_path(Path::new("does/not/exist.yaml")).unwrap_err();
        assert!(matches!(err, CommissionError::FileNotFound { .. }));
    }

    #[test]
    fn test_invalid_yaml_is_config_error() {
        let err = CalculatorConfig::from_yaml_str("currency: [unclosed").unwrap_err();
        assert!(matches!(err, CommissionError::ConfigError { .. }));
    }
}
