//! On-disk exchange rate cache
//!
//! Rates are cached as JSON until the next local midnight, so one run per day
//! fetches them and later runs reuse the file. A missing, unreadable or expired
//! file is treated as a cache miss.

use super::RateTable;
use crate::types::CommissionError;
use chrono::{DateTime, Days, Local, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry {
    rates: RateTable,
    expires_at: DateTime<Utc>,
}

/// Exchange rate cache backed by a single JSON file
#[derive(Debug, Clone)]
pub struct RateCache {
    path: PathBuf,
}

/// Start of the day after `now`, in local time
fn next_midnight(now: DateTime<Local>) -> DateTime<Utc> {
    now.date_naive()
        .checked_add_days(Days::new(1))
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .and_then(|midnight| midnight.and_local_timezone(Local).earliest())
        .map(|midnight| midnight.with_timezone(&Utc))
        .unwrap_or_else(|| now.with_timezone(&Utc) + chrono::Duration::days(1))
}

impl RateCache {
    pub fn new(path: &Path) -> Self {
        RateCache {
            path: path.to_path_buf(),
        }
    }

    /// Cached rates, if the file exists and has not expired
    pub fn load(&self) -> Option<RateTable> {
        self.load_at(Utc::now())
    }

    /// Cached rates as of `now`
    pub fn load_at(&self, now: DateTime<Utc>) -> Option<RateTable> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "rate cache miss");
                return None;
            }
        };

        let entry: CacheEntry = match serde_json::from_str(&text) {
            Ok(entry) => entry,
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "ignoring unreadable rate cache");
                return None;
            }
        };

        if now >= entry.expires_at {
            debug!(path = %self.path.display(), expires_at = %entry.expires_at, "rate cache expired");
            return None;
        }

        debug!(path = %self.path.display(), "rate cache hit");
        Some(entry.rates)
    }

    /// Cache `rates` until the end of the current local day
    pub fn store(&self, rates: &RateTable) -> Result<(), CommissionError> {
        self.store_until(rates, next_midnight(Local::now()))
    }

    /// Cache `rates` until `expires_at`
    pub fn store_until(
        &self,
        rates: &RateTable,
        expires_at: DateTime<Utc>,
    ) -> Result<(), CommissionError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let entry = CacheEntry {
            rates: rates.clone(),
            expires_at,
        };
        let json = serde_json::to_string_pretty(&entry)
            .map_err(|e| CommissionError::IoError {
                message: format!("failed to encode rate cache: {}", e),
            })?;
        fs::write(&self.path, json)?;

        debug!(path = %self.path.display(), %expires_at, "rates cached");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Timelike};
    use rust_decimal::Decimal;
    use tempfile::tempdir;

    fn table() -> RateTable {
        RateTable::from_pairs([("eur", Decimal::ONE), ("usd", Decimal::new(11497, 4))])
    }

    #[test]
    fn test_store_then_load() {
        let dir = tempdir().unwrap();
        let cache = RateCache::new(&dir.path().join("nested").join("rates.json"));

        cache.store(&table()).unwrap();

        assert_eq!(cache.load(), Some(table()));
    }

    #[test]
    fn test_missing_file_is_a_miss() {
        let dir = tempdir().unwrap();
        let cache = RateCache::new(&dir.path().join("rates.json"));

        assert_eq!(cache.load(), None);
    }

    #[test]
    fn test_expired_entry_is_a_miss() {
        let dir = tempdir().unwrap();
        let cache = RateCache::new(&dir.path().join("rates.json"));
        let expires_at = Utc.with_ymd_and_hms(2016, 1, 6, 0, 0, 0).unwrap();

        cache.store_until(&table(), expires_at).unwrap();

        let before = Utc.with_ymd_and_hms(2016, 1, 5, 23, 59, 59).unwrap();
        assert_eq!(cache.load_at(before), Some(table()));
        assert_eq!(cache.load_at(expires_at), None);
    }

    #[test]
    fn test_corrupt_file_is_a_miss() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rates.json");
        fs::write(&path, "{ not json").unwrap();

        assert_eq!(RateCache::new(&path).load(), None);
    }

    #[test]
    fn test_rates_survive_as_exact_decimals() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rates.json");
        let cache = RateCache::new(&path);

        cache.store(&table()).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"1.1497\""), "{}", text);
    }

    #[test]
    fn test_next_midnight_is_start_of_next_local_day() {
        let now = Local
            .from_local_datetime(
                &NaiveDate::from_ymd_opt(2016, 1, 5)
                    .unwrap()
                    .and_hms_opt(15, 30, 0)
                    .unwrap(),
            )
            .earliest()
            .unwrap();

        let midnight = next_midnight(now).with_timezone(&Local);

        assert_eq!(midnight.date_naive(), NaiveDate::from_ymd_opt(2016, 1, 6).unwrap());
        assert_eq!(midnight.hour(), 0);
        assert_eq!(midnight.minute(), 0);
    }
}
