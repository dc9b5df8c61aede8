//! CSV file price data adapter.
//!
//! One `<SYMBOL>.csv` per stock with `date,open,high,low,close[,volume]`
//! columns, plus an optional `symbols.csv` of `symbol,name` pairs.

use crate::domain::date_key::DateKey;
use crate::domain::error::TraderError;
use crate::domain::price_record::PriceRecord;
use crate::ports::data_port::{PriceDataProvider, PriceHistory};
use chrono::{Local, NaiveDate};
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::debug;

const NAMES_FILE: &str = "symbols.csv";

pub struct CsvPriceProvider {
    base_path: PathBuf,
    today: NaiveDate,
}

impl CsvPriceProvider {
    pub fn new(base_path: PathBuf) -> Self {
        Self::with_today(base_path, Local::now().date_naive())
    }

    /// `today` anchors the two-digit-year pivot for `D-Mon-YY` dates.
    pub fn with_today(base_path: PathBuf, today: NaiveDate) -> Self {
        Self { base_path, today }
    }

    fn csv_path(&self, symbol: &str) -> Option<PathBuf> {
        let valid = !symbol.is_empty()
            && symbol
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | '^'))
            && symbol != "."
            && symbol != "..";
        valid.then(|| self.base_path.join(format!("{symbol}.csv")))
    }

    fn parse_date(&self, raw: &str) -> Result<DateKey, TraderError> {
        if raw.bytes().any(|b| b.is_ascii_alphabetic()) {
            DateKey::parse_abbreviated(raw, self.today)
        } else {
            raw.parse()
        }
    }

    fn listed_name(&self, symbol: &str) -> Result<Option<String>, TraderError> {
        let path = self.base_path.join(NAMES_FILE);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(TraderError::DataSource {
                    reason: format!("failed to read {}: {}", path.display(), e),
                })
            }
        };

        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());
        for result in rdr.records() {
            let record = result.map_err(|e| TraderError::DataSource {
                reason: format!("CSV parse error in {}: {}", path.display(), e),
            })?;
            if let (Some(listed), Some(name)) = (record.get(0), record.get(1)) {
                if listed.eq_ignore_ascii_case(symbol) && !name.is_empty() {
                    return Ok(Some(name.to_string()));
                }
            }
        }
        Ok(None)
    }
}

fn price_field(record: &csv::StringRecord, index: usize, column: &str) -> Result<f64, TraderError> {
    record
        .get(index)
        .ok_or_else(|| TraderError::DataSource {
            reason: format!("missing {column} column"),
        })?
        .parse()
        .map_err(|e| TraderError::DataSource {
            reason: format!("invalid {column} value: {e}"),
        })
}

impl PriceDataProvider for CsvPriceProvider {
    fn resolve_name(&self, symbol: &str) -> Result<Option<String>, TraderError> {
        let Some(path) = self.csv_path(symbol) else {
            return Ok(None);
        };
        if let Some(name) = self.listed_name(symbol)? {
            return Ok(Some(name));
        }
        Ok(path.is_file().then(|| symbol.to_string()))
    }

    fn historical_prices(
        &self,
        symbol: &str,
        from: DateKey,
        to: DateKey,
    ) -> Result<PriceHistory, TraderError> {
        let Some(path) = self.csv_path(symbol) else {
            return Ok(PriceHistory::new());
        };
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(symbol, path = %path.display(), "no price file");
                return Ok(PriceHistory::new());
            }
            Err(e) => {
                return Err(TraderError::DataSource {
                    reason: format!("failed to read {}: {}", path.display(), e),
                })
            }
        };

        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(content.as_bytes());
        let mut history = PriceHistory::new();

        for result in rdr.records() {
            let record = result.map_err(|e| TraderError::DataSource {
                reason: format!("CSV parse error: {}", e),
            })?;

            let date_str = record.get(0).ok_or_else(|| TraderError::DataSource {
                reason: "missing date column".into(),
            })?;
            let date = self.parse_date(date_str).map_err(|e| TraderError::DataSource {
                reason: format!("invalid date in {}: {}", path.display(), e),
            })?;

            if date < from || date > to {
                continue;
            }

            let open = price_field(&record, 1, "open")?;
            let high = price_field(&record, 2, "high")?;
            let low = price_field(&record, 3, "low")?;
            let close = price_field(&record, 4, "close")?;

            history.insert(date, PriceRecord::new(open, close, high, low));
        }

        debug!(symbol, %from, %to, records = history.len(), "read price file");
        Ok(history)
    }
}
