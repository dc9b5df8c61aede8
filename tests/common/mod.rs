#![allow(dead_code)]

use basketrader::domain::date_key::DateKey;
use basketrader::domain::error::TraderError;
use basketrader::domain::price_record::PriceRecord;
use basketrader::ports::data_port::{PriceDataProvider, PriceHistory};
use chrono::{Datelike, NaiveDate, Weekday};
use std::collections::HashMap;

pub struct MockPriceProvider {
    pub data: HashMap<String, PriceHistory>,
    pub names: HashMap<String, String>,
    pub errors: HashMap<String, String>,
}

impl MockPriceProvider {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            names: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_closes(mut self, symbol: &str, closes: &[(&str, f64)]) -> Self {
        let history = self.data.entry(symbol.to_string()).or_default();
        for &(date, close) in closes {
            history.insert(key(date), make_record(close));
        }
        self
    }

    /// Weekday-only closes starting at `start`, rising by `step` each trading day.
    pub fn with_trading_days(
        mut self,
        symbol: &str,
        start: &str,
        count: usize,
        base: f64,
        step: f64,
    ) -> Self {
        let history = self.data.entry(symbol.to_string()).or_default();
        for (i, date) in trading_days(start, count).into_iter().enumerate() {
            history.insert(date, make_record(base + step * i as f64));
        }
        self
    }

    pub fn with_name(mut self, symbol: &str, name: &str) -> Self {
        self.names.insert(symbol.to_string(), name.to_string());
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl PriceDataProvider for MockPriceProvider {
    fn resolve_name(&self, symbol: &str) -> Result<Option<String>, TraderError> {
        if let Some(name) = self.names.get(symbol) {
            return Ok(Some(name.clone()));
        }
        Ok(self
            .data
            .contains_key(symbol)
            .then(|| symbol.to_string()))
    }

    fn historical_prices(
        &self,
        symbol: &str,
        from: DateKey,
        to: DateKey,
    ) -> Result<PriceHistory, TraderError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(TraderError::DataSource {
                reason: reason.clone(),
            });
        }
        Ok(self
            .data
            .get(symbol)
            .map(|history| {
                history
                    .range(from..=to)
                    .map(|(date, record)| (*date, *record))
                    .collect()
            })
            .unwrap_or_default())
    }
}

pub fn key(date: &str) -> DateKey {
    date.parse().unwrap()
}

pub fn date(year: i32, month: u32, day: u32) -> DateKey {
    DateKey::from_ymd(year, month, day).unwrap()
}

pub fn make_record(close: f64) -> PriceRecord {
    PriceRecord::new(close - 1.0, close, close + 1.0, close - 2.0)
}

/// `count` consecutive weekdays from `start` (rolled forward off a weekend).
pub fn trading_days(start: &str, count: usize) -> Vec<DateKey> {
    let mut day: NaiveDate = key(start).date();
    let mut days = Vec::with_capacity(count);
    while days.len() < count {
        if !matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
            days.push(DateKey::from(day));
        }
        day = day.succ_opt().unwrap();
    }
    days
}

/// Recorded AAPL/AMZN closes around the 2017 simulation window.
pub fn market_2017() -> MockPriceProvider {
    MockPriceProvider::new()
        .with_name("AAPL", "Apple Inc.")
        .with_name("AMZN", "Amazon.com, Inc.")
        .with_closes(
            "AAPL",
            &[
                ("2017-05-01", 146.58),
                ("2017-05-02", 147.51),
                ("2017-05-03", 147.06),
                ("2017-06-02", 155.45),
                ("2017-07-03", 143.50),
                ("2017-07-05", 144.09),
                ("2017-08-01", 150.05),
                ("2017-08-02", 157.14),
            ],
        )
        .with_closes(
            "AMZN",
            &[
                ("2017-05-01", 948.23),
                ("2017-05-02", 946.94),
                ("2017-05-03", 941.03),
                ("2017-06-02", 1006.73),
                ("2017-07-03", 953.66),
                ("2017-07-05", 971.40),
                ("2017-08-01", 996.19),
                ("2017-08-02", 995.89),
            ],
        )
}
