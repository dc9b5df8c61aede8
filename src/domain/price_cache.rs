//! Per-run closing price table with forward business-day resolution.

use std::collections::HashMap;

use tracing::{debug, info};

use crate::domain::date_key::DateKey;
use crate::domain::error::TraderError;
use crate::domain::time_series::TimeSeries;
use crate::ports::data_port::PriceDataProvider;

/// Markets are assumed never to close for longer than this.
pub const MAX_FORWARD_DAYS: u64 = 14;

#[derive(Debug, Clone, Default)]
pub struct PriceCache {
    closes: HashMap<String, TimeSeries>,
}

impl PriceCache {
    /// Fetches closing prices for every symbol over `[from, to]`, once each.
    pub fn fetch<'s>(
        provider: &dyn PriceDataProvider,
        symbols: impl IntoIterator<Item = &'s str>,
        from: DateKey,
        to: DateKey,
    ) -> Result<Self, TraderError> {
        let mut closes = HashMap::new();
        for symbol in symbols {
            let series: TimeSeries = provider
                .historical_prices(symbol, from, to)?
                .into_iter()
                .map(|(date, record)| (date, record.close))
                .collect();
            info!(symbol, %from, %to, days = series.len(), "cached closing prices");
            closes.insert(symbol.to_string(), series);
        }
        Ok(PriceCache { closes })
    }

    pub fn insert(&mut self, symbol: impl Into<String>, series: TimeSeries) {
        self.closes.insert(symbol.into(), series);
    }

    /// Close on `date`, or on the first trading day within
    /// [`MAX_FORWARD_DAYS`] after it.
    pub fn resolve(&self, symbol: &str, date: DateKey) -> Result<(DateKey, f64), TraderError> {
        let series = self.closes.get(symbol).ok_or_else(|| {
            TraderError::invalid_argument(format!("no cached prices for '{symbol}'"))
        })?;
        for offset in 0..=MAX_FORWARD_DAYS {
            let candidate = date.plus_days(offset)?;
            if let Some(close) = series.get(candidate) {
                if offset > 0 {
                    debug!(
                        symbol,
                        requested = %date,
                        resolved = %candidate,
                        "rolled forward to trading day"
                    );
                }
                return Ok((candidate, close));
            }
        }
        Err(TraderError::UnresolvedTradingDay {
            symbol: symbol.to_string(),
            date,
        })
    }
}
