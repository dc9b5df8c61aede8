//! Analytics contract shared by single stocks and baskets.
//!
//! Each variant supplies [`Instrument::price_on_date`] and
//! [`Instrument::historical_closing`]; trend, buy signal and moving averages
//! are derived from the closing series.

use tracing::debug;

use crate::domain::date_key::DateKey;
use crate::domain::error::TraderError;
use crate::domain::moving_average;
use crate::domain::price_record::PriceRecord;
use crate::domain::time_series::TimeSeries;
use crate::domain::trend::{TrendCalculator, TrendLabel};
use crate::ports::data_port::PriceDataProvider;

pub const SHORT_AVERAGE_DAYS: usize = 50;
pub const LONG_AVERAGE_DAYS: usize = 200;

pub trait Instrument {
    fn label(&self) -> &str;

    /// Earliest date this instrument can be queried at, if bounded.
    fn created(&self) -> Option<DateKey> {
        None
    }

    fn price_on_date(&self, date: DateKey) -> Result<PriceRecord, TraderError>;

    /// Inclusive closing series; never empty.
    fn historical_closing(&self, from: DateKey, to: DateKey) -> Result<TimeSeries, TraderError>;

    fn trend(
        &self,
        from: DateKey,
        to: DateKey,
        calculator: &dyn TrendCalculator,
    ) -> Result<TrendLabel, TraderError> {
        let series = self.historical_closing(from, to)?;
        if series.len() < 2 {
            return Err(TraderError::invalid_range(format!(
                "{} has fewer than two trading days between {from} and {to}",
                self.label()
            )));
        }
        let delta = calculator.trend(&series);
        debug!(label = self.label(), %from, %to, delta, "computed trend");
        Ok(calculator.classify(delta))
    }

    /// True when the 50-day average is strictly above the 200-day average on `date`.
    ///
    /// `date` must carry exactly one closing value. For a basket a day on which
    /// only some constituents trade still counts.
    fn buy_signal(&self, date: DateKey) -> Result<bool, TraderError> {
        match self.historical_closing(date, date) {
            Ok(series) if series.len() == 1 => {}
            Ok(_) | Err(TraderError::InvalidRange { .. }) => {
                return Err(TraderError::InvalidDate { date });
            }
            Err(e) => return Err(e),
        }
        let short = moving_average::moving_average_on(self, date, SHORT_AVERAGE_DAYS)?;
        let long = moving_average::moving_average_on(self, date, LONG_AVERAGE_DAYS)?;
        Ok(short > long)
    }

    fn moving_average_range(
        &self,
        from: DateKey,
        to: DateKey,
        days: usize,
    ) -> Result<TimeSeries, TraderError> {
        moving_average::moving_average_range(self, from, to, days)
    }
}

/// A single ticker.
#[derive(Clone, Copy)]
pub struct Stock<'a> {
    symbol: &'a str,
    provider: &'a dyn PriceDataProvider,
}

impl<'a> Stock<'a> {
    /// Fails unless the provider can resolve a name for `symbol`.
    pub fn new(symbol: &'a str, provider: &'a dyn PriceDataProvider) -> Result<Self, TraderError> {
        match provider.resolve_name(symbol)? {
            Some(_) => Ok(Stock { symbol, provider }),
            None => Err(TraderError::invalid_argument(format!(
                "unknown stock symbol '{symbol}'"
            ))),
        }
    }

    pub(crate) fn unchecked(symbol: &'a str, provider: &'a dyn PriceDataProvider) -> Self {
        Stock { symbol, provider }
    }

    pub fn symbol(&self) -> &str {
        self.symbol
    }

    pub fn name(&self) -> Result<Option<String>, TraderError> {
        self.provider.resolve_name(self.symbol)
    }

    /// Raw closing prices, possibly empty.
    pub(crate) fn closing_or_empty(
        &self,
        from: DateKey,
        to: DateKey,
    ) -> Result<TimeSeries, TraderError> {
        let history = self.provider.historical_prices(self.symbol, from, to)?;
        Ok(history
            .into_iter()
            .filter(|(date, _)| *date >= from && *date <= to)
            .map(|(date, record)| (date, record.close))
            .collect())
    }
}

impl Instrument for Stock<'_> {
    fn label(&self) -> &str {
        self.symbol
    }

    fn price_on_date(&self, date: DateKey) -> Result<PriceRecord, TraderError> {
        let history = self.provider.historical_prices(self.symbol, date, date)?;
        match history.get(&date) {
            Some(record) if history.len() == 1 => Ok(*record),
            _ => Err(TraderError::InvalidDate { date }),
        }
    }

    fn historical_closing(&self, from: DateKey, to: DateKey) -> Result<TimeSeries, TraderError> {
        let series = self.closing_or_empty(from, to)?;
        if series.is_empty() {
            return Err(TraderError::invalid_range(format!(
                "no trading days for {} between {from} and {to}",
                self.symbol
            )));
        }
        Ok(series)
    }
}
