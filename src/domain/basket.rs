//! Named, creation-dated, share-weighted collection of stocks.
//!
//! Basket series are the share-weighted sum of constituent closes over the
//! union of their trading dates. On a date where only some constituents
//! trade, the reading sums just those constituents; callers should expect a
//! distorted value there rather than a gap.

use std::collections::BTreeMap;
use std::fmt;

use crate::domain::date_key::DateKey;
use crate::domain::error::TraderError;
use crate::domain::instrument::{Instrument, Stock};
use crate::domain::price_record::PriceRecord;
use crate::domain::time_series::TimeSeries;
use crate::ports::data_port::PriceDataProvider;

#[derive(Clone)]
pub struct Basket<'a> {
    name: String,
    created: DateKey,
    holdings: BTreeMap<String, u64>,
    provider: &'a dyn PriceDataProvider,
}

impl<'a> Basket<'a> {
    pub fn new(
        name: impl Into<String>,
        created: DateKey,
        provider: &'a dyn PriceDataProvider,
    ) -> Self {
        Basket {
            name: name.into(),
            created,
            holdings: BTreeMap::new(),
            provider,
        }
    }

    /// Builds a basket from holdings whose symbols are already known to resolve.
    pub(crate) fn with_holdings(
        name: impl Into<String>,
        created: DateKey,
        holdings: BTreeMap<String, u64>,
        provider: &'a dyn PriceDataProvider,
    ) -> Self {
        Basket {
            name: name.into(),
            created,
            holdings,
            provider,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn created_date(&self) -> DateKey {
        self.created
    }

    pub(crate) fn provider(&self) -> &'a dyn PriceDataProvider {
        self.provider
    }

    pub fn holdings(&self) -> &BTreeMap<String, u64> {
        &self.holdings
    }

    pub fn shares(&self, symbol: &str) -> u64 {
        self.holdings.get(symbol).copied().unwrap_or(0)
    }

    /// Adds shares onto an existing holding, or inserts a new one after
    /// checking the symbol resolves.
    pub fn add_shares(&mut self, symbol: &str, shares: u64) -> Result<(), TraderError> {
        Stock::new(symbol, self.provider)?;
        *self.holdings.entry(symbol.to_string()).or_insert(0) += shares;
        Ok(())
    }

    fn ensure_created_by(&self, date: DateKey) -> Result<(), TraderError> {
        if date < self.created {
            return Err(TraderError::invalid_range(format!(
                "{date} precedes creation of basket '{}' on {}",
                self.name, self.created
            )));
        }
        Ok(())
    }

    fn constituents(&self) -> impl Iterator<Item = (Stock<'_>, u64)> + '_ {
        self.holdings
            .iter()
            .map(|(symbol, &shares)| (Stock::unchecked(symbol, self.provider), shares))
    }
}

impl Instrument for Basket<'_> {
    fn label(&self) -> &str {
        &self.name
    }

    fn created(&self) -> Option<DateKey> {
        Some(self.created)
    }

    fn price_on_date(&self, date: DateKey) -> Result<PriceRecord, TraderError> {
        if date < self.created {
            return Err(TraderError::InvalidDate { date });
        }
        let mut total = PriceRecord::default();
        for (stock, shares) in self.constituents() {
            total = total + stock.price_on_date(date)?.scaled(shares);
        }
        Ok(total)
    }

    fn historical_closing(&self, from: DateKey, to: DateKey) -> Result<TimeSeries, TraderError> {
        self.ensure_created_by(from)?;
        let mut series = TimeSeries::new();
        for (stock, shares) in self.constituents() {
            for (date, close) in stock.closing_or_empty(from, to)? {
                series.accumulate(date, close * shares as f64);
            }
        }
        if series.is_empty() {
            return Err(TraderError::invalid_range(format!(
                "no trading days for basket '{}' between {from} and {to}",
                self.name
            )));
        }
        Ok(series)
    }
}

impl fmt::Debug for Basket<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Basket")
            .field("name", &self.name)
            .field("created", &self.created)
            .field("holdings", &self.holdings)
            .finish()
    }
}

impl fmt::Display for Basket<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (created {})", self.name, self.created)?;
        for (symbol, shares) in &self.holdings {
            write!(f, " {symbol}:{shares}")?;
        }
        Ok(())
    }
}
