//! Named baskets and by-name analytics over one injected price provider.

use std::collections::BTreeMap;

use tracing::info;

use crate::domain::basket::Basket;
use crate::domain::date_key::DateKey;
use crate::domain::error::TraderError;
use crate::domain::instrument::{Instrument, Stock};
use crate::domain::moving_average::AverageSpan;
use crate::domain::price_record::PriceRecord;
use crate::domain::simulation::{Simulation, SimulationConfig};
use crate::domain::time_series::TimeSeries;
use crate::domain::trend::{TrendCalculator, TrendLabel};
use crate::ports::data_port::PriceDataProvider;

/// Most series a single chart can show. Enforced by callers.
pub const MAX_PLOT_SERIES: usize = 11;

pub struct Workspace<'a> {
    provider: &'a dyn PriceDataProvider,
    baskets: BTreeMap<String, Basket<'a>>,
}

impl<'a> Workspace<'a> {
    pub fn new(provider: &'a dyn PriceDataProvider) -> Self {
        Workspace {
            provider,
            baskets: BTreeMap::new(),
        }
    }

    /// Registers an empty basket. Names are case-insensitive and kept lower-case.
    pub fn create_basket(&mut self, name: &str, created: DateKey) -> Result<(), TraderError> {
        if name.trim().is_empty() {
            return Err(TraderError::invalid_argument("basket name must not be empty"));
        }
        let key = name.to_lowercase();
        if self.baskets.contains_key(&key) {
            return Err(TraderError::invalid_argument(format!(
                "basket '{key}' already exists"
            )));
        }
        info!(basket = %key, %created, "created basket");
        let basket = Basket::new(&key, created, self.provider);
        self.baskets.insert(key, basket);
        Ok(())
    }

    pub fn add_stock(
        &mut self,
        basket: &str,
        symbol: &str,
        shares: u64,
    ) -> Result<(), TraderError> {
        self.baskets
            .get_mut(&basket.to_lowercase())
            .ok_or_else(|| TraderError::invalid_argument(format!("unknown basket '{basket}'")))?
            .add_shares(symbol, shares)
    }

    pub fn basket(&self, name: &str) -> Option<&Basket<'a>> {
        self.baskets.get(&name.to_lowercase())
    }

    /// Runs `f` against the basket called `name`, or else the stock with that symbol.
    pub fn with_instrument<R>(
        &self,
        name: &str,
        f: impl FnOnce(&dyn Instrument) -> Result<R, TraderError>,
    ) -> Result<R, TraderError> {
        if let Some(basket) = self.basket(name) {
            return f(basket);
        }
        let stock = Stock::new(name, self.provider).map_err(|e| match e {
            TraderError::InvalidArgument { .. } => {
                TraderError::invalid_argument(format!("invalid stock/basket name '{name}'"))
            }
            other => other,
        })?;
        f(&stock)
    }

    pub fn price(&self, name: &str, date: DateKey) -> Result<PriceRecord, TraderError> {
        self.with_instrument(name, |i| i.price_on_date(date))
    }

    /// Closing series keyed by instrument name.
    pub fn closing_series(
        &self,
        names: &[&str],
        from: DateKey,
        to: DateKey,
    ) -> Result<BTreeMap<String, TimeSeries>, TraderError> {
        let mut plot = BTreeMap::new();
        for name in names {
            let series = self.with_instrument(name, |i| i.historical_closing(from, to))?;
            plot.insert(name.to_string(), series);
        }
        Ok(plot)
    }

    /// Moving-average curves labelled `<name><days>`.
    pub fn moving_average_series(
        &self,
        name: &str,
        from: DateKey,
        to: DateKey,
        span: AverageSpan,
    ) -> Result<BTreeMap<String, TimeSeries>, TraderError> {
        self.with_instrument(name, |instrument| {
            let mut curves = BTreeMap::new();
            for &days in span.days() {
                let series = instrument.moving_average_range(from, to, days)?;
                curves.insert(format!("{name}{days}"), series);
            }
            Ok(curves)
        })
    }

    pub fn trend(
        &self,
        name: &str,
        from: DateKey,
        to: DateKey,
        calculator: &dyn TrendCalculator,
    ) -> Result<TrendLabel, TraderError> {
        self.with_instrument(name, |i| i.trend(from, to, calculator))
    }

    pub fn buy_signal(&self, name: &str, date: DateKey) -> Result<bool, TraderError> {
        self.with_instrument(name, |i| i.buy_signal(date))
    }

    pub fn simulate(&self, config: SimulationConfig) -> Result<Simulation<'a>, TraderError> {
        Simulation::run(config, self.provider)
    }
}
