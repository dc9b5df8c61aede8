//! Periodic-investment simulation over a historical date range.
//!
//! Construction does all the work: validate the run, fetch closing prices
//! for every held symbol once, invest the principal at the start date, then
//! reinvest at each cadence step. The finished run is read-only and answers
//! profit queries from its snapshot history.

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{Local, Months, NaiveDate};
use tracing::{debug, info};

use crate::domain::basket::Basket;
use crate::domain::date_key::DateKey;
use crate::domain::error::TraderError;
use crate::domain::instrument::Stock;
use crate::domain::price_cache::{MAX_FORWARD_DAYS, PriceCache};
use crate::domain::strategy::{SIMULATION_BASKET, StrategyKind};
use crate::ports::data_port::PriceDataProvider;

pub const PROPORTION_TOLERANCE: f64 = 1e-5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cadence {
    Month,
    Quarter,
}

impl Cadence {
    pub fn months(self) -> u32 {
        match self {
            Cadence::Month => 1,
            Cadence::Quarter => 4,
        }
    }
}

impl FromStr for Cadence {
    type Err = TraderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "MONTH" => Ok(Cadence::Month),
            "QUARTER" => Ok(Cadence::Quarter),
            other => Err(TraderError::invalid_argument(format!(
                "unknown cadence '{other}' (expected MONTH or QUARTER)"
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SimulationConfig {
    pub principal: f64,
    pub invest_amount: f64,
    pub start_date: DateKey,
    pub end_date: DateKey,
    pub strategy: StrategyKind,
    pub cadence: Cadence,
    pub proportions: BTreeMap<String, f64>,
}

impl SimulationConfig {
    /// Checks amounts, dates and weights against `today`.
    pub fn validate(&self, today: NaiveDate) -> Result<(), TraderError> {
        if !self.principal.is_finite() || self.principal <= 0.0 {
            return Err(TraderError::invalid_argument(
                "principal must be a positive amount",
            ));
        }
        if !self.invest_amount.is_finite() || self.invest_amount < 0.0 {
            return Err(TraderError::invalid_argument(
                "invest amount must be non-negative",
            ));
        }
        let earliest = DateKey::from_ymd(1900, 1, 1)?;
        if self.start_date < earliest {
            return Err(TraderError::invalid_argument(
                "start date must be no earlier than 1900-01-01",
            ));
        }
        if self.end_date.date() > today {
            return Err(TraderError::invalid_argument(
                "end date must be no later than today",
            ));
        }
        if self.start_date > self.end_date {
            return Err(TraderError::invalid_argument(
                "start date must not be after end date",
            ));
        }
        if self.proportions.is_empty() {
            return Err(TraderError::invalid_argument(
                "at least one stock proportion is required",
            ));
        }
        if let Some((symbol, weight)) = self
            .proportions
            .iter()
            .find(|(_, w)| !w.is_finite() || **w < 0.0)
        {
            return Err(TraderError::invalid_argument(format!(
                "proportion for '{symbol}' must be non-negative, got {weight}"
            )));
        }
        let total: f64 = self.proportions.values().sum();
        if (total - 1.0).abs() >= PROPORTION_TOLERANCE {
            return Err(TraderError::invalid_argument(format!(
                "stock proportions must add up to 1, got {total}"
            )));
        }
        Ok(())
    }
}

pub struct Simulation<'a> {
    config: SimulationConfig,
    prices: PriceCache,
    principal: f64,
    snapshots: BTreeMap<DateKey, Basket<'a>>,
}

impl<'a> Simulation<'a> {
    pub fn run(
        config: SimulationConfig,
        provider: &'a dyn PriceDataProvider,
    ) -> Result<Self, TraderError> {
        Self::run_as_of(config, provider, Local::now().date_naive())
    }

    /// Same as [`Simulation::run`] with an explicit "today" for the end-date check.
    pub fn run_as_of(
        config: SimulationConfig,
        provider: &'a dyn PriceDataProvider,
        today: NaiveDate,
    ) -> Result<Self, TraderError> {
        config.validate(today)?;
        for symbol in config.proportions.keys() {
            Stock::new(symbol, provider)?;
        }

        let fetch_end = config.end_date.plus_days(MAX_FORWARD_DAYS)?;
        let prices = PriceCache::fetch(
            provider,
            config.proportions.keys().map(String::as_str),
            config.start_date,
            fetch_end,
        )?;

        let mut snapshots = BTreeMap::new();
        let principal;
        {
            let strategy = config.strategy.build(&config.proportions, &prices);

            let empty: BTreeMap<String, u64> =
                config.proportions.keys().map(|s| (s.clone(), 0)).collect();
            let initial = Basket::with_holdings(
                SIMULATION_BASKET,
                DateKey::from_ymd(1900, 1, 1)?,
                empty,
                provider,
            );
            let first = strategy.invest(&initial, config.principal, config.start_date)?;
            let mut invested = first.cost;
            info!(
                requested = config.principal,
                realized = invested,
                start = %config.start_date,
                "invested principal"
            );
            snapshots.insert(config.start_date, first.basket);

            let step = Months::new(config.cadence.months());
            let end = config.end_date.date();
            let mut current = config.start_date.date();
            while let Some(next) = current.checked_add_months(step).filter(|next| *next < end) {
                current = next;
                let date = DateKey::from(current);
                let prior = snapshots
                    .values()
                    .next_back()
                    .ok_or_else(|| TraderError::invalid_argument("simulation has no snapshot"))?;
                let step_result = strategy.invest(prior, config.invest_amount, date)?;
                invested += step_result.cost;
                debug!(%date, cost = step_result.cost, "reinvested");
                snapshots.insert(date, step_result.basket);
            }
            principal = invested;
        }

        info!(snapshots = snapshots.len(), principal, "simulation complete");
        Ok(Simulation {
            config,
            prices,
            principal,
            snapshots,
        })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Cash actually spent: the realized initial principal plus every
    /// periodic contribution.
    pub fn principal(&self) -> f64 {
        self.principal
    }

    pub fn snapshots(&self) -> &BTreeMap<DateKey, Basket<'a>> {
        &self.snapshots
    }

    /// Basket in force on `date`: the latest snapshot at or before it.
    pub fn snapshot_on(&self, date: DateKey) -> Result<&Basket<'a>, TraderError> {
        self.ensure_in_range(date)?;
        self.snapshots
            .range(..=date)
            .next_back()
            .map(|(_, basket)| basket)
            .ok_or(TraderError::OutOfRange {
                date,
                start: self.config.start_date,
                end: self.config.end_date,
            })
    }

    pub fn basket_value(&self, date: DateKey) -> Result<f64, TraderError> {
        let basket = self.snapshot_on(date)?;
        let mut value = 0.0;
        for (symbol, &shares) in basket.holdings() {
            let (_, price) = self.prices.resolve(symbol, date)?;
            value += price * shares as f64;
        }
        Ok(value)
    }

    pub fn profit(&self, date: DateKey) -> Result<f64, TraderError> {
        Ok(self.basket_value(date)? - self.principal)
    }

    fn ensure_in_range(&self, date: DateKey) -> Result<(), TraderError> {
        if date < self.config.start_date || date > self.config.end_date {
            return Err(TraderError::OutOfRange {
                date,
                start: self.config.start_date,
                end: self.config.end_date,
            });
        }
        Ok(())
    }
}
