//! Periodic investing strategies.

use std::collections::BTreeMap;
use std::str::FromStr;

use tracing::debug;

use crate::domain::basket::Basket;
use crate::domain::date_key::DateKey;
use crate::domain::error::TraderError;
use crate::domain::price_cache::PriceCache;

pub const SIMULATION_BASKET: &str = "simulation";

/// Basket produced by one investment plus the cash it actually consumed.
#[derive(Debug, Clone)]
pub struct Investment<'a> {
    pub basket: Basket<'a>,
    pub cost: f64,
}

pub trait InvestingStrategy {
    /// Spends up to `amount` on top of `prior`, returning a new basket.
    /// `prior` is never modified.
    fn invest<'a>(
        &self,
        prior: &Basket<'a>,
        amount: f64,
        date: DateKey,
    ) -> Result<Investment<'a>, TraderError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    DollarCostAverage,
}

impl StrategyKind {
    pub fn build<'c>(
        self,
        proportions: &'c BTreeMap<String, f64>,
        prices: &'c PriceCache,
    ) -> Box<dyn InvestingStrategy + 'c> {
        match self {
            StrategyKind::DollarCostAverage => {
                Box::new(DollarCostAverage::new(proportions, prices))
            }
        }
    }
}

impl FromStr for StrategyKind {
    type Err = TraderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "DCA" | "DOLLARCOSTAVERAGE" => Ok(StrategyKind::DollarCostAverage),
            other => Err(TraderError::invalid_argument(format!(
                "unknown investing strategy '{other}'"
            ))),
        }
    }
}

/// Splits each contribution across holdings by fixed weights and buys whole
/// shares at the resolved trading price. Fractional shares are dropped, so
/// the cost never exceeds the amount offered.
pub struct DollarCostAverage<'c> {
    proportions: &'c BTreeMap<String, f64>,
    prices: &'c PriceCache,
}

impl<'c> DollarCostAverage<'c> {
    pub fn new(proportions: &'c BTreeMap<String, f64>, prices: &'c PriceCache) -> Self {
        DollarCostAverage {
            proportions,
            prices,
        }
    }
}

impl InvestingStrategy for DollarCostAverage<'_> {
    fn invest<'a>(
        &self,
        prior: &Basket<'a>,
        amount: f64,
        date: DateKey,
    ) -> Result<Investment<'a>, TraderError> {
        let mut holdings = BTreeMap::new();
        let mut cost = 0.0;

        for (symbol, &held) in prior.holdings() {
            let weight = self.proportions.get(symbol).copied().ok_or_else(|| {
                TraderError::invalid_argument(format!("no proportion set for '{symbol}'"))
            })?;
            let (traded_on, price) = self.prices.resolve(symbol, date)?;
            if price <= 0.0 {
                return Err(TraderError::invalid_argument(format!(
                    "non-positive price {price} for '{symbol}' on {traded_on}"
                )));
            }
            let shares = (amount * weight / price).floor();
            if !shares.is_finite() || shares >= u64::MAX as f64 {
                return Err(TraderError::invalid_argument(format!(
                    "purchase of {shares} '{symbol}' shares on {traded_on} is too large"
                )));
            }
            let bought = shares as u64;
            let total = held.checked_add(bought).ok_or_else(|| {
                TraderError::invalid_argument(format!(
                    "holding of '{symbol}' overflows after buying {bought} more"
                ))
            })?;
            debug!(symbol, %traded_on, price, bought, "dollar cost average purchase");
            holdings.insert(symbol.clone(), total);
            cost += bought as f64 * price;
        }

        Ok(Investment {
            basket: Basket::with_holdings(SIMULATION_BASKET, date, holdings, prior.provider()),
            cost,
        })
    }
}
