//! Price data access port.

use std::collections::BTreeMap;

use crate::domain::date_key::DateKey;
use crate::domain::error::TraderError;
use crate::domain::price_record::PriceRecord;

/// One record per trading day, ascending.
pub type PriceHistory = BTreeMap<DateKey, PriceRecord>;

pub trait PriceDataProvider {
    /// Display name for `symbol`, or `None` when the source does not know it.
    fn resolve_name(&self, symbol: &str) -> Result<Option<String>, TraderError>;

    /// Inclusive range; an empty map when there is no data.
    fn historical_prices(
        &self,
        symbol: &str,
        from: DateKey,
        to: DateKey,
    ) -> Result<PriceHistory, TraderError>;
}
