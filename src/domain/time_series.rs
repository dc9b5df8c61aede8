//! Sparse date-keyed series of prices or averages.
//!
//! Only trading days are present; a missing date means "no trade", never zero.

use std::collections::BTreeMap;
use std::collections::btree_map;

use crate::domain::date_key::DateKey;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeSeries {
    points: BTreeMap<DateKey, f64>,
}

impl TimeSeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, date: DateKey, value: f64) -> Option<f64> {
        self.points.insert(date, value)
    }

    /// Adds `value` onto whatever is already stored at `date`.
    pub fn accumulate(&mut self, date: DateKey, value: f64) {
        *self.points.entry(date).or_insert(0.0) += value;
    }

    pub fn get(&self, date: DateKey) -> Option<f64> {
        self.points.get(&date).copied()
    }

    pub fn contains(&self, date: DateKey) -> bool {
        self.points.contains_key(&date)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<(DateKey, f64)> {
        self.points.first_key_value().map(|(d, v)| (*d, *v))
    }

    pub fn last(&self) -> Option<(DateKey, f64)> {
        self.points.last_key_value().map(|(d, v)| (*d, *v))
    }

    /// Latest entry at or before `date`.
    pub fn floor(&self, date: DateKey) -> Option<(DateKey, f64)> {
        self.points
            .range(..=date)
            .next_back()
            .map(|(d, v)| (*d, *v))
    }

    /// Inclusive sub-series.
    pub fn between(&self, from: DateKey, to: DateKey) -> TimeSeries {
        if from > to {
            return TimeSeries::new();
        }
        self.points
            .range(from..=to)
            .map(|(d, v)| (*d, *v))
            .collect()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (DateKey, f64)> + '_ {
        self.points.iter().map(|(d, v)| (*d, *v))
    }

    pub fn dates(&self) -> impl DoubleEndedIterator<Item = DateKey> + '_ {
        self.points.keys().copied()
    }
}

impl FromIterator<(DateKey, f64)> for TimeSeries {
    fn from_iter<T: IntoIterator<Item = (DateKey, f64)>>(iter: T) -> Self {
        TimeSeries {
            points: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for TimeSeries {
    type Item = (DateKey, f64);
    type IntoIter = btree_map::IntoIter<DateKey, f64>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.into_iter()
    }
}
