//! Sliding-window X-day moving average over an instrument's closes.
//!
//! The window is seeded from a lookback of `2 * X` calendar days before the
//! range start, which holds at least `X` trading days in any real market
//! calendar. From there each trading day in the range evicts the oldest
//! close and admits the new one, keeping a running sum.

use std::collections::VecDeque;
use std::str::FromStr;

use tracing::debug;

use crate::domain::date_key::DateKey;
use crate::domain::error::TraderError;
use crate::domain::instrument::{Instrument, LONG_AVERAGE_DAYS, SHORT_AVERAGE_DAYS};
use crate::domain::time_series::TimeSeries;

/// Which of the standard averages to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AverageSpan {
    Short,
    Long,
    Both,
}

impl AverageSpan {
    pub fn days(self) -> &'static [usize] {
        match self {
            AverageSpan::Short => &[SHORT_AVERAGE_DAYS],
            AverageSpan::Long => &[LONG_AVERAGE_DAYS],
            AverageSpan::Both => &[SHORT_AVERAGE_DAYS, LONG_AVERAGE_DAYS],
        }
    }
}

impl FromStr for AverageSpan {
    type Err = TraderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "50" => Ok(AverageSpan::Short),
            "200" => Ok(AverageSpan::Long),
            "both" | "50-200" => Ok(AverageSpan::Both),
            other => Err(TraderError::invalid_argument(format!(
                "unknown moving average span '{other}' (expected 50, 200 or both)"
            ))),
        }
    }
}

pub fn moving_average_range<I: Instrument + ?Sized>(
    instrument: &I,
    from: DateKey,
    to: DateKey,
    days: usize,
) -> Result<TimeSeries, TraderError> {
    if days == 0 {
        return Err(TraderError::invalid_argument(
            "moving average needs at least one day",
        ));
    }
    if from > to {
        return Err(TraderError::invalid_range(format!("{from} is after {to}")));
    }

    let lookback_start = from.minus_days(2 * days as u64)?;
    if let Some(created) = instrument.created() {
        if lookback_start < created {
            let available = if created <= from {
                closing_or_empty(instrument, created, from)?.len()
            } else {
                0
            };
            return Err(TraderError::InsufficientHistory {
                label: instrument.label().to_string(),
                days,
                available,
            });
        }
    }

    let range = instrument.historical_closing(from, to)?;
    let lookback = closing_or_empty(instrument, lookback_start, from)?;
    if lookback.len() < days {
        return Err(TraderError::InsufficientHistory {
            label: instrument.label().to_string(),
            days,
            available: lookback.len(),
        });
    }

    let mut window: VecDeque<f64> = lookback.iter().rev().take(days).map(|(_, c)| c).collect();
    window.make_contiguous().reverse();
    let mut sum: f64 = window.iter().sum();
    let divisor = days as f64;

    let mut averages = TimeSeries::new();
    let Some((window_end, _)) = lookback.last() else {
        return Ok(averages);
    };
    if range.contains(window_end) {
        averages.insert(window_end, sum / divisor);
    }

    for (date, close) in range.iter().filter(|(date, _)| *date > window_end) {
        if let Some(evicted) = window.pop_front() {
            sum -= evicted;
        }
        window.push_back(close);
        sum += close;
        averages.insert(date, sum / divisor);
    }

    debug!(
        label = instrument.label(),
        days,
        %from,
        %to,
        points = averages.len(),
        "computed moving average"
    );
    Ok(averages)
}

/// X-day moving average on a single trading day.
pub fn moving_average_on<I: Instrument + ?Sized>(
    instrument: &I,
    date: DateKey,
    days: usize,
) -> Result<f64, TraderError> {
    moving_average_range(instrument, date, date, days)?
        .get(date)
        .ok_or(TraderError::InvalidDate { date })
}

fn closing_or_empty<I: Instrument + ?Sized>(
    instrument: &I,
    from: DateKey,
    to: DateKey,
) -> Result<TimeSeries, TraderError> {
    match instrument.historical_closing(from, to) {
        Ok(series) => Ok(series),
        Err(TraderError::InvalidRange { .. }) => Ok(TimeSeries::new()),
        Err(e) => Err(e),
    }
}
