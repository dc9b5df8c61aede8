//! Qualitative trend classification of a closing series.

use std::fmt;

use crate::domain::time_series::TimeSeries;

/// Absolute price move separating a gentle trend from a strong one.
pub const STRONG_TREND_THRESHOLD: f64 = 45.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendLabel {
    StrongIncline,
    GentleIncline,
    Steady,
    GentleDecline,
    StrongDecline,
}

impl fmt::Display for TrendLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TrendLabel::StrongIncline => "Strong incline",
            TrendLabel::GentleIncline => "Gentle incline",
            TrendLabel::Steady => "Steady",
            TrendLabel::GentleDecline => "Gentle decline",
            TrendLabel::StrongDecline => "Strong decline",
        };
        f.write_str(label)
    }
}

pub trait TrendCalculator {
    /// Numeric trend of a series with at least two points.
    fn trend(&self, series: &TimeSeries) -> f64;

    fn classify(&self, delta: f64) -> TrendLabel;
}

/// Last close minus first close.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleTrendCalculator;

impl TrendCalculator for SimpleTrendCalculator {
    fn trend(&self, series: &TimeSeries) -> f64 {
        match (series.first(), series.last()) {
            (Some((_, first)), Some((_, last))) => last - first,
            _ => 0.0,
        }
    }

    fn classify(&self, delta: f64) -> TrendLabel {
        if delta > STRONG_TREND_THRESHOLD {
            TrendLabel::StrongIncline
        } else if delta > 0.0 {
            TrendLabel::GentleIncline
        } else if delta < -STRONG_TREND_THRESHOLD {
            TrendLabel::StrongDecline
        } else if delta < 0.0 {
            TrendLabel::GentleDecline
        } else {
            TrendLabel::Steady
        }
    }
}
