//! Daily OHLC snapshot.

use std::ops::Add;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PriceRecord {
    pub open: f64,
    pub close: f64,
    pub high: f64,
    pub low: f64,
}

impl PriceRecord {
    pub fn new(open: f64, close: f64, high: f64, low: f64) -> Self {
        PriceRecord {
            open,
            close,
            high,
            low,
        }
    }

    /// Every field multiplied by a share count.
    pub fn scaled(&self, shares: u64) -> Self {
        let factor = shares as f64;
        PriceRecord {
            open: self.open * factor,
            close: self.close * factor,
            high: self.high * factor,
            low: self.low * factor,
        }
    }
}

impl Add for PriceRecord {
    type Output = PriceRecord;

    fn add(self, rhs: PriceRecord) -> PriceRecord {
        PriceRecord {
            open: self.open + rhs.open,
            close: self.close + rhs.close,
            high: self.high + rhs.high,
            low: self.low + rhs.low,
        }
    }
}
