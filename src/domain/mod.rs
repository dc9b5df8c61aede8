//! Core analytics and simulation domain.

pub mod basket;
pub mod config_validation;
pub mod date_key;
pub mod error;
pub mod instrument;
pub mod moving_average;
pub mod price_cache;
pub mod price_record;
pub mod simulation;
pub mod strategy;
pub mod time_series;
pub mod trend;
pub mod workspace;
