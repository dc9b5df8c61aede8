//! Configuration validation and typed loading.
//!
//! Validates every `[simulation]` field before a run, and turns
//! `[basket.<name>]` sections into workspace baskets.

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::NaiveDate;

use crate::domain::date_key::DateKey;
use crate::domain::error::TraderError;
use crate::domain::simulation::{Cadence, SimulationConfig};
use crate::domain::strategy::StrategyKind;
use crate::domain::workspace::Workspace;
use crate::ports::config_port::ConfigPort;

const SIMULATION: &str = "simulation";
const BASKET_PREFIX: &str = "basket.";

/// Builds the `[simulation]` config and applies the run-time range checks
/// against `today`, without fetching any prices.
pub fn validate_simulation_config(
    config: &dyn ConfigPort,
    today: NaiveDate,
) -> Result<SimulationConfig, TraderError> {
    let simulation = build_simulation_config(config)?;
    simulation.validate(today)?;
    Ok(simulation)
}

/// Reads `[simulation]` into a [`SimulationConfig`]. Range checks against
/// today's date happen when the run starts.
pub fn build_simulation_config(config: &dyn ConfigPort) -> Result<SimulationConfig, TraderError> {
    let principal = parse_amount(config, "principal")?;
    let invest_amount = parse_amount(config, "invest_amount")?;
    let start_date = parse_date(config, SIMULATION, "start_date")?;
    let end_date = parse_date(config, SIMULATION, "end_date")?;

    if principal <= 0.0 {
        return Err(invalid(SIMULATION, "principal", "principal must be positive"));
    }
    if invest_amount < 0.0 {
        return Err(invalid(
            SIMULATION,
            "invest_amount",
            "invest_amount must be non-negative",
        ));
    }
    if start_date > end_date {
        return Err(invalid(
            SIMULATION,
            "start_date",
            "start_date must not be after end_date",
        ));
    }

    let strategy = required(config, SIMULATION, "strategy")?
        .parse::<StrategyKind>()
        .map_err(|e| invalid(SIMULATION, "strategy", &e.to_string()))?;
    let cadence = match config.get_string(SIMULATION, "cadence") {
        Some(s) if !s.trim().is_empty() => s
            .parse::<Cadence>()
            .map_err(|e| invalid(SIMULATION, "cadence", &e.to_string()))?,
        _ => Cadence::Month,
    };
    let proportions = parse_proportions(
        SIMULATION,
        "proportions",
        &required(config, SIMULATION, "proportions")?,
    )?;

    Ok(SimulationConfig {
        principal,
        invest_amount,
        start_date,
        end_date,
        strategy,
        cadence,
        proportions,
    })
}

/// `[data] path`, if configured.
pub fn data_path(config: &dyn ConfigPort) -> Option<PathBuf> {
    config
        .get_string("data", "path")
        .filter(|p| !p.trim().is_empty())
        .map(|p| PathBuf::from(p.trim()))
}

/// Creates one basket per `[basket.<name>]` section and returns how many were loaded.
pub fn load_baskets(
    config: &dyn ConfigPort,
    workspace: &mut Workspace<'_>,
) -> Result<usize, TraderError> {
    let mut loaded = 0;
    for section in config.sections() {
        let Some(name) = section.strip_prefix(BASKET_PREFIX) else {
            continue;
        };
        if name.is_empty() {
            return Err(invalid(&section, "name", "basket section needs a name"));
        }
        let created = parse_date(config, &section, "created")?;
        let holdings = match config.get_string(&section, "holdings") {
            Some(value) => parse_holdings(&section, "holdings", &value)?,
            None => BTreeMap::new(),
        };
        workspace.create_basket(name, created)?;
        for (symbol, shares) in holdings {
            workspace.add_stock(name, &symbol, shares)?;
        }
        loaded += 1;
    }
    Ok(loaded)
}

/// Parses `SYM:shares, SYM:shares`. Symbols are upper-cased.
pub fn parse_holdings(
    section: &str,
    key: &str,
    value: &str,
) -> Result<BTreeMap<String, u64>, TraderError> {
    let mut holdings = BTreeMap::new();
    for (symbol, raw) in pairs(section, key, value)? {
        let shares = raw.parse::<u64>().map_err(|_| {
            invalid(
                section,
                key,
                &format!("share count for '{symbol}' must be a non-negative integer, got '{raw}'"),
            )
        })?;
        *holdings.entry(symbol).or_insert(0) += shares;
    }
    Ok(holdings)
}

/// Parses `SYM:weight, SYM:weight`. Weight sums are checked by the simulation.
pub fn parse_proportions(
    section: &str,
    key: &str,
    value: &str,
) -> Result<BTreeMap<String, f64>, TraderError> {
    let mut proportions = BTreeMap::new();
    for (symbol, raw) in pairs(section, key, value)? {
        let weight = raw.parse::<f64>().map_err(|_| {
            invalid(
                section,
                key,
                &format!("weight for '{symbol}' must be a number, got '{raw}'"),
            )
        })?;
        if proportions.insert(symbol.clone(), weight).is_some() {
            return Err(invalid(
                section,
                key,
                &format!("'{symbol}' is listed more than once"),
            ));
        }
    }
    Ok(proportions)
}

fn pairs<'v>(
    section: &str,
    key: &str,
    value: &'v str,
) -> Result<Vec<(String, &'v str)>, TraderError> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| match item.split_once(':') {
            Some((symbol, raw)) if !symbol.trim().is_empty() => {
                Ok((symbol.trim().to_uppercase(), raw.trim()))
            }
            _ => Err(invalid(
                section,
                key,
                &format!("expected SYMBOL:value, got '{item}'"),
            )),
        })
        .collect()
}

fn required(config: &dyn ConfigPort, section: &str, key: &str) -> Result<String, TraderError> {
    match config.get_string(section, key) {
        Some(s) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        _ => Err(TraderError::ConfigMissing {
            section: section.to_string(),
            key: key.to_string(),
        }),
    }
}

fn parse_amount(config: &dyn ConfigPort, key: &str) -> Result<f64, TraderError> {
    let raw = required(config, SIMULATION, key)?;
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| invalid(SIMULATION, key, &format!("'{raw}' is not a number")))
}

fn parse_date(config: &dyn ConfigPort, section: &str, key: &str) -> Result<DateKey, TraderError> {
    let raw = required(config, section, key)?;
    raw.parse::<DateKey>().map_err(|_| {
        invalid(
            section,
            key,
            &format!("invalid {key} format, expected YYYY-MM-DD"),
        )
    })
}

fn invalid(section: &str, key: &str, reason: &str) -> TraderError {
    TraderError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}
