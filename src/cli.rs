//! CLI definition and dispatch.

use clap::{Args, Parser, Subcommand};
use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvPriceProvider;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::config_validation::{
    build_simulation_config, data_path, load_baskets, validate_simulation_config,
};
use crate::domain::date_key::DateKey;
use crate::domain::error::TraderError;
use crate::domain::moving_average::AverageSpan;
use crate::domain::simulation::Simulation;
use crate::domain::time_series::TimeSeries;
use crate::domain::trend::SimpleTrendCalculator;
use crate::domain::workspace::{MAX_PLOT_SERIES, Workspace};
use crate::ports::config_port::ConfigPort;

#[derive(Parser, Debug)]
#[command(
    name = "basketrader",
    about = "Stock and basket analytics with periodic-investment simulation"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Where prices and baskets come from.
#[derive(Args, Debug, Clone, Default)]
pub struct Source {
    /// INI file with [data] and [basket.<name>] sections
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Directory of <SYMBOL>.csv price files; overrides [data] path
    #[arg(short, long)]
    pub data: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the price record of a stock or basket on one trading day
    Price {
        name: String,
        #[arg(long)]
        date: DateKey,
        #[command(flatten)]
        source: Source,
    },
    /// Write closing series for up to 11 stocks or baskets as CSV
    Closing {
        #[arg(required = true)]
        names: Vec<String>,
        #[arg(long)]
        from: DateKey,
        #[arg(long)]
        to: DateKey,
        #[command(flatten)]
        source: Source,
    },
    /// Write the 50-day and/or 200-day moving average as CSV
    MovingAverage {
        name: String,
        #[arg(long)]
        from: DateKey,
        #[arg(long)]
        to: DateKey,
        /// 50, 200 or both
        #[arg(long, default_value = "both")]
        span: AverageSpan,
        #[command(flatten)]
        source: Source,
    },
    /// Classify the closing trend over a range
    Trend {
        name: String,
        #[arg(long)]
        from: DateKey,
        #[arg(long)]
        to: DateKey,
        #[command(flatten)]
        source: Source,
    },
    /// Report whether the 50-day average is above the 200-day average
    BuySignal {
        name: String,
        #[arg(long)]
        date: DateKey,
        #[command(flatten)]
        source: Source,
    },
    /// Run a periodic-investment simulation from a config file
    Simulate {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        data: Option<PathBuf>,
        /// Dates to value the simulated basket on; defaults to the end date
        #[arg(long)]
        query: Vec<DateKey>,
        #[arg(long)]
        dry_run: bool,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Price { name, date, source } => run_price(&name, date, &source),
        Command::Closing {
            names,
            from,
            to,
            source,
        } => run_closing(&names, from, to, &source),
        Command::MovingAverage {
            name,
            from,
            to,
            span,
            source,
        } => run_moving_average(&name, from, to, span, &source),
        Command::Trend {
            name,
            from,
            to,
            source,
        } => run_trend(&name, from, to, &source),
        Command::BuySignal { name, date, source } => run_buy_signal(&name, date, &source),
        Command::Simulate {
            config,
            data,
            query,
            dry_run,
        } => run_simulate(&config, data.as_deref(), &query, dry_run),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, TraderError> {
    FileConfigAdapter::from_file(path).map_err(|e| TraderError::ConfigParse {
        file: path.display().to_string(),
        reason: e.to_string(),
    })
}

/// `--data`, then `[data] path`, then the working directory.
pub fn resolve_data_dir(data: Option<&Path>, config: Option<&dyn ConfigPort>) -> PathBuf {
    data.map(Path::to_path_buf)
        .or_else(|| config.and_then(|c| data_path(c)))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Writes labelled series as `label,date,value` rows.
pub fn write_series<W: Write>(
    out: W,
    series: &BTreeMap<String, TimeSeries>,
) -> Result<(), TraderError> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(["label", "date", "value"]).map_err(csv_error)?;
    for (label, points) in series {
        for (date, value) in points.iter() {
            writer
                .write_record([label.clone(), date.to_string(), value.to_string()])
                .map_err(csv_error)?;
        }
    }
    writer.flush()?;
    Ok(())
}

fn csv_error(e: csv::Error) -> TraderError {
    TraderError::Io(io::Error::other(e))
}

/// Loads the optional config, builds the provider, registers configured
/// baskets and hands the workspace to `f`.
fn with_workspace<R>(
    source: &Source,
    f: impl FnOnce(&Workspace<'_>) -> Result<R, TraderError>,
) -> Result<R, TraderError> {
    let config = source.config.as_deref().map(load_config).transpose()?;
    let config_port = config.as_ref().map(|c| c as &dyn ConfigPort);
    let data_dir = resolve_data_dir(source.data.as_deref(), config_port);
    let provider = CsvPriceProvider::new(data_dir);
    let mut workspace = Workspace::new(&provider);
    if let Some(config) = config_port {
        let loaded = load_baskets(config, &mut workspace)?;
        if loaded > 0 {
            eprintln!("Loaded {loaded} basket(s)");
        }
    }
    f(&workspace)
}

fn run_price(name: &str, date: DateKey, source: &Source) -> Result<(), TraderError> {
    let record = with_workspace(source, |ws| ws.price(name, date))?;
    let mut writer = csv::Writer::from_writer(io::stdout());
    writer
        .write_record(["label", "date", "open", "high", "low", "close"])
        .map_err(csv_error)?;
    writer
        .write_record([
            name.to_string(),
            date.to_string(),
            record.open.to_string(),
            record.high.to_string(),
            record.low.to_string(),
            record.close.to_string(),
        ])
        .map_err(csv_error)?;
    writer.flush()?;
    Ok(())
}

fn run_closing(
    names: &[String],
    from: DateKey,
    to: DateKey,
    source: &Source,
) -> Result<(), TraderError> {
    if names.len() > MAX_PLOT_SERIES {
        return Err(TraderError::invalid_argument(format!(
            "at most {MAX_PLOT_SERIES} series can be plotted together, got {}",
            names.len()
        )));
    }
    let names: Vec<&str> = names.iter().map(String::as_str).collect();
    let series = with_workspace(source, |ws| ws.closing_series(&names, from, to))?;
    write_series(io::stdout().lock(), &series)
}

fn run_moving_average(
    name: &str,
    from: DateKey,
    to: DateKey,
    span: AverageSpan,
    source: &Source,
) -> Result<(), TraderError> {
    let series = with_workspace(source, |ws| ws.moving_average_series(name, from, to, span))?;
    write_series(io::stdout().lock(), &series)
}

fn run_trend(name: &str, from: DateKey, to: DateKey, source: &Source) -> Result<(), TraderError> {
    let label = with_workspace(source, |ws| ws.trend(name, from, to, &SimpleTrendCalculator))?;
    println!("{name}: {label}");
    Ok(())
}

fn run_buy_signal(name: &str, date: DateKey, source: &Source) -> Result<(), TraderError> {
    let buy = with_workspace(source, |ws| ws.buy_signal(name, date))?;
    let verdict = if buy { "buy" } else { "hold" };
    println!("{name} {date}: {verdict}");
    Ok(())
}

fn run_simulate(
    config_path: &Path,
    data: Option<&Path>,
    queries: &[DateKey],
    dry_run: bool,
) -> Result<(), TraderError> {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = load_config(config_path)?;

    if dry_run {
        let config = validate_simulation_config(&adapter, chrono::Local::now().date_naive())?;
        eprintln!(
            "Config valid: {} to {}, {} holding(s)",
            config.start_date,
            config.end_date,
            config.proportions.len()
        );
        return Ok(());
    }

    let config = build_simulation_config(&adapter)?;
    let data_dir = resolve_data_dir(data, Some(&adapter as &dyn ConfigPort));
    let provider = CsvPriceProvider::new(data_dir);
    let simulation = Simulation::run(config, &provider)?;
    eprintln!(
        "Simulated {} investment(s), principal {:.2}",
        simulation.snapshots().len(),
        simulation.principal()
    );

    let dates: Vec<DateKey> = if queries.is_empty() {
        vec![simulation.config().end_date]
    } else {
        queries.to_vec()
    };
    write_valuations(io::stdout().lock(), &simulation, &dates)
}

/// Writes `date,value,profit` rows for each queried date.
pub fn write_valuations<W: Write>(
    out: W,
    simulation: &Simulation<'_>,
    dates: &[DateKey],
) -> Result<(), TraderError> {
    let mut writer = csv::Writer::from_writer(out);
    writer
        .write_record(["date", "value", "profit"])
        .map_err(csv_error)?;
    for &date in dates {
        let value = simulation.basket_value(date)?;
        let profit = value - simulation.principal();
        writer
            .write_record([date.to_string(), format!("{value:.2}"), format!("{profit:.2}")])
            .map_err(csv_error)?;
    }
    writer.flush()?;
    Ok(())
}
