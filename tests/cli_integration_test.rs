//! CLI integration tests.
//!
//! Tests cover:
//! - Argument parsing for every subcommand
//! - Config loading and data directory resolution
//! - CSV series and valuation output
//! - End-to-end runs against price files on disk

mod common;

use basketrader::cli::{self, Cli, Command};
use basketrader::domain::config_validation::build_simulation_config;
use basketrader::domain::error::TraderError;
use basketrader::domain::moving_average::AverageSpan;
use basketrader::domain::simulation::Simulation;
use basketrader::domain::time_series::TimeSeries;
use basketrader::ports::config_port::ConfigPort;
use clap::Parser;
use common::*;
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tempfile::TempDir;

fn write_temp_ini(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

fn same_code(actual: ExitCode, expected: ExitCode) -> bool {
    format!("{actual:?}") == format!("{expected:?}")
}

const SIMULATION_INI: &str = r#"
[simulation]
principal = 5000
invest_amount = 1000
start_date = 2017-05-02
end_date = 2017-08-02
strategy = DCA
cadence = MONTH
proportions = AAPL:0.5, AMZN:0.5
"#;

fn price_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("AAPL.csv"),
        "date,open,high,low,close,volume\n\
         2017-05-01,145.10,147.20,144.96,146.58,33602900\n\
         2017-05-02,147.54,148.09,146.84,147.51,45352200\n\
         2017-05-03,145.59,147.49,144.27,147.06,45697000\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("AMZN.csv"),
        "date,open,high,low,close\n\
         2017-05-01,927.80,954.40,927.80,948.23\n\
         2017-05-02,946.65,950.10,941.41,946.94\n\
         2017-05-03,946.00,946.00,935.90,941.03\n",
    )
    .unwrap();
    dir
}

mod argument_parsing {
    use super::*;

    #[test]
    fn closing_accepts_many_names() {
        let cli = Cli::try_parse_from([
            "basketrader",
            "closing",
            "AAPL",
            "tech",
            "--from",
            "2017-05-01",
            "--to",
            "20170503",
            "--data",
            "/srv/prices",
        ])
        .unwrap();
        match cli.command {
            Command::Closing {
                names,
                from,
                to,
                source,
            } => {
                assert_eq!(names, vec!["AAPL", "tech"]);
                assert_eq!(from, date(2017, 5, 1));
                assert_eq!(to, date(2017, 5, 3));
                assert_eq!(source.data, Some(PathBuf::from("/srv/prices")));
                assert_eq!(source.config, None);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn moving_average_span_defaults_to_both() {
        let cli = Cli::try_parse_from([
            "basketrader",
            "moving-average",
            "AAPL",
            "--from",
            "2017-05-01",
            "--to",
            "2017-05-03",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Command::MovingAverage {
                span: AverageSpan::Both,
                ..
            }
        ));
    }

    #[test]
    fn simulate_collects_queries() {
        let cli = Cli::try_parse_from([
            "basketrader",
            "simulate",
            "--config",
            "sim.ini",
            "--query",
            "2017-06-01",
            "--query",
            "2017-08-02",
        ])
        .unwrap();
        match cli.command {
            Command::Simulate { query, dry_run, .. } => {
                assert_eq!(query, vec![date(2017, 6, 1), date(2017, 8, 2)]);
                assert!(!dry_run);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn malformed_date_is_rejected() {
        assert!(Cli::try_parse_from([
            "basketrader",
            "price",
            "AAPL",
            "--date",
            "2017-02-30",
        ])
        .is_err());
    }

    #[test]
    fn closing_requires_a_name() {
        assert!(Cli::try_parse_from([
            "basketrader",
            "closing",
            "--from",
            "2017-05-01",
            "--to",
            "2017-05-03",
        ])
        .is_err());
    }
}

mod config_loading {
    use super::*;

    #[test]
    fn load_config_reads_ini_from_disk() {
        let file = write_temp_ini(SIMULATION_INI);
        let adapter = cli::load_config(file.path()).unwrap();
        let config = build_simulation_config(&adapter).unwrap();
        assert_eq!(config.start_date, date(2017, 5, 2));
        assert_eq!(config.proportions.len(), 2);
    }

    #[test]
    fn load_config_missing_file_is_parse_error() {
        let err = cli::load_config(Path::new("/nonexistent/sim.ini")).unwrap_err();
        assert!(matches!(err, TraderError::ConfigParse { .. }));
    }

    #[test]
    fn data_dir_prefers_flag_then_config() {
        let file = write_temp_ini("[data]\npath = /from/config\n");
        let adapter = cli::load_config(file.path()).unwrap();
        let port: &dyn ConfigPort = &adapter;

        assert_eq!(
            cli::resolve_data_dir(Some(Path::new("/from/flag")), Some(port)),
            PathBuf::from("/from/flag")
        );
        assert_eq!(
            cli::resolve_data_dir(None, Some(port)),
            PathBuf::from("/from/config")
        );
        assert_eq!(cli::resolve_data_dir(None, None), PathBuf::from("."));
    }
}

mod output {
    use super::*;

    #[test]
    fn series_are_written_as_label_date_value_rows() {
        let mut series = BTreeMap::new();
        let aapl: TimeSeries = [(date(2017, 5, 1), 146.58), (date(2017, 5, 2), 147.51)]
            .into_iter()
            .collect();
        series.insert("AAPL".to_string(), aapl);

        let mut out = Vec::new();
        cli::write_series(&mut out, &series).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "label,date,value\nAAPL,2017-05-01,146.58\nAAPL,2017-05-02,147.51\n"
        );
    }

    #[test]
    fn valuations_report_value_and_profit() {
        let provider = market_2017();
        let adapter = basketrader::adapters::file_config_adapter::FileConfigAdapter::from_string(
            SIMULATION_INI,
        )
        .unwrap();
        let sim = Simulation::run(build_simulation_config(&adapter).unwrap(), &provider).unwrap();

        let mut out = Vec::new();
        cli::write_valuations(&mut out, &sim, &[date(2017, 8, 2)]).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "date,value,profit\n2017-08-02,5448.86,297.97\n"
        );
    }

    #[test]
    fn valuation_outside_window_fails() {
        let provider = market_2017();
        let adapter = basketrader::adapters::file_config_adapter::FileConfigAdapter::from_string(
            SIMULATION_INI,
        )
        .unwrap();
        let sim = Simulation::run(build_simulation_config(&adapter).unwrap(), &provider).unwrap();
        let err = cli::write_valuations(Vec::new(), &sim, &[date(2018, 1, 1)]).unwrap_err();
        assert!(matches!(err, TraderError::OutOfRange { .. }));
    }
}

mod end_to_end {
    use super::*;

    #[test]
    fn closing_over_price_files_succeeds() {
        let dir = price_dir();
        let cli = Cli::try_parse_from([
            "basketrader",
            "closing",
            "AAPL",
            "AMZN",
            "--from",
            "2017-05-01",
            "--to",
            "2017-05-03",
            "--data",
            dir.path().to_str().unwrap(),
        ])
        .unwrap();
        assert!(same_code(cli::run(cli), ExitCode::SUCCESS));
    }

    #[test]
    fn configured_basket_is_priced() {
        let dir = price_dir();
        let ini = format!(
            "[data]\npath = {}\n\n[basket.tech]\ncreated = 2017-05-01\nholdings = AAPL:2, AMZN:1\n",
            dir.path().display()
        );
        let file = write_temp_ini(&ini);
        let cli = Cli::try_parse_from([
            "basketrader",
            "price",
            "tech",
            "--date",
            "2017-05-02",
            "--config",
            file.path().to_str().unwrap(),
        ])
        .unwrap();
        assert!(same_code(cli::run(cli), ExitCode::SUCCESS));
    }

    #[test]
    fn mixed_case_basket_name_is_found() {
        let dir = price_dir();
        let ini = format!(
            "[data]\npath = {}\n\n[basket.Tech]\ncreated = 2017-05-01\nholdings = AAPL:2\n",
            dir.path().display()
        );
        let file = write_temp_ini(&ini);
        for name in ["Tech", "TECH", "tech"] {
            let cli = Cli::try_parse_from([
                "basketrader",
                "trend",
                name,
                "--from",
                "2017-05-01",
                "--to",
                "2017-05-03",
                "--config",
                file.path().to_str().unwrap(),
            ])
            .unwrap();
            assert!(same_code(cli::run(cli), ExitCode::SUCCESS));
        }
    }

    #[test]
    fn simulate_writes_end_date_valuation() {
        let dir = price_dir();
        let data = format!("[data]\npath = {}\n\n[simulation]", dir.path().display());
        let ini = SIMULATION_INI
            .replace("end_date = 2017-08-02", "end_date = 2017-05-03")
            .replace("[simulation]", &data);
        let file = write_temp_ini(&ini);
        let cli = Cli::try_parse_from([
            "basketrader",
            "simulate",
            "--config",
            file.path().to_str().unwrap(),
        ])
        .unwrap();
        assert!(same_code(cli::run(cli), ExitCode::SUCCESS));
    }

    #[test]
    fn unknown_name_exits_with_argument_code() {
        let dir = price_dir();
        let cli = Cli::try_parse_from([
            "basketrader",
            "trend",
            "MSFT",
            "--from",
            "2017-05-01",
            "--to",
            "2017-05-03",
            "--data",
            dir.path().to_str().unwrap(),
        ])
        .unwrap();
        assert!(same_code(cli::run(cli), ExitCode::from(3)));
    }

    #[test]
    fn too_many_series_exit_with_argument_code() {
        let dir = price_dir();
        let mut args: Vec<String> = vec!["basketrader".into(), "closing".into()];
        args.extend((0..12).map(|_| "AAPL".to_string()));
        args.extend(
            ["--from", "2017-05-01", "--to", "2017-05-03", "--data"]
                .iter()
                .map(|s| s.to_string()),
        );
        args.push(dir.path().display().to_string());
        let cli = Cli::try_parse_from(args).unwrap();
        assert!(same_code(cli::run(cli), ExitCode::from(3)));
    }

    #[test]
    fn simulate_dry_run_validates_config() {
        let file = write_temp_ini(SIMULATION_INI);
        let cli = Cli::try_parse_from([
            "basketrader",
            "simulate",
            "--config",
            file.path().to_str().unwrap(),
            "--dry-run",
        ])
        .unwrap();
        assert!(same_code(cli::run(cli), ExitCode::SUCCESS));
    }

    #[test]
    fn simulate_with_bad_config_exits_with_config_code() {
        let file = write_temp_ini(&SIMULATION_INI.replace("principal = 5000\n", ""));
        let cli = Cli::try_parse_from([
            "basketrader",
            "simulate",
            "--config",
            file.path().to_str().unwrap(),
        ])
        .unwrap();
        assert!(same_code(cli::run(cli), ExitCode::from(2)));
    }
}
