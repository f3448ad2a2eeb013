use std::path::PathBuf;
use std::process::ExitCode;

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};

use meteo_service::config::{self, ServiceConfig};
use meteo_service::ingest::open_meteo;
use meteo_service::locations::{self, LOCATION_REGISTRY};
use meteo_service::logging::{self, Source};
use meteo_service::model::QueryMode;
use meteo_service::report::{self, QueryContext};
use meteo_service::verify;

#[derive(Parser)]
#[command(version, about = "Hourly weather statistics, correlations and alerts")]
struct Cli {
    /// Configuration file (defaults to $METEO_CONFIG, then ./meteo.toml)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Fetch and analyse one location
    Analyze {
        /// Location id from `locations`
        #[arg(long)]
        location: String,
        /// Analyse the upcoming forecast instead of archive data
        #[arg(long, conflicts_with = "end_date")]
        forecast: bool,
        /// Last day of the 48-hour archive window (YYYY-MM-DD)
        #[arg(long, value_name = "DATE")]
        end_date: Option<NaiveDate>,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the registered locations
    Locations,
    /// Check every location against the live API
    Verify {
        #[arg(long)]
        json: bool,
    },
}

type CliResult = Result<(), Box<dyn std::error::Error>>;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config_path = config::resolve_config_path(cli.config.as_deref());
    let config = match ServiceConfig::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("✗ {}", e);
            return ExitCode::FAILURE;
        }
    };
    logging::init_logger(
        config.logging.level,
        config.logging.file.as_deref(),
        config.logging.timestamps,
    );

    let outcome = match cli.cmd {
        Cmd::Analyze {
            location,
            forecast,
            end_date,
            json,
        } => run_analyze(&config, &location, forecast, end_date, json),
        Cmd::Locations => {
            for location in LOCATION_REGISTRY {
                println!("{:>3}  {:<12} {}", location.id, location.name, location.coordinates_label());
            }
            Ok(())
        }
        Cmd::Verify { json } => run_verify(&config, json),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("✗ {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_analyze(
    config: &ServiceConfig,
    location_id: &str,
    forecast: bool,
    end_date: Option<NaiveDate>,
    json: bool,
) -> CliResult {
    let location = locations::find_location(location_id).ok_or_else(|| {
        format!(
            "unknown location '{}' (known: {})",
            location_id,
            locations::all_location_ids().join(", ")
        )
    })?;

    let today = Local::now().date_naive();
    let client = open_meteo::build_client(&config.api)?;

    let (mode, fetched) = if forecast {
        (
            QueryMode::Forecast,
            open_meteo::fetch_forecast(&client, &config.api, location.latitude, location.longitude, today),
        )
    } else {
        let end = match end_date {
            Some(end) => end,
            None => open_meteo::latest_archive_date(today, config.api.historical_lag_days)?,
        };
        (
            QueryMode::Historical,
            open_meteo::fetch_historical(&client, &config.api, location.latitude, location.longitude, end, today),
        )
    };

    let (bundle, range) = fetched?;

    logging::info(
        Source::Analysis,
        Some(location.id),
        &format!("analysing {} hourly samples ({} to {})", bundle.len(), range.start, range.end),
    );

    let context = QueryContext {
        location: location.clone(),
        range,
        mode,
    };
    let analysis = report::analyze_bundle(&bundle, context, &config.thresholds);

    if json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
    } else {
        print!("{}", report::render_text(&analysis));
    }
    Ok(())
}

fn run_verify(config: &ServiceConfig, json: bool) -> CliResult {
    let report = verify::run_full_verification(&config.api)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        verify::print_summary(&report);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_analyze_flags() {
        let cli = Cli::try_parse_from([
            "meteo-service",
            "analyze",
            "--location",
            "2",
            "--end-date",
            "2024-05-01",
            "--json",
        ])
        .expect("valid arguments");
        match cli.cmd {
            Cmd::Analyze {
                location,
                forecast,
                end_date,
                json,
            } => {
                assert_eq!(location, "2");
                assert!(!forecast);
                assert_eq!(end_date, NaiveDate::from_ymd_opt(2024, 5, 1));
                assert!(json);
            }
            _ => panic!("expected analyze"),
        }
    }

    #[test]
    fn test_forecast_conflicts_with_end_date() {
        let result = Cli::try_parse_from([
            "meteo-service",
            "analyze",
            "--location",
            "1",
            "--forecast",
            "--end-date",
            "2024-05-01",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_location_fails_before_any_request() {
        let err = run_analyze(&ServiceConfig::default(), "99", false, None, false)
            .expect_err("location 99 is not registered");
        assert_eq!(err.to_string(), "unknown location '99' (known: 1, 2, 3, 4, 5, 6)");
    }
}
