/// Command-line front end for the flood risk service.
///
/// `predict` and `simulate` take their request either from flags or from a
/// JSON body (`--json request.json`, or `--json -` for stdin) and print the
/// JSON response. `evaluate` trains the scenario model and prints its
/// cross-validation report.
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;

use floodrisk_service::api::{PredictRequest, SimulateRequest};
use floodrisk_service::config::ServiceConfig;
use floodrisk_service::logging::{self, Component};
use floodrisk_service::scenario::{HashingEncoder, ScenarioFactorModel};
use floodrisk_service::service::FloodRiskService;

#[derive(Parser, Debug)]
#[command(name = "floodrisk", version, about = "Flood risk assessment and scenario simulation")]
struct Cli {
    /// TOML configuration file; compiled defaults are used when omitted
    #[arg(long, env = "FLOODRISK_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Instant risk assessment of current conditions
    Predict {
        /// Read the request body from a file, or `-` for stdin
        #[arg(long)]
        json: Option<String>,
        #[arg(long, default_value_t = 0.0)]
        rainfall: f64,
        #[arg(long, default_value_t = 0.0)]
        water_level: f64,
        #[arg(long, default_value_t = 0.0)]
        humidity: f64,
        #[arg(long, default_value_t = 0.0)]
        temperature: f64,
    },
    /// Multi-year simulation, optionally driven by a scenario description
    Simulate {
        /// Read the request body from a file, or `-` for stdin
        #[arg(long)]
        json: Option<String>,
        #[arg(long, default_value_t = 50.0)]
        rainfall: f64,
        #[arg(long, default_value_t = 2.0)]
        water_level: f64,
        #[arg(long, default_value_t = 60.0)]
        humidity: f64,
        #[arg(long, default_value_t = 20.0)]
        temperature: f64,
        #[arg(long, default_value = "")]
        scenario: String,
        /// Horizon in years (config default when omitted)
        #[arg(long)]
        years: Option<usize>,
    },
    /// Train the scenario model and print its cross-validation report
    Evaluate,
}

fn read_request<T: DeserializeOwned>(source: &str) -> Result<T> {
    let body = if source == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf).context("reading request from stdin")?;
        buf
    } else {
        fs::read_to_string(source).with_context(|| format!("reading request from {}", source))?
    };
    serde_json::from_str(&body).context("parsing request body")
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ServiceConfig::load(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => ServiceConfig::default(),
    };
    logging::init_logger(
        config.logging.level,
        config.logging.file.as_deref(),
        config.logging.timestamps,
    );

    match cli.command {
        Command::Predict {
            json,
            rainfall,
            water_level,
            humidity,
            temperature,
        } => {
            let request = match json {
                Some(source) => read_request(&source)?,
                None => PredictRequest {
                    rainfall,
                    water_level,
                    humidity,
                    temperature,
                },
            };
            let service = FloodRiskService::new(config);
            print_json(&service.predict(&request))
        }
        Command::Simulate {
            json,
            rainfall,
            water_level,
            humidity,
            temperature,
            scenario,
            years,
        } => {
            let request = match json {
                Some(source) => read_request(&source)?,
                None => SimulateRequest {
                    rainfall,
                    water_level,
                    humidity,
                    temperature,
                    scenario,
                    years,
                },
            };
            let (service, _) = FloodRiskService::from_config(config).context("starting service")?;
            let response = service.simulate(&request).map_err(|err| {
                logging::log_failure(Component::Service, Some("simulate"), "Simulation", &err);
                err
            })?;
            print_json(&response)
        }
        Command::Evaluate => {
            let settings = &config.scenario_model;
            let encoder = Box::new(HashingEncoder::new(settings.embedding_dimension));
            let (_, report) = ScenarioFactorModel::train(
                encoder,
                settings.boosting,
                settings.cv_folds.or(Some(5)),
                settings.seed,
            )
            .context("training scenario model")?;
            logging::info(Component::System, None, &format!("Report generated at {}", report.trained_at));
            print_json(&report)
        }
    }
}
