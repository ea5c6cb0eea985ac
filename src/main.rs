mod telemetry;
mod web;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

use crate::telemetry::PositionFetcher;
use crate::web::Config;

#[derive(Parser)]
#[command(name = "iss-tracker")]
#[command(about = "Live ISS position tracker with history and future ground track")]
struct Cli {
    /// YAML config file; built-in defaults are used when omitted
    #[arg(long, global = true)]
    config: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the polling service and HTTP API
    Serve,
    /// Fetch the current position once and print it
    Latest,
    /// Query the future ground track once and print it
    Future {
        /// Minutes ahead
        #[arg(short, long)]
        n: Option<i64>,
        /// Step in seconds
        #[arg(long)]
        step: Option<i64>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Some(path) = &cli.config {
        log::info!("Loaded config from {}", path);
    }

    match cli.command {
        Commands::Serve => serve(config).await,
        Commands::Latest => latest(config).await,
        Commands::Future { n, step } => future(config, n, step).await,
    }
}

async fn serve(config: Config) -> ExitCode {
    match web::run_server(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Server error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn latest(config: Config) -> ExitCode {
    let fetcher = match PositionFetcher::new(config.telemetry.fetcher_settings()) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Error creating client: {}", e);
            return ExitCode::FAILURE;
        }
    };

    print_json(&fetcher.fetch_latest().await)
}

async fn future(config: Config, n: Option<i64>, step: Option<i64>) -> ExitCode {
    let limits = config.telemetry.future;
    let fetcher = match PositionFetcher::new(config.telemetry.fetcher_settings()) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Error creating client: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let minutes = n.unwrap_or(limits.default_minutes);
    let step = step.unwrap_or(limits.default_step_seconds);
    match fetcher.fetch_future(minutes, step).await {
        Ok(track) => print_json(&track),
        Err(e) => {
            eprintln!("Future track failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> ExitCode {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error encoding output: {}", e);
            ExitCode::FAILURE
        }
    }
}
