mod ephemeris;
mod geo;
mod relay;
mod web;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use std::process::ExitCode;

use crate::web::{load_catalog, Config};

#[derive(Parser)]
#[command(name = "starlink-relay")]
#[command(about = "Shortest relay paths through the Starlink constellation")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        #[arg(short, long, default_value = "config.yaml")]
        config: String,
    },
    /// Compute one relay path and print it as GeoJSON
    Route {
        #[arg(short, long, default_value = "config.yaml")]
        config: String,
        from: String,
        to: String,
        /// Instant to route at (RFC3339), now when omitted
        #[arg(long)]
        at: Option<String>,
    },
    /// List the satellites loaded from the TLE folder
    Catalog {
        #[arg(short, long, default_value = "config.yaml")]
        config: String,
    },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { config } => serve(&config),
        Commands::Route {
            config,
            from,
            to,
            at,
        } => route(&config, &from, &to, at.as_deref()),
        Commands::Catalog { config } => catalog(&config),
    }
}

fn load_config(path: &str) -> Option<Config> {
    match Config::from_file(path) {
        Ok(c) => Some(c),
        Err(e) => {
            eprintln!("Error loading config {}: {}", path, e);
            None
        }
    }
}

fn serve(path: &str) -> ExitCode {
    let Some(config) = load_config(path) else {
        return ExitCode::FAILURE;
    };

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to start runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(web::run_server(config)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Server error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn route(path: &str, from: &str, to: &str, at: Option<&str>) -> ExitCode {
    let Some(config) = load_config(path) else {
        return ExitCode::FAILURE;
    };

    let at = match at {
        Some(s) => match DateTime::parse_from_rfc3339(s) {
            Ok(dt) => dt.with_timezone(&Utc),
            Err(e) => {
                eprintln!("Invalid --at timestamp {:?}: {}", s, e);
                return ExitCode::FAILURE;
            }
        },
        None => Utc::now(),
    };

    let gazetteer = match config.gazetteer() {
        Ok(g) => g,
        Err(e) => {
            eprintln!("Config error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let catalog = load_catalog(&config);
    let settings = config.relay.settings();

    let path = match relay::plan_route(&catalog, &gazetteer, &settings, from, to, at) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("No route: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match serde_json::to_string_pretty(&path.to_feature_collection()) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Failed to encode GeoJSON: {}", e);
            return ExitCode::FAILURE;
        }
    }

    eprintln!(
        "{} satellites, {:.1} km, {:.0} us round trip",
        path.hops.len(),
        path.distance_km,
        path.time_us
    );
    for (i, hop) in path.hops.iter().enumerate() {
        match path.links_km.get(i) {
            Some(link) => eprintln!("  {}: {} ({:.1} km to next)", i + 1, hop, link),
            None => eprintln!("  {}: {}", i + 1, hop),
        }
    }
    ExitCode::SUCCESS
}

fn catalog(path: &str) -> ExitCode {
    let Some(config) = load_config(path) else {
        return ExitCode::FAILURE;
    };

    let catalog = load_catalog(&config);
    println!("{} satellites loaded", catalog.len());
    for entry in catalog.entries() {
        println!(
            "  {:>6}  {:<24} epoch {}",
            entry.info.norad_id,
            entry.info.name,
            entry.epoch()
        );
    }
    ExitCode::SUCCESS
}
