use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use metro_router::builder::{self, BuildConfig};
use metro_router::domain::Network;
use metro_router::feed;
use metro_router::router::{Algorithm, RouteConfig, find_path};
use metro_router::validate::validate;

#[derive(Parser)]
#[command(
    name = "metro-router",
    about = "Build and query a metro network from a GTFS feed"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build a network snapshot from a GTFS directory.
    Build {
        /// Directory containing stops.txt, routes.txt, trips.txt,
        /// stop_times.txt and optionally shapes.txt.
        #[arg(long)]
        gtfs: PathBuf,

        /// Where to write the network snapshot.
        #[arg(long, default_value = "station_network.json")]
        out: PathBuf,

        /// Build policy file (JSON). Defaults apply when omitted.
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Find the shortest route between two stations.
    Route {
        /// Network snapshot produced by `build`.
        #[arg(long, default_value = "station_network.json")]
        network: PathBuf,

        start: String,
        goal: String,

        /// Search cost (km) charged per line change.
        #[arg(long, default_value_t = 1.5)]
        transfer_penalty: f64,
    },

    /// Check a network snapshot against the build policy.
    Validate {
        #[arg(long, default_value = "station_network.json")]
        network: PathBuf,

        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Build { gtfs, out, config } => run_build(&gtfs, &out, config.as_deref()),
        Command::Route {
            network,
            start,
            goal,
            transfer_penalty,
        } => run_route(&network, &start, &goal, transfer_penalty),
        Command::Validate { network, config } => run_validate(&network, config.as_deref()),
    };

    match result {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<BuildConfig, Box<dyn Error>> {
    match path {
        Some(path) => {
            let raw = fs::read_to_string(path)?;
            Ok(serde_json::from_str(&raw)?)
        }
        None => Ok(BuildConfig::default()),
    }
}

fn load_network(path: &Path) -> Result<Network, Box<dyn Error>> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

fn run_build(gtfs: &Path, out: &Path, config: Option<&Path>) -> Result<ExitCode, Box<dyn Error>> {
    let config = load_config(config)?;

    println!("Loading GTFS data from {}...", gtfs.display());
    let feed = feed::read_feed(gtfs)?;

    println!("Processing {} trips...", feed.trips.len());
    let (network, report) = builder::build(&feed, &config);

    for skipped in &report.skipped {
        eprintln!("skipped trip {}: {}", skipped.trip_id, skipped.reason);
    }

    let json = serde_json::to_string_pretty(&network)?;
    fs::write(out, json)?;

    println!(
        "Wrote {} ({} stations, {} edges, {} lines, {} trips skipped)",
        out.display(),
        network.station_count(),
        network.edge_count(),
        network.lines.len(),
        report.skipped.len(),
    );
    Ok(ExitCode::SUCCESS)
}

fn run_route(
    network_path: &Path,
    start: &str,
    goal: &str,
    transfer_penalty: f64,
) -> Result<ExitCode, Box<dyn Error>> {
    let network = load_network(network_path)?;

    println!("Finding shortest route from {start} to {goal}...\n");

    let dijkstra_config = RouteConfig {
        algorithm: Algorithm::Dijkstra,
        transfer_penalty_km: transfer_penalty,
    };
    let astar_config = RouteConfig {
        algorithm: Algorithm::AStar,
        transfer_penalty_km: transfer_penalty,
    };

    let started = Instant::now();
    let dijkstra = find_path(&network, start, goal, &dijkstra_config)?;
    let dijkstra_ms = started.elapsed().as_secs_f64() * 1000.0;

    let started = Instant::now();
    let astar = find_path(&network, start, goal, &astar_config)?;
    let astar_ms = started.elapsed().as_secs_f64() * 1000.0;

    let Some(itinerary) = astar.itinerary else {
        println!("No route found between these stations.");
        return Ok(ExitCode::SUCCESS);
    };

    println!("Total Distance: {:.2} km", itinerary.total_km);
    println!("Lines: {}", itinerary.lines.join(", "));
    println!("Number of Stations: {}", itinerary.stops);

    println!("\n--- Algorithm Comparison ---");
    println!("{:<10} | {:<15} | {:<10}", "Algorithm", "Nodes Visited", "Time (ms)");
    println!("{}", "-".repeat(40));
    println!(
        "{:<10} | {:<15} | {:.3}",
        "Dijkstra", dijkstra.nodes_visited, dijkstra_ms
    );
    println!("{:<10} | {:<15} | {:.3}", "A*", astar.nodes_visited, astar_ms);

    println!("\nRoute:");
    println!("{}", itinerary.route.join(" -> "));
    Ok(ExitCode::SUCCESS)
}

fn run_validate(network_path: &Path, config: Option<&Path>) -> Result<ExitCode, Box<dyn Error>> {
    let config = load_config(config)?;
    let network = load_network(network_path)?;

    let violations = validate(&network, &config);
    if violations.is_empty() {
        println!("Network validation succeeded: all checks pass");
        return Ok(ExitCode::SUCCESS);
    }

    for violation in &violations {
        eprintln!("{violation}");
    }
    eprintln!("Network validation failed: {} violation(s)", violations.len());
    Ok(ExitCode::from(2))
}
