use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tour_planner::config::PlannerConfig;
use tour_planner::matrix::Metric;
use tour_planner::planner::build_planner;
use tour_planner::waypoint::Waypoint;
use tour_planner::{PlannerError, Result, logging};

#[derive(Debug, Parser)]
#[command(name = "tour-planner", about = "Order tour markers by walking distance")]
struct Cli {
    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// JSON output (and JSON logs)
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Compute a visiting order for the markers in a JSON file
    Optimize {
        /// JSON array of {"id", "lat", "lng"}; the first marker is the start
        #[arg(short, long)]
        input: PathBuf,

        #[arg(long, default_value = "distance")]
        metric: Metric,
    },
    /// Show this month's matrix request usage
    Usage,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.json);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "tour-planner failed");
            eprintln!("{}", err.user_message());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = PlannerConfig::from_env()?;
    tracing::debug!(?config, "configuration loaded");

    match &cli.command {
        Command::Optimize { input, metric } => {
            let raw = fs::read_to_string(input).map_err(|err| PlannerError::InvalidArgument {
                message: format!("cannot read {}: {err}", input.display()),
            })?;
            let markers: Vec<Waypoint> =
                serde_json::from_str(&raw).map_err(|err| PlannerError::InvalidArgument {
                    message: format!("{} is not a marker list: {err}", input.display()),
                })?;

            let planner = build_planner(&config)?.with_metric(*metric);
            let plan = planner.optimize_tour(&markers)?;

            if cli.json {
                print_json(&plan);
            } else {
                for (position, id) in plan.order.ids().iter().enumerate() {
                    println!("{:>3}  {}", position + 1, id);
                }
                println!(
                    "total: {:.0} m, {:.0} min",
                    plan.total_distance_m,
                    plan.total_duration_s / 60.0
                );
            }
        }
        Command::Usage => {
            let stats = build_planner(&config)?.usage_stats()?;
            if cli.json {
                print_json(&stats);
            } else {
                println!(
                    "{}: {}/{} matrix requests used, {} remaining",
                    stats.period, stats.count, stats.limit, stats.remaining
                );
            }
        }
    }

    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(rendered) => println!("{rendered}"),
        Err(err) => tracing::error!(error = %err, "cannot serialize output"),
    }
}
