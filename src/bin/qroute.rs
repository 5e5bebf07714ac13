//! Command-line entry point: generate a dataset, train the agent, or
//! evaluate a checkpoint against the nearest-neighbor baseline.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use q_routing::agent::DqnAgent;
use q_routing::config::Config;
use q_routing::dataset::{generate_simulated, Dataset};
use q_routing::distance::DistanceMatrix;
use q_routing::env::Environment;
use q_routing::evaluation::{
    evaluate, nearest_neighbor_baseline, write_records_csv, write_summary_csv, EvaluationOptions,
};
use q_routing::training::{analyze_convergence, train, CheckpointStore};
use q_routing::Result;

#[derive(Parser)]
#[command(name = "qroute", about = "Learned vehicle routing", version)]
struct Cli {
    /// Path to a JSON configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a simulated shipment dataset.
    Generate {
        /// Output CSV path.
        #[arg(long, default_value = "data/simulated_shipments.csv")]
        output: PathBuf,
        /// Number of delivery destinations.
        #[arg(long, default_value_t = 10)]
        stops: usize,
        /// Depot latitude.
        #[arg(long, default_value_t = -6.2088, allow_hyphen_values = true)]
        depot_lat: f64,
        /// Depot longitude.
        #[arg(long, default_value_t = 106.8456, allow_hyphen_values = true)]
        depot_lon: f64,
    },
    /// Train the agent on a dataset.
    Train {
        /// Dataset CSV path.
        #[arg(long, default_value = "data/simulated_shipments.csv")]
        data: PathBuf,
        /// Checkpoint directory.
        #[arg(long, default_value = "model/checkpoints")]
        checkpoint_dir: PathBuf,
        /// Metrics log output path.
        #[arg(long, default_value = "data/training_log.csv")]
        metrics: PathBuf,
    },
    /// Run greedy evaluation against the nearest-neighbor baseline.
    Evaluate {
        /// Dataset CSV path.
        #[arg(long, default_value = "data/simulated_shipments.csv")]
        data: PathBuf,
        /// Checkpoint to load; defaults to the latest in the directory.
        #[arg(long)]
        checkpoint: Option<PathBuf>,
        /// Checkpoint directory searched when no path is given.
        #[arg(long, default_value = "model/checkpoints")]
        checkpoint_dir: PathBuf,
        /// Number of greedy rollouts.
        #[arg(long, default_value_t = 50)]
        episodes: usize,
        /// Aggregate summary output path.
        #[arg(long, default_value = "data/evaluation_summary.csv")]
        summary: PathBuf,
        /// Per-episode records output path.
        #[arg(long, default_value = "data/evaluation_episodes.csv")]
        records: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => Config::from_json_path(path)?,
        None => Config::default(),
    };
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    match cli.command {
        Command::Generate {
            output,
            stops,
            depot_lat,
            depot_lon,
        } => {
            let dataset =
                generate_simulated(stops, depot_lat, depot_lon, config.horizon, &mut rng)?;
            if let Some(parent) = output.parent() {
                std::fs::create_dir_all(parent)?;
            }
            dataset.write_csv_path(&output)?;
            info!(path = %output.display(), stops, "generated simulated dataset");
        }
        Command::Train {
            data,
            checkpoint_dir,
            metrics,
        } => {
            let dataset = Dataset::from_csv_path(&data)?;
            info!(
                path = %data.display(),
                destinations = dataset.num_destinations(),
                "dataset loaded"
            );

            let mut env = Environment::new(dataset, config.env_options());
            let mut agent = DqnAgent::new(
                env.state_len(),
                env.action_len(),
                &config.agent_options(),
                &mut rng,
            );
            let store = CheckpointStore::new(&checkpoint_dir, "dqn");

            let log = train(
                &mut env,
                &mut agent,
                &config.training_options(),
                Some(&store),
                &mut rng,
            )?;

            if let Some(parent) = metrics.parent() {
                std::fs::create_dir_all(parent)?;
            }
            log.write_csv_path(&metrics)?;
            info!(path = %metrics.display(), episodes = log.len(), "metrics log written");

            if let Some(report) = analyze_convergence(&log, 50) {
                info!(
                    optimal_episode = report.optimal_episode,
                    optimal_moving_average = report.optimal_moving_average,
                    converged = report.converged,
                    "convergence diagnostics"
                );
            }
        }
        Command::Evaluate {
            data,
            checkpoint,
            checkpoint_dir,
            episodes,
            summary,
            records,
        } => {
            let dataset = Dataset::from_csv_path(&data)?;
            let distances = DistanceMatrix::from_stops(dataset.stops());
            let baseline = nearest_neighbor_baseline(&dataset, &distances, config.speed_kmh);

            let mut env = Environment::new(dataset, config.env_options());
            let mut agent = DqnAgent::new(
                env.state_len(),
                env.action_len(),
                &config.agent_options(),
                &mut rng,
            );

            let store = CheckpointStore::new(&checkpoint_dir, "dqn");
            let checkpoint_path = match checkpoint {
                Some(path) => Some(path),
                None => store.latest()?,
            };
            match checkpoint_path {
                Some(path) => match agent.load(&path) {
                    Ok(()) => {
                        agent.update_target();
                        info!(path = %path.display(), "checkpoint loaded");
                    }
                    Err(e) => {
                        warn!(error = %e, "checkpoint unusable, evaluating a fresh estimator");
                    }
                },
                None => {
                    warn!("no checkpoint found, evaluating a fresh estimator");
                }
            }

            let options = EvaluationOptions {
                episodes,
                max_steps: config.max_steps,
            };
            let (eval_summary, eval_records) =
                evaluate(&mut env, &mut agent, &baseline, &options, &mut rng)?;

            if let Some(parent) = summary.parent() {
                std::fs::create_dir_all(parent)?;
            }
            write_summary_csv(&summary, &eval_summary)?;
            write_records_csv(&records, &eval_records)?;

            println!("Evaluation summary (greedy):");
            println!("- episodes: {}", eval_summary.episodes);
            println!("- average_reward: {:.3}", eval_summary.average_reward);
            println!("- average_distance_km: {:.2}", eval_summary.average_distance);
            println!("- average_time_hours: {:.2}", eval_summary.average_time);
            println!(
                "- average_completion_rate: {:.1}%",
                eval_summary.average_completion_rate * 100.0
            );
            println!(
                "- average_utilization: {:.1}%",
                eval_summary.average_utilization
            );
            println!(
                "- capacity_violations: {}",
                eval_summary.capacity_violations
            );
            println!(
                "- time_window_violations: {}",
                eval_summary.time_window_violations
            );
            println!(
                "- baseline_distance_km: {:.2}",
                eval_summary.baseline_distance
            );
            println!("- route_efficiency: {:.1}%", eval_summary.route_efficiency);
            println!(
                "- distance_optimization: {:.1}%",
                eval_summary.distance_optimization
            );
        }
    }

    Ok(())
}
