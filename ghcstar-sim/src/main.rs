//! GHCStar Deterministic Simulator CLI.
//!
//! Runs GHC round-trip simulations:
//! - Fuzzing: many simulations with randomized configurations.
//! - Replay: one simulation from a seed or a saved configuration.
//! - Stress: one long simulation over a noisy channel.

use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use std::process;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Instant;

use chrono::Utc;
use clap::Parser;
use ghcstar::GhcConfig;
use ghcstar_sim::{GhcSimulator, SimConfig, SimStats, load_json_config};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "GHCStar Deterministic Simulator", long_about = None)]
struct CliArgs {
    /// Run mode: fuzz, replay, or stress.
    #[arg(value_enum)]
    mode: RunMode,

    /// Seed for the simulation. Required for 'replay' without --config; master seed for 'fuzz'.
    #[arg(short, long)]
    seed: Option<u64>,

    /// Number of iterations (distinct SimConfig seeds) for 'fuzz' mode.
    #[arg(short = 'i', long, default_value_t = 1000)]
    iterations: usize,

    /// Number of headers to generate and process per simulation run.
    #[arg(short = 'p', long, default_value_t = 200)]
    packets: usize,

    /// Maximum packet loss probability (0.0 to 1.0) for fuzz mode.
    #[arg(long, default_value_t = 0.1)]
    max_loss: f64,

    /// Maximum single-bit corruption probability (0.0 to 1.0) for fuzz mode.
    #[arg(long, default_value_t = 0.05)]
    max_bit_error: f64,

    /// JSON file with a full SimConfig to replay.
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON file with a GhcConfig applied to every run.
    #[arg(long)]
    codec_config: Option<PathBuf>,

    /// Output file for logging failures.
    #[arg(short = 'o', long, default_value = "ghc_sim_failures.log")]
    output_file: PathBuf,

    /// Number of parallel workers for fuzzing. Defaults to number of logical CPUs.
    #[arg(short = 'w', long, default_value_t = num_cpus::get())]
    workers: usize,

    /// Log every frame at debug level.
    #[arg(short, long)]
    verbose: bool,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum RunMode {
    /// Fuzz with many random configurations.
    Fuzz,
    /// Replay one simulation from a seed or a saved configuration.
    Replay,
    /// Long-running stress test.
    Stress,
}

fn main() {
    let args = CliArgs::parse();
    init_tracing(args.verbose);

    let codec = match &args.codec_config {
        Some(path) => match load_json_config::<GhcConfig>(path) {
            Ok(codec) => Some(codec),
            Err(e) => {
                error!("{e}");
                process::exit(2);
            }
        },
        None => None,
    };

    match args.mode {
        RunMode::Fuzz => run_fuzz_mode(&args, codec),
        RunMode::Replay => run_replay_mode(&args, codec),
        RunMode::Stress => run_stress_mode(&args, codec),
    }
}

/// `RUST_LOG` wins; otherwise `info`, or `debug` with `--verbose`.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Generates a randomized `SimConfig` for a fuzzing iteration.
///
/// The same `iteration_seed` always yields the same configuration, which is what
/// makes `replay --seed` reproduce a fuzz failure.
///
/// # Configuration Randomization
/// - **Addresses**: 2-32 mesh nodes, link-local or global
/// - **Header shape**: length cap, zero-run and address-reuse probabilities
/// - **Channel**: 70% lossless, otherwise up to `max_loss`; 80% noiseless, otherwise
///   up to `max_bit_error`
/// - **Codec**: stop code and strict codebytes each toggled with 50% chance
fn generate_fuzz_config(
    iteration_seed: u64,
    num_packets_per_run: usize,
    max_loss: f64,
    max_bit_error: f64,
    codec: Option<GhcConfig>,
) -> SimConfig {
    let mut rng = StdRng::seed_from_u64(iteration_seed);

    let mut config = SimConfig {
        seed: rng.random(),
        num_packets: num_packets_per_run,
        node_count: rng.random_range(2..=32),
        max_header_len: rng.random_range(8..=127),
        zero_run_probability: rng.random_range(0.0..=0.5),
        address_reuse_probability: rng.random_range(0.0..=0.4),
        channel_packet_loss_probability: if rng.random_bool(0.7) {
            0.0
        } else {
            rng.random_range(0.0..=max_loss.clamp(0.0, 1.0))
        },
        channel_bit_error_probability: if rng.random_bool(0.8) {
            0.0
        } else {
            rng.random_range(0.0..=max_bit_error.clamp(0.0, 1.0))
        },
        codec: GhcConfig {
            emit_stop_code: rng.random_bool(0.5),
            strict_codebytes: rng.random_bool(0.5),
            ..Default::default()
        },
    };
    if let Some(codec) = codec {
        config.codec = codec;
    }
    config
}

/// Runs many randomized simulations in parallel.
///
/// Every `SimError` is a critical failure: corrupted frames are already absorbed
/// into the run's statistics, so an error means an intact frame did not survive.
/// Failing configurations are appended to the output file as JSON so they can be
/// replayed with `replay --config`.
///
/// Exits with status 1 if any critical failure was found. Ctrl+C stops the
/// campaign after in-flight iterations finish.
fn run_fuzz_mode(args: &CliArgs, codec: Option<GhcConfig>) {
    info!(
        iterations = args.iterations,
        packets = args.packets,
        max_loss = args.max_loss,
        max_bit_error = args.max_bit_error,
        workers = args.workers,
        "Starting fuzz mode"
    );
    let start_time = Instant::now();

    let output_file = match File::create(&args.output_file) {
        Ok(file) => Mutex::new(file),
        Err(e) => {
            error!("Failed to create output file {}: {e}", args.output_file.display());
            process::exit(2);
        }
    };

    let running = std::sync::Arc::new(AtomicBool::new(true));
    let running_ctrlc = running.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        warn!("Ctrl+C detected, stopping workers");
        running_ctrlc.store(false, Ordering::SeqCst);
    }) {
        warn!("Failed to install Ctrl+C handler: {e}");
    }

    let master_seed = args.seed.unwrap_or_else(rand::random);
    info!(master_seed, "Master seed for generating SimConfig seeds");
    let mut master_rng = StdRng::seed_from_u64(master_seed);
    let iteration_seeds: Vec<u64> = (0..args.iterations).map(|_| master_rng.random()).collect();

    let pool = match rayon::ThreadPoolBuilder::new()
        .num_threads(args.workers.max(1))
        .build()
    {
        Ok(pool) => pool,
        Err(e) => {
            error!("Failed to build worker pool: {e}");
            process::exit(2);
        }
    };

    let completed = AtomicUsize::new(0);
    let critical_failures = AtomicUsize::new(0);
    let totals = Mutex::new(SimStats::default());

    pool.install(|| {
        iteration_seeds.par_iter().for_each(|&iteration_seed| {
            if !running.load(Ordering::Relaxed) {
                return;
            }
            let config = generate_fuzz_config(
                iteration_seed,
                args.packets,
                args.max_loss,
                args.max_bit_error,
                codec,
            );
            let mut simulator = GhcSimulator::new(config.clone());

            match simulator.run() {
                Ok(stats) => {
                    if let Ok(mut totals) = totals.lock() {
                        totals.merge(&stats);
                    }
                }
                Err(sim_error) => {
                    critical_failures.fetch_add(1, Ordering::Relaxed);
                    error!(iteration_seed, %sim_error, "Critical failure");
                    let config_json = serde_json::to_string_pretty(&config)
                        .unwrap_or_else(|e| format!("<unserializable config: {e}>"));
                    let entry = format!(
                        "{} - CRITICAL FAILURE - Seed {}: {}\nConfig: {}\n\n",
                        Utc::now().to_rfc3339(),
                        iteration_seed,
                        sim_error,
                        config_json
                    );
                    if let Ok(mut file) = output_file.lock() {
                        let _ = file.write_all(entry.as_bytes());
                        let _ = file.flush();
                    }
                }
            }

            let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
            if done % 100 == 0 || done == args.iterations {
                info!(
                    done,
                    total = args.iterations,
                    critical = critical_failures.load(Ordering::Relaxed),
                    "Progress"
                );
            }
        });
    });

    let final_completed = completed.load(Ordering::SeqCst);
    let final_critical = critical_failures.load(Ordering::SeqCst);
    let totals = totals.into_inner().unwrap_or_default();

    println!("\n--- Fuzzing Run Summary ---");
    println!(
        "Total iterations attempted/completed: {} / {}",
        args.iterations, final_completed
    );
    println!("Duration: {:.2?}", start_time.elapsed());
    println!(
        "Frames: {} sent, {} lost, {} verified, {} corrupted ({} rejected, {} undetected)",
        totals.packets_sent,
        totals.packets_lost,
        totals.packets_verified,
        totals.packets_corrupted,
        totals.corruption_rejected,
        totals.corruption_undetected
    );
    println!("Compression ratio: {:.3}", totals.compression_ratio());
    println!("Critical Failures: {}", final_critical);
    if !running.load(Ordering::SeqCst) {
        println!("Fuzzing was interrupted.");
    }
    if final_critical > 0 {
        println!(
            "FAIL: Critical failures found. Check '{}'.",
            args.output_file.display()
        );
        process::exit(1);
    }
    println!("PASS: No critical failures detected.");
}

/// Replays one scenario, from `--config` if given, otherwise regenerated from `--seed`
/// exactly as fuzz mode would.
fn run_replay_mode(args: &CliArgs, codec: Option<GhcConfig>) {
    let config = match (&args.config, args.seed) {
        (Some(path), _) => match load_json_config::<SimConfig>(path) {
            Ok(mut config) => {
                if let Some(codec) = codec {
                    config.codec = codec;
                }
                config
            }
            Err(e) => {
                error!("{e}");
                process::exit(2);
            }
        },
        (None, Some(seed)) => {
            generate_fuzz_config(seed, args.packets, args.max_loss, args.max_bit_error, codec)
        }
        (None, None) => {
            error!("Replay mode requires --seed <VALUE> or --config <FILE>");
            process::exit(2);
        }
    };
    println!("Replaying with Config: {:#?}", config);

    let mut simulator = GhcSimulator::new(config);
    match simulator.run() {
        Ok(stats) => println!("SUCCESS: Replay completed without errors: {:?}", stats),
        Err(e) => {
            eprintln!("FAILURE: Replay resulted in error: {}", e);
            process::exit(1);
        }
    }
}

/// Runs a single long simulation with steady loss and corruption.
fn run_stress_mode(args: &CliArgs, codec: Option<GhcConfig>) {
    let seed = args.seed.unwrap_or_else(rand::random);
    let config = SimConfig {
        seed,
        num_packets: args.packets.max(100_000),
        node_count: 64,
        max_header_len: 127,
        channel_packet_loss_probability: 0.01,
        channel_bit_error_probability: 0.01,
        codec: codec.unwrap_or(SimConfig::default().codec),
        ..Default::default()
    };

    println!("Running stress iteration with config: {:#?}", config);
    let mut simulator = GhcSimulator::new(config.clone());
    let start_time = Instant::now();
    match simulator.run() {
        Ok(stats) => {
            println!(
                "Stress iteration completed in {:.2?}: {} verified, ratio {:.3}.",
                start_time.elapsed(),
                stats.packets_verified,
                stats.compression_ratio()
            );
        }
        Err(e) => {
            eprintln!(
                "Stress iteration FAILED after {:.2?} with error: {}",
                start_time.elapsed(),
                e
            );
            eprintln!("Failing Config: {:#?}", config);
            process::exit(1);
        }
    }
}
