//! soldash: run a training session with a live terminal dashboard.
//!
//! The manager runs on its own thread; the main thread polls snapshots
//! and reprints the dashboard until the session finishes.

use std::fs;
use std::path::PathBuf;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use solitaire_rl::{
    dashboard, GameConfig, LinearPolicy, Policy, SessionRng, SolitaireEncoder, StateEncoder,
    TrainConfig, TrainerManager, ACTION_SPACE,
};

#[derive(Debug, Parser)]
#[command(name = "soldash", about = "Solitaire training dashboard", version)]
struct Args {
    /// Number of worker threads (one trainer per worker)
    #[arg(long, default_value_t = 4)]
    threads: usize,

    /// Number of epochs (generation cycles) to run
    #[arg(long, default_value_t = 100)]
    epochs: u64,

    /// Session RNG seed
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Probability of dealing a stacked (more winnable) deck
    #[arg(long, default_value_t = 0.5)]
    stacked_probability: f64,

    /// Per-episode move budget (invalid attempts count)
    #[arg(long, default_value_t = 200)]
    max_moves: u32,

    /// Per-episode score floor
    #[arg(long, default_value_t = -50)]
    min_score: i64,

    /// Dashboard refresh interval in milliseconds
    #[arg(long, default_value_t = 250)]
    refresh_ms: u64,

    /// Where to write the best policy's exported parameters
    #[arg(long, default_value = "best_policy.bin")]
    out: PathBuf,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let config = TrainConfig::new()
        .with_threads(args.threads)
        .with_max_epochs(args.epochs)
        .with_max_moves(args.max_moves)
        .with_min_score(args.min_score)
        .with_seed(args.seed)
        .with_game(GameConfig::new().with_stacked_probability(args.stacked_probability));

    let encoder = Arc::new(SolitaireEncoder::new());
    let features = encoder.output_shape()[0];

    // Seed the population; the manager breeds from here.
    let mut seed_rng = SessionRng::new(args.seed ^ 0xD1CE);
    let population: Vec<Arc<dyn Policy>> = (0..args.threads)
        .map(|_| {
            Arc::new(LinearPolicy::new_random(&mut seed_rng, features, ACTION_SPACE))
                as Arc<dyn Policy>
        })
        .collect();

    // Config errors surface here, before any worker exists.
    let mut manager = TrainerManager::new(config, population, encoder)?;
    let handle = manager.handle();

    let (done_tx, done_rx) = mpsc::channel();
    let runner = thread::spawn(move || {
        let result = manager.run();
        let _ = done_tx.send(());
        result
    });

    loop {
        let snapshot = handle.snapshot();
        // Clear the terminal and redraw.
        print!("\x1B[2J\x1B[H{}", dashboard::render(&snapshot));

        match done_rx.recv_timeout(Duration::from_millis(args.refresh_ms)) {
            Ok(()) | Err(mpsc::RecvTimeoutError::Disconnected) => break,
            Err(mpsc::RecvTimeoutError::Timeout) => {}
        }
    }

    let report = runner.join().expect("manager thread panicked")?;

    println!("{}", dashboard::render(&handle.snapshot()));
    println!("Training complete after {} epochs.", report.epochs_run);
    for failure in &report.worker_failures {
        println!("Worker failure: {failure}");
    }
    if let Some(best) = report.best {
        println!(
            "Best worker {} (gen {}): score {}, {} moves, lineage {}",
            best.worker_id,
            best.generation,
            best.score,
            best.moves,
            report.best_lineage.as_deref().unwrap_or("-"),
        );
    }
    if !report.best_params.is_empty() {
        fs::write(&args.out, &report.best_params)?;
        info!(path = %args.out.display(), bytes = report.best_params.len(), "best policy saved");
    }

    Ok(())
}
