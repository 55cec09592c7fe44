//! Self-play actor binary.
//!
//! Plays pawn-race games against itself with Monte Carlo tree search and
//! fills a replay buffer with labeled training positions. The buffer is
//! in-memory by default, or a SQLite database when `--replay-db-path` is
//! given.

use anyhow::Result;
use clap::Parser;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use std::time::{Instant, SystemTime, UNIX_EPOCH};
use tracing::{debug, info};

mod config;
mod selfplay;
mod storage;

use caissa_mcts::{MctsEngine, UniformEvaluator};
use games_pawnrace::PawnRace;

use crate::config::Config;
use crate::selfplay::SelfPlayGenerator;
use crate::storage::create_replay_store;

fn init_tracing(level: &str) -> Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    Ok(())
}

fn seed_rng(seed: Option<u64>) -> ChaCha20Rng {
    let seed = seed.unwrap_or_else(|| {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0)
    });
    info!(seed, "seeding rng");
    ChaCha20Rng::seed_from_u64(seed)
}

fn main() -> Result<()> {
    let config = Config::parse();
    config.validate()?;

    init_tracing(&config.log_level)?;
    info!(log_level = %config.log_level, "tracing initialized");

    let mut rng = seed_rng(config.seed);
    let mut store = create_replay_store(&config)?;
    info!(
        capacity = store.capacity(),
        backend = config.replay_db_path.as_deref().unwrap_or("memory"),
        "replay store ready"
    );

    let evaluator = UniformEvaluator;
    let engine = MctsEngine::new(&evaluator, config.search_config());
    let generator = SelfPlayGenerator::new(engine, config.selfplay_config());

    let started = Instant::now();
    let mut total_examples: usize = 0;

    for game in 0..config.games {
        let examples = generator.play_game(&PawnRace::new(), &mut rng)?;
        total_examples += examples.len();

        for example in examples {
            store.add(example.state, example.policy, example.value, None)?;
        }

        debug!(game, stored = store.len(), "game complete");
        if config.log_interval > 0 && (game + 1) % config.log_interval == 0 {
            info!(
                games = game + 1,
                examples = total_examples,
                stored = store.len(),
                elapsed_secs = started.elapsed().as_secs(),
                "self-play progress"
            );
        }
    }

    info!(
        games = config.games,
        examples = total_examples,
        stored = store.len(),
        elapsed_secs = started.elapsed().as_secs(),
        "self-play run finished"
    );

    Ok(())
}
