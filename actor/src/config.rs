//! Configuration for the self-play actor.

use anyhow::{anyhow, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};
use tracing::level_filters::LevelFilter;

use crate::selfplay::{MoveSelection, SelfPlayConfig};
use caissa_mcts::SearchConfig;

#[derive(Parser, Debug, Clone, Serialize, Deserialize)]
#[command(name = "actor")]
#[command(about = "Caissa actor - self-play game generator")]
#[command(
    long_about = "Plays games against itself with Monte Carlo tree search and
fills a replay buffer with labeled training positions.

The buffer lives in memory by default; pass --replay-db-path to persist it
to SQLite so a later run can resume the same buffer."
)]
pub struct Config {
    /// Number of self-play games to run
    #[arg(long, default_value_t = 10)]
    pub games: u32,

    /// Tree search simulations per move
    #[arg(long, default_value_t = 800)]
    pub num_simulations: u32,

    /// Exploration constant for move selection inside the search
    #[arg(long, default_value_t = 1.5)]
    pub c_puct: f32,

    /// Dirichlet concentration for root exploration noise (0 disables)
    #[arg(long, default_value_t = 0.03)]
    pub dirichlet_alpha: f32,

    /// Fraction of root priors replaced by noise
    #[arg(long, default_value_t = 0.25)]
    pub dirichlet_epsilon: f32,

    /// Move sampling temperature for the opening phase
    #[arg(long, default_value_t = 1.0)]
    pub temperature: f32,

    /// Temperature after the threshold ply, for more decisive endgames
    #[arg(long, default_value_t = 0.1)]
    pub late_temperature: f32,

    /// Ply after which the late temperature applies (0 to disable)
    #[arg(long, default_value_t = 30)]
    pub temp_threshold: u32,

    /// Always play the most-visited move instead of sampling
    #[arg(long, default_value_t = false)]
    pub argmax: bool,

    /// Skip recording positions where the chosen move is a capture
    #[arg(long, default_value_t = false)]
    pub filter_quiet: bool,

    /// Cut games off after this many plies and score them as draws
    #[arg(long, default_value_t = 200)]
    pub max_plies: u32,

    /// Replay buffer capacity in positions
    #[arg(long, default_value_t = 100_000)]
    pub replay_capacity: usize,

    /// Path to a SQLite replay database; omit for an in-memory buffer
    #[arg(long)]
    pub replay_db_path: Option<String>,

    /// RNG seed; omit for a time-based seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value_t = String::from("info"))]
    pub log_level: String,

    /// Log progress every N games (0 to disable)
    #[arg(long, default_value_t = 10)]
    pub log_interval: u32,
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.games == 0 {
            return Err(anyhow!("games must be greater than 0"));
        }

        if self.num_simulations == 0 {
            return Err(anyhow!("num_simulations must be greater than 0"));
        }

        if self.c_puct <= 0.0 {
            return Err(anyhow!("c_puct must be positive"));
        }

        if !(0.0..=1.0).contains(&self.dirichlet_epsilon) {
            return Err(anyhow!("dirichlet_epsilon must be in [0, 1]"));
        }

        if self.temperature <= 0.0 || self.late_temperature <= 0.0 {
            return Err(anyhow!("temperatures must be positive"));
        }

        if self.max_plies == 0 {
            return Err(anyhow!("max_plies must be greater than 0"));
        }

        if self.replay_capacity == 0 {
            return Err(anyhow!("replay_capacity must be greater than 0"));
        }

        if self.log_level.parse::<LevelFilter>().is_err() {
            return Err(anyhow!(
                "invalid log level '{}', expected one of trace, debug, info, warn, error",
                self.log_level
            ));
        }

        Ok(())
    }

    pub fn search_config(&self) -> SearchConfig {
        SearchConfig::default()
            .with_simulations(self.num_simulations)
            .with_c_puct(self.c_puct)
            .with_dirichlet(self.dirichlet_alpha, self.dirichlet_epsilon)
    }

    pub fn selfplay_config(&self) -> SelfPlayConfig {
        SelfPlayConfig {
            temperature: self.temperature,
            late_temperature: self.late_temperature,
            temperature_threshold: self.temp_threshold,
            move_selection: if self.argmax {
                MoveSelection::Argmax
            } else {
                MoveSelection::Stochastic
            },
            filter_quiet: self.filter_quiet,
            max_plies: self.max_plies,
        }
    }
}
