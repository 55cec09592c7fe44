//! Search configuration parameters.

/// Configuration for PUCT Monte Carlo Tree Search.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Number of simulations to run per search.
    pub num_simulations: u32,

    /// Exploration constant in the PUCT formula.
    /// Higher values encourage exploration, lower values favor exploitation.
    pub c_puct: f32,

    /// Dirichlet concentration for root exploration noise.
    /// Chess-sized action spaces use a small alpha (~0.03).
    /// Set to 0.0 to disable noise (for evaluation/inference).
    pub dirichlet_alpha: f32,

    /// Fraction of each root prior that comes from noise.
    /// 0.25 means 75% network prior + 25% noise.
    pub dirichlet_epsilon: f32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            num_simulations: 800,
            c_puct: 1.5,
            dirichlet_alpha: 0.03,
            dirichlet_epsilon: 0.25,
        }
    }
}

impl SearchConfig {
    /// Config for self-play training (with exploration noise).
    pub fn for_training() -> Self {
        Self::default()
    }

    /// Config for evaluation/inference (no root noise).
    pub fn for_evaluation() -> Self {
        Self {
            dirichlet_alpha: 0.0,
            dirichlet_epsilon: 0.0,
            ..Self::default()
        }
    }

    /// Fast config for tests.
    pub fn for_testing() -> Self {
        Self {
            num_simulations: 32,
            c_puct: 1.5,
            dirichlet_alpha: 0.0,
            dirichlet_epsilon: 0.0,
        }
    }

    /// Builder pattern: set number of simulations.
    pub fn with_simulations(mut self, n: u32) -> Self {
        self.num_simulations = n;
        self
    }

    /// Builder pattern: set the exploration constant.
    pub fn with_c_puct(mut self, c: f32) -> Self {
        self.c_puct = c;
        self
    }

    /// Builder pattern: set root noise parameters.
    pub fn with_dirichlet(mut self, alpha: f32, epsilon: f32) -> Self {
        self.dirichlet_alpha = alpha;
        self.dirichlet_epsilon = epsilon;
        self
    }
}
