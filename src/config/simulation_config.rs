use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct SimulationEnvConfig {
    /// Fixed seed for reproducible runs; unseeded when absent
    pub seed: Option<u64>,
}

impl SimulationEnvConfig {
    pub fn from_env() -> Self {
        let seed = env::var("SIMULATION_SEED")
            .ok()
            .and_then(|v| v.trim().parse().ok());

        Self { seed }
    }

    /// Seed for the market data generator
    pub fn generator_seed(&self) -> Option<u64> {
        self.seed
    }

    /// Seed for the ensemble's coin-flip signal, distinct from the generator's
    pub fn ensemble_seed(&self) -> Option<u64> {
        self.seed.map(|s| s.wrapping_add(1))
    }
}
