//! Configuration module for Tradescope.
//!
//! This module provides structured configuration loading from environment variables,
//! organized by concern: Session, Simulation and Strategy.

mod session_config;
mod simulation_config;
mod strategy_config;

pub use session_config::SessionEnvConfig;
pub use simulation_config::SimulationEnvConfig;
pub use strategy_config::{StrategyEnvConfig, load_signal_table};

use anyhow::{Context, Result};
use std::env;
use std::str::FromStr;

/// Main application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub session: SessionEnvConfig,
    pub simulation: SimulationEnvConfig,
    pub strategy: StrategyEnvConfig,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Malformed numeric values fall back to their defaults. An unknown
    /// default symbol or timeframe, or an unusable rule table, is an error.
    pub fn from_env() -> Result<Self> {
        let session = SessionEnvConfig::from_env().context("Failed to load session config")?;
        let simulation = SimulationEnvConfig::from_env();
        let strategy = StrategyEnvConfig::from_env().context("Failed to load strategy config")?;

        Ok(Self {
            session,
            simulation,
            strategy,
        })
    }
}

/// Parses `key` from the environment, falling back to `default` when unset or
/// malformed.
fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
