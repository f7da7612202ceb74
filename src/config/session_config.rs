//! Session configuration parsing from environment variables.
//!
//! Startup context and the artificial latencies of the simulated fetches.

use crate::domain::market::symbol::{SymbolCatalog, SymbolProfile};
use crate::domain::market::timeframe::Timeframe;
use anyhow::{Context, Result};
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Session environment configuration
#[derive(Debug, Clone)]
pub struct SessionEnvConfig {
    pub default_symbol: &'static SymbolProfile,
    pub default_timeframe: Timeframe,
    pub refresh_latency_ms: u64,
    pub analysis_latency_ms: u64,
    pub latency_jitter_ms: u64,
    pub min_refresh_interval_ms: u64,
    pub event_buffer: usize,
}

impl Default for SessionEnvConfig {
    fn default() -> Self {
        Self {
            default_symbol: SymbolCatalog::default_profile(),
            default_timeframe: Timeframe::FiveMin,
            refresh_latency_ms: 1000,
            analysis_latency_ms: 2000,
            latency_jitter_ms: 0,
            min_refresh_interval_ms: 5000,
            event_buffer: 64,
        }
    }
}

impl SessionEnvConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let symbol_code =
            env::var("DEFAULT_SYMBOL").unwrap_or_else(|_| SymbolCatalog::DEFAULT_CODE.to_string());
        let default_symbol = SymbolCatalog::lookup(&symbol_code)
            .context("Failed to resolve DEFAULT_SYMBOL")?;

        let timeframe_code = env::var("DEFAULT_TIMEFRAME").unwrap_or_else(|_| "5m".to_string());
        let default_timeframe =
            Timeframe::from_str(&timeframe_code).context("Failed to parse DEFAULT_TIMEFRAME")?;

        Ok(Self {
            default_symbol,
            default_timeframe,
            refresh_latency_ms: super::env_or("REFRESH_LATENCY_MS", defaults.refresh_latency_ms),
            analysis_latency_ms: super::env_or("ANALYSIS_LATENCY_MS", defaults.analysis_latency_ms),
            latency_jitter_ms: super::env_or("LATENCY_JITTER_MS", defaults.latency_jitter_ms),
            min_refresh_interval_ms: super::env_or(
                "MIN_REFRESH_INTERVAL_MS",
                defaults.min_refresh_interval_ms,
            ),
            event_buffer: super::env_or("EVENT_BUFFER", defaults.event_buffer),
        })
    }

    pub fn min_refresh_interval(&self) -> Duration {
        Duration::from_millis(self.min_refresh_interval_ms)
    }
}
