//! Strategy configuration parsing from environment variables.
//!
//! Decision thresholds come from individual variables; the rule table is
//! either the built-in five-signal table or a TOML file.

use crate::application::strategies::EnsembleThresholds;
use crate::domain::signals::SignalTable;
use anyhow::{Context, Result};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Strategy environment configuration
#[derive(Debug, Clone)]
pub struct StrategyEnvConfig {
    pub signal_rules_path: Option<PathBuf>,
    pub signal_table: SignalTable,
    pub thresholds: EnsembleThresholds,
}

impl StrategyEnvConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = EnsembleThresholds::default();
        let thresholds = EnsembleThresholds {
            buy_threshold: super::env_or("BUY_THRESHOLD", defaults.buy_threshold),
            sell_threshold: super::env_or("SELL_THRESHOLD", defaults.sell_threshold),
            confidence_cap: super::env_or("CONFIDENCE_CAP", defaults.confidence_cap),
            low_confidence_pct: super::env_or("LOW_CONFIDENCE_PCT", defaults.low_confidence_pct),
            high_risk_volatility: super::env_or(
                "HIGH_RISK_VOLATILITY",
                defaults.high_risk_volatility,
            ),
            medium_risk_volatility: super::env_or(
                "MEDIUM_RISK_VOLATILITY",
                defaults.medium_risk_volatility,
            ),
        };
        thresholds
            .validate()
            .context("Invalid strategy thresholds configuration")?;

        let signal_rules_path = env::var("SIGNAL_RULES_PATH")
            .ok()
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);

        let signal_table = match &signal_rules_path {
            Some(path) => load_signal_table(path)?,
            None => SignalTable::default(),
        };

        Ok(Self {
            signal_rules_path,
            signal_table,
            thresholds,
        })
    }
}

/// Reads and validates a `[[signals]]` rule table.
pub fn load_signal_table(path: &Path) -> Result<SignalTable> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read signal rules file: {}", path.display()))?;
    let table: SignalTable = toml::from_str(&content)
        .with_context(|| format!("Failed to parse signal rules TOML: {}", path.display()))?;
    table
        .validate()
        .with_context(|| format!("Rejected signal rules file: {}", path.display()))?;
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(name: &str, content: &str) -> PathBuf {
        let path = env::temp_dir().join(format!("{}-{}.toml", name, std::process::id()));
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_valid_table() {
        let path = write_temp(
            "signal-rules-valid",
            r#"
            [[signals]]
            name = "RSI"
            weight = 0.5
            rule = { kind = "oscillator", input = "rsi", oversold = 25.0, overbought = 75.0 }

            [[signals]]
            name = "Coin"
            weight = 0.5
            rule = { kind = "coin_flip" }
            "#,
        );
        let table = load_signal_table(&path).unwrap();
        assert_eq!(table.signals.len(), 2);
        assert_eq!(table.signals[1].name, "Coin");
        fs::remove_file(path).ok();
    }

    #[test]
    fn test_load_rejects_bad_weights() {
        let path = write_temp(
            "signal-rules-bad",
            r#"
            [[signals]]
            name = "MACD"
            weight = 0.7
            rule = { kind = "sign", input = "macd", threshold = 0.0 }
            "#,
        );
        let err = load_signal_table(&path).unwrap_err();
        assert!(format!("{err:#}").contains("weights sum to"));
        fs::remove_file(path).ok();
    }

    #[test]
    fn test_missing_file() {
        let err = load_signal_table(Path::new("/nonexistent/rules.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read signal rules file"));
    }
}
