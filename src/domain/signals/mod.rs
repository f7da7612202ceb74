pub mod rules;

pub use rules::{RuleSpec, SampleField, SignalRule, SignalTable};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeAction {
    Buy,
    Sell,
    Hold,
}

impl fmt::Display for TradeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeAction::Buy => write!(f, "BUY"),
            TradeAction::Sell => write!(f, "SELL"),
            TradeAction::Hold => write!(f, "HOLD"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "LOW"),
            RiskLevel::Medium => write!(f, "MEDIUM"),
            RiskLevel::High => write!(f, "HIGH"),
        }
    }
}

/// Direction a sub-signal votes for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SignalBias {
    Bullish,
    Bearish,
    Neutral,
}

/// One weighted vote in the ensemble
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubSignal {
    pub name: String,
    /// -1, 0 or +1
    pub value: i8,
    pub weight: f64,
}

impl SubSignal {
    /// Contribution to the composite score
    pub fn impact(&self) -> f64 {
        f64::from(self.value) * self.weight
    }

    pub fn bias(&self) -> SignalBias {
        match self.value.signum() {
            1 => SignalBias::Bullish,
            -1 => SignalBias::Bearish,
            _ => SignalBias::Neutral,
        }
    }
}

/// Outcome of one analysis pass over the latest sample.
///
/// Holds no reference back to the series it was computed from; the session
/// drops it whenever the symbol or timeframe changes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalEnsembleResult {
    pub action: TradeAction,
    pub confidence_pct: f64,
    pub composite_score: f64,
    pub sub_signals: Vec<SubSignal>,
    pub risk_level: RiskLevel,
    pub current_price: f64,
    pub target_price: f64,
    pub stop_loss_price: f64,
    pub recommendations: Vec<String>,
    pub analyzed_at: DateTime<Utc>,
}

impl SignalEnsembleResult {
    /// Recomputes the composite score from the recorded sub-signals.
    pub fn recomputed_score(&self) -> f64 {
        self.sub_signals.iter().map(SubSignal::impact).sum()
    }
}
