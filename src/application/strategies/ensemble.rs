use super::recommendations::recommendations;
use crate::domain::errors::DashboardError;
use crate::domain::market::types::PriceSample;
use crate::domain::ports::RandomSource;
use crate::domain::signals::{
    RiskLevel, SignalEnsembleResult, SignalTable, SubSignal, TradeAction,
};
use chrono::Utc;
use std::fmt;
use tracing::debug;

/// Decision thresholds applied to the composite score and VWAP deviation.
///
/// All comparisons are strict: a score of exactly `buy_threshold` is a HOLD,
/// a deviation of exactly `high_risk_volatility` is MEDIUM.
#[derive(Debug, Clone, PartialEq)]
pub struct EnsembleThresholds {
    pub buy_threshold: f64,
    pub sell_threshold: f64,
    pub confidence_cap: f64,
    pub low_confidence_pct: f64,
    pub high_risk_volatility: f64,
    pub medium_risk_volatility: f64,
}

impl Default for EnsembleThresholds {
    fn default() -> Self {
        Self {
            buy_threshold: 0.2,
            sell_threshold: -0.2,
            confidence_cap: 95.0,
            low_confidence_pct: 60.0,
            high_risk_volatility: 0.02,
            medium_risk_volatility: 0.01,
        }
    }
}

impl EnsembleThresholds {
    /// Rejects thresholds that would break the action or risk ordering or
    /// let confidence exceed 95%.
    pub fn validate(&self) -> Result<(), DashboardError> {
        let invalid = |reason: String| Err(DashboardError::InvalidThresholds { reason });

        let values = [
            ("buy_threshold", self.buy_threshold),
            ("sell_threshold", self.sell_threshold),
            ("confidence_cap", self.confidence_cap),
            ("low_confidence_pct", self.low_confidence_pct),
            ("high_risk_volatility", self.high_risk_volatility),
            ("medium_risk_volatility", self.medium_risk_volatility),
        ];
        if let Some((name, value)) = values.iter().find(|(_, v)| !v.is_finite()) {
            return invalid(format!("{name} must be finite, got {value}"));
        }
        if self.sell_threshold > self.buy_threshold {
            return invalid(format!(
                "sell_threshold {} is above buy_threshold {}",
                self.sell_threshold, self.buy_threshold
            ));
        }
        if !(0.0..=95.0).contains(&self.confidence_cap) {
            return invalid(format!(
                "confidence_cap {} outside [0, 95]",
                self.confidence_cap
            ));
        }
        if self.medium_risk_volatility < 0.0
            || self.medium_risk_volatility > self.high_risk_volatility
        {
            return invalid(format!(
                "risk bands must satisfy 0 <= medium ({}) <= high ({})",
                self.medium_risk_volatility, self.high_risk_volatility
            ));
        }
        Ok(())
    }
}

/// Target and stop multipliers per action
const BUY_TARGET: f64 = 1.02;
const BUY_STOP: f64 = 0.99;
const SELL_TARGET: f64 = 0.98;
const SELL_STOP: f64 = 1.01;

/// Weighted signal ensemble
///
/// Evaluates every rule of the signal table against the latest sample, sums
/// `value * weight` into a composite score and derives the action, confidence,
/// risk level, price targets and advice lines from it.
pub struct SignalEnsemble {
    table: SignalTable,
    thresholds: EnsembleThresholds,
    rng: Box<dyn RandomSource>,
}

impl SignalEnsemble {
    /// Builds an ensemble over a validated rule table and thresholds.
    pub fn new(
        table: SignalTable,
        thresholds: EnsembleThresholds,
        rng: Box<dyn RandomSource>,
    ) -> Result<Self, DashboardError> {
        table.validate()?;
        thresholds.validate()?;
        Ok(Self {
            table,
            thresholds,
            rng,
        })
    }

    /// Default five-signal table with default thresholds
    pub fn with_defaults(rng: Box<dyn RandomSource>) -> Self {
        Self {
            table: SignalTable::default(),
            thresholds: EnsembleThresholds::default(),
            rng,
        }
    }

    pub fn table(&self) -> &SignalTable {
        &self.table
    }

    pub fn thresholds(&self) -> &EnsembleThresholds {
        &self.thresholds
    }

    /// Analyzes the newest sample of `series`.
    pub fn analyze(&mut self, series: &[PriceSample]) -> Result<SignalEnsembleResult, DashboardError> {
        let latest = series.last().ok_or(DashboardError::EmptySeries)?;
        Ok(self.analyze_sample(latest))
    }

    pub fn analyze_sample(&mut self, sample: &PriceSample) -> SignalEnsembleResult {
        let sub_signals: Vec<SubSignal> = self
            .table
            .signals
            .iter()
            .map(|spec| SubSignal {
                name: spec.name.clone(),
                value: spec.rule.evaluate(sample, &mut self.rng),
                weight: spec.weight,
            })
            .collect();

        let composite_score: f64 = sub_signals.iter().map(SubSignal::impact).sum();
        let confidence_pct = (composite_score.abs() * 100.0).min(self.thresholds.confidence_cap);
        let action = self.classify_action(composite_score);
        let risk_level = self.classify_risk(sample.vwap_deviation());
        let (target_price, stop_loss_price) = price_targets(action, sample.price);

        debug!(
            score = composite_score,
            %action,
            %risk_level,
            confidence = confidence_pct,
            "Ensemble analysis complete"
        );

        SignalEnsembleResult {
            action,
            confidence_pct,
            composite_score,
            sub_signals,
            risk_level,
            current_price: sample.price,
            target_price,
            stop_loss_price,
            recommendations: recommendations(
                action,
                risk_level,
                confidence_pct,
                self.thresholds.low_confidence_pct,
            ),
            analyzed_at: Utc::now(),
        }
    }

    pub fn classify_action(&self, composite_score: f64) -> TradeAction {
        if composite_score > self.thresholds.buy_threshold {
            TradeAction::Buy
        } else if composite_score < self.thresholds.sell_threshold {
            TradeAction::Sell
        } else {
            TradeAction::Hold
        }
    }

    /// `volatility` is |price - vwap| / vwap
    pub fn classify_risk(&self, volatility: f64) -> RiskLevel {
        if volatility > self.thresholds.high_risk_volatility {
            RiskLevel::High
        } else if volatility > self.thresholds.medium_risk_volatility {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

/// (target, stop-loss) for an action at `price`
pub fn price_targets(action: TradeAction, price: f64) -> (f64, f64) {
    match action {
        TradeAction::Buy => (price * BUY_TARGET, price * BUY_STOP),
        TradeAction::Sell => (price * SELL_TARGET, price * SELL_STOP),
        TradeAction::Hold => (price, price),
    }
}

impl fmt::Debug for SignalEnsemble {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignalEnsemble")
            .field(
                "signals",
                &self
                    .table
                    .signals
                    .iter()
                    .map(|s| (s.name.as_str(), s.weight))
                    .collect::<Vec<_>>(),
            )
            .field("thresholds", &self.thresholds)
            .finish()
    }
}
