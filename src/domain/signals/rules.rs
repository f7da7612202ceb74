use crate::domain::errors::DashboardError;
use crate::domain::market::types::PriceSample;
use crate::domain::ports::RandomSource;
use serde::{Deserialize, Serialize};

const WEIGHT_TOLERANCE: f64 = 1e-9;

/// Sample field a rule reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleField {
    Rsi,
    Macd,
    OrderFlowDelta,
    Volume,
}

impl SampleField {
    pub fn read(&self, sample: &PriceSample) -> f64 {
        match self {
            SampleField::Rsi => sample.rsi,
            SampleField::Macd => sample.macd,
            SampleField::OrderFlowDelta => sample.order_flow_delta as f64,
            SampleField::Volume => sample.volume as f64,
        }
    }
}

/// How a sub-signal turns a sample into a -1/0/+1 vote
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SignalRule {
    /// +1 below `oversold`, -1 above `overbought`, 0 in between
    Oscillator {
        input: SampleField,
        oversold: f64,
        overbought: f64,
    },
    /// +1 above `threshold`, -1 otherwise. Never neutral.
    Sign { input: SampleField, threshold: f64 },
    /// +1 above `threshold`, -1 below `-threshold`, 0 inside the band
    DeadBand { input: SampleField, threshold: f64 },
    /// Uncorrelated +/-1 vote
    CoinFlip,
}

impl SignalRule {
    pub fn evaluate<R>(&self, sample: &PriceSample, rng: &mut R) -> i8
    where
        R: RandomSource + ?Sized,
    {
        match *self {
            SignalRule::Oscillator {
                input,
                oversold,
                overbought,
            } => {
                let x = input.read(sample);
                if x < oversold {
                    1
                } else if x > overbought {
                    -1
                } else {
                    0
                }
            }
            SignalRule::Sign { input, threshold } => {
                if input.read(sample) > threshold {
                    1
                } else {
                    -1
                }
            }
            SignalRule::DeadBand { input, threshold } => {
                let x = input.read(sample);
                if x > threshold {
                    1
                } else if x < -threshold {
                    -1
                } else {
                    0
                }
            }
            SignalRule::CoinFlip => {
                if rng.coin_flip() {
                    1
                } else {
                    -1
                }
            }
        }
    }
}

/// Named, weighted rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSpec {
    pub name: String,
    pub weight: f64,
    pub rule: SignalRule,
}

/// Ordered scoring policy. Loaded from TOML as a list of `[[signals]]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalTable {
    pub signals: Vec<RuleSpec>,
}

impl Default for SignalTable {
    fn default() -> Self {
        let spec = |name: &str, weight: f64, rule: SignalRule| RuleSpec {
            name: name.to_string(),
            weight,
            rule,
        };
        Self {
            signals: vec![
                spec(
                    "RSI",
                    0.2,
                    SignalRule::Oscillator {
                        input: SampleField::Rsi,
                        oversold: 30.0,
                        overbought: 70.0,
                    },
                ),
                spec(
                    "MACD",
                    0.25,
                    SignalRule::Sign {
                        input: SampleField::Macd,
                        threshold: 0.0,
                    },
                ),
                spec(
                    "Order Flow",
                    0.3,
                    SignalRule::DeadBand {
                        input: SampleField::OrderFlowDelta,
                        threshold: 1000.0,
                    },
                ),
                spec(
                    "Volume Analysis",
                    0.15,
                    SignalRule::Sign {
                        input: SampleField::Volume,
                        threshold: 5000.0,
                    },
                ),
                spec("Market Profile", 0.1, SignalRule::CoinFlip),
            ],
        }
    }
}

impl SignalTable {
    pub fn total_weight(&self) -> f64 {
        self.signals.iter().map(|s| s.weight).sum()
    }

    /// Rejects empty tables, out-of-range weights, weights not summing to 1.0
    /// and inverted oscillator bands.
    pub fn validate(&self) -> Result<(), DashboardError> {
        let invalid = |reason: String| Err(DashboardError::InvalidSignalTable { reason });

        if self.signals.is_empty() {
            return invalid("no signals defined".to_string());
        }
        for spec in &self.signals {
            if !(0.0..=1.0).contains(&spec.weight) {
                return invalid(format!(
                    "weight {} for '{}' is outside [0, 1]",
                    spec.weight, spec.name
                ));
            }
            if let SignalRule::Oscillator {
                oversold,
                overbought,
                ..
            } = spec.rule
            {
                if oversold > overbought {
                    return invalid(format!(
                        "'{}' oversold level {} is above overbought level {}",
                        spec.name, oversold, overbought
                    ));
                }
            }
        }
        let total = self.total_weight();
        if (total - 1.0).abs() > WEIGHT_TOLERANCE {
            return invalid(format!("weights sum to {total}, expected 1.0"));
        }
        Ok(())
    }
}
