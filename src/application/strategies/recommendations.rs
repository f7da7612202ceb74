use crate::domain::signals::{RiskLevel, TradeAction};

const BUY_LINES: &[&str] = &[
    "Strong bullish momentum detected",
    "Consider scaling into position",
];
const BUY_HIGH_RISK: &str = "Use smaller position size due to high volatility";

const SELL_LINES: &[&str] = &[
    "Bearish pressure increasing",
    "Consider profit-taking or hedging",
];
const SELL_HIGH_RISK: &str = "Exit positions quickly if volatility persists";

const HOLD_LINES: &[&str] = &[
    "Market showing consolidation patterns",
    "Wait for clearer directional bias",
];

pub const LOW_CONFIDENCE_NOTE: &str = "Low confidence - consider waiting for stronger signals";

/// Fixed advice lines for an (action, risk, confidence) triple.
///
/// Action lines come first, then the high-risk caution (BUY/SELL only),
/// then the low-confidence note when `confidence_pct < low_confidence_pct`.
pub fn recommendations(
    action: TradeAction,
    risk: RiskLevel,
    confidence_pct: f64,
    low_confidence_pct: f64,
) -> Vec<String> {
    let (lines, high_risk) = match action {
        TradeAction::Buy => (BUY_LINES, Some(BUY_HIGH_RISK)),
        TradeAction::Sell => (SELL_LINES, Some(SELL_HIGH_RISK)),
        TradeAction::Hold => (HOLD_LINES, None),
    };

    let mut out: Vec<String> = lines.iter().map(|l| l.to_string()).collect();
    if risk == RiskLevel::High {
        if let Some(caution) = high_risk {
            out.push(caution.to_string());
        }
    }
    if confidence_pct < low_confidence_pct {
        out.push(LOW_CONFIDENCE_NOTE.to_string());
    }
    out
}
