use crate::application::session::DashboardSession;
use crate::domain::market::timeframe::Timeframe;
use crate::domain::market::types::{MarketDataset, PriceChange, PriceSample};
use crate::domain::signals::{SignalBias, SignalEnsembleResult, SubSignal};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

/// One sub-signal as shown on a signal card
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalCard {
    pub name: String,
    pub value: i8,
    pub weight_pct: f64,
    pub impact: f64,
    pub bias: SignalBias,
}

impl From<&SubSignal> for SignalCard {
    fn from(signal: &SubSignal) -> Self {
        Self {
            name: signal.name.clone(),
            value: signal.value,
            weight_pct: signal.weight * 100.0,
            impact: signal.impact(),
            bias: signal.bias(),
        }
    }
}

/// Read-only view of the dashboard handed to the rendering layer.
///
/// Datasets and the analysis are shared `Arc`s, so taking a snapshot never
/// copies the series.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    pub symbol: String,
    pub display_name: String,
    pub base_price: f64,
    pub volatility_pct: f64,
    pub timeframe: Timeframe,
    pub timeframe_label: String,
    pub generation: u64,
    pub is_loading: bool,
    pub is_analyzing: bool,
    /// The shown dataset was generated for a previous symbol or timeframe
    pub is_stale: bool,
    pub last_update: Option<DateTime<Utc>>,
    pub latest: Option<PriceSample>,
    pub price_change: Option<PriceChange>,
    pub signal_cards: Vec<SignalCard>,
    pub dataset: Option<Arc<MarketDataset>>,
    pub analysis: Option<Arc<SignalEnsembleResult>>,
}

impl DashboardSnapshot {
    pub fn from_session(session: &DashboardSession) -> Self {
        let symbol = session.symbol();
        let timeframe = session.timeframe();
        let dataset = session.dataset();
        let analysis = session.analysis();

        let latest = dataset.as_ref().and_then(|d| d.latest().cloned());
        let price_change = dataset.as_ref().and_then(|d| d.price_change());
        let signal_cards = analysis
            .as_ref()
            .map(|a| a.sub_signals.iter().map(SignalCard::from).collect())
            .unwrap_or_default();

        Self {
            symbol: symbol.code.to_string(),
            display_name: symbol.display_name.to_string(),
            base_price: symbol.base_price,
            volatility_pct: symbol.volatility_pct,
            timeframe,
            timeframe_label: timeframe.label().to_string(),
            generation: session.generation(),
            is_loading: session.is_loading(),
            is_analyzing: session.is_analyzing(),
            is_stale: session.is_dataset_stale(),
            last_update: session.last_update(),
            latest,
            price_change,
            signal_cards,
            dataset,
            analysis,
        }
    }

    /// Compact one-line status for logs and terminals.
    pub fn summary_line(&self) -> String {
        let mut line = format!("{} ({}) {}", self.symbol, self.display_name, self.timeframe);
        if let Some(sample) = &self.latest {
            line.push_str(&format!(" ${:.2}", sample.price));
        }
        if let Some(change) = &self.price_change {
            let sign = if change.is_up() { "+" } else { "-" };
            line.push_str(&format!(
                " {}{:.2} ({}{:.2}%)",
                sign,
                change.absolute.abs(),
                sign,
                change.percent.abs()
            ));
        }
        if let Some(analysis) = &self.analysis {
            line.push_str(&format!(
                " | {} {:.1}% risk {}",
                analysis.action, analysis.confidence_pct, analysis.risk_level
            ));
        }
        if self.is_loading {
            line.push_str(" [loading]");
        }
        if self.is_analyzing {
            line.push_str(" [analyzing]");
        }
        line
    }
}
