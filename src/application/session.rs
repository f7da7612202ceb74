use crate::domain::errors::DashboardError;
use crate::domain::market::symbol::{SymbolCatalog, SymbolProfile};
use crate::domain::market::timeframe::Timeframe;
use crate::domain::market::types::{MarketDataset, PriceSample};
use crate::domain::signals::SignalEnsembleResult;
use chrono::{DateTime, Utc};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Ticket for one dataset regeneration
#[derive(Debug, Clone, PartialEq)]
pub struct RefreshJob {
    pub generation: u64,
    pub symbol: &'static SymbolProfile,
    pub timeframe: Timeframe,
}

/// Ticket for one analysis run, carrying the sample it was requested on
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisJob {
    pub generation: u64,
    pub sample: PriceSample,
}

/// Owned dashboard state: current context, latest dataset bundle and latest
/// analysis.
///
/// Every symbol or timeframe change bumps the generation token. Jobs carry the
/// token they were started under, and completions whose token no longer
/// matches are dropped without touching state.
#[derive(Debug)]
pub struct DashboardSession {
    symbol: &'static SymbolProfile,
    timeframe: Timeframe,
    generation: u64,
    dataset: Option<Arc<MarketDataset>>,
    dataset_generation: u64,
    analysis: Option<Arc<SignalEnsembleResult>>,
    refresh_in_flight: Option<u64>,
    analysis_in_flight: Option<u64>,
    last_update: Option<DateTime<Utc>>,
    min_refresh_interval: Duration,
}

impl DashboardSession {
    pub fn new(
        symbol: &'static SymbolProfile,
        timeframe: Timeframe,
        min_refresh_interval: Duration,
    ) -> Self {
        Self {
            symbol,
            timeframe,
            generation: 1,
            dataset: None,
            dataset_generation: 0,
            analysis: None,
            refresh_in_flight: None,
            analysis_in_flight: None,
            last_update: None,
            min_refresh_interval,
        }
    }

    pub fn symbol(&self) -> &'static SymbolProfile {
        self.symbol
    }

    pub fn timeframe(&self) -> Timeframe {
        self.timeframe
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn dataset(&self) -> Option<Arc<MarketDataset>> {
        self.dataset.clone()
    }

    pub fn analysis(&self) -> Option<Arc<SignalEnsembleResult>> {
        self.analysis.clone()
    }

    pub fn last_update(&self) -> Option<DateTime<Utc>> {
        self.last_update
    }

    pub fn is_loading(&self) -> bool {
        self.refresh_in_flight.is_some()
    }

    pub fn is_analyzing(&self) -> bool {
        self.analysis_in_flight.is_some()
    }

    /// True while the shown dataset belongs to a previous symbol/timeframe.
    pub fn is_dataset_stale(&self) -> bool {
        self.dataset.is_some() && self.dataset_generation != self.generation
    }

    /// Timer period for the current timeframe
    pub fn refresh_interval(&self) -> Duration {
        self.timeframe.refresh_interval(self.min_refresh_interval)
    }

    /// Starts a refresh unless one for the current generation is already
    /// running.
    pub fn begin_refresh(&mut self) -> Option<RefreshJob> {
        if self.refresh_in_flight == Some(self.generation) {
            debug!(generation = self.generation, "Refresh already in flight, skipping tick");
            return None;
        }
        self.refresh_in_flight = Some(self.generation);
        Some(RefreshJob {
            generation: self.generation,
            symbol: self.symbol,
            timeframe: self.timeframe,
        })
    }

    /// Installs `dataset` if the job still matches the current context.
    pub fn complete_refresh(&mut self, job: &RefreshJob, dataset: MarketDataset) -> bool {
        if self.refresh_in_flight == Some(job.generation) {
            self.refresh_in_flight = None;
        }
        if job.generation != self.generation {
            warn!(
                job_generation = job.generation,
                generation = self.generation,
                symbol = job.symbol.code,
                "Discarding stale dataset"
            );
            return false;
        }

        debug!(
            symbol = self.symbol.code,
            timeframe = %self.timeframe,
            generation = self.generation,
            samples = dataset.series.len(),
            "Dataset refreshed"
        );
        self.last_update = Some(dataset.generated_at);
        self.dataset = Some(Arc::new(dataset));
        self.dataset_generation = self.generation;
        true
    }

    /// Releases the refresh slot after a job that produced no dataset.
    pub fn abandon_refresh(&mut self, job: &RefreshJob) {
        if self.refresh_in_flight == Some(job.generation) {
            self.refresh_in_flight = None;
        }
    }

    /// Captures the latest sample of the current dataset for analysis.
    pub fn begin_analysis(&mut self) -> Result<AnalysisJob, DashboardError> {
        if self.analysis_in_flight.is_some() {
            return Err(DashboardError::AnalysisInProgress);
        }
        let sample = self
            .dataset
            .as_ref()
            .filter(|_| self.dataset_generation == self.generation)
            .and_then(|d| d.latest())
            .cloned()
            .ok_or(DashboardError::EmptySeries)?;

        self.analysis_in_flight = Some(self.generation);
        Ok(AnalysisJob {
            generation: self.generation,
            sample,
        })
    }

    /// Installs `result` if the job still matches the current context. The
    /// in-flight flag is released either way.
    pub fn complete_analysis(&mut self, job: &AnalysisJob, result: SignalEnsembleResult) -> bool {
        self.analysis_in_flight = None;
        if job.generation != self.generation {
            warn!(
                job_generation = job.generation,
                generation = self.generation,
                "Discarding stale analysis"
            );
            return false;
        }
        self.analysis = Some(Arc::new(result));
        true
    }

    /// Releases the analysis slot after a job that produced no result.
    pub fn abandon_analysis(&mut self, job: &AnalysisJob) {
        if self.analysis_in_flight == Some(job.generation) {
            self.analysis_in_flight = None;
        }
    }

    /// Switches symbol. Returns `Ok(false)` when `code` is already selected.
    pub fn select_symbol(&mut self, code: &str) -> Result<bool, DashboardError> {
        let profile = SymbolCatalog::lookup(code)?;
        if profile.code == self.symbol.code {
            return Ok(false);
        }
        self.symbol = profile;
        self.invalidate_context();
        Ok(true)
    }

    /// Switches timeframe. Returns `Ok(false)` when `code` is already selected.
    pub fn select_timeframe(&mut self, code: &str) -> Result<bool, DashboardError> {
        let timeframe = Timeframe::from_str(code)?;
        if timeframe == self.timeframe {
            return Ok(false);
        }
        self.timeframe = timeframe;
        self.invalidate_context();
        Ok(true)
    }

    fn invalidate_context(&mut self) {
        self.generation += 1;
        self.analysis = None;
        info!(
            symbol = self.symbol.code,
            timeframe = %self.timeframe,
            generation = self.generation,
            "Dashboard context changed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::signals::{RiskLevel, TradeAction};

    fn session() -> DashboardSession {
        DashboardSession::new(
            SymbolCatalog::default_profile(),
            Timeframe::FiveMin,
            Duration::from_secs(5),
        )
    }

    fn dataset(job: &RefreshJob, samples: usize) -> MarketDataset {
        let now = Utc::now();
        let sample = PriceSample {
            timestamp: now,
            display_time: String::new(),
            price: job.symbol.base_price,
            volume: 10_000,
            buy_volume: 5_000,
            sell_volume: 5_000,
            rsi: 50.0,
            macd: 0.1,
            bollinger_upper: job.symbol.base_price + 1.0,
            bollinger_lower: job.symbol.base_price - 1.0,
            order_flow_delta: 0,
            vwap: job.symbol.base_price,
        };
        MarketDataset {
            symbol: job.symbol.code.to_string(),
            timeframe: job.timeframe,
            series: vec![sample; samples],
            order_flow: Vec::new(),
            volume_profile: Vec::new(),
            market_profile: Vec::new(),
            generated_at: now,
        }
    }

    fn result(price: f64) -> SignalEnsembleResult {
        SignalEnsembleResult {
            action: TradeAction::Hold,
            confidence_pct: 10.0,
            composite_score: 0.1,
            sub_signals: Vec::new(),
            risk_level: RiskLevel::Low,
            current_price: price,
            target_price: price,
            stop_loss_price: price,
            recommendations: Vec::new(),
            analyzed_at: Utc::now(),
        }
    }

    fn loaded_session() -> DashboardSession {
        let mut s = session();
        let job = s.begin_refresh().unwrap();
        assert!(s.complete_refresh(&job, dataset(&job, 3)));
        s
    }

    #[test]
    fn test_refresh_gating() {
        let mut s = session();
        assert_eq!(s.generation(), 1);
        let job = s.begin_refresh().unwrap();
        assert!(s.is_loading());
        assert!(s.begin_refresh().is_none());

        assert!(s.complete_refresh(&job, dataset(&job, 100)));
        assert!(!s.is_loading());
        assert_eq!(s.dataset().unwrap().series.len(), 100);
        assert!(s.last_update().is_some());
        assert!(s.begin_refresh().is_some());
    }

    #[test]
    fn test_stale_refresh_is_discarded() {
        let mut s = loaded_session();
        let before = s.dataset().unwrap();

        let old_job = s.begin_refresh().unwrap();
        assert!(s.select_symbol("TSLA").unwrap());
        // The new context may start its own refresh straight away
        let new_job = s.begin_refresh().unwrap();
        assert_eq!(new_job.symbol.code, "TSLA");

        assert!(!s.complete_refresh(&old_job, dataset(&old_job, 5)));
        assert!(Arc::ptr_eq(&before, &s.dataset().unwrap()));
        assert!(s.is_loading());
        assert!(s.is_dataset_stale());

        assert!(s.complete_refresh(&new_job, dataset(&new_job, 5)));
        assert_eq!(s.dataset().unwrap().symbol, "TSLA");
        assert!(!s.is_dataset_stale());
    }

    #[test]
    fn test_analysis_lifecycle() {
        let mut s = loaded_session();
        let job = s.begin_analysis().unwrap();
        assert!(s.is_analyzing());
        assert_eq!(s.begin_analysis().unwrap_err(), DashboardError::AnalysisInProgress);

        assert!(s.complete_analysis(&job, result(job.sample.price)));
        assert!(!s.is_analyzing());
        assert_eq!(s.analysis().unwrap().current_price, 175.0);
    }

    #[test]
    fn test_analysis_requires_current_samples() {
        let mut s = session();
        assert_eq!(s.begin_analysis().unwrap_err(), DashboardError::EmptySeries);

        let mut s = session();
        let job = s.begin_refresh().unwrap();
        s.complete_refresh(&job, dataset(&job, 0));
        assert_eq!(s.begin_analysis().unwrap_err(), DashboardError::EmptySeries);

        // Dataset from the previous timeframe does not count
        let mut s = loaded_session();
        s.select_timeframe("1h").unwrap();
        assert_eq!(s.begin_analysis().unwrap_err(), DashboardError::EmptySeries);
        assert!(!s.is_analyzing());
    }

    #[test]
    fn test_timeframe_change_drops_in_flight_analysis() {
        let mut s = loaded_session();
        let first = s.begin_analysis().unwrap();
        s.complete_analysis(&first, result(175.0));
        assert!(s.analysis().is_some());

        let job = s.begin_analysis().unwrap();
        assert!(s.select_timeframe("15m").unwrap());
        assert!(s.analysis().is_none());

        assert!(!s.complete_analysis(&job, result(175.0)));
        assert!(s.analysis().is_none());
        assert!(!s.is_analyzing());

        // Fresh data for the new timeframe still shows no result until asked
        let refresh = s.begin_refresh().unwrap();
        s.complete_refresh(&refresh, dataset(&refresh, 96));
        assert!(s.analysis().is_none());
        let job = s.begin_analysis().unwrap();
        assert!(s.complete_analysis(&job, result(175.0)));
        assert!(s.analysis().is_some());
    }

    #[test]
    fn test_invalid_selection_changes_nothing() {
        let mut s = loaded_session();
        let job = s.begin_analysis().unwrap();
        s.complete_analysis(&job, result(175.0));

        assert!(matches!(
            s.select_symbol("DOGE"),
            Err(DashboardError::InvalidProfile { .. })
        ));
        assert!(s.select_timeframe("3w").is_err());
        assert_eq!(s.generation(), 1);
        assert!(s.analysis().is_some());
        assert_eq!(s.symbol().code, "AAPL");
        assert_eq!(s.timeframe(), Timeframe::FiveMin);
    }

    #[test]
    fn test_same_selection_is_noop() {
        let mut s = loaded_session();
        let job = s.begin_analysis().unwrap();
        s.complete_analysis(&job, result(175.0));

        assert!(!s.select_symbol("aapl").unwrap());
        assert!(!s.select_timeframe("5m").unwrap());
        assert_eq!(s.generation(), 1);
        assert!(s.analysis().is_some());
    }

    #[test]
    fn test_refresh_interval_follows_timeframe() {
        let mut s = session();
        assert_eq!(s.refresh_interval(), Duration::from_secs(30));
        s.select_timeframe("1m").unwrap();
        assert_eq!(s.refresh_interval(), Duration::from_secs(6));
    }

    #[test]
    fn test_abandon_analysis_releases_slot() {
        let mut s = loaded_session();
        let job = s.begin_analysis().unwrap();
        s.abandon_analysis(&job);
        assert!(!s.is_analyzing());
        assert!(s.begin_analysis().is_ok());
    }

    #[test]
    fn test_abandon_refresh_releases_slot() {
        let mut s = session();
        let job = s.begin_refresh().unwrap();
        assert!(s.begin_refresh().is_none());
        s.abandon_refresh(&job);
        assert!(!s.is_loading());
        assert!(s.begin_refresh().is_some());
    }
}
