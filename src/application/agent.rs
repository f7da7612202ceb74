use crate::application::market_data::MarketDataGenerator;
use crate::application::session::{AnalysisJob, DashboardSession, RefreshJob};
use crate::application::strategies::SignalEnsemble;
use crate::config::Config;
use crate::domain::errors::DashboardError;
use crate::domain::market::timeframe::Timeframe;
use crate::domain::market::types::MarketDataset;
use crate::domain::signals::{SignalEnsembleResult, TradeAction};
use crate::infrastructure::simulation::{LatencyModel, latency_model, random_source};
use crate::interfaces::snapshot::DashboardSnapshot;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock, broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

#[derive(Debug)]
pub enum DashboardCommand {
    SelectSymbol(String),
    SelectTimeframe(String),
    RunAnalysis,
    Shutdown,
}

/// Notifications for the rendering side
#[derive(Debug, Clone, PartialEq)]
pub enum DashboardEvent {
    DatasetRefreshed {
        symbol: String,
        timeframe: Timeframe,
        generation: u64,
    },
    RefreshDiscarded {
        generation: u64,
    },
    AnalysisCompleted {
        generation: u64,
        action: TradeAction,
        confidence_pct: f64,
    },
    AnalysisDiscarded {
        generation: u64,
    },
    ContextChanged {
        symbol: String,
        timeframe: Timeframe,
        generation: u64,
    },
    CommandRejected {
        error: DashboardError,
    },
}

/// Finished background work, reported back to the agent loop
enum JobOutcome {
    Refreshed(RefreshJob, MarketDataset),
    Analyzed(AnalysisJob, SignalEnsembleResult),
    /// The worker task died before producing a result
    RefreshFailed(RefreshJob),
    AnalysisFailed(AnalysisJob),
}

/// Artificial delays for the two kinds of background job
#[derive(Clone)]
pub struct AgentLatency {
    pub refresh: Arc<dyn LatencyModel>,
    pub analysis: Arc<dyn LatencyModel>,
}

/// Async driver for a `DashboardSession`.
///
/// A single task multiplexes the refresh timer, user commands and job
/// completions. Generation and analysis run in spawned tasks so the loop never
/// blocks on the artificial latency.
pub struct DashboardAgent {
    session: Arc<RwLock<DashboardSession>>,
    generator: Arc<Mutex<MarketDataGenerator>>,
    ensemble: Arc<Mutex<SignalEnsemble>>,
    latency: AgentLatency,
    cmd_rx: mpsc::Receiver<DashboardCommand>,
    job_tx: mpsc::UnboundedSender<JobOutcome>,
    job_rx: mpsc::UnboundedReceiver<JobOutcome>,
    events: broadcast::Sender<DashboardEvent>,
}

impl DashboardAgent {
    pub fn new(
        session: DashboardSession,
        generator: MarketDataGenerator,
        ensemble: SignalEnsemble,
        latency: AgentLatency,
        event_buffer: usize,
    ) -> (Self, DashboardHandle) {
        let (cmd_tx, cmd_rx) = mpsc::channel(32);
        let (job_tx, job_rx) = mpsc::unbounded_channel();
        let (events, _) = broadcast::channel(event_buffer.max(1));
        let session = Arc::new(RwLock::new(session));

        let handle = DashboardHandle {
            cmd_tx,
            session: session.clone(),
            events: events.clone(),
        };
        let agent = Self {
            session,
            generator: Arc::new(Mutex::new(generator)),
            ensemble: Arc::new(Mutex::new(ensemble)),
            latency,
            cmd_rx,
            job_tx,
            job_rx,
            events,
        };
        (agent, handle)
    }

    /// Wires session, generator, ensemble and latencies from configuration.
    pub fn from_config(config: &Config) -> Result<(Self, DashboardHandle), DashboardError> {
        let session = DashboardSession::new(
            config.session.default_symbol,
            config.session.default_timeframe,
            config.session.min_refresh_interval(),
        );
        let generator = MarketDataGenerator::new(random_source(config.simulation.generator_seed()));
        let ensemble = SignalEnsemble::new(
            config.strategy.signal_table.clone(),
            config.strategy.thresholds.clone(),
            random_source(config.simulation.ensemble_seed()),
        )?;
        let jitter = config.session.latency_jitter_ms;
        let latency = AgentLatency {
            refresh: latency_model(config.session.refresh_latency_ms, jitter),
            analysis: latency_model(config.session.analysis_latency_ms, jitter),
        };
        Ok(Self::new(
            session,
            generator,
            ensemble,
            latency,
            config.session.event_buffer,
        ))
    }

    pub async fn run(mut self) {
        let mut period = self.session.read().await.refresh_interval();
        // First tick fires immediately and loads the initial dataset
        let mut ticker = time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(period_ms = period.as_millis() as u64, "Dashboard agent started");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.start_refresh().await;
                }

                maybe_cmd = self.cmd_rx.recv() => {
                    match maybe_cmd {
                        Some(DashboardCommand::Shutdown) | None => {
                            info!("Dashboard agent received Shutdown. Exiting loop.");
                            return;
                        }
                        Some(cmd) => {
                            if self.handle_command(cmd).await {
                                period = self.session.read().await.refresh_interval();
                                ticker = delayed_interval(period);
                                self.start_refresh().await;
                            }
                        }
                    }
                }

                Some(outcome) = self.job_rx.recv() => {
                    self.apply(outcome).await;
                }
            }
        }
    }

    /// Returns true when the symbol or timeframe changed.
    async fn handle_command(&self, cmd: DashboardCommand) -> bool {
        let changed = match cmd {
            DashboardCommand::SelectSymbol(code) => self.session.write().await.select_symbol(&code),
            DashboardCommand::SelectTimeframe(code) => {
                self.session.write().await.select_timeframe(&code)
            }
            DashboardCommand::RunAnalysis => {
                self.start_analysis().await;
                return false;
            }
            DashboardCommand::Shutdown => return false,
        };

        match changed {
            Ok(true) => {
                let session = self.session.read().await;
                self.emit(DashboardEvent::ContextChanged {
                    symbol: session.symbol().code.to_string(),
                    timeframe: session.timeframe(),
                    generation: session.generation(),
                });
                true
            }
            Ok(false) => false,
            Err(error) => {
                warn!(%error, "Selection rejected");
                self.emit(DashboardEvent::CommandRejected { error });
                false
            }
        }
    }

    async fn start_refresh(&self) {
        let job = self.session.write().await.begin_refresh();
        let Some(job) = job else {
            return;
        };

        let generator = self.generator.clone();
        let delay = self.latency.refresh.next_latency();
        let failed = JobOutcome::RefreshFailed(job.clone());
        let worker = tokio::spawn(async move {
            time::sleep(delay).await;
            let dataset = generator.lock().await.generate(job.symbol, job.timeframe);
            JobOutcome::Refreshed(job, dataset)
        });
        self.report(worker, failed);
    }

    async fn start_analysis(&self) {
        let job = self.session.write().await.begin_analysis();
        let job = match job {
            Ok(job) => job,
            Err(error) => {
                warn!(%error, "Analysis rejected");
                self.emit(DashboardEvent::CommandRejected { error });
                return;
            }
        };

        let ensemble = self.ensemble.clone();
        let delay = self.latency.analysis.next_latency();
        let failed = JobOutcome::AnalysisFailed(job.clone());
        let worker = tokio::spawn(async move {
            time::sleep(delay).await;
            let result = ensemble.lock().await.analyze_sample(&job.sample);
            JobOutcome::Analyzed(job, result)
        });
        self.report(worker, failed);
    }

    /// Forwards the worker's outcome to the loop, or `failed` if it panicked.
    fn report(&self, worker: JoinHandle<JobOutcome>, failed: JobOutcome) {
        let tx = self.job_tx.clone();
        tokio::spawn(async move {
            let outcome = match worker.await {
                Ok(outcome) => outcome,
                Err(error) => {
                    error!(%error, "Background job failed");
                    failed
                }
            };
            if tx.send(outcome).is_err() {
                debug!("Agent gone before job completed");
            }
        });
    }

    async fn apply(&self, outcome: JobOutcome) {
        match outcome {
            JobOutcome::Refreshed(job, dataset) => {
                let applied = self.session.write().await.complete_refresh(&job, dataset);
                let event = if applied {
                    DashboardEvent::DatasetRefreshed {
                        symbol: job.symbol.code.to_string(),
                        timeframe: job.timeframe,
                        generation: job.generation,
                    }
                } else {
                    DashboardEvent::RefreshDiscarded {
                        generation: job.generation,
                    }
                };
                self.emit(event);
            }
            JobOutcome::Analyzed(job, result) => {
                let action = result.action;
                let confidence_pct = result.confidence_pct;
                let applied = self.session.write().await.complete_analysis(&job, result);
                let event = if applied {
                    info!(%action, confidence = confidence_pct, "Analysis applied");
                    DashboardEvent::AnalysisCompleted {
                        generation: job.generation,
                        action,
                        confidence_pct,
                    }
                } else {
                    DashboardEvent::AnalysisDiscarded {
                        generation: job.generation,
                    }
                };
                self.emit(event);
            }
            JobOutcome::RefreshFailed(job) => {
                self.session.write().await.abandon_refresh(&job);
                self.emit(DashboardEvent::RefreshDiscarded {
                    generation: job.generation,
                });
            }
            JobOutcome::AnalysisFailed(job) => {
                self.session.write().await.abandon_analysis(&job);
                self.emit(DashboardEvent::AnalysisDiscarded {
                    generation: job.generation,
                });
            }
        }
    }

    fn emit(&self, event: DashboardEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }
}

/// Interval whose first tick is one full period away.
fn delayed_interval(period: Duration) -> Interval {
    let mut ticker = time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}

/// Cloneable client for a running `DashboardAgent`.
#[derive(Clone)]
pub struct DashboardHandle {
    cmd_tx: mpsc::Sender<DashboardCommand>,
    session: Arc<RwLock<DashboardSession>>,
    events: broadcast::Sender<DashboardEvent>,
}

impl DashboardHandle {
    async fn send(&self, cmd: DashboardCommand) -> Result<(), DashboardError> {
        self.cmd_tx
            .send(cmd)
            .await
            .map_err(|_| DashboardError::AgentUnavailable)
    }

    pub async fn select_symbol(&self, code: impl Into<String>) -> Result<(), DashboardError> {
        self.send(DashboardCommand::SelectSymbol(code.into())).await
    }

    pub async fn select_timeframe(&self, code: impl Into<String>) -> Result<(), DashboardError> {
        self.send(DashboardCommand::SelectTimeframe(code.into())).await
    }

    pub async fn run_analysis(&self) -> Result<(), DashboardError> {
        self.send(DashboardCommand::RunAnalysis).await
    }

    pub async fn shutdown(&self) -> Result<(), DashboardError> {
        self.send(DashboardCommand::Shutdown).await
    }

    /// Read-only view of the current state
    pub async fn snapshot(&self) -> DashboardSnapshot {
        DashboardSnapshot::from_session(&*self.session.read().await)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DashboardEvent> {
        self.events.subscribe()
    }
}
