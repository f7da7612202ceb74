use std::sync::Arc;
use std::time::Duration;
use tradescope::application::agent::{
    AgentLatency, DashboardAgent, DashboardEvent, DashboardHandle,
};
use tradescope::application::market_data::MarketDataGenerator;
use tradescope::application::session::DashboardSession;
use tradescope::application::strategies::SignalEnsemble;
use tradescope::domain::errors::DashboardError;
use tradescope::domain::market::symbol::SymbolCatalog;
use tradescope::domain::market::timeframe::Timeframe;
use tradescope::infrastructure::simulation::{FixedLatency, SeededRandomSource, ZeroLatency};

fn build_agent(latency: AgentLatency) -> (DashboardAgent, DashboardHandle) {
    let session = DashboardSession::new(
        SymbolCatalog::default_profile(),
        Timeframe::FiveMin,
        Duration::from_secs(5),
    );
    let generator = MarketDataGenerator::new(Box::new(SeededRandomSource::new(1)));
    let ensemble = SignalEnsemble::with_defaults(Box::new(SeededRandomSource::new(2)));
    DashboardAgent::new(session, generator, ensemble, latency, 64)
}

fn dashboard_latency() -> AgentLatency {
    AgentLatency {
        refresh: Arc::new(FixedLatency(Duration::from_millis(1000))),
        analysis: Arc::new(FixedLatency(Duration::from_millis(2000))),
    }
}

#[tokio::test(start_paused = true)]
async fn test_periodic_refresh_replaces_bundle() {
    // 1. Start the agent
    let (agent, handle) = build_agent(dashboard_latency());
    let mut events = handle.subscribe();
    let task = tokio::spawn(agent.run());

    // 2. Initial load
    assert!(matches!(
        events.recv().await.unwrap(),
        DashboardEvent::DatasetRefreshed { generation: 1, .. }
    ));
    let first = handle.snapshot().await.dataset.unwrap();

    // 3. Next timer tick (5m / 10 = 30s) regenerates everything
    let started = tokio::time::Instant::now();
    assert!(matches!(
        events.recv().await.unwrap(),
        DashboardEvent::DatasetRefreshed { generation: 1, .. }
    ));
    assert!(started.elapsed() >= Duration::from_secs(25));

    let second = handle.snapshot().await.dataset.unwrap();
    assert!(!Arc::ptr_eq(&first, &second));
    assert_eq!(second.series.len(), 100);
    assert_eq!(second.order_flow.len(), 30);
    assert_eq!(second.volume_profile.len(), 40);
    assert_eq!(second.market_profile.len(), 24);

    handle.shutdown().await.unwrap();
    task.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_symbol_switch_clears_analysis_until_rerun() {
    let (agent, handle) = build_agent(dashboard_latency());
    let mut events = handle.subscribe();
    let task = tokio::spawn(agent.run());

    assert!(matches!(
        events.recv().await.unwrap(),
        DashboardEvent::DatasetRefreshed { .. }
    ));

    // 1. Analysis on AAPL completes
    handle.run_analysis().await.unwrap();
    assert!(matches!(
        events.recv().await.unwrap(),
        DashboardEvent::AnalysisCompleted { generation: 1, .. }
    ));
    assert!(handle.snapshot().await.analysis.is_some());

    // 2. Switching symbol clears it immediately
    handle.select_symbol("MSFT").await.unwrap();
    assert!(matches!(
        events.recv().await.unwrap(),
        DashboardEvent::ContextChanged { generation: 2, .. }
    ));
    let snapshot = handle.snapshot().await;
    assert!(snapshot.analysis.is_none());
    assert_eq!(snapshot.display_name, "Microsoft Corp.");
    assert!(snapshot.is_stale);

    // 3. New data arrives, still no analysis
    assert!(matches!(
        events.recv().await.unwrap(),
        DashboardEvent::DatasetRefreshed { generation: 2, .. }
    ));
    let snapshot = handle.snapshot().await;
    assert!(snapshot.analysis.is_none());
    assert!(!snapshot.is_stale);
    assert_eq!(snapshot.dataset.as_ref().unwrap().symbol, "MSFT");

    // 4. Explicit rerun attaches a result to the new context
    handle.run_analysis().await.unwrap();
    assert!(matches!(
        events.recv().await.unwrap(),
        DashboardEvent::AnalysisCompleted { generation: 2, .. }
    ));

    handle.shutdown().await.unwrap();
    task.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_stale_refresh_is_reported_and_dropped() {
    let (agent, handle) = build_agent(dashboard_latency());
    let mut events = handle.subscribe();
    let task = tokio::spawn(agent.run());

    // Let the initial refresh start, then switch before it lands
    tokio::task::yield_now().await;
    handle.select_timeframe("4h").await.unwrap();

    let mut seen = Vec::new();
    while seen.len() < 3 {
        seen.push(events.recv().await.unwrap());
    }
    assert!(seen.contains(&DashboardEvent::RefreshDiscarded { generation: 1 }));
    assert!(seen.iter().any(|e| matches!(
        e,
        DashboardEvent::DatasetRefreshed {
            generation: 2,
            timeframe: Timeframe::FourHour,
            ..
        }
    )));

    let dataset = handle.snapshot().await.dataset.unwrap();
    assert_eq!(dataset.timeframe, Timeframe::FourHour);
    assert_eq!(dataset.series.len(), 48);

    handle.shutdown().await.unwrap();
    task.await.unwrap();
}

#[tokio::test]
async fn test_handle_after_shutdown() {
    let latency = AgentLatency {
        refresh: Arc::new(ZeroLatency),
        analysis: Arc::new(ZeroLatency),
    };
    let (agent, handle) = build_agent(latency);
    let task = tokio::spawn(agent.run());

    handle.shutdown().await.unwrap();
    task.await.unwrap();

    let err = handle.select_symbol("TSLA").await.unwrap_err();
    assert_eq!(err, DashboardError::AgentUnavailable);
    assert!(!err.is_recoverable());
}
