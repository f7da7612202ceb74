use chrono::Utc;
use tradescope::application::market_data::MarketDataGenerator;
use tradescope::application::strategies::SignalEnsemble;
use tradescope::domain::errors::DashboardError;
use tradescope::domain::market::symbol::SymbolCatalog;
use tradescope::domain::market::timeframe::Timeframe;
use tradescope::domain::market::types::PriceSample;
use tradescope::domain::signals::{RiskLevel, SignalTable, TradeAction};
use tradescope::infrastructure::simulation::{SequenceRandomSource, ThreadRandomSource};

fn sample(rsi: f64, macd: f64, order_flow_delta: i64, volume: u64) -> PriceSample {
    PriceSample {
        timestamp: Utc::now(),
        display_time: "09:30:00".to_string(),
        price: 175.0,
        volume,
        buy_volume: volume,
        sell_volume: 0,
        rsi,
        macd,
        bollinger_upper: 183.75,
        bollinger_lower: 166.25,
        order_flow_delta,
        vwap: 175.0,
    }
}

#[test]
fn test_bullish_scenario_buys_regardless_of_coin_flip() {
    let s = sample(25.0, 0.5, 1500, 8000);

    for coin in [0.1, 0.9] {
        let mut ensemble = SignalEnsemble::with_defaults(Box::new(SequenceRandomSource::constant(coin)));
        let result = ensemble.analyze(std::slice::from_ref(&s)).unwrap();

        let values: Vec<i8> = result.sub_signals.iter().map(|x| x.value).collect();
        assert_eq!(&values[..4], &[1, 1, 1, 1]);
        assert_eq!(values[4].abs(), 1);
        assert!(result.composite_score >= 0.8 - 1e-9);
        assert_eq!(result.action, TradeAction::Buy);
        assert_eq!(result.risk_level, RiskLevel::Low);
        assert!((result.target_price - 178.5).abs() < 1e-9);
        assert!((result.stop_loss_price - 173.25).abs() < 1e-9);
    }
}

#[test]
fn test_composite_score_matches_sub_signals() {
    let aapl = SymbolCatalog::lookup("AAPL").unwrap();
    let mut generator = MarketDataGenerator::new(Box::new(ThreadRandomSource));
    let mut ensemble = SignalEnsemble::with_defaults(Box::new(ThreadRandomSource));

    let weights: f64 = SignalTable::default().signals.iter().map(|s| s.weight).sum();
    assert!((weights - 1.0).abs() < 1e-9);

    for _ in 0..50 {
        let dataset = generator.generate(aapl, Timeframe::FiveMin);
        let result = ensemble.analyze(&dataset.series).unwrap();

        let expected: f64 = result
            .sub_signals
            .iter()
            .map(|s| f64::from(s.value) * s.weight)
            .sum();
        assert!((result.composite_score - expected).abs() < 1e-12);
        assert!((0.0..=95.0).contains(&result.confidence_pct));
        assert!(result.sub_signals.iter().all(|s| (-1..=1).contains(&s.value)));
        assert_eq!(result.current_price, dataset.latest().unwrap().price);

        // Generated RSI never leaves [30, 70), so the RSI vote is always neutral
        assert_eq!(result.sub_signals[0].value, 0);
        let volume = dataset.latest().unwrap().volume;
        assert_eq!(result.sub_signals[3].value, if volume > 5000 { 1 } else { -1 });
    }
}

#[test]
fn test_empty_series_reports_error() {
    let mut ensemble = SignalEnsemble::with_defaults(Box::new(ThreadRandomSource));
    assert_eq!(ensemble.analyze(&[]).unwrap_err(), DashboardError::EmptySeries);
}

#[test]
fn test_low_confidence_caution_is_last() {
    // rsi neutral, macd +, flow neutral, volume -, coin - => 0.25 - 0.15 - 0.1 = 0
    let s = sample(50.0, 0.4, 200, 3000);
    let mut ensemble = SignalEnsemble::with_defaults(Box::new(SequenceRandomSource::constant(0.2)));
    let result = ensemble.analyze(&[s]).unwrap();

    assert_eq!(result.action, TradeAction::Hold);
    assert_eq!(
        result.recommendations,
        vec![
            "Market showing consolidation patterns",
            "Wait for clearer directional bias",
            "Low confidence - consider waiting for stronger signals",
        ]
    );
}
