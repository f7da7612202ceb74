use crate::domain::market::timeframe::Timeframe;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Rounds a price to cents, the precision every displayed price carries.
pub fn round_cents(price: f64) -> f64 {
    (price * 100.0).round() / 100.0
}

/// One bar of the synthetic price series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSample {
    pub timestamp: DateTime<Utc>,
    /// Date for daily series, time of day otherwise
    pub display_time: String,
    pub price: f64,
    pub volume: u64,
    pub buy_volume: u64,
    pub sell_volume: u64,
    pub rsi: f64,
    pub macd: f64,
    pub bollinger_upper: f64,
    pub bollinger_lower: f64,
    /// buy_volume - sell_volume
    pub order_flow_delta: i64,
    pub vwap: f64,
}

impl PriceSample {
    /// Relative distance between price and VWAP, the ensemble's risk input.
    pub fn vwap_deviation(&self) -> f64 {
        if self.vwap == 0.0 {
            return 0.0;
        }
        (self.price - self.vwap).abs() / self.vwap
    }
}

/// One rung of the order-flow ladder
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderFlowLevel {
    pub price: f64,
    pub bid_size: u64,
    pub ask_size: u64,
    pub delta: i64,
    /// Running sum of `delta` from the first displayed (highest) rung down
    pub cumulative_delta: i64,
    /// |delta| / max(bid, ask)
    pub intensity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VolumeProfileLevel {
    pub price: f64,
    pub volume: u64,
    pub is_point_of_control: bool,
    pub in_value_area: bool,
}

/// TPO row for one lettered sub-period
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketProfileEntry {
    pub period_label: char,
    pub price: f64,
    pub tpo_count: u32,
    pub volume: u64,
}

/// Move between the last two samples of a series
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceChange {
    pub absolute: f64,
    pub percent: f64,
}

impl PriceChange {
    pub fn is_up(&self) -> bool {
        self.absolute >= 0.0
    }
}

/// The four datasets produced by one refresh. Always replaced as a whole.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketDataset {
    pub symbol: String,
    pub timeframe: Timeframe,
    pub series: Vec<PriceSample>,
    pub order_flow: Vec<OrderFlowLevel>,
    pub volume_profile: Vec<VolumeProfileLevel>,
    pub market_profile: Vec<MarketProfileEntry>,
    pub generated_at: DateTime<Utc>,
}

impl MarketDataset {
    pub fn latest(&self) -> Option<&PriceSample> {
        self.series.last()
    }

    /// Change of the latest sample against the one before it.
    pub fn price_change(&self) -> Option<PriceChange> {
        let n = self.series.len();
        if n < 2 {
            return None;
        }
        let last = self.series[n - 1].price;
        let prev = self.series[n - 2].price;
        let absolute = last - prev;
        let percent = if prev != 0.0 { absolute / prev * 100.0 } else { 0.0 };
        Some(PriceChange { absolute, percent })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(price: f64, vwap: f64) -> PriceSample {
        PriceSample {
            timestamp: Utc::now(),
            display_time: String::new(),
            price,
            volume: 10_000,
            buy_volume: 6_000,
            sell_volume: 4_000,
            rsi: 50.0,
            macd: 0.0,
            bollinger_upper: price * 1.05,
            bollinger_lower: price * 0.95,
            order_flow_delta: 2_000,
            vwap,
        }
    }

    fn dataset(prices: &[f64]) -> MarketDataset {
        MarketDataset {
            symbol: "AAPL".to_string(),
            timeframe: Timeframe::FiveMin,
            series: prices.iter().map(|p| sample(*p, *p)).collect(),
            order_flow: Vec::new(),
            volume_profile: Vec::new(),
            market_profile: Vec::new(),
            generated_at: Utc::now(),
        }
    }

    #[test]
    fn test_round_cents() {
        assert_eq!(round_cents(175.236), 175.24);
        assert_eq!(round_cents(175.234), 175.23);
        assert_eq!(round_cents(-1.005_1), -1.01);
    }

    #[test]
    fn test_vwap_deviation() {
        let s = sample(102.0, 100.0);
        assert!((s.vwap_deviation() - 0.02).abs() < 1e-12);
        assert_eq!(sample(100.0, 0.0).vwap_deviation(), 0.0);
    }

    #[test]
    fn test_price_change() {
        let change = dataset(&[100.0, 110.0]).price_change().unwrap();
        assert!((change.absolute - 10.0).abs() < 1e-9);
        assert!((change.percent - 10.0).abs() < 1e-9);
        assert!(change.is_up());

        let change = dataset(&[100.0, 110.0, 99.0]).price_change().unwrap();
        assert!((change.absolute + 11.0).abs() < 1e-9);
        assert!(!change.is_up());

        assert!(dataset(&[100.0]).price_change().is_none());
        assert!(dataset(&[]).latest().is_none());
    }
}
