use crate::domain::market::order_flow::{
    build_market_profile, build_order_flow_ladder, build_volume_profile,
};
use crate::domain::market::symbol::SymbolProfile;
use crate::domain::market::timeframe::Timeframe;
use crate::domain::market::types::{MarketDataset, PriceSample, round_cents};
use crate::domain::ports::RandomSource;
use chrono::{DateTime, Duration, Utc};
use tracing::debug;

/// Half-width of the starting offset around the base price
const START_OFFSET: f64 = 5.0;
const VOLUME_RANGE: (u64, u64) = (5_000, 55_000);
/// Buy share of volume is drawn from [0.3, 0.7)
const BUY_FRACTION_RANGE: (f64, f64) = (0.3, 0.7);
const RSI_RANGE: (f64, f64) = (30.0, 70.0);
/// VWAP jitter as a fraction of price (+/-0.05%)
const VWAP_JITTER: f64 = 0.0005;
/// Bollinger half-width in multiples of the per-step volatility
const BOLLINGER_WIDTH: f64 = 2.0;

/// Synthetic market data simulator.
///
/// Runs a multiplicative random walk from the symbol's base price and derives
/// the order-flow ladder, volume profile and market profile around the final
/// walk price. All randomness comes from the injected `RandomSource`.
pub struct MarketDataGenerator {
    rng: Box<dyn RandomSource>,
}

impl MarketDataGenerator {
    pub fn new(rng: Box<dyn RandomSource>) -> Self {
        Self { rng }
    }

    pub fn generate(&mut self, symbol: &SymbolProfile, timeframe: Timeframe) -> MarketDataset {
        self.generate_at(symbol, timeframe, Utc::now())
    }

    /// Generates a full dataset whose newest sample is stamped `now`.
    pub fn generate_at(
        &mut self,
        symbol: &SymbolProfile,
        timeframe: Timeframe,
        now: DateTime<Utc>,
    ) -> MarketDataset {
        let (series, last_price) = self.price_series(symbol, timeframe, now);

        let order_flow = build_order_flow_ladder(last_price, &mut self.rng);
        let volume_profile = build_volume_profile(last_price, &mut self.rng);
        let market_profile =
            build_market_profile(last_price, timeframe.sample_count(), &mut self.rng);

        debug!(
            symbol = symbol.code,
            timeframe = %timeframe,
            samples = series.len(),
            last_price = round_cents(last_price),
            "Generated market dataset"
        );

        MarketDataset {
            symbol: symbol.code.to_string(),
            timeframe,
            series,
            order_flow,
            volume_profile,
            market_profile,
            generated_at: now,
        }
    }

    /// Returns the series (oldest first) and the unrounded final walk price.
    fn price_series(
        &mut self,
        symbol: &SymbolProfile,
        timeframe: Timeframe,
        now: DateTime<Utc>,
    ) -> (Vec<PriceSample>, f64) {
        let count = timeframe.sample_count();
        let interval = Duration::milliseconds(timeframe.interval_ms() as i64);
        let volatility = symbol.volatility_factor();

        let mut walk = symbol.base_price + self.rng.jitter(START_OFFSET);
        let mut series = Vec::with_capacity(count);

        for i in 0..count {
            let timestamp = now - interval * (count - 1 - i) as i32;
            walk += self.rng.jitter(0.5) * volatility * walk;

            let volume = self.rng.int_range(VOLUME_RANGE.0, VOLUME_RANGE.1);
            let buy_fraction = self.rng.uniform(BUY_FRACTION_RANGE.0, BUY_FRACTION_RANGE.1);
            let buy_volume = ((volume as f64 * buy_fraction).floor() as u64).min(volume);
            let sell_volume = volume - buy_volume;

            let rsi = self.rng.uniform(RSI_RANGE.0, RSI_RANGE.1);
            let macd = self.rng.jitter(1.0);

            let price = round_cents(walk);
            let band = price * volatility * BOLLINGER_WIDTH;
            let vwap = walk + self.rng.jitter(walk * VWAP_JITTER);

            series.push(PriceSample {
                timestamp,
                display_time: display_time(timestamp, timeframe),
                price,
                volume,
                buy_volume,
                sell_volume,
                rsi,
                macd,
                bollinger_upper: price + band,
                bollinger_lower: price - band,
                order_flow_delta: buy_volume as i64 - sell_volume as i64,
                vwap,
            });
        }

        (series, walk)
    }
}

/// Date for daily bars, time of day for intraday bars.
pub fn display_time(timestamp: DateTime<Utc>, timeframe: Timeframe) -> String {
    if timeframe.is_daily() {
        timestamp.format("%Y-%m-%d").to_string()
    } else {
        timestamp.format("%H:%M:%S").to_string()
    }
}
