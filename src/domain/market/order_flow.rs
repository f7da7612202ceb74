use crate::domain::market::types::{
    MarketProfileEntry, OrderFlowLevel, VolumeProfileLevel, round_cents,
};
use crate::domain::ports::RandomSource;

/// Rungs in the order-flow ladder
pub const LADDER_LEVELS: usize = 30;
/// Ladder spacing as a fraction of the center price (0.1%)
pub const LADDER_STEP_FRACTION: f64 = 0.001;
/// Bid and ask sizes are drawn from [1000, 11000)
const LADDER_SIZE_RANGE: (u64, u64) = (1_000, 11_000);

pub const PROFILE_LEVELS: usize = 40;
/// Volume profile spacing as a fraction of the center price (0.2%)
pub const PROFILE_STEP_FRACTION: f64 = 0.002;
/// Generation-order index of the point of control
pub const POINT_OF_CONTROL_INDEX: usize = 20;
/// Generation-order value area, inclusive on both ends
pub const VALUE_AREA: (usize, usize) = (15, 25);
const PROFILE_VOLUME_RANGE: (u64, u64) = (2_000, 17_000);

pub const MAX_MARKET_PERIODS: usize = 24;
/// Market profile prices stay within +/-1% of center
const MARKET_PROFILE_SPREAD: f64 = 0.01;
const TPO_RANGE: (u64, u64) = (1, 16);
const MARKET_PROFILE_VOLUME_RANGE: (u64, u64) = (1_500, 9_500);

/// Builds the 30-level order-flow ladder around `center`, highest price first.
///
/// Levels span `center - 15*step ..= center + 14*step`. Cumulative delta runs
/// in display order, so the last (lowest) rung carries the ladder total.
pub fn build_order_flow_ladder<R>(center: f64, rng: &mut R) -> Vec<OrderFlowLevel>
where
    R: RandomSource + ?Sized,
{
    let step = center * LADDER_STEP_FRACTION;
    let half = (LADDER_LEVELS / 2) as f64;

    let mut levels: Vec<OrderFlowLevel> = (0..LADDER_LEVELS)
        .map(|i| {
            let price = center - half * step + i as f64 * step;
            let bid_size = rng.int_range(LADDER_SIZE_RANGE.0, LADDER_SIZE_RANGE.1);
            let ask_size = rng.int_range(LADDER_SIZE_RANGE.0, LADDER_SIZE_RANGE.1);
            let delta = bid_size as i64 - ask_size as i64;
            OrderFlowLevel {
                price: round_cents(price),
                bid_size,
                ask_size,
                delta,
                cumulative_delta: 0,
                intensity: intensity(delta, bid_size, ask_size),
            }
        })
        .collect();

    levels.reverse();

    let mut running = 0i64;
    for level in levels.iter_mut() {
        running += level.delta;
        level.cumulative_delta = running;
    }
    levels
}

fn intensity(delta: i64, bid_size: u64, ask_size: u64) -> f64 {
    let larger = bid_size.max(ask_size);
    if larger == 0 {
        return 0.0;
    }
    delta.unsigned_abs() as f64 / larger as f64
}

/// Builds the 40-level volume profile around `center`, highest price first.
pub fn build_volume_profile<R>(center: f64, rng: &mut R) -> Vec<VolumeProfileLevel>
where
    R: RandomSource + ?Sized,
{
    let step = center * PROFILE_STEP_FRACTION;
    let half = (PROFILE_LEVELS / 2) as f64;

    let mut levels: Vec<VolumeProfileLevel> = (0..PROFILE_LEVELS)
        .map(|i| VolumeProfileLevel {
            price: round_cents(center - half * step + i as f64 * step),
            volume: rng.int_range(PROFILE_VOLUME_RANGE.0, PROFILE_VOLUME_RANGE.1),
            is_point_of_control: i == POINT_OF_CONTROL_INDEX,
            in_value_area: (VALUE_AREA.0..=VALUE_AREA.1).contains(&i),
        })
        .collect();

    levels.reverse();
    levels
}

/// Letter for the n-th market profile period ('A', 'B', ...).
pub fn period_label(index: usize) -> char {
    (b'A' + (index % 26) as u8) as char
}

/// Builds one TPO entry per sub-period, at most 24.
pub fn build_market_profile<R>(center: f64, periods: usize, rng: &mut R) -> Vec<MarketProfileEntry>
where
    R: RandomSource + ?Sized,
{
    (0..periods.min(MAX_MARKET_PERIODS))
        .map(|i| {
            let price = center + rng.jitter(center * MARKET_PROFILE_SPREAD);
            let tpo_count = rng.int_range(TPO_RANGE.0, TPO_RANGE.1) as u32;
            let volume = rng.int_range(MARKET_PROFILE_VOLUME_RANGE.0, MARKET_PROFILE_VOLUME_RANGE.1);
            MarketProfileEntry {
                period_label: period_label(i),
                price: round_cents(price),
                tpo_count,
                volume,
            }
        })
        .collect()
}

/// Sum of all rung deltas
pub fn ladder_total_delta(levels: &[OrderFlowLevel]) -> i64 {
    levels.iter().map(|l| l.delta).sum()
}

pub fn point_of_control(levels: &[VolumeProfileLevel]) -> Option<&VolumeProfileLevel> {
    levels.iter().find(|l| l.is_point_of_control)
}

/// Display-order index range `(first, last)` of the value area, if it is one
/// contiguous band.
pub fn value_area_span(levels: &[VolumeProfileLevel]) -> Option<(usize, usize)> {
    let first = levels.iter().position(|l| l.in_value_area)?;
    let last = levels.iter().rposition(|l| l.in_value_area)?;
    if levels[first..=last].iter().all(|l| l.in_value_area) {
        Some((first, last))
    } else {
        None
    }
}
