use rand::Rng;
use std::sync::Arc;
use std::time::Duration;

/// Artificial delay applied before a simulated fetch or analysis completes.
pub trait LatencyModel: Send + Sync {
    fn next_latency(&self) -> Duration;
}

/// Constant delay, the dashboard's default "API call" pause.
#[derive(Debug, Clone, Copy)]
pub struct FixedLatency(pub Duration);

impl LatencyModel for FixedLatency {
    fn next_latency(&self) -> Duration {
        self.0
    }
}

/// Base delay with symmetric random jitter.
#[derive(Debug, Clone)]
pub struct JitteredLatency {
    base_ms: u64,
    jitter_ms: u64,
}

impl JitteredLatency {
    pub fn new(base_ms: u64, jitter_ms: u64) -> Self {
        Self { base_ms, jitter_ms }
    }
}

impl LatencyModel for JitteredLatency {
    fn next_latency(&self) -> Duration {
        let mut rng = rand::rng();
        let jitter = rng.random_range(-(self.jitter_ms as i64)..=(self.jitter_ms as i64));

        let ms = (self.base_ms as i64 + jitter).max(0) as u64;
        Duration::from_millis(ms)
    }
}

/// No delay, for tests and batch runs.
pub struct ZeroLatency;

impl LatencyModel for ZeroLatency {
    fn next_latency(&self) -> Duration {
        Duration::ZERO
    }
}

/// Fixed latency unless a jitter is configured.
pub fn latency_model(base_ms: u64, jitter_ms: u64) -> Arc<dyn LatencyModel> {
    match (base_ms, jitter_ms) {
        (0, 0) => Arc::new(ZeroLatency),
        (base, 0) => Arc::new(FixedLatency(Duration::from_millis(base))),
        (base, jitter) => Arc::new(JitteredLatency::new(base, jitter)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jittered_latency_range() {
        let model = JitteredLatency::new(50, 10);
        for _ in 0..100 {
            let lat = model.next_latency().as_millis() as u64;
            assert!(
                (40..=60).contains(&lat),
                "Latency {} out of bounds [40, 60]",
                lat
            );
        }
    }

    #[test]
    fn test_jitter_never_goes_negative() {
        let model = JitteredLatency::new(5, 50);
        for _ in 0..100 {
            assert!(model.next_latency() <= Duration::from_millis(55));
        }
    }

    #[test]
    fn test_factory() {
        assert_eq!(latency_model(0, 0).next_latency(), Duration::ZERO);
        assert_eq!(latency_model(1000, 0).next_latency(), Duration::from_secs(1));
        let lat = latency_model(2000, 100).next_latency();
        assert!(lat >= Duration::from_millis(1900) && lat <= Duration::from_millis(2100));
    }
}
