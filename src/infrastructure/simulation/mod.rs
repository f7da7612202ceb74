pub mod latency_model;
pub mod random_source;

pub use latency_model::{FixedLatency, JitteredLatency, LatencyModel, ZeroLatency, latency_model};
pub use random_source::{
    SeededRandomSource, SequenceRandomSource, ThreadRandomSource, random_source,
};
