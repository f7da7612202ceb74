mod ensemble;
pub mod recommendations;

pub use ensemble::{EnsembleThresholds, SignalEnsemble, price_targets};
