// Synthetic market data
pub mod generator;

pub use generator::MarketDataGenerator;
