// Synthetic market data
pub mod market_data;

// Signal scoring
pub mod strategies;

// Dashboard state and its async driver
pub mod agent;
pub mod session;
