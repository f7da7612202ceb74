// Static catalogs
pub mod symbol;
pub mod timeframe;

// Generated datasets and their builders
pub mod order_flow;
pub mod types;
