// Market data domain
pub mod market;

// Trade signal domain
pub mod signals;

// Port interfaces
pub mod ports;

// Domain-specific error types
pub mod errors;
