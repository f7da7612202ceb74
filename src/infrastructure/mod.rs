// Simulated randomness and latency
pub mod simulation;
