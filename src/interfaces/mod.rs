// Read-only view models for the rendering boundary
pub mod snapshot;
