use std::fmt;
use thiserror::Error;

/// Which static catalog a rejected code was looked up in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileKind {
    Symbol,
    Timeframe,
}

impl fmt::Display for ProfileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfileKind::Symbol => write!(f, "symbol"),
            ProfileKind::Timeframe => write!(f, "timeframe"),
        }
    }
}

/// Errors surfaced by the dashboard core.
///
/// Everything except `AgentUnavailable` is recoverable: the caller skips the
/// operation and the previous datasets and analysis stay in place.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DashboardError {
    #[error("No price samples available to analyze")]
    EmptySeries,

    #[error("Unknown {kind} code: '{code}'")]
    InvalidProfile { kind: ProfileKind, code: String },

    #[error("An analysis is already in progress")]
    AnalysisInProgress,

    #[error("Invalid signal table: {reason}")]
    InvalidSignalTable { reason: String },

    #[error("Invalid decision thresholds: {reason}")]
    InvalidThresholds { reason: String },

    #[error("Dashboard agent is no longer running")]
    AgentUnavailable,
}

impl DashboardError {
    pub fn unknown_symbol(code: impl Into<String>) -> Self {
        DashboardError::InvalidProfile {
            kind: ProfileKind::Symbol,
            code: code.into(),
        }
    }

    pub fn unknown_timeframe(code: impl Into<String>) -> Self {
        DashboardError::InvalidProfile {
            kind: ProfileKind::Timeframe,
            code: code.into(),
        }
    }

    pub fn is_recoverable(&self) -> bool {
        !matches!(self, DashboardError::AgentUnavailable)
    }
}
