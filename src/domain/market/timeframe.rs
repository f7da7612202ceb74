use crate::domain::errors::DashboardError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Chart timeframes offered by the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Timeframe {
    OneMin,
    FiveMin,
    FifteenMin,
    OneHour,
    FourHour,
    OneDay,
}

/// Static sampling configuration for a timeframe
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeframeProfile {
    pub label: &'static str,
    pub interval_ms: u64,
    pub sample_count: usize,
}

impl Timeframe {
    /// Returns the duration of this timeframe in minutes
    pub fn to_minutes(&self) -> u64 {
        match self {
            Timeframe::OneMin => 1,
            Timeframe::FiveMin => 5,
            Timeframe::FifteenMin => 15,
            Timeframe::OneHour => 60,
            Timeframe::FourHour => 240,
            Timeframe::OneDay => 1440,
        }
    }

    pub fn interval_ms(&self) -> u64 {
        self.to_minutes() * 60 * 1000
    }

    /// Number of samples generated per refresh
    pub fn sample_count(&self) -> usize {
        match self {
            Timeframe::OneMin => 100,
            Timeframe::FiveMin => 100,
            Timeframe::FifteenMin => 96,
            Timeframe::OneHour => 72,
            Timeframe::FourHour => 48,
            Timeframe::OneDay => 30,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Timeframe::OneMin => "1 Minute",
            Timeframe::FiveMin => "5 Minutes",
            Timeframe::FifteenMin => "15 Minutes",
            Timeframe::OneHour => "1 Hour",
            Timeframe::FourHour => "4 Hours",
            Timeframe::OneDay => "1 Day",
        }
    }

    /// Short selector code ("5m", "1d", ...)
    pub fn code(&self) -> &'static str {
        match self {
            Timeframe::OneMin => "1m",
            Timeframe::FiveMin => "5m",
            Timeframe::FifteenMin => "15m",
            Timeframe::OneHour => "1h",
            Timeframe::FourHour => "4h",
            Timeframe::OneDay => "1d",
        }
    }

    pub fn profile(&self) -> TimeframeProfile {
        TimeframeProfile {
            label: self.label(),
            interval_ms: self.interval_ms(),
            sample_count: self.sample_count(),
        }
    }

    /// Daily samples are displayed as dates, intraday samples as times
    pub fn is_daily(&self) -> bool {
        matches!(self, Timeframe::OneDay)
    }

    /// Refresh cadence: ten refreshes per interval, never faster than `floor`
    pub fn refresh_interval(&self, floor: Duration) -> Duration {
        Duration::from_millis(self.interval_ms() / 10).max(floor)
    }

    /// Returns all available timeframes in ascending order
    pub fn all() -> Vec<Timeframe> {
        vec![
            Timeframe::OneMin,
            Timeframe::FiveMin,
            Timeframe::FifteenMin,
            Timeframe::OneHour,
            Timeframe::FourHour,
            Timeframe::OneDay,
        ]
    }
}

impl FromStr for Timeframe {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1m" | "1min" | "onemin" => Ok(Timeframe::OneMin),
            "5m" | "5min" | "fivemin" => Ok(Timeframe::FiveMin),
            "15m" | "15min" | "fifteenmin" => Ok(Timeframe::FifteenMin),
            "1h" | "1hour" | "onehour" => Ok(Timeframe::OneHour),
            "4h" | "4hour" | "fourhour" => Ok(Timeframe::FourHour),
            "1d" | "1day" | "oneday" => Ok(Timeframe::OneDay),
            _ => Err(DashboardError::unknown_timeframe(s)),
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
