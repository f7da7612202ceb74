use crate::domain::errors::DashboardError;
use serde::Serialize;

/// Static price configuration for one tradable symbol
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SymbolProfile {
    pub code: &'static str,
    pub base_price: f64,
    /// Per-step volatility in percent (2.5 = 2.5%)
    pub volatility_pct: f64,
    pub display_name: &'static str,
}

impl SymbolProfile {
    /// Volatility as a fraction (2.5% -> 0.025)
    pub fn volatility_factor(&self) -> f64 {
        self.volatility_pct / 100.0
    }
}

const SYMBOLS: &[SymbolProfile] = &[
    SymbolProfile { code: "AAPL", base_price: 175.0, volatility_pct: 2.5, display_name: "Apple Inc." },
    SymbolProfile { code: "TSLA", base_price: 240.0, volatility_pct: 8.0, display_name: "Tesla Inc." },
    SymbolProfile { code: "MSFT", base_price: 340.0, volatility_pct: 3.0, display_name: "Microsoft Corp." },
    SymbolProfile { code: "GOOGL", base_price: 140.0, volatility_pct: 4.0, display_name: "Alphabet Inc." },
    SymbolProfile { code: "AMZN", base_price: 155.0, volatility_pct: 3.5, display_name: "Amazon.com Inc." },
    SymbolProfile { code: "NVDA", base_price: 450.0, volatility_pct: 12.0, display_name: "NVIDIA Corp." },
    SymbolProfile { code: "META", base_price: 320.0, volatility_pct: 5.0, display_name: "Meta Platforms Inc." },
    SymbolProfile { code: "NFLX", base_price: 420.0, volatility_pct: 6.0, display_name: "Netflix Inc." },
    SymbolProfile { code: "SPY", base_price: 430.0, volatility_pct: 1.5, display_name: "SPDR S&P 500 ETF" },
    SymbolProfile { code: "QQQ", base_price: 380.0, volatility_pct: 2.0, display_name: "Invesco QQQ Trust" },
];

/// Fixed symbol catalog backing the symbol selector
pub struct SymbolCatalog;

impl SymbolCatalog {
    pub const DEFAULT_CODE: &'static str = "AAPL";

    /// Looks up a symbol by code (case-insensitive).
    pub fn lookup(code: &str) -> Result<&'static SymbolProfile, DashboardError> {
        let wanted = code.trim();
        SYMBOLS
            .iter()
            .find(|p| p.code.eq_ignore_ascii_case(wanted))
            .ok_or_else(|| DashboardError::unknown_symbol(code))
    }

    pub fn default_profile() -> &'static SymbolProfile {
        &SYMBOLS[0]
    }

    /// All symbols in selector order
    pub fn all() -> &'static [SymbolProfile] {
        SYMBOLS
    }

    pub fn codes() -> Vec<&'static str> {
        SYMBOLS.iter().map(|p| p.code).collect()
    }
}
