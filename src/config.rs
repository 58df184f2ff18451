use std::path::PathBuf;

/// Size labels in display order. Every `SizeQuantities` carries exactly these.
pub const SIZES: [&str; 9] = ["#2", "#3", "#4", "#5", "#6", "#7", "#8", "#9", "#10"];

/// Pairs packed per shipping box.
pub const PAIRS_PER_BOX: u64 = 20;

/// Value-added tax applied to every order and quote.
pub const IVA_RATE: f64 = 0.16;

/// Share of the order total requested up front.
pub const DEPOSIT_RATE: f64 = 0.5;

/// Production times (in calendar days) offered by both forms.
pub const PRODUCTION_TIME_OPTIONS: [u32; 23] = [
    5, 8, 10, 15, 20, 25, 30, 35, 40, 45, 50, 55, 60, 65, 70, 75, 80, 85, 90, 95, 100, 120, 150,
];

/// Storage key of the order history collection.
pub const ORDER_HISTORY_KEY: &str = "orderHistory";

/// Storage key of the quote history collection.
pub const QUOTE_HISTORY_KEY: &str = "quoteHistory";

pub const DB_PATH_ENV: &str = "WORKSHOP_DB";
pub const DEFAULT_DB_PATH: &str = "workshop_ledger.db";

/// Runtime configuration of the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub db_path: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
        }
    }
}

impl AppConfig {
    /// Resolves the database path: explicit flag, then `WORKSHOP_DB`, then the default file.
    pub fn resolve(flag: Option<PathBuf>) -> Self {
        let db_path = flag
            .or_else(|| std::env::var_os(DB_PATH_ENV).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH));
        AppConfig { db_path }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_flag_wins() {
        let cfg = AppConfig::resolve(Some(PathBuf::from("/tmp/other.db")));
        assert_eq!(cfg.db_path, PathBuf::from("/tmp/other.db"));
    }

    #[test]
    fn production_options_are_ascending() {
        assert!(PRODUCTION_TIME_OPTIONS.windows(2).all(|w| w[0] < w[1]));
    }
}
