use serde::{Deserialize, Serialize};

/// Minimum estimated inbound quantity (stock delta + same-day sales) for a
/// day to count as a reception event. Smaller movements are shrinkage or
/// inventory adjustments, not deliveries.
pub const RECEPTION_NOISE_FLOOR: i64 = 10;

/// Candidate search window around an order's delivery date, in days.
pub const MATCH_WINDOW_BEFORE_DAYS: i64 = 5;
pub const MATCH_WINDOW_AFTER_DAYS: i64 = 90;

/// Delay cutoffs separating short from long ruptures.
pub const SHORT_RUPTURE_DAYS: i64 = 30;
pub const LONG_RUPTURE_DAYS: i64 = 60;

/// Extra days of stock/sales history loaded on each side of the analysis
/// window so events anchored near the boundary can still be matched.
pub const ESTIMATOR_MARGIN_DAYS: i64 = 30;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            database: DatabaseConfig {
                url: std::env::var("DATABASE_URL")
                    .unwrap_or_else(|_| "postgres://localhost/pharma_analytics".to_string()),
            },
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            server: ServerConfig {
                host: std::env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
                port: std::env::var("SERVER_PORT")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(8080),
            },
            database: DatabaseConfig {
                url: std::env::var("DATABASE_URL")
                    .unwrap_or_else(|_| "postgres://localhost/pharma_analytics".to_string()),
            },
        }
    }
}
