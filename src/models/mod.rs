pub mod inventory;
pub mod metrics;
pub mod order;
pub mod status;

pub use inventory::{PriceRow, ReceptionEvent, SalesRow, StockLevelRow};
pub use metrics::{RuptureAnalysis, RuptureMetrics};
pub use order::{split_by_tracking, OrderLine};
pub use status::{ClassifiedLine, MatchOutcome, StockoutStatus};
