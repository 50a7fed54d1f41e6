pub mod handlers;

pub use handlers::{analyze_ruptures, health_check};
