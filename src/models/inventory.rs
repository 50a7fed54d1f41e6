use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Daily stock level for a product, summed over the pharmacies in scope.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct StockLevelRow {
    pub product_code: String,
    pub day: NaiveDate,
    pub stock_qty: i64,
}

/// Daily units sold for a product, summed over the pharmacies in scope.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct SalesRow {
    pub product_code: String,
    pub day: NaiveDate,
    pub sold_qty: i64,
}

/// Latest known weighted-average purchase price (HT) per product.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct PriceRow {
    pub product_code: String,
    pub avg_price_ht: BigDecimal,
}

/// Derived candidate reception: a day on which the stock increase plus
/// same-day sales reconstructs a material gross inbound quantity.
/// Recomputed per request, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceptionEvent {
    pub product_code: String,
    pub day: NaiveDate,
    pub estimated_qty: i64,
}
