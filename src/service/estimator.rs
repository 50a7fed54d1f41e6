use std::collections::HashMap;

use chrono::NaiveDate;

use crate::models::{ReceptionEvent, SalesRow, StockLevelRow};

/// Derive candidate reception events per product from the daily stock series.
///
/// For each observed day:
///   reception_estimate = (stock(day) − stock(previous observed day)) + sales(day)
/// A raw stock rise understates the delivery because same-day sales already
/// consumed part of it; adding them back reconstructs gross inbound units.
/// Only days whose estimate exceeds the noise floor qualify; decreases and
/// small fluctuations are shrinkage or adjustments, not receptions.
pub fn build_reception_events(
    stock: &[StockLevelRow],
    sales: &[SalesRow],
    noise_floor: i64,
) -> HashMap<String, Vec<ReceptionEvent>> {
    let sold: HashMap<(&str, NaiveDate), i64> = sales
        .iter()
        .map(|s| ((s.product_code.as_str(), s.day), s.sold_qty))
        .collect();

    let mut series: HashMap<&str, Vec<&StockLevelRow>> = HashMap::new();
    for row in stock {
        series.entry(row.product_code.as_str()).or_default().push(row);
    }

    let mut events: HashMap<String, Vec<ReceptionEvent>> = HashMap::new();
    for (product, mut days) in series {
        days.sort_by_key(|r| r.day);

        // First observation has no previous day to difference against.
        let mut candidates = Vec::new();
        for pair in days.windows(2) {
            let (prev, cur) = (pair[0], pair[1]);
            let delta_stock = cur.stock_qty - prev.stock_qty;
            let estimate = delta_stock + sold.get(&(product, cur.day)).copied().unwrap_or(0);
            if estimate > noise_floor {
                candidates.push(ReceptionEvent {
                    product_code: product.to_string(),
                    day: cur.day,
                    estimated_qty: estimate,
                });
            }
        }

        if !candidates.is_empty() {
            events.insert(product.to_string(), candidates);
        }
    }

    events
}
