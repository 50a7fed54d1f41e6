use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One order line: a product ordered by a pharmacy, due on a delivery date.
/// Immutable historical fact produced by order ingestion.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct OrderLine {
    pub line_id: i64,         // order line id
    pub order_id: i64,        // order header id
    pub supplier_id: i64,
    pub pharmacy_id: String,
    pub product_code: String, // code_13_ref (EAN13)
    pub ordered_qty: i32,
    pub received_qty: i32,    // reported at reception, frequently 0 or unreliable
    pub delivery_date: NaiveDate,
}

impl OrderLine {
    /// A line is tracked when the pharmacy reported any received quantity.
    pub fn is_tracked(&self) -> bool {
        self.received_qty > 0
    }
}

/// Partition extracted lines on reported received quantity: tracked (> 0)
/// and untracked (= 0). Total and disjoint.
pub fn split_by_tracking(lines: Vec<OrderLine>) -> (Vec<OrderLine>, Vec<OrderLine>) {
    lines.into_iter().partition(|l| l.is_tracked())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_line(line_id: i64, received: i32) -> OrderLine {
        OrderLine {
            line_id,
            order_id: 1,
            supplier_id: 1,
            pharmacy_id: "ph-1".to_string(),
            product_code: "3400930000001".to_string(),
            ordered_qty: 10,
            received_qty: received,
            delivery_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
        }
    }

    #[test]
    fn split_is_total_and_disjoint() {
        let lines = vec![make_line(1, 0), make_line(2, 5), make_line(3, 0), make_line(4, 12)];
        let (tracked, untracked) = split_by_tracking(lines);
        assert_eq!(tracked.iter().map(|l| l.line_id).collect::<Vec<_>>(), vec![2, 4]);
        assert_eq!(untracked.iter().map(|l| l.line_id).collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(tracked.len() + untracked.len(), 4);
    }
}
