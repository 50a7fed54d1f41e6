use std::collections::HashMap;

use chrono::NaiveDate;

use crate::config::{LONG_RUPTURE_DAYS, SHORT_RUPTURE_DAYS};
use crate::models::{ClassifiedLine, MatchOutcome, OrderLine, StockoutStatus};

/// Classify every extracted line. Total: each line gets exactly one status,
/// and the missing quantity is fixed here (ordered − received for tracked
/// lines, the whole ordered quantity for untracked ones).
pub fn classify_all(
    tracked: Vec<OrderLine>,
    untracked: Vec<OrderLine>,
    matches: &HashMap<i64, MatchOutcome>,
    today: NaiveDate,
) -> Vec<ClassifiedLine> {
    let mut classified = Vec::with_capacity(tracked.len() + untracked.len());

    for line in tracked {
        let outcome = matches.get(&line.line_id).copied();
        let status = classify_tracked(&line, outcome.as_ref());
        let missing_qty = i64::from((line.ordered_qty - line.received_qty).max(0));
        classified.push(ClassifiedLine { line, status, outcome, missing_qty });
    }

    for line in untracked {
        let status = classify_untracked(&line, today);
        let missing_qty = i64::from(line.ordered_qty);
        classified.push(ClassifiedLine { line, status, outcome: None, missing_qty });
    }

    classified
}

/// Tracked lines: the match delay grades the shortage. A fully or over
/// received line is OK whether or not a reception event was located; an
/// under-received line with no locatable event is a rupture the stock data
/// never detected.
pub fn classify_tracked(line: &OrderLine, outcome: Option<&MatchOutcome>) -> StockoutStatus {
    let under_received = line.received_qty < line.ordered_qty;

    match outcome {
        Some(m) if under_received => {
            if m.delay_days > LONG_RUPTURE_DAYS {
                StockoutStatus::RuptureLongue
            } else if m.delay_days > SHORT_RUPTURE_DAYS {
                StockoutStatus::RuptureCourte
            } else {
                StockoutStatus::ReceptionPartielle
            }
        }
        Some(_) => StockoutStatus::Ok,
        None if under_received => StockoutStatus::RuptureNonDetectee,
        None => StockoutStatus::Ok,
    }
}

/// Untracked lines: nothing was ever reported received, so the age of the
/// expected delivery grades the shortage.
pub fn classify_untracked(line: &OrderLine, today: NaiveDate) -> StockoutStatus {
    let age_days = (today - line.delivery_date).num_days();
    if age_days > LONG_RUPTURE_DAYS {
        StockoutStatus::RuptureTotaleLongue
    } else if age_days > SHORT_RUPTURE_DAYS {
        StockoutStatus::RuptureTotaleCourte
    } else {
        StockoutStatus::RuptureTotale
    }
}
