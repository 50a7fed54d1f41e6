use std::collections::HashMap;

use rayon::prelude::*;

use crate::config::{MATCH_WINDOW_AFTER_DAYS, MATCH_WINDOW_BEFORE_DAYS};
use crate::models::{MatchOutcome, OrderLine, ReceptionEvent};

/// Pair tracked order lines with reception events, one product at a time.
///
/// A pair is accepted only when the event is the line's best candidate AND
/// the line is the event's best candidate (mutual rank 1). Greedy and local,
/// not a globally optimal assignment: precision over recall, so one large
/// event is never claimed by several lines and one line never absorbs
/// several events. Returns accepted outcomes keyed by line id.
///
/// Products are independent, so matching fans out per product and merges.
pub fn match_tracked_lines(
    tracked: &[OrderLine],
    events: &HashMap<String, Vec<ReceptionEvent>>,
) -> HashMap<i64, MatchOutcome> {
    let mut by_product: HashMap<&str, Vec<&OrderLine>> = HashMap::new();
    for line in tracked {
        by_product.entry(line.product_code.as_str()).or_default().push(line);
    }

    by_product
        .into_par_iter()
        .filter_map(|(product, mut lines)| {
            let candidates = events.get(product)?;
            // Deterministic ranking regardless of extraction order.
            lines.sort_by_key(|l| (l.delivery_date, l.line_id));
            Some(match_product(&lines, candidates))
        })
        .flatten()
        .collect()
}

/// Candidate score: closest quantity first, closest date breaks ties.
fn rank_key(event: &ReceptionEvent, line: &OrderLine) -> (i64, i64) {
    let qty_gap = (event.estimated_qty - i64::from(line.received_qty)).abs();
    let date_gap = (event.day - line.delivery_date).num_days().abs();
    (qty_gap, date_gap)
}

fn in_window(event: &ReceptionEvent, line: &OrderLine) -> bool {
    let delay = (event.day - line.delivery_date).num_days();
    delay >= -MATCH_WINDOW_BEFORE_DAYS && delay <= MATCH_WINDOW_AFTER_DAYS
}

fn match_product(lines: &[&OrderLine], events: &[ReceptionEvent]) -> Vec<(i64, MatchOutcome)> {
    // Rank 1 from the line's perspective.
    let best_event: Vec<Option<usize>> = lines
        .iter()
        .map(|line| {
            events
                .iter()
                .enumerate()
                .filter(|(_, ev)| in_window(ev, line))
                .min_by_key(|(_, ev)| rank_key(ev, line))
                .map(|(j, _)| j)
        })
        .collect();

    // Rank 1 from the event's perspective.
    let best_line: Vec<Option<usize>> = events
        .iter()
        .map(|ev| {
            lines
                .iter()
                .enumerate()
                .filter(|(_, line)| in_window(ev, line))
                .min_by_key(|(_, line)| rank_key(ev, line))
                .map(|(i, _)| i)
        })
        .collect();

    let mut accepted = Vec::new();
    for (i, line) in lines.iter().enumerate() {
        let Some(j) = best_event[i] else { continue };
        if best_line[j] != Some(i) {
            continue;
        }
        let event = &events[j];
        accepted.push((
            line.line_id,
            MatchOutcome {
                delay_days: (event.day - line.delivery_date).num_days(),
                qty_gap: (event.estimated_qty - i64::from(line.received_qty)).abs(),
            },
        ));
    }

    accepted
}
