use serde::{Deserialize, Serialize};

use crate::models::OrderLine;

/// Stockout classification. Every extracted order line receives exactly one
/// of these; the tags are the ones the dashboard consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StockoutStatus {
    /// Fully or over received.
    #[serde(rename = "OK")]
    Ok,
    /// Tracked, matched, under-received, reception within 30 days.
    #[serde(rename = "RECEPTION_PARTIELLE")]
    ReceptionPartielle,
    /// Tracked, matched, under-received, reception after more than 30 days.
    #[serde(rename = "RUPTURE_COURTE")]
    RuptureCourte,
    /// Tracked, matched, under-received, reception after more than 60 days.
    #[serde(rename = "RUPTURE_LONGUE")]
    RuptureLongue,
    /// Tracked, under-received, but no reception event could be located.
    #[serde(rename = "RUPTURE_NON_DETECTEE")]
    RuptureNonDetectee,
    /// Untracked, delivery less than 30 days old.
    #[serde(rename = "RUPTURE_TOTALE")]
    RuptureTotale,
    /// Untracked, delivery more than 30 days old.
    #[serde(rename = "RUPTURE_TOTALE_COURTE")]
    RuptureTotaleCourte,
    /// Untracked, delivery more than 60 days old.
    #[serde(rename = "RUPTURE_TOTALE_LONGUE")]
    RuptureTotaleLongue,
}

impl StockoutStatus {
    /// Everything except OK flags its reference as a rupture reference and
    /// carries its missing quantity into the rupture split.
    pub fn is_rupture(&self) -> bool {
        !matches!(self, StockoutStatus::Ok)
    }

    /// Untracked categories: the whole ordered quantity is missing.
    pub fn is_rupture_totale(&self) -> bool {
        matches!(
            self,
            StockoutStatus::RuptureTotale
                | StockoutStatus::RuptureTotaleCourte
                | StockoutStatus::RuptureTotaleLongue
        )
    }
}

/// Accepted pairing between one order line and one reception event.
/// Mutual-best-match invariant: no event is shared between lines and no line
/// carries two events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchOutcome {
    /// event day − delivery date, in days (negative when the event precedes
    /// the recorded delivery date).
    pub delay_days: i64,
    /// |estimated event quantity − reported received quantity|
    pub qty_gap: i64,
}

/// An order line with its assigned status and the quantity still missing.
#[derive(Debug, Clone)]
pub struct ClassifiedLine {
    pub line: OrderLine,
    pub status: StockoutStatus,
    pub outcome: Option<MatchOutcome>,
    pub missing_qty: i64,
}
