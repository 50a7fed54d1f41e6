use std::collections::HashMap;

use bigdecimal::BigDecimal;
use chrono::{Duration, NaiveDate, Utc};
use indexmap::IndexSet;
use sqlx::PgPool;

use crate::config::{ESTIMATOR_MARGIN_DAYS, RECEPTION_NOISE_FLOOR};
use crate::db::queries;
use crate::error::EngineError;
use crate::models::{
    split_by_tracking, OrderLine, RuptureAnalysis, RuptureMetrics, SalesRow, StockLevelRow,
};
use crate::service::{aggregator, classifier, estimator, matcher};

/// Caller scope supplied by the session layer in front of this service:
/// admins see the whole chain, restricted users exactly one pharmacy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessScope {
    Admin,
    Pharmacy(String),
}

/// Analysis parameters, as handed over by the API layer. Dates are already
/// parsed; range ordering is validated here.
#[derive(Debug, Clone, Default)]
pub struct AnalysisRequest {
    pub date_range: Option<(NaiveDate, NaiveDate)>,
    pub comparison_date_range: Option<(NaiveDate, NaiveDate)>,
    pub product_codes: Option<Vec<String>>,
    pub laboratory_codes: Option<Vec<String>>,
    pub category_codes: Option<Vec<String>>,
    pub pharmacy_ids: Option<Vec<String>>,
}

/// A validated, inclusive analysis window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, EngineError> {
        if start > end {
            return Err(EngineError::Validation(format!(
                "date range start {} is after end {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    /// The stock/sales history span: margin days on each side so events near
    /// the window boundary can still be differenced and matched.
    pub fn widened(&self, margin_days: i64) -> (NaiveDate, NaiveDate) {
        (
            self.start - Duration::days(margin_days),
            self.end + Duration::days(margin_days),
        )
    }
}

/// Effective extraction filters after merging the caller's code sets and
/// intersecting the pharmacy filter with the session scope.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisFilters {
    /// Merged product/laboratory/category code_13_ref set; None = all.
    pub codes: Option<Vec<String>>,
    /// Pharmacy ids; None = all, empty = none qualify (empty intersection).
    pub pharmacies: Option<Vec<String>>,
}

impl AnalysisFilters {
    pub fn build(request: &AnalysisRequest, scope: &AccessScope) -> Self {
        let mut merged: IndexSet<String> = IndexSet::new();
        for set in [
            &request.product_codes,
            &request.laboratory_codes,
            &request.category_codes,
        ] {
            if let Some(values) = set {
                merged.extend(values.iter().cloned());
            }
        }
        let codes = if merged.is_empty() {
            None
        } else {
            Some(merged.into_iter().collect())
        };

        // An empty caller array means "no restriction", same as absent.
        let requested = request.pharmacy_ids.as_ref().filter(|v| !v.is_empty());
        let pharmacies = match scope {
            AccessScope::Admin => requested.map(|v| {
                v.iter().cloned().collect::<IndexSet<String>>().into_iter().collect()
            }),
            AccessScope::Pharmacy(own) => match requested {
                None => Some(vec![own.clone()]),
                Some(v) if v.contains(own) => Some(vec![own.clone()]),
                // Restricted user asked for pharmacies outside their scope:
                // a valid empty result, not an error.
                Some(_) => Some(Vec::new()),
            },
        };

        Self { codes, pharmacies }
    }
}

/// Order-to-reception reconciliation engine. Pure read-only batch
/// computation per request; nothing is cached between requests.
pub struct RuptureEngine {
    pool: PgPool,
}

impl RuptureEngine {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Validate, then run the pipeline over the primary window and, when
    /// requested, the comparison window. The two runs share filters and are
    /// independent, so they execute concurrently.
    pub async fn analyze(
        &self,
        request: &AnalysisRequest,
        scope: &AccessScope,
    ) -> Result<RuptureAnalysis, EngineError> {
        let (start, end) = request
            .date_range
            .ok_or_else(|| EngineError::Validation("dateRange is required".to_string()))?;
        let window = DateWindow::new(start, end)?;
        let filters = AnalysisFilters::build(request, scope);

        match request.comparison_date_range {
            Some((cmp_start, cmp_end)) => {
                let comparison_window = DateWindow::new(cmp_start, cmp_end)?;
                let (metrics, comparison) = tokio::try_join!(
                    self.compute_metrics(window, &filters),
                    self.compute_metrics(comparison_window, &filters),
                )?;
                Ok(RuptureAnalysis { metrics, comparison: Some(comparison) })
            }
            None => {
                let metrics = self.compute_metrics(window, &filters).await?;
                Ok(RuptureAnalysis { metrics, comparison: None })
            }
        }
    }

    /// One parameterized period computation: fetch the four datasets, then
    /// run the pure pipeline over them.
    async fn compute_metrics(
        &self,
        window: DateWindow,
        filters: &AnalysisFilters,
    ) -> Result<RuptureMetrics, EngineError> {
        // Phase 1: extraction
        let lines = queries::fetch_order_lines(
            &self.pool,
            window.start,
            window.end,
            filters.codes.as_deref(),
            filters.pharmacies.as_deref(),
        )
        .await?;

        tracing::info!(
            "Phase 1: {} order lines in [{}, {}]",
            lines.len(),
            window.start,
            window.end
        );

        if lines.is_empty() {
            return Ok(RuptureMetrics::zeroed());
        }

        // Phase 2: stock/sales history and prices, restricted to the
        // products actually ordered
        let mut ordered_codes: IndexSet<String> =
            lines.iter().map(|l| l.product_code.clone()).collect();
        ordered_codes.sort_unstable();
        let codes: Vec<String> = ordered_codes.into_iter().collect();

        let (history_from, history_to) = window.widened(ESTIMATOR_MARGIN_DAYS);
        let (stock, sales, prices) = tokio::try_join!(
            queries::fetch_stock_levels(
                &self.pool,
                history_from,
                history_to,
                &codes,
                filters.pharmacies.as_deref(),
            ),
            queries::fetch_sales(
                &self.pool,
                history_from,
                history_to,
                &codes,
                filters.pharmacies.as_deref(),
            ),
            queries::fetch_latest_prices(&self.pool, &codes),
        )?;

        tracing::info!(
            "Phase 2: {} stock rows, {} sales rows, {} priced references",
            stock.len(),
            sales.len(),
            prices.len()
        );

        let price_map: HashMap<String, BigDecimal> = prices
            .into_iter()
            .map(|p| (p.product_code, p.avg_price_ht))
            .collect();

        let today = Utc::now().date_naive();
        Ok(run_pipeline(lines, &stock, &sales, &price_map, today))
    }
}

/// Phases 2→6 of the pipeline as a pure function of in-memory datasets:
/// split, estimate, match, classify, aggregate. Identical inputs always
/// produce identical metrics.
pub fn run_pipeline(
    lines: Vec<OrderLine>,
    stock: &[StockLevelRow],
    sales: &[SalesRow],
    prices: &HashMap<String, BigDecimal>,
    today: NaiveDate,
) -> RuptureMetrics {
    let (tracked, untracked) = split_by_tracking(lines);
    tracing::info!(
        "Phase 3: {} tracked lines, {} untracked lines",
        tracked.len(),
        untracked.len()
    );

    let events = estimator::build_reception_events(stock, sales, RECEPTION_NOISE_FLOOR);
    let candidate_count: usize = events.values().map(Vec::len).sum();
    tracing::info!(
        "Phase 4: {} candidate reception events over {} products",
        candidate_count,
        events.len()
    );

    let matches = matcher::match_tracked_lines(&tracked, &events);
    tracing::info!("Phase 5: {} mutual best matches accepted", matches.len());

    let classified = classifier::classify_all(tracked, untracked, &matches, today);
    aggregator::aggregate(&classified, prices)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn line(
        line_id: i64,
        product: &str,
        ordered: i32,
        received: i32,
        delivered: NaiveDate,
    ) -> OrderLine {
        OrderLine {
            line_id,
            order_id: line_id,
            supplier_id: 1,
            pharmacy_id: "ph-1".to_string(),
            product_code: product.to_string(),
            ordered_qty: ordered,
            received_qty: received,
            delivery_date: delivered,
        }
    }

    fn stock(product: &str, d: NaiveDate, qty: i64) -> StockLevelRow {
        StockLevelRow { product_code: product.to_string(), day: d, stock_qty: qty }
    }

    mod date_window {
        use super::*;

        #[test]
        fn rejects_inverted_range() {
            let err = DateWindow::new(date(2025, 4, 1), date(2025, 3, 1)).unwrap_err();
            assert!(matches!(err, EngineError::Validation(_)));
        }

        #[test]
        fn widened_adds_margin_both_sides() {
            let w = DateWindow::new(date(2025, 3, 10), date(2025, 3, 20)).unwrap();
            let (from, to) = w.widened(30);
            assert_eq!(from, date(2025, 2, 8));
            assert_eq!(to, date(2025, 4, 19));
        }
    }

    mod filters {
        use super::*;

        #[test]
        fn code_sets_merge_into_one_deduped_set() {
            let request = AnalysisRequest {
                product_codes: Some(vec!["a".into(), "b".into()]),
                laboratory_codes: Some(vec!["b".into(), "c".into()]),
                category_codes: Some(vec!["d".into()]),
                ..Default::default()
            };
            let filters = AnalysisFilters::build(&request, &AccessScope::Admin);
            assert_eq!(filters.codes, Some(vec!["a".into(), "b".into(), "c".into(), "d".into()]));
        }

        #[test]
        fn empty_code_arrays_mean_no_restriction() {
            let request = AnalysisRequest {
                product_codes: Some(vec![]),
                ..Default::default()
            };
            let filters = AnalysisFilters::build(&request, &AccessScope::Admin);
            assert_eq!(filters.codes, None);
        }

        #[test]
        fn restricted_scope_forces_own_pharmacy() {
            let request = AnalysisRequest::default();
            let scope = AccessScope::Pharmacy("ph-9".to_string());
            let filters = AnalysisFilters::build(&request, &scope);
            assert_eq!(filters.pharmacies, Some(vec!["ph-9".to_string()]));
        }

        #[test]
        fn restricted_scope_intersects_caller_filter() {
            let scope = AccessScope::Pharmacy("ph-9".to_string());

            let overlapping = AnalysisRequest {
                pharmacy_ids: Some(vec!["ph-1".into(), "ph-9".into()]),
                ..Default::default()
            };
            let filters = AnalysisFilters::build(&overlapping, &scope);
            assert_eq!(filters.pharmacies, Some(vec!["ph-9".to_string()]));

            let disjoint = AnalysisRequest {
                pharmacy_ids: Some(vec!["ph-1".into()]),
                ..Default::default()
            };
            let filters = AnalysisFilters::build(&disjoint, &scope);
            assert_eq!(filters.pharmacies, Some(Vec::new()));
        }

        #[test]
        fn admin_passes_caller_filter_through_deduped() {
            let request = AnalysisRequest {
                pharmacy_ids: Some(vec!["ph-1".into(), "ph-2".into(), "ph-1".into()]),
                ..Default::default()
            };
            let filters = AnalysisFilters::build(&request, &AccessScope::Admin);
            assert_eq!(filters.pharmacies, Some(vec!["ph-1".to_string(), "ph-2".to_string()]));
        }
    }

    mod pipeline {
        use super::*;

        #[test]
        fn untracked_old_delivery_is_a_long_total_rupture() {
            // Ordered 100, received 0, delivered 70 days before today.
            let today = date(2025, 6, 1);
            let lines = vec![line(1, "p1", 100, 0, today - Duration::days(70))];
            let metrics = run_pipeline(lines, &[], &[], &HashMap::new(), today);

            assert_eq!(metrics.nb_ruptures_totales_longues, 1);
            assert_eq!(metrics.qte_rupture_totale, 100);
            assert_eq!(metrics.taux_reception_quantite, 0.0);
        }

        #[test]
        fn matched_full_reception_is_ok() {
            // Ordered 50, received 50, a lone reception event 10 days after
            // delivery with estimate 50.
            let today = date(2025, 6, 1);
            let delivered = date(2025, 3, 1);
            let lines = vec![line(1, "p1", 50, 50, delivered)];
            let stock_rows = vec![
                stock("p1", delivered + Duration::days(9), 5),
                stock("p1", delivered + Duration::days(10), 50),
            ];
            let sales_rows = vec![SalesRow {
                product_code: "p1".to_string(),
                day: delivered + Duration::days(10),
                sold_qty: 5,
            }];

            let metrics = run_pipeline(lines, &stock_rows, &sales_rows, &HashMap::new(), today);
            assert_eq!(metrics.nb_references_rupture, 0);
            assert_eq!(metrics.qte_rupture_partielle, 0);
            assert_eq!(metrics.nb_lignes_commandes, 1);
            assert!((metrics.taux_reception_quantite - 100.0).abs() < 1e-9);
        }

        #[test]
        fn under_received_match_45_days_late_is_a_short_rupture() {
            // Ordered 80, received 40, event 45 days after delivery.
            let today = date(2025, 6, 1);
            let delivered = date(2025, 3, 1);
            let lines = vec![line(1, "p1", 80, 40, delivered)];
            let stock_rows = vec![
                stock("p1", delivered + Duration::days(44), 0),
                stock("p1", delivered + Duration::days(45), 40),
            ];

            let metrics = run_pipeline(lines, &stock_rows, &[], &HashMap::new(), today);
            assert_eq!(metrics.nb_ruptures_partielles_courtes, 1);
            assert_eq!(metrics.nb_ruptures_partielles_longues, 0);
            assert_eq!(metrics.qte_rupture_partielle, 40);
            assert_eq!(metrics.nb_references_rupture, 1);
        }

        #[test]
        fn no_qualifying_lines_yield_all_zero_metrics() {
            let metrics =
                run_pipeline(Vec::new(), &[], &[], &HashMap::new(), date(2025, 6, 1));
            assert_eq!(metrics, RuptureMetrics::zeroed());
        }

        #[test]
        fn pipeline_is_idempotent() {
            let today = date(2025, 6, 1);
            let delivered = date(2025, 3, 1);
            let lines = vec![
                line(1, "p1", 80, 40, delivered),
                line(2, "p1", 50, 50, delivered + Duration::days(3)),
                line(3, "p2", 100, 0, today - Duration::days(40)),
            ];
            let stock_rows = vec![
                stock("p1", delivered + Duration::days(9), 5),
                stock("p1", delivered + Duration::days(10), 50),
                stock("p1", delivered + Duration::days(44), 10),
                stock("p1", delivered + Duration::days(45), 52),
            ];
            let prices: HashMap<String, BigDecimal> =
                [("p1".to_string(), BigDecimal::from(7))].into_iter().collect();

            let first = run_pipeline(lines.clone(), &stock_rows, &[], &prices, today);
            let second = run_pipeline(lines, &stock_rows, &[], &prices, today);
            assert_eq!(first, second);
        }
    }
}
