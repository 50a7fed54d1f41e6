use std::sync::Arc;

use axum::{
    extract::{Json, State},
    http::HeaderMap,
};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::EngineError;
use crate::models::RuptureAnalysis;
use crate::service::{AccessScope, AnalysisRequest, RuptureEngine};

/// Request body, as produced by the dashboard filter layer
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuptureQueryRequest {
    pub date_range: Option<DateRangeDto>,
    pub comparison_date_range: Option<DateRangeDto>,
    pub product_codes: Option<Vec<String>>,
    pub laboratory_codes: Option<Vec<String>>,
    pub category_codes: Option<Vec<String>>,
    pub pharmacy_ids: Option<Vec<String>>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct DateRangeDto {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl From<RuptureQueryRequest> for AnalysisRequest {
    fn from(req: RuptureQueryRequest) -> Self {
        AnalysisRequest {
            date_range: req.date_range.map(|r| (r.start, r.end)),
            comparison_date_range: req.comparison_date_range.map(|r| (r.start, r.end)),
            product_codes: req.product_codes,
            laboratory_codes: req.laboratory_codes,
            category_codes: req.category_codes,
            pharmacy_ids: req.pharmacy_ids,
        }
    }
}

/// Health check
pub async fn health_check() -> &'static str {
    "OK"
}

/// Rupture analysis endpoint. The session layer in front of this service
/// resolves the caller: restricted users carry their pharmacy id in the
/// `x-pharmacy-id` header, admins carry nothing.
pub async fn analyze_ruptures(
    State(engine): State<Arc<RuptureEngine>>,
    headers: HeaderMap,
    Json(req): Json<RuptureQueryRequest>,
) -> Result<Json<RuptureAnalysis>, EngineError> {
    let scope = scope_from_headers(&headers);
    let request: AnalysisRequest = req.into();
    let analysis = engine.analyze(&request, &scope).await?;
    Ok(Json(analysis))
}

fn scope_from_headers(headers: &HeaderMap) -> AccessScope {
    match headers.get("x-pharmacy-id").and_then(|v| v.to_str().ok()) {
        Some(pharmacy_id) if !pharmacy_id.is_empty() => {
            AccessScope::Pharmacy(pharmacy_id.to_string())
        }
        _ => AccessScope::Admin,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_deserializes_from_dashboard_json() {
        let body = r#"{
            "dateRange": { "start": "2025-03-01", "end": "2025-03-31" },
            "comparisonDateRange": { "start": "2025-02-01", "end": "2025-02-28" },
            "laboratoryCodes": ["3400930000001"],
            "pharmacyIds": ["ph-1"]
        }"#;
        let req: RuptureQueryRequest = serde_json::from_str(body).unwrap();
        let analysis_req: AnalysisRequest = req.into();

        assert_eq!(
            analysis_req.date_range,
            Some((
                NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
                NaiveDate::from_ymd_opt(2025, 3, 31).unwrap()
            ))
        );
        assert!(analysis_req.comparison_date_range.is_some());
        assert_eq!(analysis_req.laboratory_codes, Some(vec!["3400930000001".to_string()]));
        assert_eq!(analysis_req.product_codes, None);
    }

    #[test]
    fn scope_defaults_to_admin_without_header() {
        let headers = HeaderMap::new();
        assert_eq!(scope_from_headers(&headers), AccessScope::Admin);

        let mut restricted = HeaderMap::new();
        restricted.insert("x-pharmacy-id", "ph-7".parse().unwrap());
        assert_eq!(
            scope_from_headers(&restricted),
            AccessScope::Pharmacy("ph-7".to_string())
        );
    }
}
