use crate::dashboard::{build_dashboard, DashboardQuery, DashboardView, FilterInput};
use crate::infra::{parse_date, AppState, Dataset};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use chrono::Local;
use maintenance_kpi::error::AppError;
use maintenance_kpi::workorders::export::{export_csv_string, EXPORT_FILE_NAME};
use maintenance_kpi::workorders::{GroupKey, WorkOrderLoader};
use serde::Deserialize;
use serde_json::json;
use std::io::Cursor;
use tracing::debug;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct DashboardRequest {
    #[serde(default)]
    pub(crate) filters: FilterInput,
    /// Reference date for aging, `YYYY-MM-DD`. Defaults to today.
    #[serde(default)]
    pub(crate) as_of: Option<String>,
    #[serde(default)]
    pub(crate) group_by: Option<String>,
    #[serde(default)]
    pub(crate) include_records: bool,
    /// Inline export to analyze instead of the configured data file.
    #[serde(default)]
    pub(crate) csv: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ExportRequest {
    #[serde(default)]
    pub(crate) filters: FilterInput,
}

pub(crate) fn router() -> Router {
    Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/v1/workorders/dashboard", post(dashboard_endpoint))
        .route("/api/v1/workorders/export", post(export_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready", "rows": state.dataset.log.len() })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn dashboard_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<DashboardRequest>,
) -> Result<Json<DashboardView>, AppError> {
    let DashboardRequest {
        filters,
        as_of,
        group_by,
        include_records,
        csv,
    } = payload;

    let as_of = match as_of {
        Some(raw) => parse_date(&raw).map_err(AppError::BadRequest)?,
        None => Local::now().date_naive(),
    };
    let group_by = group_by
        .map(|raw| raw.parse::<GroupKey>())
        .transpose()
        .map_err(|err| AppError::BadRequest(err.to_string()))?;

    let query = DashboardQuery {
        selections: filters.into_selections(),
        as_of,
        group_by,
        include_records,
    };

    let view = match csv {
        Some(csv) => {
            let log = WorkOrderLoader::from_reader(Cursor::new(csv.into_bytes()))?;
            let uploaded = Dataset::new(log, state.dataset.weekly_capacity_hours);
            build_dashboard(&uploaded, &query)
        }
        None => build_dashboard(&state.dataset, &query),
    };

    debug!(matched = view.matched, %as_of, "dashboard computed");
    Ok(Json(view))
}

pub(crate) async fn export_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<ExportRequest>,
) -> Result<impl IntoResponse, AppError> {
    let selections = payload.filters.into_selections();
    let log = &state.dataset.log;
    let selected = selections.apply(log.orders());
    let body = export_csv_string(log, selected.iter().copied())?;

    debug!(rows = selected.len(), "work-order export rendered");

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{EXPORT_FILE_NAME}\""),
            ),
        ],
        body,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;
    use tower::ServiceExt;

    const SAMPLE: &str = "OrderDate,ActualStartDateTime,ActualEndDateTime,RequiredByDate,WorkStatus,WorkType,WorkPriority,ParentLocation\n\
2024-05-27,,,2024-06-10,Open,Planned Maint.,P2,Boiler Room\n\
2024-05-01,2024-05-02 08:00:00,2024-05-02 10:00:00,2024-05-03,Completed,Breakdown,P1,Pump House\n\
2024-05-05,,,,Cancelled,Inspection,P3,Pump House\n";

    fn sample_state(ready: bool) -> AppState {
        let log = WorkOrderLoader::from_reader(Cursor::new(SAMPLE)).expect("sample loads");
        AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
            dataset: Arc::new(Dataset::new(log, 40.0)),
        }
    }

    fn post_json(uri: &str, body: &'static str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .expect("request builds")
    }

    #[tokio::test]
    async fn dashboard_endpoint_returns_core_metrics() {
        let request = DashboardRequest {
            as_of: Some("2024-06-01".to_string()),
            ..DashboardRequest::default()
        };

        let Json(view) = dashboard_endpoint(Extension(sample_state(true)), Json(request))
            .await
            .expect("dashboard builds");

        assert_eq!(view.matched, 3);
        assert_eq!(view.metrics.open_count, 1);
        assert_eq!(view.metrics.avg_aging_days, 5.0);
        assert_eq!(view.metrics.pm_compliance_pct, 0.0);
        assert_eq!(view.metrics.overall_compliance_pct, 50.0);
        assert!(view.grouped.is_none());
    }

    #[tokio::test]
    async fn dashboard_endpoint_analyzes_inline_csv() {
        let request = DashboardRequest {
            as_of: Some("2024-06-01".to_string()),
            group_by: Some("location".to_string()),
            csv: Some("WorkStatus,ParentLocation\nOpen,Dock\nClosed,Dock\n".to_string()),
            ..DashboardRequest::default()
        };

        let Json(view) = dashboard_endpoint(Extension(sample_state(true)), Json(request))
            .await
            .expect("dashboard builds");

        assert_eq!(view.matched, 2);
        let grouped = view.grouped.expect("grouping requested");
        assert_eq!(grouped.group_by, GroupKey::Location);
        assert_eq!(grouped.groups.get("Dock").map(|b| b.total_count), Some(2));
    }

    #[tokio::test]
    async fn malformed_as_of_is_a_bad_request() {
        let request = DashboardRequest {
            as_of: Some("June 1st".to_string()),
            ..DashboardRequest::default()
        };

        let error = dashboard_endpoint(Extension(sample_state(true)), Json(request))
            .await
            .expect_err("bad date rejected");
        assert!(matches!(error, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn unknown_group_key_is_a_bad_request() {
        let request = DashboardRequest {
            group_by: Some("site".to_string()),
            ..DashboardRequest::default()
        };

        let error = dashboard_endpoint(Extension(sample_state(true)), Json(request))
            .await
            .expect_err("unknown grouping rejected");
        assert!(matches!(error, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn export_route_returns_filtered_csv_attachment() {
        let app = router().layer(Extension(sample_state(true)));
        let response = app
            .oneshot(post_json(
                "/api/v1/workorders/export",
                r#"{"filters":{"locations":["Pump House"]}}"#,
            ))
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response
                .headers()
                .get(header::CONTENT_DISPOSITION)
                .and_then(|value| value.to_str().ok()),
            Some("attachment; filename=\"maintenance_report.csv\"")
        );

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body readable");
        let body = String::from_utf8(bytes.to_vec()).expect("utf8 body");
        let lines: Vec<&str> = body.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("OrderDate,"));
        assert!(lines[1..].iter().all(|line| line.ends_with("Pump House")));
    }

    #[tokio::test]
    async fn readiness_reflects_startup_flag() {
        let app = router().layer(Extension(sample_state(false)));
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/ready")
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
