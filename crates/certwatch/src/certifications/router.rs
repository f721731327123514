use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use serde_json::json;

use super::repository::{AlertNotifier, CertificationStore};
use super::service::CertificationAlertService;

/// Router builder exposing the certification endpoints.
pub fn certification_router<S, N>(service: Arc<CertificationAlertService<S, N>>) -> Router
where
    S: CertificationStore + 'static,
    N: AlertNotifier + 'static,
{
    Router::new()
        .route("/api/v1/alerts/scan", post(scan_handler::<S, N>))
        .route(
            "/api/v1/certifications/stats",
            get(stats_handler::<S, N>),
        )
        .route("/api/v1/verify/:code", get(verify_handler::<S, N>))
        .with_state(service)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ScanRequest {
    /// Override the reference date, mainly for drills and tests.
    pub(crate) today: Option<NaiveDate>,
}

pub(crate) async fn scan_handler<S, N>(
    State(service): State<Arc<CertificationAlertService<S, N>>>,
    payload: Option<Json<ScanRequest>>,
) -> Response
where
    S: CertificationStore + 'static,
    N: AlertNotifier + 'static,
{
    let request = payload.map(|Json(body)| body).unwrap_or_default();
    let today = request.today.unwrap_or_else(|| Local::now().date_naive());

    match service.scan(today) {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(err) => internal_error(err),
    }
}

pub(crate) async fn stats_handler<S, N>(
    State(service): State<Arc<CertificationAlertService<S, N>>>,
) -> Response
where
    S: CertificationStore + 'static,
    N: AlertNotifier + 'static,
{
    let today = Local::now().date_naive();
    match service.stats(today) {
        Ok(stats) => (StatusCode::OK, Json(stats)).into_response(),
        Err(err) => internal_error(err),
    }
}

pub(crate) async fn verify_handler<S, N>(
    State(service): State<Arc<CertificationAlertService<S, N>>>,
    Path(code): Path<String>,
) -> Response
where
    S: CertificationStore + 'static,
    N: AlertNotifier + 'static,
{
    match service.verify(&code) {
        Ok(Some(view)) => {
            let payload = json!({
                "valid": true,
                "message": "Diploma válido",
                "worker": view.worker,
                "national_id": view.national_id,
                "course": view.course,
                "expires_on": view.expires_on,
                "work_center": view.work_center,
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Ok(None) => {
            let payload = json!({
                "valid": false,
                "message": format!("Código \"{code}\" no encontrado"),
            });
            (StatusCode::NOT_FOUND, Json(payload)).into_response()
        }
        Err(err) => internal_error(err),
    }
}

// Unexpected internal failures surface as a generic summary; detail stays in
// the server log.
fn internal_error(err: super::service::AlertServiceError) -> Response {
    tracing::error!(error = %err, "certification endpoint failed");
    let payload = json!({ "error": "internal error" });
    (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
}
