use crate::api::MgmtState;
use crate::api::schemas::health::HealthResponse;
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

/// Liveness probe: returns 200 OK as long as the server is running.
pub async fn livez() -> impl IntoResponse {
    StatusCode::OK
}

/// Readiness probe: checks connectivity to the backing store.
pub async fn readyz(State(state): State<MgmtState>) -> impl IntoResponse {
    let store_status = if let Err(e) = state.health_service.check_store().await {
        tracing::warn!(error = %e, component = "store", "Readiness probe failed");
        "error"
    } else {
        "ok"
    };

    let status_code = if store_status == "ok" { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };

    let response = HealthResponse {
        status: if status_code == StatusCode::OK { "ok" } else { "error" }.to_string(),
        store: store_status.to_string(),
    };

    (status_code, Json(response))
}
