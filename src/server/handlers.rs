//! HTTP request handlers
//!
//! Implementation of the REST endpoints. Every session endpoint answers with
//! a [`ServiceStatus`] payload; an unknown token is a 404 carrying the
//! distinguished NotFound status, never a bare error.

use crate::{
    server::app::AppState,
    types::{ConfirmRequest, ErrorResponse, LoginRequest, PingResponse, SendQuery, ServiceStatus},
    utils::version,
};
use axum::{
    Json as RequestJson,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use uuid::Uuid;

/// Start a login flow
///
/// POST /api/messenger/login
///
/// Mints a fresh session token, creates the session and starts the login
/// sequence. The returned token addresses all follow-up requests; the
/// sequence itself runs asynchronously and is observed via `status`.
pub async fn login(
    State(state): State<AppState>,
    RequestJson(request): RequestJson<LoginRequest>,
) -> Result<Json<ServiceStatus>, (StatusCode, Json<ErrorResponse>)> {
    if !request.is_valid() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("Invalid parameters")),
        ));
    }

    let token = Uuid::new_v4();
    tracing::debug!(%token, "received login request: {:?}", request);

    let session = state.registry.get_or_create(token).await;
    let status = session.login(&request.username, &request.password).await;
    Ok(Json(ServiceStatus::new(token, status)))
}

/// Complete a login flow with a confirmation code
///
/// POST /api/messenger/{token}/confirmLogin
pub async fn confirm_login(
    State(state): State<AppState>,
    Path(token): Path<Uuid>,
    RequestJson(request): RequestJson<ConfirmRequest>,
) -> Result<Json<ServiceStatus>, (StatusCode, Json<ServiceStatus>)> {
    let Some(session) = state.registry.get(token).await else {
        return Err((StatusCode::NOT_FOUND, Json(ServiceStatus::not_found())));
    };
    let status = session.confirm(&request.code).await;
    Ok(Json(ServiceStatus::new(token, status)))
}

/// Report a session's current status
///
/// GET /api/messenger/{token}/status
pub async fn status(
    State(state): State<AppState>,
    Path(token): Path<Uuid>,
) -> Result<Json<ServiceStatus>, (StatusCode, Json<ServiceStatus>)> {
    let Some(session) = state.registry.get(token).await else {
        return Err((StatusCode::NOT_FOUND, Json(ServiceStatus::not_found())));
    };
    Ok(Json(ServiceStatus::new(token, session.status().await)))
}

/// Send a message through a logged-in session
///
/// POST /api/messenger/{token}/send?to=..&message=..
pub async fn send_message(
    State(state): State<AppState>,
    Path(token): Path<Uuid>,
    Query(query): Query<SendQuery>,
) -> Result<Json<ServiceStatus>, (StatusCode, Json<ServiceStatus>)> {
    let Some(session) = state.registry.get(token).await else {
        return Err((StatusCode::NOT_FOUND, Json(ServiceStatus::not_found())));
    };
    let status = session.send(&query.to, &query.message).await;
    Ok(Json(ServiceStatus::new(token, status)))
}

/// Refresh a session's expiry
///
/// GET /api/messenger/{token}/keepAlive
pub async fn keep_alive(
    State(state): State<AppState>,
    Path(token): Path<Uuid>,
) -> Result<Json<ServiceStatus>, (StatusCode, Json<ServiceStatus>)> {
    // the lookup itself refreshes the expiry
    let Some(session) = state.registry.get(token).await else {
        return Err((StatusCode::NOT_FOUND, Json(ServiceStatus::not_found())));
    };
    Ok(Json(ServiceStatus::new(token, session.status().await)))
}

/// Ping endpoint for health checks
///
/// GET /ping
///
/// Returns server status and uptime information.
pub async fn ping(State(state): State<AppState>) -> Json<PingResponse> {
    let uptime = state.start_time.elapsed().as_secs();
    let response = PingResponse::new(uptime, version::get_version());

    tracing::debug!(
        "Ping response: uptime={}s, version={}",
        uptime,
        version::get_version()
    );
    Json(response)
}
