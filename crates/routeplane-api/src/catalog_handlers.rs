//! Service catalog handlers.
//!
//! Catalog records carry a credential; responses never echo the password.

use std::collections::BTreeMap;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::{Deserialize, Serialize};
use tracing::info;

use routeplane_state::{ServiceRecord, StateError};

use crate::ApiState;
use crate::handlers::{ApiResponse, error_response};

/// Public view of a catalog service.
#[derive(Debug, Serialize, Deserialize)]
pub struct ServiceView {
    pub name: String,
    pub username: String,
    pub endpoints: BTreeMap<String, String>,
    pub owner_teams: Vec<String>,
    pub restricted: bool,
}

impl From<&ServiceRecord> for ServiceView {
    fn from(svc: &ServiceRecord) -> Self {
        Self {
            name: svc.name.clone(),
            username: svc.username().to_string(),
            endpoints: svc.endpoints.clone(),
            owner_teams: svc.owner_teams.clone(),
            restricted: svc.restricted,
        }
    }
}

/// GET /api/v1/services
pub async fn list_services(State(state): State<ApiState>) -> impl IntoResponse {
    match state.store.list_services() {
        Ok(services) => {
            let views: Vec<ServiceView> = services.iter().map(ServiceView::from).collect();
            ApiResponse::ok(views).into_response()
        }
        Err(e) => error_response(&e.to_string(), StatusCode::INTERNAL_SERVER_ERROR),
    }
}

/// POST /api/v1/services
pub async fn put_service(
    State(state): State<ApiState>,
    Json(svc): Json<ServiceRecord>,
) -> impl IntoResponse {
    if svc.name.trim().is_empty() {
        return error_response("service name must not be empty", StatusCode::BAD_REQUEST);
    }
    match state.store.put_service(&svc) {
        Ok(()) => {
            info!(service = %svc.name, "catalog service stored");
            (StatusCode::CREATED, ApiResponse::ok(ServiceView::from(&svc))).into_response()
        }
        Err(e) => error_response(&e.to_string(), StatusCode::INTERNAL_SERVER_ERROR),
    }
}

/// GET /api/v1/services/{name}
pub async fn get_service(
    State(state): State<ApiState>,
    Path(name): Path<String>,
) -> impl IntoResponse {
    match state.store.get_service(&name) {
        Ok(Some(svc)) => ApiResponse::ok(ServiceView::from(&svc)).into_response(),
        Ok(None) => error_response(
            &format!("service '{name}' not found"),
            StatusCode::NOT_FOUND,
        ),
        Err(e) => error_response(&e.to_string(), StatusCode::INTERNAL_SERVER_ERROR),
    }
}

/// DELETE /api/v1/services/{name}
pub async fn delete_service(
    State(state): State<ApiState>,
    Path(name): Path<String>,
) -> impl IntoResponse {
    match state.store.delete_service(&name) {
        Ok(true) => ApiResponse::ok("deleted").into_response(),
        Ok(false) => error_response(
            &format!("service '{name}' not found"),
            StatusCode::NOT_FOUND,
        ),
        Err(e) => error_response(&e.to_string(), StatusCode::INTERNAL_SERVER_ERROR),
    }
}

/// GET /api/v1/services/{name}/endpoints/{env}
pub async fn resolve_endpoint(
    State(state): State<ApiState>,
    Path((name, env)): Path<(String, String)>,
) -> impl IntoResponse {
    let svc = match state.store.get_service(&name) {
        Ok(Some(svc)) => svc,
        Ok(None) => {
            return error_response(
                &format!("service '{name}' not found"),
                StatusCode::NOT_FOUND,
            );
        }
        Err(e) => return error_response(&e.to_string(), StatusCode::INTERNAL_SERVER_ERROR),
    };
    match svc.endpoint_for(&env) {
        Ok(url) => ApiResponse::ok(url).into_response(),
        Err(e @ StateError::UnknownEndpoint(_)) => {
            error_response(&e.to_string(), StatusCode::NOT_FOUND)
        }
        Err(e) => error_response(&e.to_string(), StatusCode::INTERNAL_SERVER_ERROR),
    }
}
