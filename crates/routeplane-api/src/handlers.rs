//! REST API handlers for the routing contract.
//!
//! Each handler calls the driver through the capability dispatcher and
//! returns JSON responses. Contract errors map onto HTTP status codes; an
//! optional capability the driver lacks answers 501.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use tracing::debug;

use routeplane_router::{
    BackendOptions, Capability, Dispatch, HealthcheckData, Route, RouterError,
};

use crate::ApiState;

/// Response wrapper for consistent API format.
#[derive(Serialize)]
pub(crate) struct ApiResponse<T: Serialize> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub(crate) fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            error: None,
        })
    }
}

pub(crate) fn error_response(msg: &str, status: StatusCode) -> Response {
    (
        status,
        Json(ApiResponse::<()> {
            success: false,
            data: None,
            error: Some(msg.to_string()),
        }),
    )
        .into_response()
}

/// HTTP status for a contract error.
pub fn status_for(err: &RouterError) -> StatusCode {
    match err {
        RouterError::BackendNotFound | RouterError::RouteNotFound | RouterError::AliasNotFound => {
            StatusCode::NOT_FOUND
        }
        RouterError::BackendExists
        | RouterError::RouteExists
        | RouterError::AliasExists
        | RouterError::BackendSwapped => StatusCode::CONFLICT,
        RouterError::AliasNotAllowed
        | RouterError::InvalidRoute(_)
        | RouterError::SwapWithSelf
        | RouterError::UnknownDriver(_) => StatusCode::BAD_REQUEST,
        RouterError::Driver(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn router_error(err: RouterError) -> Response {
    error_response(&err.to_string(), status_for(&err))
}

fn unsupported(capability: Capability) -> Response {
    error_response(
        &format!("router driver does not support {capability}"),
        StatusCode::NOT_IMPLEMENTED,
    )
}

/// Render a dispatched call: applied values as 200, missing capability as 501.
fn dispatched<T: Serialize>(result: Result<Dispatch<T>, RouterError>) -> Response {
    match result {
        Ok(Dispatch::Applied(value)) => ApiResponse::ok(value).into_response(),
        Ok(Dispatch::Unsupported(capability)) => unsupported(capability),
        Err(e) => router_error(e),
    }
}

// ── Request / response bodies ──────────────────────────────────

#[derive(Debug, Deserialize, Serialize)]
pub struct CreateBackendRequest {
    pub name: String,
    #[serde(default)]
    pub options: Option<BackendOptions>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct RouteRequest {
    pub route: Route,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct RoutesRequest {
    pub routes: Vec<Route>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct SwapRequest {
    pub backend1: String,
    pub backend2: String,
    #[serde(default)]
    pub force: bool,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct AliasRequest {
    pub alias: String,
}

// ── Capabilities ───────────────────────────────────────────────

/// GET /api/v1/capabilities
pub async fn list_capabilities(State(state): State<ApiState>) -> impl IntoResponse {
    ApiResponse::ok(state.dispatcher.capabilities())
}

// ── Backends ───────────────────────────────────────────────────

/// POST /api/v1/backends
pub async fn create_backend(
    State(state): State<ApiState>,
    Json(req): Json<CreateBackendRequest>,
) -> impl IntoResponse {
    match state
        .dispatcher
        .create_backend(&req.name, req.options.as_ref())
    {
        Ok(Dispatch::Applied(())) => {
            (StatusCode::CREATED, ApiResponse::ok(req.name)).into_response()
        }
        Ok(Dispatch::Unsupported(capability)) => unsupported(capability),
        Err(e) => router_error(e),
    }
}

/// GET /api/v1/backends/{name}
pub async fn get_backend(
    State(state): State<ApiState>,
    Path(name): Path<String>,
) -> impl IntoResponse {
    match state.dispatcher.router().describe(&name) {
        Ok(view) => ApiResponse::ok(view).into_response(),
        Err(e) => router_error(e),
    }
}

/// DELETE /api/v1/backends/{name}
pub async fn remove_backend(
    State(state): State<ApiState>,
    Path(name): Path<String>,
) -> impl IntoResponse {
    match state.dispatcher.router().remove_backend(&name) {
        Ok(()) => ApiResponse::ok("removed").into_response(),
        Err(e) => router_error(e),
    }
}

// ── Routes ─────────────────────────────────────────────────────

/// POST /api/v1/backends/{name}/route
pub async fn add_route(
    State(state): State<ApiState>,
    Path(name): Path<String>,
    Json(req): Json<RouteRequest>,
) -> impl IntoResponse {
    match state.dispatcher.router().add_route(&name, &req.route) {
        Ok(()) => (StatusCode::CREATED, ApiResponse::ok(req.route)).into_response(),
        Err(e) => router_error(e),
    }
}

/// DELETE /api/v1/backends/{name}/route
pub async fn remove_route(
    State(state): State<ApiState>,
    Path(name): Path<String>,
    Json(req): Json<RouteRequest>,
) -> impl IntoResponse {
    match state.dispatcher.router().remove_route(&name, &req.route) {
        Ok(()) => ApiResponse::ok("removed").into_response(),
        Err(e) => router_error(e),
    }
}

/// GET /api/v1/backends/{name}/routes
pub async fn list_routes(
    State(state): State<ApiState>,
    Path(name): Path<String>,
) -> impl IntoResponse {
    match state.dispatcher.router().routes(&name) {
        Ok(routes) => ApiResponse::ok(routes).into_response(),
        Err(e) => router_error(e),
    }
}

/// POST /api/v1/backends/{name}/routes
///
/// Converges on the submitted set: hosts already present are skipped.
pub async fn add_routes(
    State(state): State<ApiState>,
    Path(name): Path<String>,
    Json(req): Json<RoutesRequest>,
) -> impl IntoResponse {
    debug!(backend = %name, count = req.routes.len(), "bulk route add requested");
    let router = state.dispatcher.router();
    match router
        .add_routes(&name, &req.routes)
        .and_then(|()| router.routes(&name))
    {
        Ok(routes) => ApiResponse::ok(routes).into_response(),
        Err(e) => router_error(e),
    }
}

/// DELETE /api/v1/backends/{name}/routes
pub async fn remove_routes(
    State(state): State<ApiState>,
    Path(name): Path<String>,
    Json(req): Json<RoutesRequest>,
) -> impl IntoResponse {
    let router = state.dispatcher.router();
    match router
        .remove_routes(&name, &req.routes)
        .and_then(|()| router.routes(&name))
    {
        Ok(routes) => ApiResponse::ok(routes).into_response(),
        Err(e) => router_error(e),
    }
}

// ── Swap ───────────────────────────────────────────────────────

/// POST /api/v1/swap
pub async fn swap(State(state): State<ApiState>, Json(req): Json<SwapRequest>) -> impl IntoResponse {
    match state
        .dispatcher
        .router()
        .swap(&req.backend1, &req.backend2, req.force)
    {
        Ok(status) => ApiResponse::ok(status).into_response(),
        Err(e) => router_error(e),
    }
}

// ── Aliases ────────────────────────────────────────────────────

/// GET /api/v1/backends/{name}/aliases
pub async fn list_aliases(
    State(state): State<ApiState>,
    Path(name): Path<String>,
) -> impl IntoResponse {
    dispatched(state.dispatcher.aliases(&name))
}

/// POST /api/v1/backends/{name}/aliases
pub async fn set_alias(
    State(state): State<ApiState>,
    Path(name): Path<String>,
    Json(req): Json<AliasRequest>,
) -> impl IntoResponse {
    match state.dispatcher.set_alias(&req.alias, &name) {
        Ok(Dispatch::Applied(())) => {
            (StatusCode::CREATED, ApiResponse::ok(req.alias)).into_response()
        }
        Ok(Dispatch::Unsupported(capability)) => unsupported(capability),
        Err(e) => router_error(e),
    }
}

/// DELETE /api/v1/backends/{name}/aliases
pub async fn unset_alias(
    State(state): State<ApiState>,
    Path(name): Path<String>,
    Json(req): Json<AliasRequest>,
) -> impl IntoResponse {
    dispatched(state.dispatcher.unset_alias(&req.alias, &name))
}

// ── Health checks ──────────────────────────────────────────────

/// GET /api/v1/backends/{name}/healthcheck
pub async fn get_healthcheck(
    State(state): State<ApiState>,
    Path(name): Path<String>,
) -> impl IntoResponse {
    dispatched(state.dispatcher.healthcheck(&name))
}

/// PUT /api/v1/backends/{name}/healthcheck
pub async fn set_healthcheck(
    State(state): State<ApiState>,
    Path(name): Path<String>,
    Json(data): Json<HealthcheckData>,
) -> impl IntoResponse {
    dispatched(state.dispatcher.set_healthcheck(&name, &data))
}

// ── Registry ───────────────────────────────────────────────────

/// GET /api/v1/registry
pub async fn list_registry(State(state): State<ApiState>) -> impl IntoResponse {
    match state.registry.names() {
        Ok(names) => ApiResponse::ok(names).into_response(),
        Err(e) => router_error(e),
    }
}

/// GET /api/v1/registry/{name}
pub async fn retrieve_backend(
    State(state): State<ApiState>,
    Path(name): Path<String>,
) -> impl IntoResponse {
    match state.registry.retrieve(&name) {
        Ok(name) => ApiResponse::ok(name).into_response(),
        Err(e) => router_error(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use routeplane_router::{
        BackendRegistry, CapabilityToggles, Dispatcher, NameLedger, RouterConfig,
    };
    use routeplane_state::{BackendRecord, StateError, StateResult, StateStore};

    fn test_state_with(config: RouterConfig) -> ApiState {
        let store = StateStore::open_in_memory().unwrap();
        let registry = BackendRegistry::new(store.clone());
        let router = config.build(registry.clone()).unwrap();
        ApiState::new(Dispatcher::new(router), registry, store)
    }

    struct ReadOnlyLedger;

    impl NameLedger for ReadOnlyLedger {
        fn record(&self, _name: &str) -> StateResult<bool> {
            Err(StateError::Write("database is read-only".to_string()))
        }

        fn lookup(&self, _name: &str) -> StateResult<Option<BackendRecord>> {
            Ok(None)
        }

        fn entries(&self) -> StateResult<Vec<BackendRecord>> {
            Ok(Vec::new())
        }
    }

    fn test_state() -> ApiState {
        test_state_with(RouterConfig::default())
    }

    fn route(s: &str) -> Route {
        Route::parse(s).unwrap()
    }

    async fn create(state: &ApiState, name: &str) {
        let req = CreateBackendRequest {
            name: name.to_string(),
            options: None,
        };
        let resp = create_backend(State(state.clone()), Json(req))
            .await
            .into_response();
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    #[test]
    fn status_mapping() {
        assert_eq!(status_for(&RouterError::BackendNotFound), StatusCode::NOT_FOUND);
        assert_eq!(status_for(&RouterError::BackendSwapped), StatusCode::CONFLICT);
        assert_eq!(status_for(&RouterError::AliasNotAllowed), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_for(&RouterError::Driver("io".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn create_duplicate_backend_conflicts() {
        let state = test_state();
        create(&state, "b1").await;

        let req = CreateBackendRequest {
            name: "b1".to_string(),
            options: None,
        };
        let resp = create_backend(State(state), Json(req)).await.into_response();
        assert_eq!(resp.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn get_backend_not_found() {
        let state = test_state();
        let resp = get_backend(State(state), Path("nope".to_string()))
            .await
            .into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn single_add_conflicts_but_bulk_add_succeeds() {
        let state = test_state();
        create(&state, "b1").await;

        let req = RouteRequest {
            route: route("http://10.0.0.1:8080"),
        };
        let resp = add_route(State(state.clone()), Path("b1".to_string()), Json(req))
            .await
            .into_response();
        assert_eq!(resp.status(), StatusCode::CREATED);

        let req = RouteRequest {
            route: route("tcp://10.0.0.1:8080"),
        };
        let resp = add_route(State(state.clone()), Path("b1".to_string()), Json(req))
            .await
            .into_response();
        assert_eq!(resp.status(), StatusCode::CONFLICT);

        let req = RoutesRequest {
            routes: vec![route("tcp://10.0.0.1:8080"), route("http://10.0.0.2:8080")],
        };
        let resp = add_routes(State(state.clone()), Path("b1".to_string()), Json(req))
            .await
            .into_response();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(state.dispatcher.router().routes("b1").unwrap().len(), 2);
    }

    #[tokio::test]
    async fn remove_swapped_backend_conflicts() {
        let state = test_state();
        create(&state, "b1").await;
        create(&state, "b2").await;

        let req = SwapRequest {
            backend1: "b1".to_string(),
            backend2: "b2".to_string(),
            force: false,
        };
        let resp = swap(State(state.clone()), Json(req)).await.into_response();
        assert_eq!(resp.status(), StatusCode::OK);

        let resp = remove_backend(State(state), Path("b1".to_string()))
            .await
            .into_response();
        assert_eq!(resp.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn aliases_unsupported_answer_501() {
        let state = test_state_with(RouterConfig {
            capabilities: CapabilityToggles {
                alias: false,
                ..Default::default()
            },
            ..Default::default()
        });
        create(&state, "b1").await;

        let resp = list_aliases(State(state), Path("b1".to_string()))
            .await
            .into_response();
        assert_eq!(resp.status(), StatusCode::NOT_IMPLEMENTED);
    }

    #[tokio::test]
    async fn alias_subdomain_rejected() {
        let state = test_state();
        create(&state, "b1").await;
        let addr = state.dispatcher.router().addr("b1").unwrap();

        let req = AliasRequest {
            alias: format!("sub.{addr}"),
        };
        let resp = set_alias(State(state), Path("b1".to_string()), Json(req))
            .await
            .into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn registry_survives_removal() {
        let state = test_state();
        create(&state, "b1").await;
        let resp = remove_backend(State(state.clone()), Path("b1".to_string()))
            .await
            .into_response();
        assert_eq!(resp.status(), StatusCode::OK);

        let resp = retrieve_backend(State(state.clone()), Path("b1".to_string()))
            .await
            .into_response();
        assert_eq!(resp.status(), StatusCode::OK);

        let resp = retrieve_backend(State(state), Path("never".to_string()))
            .await
            .into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn healthcheck_put_then_get() {
        let state = test_state();
        create(&state, "b1").await;
        let data = HealthcheckData {
            path: "/healthz".to_string(),
            status: 200,
            body: "WORKING".to_string(),
        };
        let resp = set_healthcheck(State(state.clone()), Path("b1".to_string()), Json(data))
            .await
            .into_response();
        assert_eq!(resp.status(), StatusCode::OK);

        let resp = get_healthcheck(State(state), Path("b1".to_string()))
            .await
            .into_response();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn ledger_failure_answers_500() {
        let store = StateStore::open_in_memory().unwrap();
        let registry = BackendRegistry::with_ledger(Arc::new(ReadOnlyLedger));
        let router = RouterConfig::default().build(registry.clone()).unwrap();
        let state = ApiState::new(Dispatcher::new(router), registry, store);

        let req = CreateBackendRequest {
            name: "b1".to_string(),
            options: None,
        };
        let resp = create_backend(State(state.clone()), Json(req))
            .await
            .into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let resp = get_backend(State(state), Path("b1".to_string()))
            .await
            .into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn registry_lists_removed_backends() {
        let state = test_state();
        create(&state, "b2").await;
        create(&state, "b1").await;
        state.dispatcher.router().remove_backend("b2").unwrap();

        let resp = list_registry(State(state.clone())).await.into_response();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(state.registry.names().unwrap(), vec!["b1", "b2"]);
    }
}
