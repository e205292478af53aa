//! API regression tests.
//!
//! Drives the assembled HTTP router end to end: backend lifecycle, swaps,
//! aliases, the permanent registry and the service catalog.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt;

use routeplane_api::{ApiState, build_router};
use routeplane_router::{BackendRegistry, CapabilityToggles, Dispatcher, RouterConfig};
use routeplane_state::StateStore;

fn app_with(config: RouterConfig, store: StateStore) -> Router {
    let registry = BackendRegistry::new(store.clone());
    let router = config.build(registry.clone()).unwrap();
    build_router(ApiState::new(Dispatcher::new(router), registry, store))
}

fn app() -> Router {
    app_with(RouterConfig::default(), StateStore::open_in_memory().unwrap())
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let req = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn backend_lifecycle() {
    let app = app();

    let (status, _) = send(&app, "POST", "/api/v1/backends", Some(json!({"name": "web"}))).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send(
        &app,
        "POST",
        "/api/v1/backends/web/route",
        Some(json!({"route": "http://10.0.0.1:8080"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&app, "GET", "/api/v1/backends/web", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["address"], "web.routeplane.local");
    assert_eq!(body["data"]["swap"]["swapped"], false);
    assert_eq!(body["data"]["routes"][0], "http://10.0.0.1:8080/");

    let (status, _) = send(&app, "DELETE", "/api/v1/backends/web", None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, "GET", "/api/v1/backends/web", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn route_identity_ignores_scheme() {
    let app = app();
    send(&app, "POST", "/api/v1/backends", Some(json!({"name": "web"}))).await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/v1/backends/web/route",
        Some(json!({"route": "http://Web.Internal:80"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send(
        &app,
        "POST",
        "/api/v1/backends/web/route",
        Some(json!({"route": "tcp://web.internal:80"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(
        &app,
        "DELETE",
        "/api/v1/backends/web/routes",
        Some(json!({"routes": ["tcp://WEB.internal:80"]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn invalid_route_is_rejected() {
    let app = app();
    send(&app, "POST", "/api/v1/backends", Some(json!({"name": "web"}))).await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/v1/backends/web/route",
        Some(json!({"route": "not a url"})),
    )
    .await;
    assert!(status.is_client_error());
}

#[tokio::test]
async fn swap_exchanges_addresses() {
    let app = app();
    send(&app, "POST", "/api/v1/backends", Some(json!({"name": "blue"}))).await;
    send(&app, "POST", "/api/v1/backends", Some(json!({"name": "green"}))).await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/swap",
        Some(json!({"backend1": "blue", "backend2": "green"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["swapped"], true);
    assert_eq!(body["data"]["partner"], "green");

    let (_, body) = send(&app, "GET", "/api/v1/backends/blue", None).await;
    assert_eq!(body["data"]["address"], "green.routeplane.local");

    let (status, _) = send(
        &app,
        "POST",
        "/api/v1/swap",
        Some(json!({"backend1": "blue", "backend2": "blue"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Toggling back restores both addresses.
    send(
        &app,
        "POST",
        "/api/v1/swap",
        Some(json!({"backend1": "green", "backend2": "blue"})),
    )
    .await;
    let (_, body) = send(&app, "GET", "/api/v1/backends/blue", None).await;
    assert_eq!(body["data"]["address"], "blue.routeplane.local");
}

#[tokio::test]
async fn aliases_and_capabilities() {
    let app = app();
    let (_, body) = send(&app, "GET", "/api/v1/capabilities", None).await;
    assert_eq!(body["data"], json!(["opts", "alias", "healthcheck"]));

    send(&app, "POST", "/api/v1/backends", Some(json!({"name": "web"}))).await;
    let (status, _) = send(
        &app,
        "POST",
        "/api/v1/backends/web/aliases",
        Some(json!({"alias": "www.example.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, body) = send(&app, "GET", "/api/v1/backends/web/aliases", None).await;
    assert_eq!(body["data"], json!(["www.example.com"]));

    let (status, _) = send(
        &app,
        "POST",
        "/api/v1/backends/web/aliases",
        Some(json!({"alias": "www.example.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn bare_driver_answers_not_implemented() {
    let config = RouterConfig {
        capabilities: CapabilityToggles {
            opts: false,
            alias: false,
            healthcheck: false,
        },
        ..Default::default()
    };
    let app = app_with(config, StateStore::open_in_memory().unwrap());

    let (_, body) = send(&app, "GET", "/api/v1/capabilities", None).await;
    assert_eq!(body["data"], json!([]));

    let (status, _) = send(
        &app,
        "POST",
        "/api/v1/backends",
        Some(json!({"name": "web", "options": {"pool": "blue"}})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_IMPLEMENTED);

    let (status, _) = send(&app, "POST", "/api/v1/backends", Some(json!({"name": "web"}))).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send(&app, "GET", "/api/v1/backends/web/healthcheck", None).await;
    assert_eq!(status, StatusCode::NOT_IMPLEMENTED);
}

#[tokio::test]
async fn registry_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("routeplane.redb");

    {
        let app = app_with(RouterConfig::default(), StateStore::open(&path).unwrap());
        send(&app, "POST", "/api/v1/backends", Some(json!({"name": "web"}))).await;
    }

    let app = app_with(RouterConfig::default(), StateStore::open(&path).unwrap());
    let (status, body) = send(&app, "GET", "/api/v1/registry/web", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], "web");

    let (_, body) = send(&app, "GET", "/api/v1/registry", None).await;
    assert_eq!(body["data"], json!(["web"]));

    // The routing table itself starts empty.
    let (status, _) = send(&app, "GET", "/api/v1/backends/web", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn service_catalog() {
    let app = app();
    let (status, _) = send(
        &app,
        "POST",
        "/api/v1/services",
        Some(json!({
            "name": "mysql",
            "password": "s3cret",
            "endpoints": {"production": "mysql.prod.example.com"}
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        &app,
        "GET",
        "/api/v1/services/mysql/endpoints/production",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], "http://mysql.prod.example.com");

    let (status, body) = send(&app, "GET", "/api/v1/services/mysql/endpoints/qa", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Unknown endpoint: qa");

    let (_, body) = send(&app, "GET", "/api/v1/services", None).await;
    assert_eq!(body["data"][0]["username"], "mysql");
    assert!(body["data"][0].get("password").is_none());
}
