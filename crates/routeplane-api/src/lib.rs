//! routeplane-api — REST API for routeplane.
//!
//! Exposes the routing contract and the service catalog over HTTP.
//!
//! # API Routes
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | GET | `/api/v1/capabilities` | Optional capabilities of the driver |
//! | POST | `/api/v1/backends` | Create a backend (with optional options) |
//! | GET | `/api/v1/backends/{name}` | Address, swap status and routes |
//! | DELETE | `/api/v1/backends/{name}` | Remove a backend |
//! | POST/DELETE | `/api/v1/backends/{name}/route` | Add/remove one route |
//! | GET | `/api/v1/backends/{name}/routes` | List routes |
//! | POST/DELETE | `/api/v1/backends/{name}/routes` | Bulk add/remove routes |
//! | GET/POST/DELETE | `/api/v1/backends/{name}/aliases` | Alias management |
//! | GET/PUT | `/api/v1/backends/{name}/healthcheck` | Health-check settings |
//! | POST | `/api/v1/swap` | Toggle a swap between two backends |
//! | GET | `/api/v1/registry` | Every backend name ever created |
//! | GET | `/api/v1/registry/{name}` | Permanent name lookup |
//! | GET/POST | `/api/v1/services` | List/store catalog services |
//! | GET/DELETE | `/api/v1/services/{name}` | Get/delete a catalog service |
//! | GET | `/api/v1/services/{name}/endpoints/{env}` | Resolve an environment endpoint |

pub mod catalog_handlers;
pub mod handlers;

use axum::Router;
use axum::routing::{get, post};
use routeplane_router::{BackendRegistry, Dispatcher};
use routeplane_state::StateStore;

/// Shared state for API handlers.
#[derive(Clone)]
pub struct ApiState {
    pub dispatcher: Dispatcher,
    pub registry: BackendRegistry,
    pub store: StateStore,
}

impl ApiState {
    pub fn new(dispatcher: Dispatcher, registry: BackendRegistry, store: StateStore) -> Self {
        Self {
            dispatcher,
            registry,
            store,
        }
    }
}

/// Build the complete API router.
pub fn build_router(state: ApiState) -> Router {
    let api_routes = Router::new()
        .route("/capabilities", get(handlers::list_capabilities))
        .route("/backends", post(handlers::create_backend))
        .route(
            "/backends/{name}",
            get(handlers::get_backend).delete(handlers::remove_backend),
        )
        .route(
            "/backends/{name}/route",
            post(handlers::add_route).delete(handlers::remove_route),
        )
        .route(
            "/backends/{name}/routes",
            get(handlers::list_routes)
                .post(handlers::add_routes)
                .delete(handlers::remove_routes),
        )
        .route(
            "/backends/{name}/aliases",
            get(handlers::list_aliases)
                .post(handlers::set_alias)
                .delete(handlers::unset_alias),
        )
        .route(
            "/backends/{name}/healthcheck",
            get(handlers::get_healthcheck).put(handlers::set_healthcheck),
        )
        .route("/swap", post(handlers::swap))
        .route("/registry", get(handlers::list_registry))
        .route("/registry/{name}", get(handlers::retrieve_backend))
        .route(
            "/services",
            get(catalog_handlers::list_services).post(catalog_handlers::put_service),
        )
        .route(
            "/services/{name}",
            get(catalog_handlers::get_service).delete(catalog_handlers::delete_service),
        )
        .route(
            "/services/{name}/endpoints/{env}",
            get(catalog_handlers::resolve_endpoint),
        )
        .with_state(state);

    Router::new().nest("/api/v1", api_routes)
}
