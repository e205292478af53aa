//! routeplane-routertest — conformance suite for router drivers.
//!
//! Every driver must behave identically through the routing contract. A
//! driver crate runs the suite by handing [`router_suite!`] a factory that
//! returns a fresh [`Fixture`]:
//!
//! ```ignore
//! mod memory {
//!     routeplane_routertest::router_suite!(|| {
//!         let registry = BackendRegistry::in_memory().unwrap();
//!         let router = RouterConfig::default().build(registry.clone()).unwrap();
//!         routeplane_routertest::Fixture { router, registry }
//!     });
//! }
//! ```
//!
//! Cases for optional capabilities return early when the driver does not
//! satisfy them.

use std::sync::Arc;

use routeplane_router::{BackendRegistry, Router};

pub mod cases;

/// A driver under test plus the registry it records names in.
pub struct Fixture {
    pub router: Arc<dyn Router>,
    pub registry: BackendRegistry,
}

/// Expand into one `#[test]` per conformance case.
#[macro_export]
macro_rules! router_suite {
    (@cases $factory:expr; $($case:ident),* $(,)?) => {
        $(
            #[test]
            fn $case() {
                let fixture: $crate::Fixture = ($factory)();
                $crate::cases::$case(&fixture);
            }
        )*
    };
    ($factory:expr) => {
        $crate::router_suite!(@cases $factory;
            route_add_backend_and_route,
            route_add_backend_opts_and_route,
            route_remove_route_and_backend,
            route_remove_route_other_scheme,
            route_remove_unknown_route,
            route_add_dup_backend,
            route_add_dup_route,
            route_add_dup_route_default_port,
            route_add_dup_route_mixed_case_host,
            route_add_route_invalid_backend,
            route_add_routes,
            route_add_routes_ignore_repeated,
            route_remove_routes,
            route_remove_routes_ignore_non_existing,
            swap,
            swap_twice,
            swap_restores_pre_swap_state,
            route_add_dup_alias,
            aliases,
            set_unset_alias,
            set_alias_invalid_backend,
            set_alias_subdomain_error,
            remove_backend_with_alias,
            remove_backend_after_swap,
            remove_backend_without_remove_routes,
            remove_backend_keeps_in_registry,
            set_healthcheck,
            set_healthcheck_invalid_backend,
            concurrent_swaps_keep_pair_consistent,
            concurrent_describe_is_consistent,
            concurrent_bulk_add_is_atomic,
        );
    };
}
