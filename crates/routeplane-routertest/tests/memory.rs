//! Runs the conformance suite against the in-memory driver.

use routeplane_router::{BackendRegistry, CapabilityToggles, RouterConfig};
use routeplane_routertest::Fixture;

fn fixture(config: RouterConfig) -> Fixture {
    let registry = BackendRegistry::in_memory().unwrap();
    let router = config.build(registry.clone()).unwrap();
    Fixture { router, registry }
}

/// Default configuration: every capability enabled.
mod full {
    routeplane_routertest::router_suite!(|| super::fixture(routeplane_router::RouterConfig::default()));
}

/// Base contract only; capability cases skip.
mod bare {
    routeplane_routertest::router_suite!(|| super::fixture(routeplane_router::RouterConfig {
        capabilities: routeplane_router::CapabilityToggles {
            opts: false,
            alias: false,
            healthcheck: false,
        },
        ..Default::default()
    }));
}

/// A custom domain changes minted addresses but none of the semantics.
mod custom_domain {
    routeplane_routertest::router_suite!(|| super::fixture(routeplane_router::RouterConfig {
        domain: "apps.example.com".to_string(),
        ..Default::default()
    }));
}

#[test]
fn toggles_default_to_enabled() {
    assert_eq!(
        RouterConfig::default().capabilities,
        CapabilityToggles {
            opts: true,
            alias: true,
            healthcheck: true,
        }
    );
}
