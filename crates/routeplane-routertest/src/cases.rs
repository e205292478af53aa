//! Conformance cases. Each one takes a fresh fixture and panics on failure.

use std::thread;

use routeplane_router::{
    AliasRouter, BackendOptions, HealthcheckData, Route, RouterError, SwapStatus,
};
use tracing::info;

use crate::Fixture;

const BACKEND1: &str = "backend1";
const BACKEND2: &str = "backend2";

fn route(s: &str) -> Route {
    Route::parse(s).expect("valid route literal")
}

/// Hosts of `routes`, sorted.
fn hosts(routes: &[Route]) -> Vec<String> {
    let mut hosts: Vec<String> = routes.iter().map(|r| r.host().to_string()).collect();
    hosts.sort();
    hosts
}

fn host_list(items: &[&Route]) -> Vec<String> {
    let mut hosts: Vec<String> = items.iter().map(|r| r.host().to_string()).collect();
    hosts.sort();
    hosts
}

fn alias_router(f: &Fixture) -> Option<&dyn AliasRouter> {
    let router = f.router.as_alias_router();
    if router.is_none() {
        info!(driver = f.router.kind(), "driver has no alias support, skipping");
    }
    router
}

fn unswapped(name: &str) -> SwapStatus {
    SwapStatus {
        swapped: false,
        partner: name.to_string(),
    }
}

fn swapped_with(name: &str) -> SwapStatus {
    SwapStatus {
        swapped: true,
        partner: name.to_string(),
    }
}

// ── Backends and routes ────────────────────────────────────────────

pub fn route_add_backend_and_route(f: &Fixture) {
    let r = &f.router;
    r.add_backend(BACKEND1).unwrap();
    let addr = route("http://10.10.10.10:8080");
    r.add_route(BACKEND1, &addr).unwrap();
    assert_eq!(hosts(&r.routes(BACKEND1).unwrap()), host_list(&[&addr]));
    r.remove_backend(BACKEND1).unwrap();
}

pub fn route_add_backend_opts_and_route(f: &Fixture) {
    let Some(opts_router) = f.router.as_opts_router() else {
        info!(driver = f.router.kind(), "driver has no options support, skipping");
        return;
    };
    opts_router
        .add_backend_opts(BACKEND1, &BackendOptions::new())
        .unwrap();
    let opts = BackendOptions::from([("pool".to_string(), "blue".to_string())]);
    assert_eq!(
        opts_router.add_backend_opts(BACKEND1, &opts),
        Err(RouterError::BackendExists)
    );
    let addr = route("http://10.10.10.10:8080");
    f.router.add_route(BACKEND1, &addr).unwrap();
    assert_eq!(hosts(&f.router.routes(BACKEND1).unwrap()), host_list(&[&addr]));
    f.router.remove_backend(BACKEND1).unwrap();
}

pub fn route_remove_route_and_backend(f: &Fixture) {
    let r = &f.router;
    r.add_backend(BACKEND1).unwrap();
    let addr1 = route("http://10.10.10.10:8080");
    let addr2 = route("http://10.10.10.11:8080");
    r.add_route(BACKEND1, &addr1).unwrap();
    r.add_route(BACKEND1, &addr2).unwrap();

    r.remove_route(BACKEND1, &addr1).unwrap();
    assert_eq!(hosts(&r.routes(BACKEND1).unwrap()), host_list(&[&addr2]));
    r.remove_route(BACKEND1, &addr2).unwrap();
    assert!(r.routes(BACKEND1).unwrap().is_empty());

    r.remove_backend(BACKEND1).unwrap();
    assert_eq!(r.remove_backend(BACKEND1), Err(RouterError::BackendNotFound));
    assert_eq!(r.routes(BACKEND1), Err(RouterError::BackendNotFound));
}

pub fn route_remove_route_other_scheme(f: &Fixture) {
    let r = &f.router;
    r.add_backend(BACKEND1).unwrap();
    r.add_route(BACKEND1, &route("http://10.10.10.10:8080")).unwrap();
    let tcp = route("tcp://10.10.10.10:8080");
    r.remove_route(BACKEND1, &tcp).unwrap();
    assert_eq!(r.remove_route(BACKEND1, &tcp), Err(RouterError::RouteNotFound));
    r.remove_backend(BACKEND1).unwrap();
}

pub fn route_remove_unknown_route(f: &Fixture) {
    let r = &f.router;
    r.add_backend(BACKEND1).unwrap();
    assert_eq!(
        r.remove_route(BACKEND1, &route("http://10.10.10.10:8080")),
        Err(RouterError::RouteNotFound)
    );
    r.remove_backend(BACKEND1).unwrap();
}

pub fn route_add_dup_backend(f: &Fixture) {
    let r = &f.router;
    r.add_backend(BACKEND1).unwrap();
    assert_eq!(r.add_backend(BACKEND1), Err(RouterError::BackendExists));
    r.remove_backend(BACKEND1).unwrap();
}

pub fn route_add_dup_route(f: &Fixture) {
    let r = &f.router;
    r.add_backend(BACKEND1).unwrap();
    let addr = route("http://10.10.10.10:8080");
    r.add_route(BACKEND1, &addr).unwrap();
    assert_eq!(r.add_route(BACKEND1, &addr), Err(RouterError::RouteExists));
    assert_eq!(
        r.add_route(BACKEND1, &route("tcp://10.10.10.10:8080")),
        Err(RouterError::RouteExists)
    );
    assert_eq!(r.routes(BACKEND1).unwrap().len(), 1);
    r.remove_backend(BACKEND1).unwrap();
}

pub fn route_add_dup_route_default_port(f: &Fixture) {
    let r = &f.router;
    r.add_backend(BACKEND1).unwrap();
    r.add_route(BACKEND1, &route("http://10.10.10.10:80")).unwrap();
    assert_eq!(
        r.add_route(BACKEND1, &route("tcp://10.10.10.10:80")),
        Err(RouterError::RouteExists)
    );
    r.add_route(BACKEND1, &route("https://10.10.10.11:443")).unwrap();
    r.remove_route(BACKEND1, &route("http://10.10.10.11:443"))
        .unwrap();
    assert_eq!(hosts(&r.routes(BACKEND1).unwrap()), vec!["10.10.10.10:80"]);
    r.remove_backend(BACKEND1).unwrap();
}

pub fn route_add_dup_route_mixed_case_host(f: &Fixture) {
    let r = &f.router;
    r.add_backend(BACKEND1).unwrap();
    r.add_route(BACKEND1, &route("http://App.Host:8080")).unwrap();
    assert_eq!(
        r.add_route(BACKEND1, &route("tcp://APP.host:8080")),
        Err(RouterError::RouteExists)
    );
    r.remove_route(BACKEND1, &route("tcp://app.host:8080")).unwrap();
    assert!(r.routes(BACKEND1).unwrap().is_empty());
    r.remove_backend(BACKEND1).unwrap();
}

pub fn route_add_route_invalid_backend(f: &Fixture) {
    assert_eq!(
        f.router
            .add_route(BACKEND1, &route("http://10.10.10.10:8080")),
        Err(RouterError::BackendNotFound)
    );
}

pub fn route_add_routes(f: &Fixture) {
    let r = &f.router;
    r.add_backend(BACKEND1).unwrap();
    let addr1 = route("http://10.10.10.10:8080");
    let addr2 = route("http://10.10.10.11:8080");
    r.add_routes(BACKEND1, &[addr1.clone(), addr2.clone()]).unwrap();
    assert_eq!(
        hosts(&r.routes(BACKEND1).unwrap()),
        host_list(&[&addr1, &addr2])
    );
    r.remove_backend(BACKEND1).unwrap();
}

pub fn route_add_routes_ignore_repeated(f: &Fixture) {
    let r = &f.router;
    r.add_backend(BACKEND1).unwrap();
    let addr1 = route("http://10.10.10.10:8080");
    let addr2 = route("http://10.10.10.11:8080");
    let addr3 = route("tcp://10.10.10.10:8080");
    r.add_route(BACKEND1, &addr1).unwrap();
    r.add_routes(BACKEND1, &[addr1.clone(), addr2.clone(), addr3, addr2.clone()])
        .unwrap();
    assert_eq!(
        hosts(&r.routes(BACKEND1).unwrap()),
        host_list(&[&addr1, &addr2])
    );
    r.remove_backend(BACKEND1).unwrap();
}

pub fn route_remove_routes(f: &Fixture) {
    let r = &f.router;
    r.add_backend(BACKEND1).unwrap();
    let addr1 = route("http://10.10.10.10:8080");
    let addr2 = route("http://10.10.10.11:8080");
    r.add_routes(BACKEND1, &[addr1.clone(), addr2.clone()]).unwrap();
    r.remove_routes(BACKEND1, &[addr1, addr2]).unwrap();
    assert!(r.routes(BACKEND1).unwrap().is_empty());
    r.remove_backend(BACKEND1).unwrap();
}

pub fn route_remove_routes_ignore_non_existing(f: &Fixture) {
    let r = &f.router;
    r.add_backend(BACKEND1).unwrap();
    let addr1 = route("http://10.10.10.10:8080");
    let addr2 = route("http://10.10.10.11:8080");
    r.add_routes(BACKEND1, &[addr1, addr2.clone()]).unwrap();
    let addr3 = route("http://10.10.10.12:8080");
    let addr1_tcp = route("tcp://10.10.10.10:8080");
    r.remove_routes(BACKEND1, &[addr1_tcp, addr3, addr2]).unwrap();
    assert!(r.routes(BACKEND1).unwrap().is_empty());
    r.remove_backend(BACKEND1).unwrap();
}

// ── Swap ───────────────────────────────────────────────────────────

pub fn swap(f: &Fixture) {
    let r = &f.router;
    let addr1 = route("http://127.0.0.1:8080");
    let addr2 = route("http://10.10.10.10:8080");
    r.add_backend(BACKEND1).unwrap();
    let backend1_orig = r.addr(BACKEND1).unwrap();
    r.add_route(BACKEND1, &addr1).unwrap();
    r.add_backend(BACKEND2).unwrap();
    let backend2_orig = r.addr(BACKEND2).unwrap();
    r.add_route(BACKEND2, &addr2).unwrap();

    assert_eq!(
        r.swap(BACKEND1, BACKEND2, false).unwrap(),
        swapped_with(BACKEND2)
    );
    assert_eq!(r.addr(BACKEND1).unwrap(), backend2_orig);
    assert_eq!(r.addr(BACKEND2).unwrap(), backend1_orig);
    assert_eq!(hosts(&r.routes(BACKEND1).unwrap()), host_list(&[&addr1]));
    assert_eq!(hosts(&r.routes(BACKEND2).unwrap()), host_list(&[&addr2]));

    // Routes added while swapped stay with the backend they were added to.
    let addr3 = route("http://127.0.0.2:8080");
    let addr4 = route("http://10.10.10.11:8080");
    r.add_route(BACKEND1, &addr3).unwrap();
    r.add_route(BACKEND2, &addr4).unwrap();
    assert_eq!(
        hosts(&r.routes(BACKEND1).unwrap()),
        host_list(&[&addr1, &addr3])
    );
    assert_eq!(
        hosts(&r.routes(BACKEND2).unwrap()),
        host_list(&[&addr2, &addr4])
    );

    r.swap(BACKEND1, BACKEND2, false).unwrap();
    r.remove_backend(BACKEND1).unwrap();
    r.remove_backend(BACKEND2).unwrap();
}

pub fn swap_twice(f: &Fixture) {
    let r = &f.router;
    let addr1 = route("http://127.0.0.1:8080");
    let addr2 = route("http://10.10.10.10:8080");
    r.add_backend(BACKEND1).unwrap();
    let backend1_orig = r.addr(BACKEND1).unwrap();
    r.add_route(BACKEND1, &addr1).unwrap();
    r.add_backend(BACKEND2).unwrap();
    let backend2_orig = r.addr(BACKEND2).unwrap();
    r.add_route(BACKEND2, &addr2).unwrap();

    assert_eq!(r.is_swapped(BACKEND1).unwrap(), unswapped(BACKEND1));
    assert_eq!(r.is_swapped(BACKEND2).unwrap(), unswapped(BACKEND2));

    r.swap(BACKEND1, BACKEND2, false).unwrap();
    assert_eq!(r.is_swapped(BACKEND1).unwrap(), swapped_with(BACKEND2));
    assert_eq!(r.is_swapped(BACKEND2).unwrap(), swapped_with(BACKEND1));
    assert_eq!(r.addr(BACKEND1).unwrap(), backend2_orig);
    assert_eq!(r.addr(BACKEND2).unwrap(), backend1_orig);
    assert_eq!(hosts(&r.routes(BACKEND1).unwrap()), host_list(&[&addr1]));
    assert_eq!(hosts(&r.routes(BACKEND2).unwrap()), host_list(&[&addr2]));

    r.swap(BACKEND1, BACKEND2, false).unwrap();
    assert_eq!(r.is_swapped(BACKEND1).unwrap(), unswapped(BACKEND1));
    assert_eq!(r.is_swapped(BACKEND2).unwrap(), unswapped(BACKEND2));
    assert_eq!(r.addr(BACKEND1).unwrap(), backend1_orig);
    assert_eq!(r.addr(BACKEND2).unwrap(), backend2_orig);
    assert_eq!(hosts(&r.routes(BACKEND1).unwrap()), host_list(&[&addr1]));
    assert_eq!(hosts(&r.routes(BACKEND2).unwrap()), host_list(&[&addr2]));

    r.remove_backend(BACKEND1).unwrap();
    r.remove_backend(BACKEND2).unwrap();
}

/// Swap is its own inverse for both values of `force`, on empty backends too.
pub fn swap_restores_pre_swap_state(f: &Fixture) {
    let r = &f.router;
    r.add_backend(BACKEND1).unwrap();
    r.add_backend(BACKEND2).unwrap();
    let before = (
        r.addr(BACKEND1).unwrap(),
        r.addr(BACKEND2).unwrap(),
        r.is_swapped(BACKEND1).unwrap(),
        r.is_swapped(BACKEND2).unwrap(),
    );
    for force in [false, true] {
        r.swap(BACKEND1, BACKEND2, force).unwrap();
        // Reversed argument order releases the same pair.
        r.swap(BACKEND2, BACKEND1, force).unwrap();
        let after = (
            r.addr(BACKEND1).unwrap(),
            r.addr(BACKEND2).unwrap(),
            r.is_swapped(BACKEND1).unwrap(),
            r.is_swapped(BACKEND2).unwrap(),
        );
        assert_eq!(after, before, "force={force}");
    }
    r.remove_backend(BACKEND1).unwrap();
    r.remove_backend(BACKEND2).unwrap();
}

// ── Aliases ────────────────────────────────────────────────────────

pub fn route_add_dup_alias(f: &Fixture) {
    let Some(r) = alias_router(f) else { return };
    r.add_backend(BACKEND1).unwrap();
    r.add_route(BACKEND1, &route("http://10.10.10.10:8080")).unwrap();
    r.set_alias("my.host.com", BACKEND1).unwrap();
    assert_eq!(
        r.set_alias("my.host.com", BACKEND1),
        Err(RouterError::AliasExists)
    );
    r.remove_backend(BACKEND1).unwrap();
}

pub fn aliases(f: &Fixture) {
    let Some(r) = alias_router(f) else { return };
    r.add_backend(BACKEND1).unwrap();
    r.add_route(BACKEND1, &route("http://10.10.10.10:8080")).unwrap();
    r.set_alias("my.host.com", BACKEND1).unwrap();
    r.set_alias("my.host2.com", BACKEND1).unwrap();

    let mut aliases = r.aliases(BACKEND1).unwrap();
    aliases.sort();
    assert_eq!(aliases, vec!["my.host.com", "my.host2.com"]);

    r.unset_alias("my.host.com", BACKEND1).unwrap();
    assert_eq!(
        r.unset_alias("my.host.com", BACKEND1),
        Err(RouterError::AliasNotFound)
    );
    assert_eq!(r.aliases(BACKEND1).unwrap(), vec!["my.host2.com"]);
    r.remove_backend(BACKEND1).unwrap();
}

pub fn set_unset_alias(f: &Fixture) {
    let Some(r) = alias_router(f) else { return };
    r.add_backend(BACKEND1).unwrap();
    r.add_route(BACKEND1, &route("http://10.10.10.10:8080")).unwrap();
    r.set_alias("my.host.com", BACKEND1).unwrap();
    r.unset_alias("my.host.com", BACKEND1).unwrap();
    assert_eq!(
        r.unset_alias("my.host.com", BACKEND1),
        Err(RouterError::AliasNotFound)
    );
    r.remove_backend(BACKEND1).unwrap();
}

pub fn set_alias_invalid_backend(f: &Fixture) {
    let Some(r) = alias_router(f) else { return };
    assert_eq!(
        r.set_alias("my.cname", BACKEND1),
        Err(RouterError::BackendNotFound)
    );
}

pub fn set_alias_subdomain_error(f: &Fixture) {
    let Some(r) = alias_router(f) else { return };
    r.add_backend(BACKEND1).unwrap();
    r.add_route(BACKEND1, &route("http://10.10.10.10:8080")).unwrap();
    r.set_alias("my.host.com", BACKEND1).unwrap();
    let addr = r.addr(BACKEND1).unwrap();
    assert_eq!(
        r.set_alias(&format!("sub.{addr}"), BACKEND1),
        Err(RouterError::AliasNotAllowed)
    );
    r.remove_backend(BACKEND1).unwrap();
}

pub fn remove_backend_with_alias(f: &Fixture) {
    let Some(r) = alias_router(f) else { return };
    r.add_backend(BACKEND1).unwrap();
    r.add_route(BACKEND1, &route("http://10.10.10.10:8080")).unwrap();
    r.set_alias("my.host.com", BACKEND1).unwrap();
    r.remove_backend(BACKEND1).unwrap();

    r.add_backend(BACKEND1).unwrap();
    assert!(r.aliases(BACKEND1).unwrap().is_empty());
    r.set_alias("my.host.com", BACKEND1).unwrap();
    r.remove_backend(BACKEND1).unwrap();
}

// ── Backend removal ────────────────────────────────────────────────

pub fn remove_backend_after_swap(f: &Fixture) {
    let r = &f.router;
    r.add_backend(BACKEND1).unwrap();
    r.add_route(BACKEND1, &route("http://127.0.0.1")).unwrap();
    r.add_backend(BACKEND2).unwrap();
    r.add_route(BACKEND2, &route("http://10.10.10.10")).unwrap();

    r.swap(BACKEND1, BACKEND2, false).unwrap();
    assert_eq!(r.remove_backend(BACKEND1), Err(RouterError::BackendSwapped));
    assert_eq!(r.remove_backend(BACKEND2), Err(RouterError::BackendSwapped));
    // The rejected removal left everything in place.
    assert_eq!(r.routes(BACKEND1).unwrap().len(), 1);

    r.swap(BACKEND1, BACKEND2, false).unwrap();
    r.remove_backend(BACKEND1).unwrap();
    r.remove_backend(BACKEND2).unwrap();
}

pub fn remove_backend_without_remove_routes(f: &Fixture) {
    let r = &f.router;
    r.add_backend(BACKEND1).unwrap();
    r.add_route(BACKEND1, &route("http://127.0.0.1")).unwrap();
    r.add_route(BACKEND1, &route("http://10.10.10.10")).unwrap();
    r.remove_backend(BACKEND1).unwrap();

    r.add_backend(BACKEND1).unwrap();
    assert!(r.routes(BACKEND1).unwrap().is_empty());
    r.remove_backend(BACKEND1).unwrap();
}

pub fn remove_backend_keeps_in_registry(f: &Fixture) {
    assert_eq!(
        f.registry.retrieve(BACKEND1),
        Err(RouterError::BackendNotFound)
    );
    f.router.add_backend(BACKEND1).unwrap();
    assert_eq!(f.registry.retrieve(BACKEND1).unwrap(), BACKEND1);

    f.router.remove_backend(BACKEND1).unwrap();
    assert_eq!(f.registry.retrieve(BACKEND1).unwrap(), BACKEND1);

    f.router.add_backend(BACKEND1).unwrap();
    assert_eq!(f.registry.retrieve(BACKEND1).unwrap(), BACKEND1);
    f.router.remove_backend(BACKEND1).unwrap();
}

// ── Health checks ──────────────────────────────────────────────────

pub fn set_healthcheck(f: &Fixture) {
    let Some(hc_router) = f.router.as_healthcheck_router() else {
        info!(driver = f.router.kind(), "driver has no healthcheck support, skipping");
        return;
    };
    f.router.add_backend(BACKEND1).unwrap();
    let data = HealthcheckData {
        path: "/".to_string(),
        status: 200,
        body: "WORKING".to_string(),
    };
    hc_router.set_healthcheck(BACKEND1, &data).unwrap();
    assert_eq!(hc_router.healthcheck(BACKEND1).unwrap(), Some(data));
    f.router.remove_backend(BACKEND1).unwrap();
}

pub fn set_healthcheck_invalid_backend(f: &Fixture) {
    let Some(hc_router) = f.router.as_healthcheck_router() else {
        info!(driver = f.router.kind(), "driver has no healthcheck support, skipping");
        return;
    };
    let data = HealthcheckData {
        path: "/healthz".to_string(),
        status: 200,
        body: String::new(),
    };
    assert_eq!(
        hc_router.set_healthcheck(BACKEND1, &data),
        Err(RouterError::BackendNotFound)
    );
}

// ── Concurrency ────────────────────────────────────────────────────

/// Concurrent togglers never leave the pair half-swapped.
pub fn concurrent_swaps_keep_pair_consistent(f: &Fixture) {
    const TOGGLERS: usize = 4;
    const TOGGLES_EACH: usize = 50;

    let r = &f.router;
    r.add_backend(BACKEND1).unwrap();
    r.add_backend(BACKEND2).unwrap();
    let orig1 = r.addr(BACKEND1).unwrap();
    let orig2 = r.addr(BACKEND2).unwrap();

    thread::scope(|s| {
        for _ in 0..TOGGLERS {
            s.spawn(|| {
                for _ in 0..TOGGLES_EACH {
                    r.swap(BACKEND1, BACKEND2, true).unwrap();
                }
            });
        }
        s.spawn(|| {
            for _ in 0..TOGGLERS * TOGGLES_EACH {
                let addr = r.addr(BACKEND1).unwrap();
                assert!(addr == orig1 || addr == orig2, "unexpected address {addr}");
                let status = r.is_swapped(BACKEND1).unwrap();
                assert!(
                    status == unswapped(BACKEND1) || status == swapped_with(BACKEND2),
                    "unexpected swap status {status:?}"
                );
            }
        });
    });

    // An even number of toggles lands back on the unswapped state.
    assert_eq!(r.is_swapped(BACKEND1).unwrap(), unswapped(BACKEND1));
    assert_eq!(r.is_swapped(BACKEND2).unwrap(), unswapped(BACKEND2));
    assert_eq!(r.addr(BACKEND1).unwrap(), orig1);
    assert_eq!(r.addr(BACKEND2).unwrap(), orig2);
}

/// A snapshot never pairs one side of a swap with the other.
pub fn concurrent_describe_is_consistent(f: &Fixture) {
    const TOGGLES: usize = 200;

    let r = &f.router;
    r.add_backend(BACKEND1).unwrap();
    r.add_backend(BACKEND2).unwrap();
    let orig1 = r.addr(BACKEND1).unwrap();
    let orig2 = r.addr(BACKEND2).unwrap();

    thread::scope(|s| {
        s.spawn(|| {
            for _ in 0..TOGGLES {
                r.swap(BACKEND1, BACKEND2, true).unwrap();
            }
        });
        s.spawn(|| {
            for _ in 0..TOGGLES {
                let view = r.describe(BACKEND1).unwrap();
                if view.swap == swapped_with(BACKEND2) {
                    assert_eq!(view.address, orig2);
                } else {
                    assert_eq!(view.swap, unswapped(BACKEND1));
                    assert_eq!(view.address, orig1);
                }
            }
        });
    });
    assert_eq!(r.describe(BACKEND1).unwrap().address, orig1);
}

/// Readers see a bulk add either not at all or completely.
pub fn concurrent_bulk_add_is_atomic(f: &Fixture) {
    const BATCH: usize = 64;

    let r = &f.router;
    r.add_backend(BACKEND1).unwrap();
    let batch: Vec<Route> = (0..BATCH)
        .map(|i| route(&format!("http://10.1.{}.{}:8080", i / 256, i % 256)))
        .collect();

    thread::scope(|s| {
        s.spawn(|| {
            r.add_routes(BACKEND1, &batch).unwrap();
            r.remove_routes(BACKEND1, &batch).unwrap();
        });
        s.spawn(|| {
            for _ in 0..200 {
                let len = r.routes(BACKEND1).unwrap().len();
                assert!(len == 0 || len == BATCH, "observed partial batch of {len}");
            }
        });
    });
    assert!(r.routes(BACKEND1).unwrap().is_empty());
}
