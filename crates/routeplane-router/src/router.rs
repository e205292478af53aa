//! The routing contract.
//!
//! [`Router`] is the base contract every driver implements. Three optional
//! capabilities extend it: [`OptsRouter`], [`AliasRouter`] and
//! [`HealthcheckRouter`]. A driver advertises a capability by overriding the
//! matching `as_*` probe on [`Router`]; the default probes return `None`, so
//! drivers never carry no-op stubs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::RouterResult;
use crate::route::Route;
use crate::swap::SwapStatus;

/// Opaque creation options passed through to the driver.
pub type BackendOptions = BTreeMap<String, String>;

/// Health-check settings stored for external probing infrastructure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthcheckData {
    /// HTTP path to probe (e.g., "/healthz").
    pub path: String,
    /// Expected response status code.
    #[serde(default)]
    pub status: u16,
    /// Fragment the response body must contain.
    #[serde(default)]
    pub body: String,
}

/// Observable state of one live backend, read under a single lock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendSnapshot {
    pub name: String,
    /// Address exposed right now (the partner's while swapped).
    pub address: String,
    pub swap: SwapStatus,
    pub routes: Vec<Route>,
    /// Creation options; empty when created without any.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub options: BackendOptions,
}

/// Base routing contract.
///
/// Every mutation is atomic with respect to the backend names it touches.
/// Bulk route operations converge on the requested state and skip entries
/// that already satisfy it; the single forms fail on conflict.
pub trait Router: Send + Sync {
    /// Short driver identifier used in logs (e.g., "memory").
    fn kind(&self) -> &'static str;

    /// Create a backend. Fails with `BackendExists` if it is already live.
    fn add_backend(&self, name: &str) -> RouterResult<()>;

    /// Remove a live, unswapped backend along with its routes and aliases.
    ///
    /// The name stays in the backend registry.
    fn remove_backend(&self, name: &str) -> RouterResult<()>;

    /// Add one route. Fails with `RouteExists` if the host is already present.
    fn add_route(&self, name: &str, route: &Route) -> RouterResult<()>;

    /// Add routes, skipping hosts that are already present.
    fn add_routes(&self, name: &str, routes: &[Route]) -> RouterResult<()>;

    /// Remove one route by host. Fails with `RouteNotFound` if absent.
    fn remove_route(&self, name: &str, route: &Route) -> RouterResult<()>;

    /// Remove routes by host, skipping hosts that are absent.
    fn remove_routes(&self, name: &str, routes: &[Route]) -> RouterResult<()>;

    /// Current routes of a live backend, in no particular order.
    fn routes(&self, name: &str) -> RouterResult<Vec<Route>>;

    /// Address the backend currently exposes (its partner's while swapped).
    fn addr(&self, name: &str) -> RouterResult<String>;

    /// Toggle the swap relation between two backends.
    ///
    /// `force` skips driver-specific secondary validation. Returns the
    /// status of `backend1` as left by this call.
    fn swap(&self, backend1: &str, backend2: &str, force: bool) -> RouterResult<SwapStatus>;

    /// Whether the backend is paired, and with whom.
    fn is_swapped(&self, name: &str) -> RouterResult<SwapStatus>;

    /// Address, swap status and routes of a live backend as one consistent
    /// view; a concurrent swap is seen either entirely or not at all.
    fn describe(&self, name: &str) -> RouterResult<BackendSnapshot>;

    fn as_opts_router(&self) -> Option<&dyn OptsRouter> {
        None
    }

    fn as_alias_router(&self) -> Option<&dyn AliasRouter> {
        None
    }

    fn as_healthcheck_router(&self) -> Option<&dyn HealthcheckRouter> {
        None
    }
}

/// Creation with driver options.
pub trait OptsRouter: Router {
    /// Same as [`Router::add_backend`]; empty options behave identically.
    fn add_backend_opts(&self, name: &str, opts: &BackendOptions) -> RouterResult<()>;
}

/// Alias management.
pub trait AliasRouter: Router {
    fn set_alias(&self, alias: &str, name: &str) -> RouterResult<()>;

    fn unset_alias(&self, alias: &str, name: &str) -> RouterResult<()>;

    fn aliases(&self, name: &str) -> RouterResult<Vec<String>>;
}

/// Custom health-check configuration.
pub trait HealthcheckRouter: Router {
    fn set_healthcheck(&self, name: &str, data: &HealthcheckData) -> RouterResult<()>;

    fn healthcheck(&self, name: &str) -> RouterResult<Option<HealthcheckData>>;
}
