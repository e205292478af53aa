//! Capability dispatcher.
//!
//! Callers that need an optional capability go through [`Dispatcher`]: it
//! probes the driver and either runs the call or reports
//! [`Dispatch::Unsupported`]. An unsupported capability is an outcome, not
//! an error.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::RouterResult;
use crate::router::{BackendOptions, HealthcheckData, Router};

/// Optional extensions to the base contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    Opts,
    Alias,
    Healthcheck,
}

impl Capability {
    pub const ALL: [Capability; 3] = [Capability::Opts, Capability::Alias, Capability::Healthcheck];

    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::Opts => "opts",
            Capability::Alias => "alias",
            Capability::Healthcheck => "healthcheck",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a capability-gated call.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum Dispatch<T> {
    Applied(T),
    Unsupported(Capability),
}

impl<T> Dispatch<T> {
    pub fn is_applied(&self) -> bool {
        matches!(self, Dispatch::Applied(_))
    }

    pub fn applied(self) -> Option<T> {
        match self {
            Dispatch::Applied(value) => Some(value),
            Dispatch::Unsupported(_) => None,
        }
    }
}

/// Whether `router` satisfies `capability`.
pub fn supports(router: &dyn Router, capability: Capability) -> bool {
    match capability {
        Capability::Opts => router.as_opts_router().is_some(),
        Capability::Alias => router.as_alias_router().is_some(),
        Capability::Healthcheck => router.as_healthcheck_router().is_some(),
    }
}

/// Every capability `router` satisfies.
pub fn capabilities(router: &dyn Router) -> Vec<Capability> {
    Capability::ALL
        .into_iter()
        .filter(|cap| supports(router, *cap))
        .collect()
}

/// Routes platform calls into a driver, probing optional capabilities first.
#[derive(Clone)]
pub struct Dispatcher {
    router: Arc<dyn Router>,
}

impl Dispatcher {
    pub fn new(router: Arc<dyn Router>) -> Self {
        Self { router }
    }

    /// The base contract, always available.
    pub fn router(&self) -> &dyn Router {
        self.router.as_ref()
    }

    pub fn capabilities(&self) -> Vec<Capability> {
        capabilities(self.router())
    }

    /// Create a backend, with options when given.
    ///
    /// Absent or empty options go through the plain creation call when the
    /// driver has no options support; non-empty options on such a driver
    /// are reported as unsupported.
    pub fn create_backend(
        &self,
        name: &str,
        opts: Option<&BackendOptions>,
    ) -> RouterResult<Dispatch<()>> {
        match (opts, self.router.as_opts_router()) {
            (Some(opts), Some(router)) => router.add_backend_opts(name, opts)?,
            (Some(opts), None) if !opts.is_empty() => {
                return Ok(self.unsupported(Capability::Opts));
            }
            _ => self.router.add_backend(name)?,
        }
        Ok(Dispatch::Applied(()))
    }

    pub fn set_alias(&self, alias: &str, name: &str) -> RouterResult<Dispatch<()>> {
        match self.router.as_alias_router() {
            Some(router) => router.set_alias(alias, name).map(Dispatch::Applied),
            None => Ok(self.unsupported(Capability::Alias)),
        }
    }

    pub fn unset_alias(&self, alias: &str, name: &str) -> RouterResult<Dispatch<()>> {
        match self.router.as_alias_router() {
            Some(router) => router.unset_alias(alias, name).map(Dispatch::Applied),
            None => Ok(self.unsupported(Capability::Alias)),
        }
    }

    pub fn aliases(&self, name: &str) -> RouterResult<Dispatch<Vec<String>>> {
        match self.router.as_alias_router() {
            Some(router) => router.aliases(name).map(Dispatch::Applied),
            None => Ok(self.unsupported(Capability::Alias)),
        }
    }

    pub fn set_healthcheck(
        &self,
        name: &str,
        data: &HealthcheckData,
    ) -> RouterResult<Dispatch<()>> {
        match self.router.as_healthcheck_router() {
            Some(router) => router.set_healthcheck(name, data).map(Dispatch::Applied),
            None => Ok(self.unsupported(Capability::Healthcheck)),
        }
    }

    pub fn healthcheck(&self, name: &str) -> RouterResult<Dispatch<Option<HealthcheckData>>> {
        match self.router.as_healthcheck_router() {
            Some(router) => router.healthcheck(name).map(Dispatch::Applied),
            None => Ok(self.unsupported(Capability::Healthcheck)),
        }
    }

    fn unsupported<T>(&self, capability: Capability) -> Dispatch<T> {
        debug!(
            driver = self.router.kind(),
            %capability,
            "capability not supported, skipping"
        );
        Dispatch::Unsupported(capability)
    }
}
