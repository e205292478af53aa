//! Driver configuration and factory.
//!
//! ```toml
//! driver = "memory"
//! domain = "apps.example.com"
//!
//! [capabilities]
//! alias = false
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{RouterError, RouterResult};
use crate::memory::MemoryRouter;
use crate::registry::BackendRegistry;
use crate::router::Router;

pub const DEFAULT_DOMAIN: &str = "routeplane.local";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RouterConfig {
    /// Driver kind. Only `"memory"` is built in.
    pub driver: String,
    /// Suffix for minted backend addresses (`{name}.{domain}`).
    pub domain: String,
    pub capabilities: CapabilityToggles,
}

/// Which optional capabilities the driver advertises.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CapabilityToggles {
    pub opts: bool,
    pub alias: bool,
    pub healthcheck: bool,
}

impl Default for CapabilityToggles {
    fn default() -> Self {
        Self {
            opts: true,
            alias: true,
            healthcheck: true,
        }
    }
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            driver: MemoryRouter::KIND.to_string(),
            domain: DEFAULT_DOMAIN.to_string(),
            capabilities: CapabilityToggles::default(),
        }
    }
}

impl RouterConfig {
    /// Build the configured driver on top of a shared registry.
    pub fn build(&self, registry: BackendRegistry) -> RouterResult<Arc<dyn Router>> {
        match self.driver.as_str() {
            kind if kind == MemoryRouter::KIND => {
                info!(domain = %self.domain, "using in-memory router driver");
                Ok(Arc::new(MemoryRouter::new(self, registry)))
            }
            other => Err(RouterError::UnknownDriver(other.to_string())),
        }
    }
}
