//! routeplane-router — the routing contract of the routeplane control plane.
//!
//! Tracks, per deployed backend, the live endpoints that receive traffic,
//! the address the backend exposes, optional aliases and health-check
//! settings, and lets operators swap two backends' addresses for blue/green
//! cutover without moving either route set.
//!
//! # Components
//!
//! - **`router`**: Base contract plus the optional capability traits
//! - **`dispatch`**: Capability probing and "not supported" outcomes
//! - **`swap`**: Reversible pairing state machine
//! - **`alias`**: Alias normalization and anti-loop validation
//! - **`registry`**: Permanent backend name ledger
//! - **`memory`**: Reference in-memory driver
//! - **`config`**: Driver configuration and factory

pub mod alias;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod memory;
pub mod registry;
pub mod route;
pub mod router;
pub mod swap;

pub use config::{CapabilityToggles, RouterConfig};
pub use dispatch::{Capability, Dispatch, Dispatcher};
pub use error::{RouterError, RouterResult};
pub use memory::MemoryRouter;
pub use registry::{BackendRegistry, NameLedger};
pub use route::Route;
pub use router::{
    AliasRouter, BackendOptions, BackendSnapshot, HealthcheckData, HealthcheckRouter,
    OptsRouter, Router,
};
pub use swap::{SwapStatus, SwapTable, SwapTransition};
