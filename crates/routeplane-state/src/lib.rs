//! routeplane-state — embedded state store for routeplane.
//!
//! Backed by [redb](https://docs.rs/redb), holds the records that must outlive
//! the routing table of any driver:
//!
//! - the backend name ledger (every name that was ever created), and
//! - the service catalog entries that map environments to base endpoints.
//!
//! All domain types are JSON-serialized into redb's `&[u8]` value columns.
//! The `StateStore` is `Clone` + `Send` + `Sync` (backed by `Arc<Database>`)
//! and can be shared across drivers and API handlers.

pub mod error;
pub mod store;
pub mod tables;
pub mod types;

pub use error::{StateError, StateResult};
pub use store::StateStore;
pub use types::*;
