//! redb table definitions for the routeplane state store.
//!
//! Each table uses `&str` keys and `&[u8]` values (JSON-serialized domain types).

use redb::TableDefinition;

/// Backend name ledger keyed by backend name. Append-only.
pub const BACKEND_NAMES: TableDefinition<&str, &[u8]> = TableDefinition::new("backend_names");

/// Service catalog records keyed by service name.
pub const SERVICES: TableDefinition<&str, &[u8]> = TableDefinition::new("services");
