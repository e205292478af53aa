//! Domain types for the routeplane state store.
//!
//! These types represent the persisted backend ledger and the service
//! catalog. All types are serializable to/from JSON for storage in redb
//! tables.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{StateError, StateResult};

/// Name of a backend (case-sensitive, stable for its lifetime).
pub type BackendName = String;

// ── Backend ledger ────────────────────────────────────────────────

/// Ledger entry for a backend name that has existed at least once.
///
/// Entries are never removed: a backend's routing state can come and go,
/// but the fact that the name existed stays here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BackendRecord {
    pub name: BackendName,
    /// Unix timestamp (seconds) of the first creation.
    pub registered_at: u64,
}

impl BackendRecord {
    /// New ledger entry stamped with the current time.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            registered_at: epoch_secs(),
        }
    }
}

// ── Service catalog ───────────────────────────────────────────────

/// A service offering as kept by the catalog.
///
/// `endpoints` maps an environment name (e.g. `"production"`) to the base
/// URL of the service's control endpoint in that environment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ServiceRecord {
    pub name: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub endpoints: BTreeMap<String, String>,
    #[serde(default)]
    pub owner_teams: Vec<String>,
    #[serde(default)]
    pub restricted: bool,
}

impl ServiceRecord {
    /// Username used against the service endpoint. Falls back to the service name.
    pub fn username(&self) -> &str {
        self.username.as_deref().unwrap_or(&self.name)
    }

    /// Resolve the base URL for an environment.
    ///
    /// Endpoints stored without a scheme are assumed to be plain HTTP.
    pub fn endpoint_for(&self, env: &str) -> StateResult<String> {
        let endpoint = self
            .endpoints
            .get(env)
            .ok_or_else(|| StateError::UnknownEndpoint(env.to_string()))?;
        if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            Ok(endpoint.clone())
        } else {
            Ok(format!("http://{endpoint}"))
        }
    }
}

/// Current Unix epoch in seconds.
fn epoch_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(endpoint: &str) -> ServiceRecord {
        ServiceRecord {
            name: "redis".to_string(),
            password: "abcde".to_string(),
            endpoints: BTreeMap::from([("production".to_string(), endpoint.to_string())]),
            ..Default::default()
        }
    }

    #[test]
    fn endpoint_keeps_http_scheme() {
        let svc = service("http://mysql.api.com");
        assert_eq!(svc.endpoint_for("production").unwrap(), "http://mysql.api.com");
    }

    #[test]
    fn endpoint_keeps_https_scheme() {
        let svc = service("https://mysql.api.com");
        assert_eq!(svc.endpoint_for("production").unwrap(), "https://mysql.api.com");
    }

    #[test]
    fn endpoint_without_scheme_defaults_to_http() {
        let svc = service("mysql.api.com");
        assert_eq!(svc.endpoint_for("production").unwrap(), "http://mysql.api.com");
    }

    #[test]
    fn unknown_endpoint_message() {
        let svc = service("http://mysql.api.com");
        let err = svc.endpoint_for("staging").unwrap_err();
        assert_eq!(err.to_string(), "Unknown endpoint: staging");
    }

    #[test]
    fn username_falls_back_to_name() {
        let mut svc = service("mysql.api.com");
        assert_eq!(svc.username(), "redis");
        svc.username = Some("redis_test".to_string());
        assert_eq!(svc.username(), "redis_test");
    }

    #[test]
    fn missing_optional_fields_deserialize() {
        let svc: ServiceRecord = serde_json::from_str(r#"{"name":"pg"}"#).unwrap();
        assert_eq!(svc.name, "pg");
        assert!(svc.endpoints.is_empty());
        assert!(!svc.restricted);
    }
}
