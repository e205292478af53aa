//! Alias (CNAME) rules shared by every driver.
//!
//! Hostnames compare case-insensitively and without a trailing dot. An
//! alias may not sit at or under the address of the backend it points to,
//! otherwise resolving the alias would loop back onto itself.

use crate::error::{RouterError, RouterResult};

/// Canonical form of a hostname: trimmed, lowercase, no trailing dot.
pub fn normalize(host: &str) -> String {
    host.trim().trim_end_matches('.').to_ascii_lowercase()
}

/// Whether `alias` equals `address` or is a sub-domain of it.
pub fn is_subdomain(alias: &str, address: &str) -> bool {
    let alias = normalize(alias);
    let address = normalize(address);
    if address.is_empty() {
        return false;
    }
    alias == address || alias.ends_with(&format!(".{address}"))
}

/// Validate `alias` for a backend currently exposing `address`.
///
/// Returns the normalized alias on success.
pub fn check_allowed(alias: &str, address: &str) -> RouterResult<String> {
    let normalized = normalize(alias);
    if normalized.is_empty() || is_subdomain(&normalized, address) {
        return Err(RouterError::AliasNotAllowed);
    }
    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subdomain_detected() {
        assert!(is_subdomain("sub.b1.routeplane.local", "b1.routeplane.local"));
        assert!(is_subdomain("a.b.B1.Routeplane.Local.", "b1.routeplane.local"));
    }

    #[test]
    fn equal_host_counts_as_loop() {
        assert!(is_subdomain("b1.routeplane.local", "b1.routeplane.local"));
    }

    #[test]
    fn suffix_without_dot_boundary_is_not_subdomain() {
        assert!(!is_subdomain("xb1.routeplane.local", "b1.routeplane.local"));
        assert!(!is_subdomain("my.host.com", "b1.routeplane.local"));
    }

    #[test]
    fn check_allowed_normalizes() {
        assert_eq!(
            check_allowed("My.Host.com.", "b1.routeplane.local").unwrap(),
            "my.host.com"
        );
    }

    #[test]
    fn check_allowed_rejects_empty_and_loops() {
        assert_eq!(
            check_allowed("  ", "b1.routeplane.local"),
            Err(RouterError::AliasNotAllowed)
        );
        assert_eq!(
            check_allowed("sub.b1.routeplane.local", "b1.routeplane.local"),
            Err(RouterError::AliasNotAllowed)
        );
    }
}
