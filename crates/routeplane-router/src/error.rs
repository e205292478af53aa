//! Error taxonomy for the routing contract.
//!
//! The first eight variants are control-plane state conflicts that callers
//! match on by value. `Driver` carries failures from whatever sits beneath
//! a driver (storage, transport) and is never folded into a conflict.

use thiserror::Error;

use routeplane_state::StateError;

/// Result type alias for routing contract operations.
pub type RouterResult<T> = Result<T, RouterError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouterError {
    #[error("backend not found")]
    BackendNotFound,

    #[error("backend already exists")]
    BackendExists,

    #[error("backend is swapped, cannot remove")]
    BackendSwapped,

    #[error("route not found")]
    RouteNotFound,

    #[error("route already exists")]
    RouteExists,

    #[error("alias already exists")]
    AliasExists,

    #[error("alias not found")]
    AliasNotFound,

    #[error("alias as subdomain of the backend address is not allowed")]
    AliasNotAllowed,

    #[error("invalid route: {0}")]
    InvalidRoute(String),

    #[error("cannot swap a backend with itself")]
    SwapWithSelf,

    #[error("unknown router driver: {0}")]
    UnknownDriver(String),

    #[error("router driver error: {0}")]
    Driver(String),
}

impl From<StateError> for RouterError {
    fn from(e: StateError) -> Self {
        RouterError::Driver(e.to_string())
    }
}
