//! Network endpoints attached to a backend.
//!
//! A route is a full URL (`scheme://host[:port][/path]`) but it is keyed by
//! its authority alone, as written and lowercased: `http://10.0.0.1:80` and
//! `tcp://10.0.0.1:80` name the same route. The key never goes through URL
//! normalisation, which treats default ports and host case differently per
//! scheme.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{RouterError, RouterResult};

/// A single network endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Route {
    url: Url,
    host: String,
}

impl Route {
    /// Parse an endpoint URL. The URL must carry a host.
    pub fn parse(input: &str) -> RouterResult<Self> {
        let input = input.trim();
        let url =
            Url::parse(input).map_err(|e| RouterError::InvalidRoute(format!("{input}: {e}")))?;
        let host = authority(input)
            .filter(|host| !host.is_empty() && url.has_host())
            .ok_or_else(|| RouterError::InvalidRoute(format!("{input}: missing host")))?;
        Ok(Self {
            host: host.to_ascii_lowercase(),
            url,
        })
    }

    /// The identity key: host plus port as written, e.g. `10.0.0.1:8080`.
    pub fn host(&self) -> &str {
        &self.host
    }
}

/// `host[:port]` of a `scheme://[userinfo@]host[:port]...` string.
fn authority(input: &str) -> Option<&str> {
    let (_, rest) = input.split_once("://")?;
    let end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    let authority = &rest[..end];
    Some(authority.rsplit_once('@').map_or(authority, |(_, host)| host))
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url.as_str())
    }
}

impl FromStr for Route {
    type Err = RouterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Route::parse(s)
    }
}

impl TryFrom<String> for Route {
    type Error = RouterError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Route::parse(&value)
    }
}

impl From<Route> for String {
    fn from(route: Route) -> Self {
        route.url.into()
    }
}
