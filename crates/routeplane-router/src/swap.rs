//! Swap engine: the reversible pairing relation between two backends.
//!
//! Each backend is either unswapped (its partner is itself) or paired with
//! exactly one other backend. Swapping an unswapped pair pairs them;
//! swapping a paired pair releases them. Both sides are always updated
//! together, so the relation stays symmetric.
//!
//! The table only tracks partners. Drivers resolve a backend's exposed
//! address through [`SwapTable::partner`]; route sets never move.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{RouterError, RouterResult};

/// Observable swap state of one backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapStatus {
    pub swapped: bool,
    /// The partner's name, or the backend's own name when unswapped.
    pub partner: String,
}

/// What a swap call does to a pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapTransition {
    /// Unswapped → paired.
    Pair,
    /// Paired → unswapped.
    Release,
}

/// Partner pointers for every currently paired backend.
#[derive(Debug, Default)]
pub struct SwapTable {
    partners: HashMap<String, String>,
    generation: u64,
}

impl SwapTable {
    /// The backend whose address `name` currently exposes.
    pub fn partner<'a>(&'a self, name: &'a str) -> &'a str {
        self.partners.get(name).map(String::as_str).unwrap_or(name)
    }

    pub fn is_swapped(&self, name: &str) -> bool {
        self.partners.contains_key(name)
    }

    pub fn status(&self, name: &str) -> SwapStatus {
        SwapStatus {
            swapped: self.is_swapped(name),
            partner: self.partner(name).to_string(),
        }
    }

    /// Decide what `swap(a, b)` would do without changing anything.
    ///
    /// Fails with `BackendSwapped` when either side is paired with a third
    /// backend.
    pub fn plan(&self, a: &str, b: &str) -> RouterResult<SwapTransition> {
        if a == b {
            return Err(RouterError::SwapWithSelf);
        }
        match (self.partners.get(a), self.partners.get(b)) {
            (None, None) => Ok(SwapTransition::Pair),
            (Some(pa), Some(pb)) if pa == b && pb == a => Ok(SwapTransition::Release),
            _ => Err(RouterError::BackendSwapped),
        }
    }

    /// Apply a transition previously returned by [`plan`](Self::plan).
    pub fn apply(&mut self, a: &str, b: &str, transition: SwapTransition) {
        match transition {
            SwapTransition::Pair => {
                self.partners.insert(a.to_string(), b.to_string());
                self.partners.insert(b.to_string(), a.to_string());
            }
            SwapTransition::Release => {
                self.partners.remove(a);
                self.partners.remove(b);
            }
        }
        self.generation += 1;
    }

    /// Number of transitions applied so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}
