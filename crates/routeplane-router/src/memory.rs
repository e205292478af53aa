//! In-memory reference driver.
//!
//! Keeps the whole routing table behind a single lock, so every operation,
//! bulk ones and swaps included, is observed atomically. Backend names are
//! recorded in the shared [`BackendRegistry`] on creation and stay there
//! after removal.
//!
//! Swap `force`: an unforced swap is refused with `AliasNotAllowed` when an
//! alias bound to either backend would end up at or under the address that
//! backend exposes after the exchange. Forcing skips that check. Releasing a
//! pair is never validated.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashMap};

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::alias;
use crate::config::{CapabilityToggles, RouterConfig};
use crate::error::{RouterError, RouterResult};
use crate::registry::BackendRegistry;
use crate::route::Route;
use crate::router::{
    AliasRouter, BackendOptions, BackendSnapshot, HealthcheckData, HealthcheckRouter,
    OptsRouter, Router,
};
use crate::swap::{SwapStatus, SwapTable, SwapTransition};

/// Live state of one backend.
struct BackendEntry {
    /// Address minted at creation; only the swap indirection changes what is exposed.
    address: String,
    options: BackendOptions,
    /// Routes keyed by host.
    routes: BTreeMap<String, Route>,
    healthcheck: Option<HealthcheckData>,
}

#[derive(Default)]
struct RoutingTable {
    backends: HashMap<String, BackendEntry>,
    /// Alias → backend name.
    aliases: HashMap<String, String>,
    swaps: SwapTable,
}

impl RoutingTable {
    fn backend(&self, name: &str) -> RouterResult<&BackendEntry> {
        self.backends.get(name).ok_or(RouterError::BackendNotFound)
    }

    fn backend_mut(&mut self, name: &str) -> RouterResult<&mut BackendEntry> {
        self.backends
            .get_mut(name)
            .ok_or(RouterError::BackendNotFound)
    }

    /// Address `name` exposes right now.
    fn exposed_address(&self, name: &str) -> RouterResult<&str> {
        self.backend(name)?;
        let partner = self.swaps.partner(name);
        Ok(self.backend(partner)?.address.as_str())
    }

    fn aliases_of<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.aliases
            .iter()
            .filter(move |(_, owner)| owner.as_str() == name)
            .map(|(alias, _)| alias.as_str())
    }
}

/// Reference driver keeping all routing state in process memory.
pub struct MemoryRouter {
    domain: String,
    capabilities: CapabilityToggles,
    registry: BackendRegistry,
    table: RwLock<RoutingTable>,
}

impl MemoryRouter {
    pub const KIND: &'static str = "memory";

    pub fn new(config: &RouterConfig, registry: BackendRegistry) -> Self {
        Self {
            domain: config.domain.clone(),
            capabilities: config.capabilities,
            registry,
            table: RwLock::new(RoutingTable::default()),
        }
    }

    fn mint_address(&self, name: &str) -> String {
        format!("{name}.{}", self.domain)
    }

    fn create(&self, name: &str, options: BackendOptions) -> RouterResult<()> {
        if self.table.read().backends.contains_key(name) {
            return Err(RouterError::BackendExists);
        }
        // Committed outside the table lock; re-recording a name is a no-op.
        self.registry.register(name)?;
        let mut table = self.table.write();
        if table.backends.contains_key(name) {
            return Err(RouterError::BackendExists);
        }
        let address = self.mint_address(name);
        info!(backend = name, %address, options = options.len(), "backend created");
        table.backends.insert(
            name.to_string(),
            BackendEntry {
                address,
                options,
                routes: BTreeMap::new(),
                healthcheck: None,
            },
        );
        Ok(())
    }

    /// Reject a pairing that would put an alias under its backend's new address.
    fn check_swap_aliases(table: &RoutingTable, a: &str, b: &str) -> RouterResult<()> {
        let a_after = table.backend(b)?.address.as_str();
        let b_after = table.backend(a)?.address.as_str();
        for (name, address) in [(a, a_after), (b, b_after)] {
            if let Some(conflict) = table
                .aliases_of(name)
                .find(|candidate| alias::is_subdomain(candidate, address))
            {
                warn!(
                    backend = name,
                    alias = conflict,
                    address,
                    "swap rejected, alias would resolve into its own address"
                );
                return Err(RouterError::AliasNotAllowed);
            }
        }
        Ok(())
    }
}

impl Router for MemoryRouter {
    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn add_backend(&self, name: &str) -> RouterResult<()> {
        self.create(name, BackendOptions::new())
    }

    fn remove_backend(&self, name: &str) -> RouterResult<()> {
        let mut table = self.table.write();
        table.backend(name)?;
        if table.swaps.is_swapped(name) {
            return Err(RouterError::BackendSwapped);
        }
        table.backends.remove(name);
        table.aliases.retain(|_, owner| owner.as_str() != name);
        info!(backend = name, "backend removed");
        Ok(())
    }

    fn add_route(&self, name: &str, route: &Route) -> RouterResult<()> {
        let mut table = self.table.write();
        let entry = table.backend_mut(name)?;
        if entry.routes.contains_key(route.host()) {
            return Err(RouterError::RouteExists);
        }
        debug!(backend = name, route = %route, "route added");
        entry.routes.insert(route.host().to_string(), route.clone());
        Ok(())
    }

    fn add_routes(&self, name: &str, routes: &[Route]) -> RouterResult<()> {
        let mut table = self.table.write();
        let entry = table.backend_mut(name)?;
        let mut added = 0usize;
        for route in routes {
            if let Entry::Vacant(slot) = entry.routes.entry(route.host().to_string()) {
                slot.insert(route.clone());
                added += 1;
            }
        }
        debug!(
            backend = name,
            requested = routes.len(),
            added,
            "routes added"
        );
        Ok(())
    }

    fn remove_route(&self, name: &str, route: &Route) -> RouterResult<()> {
        let mut table = self.table.write();
        let entry = table.backend_mut(name)?;
        if entry.routes.remove(route.host()).is_none() {
            return Err(RouterError::RouteNotFound);
        }
        debug!(backend = name, route = %route, "route removed");
        Ok(())
    }

    fn remove_routes(&self, name: &str, routes: &[Route]) -> RouterResult<()> {
        let mut table = self.table.write();
        let entry = table.backend_mut(name)?;
        let removed = routes
            .iter()
            .filter(|route| entry.routes.remove(route.host()).is_some())
            .count();
        debug!(
            backend = name,
            requested = routes.len(),
            removed,
            "routes removed"
        );
        Ok(())
    }

    fn routes(&self, name: &str) -> RouterResult<Vec<Route>> {
        let table = self.table.read();
        Ok(table.backend(name)?.routes.values().cloned().collect())
    }

    fn addr(&self, name: &str) -> RouterResult<String> {
        let table = self.table.read();
        table.exposed_address(name).map(str::to_string)
    }

    fn swap(&self, backend1: &str, backend2: &str, force: bool) -> RouterResult<SwapStatus> {
        let mut table = self.table.write();
        table.backend(backend1)?;
        table.backend(backend2)?;
        let transition = table.swaps.plan(backend1, backend2)?;
        if transition == SwapTransition::Pair && !force {
            Self::check_swap_aliases(&table, backend1, backend2)?;
        }
        table.swaps.apply(backend1, backend2, transition);
        info!(
            backend1,
            backend2,
            force,
            ?transition,
            generation = table.swaps.generation(),
            "swap applied"
        );
        Ok(table.swaps.status(backend1))
    }

    fn is_swapped(&self, name: &str) -> RouterResult<SwapStatus> {
        let table = self.table.read();
        table.backend(name)?;
        Ok(table.swaps.status(name))
    }

    fn describe(&self, name: &str) -> RouterResult<BackendSnapshot> {
        let table = self.table.read();
        let entry = table.backend(name)?;
        Ok(BackendSnapshot {
            name: name.to_string(),
            address: table.exposed_address(name)?.to_string(),
            swap: table.swaps.status(name),
            routes: entry.routes.values().cloned().collect(),
            options: entry.options.clone(),
        })
    }

    fn as_opts_router(&self) -> Option<&dyn OptsRouter> {
        self.capabilities.opts.then_some(self as &dyn OptsRouter)
    }

    fn as_alias_router(&self) -> Option<&dyn AliasRouter> {
        self.capabilities.alias.then_some(self as &dyn AliasRouter)
    }

    fn as_healthcheck_router(&self) -> Option<&dyn HealthcheckRouter> {
        self.capabilities
            .healthcheck
            .then_some(self as &dyn HealthcheckRouter)
    }
}

impl OptsRouter for MemoryRouter {
    fn add_backend_opts(&self, name: &str, opts: &BackendOptions) -> RouterResult<()> {
        self.create(name, opts.clone())
    }
}

impl AliasRouter for MemoryRouter {
    fn set_alias(&self, alias: &str, name: &str) -> RouterResult<()> {
        let mut table = self.table.write();
        let address = table.exposed_address(name)?.to_string();
        let normalized = alias::normalize(alias);
        if table.aliases.contains_key(&normalized) {
            return Err(RouterError::AliasExists);
        }
        let normalized = alias::check_allowed(&normalized, &address).inspect_err(|_| {
            warn!(backend = name, alias, %address, "alias rejected");
        })?;
        debug!(backend = name, alias = %normalized, "alias set");
        table.aliases.insert(normalized, name.to_string());
        Ok(())
    }

    fn unset_alias(&self, alias: &str, name: &str) -> RouterResult<()> {
        let mut table = self.table.write();
        let normalized = alias::normalize(alias);
        match table.aliases.get(&normalized) {
            Some(owner) if owner == name => {
                table.aliases.remove(&normalized);
                debug!(backend = name, alias = %normalized, "alias unset");
                Ok(())
            }
            _ => Err(RouterError::AliasNotFound),
        }
    }

    fn aliases(&self, name: &str) -> RouterResult<Vec<String>> {
        let table = self.table.read();
        table.backend(name)?;
        let mut aliases: Vec<String> = table.aliases_of(name).map(str::to_string).collect();
        aliases.sort();
        Ok(aliases)
    }
}

impl HealthcheckRouter for MemoryRouter {
    fn set_healthcheck(&self, name: &str, data: &HealthcheckData) -> RouterResult<()> {
        let mut table = self.table.write();
        let entry = table.backend_mut(name)?;
        debug!(backend = name, path = %data.path, status = data.status, "healthcheck set");
        entry.healthcheck = Some(data.clone());
        Ok(())
    }

    fn healthcheck(&self, name: &str) -> RouterResult<Option<HealthcheckData>> {
        let table = self.table.read();
        Ok(table.backend(name)?.healthcheck.clone())
    }
}
