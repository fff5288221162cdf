//! Hook table — per hook name, an ordered chain of handlers.
//!
//! Order is insertion order adjusted only by explicit placement
//! directives. Readers get a snapshot of `Arc` entries so dispatch never
//! holds the lock while a handler runs.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::info;

use hookloom_core::{KernelError, KernelResult};

use super::definitions::HandlerEntry;
use super::placement::Placement;
use crate::validate;

/// A handler waiting to be spliced into a chain.
#[derive(Debug)]
pub struct PendingHook {
    /// Hook name.
    pub hook: String,
    /// Entry to insert.
    pub entry: HandlerEntry,
    /// Where to insert it.
    pub placement: Placement,
}

/// Registry of hook chains organized by hook name.
#[derive(Debug, Default)]
pub struct HookTable {
    /// Hook name → ordered handlers.
    chains: RwLock<HashMap<String, Vec<Arc<HandlerEntry>>>>,
}

impl HookTable {
    /// Creates a new empty hook table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Splices one handler into a chain and returns its index.
    pub async fn insert(
        &self,
        hook: &str,
        entry: HandlerEntry,
        placement: &Placement,
    ) -> KernelResult<usize> {
        let positions = self
            .insert_all(vec![PendingHook {
                hook: hook.to_string(),
                entry,
                placement: placement.clone(),
            }])
            .await?;
        Ok(positions.into_iter().next().unwrap_or_default())
    }

    /// Splices several handlers in order, all or nothing.
    ///
    /// Each placement sees the handlers inserted before it in the same
    /// batch. On the first failure no chain is modified.
    pub async fn insert_all(&self, pending: Vec<PendingHook>) -> KernelResult<Vec<usize>> {
        let mut prepared = Vec::with_capacity(pending.len());
        for item in pending {
            validate::identifier("hook name", &item.hook)?;
            validate::identifier("owner id", &item.entry.owner_id)?;
            validate::identifier("handler id", &item.entry.handler_id)?;
            let directive = item.placement.directive()?;
            prepared.push((item.hook, Arc::new(item.entry), directive));
        }

        let mut chains = self.chains.write().await;
        let mut staged: HashMap<String, Vec<Arc<HandlerEntry>>> = HashMap::new();
        let mut placed = Vec::with_capacity(prepared.len());

        for (hook, entry, directive) in prepared {
            let chain = staged
                .entry(hook.clone())
                .or_insert_with(|| chains.get(&hook).cloned().unwrap_or_default());

            if chain
                .iter()
                .any(|e| e.owner_id == entry.owner_id && e.handler_id == entry.handler_id)
            {
                return Err(KernelError::duplicate(format!(
                    "hook '{hook}' already has handler '{}' from owner '{}'",
                    entry.handler_id, entry.owner_id
                )));
            }

            let index = directive.position(&hook, chain)?;
            chain.insert(index, entry.clone());
            placed.push((hook, entry, index));
        }

        chains.extend(staged);
        drop(chains);

        let mut positions = Vec::with_capacity(placed.len());
        for (hook, entry, index) in placed {
            info!(
                hook = %hook,
                owner_id = %entry.owner_id,
                handler_id = %entry.handler_id,
                position = index,
                "Hook handler registered"
            );
            positions.push(index);
        }
        Ok(positions)
    }

    /// Returns the handlers for a hook in their current order.
    pub async fn snapshot(&self, hook: &str) -> Vec<Arc<HandlerEntry>> {
        let chains = self.chains.read().await;
        chains.get(hook).cloned().unwrap_or_default()
    }

    /// Returns `(owner_id, handler_id)` pairs for a hook in their current order.
    pub async fn order(&self, hook: &str) -> Vec<(String, String)> {
        let chains = self.chains.read().await;
        chains
            .get(hook)
            .map(|entries| {
                entries
                    .iter()
                    .map(|e| (e.owner_id.clone(), e.handler_id.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Returns whether any handlers are registered for a hook.
    pub async fn has_handlers(&self, hook: &str) -> bool {
        let chains = self.chains.read().await;
        chains
            .get(hook)
            .map(|entries| !entries.is_empty())
            .unwrap_or(false)
    }

    /// Returns the number of handlers registered for a hook.
    pub async fn handler_count(&self, hook: &str) -> usize {
        let chains = self.chains.read().await;
        chains.get(hook).map(|entries| entries.len()).unwrap_or(0)
    }

    /// Returns all hook names with at least one handler, sorted.
    pub async fn hook_names(&self) -> Vec<String> {
        let chains = self.chains.read().await;
        let mut names: Vec<String> = chains.keys().cloned().collect();
        names.sort();
        names
    }

    /// Returns `(hook, handler_id)` pairs registered by one owner.
    pub async fn owned_by(&self, owner_id: &str) -> Vec<(String, String)> {
        let chains = self.chains.read().await;
        let mut owned: Vec<(String, String)> = chains
            .iter()
            .flat_map(|(hook, entries)| {
                entries
                    .iter()
                    .filter(|e| e.owner_id == owner_id)
                    .map(move |e| (hook.clone(), e.handler_id.clone()))
            })
            .collect();
        owned.sort();
        owned
    }
}
