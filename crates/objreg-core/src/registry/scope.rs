//! A single registry scope: a flat object id -> instance map.
//!
//! Scopes isolate object-identifier spaces from each other; the id `"1"` in
//! scope `"User"` and the id `"1"` in scope `"Car"` never collide. A `Scope`
//! is a plain owned value with no interior locking — serializing access is
//! the job of the owning [`ObjectRegistry`](crate::ObjectRegistry).

use crate::config::RegistryConfig;
use crate::error::{RegistryError, Result};
use serde::Serialize;
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// A registered instance: the shared handle plus its concrete type name.
///
/// The registry never clones or constructs the underlying object; it holds
/// one `Arc` to a caller-supplied instance and compares entries strictly by
/// allocation identity, never by value.
#[derive(Clone)]
pub struct StoredEntry {
    object: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl StoredEntry {
    /// Wrap a shared handle for storage, erasing its concrete type.
    pub fn new<T: Any + Send + Sync>(object: Arc<T>) -> Self {
        Self {
            object,
            type_name: std::any::type_name::<T>(),
        }
    }

    /// Recover the typed handle, if the entry holds a `T`.
    pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        Arc::clone(&self.object).downcast::<T>().ok()
    }

    /// Whether both entries refer to the same allocation.
    ///
    /// This is the registry's identity test: pointer equality on the shared
    /// handle. Two structurally equal instances are still distinct.
    pub fn is_same_instance(&self, other: &StoredEntry) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.object), Arc::as_ptr(&other.object))
    }

    /// Full type name of the stored instance (diagnostics only).
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl std::fmt::Debug for StoredEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoredEntry")
            .field("type_name", &self.type_name)
            .finish()
    }
}

/// Diagnostic snapshot of one scope's entries.
#[derive(Debug, Clone, Serialize)]
pub struct ScopeSnapshot {
    pub scope_id: String,
    pub entries: Vec<EntrySnapshot>,
}

/// One `(object id, stored type)` pair in a [`ScopeSnapshot`].
#[derive(Debug, Clone, Serialize)]
pub struct EntrySnapshot {
    pub object_id: String,
    pub type_name: String,
}

/// One scope of the registry, keyed by a string scope id (usually the stored
/// objects' type name).
///
/// Each `(scope, object id)` slot is either absent or occupied. `store`
/// moves absent -> occupied; `remove` moves occupied -> absent; re-storing
/// the *same* instance is an idempotent no-op, and re-storing a *different*
/// instance under an occupied slot is rejected with
/// [`RegistryError::Conflict`]. That rejection is the central guarantee:
/// divergent copies of the same logical object cannot coexist silently.
#[derive(Debug)]
pub struct Scope {
    scope_id: String,
    objects: HashMap<String, StoredEntry>,
}

impl Scope {
    /// Create an empty scope.
    pub fn new(scope_id: impl Into<String>) -> Self {
        Self {
            scope_id: scope_id.into(),
            objects: HashMap::with_capacity(RegistryConfig::OBJECT_MAP_CAPACITY),
        }
    }

    /// Store an instance under `object_id`.
    ///
    /// Succeeds if the slot is absent, or already occupied by the same
    /// instance. Fails with [`RegistryError::Conflict`] if a different
    /// instance occupies the slot; the existing entry is left untouched.
    pub fn store(&mut self, object_id: &str, entry: StoredEntry) -> Result<()> {
        if object_id.is_empty() {
            return Err(RegistryError::invalid_argument(
                "Object id must not be empty",
            ));
        }

        match self.objects.get(object_id) {
            None => {
                debug!(
                    scope = %self.scope_id,
                    object_id,
                    type_name = entry.type_name(),
                    "Stored object"
                );
                self.objects.insert(object_id.to_string(), entry);
                Ok(())
            }
            Some(existing) if existing.is_same_instance(&entry) => Ok(()),
            Some(_) => Err(RegistryError::Conflict {
                scope_id: self.scope_id.clone(),
                object_id: object_id.to_string(),
            }),
        }
    }

    /// Look up an entry. Pure lookup; `None` if absent.
    pub fn find(&self, object_id: &str) -> Option<&StoredEntry> {
        self.objects.get(object_id)
    }

    /// Look up an entry, failing with [`RegistryError::NotFound`] if absent.
    pub fn get(&self, object_id: &str) -> Result<&StoredEntry> {
        self.find(object_id).ok_or_else(|| RegistryError::NotFound {
            scope_id: self.scope_id.clone(),
            object_id: object_id.to_string(),
        })
    }

    /// Whether an entry exists under `object_id`.
    pub fn exists(&self, object_id: &str) -> bool {
        self.find(object_id).is_some()
    }

    /// Drop the entry under `object_id`, if present.
    ///
    /// Returns whether an entry was removed; removing an absent id is a
    /// no-op. Only the registry's handle is dropped — other holders of the
    /// instance are unaffected.
    pub fn remove(&mut self, object_id: &str) -> bool {
        let removed = self.objects.remove(object_id).is_some();
        if removed {
            debug!(scope = %self.scope_id, object_id, "Removed object");
        }
        removed
    }

    /// This scope's identifier.
    pub fn scope_id(&self) -> &str {
        &self.scope_id
    }

    /// Number of entries in this scope.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether this scope holds no entries.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Diagnostic snapshot, entries sorted by object id.
    pub fn snapshot(&self) -> ScopeSnapshot {
        let mut entries: Vec<EntrySnapshot> = self
            .objects
            .iter()
            .map(|(object_id, entry)| EntrySnapshot {
                object_id: object_id.clone(),
                type_name: entry.type_name().to_string(),
            })
            .collect();
        entries.sort_by(|a, b| a.object_id.cmp(&b.object_id));

        ScopeSnapshot {
            scope_id: self.scope_id.clone(),
            entries,
        }
    }
}
