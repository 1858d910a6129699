//! Process-wide object registry facade.
//!
//! Routes `store`/`find`/`get`/`exists`/`remove` calls to the correct
//! [`Scope`], creating scopes on demand. The shared process-wide instance is
//! reached through [`ObjectRegistry::global`].

use crate::error::{RegistryError, Result};
use crate::ident::{scope_name, Identified};
use crate::registry::scope::{Scope, ScopeSnapshot, StoredEntry};
use serde::Serialize;
use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

use crate::config::RegistryConfig;

/// The process-wide registry instance.
static GLOBAL: OnceLock<ObjectRegistry> = OnceLock::new();

/// Two-level identity map: scope id -> scope -> object id -> instance.
///
/// All methods take `&self`; mutations are serialized through a single
/// `RwLock` over the scope map, and read-only operations share the read
/// side. Scope resolution follows one rule everywhere: an explicit scope id
/// string if the caller supplies one, otherwise the stored value's short
/// type name (see [`scope_name`]).
///
/// Most callers want the process-wide instance from
/// [`ObjectRegistry::global`]; [`ObjectRegistry::new`] builds a private
/// registry for tests or embedding.
#[derive(Debug)]
pub struct ObjectRegistry {
    scopes: RwLock<HashMap<String, Scope>>,
}

impl Default for ObjectRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectRegistry {
    /// Create an empty, private registry.
    pub fn new() -> Self {
        Self {
            scopes: RwLock::new(HashMap::with_capacity(
                RegistryConfig::SCOPE_MAP_CAPACITY,
            )),
        }
    }

    /// The process-wide registry, created lazily on first call.
    ///
    /// This is the enforced singleton access point: every caller in the
    /// process observes the same instance, for the lifetime of the process.
    pub fn global() -> &'static ObjectRegistry {
        GLOBAL.get_or_init(|| {
            debug!("Initializing process-wide object registry");
            ObjectRegistry::new()
        })
    }

    // ========================================
    // Storing
    // ========================================

    /// Store an instance; scope from `T`'s type name, id from the
    /// [`Identified`] capability.
    ///
    /// Storing the same instance again under the same ids is an idempotent
    /// no-op; storing a *different* instance under an occupied
    /// `(scope, object id)` fails with [`RegistryError::Conflict`] and
    /// leaves the existing entry untouched.
    pub fn store<T>(&self, object: &Arc<T>) -> Result<()>
    where
        T: Identified + Any + Send + Sync,
    {
        self.store_entry(&scope_name::<T>(), &object.object_id(), StoredEntry::new(Arc::clone(object)))
    }

    /// Store an instance under an explicit object id; scope from `T`.
    ///
    /// The id is normalized to its string form, so integer keys work
    /// directly: `registry.store_with_id(&user, 7)`.
    pub fn store_with_id<T>(&self, object: &Arc<T>, object_id: impl ToString) -> Result<()>
    where
        T: Any + Send + Sync,
    {
        self.store_entry(
            &scope_name::<T>(),
            &object_id.to_string(),
            StoredEntry::new(Arc::clone(object)),
        )
    }

    /// Store an instance in an explicit scope; id from the capability.
    pub fn store_in_scope<T>(&self, scope_id: &str, object: &Arc<T>) -> Result<()>
    where
        T: Identified + Any + Send + Sync,
    {
        self.store_entry(scope_id, &object.object_id(), StoredEntry::new(Arc::clone(object)))
    }

    /// Store an instance with both scope and object id explicit.
    pub fn store_in_scope_with_id<T>(
        &self,
        scope_id: &str,
        object: &Arc<T>,
        object_id: impl ToString,
    ) -> Result<()>
    where
        T: Any + Send + Sync,
    {
        self.store_entry(
            scope_id,
            &object_id.to_string(),
            StoredEntry::new(Arc::clone(object)),
        )
    }

    /// Resolve-or-create the scope and delegate the occupancy check to it.
    ///
    /// Arguments are validated before the scope is created, so a failed
    /// store never leaves a new empty scope behind.
    fn store_entry(&self, scope_id: &str, object_id: &str, entry: StoredEntry) -> Result<()> {
        if scope_id.is_empty() {
            return Err(RegistryError::invalid_argument(
                "Scope id must not be empty",
            ));
        }
        if object_id.is_empty() {
            return Err(RegistryError::invalid_argument(
                "Object id must not be empty",
            ));
        }

        let mut scopes = self.write_scopes();
        let scope = scopes
            .entry(scope_id.to_string())
            .or_insert_with(|| {
                debug!(scope = scope_id, "Created scope");
                Scope::new(scope_id)
            });
        scope.store(object_id, entry)
    }

    // ========================================
    // Lookup
    // ========================================

    /// Find an instance by object id in the scope derived from `T`.
    ///
    /// `None` if the pair is absent or the entry is not a `T`; never an
    /// error, and never creates a scope as a side effect.
    pub fn find<T>(&self, object_id: &str) -> Option<Arc<T>>
    where
        T: Any + Send + Sync,
    {
        self.find_in(&scope_name::<T>(), object_id)
            .and_then(|entry| entry.downcast::<T>())
    }

    /// Find an entry by explicit scope id and object id.
    pub fn find_in(&self, scope_id: &str, object_id: &str) -> Option<StoredEntry> {
        self.read_scopes()
            .get(scope_id)
            .and_then(|scope| scope.find(object_id))
            .cloned()
    }

    /// Like [`find`](Self::find), but [`RegistryError::NotFound`] if absent.
    ///
    /// An entry of a different concrete type under the same pair also
    /// reports `NotFound`: from the caller's view there is no `T` with that
    /// id in that scope.
    pub fn get<T>(&self, object_id: &str) -> Result<Arc<T>>
    where
        T: Any + Send + Sync,
    {
        let scope_id = scope_name::<T>();
        self.get_in(&scope_id, object_id)?
            .downcast::<T>()
            .ok_or_else(|| RegistryError::NotFound {
                scope_id,
                object_id: object_id.to_string(),
            })
    }

    /// Like [`find_in`](Self::find_in), but errors if absent.
    pub fn get_in(&self, scope_id: &str, object_id: &str) -> Result<StoredEntry> {
        self.find_in(scope_id, object_id)
            .ok_or_else(|| RegistryError::NotFound {
                scope_id: scope_id.to_string(),
                object_id: object_id.to_string(),
            })
    }

    /// Whether an instance of `T` is stored under `object_id`.
    pub fn exists<T>(&self, object_id: &str) -> bool
    where
        T: Any + Send + Sync,
    {
        self.find::<T>(object_id).is_some()
    }

    /// Whether any entry is stored under the explicit pair.
    pub fn exists_in(&self, scope_id: &str, object_id: &str) -> bool {
        self.find_in(scope_id, object_id).is_some()
    }

    // ========================================
    // Removal
    // ========================================

    /// Remove the entry the given instance resolves to (scope from `T`, id
    /// from the capability).
    ///
    /// Returns whether an entry was removed; an absent entry is a no-op.
    pub fn remove<T>(&self, object: &Arc<T>) -> bool
    where
        T: Identified + Any + Send + Sync,
    {
        self.remove_in(&scope_name::<T>(), &object.object_id())
    }

    /// Remove by object id in the scope derived from `T`.
    pub fn remove_with_id<T>(&self, object_id: &str) -> bool
    where
        T: Any + Send + Sync,
    {
        self.remove_in(&scope_name::<T>(), object_id)
    }

    /// Remove by explicit scope id and object id.
    ///
    /// An absent scope is left absent — removal never creates one.
    pub fn remove_in(&self, scope_id: &str, object_id: &str) -> bool {
        let mut scopes = self.write_scopes();
        scopes
            .get_mut(scope_id)
            .map(|scope| scope.remove(object_id))
            .unwrap_or(false)
    }

    // ========================================
    // Diagnostics and enumeration
    // ========================================

    /// Diagnostic snapshot of every scope and its entries, sorted by scope
    /// id for deterministic output.
    ///
    /// The snapshot is for debugging and tests; its exact shape is not part
    /// of the functional contract beyond listing every current
    /// `(scope, object id)` pair.
    pub fn dump(&self) -> RegistrySnapshot {
        let scopes = self.read_scopes();
        let mut snapshots: Vec<ScopeSnapshot> =
            scopes.values().map(Scope::snapshot).collect();
        snapshots.sort_by(|a, b| a.scope_id.cmp(&b.scope_id));

        let snapshot = RegistrySnapshot { scopes: snapshots };
        debug!(
            scopes = snapshot.scopes.len(),
            objects = snapshot.object_count(),
            "Registry dump"
        );
        snapshot
    }

    /// All current scope ids, sorted.
    pub fn scope_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.read_scopes().keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Total number of stored entries across all scopes.
    pub fn len(&self) -> usize {
        self.read_scopes().values().map(Scope::len).sum()
    }

    /// Whether the registry holds no entries at all.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // ========================================
    // Locking
    // ========================================

    // A poisoned lock means a panic while a guard was held; every operation
    // leaves the maps consistent per call, so the inner value is recovered
    // rather than propagating the poison to callers.

    fn read_scopes(&self) -> RwLockReadGuard<'_, HashMap<String, Scope>> {
        self.scopes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write_scopes(&self) -> RwLockWriteGuard<'_, HashMap<String, Scope>> {
        self.scopes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Diagnostic snapshot of the whole registry.
#[derive(Debug, Clone, Serialize)]
pub struct RegistrySnapshot {
    pub scopes: Vec<ScopeSnapshot>,
}

impl RegistrySnapshot {
    /// Total number of entries across all scopes in this snapshot.
    pub fn object_count(&self) -> usize {
        self.scopes.iter().map(|s| s.entries.len()).sum()
    }

    /// Pretty-printed JSON form of the snapshot.
    pub fn to_json_string(&self) -> String {
        // Serialization of plain string fields cannot fail
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}

impl std::fmt::Display for RegistrySnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "ObjectRegistry dump: {} scope(s), {} object(s)",
            self.scopes.len(),
            self.object_count()
        )?;
        for scope in &self.scopes {
            writeln!(f, "  scope '{}' ({})", scope.scope_id, scope.entries.len())?;
            for entry in &scope.entries {
                writeln!(f, "    '{}' => {}", entry.object_id, entry.type_name)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct User {
        id: u64,
        name: String,
    }

    impl User {
        fn new(id: u64, name: &str) -> Arc<Self> {
            Arc::new(Self {
                id,
                name: name.into(),
            })
        }
    }

    impl Identified for User {
        fn object_id(&self) -> String {
            self.id.to_string()
        }
    }

    #[derive(Debug)]
    struct Car {
        plate: String,
    }

    impl Identified for Car {
        fn object_id(&self) -> String {
            self.plate.clone()
        }
    }

    #[test]
    fn test_store_and_round_trip_same_instance() {
        let registry = ObjectRegistry::new();
        let alice = User::new(1, "Alice");

        registry.store(&alice).unwrap();

        let found = registry.find::<User>("1").unwrap();
        assert!(Arc::ptr_eq(&found, &alice));
        assert_eq!(found.name, "Alice");
    }

    #[test]
    fn test_idempotent_store_keeps_single_entry() {
        let registry = ObjectRegistry::new();
        let alice = User::new(1, "Alice");

        registry.store(&alice).unwrap();
        registry.store(&alice).unwrap();

        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_conflict_on_fresh_instance_with_same_id() {
        // Alice and Bob register fine; a fresh instance reusing Alice's id
        // must not.
        let registry = ObjectRegistry::new();
        let alice = User::new(1, "Alice");
        let bob = User::new(2, "Bob");

        registry.store(&alice).unwrap();
        registry.store(&bob).unwrap();

        let found = registry.find::<User>("1").unwrap();
        assert!(Arc::ptr_eq(&found, &alice));

        let charlie = User::new(1, "Charlie");
        let err = registry.store(&charlie).unwrap_err();
        assert!(matches!(err, RegistryError::Conflict { .. }));

        // Alice remains registered and unchanged
        let survivor = registry.find::<User>("1").unwrap();
        assert!(Arc::ptr_eq(&survivor, &alice));
        assert_eq!(survivor.name, "Alice");
    }

    #[test]
    fn test_scope_isolation() {
        let registry = ObjectRegistry::new();
        let user = User::new(1, "Alice");
        let car = Arc::new(Car { plate: "1".into() });

        registry.store(&user).unwrap();
        registry.store(&car).unwrap();

        assert!(Arc::ptr_eq(&registry.find::<User>("1").unwrap(), &user));
        assert!(Arc::ptr_eq(&registry.find::<Car>("1").unwrap(), &car));
        assert_eq!(registry.scope_ids(), vec!["Car", "User"]);
    }

    #[test]
    fn test_not_found_contract() {
        let registry = ObjectRegistry::new();

        assert!(registry.find::<User>("404").is_none());
        assert!(!registry.exists::<User>("404"));
        let err = registry.get::<User>("404").unwrap_err();
        assert!(matches!(err, RegistryError::NotFound { .. }));
    }

    #[test]
    fn test_lookup_never_creates_scope() {
        let registry = ObjectRegistry::new();

        assert!(registry.find_in("User", "1").is_none());
        assert!(!registry.exists_in("User", "1"));
        assert!(!registry.remove_in("User", "1"));

        assert!(registry.scope_ids().is_empty());
        assert!(registry.dump().scopes.is_empty());
    }

    #[test]
    fn test_remove_then_restore() {
        let registry = ObjectRegistry::new();
        let alice = User::new(1, "Alice");

        registry.store(&alice).unwrap();
        assert!(registry.remove(&alice));
        assert!(!registry.exists::<User>("1"));

        // A new instance under the freed id stores cleanly
        let replacement = User::new(1, "Alice v2");
        registry.store(&replacement).unwrap();
        assert!(Arc::ptr_eq(
            &registry.find::<User>("1").unwrap(),
            &replacement
        ));
    }

    #[test]
    fn test_remove_with_id_and_remove_in() {
        let registry = ObjectRegistry::new();
        registry.store(&User::new(1, "Alice")).unwrap();
        registry
            .store_in_scope_with_id("sessions", &Arc::new(String::from("token")), 9)
            .unwrap();

        assert!(registry.remove_with_id::<User>("1"));
        assert!(registry.remove_in("sessions", "9"));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_explicit_id_normalizes_integers() {
        let registry = ObjectRegistry::new();
        let alice = User::new(1, "Alice");

        registry.store_with_id(&alice, 7).unwrap();

        assert!(registry.exists::<User>("7"));
        assert!(Arc::ptr_eq(&registry.find::<User>("7").unwrap(), &alice));
    }

    #[test]
    fn test_explicit_scope_store_and_lookup() {
        let registry = ObjectRegistry::new();
        let alice = User::new(1, "Alice");

        registry.store_in_scope("accounts", &alice).unwrap();

        assert!(registry.find::<User>("1").is_none());
        let entry = registry.get_in("accounts", "1").unwrap();
        let typed = entry.downcast::<User>().unwrap();
        assert!(Arc::ptr_eq(&typed, &alice));
    }

    #[test]
    fn test_conflict_across_store_variants() {
        // The occupancy check applies per (scope, id) pair regardless of
        // which store signature was used.
        let registry = ObjectRegistry::new();
        registry
            .store_in_scope_with_id("User", &User::new(5, "Eve"), 1)
            .unwrap();

        let err = registry.store(&User::new(1, "Mallory")).unwrap_err();
        assert!(matches!(err, RegistryError::Conflict { .. }));
    }

    #[test]
    fn test_empty_scope_id_rejected_without_mutation() {
        let registry = ObjectRegistry::new();
        let err = registry
            .store_in_scope("", &User::new(1, "Alice"))
            .unwrap_err();
        assert!(matches!(err, RegistryError::InvalidArgument { .. }));
        assert!(registry.scope_ids().is_empty());
    }

    #[test]
    fn test_typed_get_wrong_type_is_not_found() {
        let registry = ObjectRegistry::new();
        registry
            .store_in_scope_with_id("User", &Arc::new(42u64), 1)
            .unwrap();

        // The pair is occupied, but not by a User
        let err = registry.get::<User>("1").unwrap_err();
        assert!(matches!(err, RegistryError::NotFound { .. }));
        assert!(registry.exists_in("User", "1"));
    }

    #[test]
    fn test_dump_lists_every_pair() {
        let registry = ObjectRegistry::new();
        registry.store(&User::new(1, "Alice")).unwrap();
        registry.store(&User::new(2, "Bob")).unwrap();
        registry
            .store(&Arc::new(Car {
                plate: "x-42".into(),
            }))
            .unwrap();

        let snapshot = registry.dump();
        assert_eq!(snapshot.scopes.len(), 2);
        assert_eq!(snapshot.object_count(), 3);
        assert_eq!(snapshot.scopes[0].scope_id, "Car");
        assert_eq!(snapshot.scopes[1].scope_id, "User");

        let rendered = snapshot.to_string();
        assert!(rendered.contains("scope 'User' (2)"));
        assert!(rendered.contains("'x-42'"));

        let json = snapshot.to_json_string();
        assert!(json.contains("\"object_id\": \"1\""));
    }

    #[test]
    fn test_global_is_one_instance_across_threads() {
        let here = ObjectRegistry::global() as *const ObjectRegistry as usize;

        let handles: Vec<_> = (0..4)
            .map(|_| {
                std::thread::spawn(|| ObjectRegistry::global() as *const ObjectRegistry as usize)
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), here);
        }
    }

    #[test]
    fn test_concurrent_stores_land_in_shared_registry() {
        let registry = Arc::new(ObjectRegistry::new());

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || {
                    let user = User::new(i, "worker");
                    registry.store(&user).unwrap();
                    assert!(registry.exists::<User>(&i.to_string()));
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(registry.len(), 8);
        assert_eq!(registry.scope_ids(), vec!["User"]);
    }
}
