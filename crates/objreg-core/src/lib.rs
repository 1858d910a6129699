//! objreg-core - In-process identity map for shared object instances.
//!
//! A process-wide associative store that lets unrelated parts of an
//! application retrieve a previously created instance by a
//! `(scope, object id)` pair instead of re-constructing or re-fetching it.
//! Scopes default to the stored value's type name and isolate identifier
//! spaces from each other; within a scope, each id maps to at most one
//! instance, and storing a *different* instance under an occupied id is a
//! [`RegistryError::Conflict`] rather than a silent overwrite.
//!
//! Instances are shared as `Arc<T>` and compared strictly by allocation
//! identity, never by value. The registry holds plain handles: no
//! persistence, no eviction, no cross-process sharing.
//!
//! # Example
//!
//! ```
//! use objreg_core::{Identified, ObjectRegistry};
//! use std::sync::Arc;
//!
//! struct User {
//!     id: u64,
//!     name: String,
//! }
//!
//! impl Identified for User {
//!     fn object_id(&self) -> String {
//!         self.id.to_string()
//!     }
//! }
//!
//! let registry = ObjectRegistry::new(); // or ObjectRegistry::global()
//! let alice = Arc::new(User { id: 1, name: "Alice".into() });
//!
//! registry.store(&alice)?;
//!
//! let found = registry.get::<User>("1")?;
//! assert!(Arc::ptr_eq(&found, &alice));
//! assert_eq!(found.name, "Alice");
//!
//! // A fresh instance reusing the id is rejected, Alice stays registered.
//! let charlie = Arc::new(User { id: 1, name: "Charlie".into() });
//! assert!(registry.store(&charlie).is_err());
//! # Ok::<(), objreg_core::RegistryError>(())
//! ```

pub mod config;
pub mod error;
pub mod ident;
pub mod registry;

// Re-export commonly used types
pub use config::RegistryConfig;
pub use error::{RegistryError, Result};
pub use ident::{scope_name, Identified};
pub use registry::{
    EntrySnapshot, ObjectRegistry, RegistrySnapshot, Scope, ScopeSnapshot, StoredEntry,
};
