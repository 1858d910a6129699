//! The two-level identity map: registry facade over per-scope storage.
//!
//! - [`ObjectRegistry`]: process-wide facade routing operations to scopes,
//!   creating scopes on demand.
//! - [`Scope`]: one per scope id, owning the flat object id -> instance map
//!   and the per-key identity rules.

pub mod object_registry;
pub mod scope;

pub use object_registry::{ObjectRegistry, RegistrySnapshot};
pub use scope::{EntrySnapshot, Scope, ScopeSnapshot, StoredEntry};
