//! Centralized configuration for the object registry.

/// Registry tuning knobs.
pub struct RegistryConfig;

impl RegistryConfig {
    /// Initial capacity of the scope map (scope id -> scope).
    pub const SCOPE_MAP_CAPACITY: usize = 8;
    /// Initial capacity of each scope's object map (object id -> entry).
    pub const OBJECT_MAP_CAPACITY: usize = 16;
}
