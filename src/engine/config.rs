use std::path::PathBuf;

/// Fixed application namespace for the persistent store.
pub const DEFAULT_STORE: &str = "healthtrack.db";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageLocation {
    /// On-disk store, persistent across runs.
    File(PathBuf),
    /// Throwaway store for tests and the console's `--memory` flag.
    InMemory,
}

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Where the engine keeps its data.
    pub storage: StorageLocation,

    /// Capacity of the bounded request channel into the worker.
    pub queue_capacity: usize,
}

impl EngineConfig {
    pub fn new() -> Self {
        Self {
            storage: StorageLocation::File(PathBuf::from(DEFAULT_STORE)),
            queue_capacity: 32,
        }
    }

    /// Use an in-memory store.
    pub fn in_memory(mut self) -> Self {
        self.storage = StorageLocation::InMemory;
        self
    }

    /// Use an on-disk store at the given path.
    pub fn at_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.storage = StorageLocation::File(path.into());
        self
    }

    /// Set the request queue capacity.
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity.max(1);
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}
