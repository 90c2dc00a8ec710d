#![forbid(unsafe_code)]

use std::path::PathBuf;
use td_storage::{MemoryStore, SqliteStore, StoreError, TaskStore, TaskTx};

/// Which adapter backs the store. Resolved once at process start and injected;
/// nothing below this point reads the environment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BackendKind {
    Sqlite { storage_dir: PathBuf },
    Memory,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    pub backend: BackendKind,
}

impl EngineConfig {
    pub fn memory() -> Self {
        Self {
            backend: BackendKind::Memory,
        }
    }

    pub fn sqlite(storage_dir: impl Into<PathBuf>) -> Self {
        Self {
            backend: BackendKind::Sqlite {
                storage_dir: storage_dir.into(),
            },
        }
    }

    /// Startup-time environment read: `TANDEM_STORAGE_DIR` selects the
    /// durable backend, absence selects the in-memory one.
    pub fn from_env() -> Self {
        match std::env::var_os("TANDEM_STORAGE_DIR") {
            Some(dir) => Self::sqlite(PathBuf::from(dir)),
            None => Self::memory(),
        }
    }
}

/// Adapter chosen by [`EngineConfig`]. The engine itself stays generic over
/// [`TaskStore`]; this enum only exists so a process can pick its backend at
/// startup without monomorphizing twice.
#[derive(Debug)]
pub enum AnyStore {
    Sqlite(SqliteStore),
    Memory(MemoryStore),
}

impl AnyStore {
    pub fn open(config: &EngineConfig) -> Result<Self, StoreError> {
        match &config.backend {
            BackendKind::Sqlite { storage_dir } => {
                Ok(Self::Sqlite(SqliteStore::open(storage_dir)?))
            }
            BackendKind::Memory => Ok(Self::Memory(MemoryStore::new())),
        }
    }
}

impl TaskStore for AnyStore {
    fn with_tx<T, E, F>(&mut self, f: F) -> Result<T, E>
    where
        E: From<StoreError>,
        F: FnOnce(&mut dyn TaskTx) -> Result<T, E>,
    {
        match self {
            Self::Sqlite(store) => store.with_tx(f),
            Self::Memory(store) => store.with_tx(f),
        }
    }
}
