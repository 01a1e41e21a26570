use async_trait::async_trait;

use crate::{error::NotFoundError, types::CredentialRecord};

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Somewhere user records can be looked up by their username/password pair.
///
/// Lookups are read-only. Implementations must not tell "no such user" apart
/// from "wrong password": both are a [`NotFoundError`], as is any backend
/// failure during the lookup.
#[async_trait]
pub trait CredentialStore: Send + Sync + 'static {
    async fn find_by_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<CredentialRecord, NotFoundError>;
}

/// The backends a controller can be configured with.
pub enum Backend {
    Memory(MemoryStore),
    Sqlite(SqliteStore),
}

impl Backend {
    pub fn kind(&self) -> &'static str {
        match self {
            Backend::Memory(_) => "memory",
            Backend::Sqlite(_) => "sqlite",
        }
    }
}

impl From<MemoryStore> for Backend {
    fn from(store: MemoryStore) -> Self {
        Backend::Memory(store)
    }
}

impl From<SqliteStore> for Backend {
    fn from(store: SqliteStore) -> Self {
        Backend::Sqlite(store)
    }
}

#[async_trait]
impl CredentialStore for Backend {
    async fn find_by_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<CredentialRecord, NotFoundError> {
        match self {
            Backend::Memory(store) => store.find_by_credentials(username, password).await,
            Backend::Sqlite(store) => store.find_by_credentials(username, password).await,
        }
    }
}
