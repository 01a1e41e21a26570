use async_trait::async_trait;
use tracing::warn;

use super::CredentialStore;
use crate::{
    error::{ConstructionError, NotFoundError},
    password::PasswordScheme,
    types::CredentialRecord,
};

/// A fixed list of users, for tests and fixtures.
///
/// The list is never mutated after construction, so lookups need no locking.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    records: Vec<CredentialRecord>,
    scheme: PasswordScheme,
}

impl MemoryStore {
    /// Records compared against plaintext passwords.
    pub fn new(records: Vec<CredentialRecord>) -> Self {
        Self {
            records,
            scheme: PasswordScheme::Plaintext,
        }
    }

    /// Records whose stored passwords are already encoded with `scheme`.
    pub fn with_scheme(
        records: Vec<CredentialRecord>,
        scheme: PasswordScheme,
    ) -> Result<Self, ConstructionError> {
        scheme.check()?;
        Ok(Self { records, scheme })
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn find_by_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<CredentialRecord, NotFoundError> {
        let password = self.scheme.encode(password).map_err(|err| {
            warn!(%err, "could not encode supplied password");
            NotFoundError
        })?;

        self.records
            .iter()
            .find(|record| {
                record.identity().username() == username && record.password() == password
            })
            .cloned()
            .ok_or(NotFoundError)
    }
}
