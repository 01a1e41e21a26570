use std::sync::Arc;

use tracing::{debug, info};

use crate::{error::AuthError, store::CredentialStore, token::TokenCodec, types::Identity};

/// Authenticates users against a credential store and hands out tokens that
/// can later be verified without consulting the store again.
///
/// Cloning is cheap; clones share the same store and codec.
pub struct AuthenticationController<S> {
    internal: Arc<AuthInternal<S>>,
}

struct AuthInternal<S> {
    store: S,
    codec: TokenCodec,
}

impl<S> Clone for AuthenticationController<S> {
    fn clone(&self) -> Self {
        Self {
            internal: self.internal.clone(),
        }
    }
}

impl<S: CredentialStore> AuthenticationController<S> {
    pub fn new(store: S, codec: TokenCodec) -> Self {
        Self {
            internal: Arc::new(AuthInternal { store, codec }),
        }
    }

    pub fn store(&self) -> &S {
        &self.internal.store
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.internal.codec
    }

    /// Look the pair up and, if it matches a user, issue a token for them.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<String, AuthError> {
        let record = self
            .internal
            .store
            .find_by_credentials(username, password)
            .await
            .map_err(|err| {
                info!(username, "authentication failed");
                AuthError::from(err)
            })?;

        let token = self.internal.codec.encode(Some(record.identity()))?;

        Ok(token)
    }

    /// Turn a token issued by [`authenticate`](Self::authenticate) back into
    /// the identity it was issued for.
    pub fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        self.internal.codec.decode(token).map_err(|err| {
            debug!(reason = %err, "rejected token");
            AuthError::from(err)
        })
    }

    /// Does nothing. There is no revocation list: a token stays valid until
    /// it expires, whatever is done with it here.
    pub fn invalidate(&self, _token: &str) {}
}
