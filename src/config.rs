use std::{fs, path::Path, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

use crate::{
    auth::AuthenticationController,
    error::ConstructionError,
    password::PasswordScheme,
    store::{Backend, MemoryStore, SqliteStore},
    token::{TokenCodec, DEFAULT_TOKEN_LIFETIME},
    types::CredentialRecord,
};

pub const DEFAULT_SIGNING_KEY: &str = "secret";
pub const DEFAULT_SIGNING_ALGORITHM: &str = "HS256";

/// Everything needed to build an [`AuthenticationController`] and mount its
/// routes. Usually read from a JSON file:
///
/// ```json
/// {
///   "base_url": "/auth",
///   "token": { "key": "change me", "algorithm": "HS256", "ttl_secs": 3600 },
///   "controller": { "type": "simple", "driver": "sqlite3", "dsn": "users.db" }
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Path prefix for the HTTP routes.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub token: TokenConfig,
    pub controller: ControllerConfig,
    #[serde(default)]
    pub password: PasswordScheme,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TokenConfig {
    /// The shared secret tokens are signed with. If it changes, every token
    /// issued so far stops verifying.
    pub key: String,
    pub algorithm: String,
    /// Written into the `iss` claim. Defaults to the host name.
    pub issuer: Option<String>,
    pub ttl_secs: u64,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            key: String::new(),
            algorithm: DEFAULT_SIGNING_ALGORITHM.to_owned(),
            issuer: None,
            ttl_secs: DEFAULT_TOKEN_LIFETIME.as_secs(),
        }
    }
}

/// Which credential store backs the controller.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ControllerConfig {
    /// A fixed user list, for tests.
    Memory {
        #[serde(default)]
        users: Vec<CredentialRecord>,
    },
    /// A `users` table in a relational database.
    Simple { driver: String, dsn: String },
}

impl Config {
    pub fn from_json(json: &str) -> Result<Self, ConstructionError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConstructionError> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    pub fn build(&self) -> Result<AuthenticationController<Backend>, ConstructionError> {
        let codec = self.token.build_codec()?;

        let store: Backend = match &self.controller {
            ControllerConfig::Memory { users } => {
                MemoryStore::with_scheme(users.clone(), self.password.clone())?.into()
            }
            ControllerConfig::Simple { driver, dsn } => {
                SqliteStore::open(driver, dsn, self.password.clone())?.into()
            }
        };

        info!(
            backend = store.kind(),
            issuer = codec.issuer(),
            "authentication controller ready"
        );

        Ok(AuthenticationController::new(store, codec))
    }
}

impl TokenConfig {
    pub fn build_codec(&self) -> Result<TokenCodec, ConstructionError> {
        let key = if self.key.is_empty() {
            warn!("no token signing key configured, using the default key");
            DEFAULT_SIGNING_KEY
        } else {
            self.key.as_str()
        };

        let algorithm = if self.algorithm.is_empty() {
            DEFAULT_SIGNING_ALGORITHM
        } else {
            self.algorithm.as_str()
        };

        let issuer = self.issuer.clone().unwrap_or_else(host_name);

        TokenCodec::new(
            key.as_bytes(),
            algorithm,
            issuer,
            Duration::from_secs(self.ttl_secs),
        )
    }
}

fn default_base_url() -> String {
    "/".to_owned()
}

fn host_name() -> String {
    gethostname::gethostname()
        .into_string()
        .ok()
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "localhost".to_owned())
}
