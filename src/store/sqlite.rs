use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{info, warn};

use super::CredentialStore;
use crate::{
    error::{ConstructionError, NotFoundError},
    password::PasswordScheme,
    types::{CredentialRecord, Identity},
};

const SQL_SCHEMA: &str = "CREATE TABLE IF NOT EXISTS users (
    username TEXT PRIMARY KEY NOT NULL,
    email TEXT NOT NULL DEFAULT '',
    display_name TEXT NOT NULL DEFAULT '',
    password TEXT NOT NULL
)";

const SQL_SELECT_BY_CREDENTIALS: &str = "SELECT username, email, display_name, password
    FROM users WHERE username = ?1 AND password = ?2 LIMIT 1";

const SQL_UPSERT: &str = "INSERT OR REPLACE INTO users (username, email, display_name, password)
    VALUES (?1, ?2, ?3, ?4)";

/// Users kept in a `users` table of a SQLite database.
///
/// The connection sits behind a `Mutex`, so lookups are serialized by the
/// driver connection. Queries run on tokio's blocking pool.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
    scheme: PasswordScheme,
}

impl SqliteStore {
    /// Open the database named by `dsn` (a file path, or `:memory:`) with the
    /// given driver. Only `sqlite3`/`sqlite` are available.
    pub fn open(
        driver: &str,
        dsn: &str,
        scheme: PasswordScheme,
    ) -> Result<Self, ConstructionError> {
        match driver {
            "sqlite3" | "sqlite" => {}
            other => return Err(ConstructionError::UnsupportedDriver(other.to_owned())),
        }

        let store = Self::from_connection(Connection::open(dsn)?, scheme)?;
        info!(dsn, "opened credential database");
        Ok(store)
    }

    /// Wrap an already open connection, creating the `users` table if it
    /// doesn't exist yet.
    pub fn from_connection(
        conn: Connection,
        scheme: PasswordScheme,
    ) -> Result<Self, ConstructionError> {
        scheme.check()?;
        conn.execute_batch(SQL_SCHEMA)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            scheme,
        })
    }

    /// Insert a user, replacing any existing user with the same username. The
    /// record's password is stored encoded with this store's scheme.
    ///
    /// Provisioning happens while the service is being set up, so a failure
    /// here is a [`ConstructionError`] like any other startup failure. It
    /// blocks on the database.
    pub fn upsert(&self, record: &CredentialRecord) -> Result<(), ConstructionError> {
        let password = self.scheme.encode(record.password())?;
        let identity = record.identity();

        let conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        conn.execute(
            SQL_UPSERT,
            params![
                identity.username(),
                identity.email(),
                identity.display_name(),
                password
            ],
        )?;

        Ok(())
    }
}

#[async_trait]
impl CredentialStore for SqliteStore {
    async fn find_by_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<CredentialRecord, NotFoundError> {
        let password = self.scheme.encode(password).map_err(|err| {
            warn!(%err, "could not encode supplied password");
            NotFoundError
        })?;
        let username = username.to_owned();
        let conn = self.conn.clone();

        let lookup = tokio::task::spawn_blocking(move || {
            let conn = conn.lock().unwrap_or_else(PoisonError::into_inner);
            conn.query_row(
                SQL_SELECT_BY_CREDENTIALS,
                params![username, password],
                |row| {
                    Ok(CredentialRecord::new(
                        Identity::new(
                            row.get::<_, String>(0)?,
                            row.get::<_, String>(1)?,
                            row.get::<_, String>(2)?,
                        ),
                        row.get::<_, String>(3)?,
                    ))
                },
            )
            .optional()
        })
        .await;

        match lookup {
            Ok(Ok(Some(record))) => Ok(record),
            Ok(Ok(None)) => Err(NotFoundError),
            Ok(Err(err)) => {
                warn!(%err, "credential lookup failed");
                Err(NotFoundError)
            }
            Err(err) => {
                warn!(%err, "credential lookup task failed");
                Err(NotFoundError)
            }
        }
    }
}
