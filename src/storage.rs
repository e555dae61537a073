//! Durable key/value storage for the ledger and the theme preference.
//!
//! The store mirrors a browser's local storage: string keys mapped to string
//! values, with the transaction list kept as a JSON array.

use std::sync::{Arc, Mutex};

use rusqlite::{Connection, OptionalExtension};

use crate::{Error, db::initialize};

/// The key for the JSON array of transactions.
pub const TRANSACTIONS_KEY: &str = "transactions";
/// The key for the theme preference, "dark" or "light".
pub const THEME_KEY: &str = "themeChoice";

/// A string key/value store.
pub trait Storage: Send + Sync {
    /// Get the value stored under `key`, or `None` if nothing is stored.
    ///
    /// # Errors
    /// Returns an error if the underlying store cannot be read.
    fn get_item(&self, key: &str) -> Result<Option<String>, Error>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    /// Returns an error if the underlying store cannot be written.
    fn set_item(&self, key: &str, value: &str) -> Result<(), Error>;
}

/// [Storage] backed by the `local_storage` table of a SQLite database.
#[derive(Debug, Clone)]
pub struct SqliteStorage {
    db_connection: Arc<Mutex<Connection>>,
}

impl SqliteStorage {
    /// Wrap `connection`, creating the storage table if needed.
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized.
    pub fn new(connection: Connection) -> Result<Self, Error> {
        initialize(&connection)?;

        Ok(Self {
            db_connection: Arc::new(Mutex::new(connection)),
        })
    }

    /// Storage in a fresh in-memory database.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened.
    pub fn in_memory() -> Result<Self, Error> {
        Self::new(Connection::open_in_memory()?)
    }
}

impl Storage for SqliteStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, Error> {
        let connection = self.db_connection.lock().map_err(|error| {
            tracing::error!("could not acquire database lock: {error}");
            Error::DatabaseLockError
        })?;

        connection
            .query_row(
                "SELECT value FROM local_storage WHERE key = :key",
                &[(":key", &key)],
                |row| row.get(0),
            )
            .optional()
            .map_err(Error::from)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), Error> {
        let connection = self.db_connection.lock().map_err(|error| {
            tracing::error!("could not acquire database lock: {error}");
            Error::DatabaseLockError
        })?;

        connection.execute(
            "INSERT INTO local_storage (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            (key, value),
        )?;

        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod test_storage {
    use crate::Error;

    use super::Storage;

    /// Storage that can be read but rejects every write, like a full quota.
    #[derive(Debug, Default)]
    pub(crate) struct ReadOnlyStorage {
        pub(crate) value: Option<String>,
    }

    impl Storage for ReadOnlyStorage {
        fn get_item(&self, _key: &str) -> Result<Option<String>, Error> {
            Ok(self.value.clone())
        }

        fn set_item(&self, _key: &str, _value: &str) -> Result<(), Error> {
            Err(Error::SqlError(rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_FULL),
                Some("database or disk is full".to_owned()),
            )))
        }
    }
}
