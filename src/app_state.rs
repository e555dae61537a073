//! Implements a struct that holds the state of the REST server.

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::{
    Error,
    storage::{SqliteStorage, Storage},
    tracker::Tracker,
    transaction::{IdGenerator, RandomIdGenerator},
};

/// The state of the REST server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The ledger session shared by every request.
    pub tracker: Arc<Mutex<Tracker>>,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection.
    ///
    /// This function will initialize the database and load the saved ledger.
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized.
    pub fn new(db_connection: Connection) -> Result<Self, Error> {
        let storage = Arc::new(SqliteStorage::new(db_connection)?);

        Self::with_storage(storage, Box::new(RandomIdGenerator::new()))
    }

    /// Create a new [AppState] from any [Storage] and ID source.
    ///
    /// # Errors
    /// Returns an error if the tracker cannot publish the saved ledger.
    pub fn with_storage(
        storage: Arc<dyn Storage>,
        id_generator: Box<dyn IdGenerator>,
    ) -> Result<Self, Error> {
        let tracker = Tracker::new(storage, id_generator)?;

        Ok(Self {
            tracker: Arc::new(Mutex::new(tracker)),
        })
    }
}
