//! The application root: owns the event bus, the transaction store and the view
//! controller, and wires them together.

use std::sync::{Arc, Mutex, MutexGuard};

use axum::http::StatusCode;
use maud::Markup;

use crate::{
    Error,
    bus::EventBus,
    storage::Storage,
    theme::Theme,
    transaction::{IdGenerator, Transaction, TransactionStore, subscribe_store},
    view::{UserAction, ViewController, subscribe_view},
};

/// One ledger session.
#[derive(Debug)]
pub struct Tracker {
    bus: EventBus,
    store: Arc<Mutex<TransactionStore>>,
    view: Arc<Mutex<ViewController>>,
}

impl Tracker {
    /// Load the ledger from `storage`, subscribe the store and the view, and
    /// publish the initial list so the view starts with correct totals.
    ///
    /// # Errors
    /// Returns an error if the initial list cannot be published.
    pub fn new(
        storage: Arc<dyn Storage>,
        id_generator: Box<dyn IdGenerator>,
    ) -> Result<Self, Error> {
        let store = Arc::new(Mutex::new(TransactionStore::load(
            storage.clone(),
            id_generator,
        )));
        let view = Arc::new(Mutex::new(ViewController::new(storage)));

        let mut bus = EventBus::new();
        subscribe_store(&store, &mut bus);
        subscribe_view(&view, &mut bus);

        let initial_list = lock(&store)?.changed_event();
        bus.publish(initial_list)?;

        Ok(Self { bus, store, view })
    }

    /// Let the view translate `action`, then publish the resulting event.
    ///
    /// # Errors
    /// Returns an error if the action is malformed or a handler fails.
    pub fn interact(&mut self, action: UserAction) -> Result<(), Error> {
        tracing::debug!("Handling {action:?}");

        let event = lock(&self.view)?.handle_action(action)?;

        match event {
            Some(event) => self.bus.publish(event),
            None => Ok(()),
        }
    }

    /// Render the ledger region, see [ViewController::render_ledger].
    ///
    /// # Errors
    /// Returns an error if the view lock is poisoned.
    pub fn render_ledger(&self) -> Result<(StatusCode, Markup), Error> {
        Ok(lock(&self.view)?.render_ledger())
    }

    /// Render the full page, using `preferred` if no theme has been saved.
    ///
    /// # Errors
    /// Returns an error if the view lock is poisoned.
    pub fn render_page(&self, preferred: Theme) -> Result<Markup, Error> {
        Ok(lock(&self.view)?.render_page(preferred))
    }

    /// A copy of the store's current list.
    ///
    /// # Errors
    /// Returns an error if the store lock is poisoned.
    pub fn transactions(&self) -> Result<Vec<Transaction>, Error> {
        Ok(lock(&self.store)?.transactions().to_vec())
    }

    /// A copy of the list the view last received.
    ///
    /// # Errors
    /// Returns an error if the view lock is poisoned.
    pub fn rendered_transactions(&self) -> Result<Vec<Transaction>, Error> {
        Ok(lock(&self.view)?.transactions().to_vec())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, Error> {
    mutex.lock().map_err(|error| {
        tracing::error!("could not acquire tracker lock: {error}");
        Error::StateLockError
    })
}
