//! The transaction store: the single owner of the ledger's transactions.
//!
//! The store only changes in response to bus events. After every change it
//! publishes the complete list and writes it to local storage.

use std::sync::{Arc, Mutex};

use crate::{
    Error,
    bus::{EventBus, Outbox},
    event::{Event, EventKind},
    storage::{Storage, TRANSACTIONS_KEY},
    transaction::{
        Transaction, TransactionData, TransactionId,
        core::is_valid_amount,
        id::{IdGenerator, unique_id},
    },
};

/// Owns the authoritative, ordered list of transactions.
pub struct TransactionStore {
    transactions: Vec<Transaction>,
    storage: Arc<dyn Storage>,
    id_generator: Box<dyn IdGenerator>,
}

impl std::fmt::Debug for TransactionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionStore")
            .field("transactions", &self.transactions)
            .finish_non_exhaustive()
    }
}

impl TransactionStore {
    /// Create a store holding the transactions persisted in `storage`.
    ///
    /// Missing or unreadable data gives an empty store, see [load_transactions].
    /// Transactions whose ID is not a hex string are given a fresh ID and the
    /// corrected list is written back.
    pub fn load(storage: Arc<dyn Storage>, mut id_generator: Box<dyn IdGenerator>) -> Self {
        let mut transactions = load_transactions(storage.as_ref());
        let rekeyed = rekey_malformed_ids(&mut transactions, id_generator.as_mut());

        tracing::info!("Loaded {} transactions", transactions.len());

        let store = Self {
            transactions,
            storage,
            id_generator,
        };

        if rekeyed > 0 {
            store.persist();
        }

        store
    }

    /// The current list of transactions, in insertion order.
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Find the first transaction with `id`.
    pub fn find(&self, id: &TransactionId) -> Option<&Transaction> {
        self.transactions
            .iter()
            .find(|transaction| &transaction.id == id)
    }

    /// Append a new transaction with a fresh, unique ID.
    pub fn add(&mut self, data: TransactionData) -> Transaction {
        let id = unique_id(&self.transactions, self.id_generator.as_mut());
        let transaction = Transaction::from_data(id, data);

        tracing::debug!("Adding transaction {}", transaction.id);
        self.transactions.push(transaction.clone());
        self.persist();

        transaction
    }

    /// Remove every transaction with `id`.
    ///
    /// Returns `false`, and leaves storage untouched, if there was none.
    pub fn delete(&mut self, id: &TransactionId) -> bool {
        let count_before = self.transactions.len();
        self.transactions.retain(|transaction| &transaction.id != id);

        if self.transactions.len() == count_before {
            return false;
        }

        tracing::debug!("Deleted transaction {id}");
        self.persist();

        true
    }

    /// Overwrite every field of the transaction with `id` with `data`, keeping the ID.
    ///
    /// Returns `false`, and leaves storage untouched, if there was none.
    pub fn commit_edit(&mut self, id: &TransactionId, data: TransactionData) -> bool {
        let Some(transaction) = self
            .transactions
            .iter_mut()
            .find(|transaction| &transaction.id == id)
        else {
            return false;
        };

        *transaction = Transaction::from_data(id.clone(), data);

        tracing::debug!("Updated transaction {id}");
        self.persist();

        true
    }

    /// React to a bus event, publishing the outcome into `outbox`.
    ///
    /// Events the store does not handle are ignored.
    pub fn handle_event(&mut self, event: &Event, outbox: &mut Outbox) {
        match event {
            Event::TransactionSubmitted(data) => {
                self.add(data.clone());
                outbox.publish(self.changed_event());
            }
            Event::EditDataRequested(id) => match self.find(id) {
                Some(transaction) => outbox.publish(Event::EditDataReady(transaction.clone())),
                None => {
                    tracing::warn!("Requested edit data for missing transaction {id}");
                    outbox.publish(Event::TransactionNotFound(id.clone()));
                }
            },
            Event::DeleteRequested(id) => {
                if self.delete(id) {
                    outbox.publish(self.changed_event());
                } else {
                    tracing::warn!("Tried to delete missing transaction {id}");
                    outbox.publish(Event::TransactionNotFound(id.clone()));
                }
            }
            Event::EditCommitted { id, data } => {
                if self.commit_edit(id, data.clone()) {
                    outbox.publish(self.changed_event());
                } else {
                    tracing::warn!("Tried to update missing transaction {id}");
                    outbox.publish(Event::TransactionNotFound(id.clone()));
                }
            }
            _ => {}
        }
    }

    /// An event announcing the complete, current list.
    pub fn changed_event(&self) -> Event {
        Event::TransactionsChanged(self.transactions.clone())
    }

    /// Write the list to storage. Failures are logged, the in-memory list stays
    /// authoritative.
    fn persist(&self) {
        if let Err(error) = save_transactions(self.storage.as_ref(), &self.transactions) {
            tracing::error!(
                "Could not persist {} transactions: {error}",
                self.transactions.len()
            );
        }
    }
}

/// Subscribe `store` to the events it handles.
pub fn subscribe_store(store: &Arc<Mutex<TransactionStore>>, bus: &mut EventBus) {
    let kinds = [
        EventKind::TransactionSubmitted,
        EventKind::EditDataRequested,
        EventKind::DeleteRequested,
        EventKind::EditCommitted,
    ];

    for kind in kinds {
        let store = store.clone();

        bus.subscribe(kind, move |event, outbox| {
            let mut store = store.lock().map_err(|error| {
                tracing::error!("could not acquire transaction store lock: {error}");
                Error::StateLockError
            })?;

            store.handle_event(event, outbox);

            Ok(())
        });
    }
}

/// Replace every ID that is not well formed with a unique generated one.
/// Returns how many IDs were replaced.
fn rekey_malformed_ids(
    transactions: &mut [Transaction],
    id_generator: &mut dyn IdGenerator,
) -> usize {
    let mut rekeyed = 0;

    for index in 0..transactions.len() {
        if transactions[index].id.is_well_formed() {
            continue;
        }

        let id = unique_id(transactions, id_generator);
        tracing::warn!(
            "Replacing malformed transaction ID {:?} with {id}",
            transactions[index].id.as_str()
        );
        transactions[index].id = id;
        rekeyed += 1;
    }

    rekeyed
}

/// Read the transaction list from `storage`.
///
/// A missing key gives an empty list. Storage errors and malformed JSON are
/// logged and also give an empty list. Transactions that repeat an earlier ID,
/// or whose amount is not positive or exceeds [MAX_AMOUNT](crate::transaction::MAX_AMOUNT),
/// are dropped.
pub fn load_transactions(storage: &dyn Storage) -> Vec<Transaction> {
    let json = match storage.get_item(TRANSACTIONS_KEY) {
        Ok(Some(json)) => json,
        Ok(None) => return Vec::new(),
        Err(error) => {
            tracing::error!("Could not read transactions from storage: {error}");
            return Vec::new();
        }
    };

    let transactions: Vec<Transaction> = match serde_json::from_str(&json) {
        Ok(transactions) => transactions,
        Err(error) => {
            tracing::warn!("Ignoring malformed transactions in storage: {error}");
            return Vec::new();
        }
    };

    let mut unique: Vec<Transaction> = Vec::with_capacity(transactions.len());

    for transaction in transactions {
        if !is_valid_amount(transaction.amount) {
            tracing::warn!(
                "Dropping transaction {} with out of range amount {}",
                transaction.id,
                transaction.amount
            );
            continue;
        }

        if unique.iter().any(|kept| kept.id == transaction.id) {
            tracing::warn!("Dropping transaction with duplicate ID {}", transaction.id);
            continue;
        }

        unique.push(transaction);
    }

    unique
}

/// Write `transactions` to `storage` as a JSON array.
///
/// # Errors
/// Returns an error if the list cannot be serialized or written.
pub fn save_transactions(storage: &dyn Storage, transactions: &[Transaction]) -> Result<(), Error> {
    let json = serde_json::to_string(transactions)
        .map_err(|error| Error::JSONSerializationError(error.to_string()))?;

    storage.set_item(TRANSACTIONS_KEY, &json)
}
