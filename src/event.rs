//! The events carried by the [EventBus](crate::bus::EventBus).

use crate::transaction::{Transaction, TransactionData, TransactionId};

/// Something that happened in the ledger, with its payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// The user submitted the form for a new transaction.
    TransactionSubmitted(TransactionData),
    /// The ledger changed. Carries the complete, current list.
    TransactionsChanged(Vec<Transaction>),
    /// The user asked to edit the transaction with this ID.
    EditDataRequested(TransactionId),
    /// The data for a requested edit, ready to pre-fill a form.
    EditDataReady(Transaction),
    /// The user saved changes to a transaction.
    EditCommitted {
        /// The transaction to overwrite.
        id: TransactionId,
        /// The new field values.
        data: TransactionData,
    },
    /// The user asked to delete the transaction with this ID.
    DeleteRequested(TransactionId),
    /// A request referred to a transaction that is not in the ledger.
    TransactionNotFound(TransactionId),
}

/// The kind of an [Event], used as the key for subscriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// See [Event::TransactionSubmitted].
    TransactionSubmitted,
    /// See [Event::TransactionsChanged].
    TransactionsChanged,
    /// See [Event::EditDataRequested].
    EditDataRequested,
    /// See [Event::EditDataReady].
    EditDataReady,
    /// See [Event::EditCommitted].
    EditCommitted,
    /// See [Event::DeleteRequested].
    DeleteRequested,
    /// See [Event::TransactionNotFound].
    TransactionNotFound,
}

impl Event {
    /// The subscription key for this event.
    pub fn kind(&self) -> EventKind {
        match self {
            Event::TransactionSubmitted(_) => EventKind::TransactionSubmitted,
            Event::TransactionsChanged(_) => EventKind::TransactionsChanged,
            Event::EditDataRequested(_) => EventKind::EditDataRequested,
            Event::EditDataReady(_) => EventKind::EditDataReady,
            Event::EditCommitted { .. } => EventKind::EditCommitted,
            Event::DeleteRequested(_) => EventKind::DeleteRequested,
            Event::TransactionNotFound(_) => EventKind::TransactionNotFound,
        }
    }
}
