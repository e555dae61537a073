//! Transaction management for the ledger.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and its ID and type
//! - ID generation that keeps IDs unique within the ledger
//! - The `TransactionStore` that owns, mutates and persists the list
//! - Aggregate totals over the list

mod core;
mod id;
mod store;
mod totals;

pub use core::{
    MAX_AMOUNT, Transaction, TransactionData, TransactionId, TransactionType, is_valid_amount,
};
pub use id::{IdGenerator, RandomIdGenerator};
pub use store::{TransactionStore, subscribe_store};
pub use totals::Totals;

#[cfg(test)]
pub(crate) use id::test_ids::SequenceIdGenerator;
#[cfg(test)]
pub(crate) use store::save_transactions;
