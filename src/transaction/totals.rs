//! Aggregate statistics over a list of transactions.

use crate::transaction::{Transaction, TransactionType};

/// The running totals shown above the transaction list.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Totals {
    /// The sum of all income amounts.
    pub income: f64,
    /// The sum of all expense amounts.
    pub expense: f64,
}

impl Totals {
    /// Sum the income and expense amounts in `transactions`.
    pub fn from_transactions(transactions: &[Transaction]) -> Self {
        transactions
            .iter()
            .fold(Self::default(), |mut totals, transaction| {
                match transaction.transaction_type {
                    TransactionType::Income => totals.income += transaction.amount,
                    TransactionType::Expense => totals.expense += transaction.amount,
                }

                totals
            })
    }

    /// Income minus expenses. Negative when more was spent than earned.
    pub fn balance(&self) -> f64 {
        self.income - self.expense
    }
}
