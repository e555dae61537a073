//! Defines the core data models for transactions.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

// ============================================================================
// MODELS
// ============================================================================

/// The largest amount a single transaction may hold.
///
/// Keeps totals well inside the range where `f64` still resolves cents.
pub const MAX_AMOUNT: f64 = 1_000_000_000_000.0;

/// Whether `amount` is a finite value above zero and no more than [MAX_AMOUNT].
pub fn is_valid_amount(amount: f64) -> bool {
    amount.is_finite() && amount > 0.0 && amount <= MAX_AMOUNT
}

/// The unique, base-16 identifier of a [Transaction].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(String);

impl TransactionId {
    /// Wrap `id` as a transaction ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the ID is a non-empty string of hex digits, which is safe to
    /// place in a URL path as is.
    pub fn is_well_formed(&self) -> bool {
        !self.0.is_empty() && self.0.chars().all(|c| c.is_ascii_hexdigit())
    }
}

impl Display for TransactionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Whether money was earned or spent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money earned.
    #[default]
    Income,
    /// Money spent.
    Expense,
}

impl TransactionType {
    /// The lowercase name used in forms and persisted JSON.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The user-editable fields of a transaction, i.e. everything except the ID.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionData {
    /// A text description of what the transaction was for.
    pub description: String,
    /// The amount of money earned or spent, always positive.
    pub amount: f64,
    /// Whether this is income or an expense.
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
}

impl TransactionData {
    /// Create the data for a new transaction.
    pub fn new(description: &str, amount: f64, transaction_type: TransactionType) -> Self {
        Self {
            description: description.to_owned(),
            amount,
            transaction_type,
        }
    }
}

/// An income or expense entry in the ledger.
///
/// Serializes to `{"description": .., "amount": .., "type": .., "id": ..}`,
/// the shape kept in local storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// A text description of what the transaction was for.
    pub description: String,
    /// The amount of money earned or spent, always positive.
    pub amount: f64,
    /// Whether this is income or an expense.
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// The ID of the transaction, unique within the ledger.
    pub id: TransactionId,
}

impl Transaction {
    /// Combine `data` with `id`. Every field other than the ID comes from `data`.
    pub fn from_data(id: TransactionId, data: TransactionData) -> Self {
        Self {
            description: data.description,
            amount: data.amount,
            transaction_type: data.transaction_type,
            id,
        }
    }

    /// A copy of the transaction's fields without the ID.
    pub fn data(&self) -> TransactionData {
        TransactionData {
            description: self.description.clone(),
            amount: self.amount,
            transaction_type: self.transaction_type,
        }
    }

    /// Whether this transaction is income.
    pub fn is_income(&self) -> bool {
        self.transaction_type == TransactionType::Income
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::{
        MAX_AMOUNT, Transaction, TransactionData, TransactionId, TransactionType, is_valid_amount,
    };

    #[test]
    fn serializes_with_type_key() {
        let transaction = Transaction::from_data(
            TransactionId::new("a1f"),
            TransactionData::new("Coffee", 4.5, TransactionType::Expense),
        );

        let json = serde_json::to_value(&transaction).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "description": "Coffee",
                "amount": 4.5,
                "type": "expense",
                "id": "a1f",
            })
        );
    }

    #[test]
    fn deserializes_legacy_shape() {
        let json = r#"{"description":"Salary","amount":100,"type":"income","id":"9c"}"#;

        let transaction: Transaction = serde_json::from_str(json).unwrap();

        assert_eq!(transaction.id, TransactionId::new("9c"));
        assert_eq!(transaction.amount, 100.0);
        assert!(transaction.is_income());
    }

    #[test]
    fn from_data_keeps_id_and_replaces_fields() {
        let id = TransactionId::new("beef");
        let data = TransactionData::new("Rent", 1200.0, TransactionType::Expense);

        let transaction = Transaction::from_data(id.clone(), data.clone());

        assert_eq!(transaction.id, id);
        assert_eq!(transaction.data(), data);
    }

    #[test]
    fn well_formed_ids_are_hex() {
        for id in ["9c", "0000000100abcdef", "BEEF"] {
            assert!(TransactionId::new(id).is_well_formed(), "{id:?} should be well formed");
        }

        for id in ["", "a/b", "action", "12 34", "ab?x=1"] {
            assert!(!TransactionId::new(id).is_well_formed(), "{id:?} should be malformed");
        }
    }

    #[test]
    fn amounts_must_be_positive_and_bounded() {
        assert!(is_valid_amount(0.01));
        assert!(is_valid_amount(MAX_AMOUNT));

        for amount in [0.0, -1.0, MAX_AMOUNT * 1.01, 1e300, f64::INFINITY, f64::NAN] {
            assert!(!is_valid_amount(amount), "{amount} should be rejected");
        }
    }
}
