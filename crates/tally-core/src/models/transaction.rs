//! Transaction model

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{CategoryId, RuleId};

/// Suffix appended to the description of transactions materialized from a
/// recurring rule.
pub const RECURRING_SUFFIX: &str = " (recurring)";

/// A unique identifier for a transaction, using UUID v7 (time-sortable)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionId(Uuid);

impl TransactionId {
    /// Create a new unique transaction ID using UUID v7
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Get the string representation of this ID
    #[must_use]
    pub fn as_str(&self) -> String {
        self.0.to_string()
    }
}

impl Default for TransactionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TransactionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Whether a transaction moves money in or out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

/// A single dated ledger entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique identifier
    pub id: TransactionId,
    pub description: String,
    /// Positive, currency-agnostic amount.
    pub amount: Decimal,
    /// Referenced category; existence is not enforced at this layer.
    pub category_id: CategoryId,
    /// Calendar date the entry applies to (no time component).
    pub date: NaiveDate,
    pub kind: TransactionKind,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Rule this entry was generated from, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_from: Option<RuleId>,
    /// Year-month of the effective date for generated entries; the
    /// duplicate-generation guard keys on (`generated_from`, `period`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<String>,
}

impl Transaction {
    /// Create a manually entered transaction dated `date`.
    #[must_use]
    pub fn new(
        description: impl Into<String>,
        amount: Decimal,
        category_id: CategoryId,
        kind: TransactionKind,
        date: NaiveDate,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: TransactionId::new(),
            description: description.into(),
            amount,
            category_id,
            date,
            kind,
            created_at: now,
            updated_at: now,
            generated_from: None,
            period: None,
        }
    }

    /// Whether this entry was materialized from a recurring rule.
    #[must_use]
    pub const fn is_generated(&self) -> bool {
        self.generated_from.is_some()
    }

    /// Bump `updated_at` after a user edit.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Year-month key (`"%Y-%m"`) identifying the calendar month of a date.
#[must_use]
pub fn period_key(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_transaction_id_unique() {
        let id1 = TransactionId::new();
        let id2 = TransactionId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_transaction_id_parse() {
        let id = TransactionId::new();
        let parsed: TransactionId = id.as_str().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_transaction_new() {
        let transaction = Transaction::new(
            "Groceries",
            Decimal::new(4250, 2),
            CategoryId::new(),
            TransactionKind::Expense,
            NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
        );
        assert_eq!(transaction.description, "Groceries");
        assert!(!transaction.is_generated());
        assert_eq!(transaction.created_at, transaction.updated_at);
    }

    #[test]
    fn test_kind_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&TransactionKind::Income).unwrap(),
            "\"income\""
        );
        assert_eq!(
            serde_json::to_string(&TransactionKind::Expense).unwrap(),
            "\"expense\""
        );
    }

    #[test]
    fn test_period_key() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(period_key(date), "2024-03");
    }
}
