//! Data models for Tally

mod category;
mod recurring;
mod transaction;

use serde::{Deserialize, Serialize};

pub use category::{Category, CategoryId};
pub use recurring::{Frequency, RecurringRule, RuleId};
pub use transaction::{
    period_key, Transaction, TransactionId, TransactionKind, RECURRING_SUFFIX,
};

/// Value snapshot of the three synchronized collections.
///
/// The core components treat snapshots as immutable values: they return new
/// collections for the caller to commit and never mutate one in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub transactions: Vec<Transaction>,
    pub categories: Vec<Category>,
    pub rules: Vec<RecurringRule>,
}

impl Snapshot {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty() && self.categories.is_empty() && self.rules.is_empty()
    }
}
