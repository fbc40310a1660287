//! Remote store contract and wire-level row mapping.
//!
//! The remote schema is flat snake-case rows keyed by (id, `user_id`); the
//! row structs here are that schema, and the conversions below are the only
//! place domain types and wire fields meet.

use std::future::Future;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::{
    Category, CategoryId, Frequency, RecurringRule, RuleId, Snapshot, Transaction, TransactionId,
    TransactionKind,
};

/// Remote persistence scoped per authenticated user.
///
/// `upload` upserts by (id, user) identity; racing uploads resolve by
/// arrival order at the remote. In-flight calls are not cancellable and
/// rely on the transport's own timeout behavior.
pub trait RemoteStore: Send + Sync + 'static {
    /// Fetch all three collections belonging to `user`.
    fn download(&self, user: &str) -> impl Future<Output = Result<Snapshot>> + Send;

    /// Upsert all three collections for `user`. Fail-fast: an error on one
    /// collection aborts the rest of the batch.
    fn upload(&self, user: &str, snapshot: &Snapshot) -> impl Future<Output = Result<()>> + Send;

    fn delete_transaction(
        &self,
        user: &str,
        id: &TransactionId,
    ) -> impl Future<Output = Result<()>> + Send;

    fn delete_category(
        &self,
        user: &str,
        id: &CategoryId,
    ) -> impl Future<Output = Result<()>> + Send;

    fn delete_rule(&self, user: &str, id: &RuleId) -> impl Future<Output = Result<()>> + Send;
}

/// Wire row for the `transactions` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRow {
    pub id: TransactionId,
    pub description: String,
    pub amount: Decimal,
    pub category_id: CategoryId,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub generated_from: Option<RuleId>,
    #[serde(default)]
    pub period: Option<String>,
}

impl TransactionRow {
    #[must_use]
    pub fn from_domain(transaction: &Transaction, user: &str) -> Self {
        Self {
            id: transaction.id,
            description: transaction.description.clone(),
            amount: transaction.amount,
            category_id: transaction.category_id,
            date: transaction.date,
            kind: transaction.kind,
            user_id: user.to_string(),
            created_at: transaction.created_at,
            updated_at: transaction.updated_at,
            generated_from: transaction.generated_from,
            period: transaction.period.clone(),
        }
    }

    #[must_use]
    pub fn into_domain(self) -> Transaction {
        Transaction {
            id: self.id,
            description: self.description,
            amount: self.amount,
            category_id: self.category_id,
            date: self.date,
            kind: self.kind,
            created_at: self.created_at,
            updated_at: self.updated_at,
            generated_from: self.generated_from,
            period: self.period,
        }
    }
}

/// Wire row for the `categories` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRow {
    pub id: CategoryId,
    pub name: String,
    pub color: String,
    pub icon: String,
    pub user_id: String,
}

impl CategoryRow {
    #[must_use]
    pub fn from_domain(category: &Category, user: &str) -> Self {
        Self {
            id: category.id,
            name: category.name.clone(),
            color: category.color.clone(),
            icon: category.icon.clone(),
            user_id: user.to_string(),
        }
    }

    #[must_use]
    pub fn into_domain(self) -> Category {
        Category {
            id: self.id,
            name: self.name,
            color: self.color,
            icon: self.icon,
        }
    }
}

/// Wire row for the `recurring_transactions` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurringRow {
    pub id: RuleId,
    pub description: String,
    pub amount: Decimal,
    pub category_id: CategoryId,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub frequency: Frequency,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub day_of_month: Option<u32>,
    #[serde(default)]
    pub day_of_week: Option<u32>,
    #[serde(default)]
    pub interval_months: Option<u32>,
    pub is_active: bool,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub last_generated: Option<DateTime<Utc>>,
}

impl RecurringRow {
    #[must_use]
    pub fn from_domain(rule: &RecurringRule, user: &str) -> Self {
        Self {
            id: rule.id,
            description: rule.description.clone(),
            amount: rule.amount,
            category_id: rule.category_id,
            kind: rule.kind,
            frequency: rule.frequency,
            start_date: rule.start_date,
            end_date: rule.end_date,
            day_of_month: rule.day_of_month,
            day_of_week: rule.day_of_week,
            interval_months: rule.interval_months,
            is_active: rule.is_active,
            user_id: user.to_string(),
            created_at: rule.created_at,
            updated_at: rule.updated_at,
            last_generated: rule.last_generated,
        }
    }

    #[must_use]
    pub fn into_domain(self) -> RecurringRule {
        RecurringRule {
            id: self.id,
            description: self.description,
            amount: self.amount,
            category_id: self.category_id,
            kind: self.kind,
            frequency: self.frequency,
            start_date: self.start_date,
            end_date: self.end_date,
            day_of_month: self.day_of_month,
            day_of_week: self.day_of_week,
            interval_months: self.interval_months,
            is_active: self.is_active,
            last_generated: self.last_generated,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
