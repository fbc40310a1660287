//! Recurring rule model

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

use super::{CategoryId, TransactionKind};

/// A unique identifier for a recurring rule, using UUID v7 (time-sortable)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RuleId(Uuid);

impl RuleId {
    /// Create a new unique rule ID using UUID v7
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

impl Default for RuleId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RuleId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// How often a recurring rule produces a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Monthly,
    Weekly,
    Yearly,
    /// Every `interval_months` months.
    Custom,
}

/// A repeating payment or income pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurringRule {
    /// Unique identifier
    pub id: RuleId,
    pub description: String,
    pub amount: Decimal,
    pub category_id: CategoryId,
    pub kind: TransactionKind,
    pub frequency: Frequency,
    /// Generation never occurs before this date.
    pub start_date: NaiveDate,
    /// Generation stops after this date, when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    /// Day of month (1-28); monthly and custom frequencies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_of_month: Option<u32>,
    /// Day of week (0-6, Sunday = 0); weekly frequency, display only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_of_week: Option<u32>,
    /// Months between occurrences (1-60); required for custom frequency.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval_months: Option<u32>,
    /// When false, generation is suspended.
    pub is_active: bool,
    /// Instant generation last fired; not the date the generated entry
    /// carries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_generated: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RecurringRule {
    /// Create an active rule starting at `start_date` with no optional
    /// fields set.
    #[must_use]
    pub fn new(
        description: impl Into<String>,
        amount: Decimal,
        category_id: CategoryId,
        kind: TransactionKind,
        frequency: Frequency,
        start_date: NaiveDate,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: RuleId::new(),
            description: description.into(),
            amount,
            category_id,
            kind,
            frequency,
            start_date,
            end_date: None,
            day_of_month: None,
            day_of_week: None,
            interval_months: None,
            is_active: true,
            last_generated: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check the field ranges a well-formed rule must satisfy.
    pub fn validate(&self) -> Result<()> {
        if self.amount <= Decimal::ZERO {
            return Err(Error::InvalidInput(
                "rule amount must be positive".to_string(),
            ));
        }
        if let Some(day) = self.day_of_month {
            if !(1..=28).contains(&day) {
                return Err(Error::InvalidInput(format!(
                    "day_of_month must be 1-28, got {day}"
                )));
            }
        }
        if let Some(day) = self.day_of_week {
            if day > 6 {
                return Err(Error::InvalidInput(format!(
                    "day_of_week must be 0-6, got {day}"
                )));
            }
        }
        match (self.frequency, self.interval_months) {
            (Frequency::Custom, None) => Err(Error::InvalidInput(
                "custom frequency requires interval_months".to_string(),
            )),
            (Frequency::Custom, Some(interval)) if !(1..=60).contains(&interval) => {
                Err(Error::InvalidInput(format!(
                    "interval_months must be 1-60, got {interval}"
                )))
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(frequency: Frequency) -> RecurringRule {
        RecurringRule::new(
            "Rent",
            Decimal::new(120_000, 2),
            CategoryId::new(),
            TransactionKind::Expense,
            frequency,
            NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
        )
    }

    #[test]
    fn test_new_rule_is_active() {
        let rule = rule(Frequency::Monthly);
        assert!(rule.is_active);
        assert!(rule.last_generated.is_none());
        assert!(rule.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_day_of_month_out_of_range() {
        let mut rule = rule(Frequency::Monthly);
        rule.day_of_month = Some(31);
        assert!(rule.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_custom_without_interval() {
        let rule = rule(Frequency::Custom);
        assert!(rule.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_interval_out_of_range() {
        let mut rule = rule(Frequency::Custom);
        rule.interval_months = Some(61);
        assert!(rule.validate().is_err());

        rule.interval_months = Some(60);
        assert!(rule.validate().is_ok());
    }

    #[test]
    fn test_frequency_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&Frequency::Monthly).unwrap(),
            "\"monthly\""
        );
        assert_eq!(
            serde_json::to_string(&Frequency::Custom).unwrap(),
            "\"custom\""
        );
    }
}
