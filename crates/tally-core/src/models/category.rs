//! Category model

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A unique identifier for a category, using UUID v7 (time-sortable)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CategoryId(Uuid);

impl CategoryId {
    /// Create a new unique category ID using UUID v7
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

impl Default for CategoryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CategoryId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// A user-defined grouping for transactions.
///
/// Categories carry no timestamps; the merge layer treats them accordingly
/// (local copies win on conflict).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Unique identifier
    pub id: CategoryId,
    pub name: String,
    /// Display color token (hex)
    pub color: String,
    /// Display icon token
    pub icon: String,
}

impl Category {
    /// Create a new category
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        color: impl Into<String>,
        icon: impl Into<String>,
    ) -> Self {
        Self {
            id: CategoryId::new(),
            name: name.into(),
            color: color.into(),
            icon: icon.into(),
        }
    }

    /// Starter set seeded for users with no categories yet.
    #[must_use]
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::new("Food", "#EF4444", "🍽️"),
            Self::new("Transport", "#3B82F6", "🚗"),
            Self::new("Leisure", "#8B5CF6", "🎮"),
            Self::new("Health", "#10B981", "🏥"),
            Self::new("Education", "#F59E0B", "📚"),
            Self::new("Home", "#6B7280", "🏠"),
            Self::new("Salary", "#059669", "💰"),
            Self::new("Freelance", "#7C3AED", "💻"),
            Self::new("Investments", "#DC2626", "📈"),
            Self::new("Other", "#6B7280", "📦"),
        ]
    }
}
