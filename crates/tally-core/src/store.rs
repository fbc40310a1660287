//! Local ledger storage.
//!
//! The core reads and writes whole collections; there is no query language,
//! and the duplicate check in generation is a linear scan over a snapshot.

use std::fs;
use std::path::PathBuf;

use crate::error::Result;
use crate::generate::GenerationOutcome;
use crate::models::{
    Category, CategoryId, RecurringRule, RuleId, Snapshot, Transaction, TransactionId,
};

/// Trait for local ledger storage operations
pub trait LedgerStore {
    /// Value snapshot of all three collections.
    fn snapshot(&self) -> Snapshot;

    /// Replace all collections, e.g. after adopting a merged snapshot.
    fn replace(&mut self, snapshot: Snapshot) -> Result<()>;

    /// Append generated transactions and stamp the fired rules in one step.
    fn commit(&mut self, outcome: GenerationOutcome) -> Result<()>;

    fn append_transaction(&mut self, transaction: Transaction) -> Result<()>;

    fn append_category(&mut self, category: Category) -> Result<()>;

    fn append_rule(&mut self, rule: RecurringRule) -> Result<()>;

    fn remove_transaction(&mut self, id: &TransactionId) -> Result<()>;

    fn remove_category(&mut self, id: &CategoryId) -> Result<()>;

    fn remove_rule(&mut self, id: &RuleId) -> Result<()>;
}

fn apply_outcome(data: &mut Snapshot, outcome: GenerationOutcome) {
    for rule in &mut data.rules {
        if let Some(at) = outcome.rule_updates.get(&rule.id) {
            // `updated_at` is left alone: a generation stamp is not a user
            // edit and must not win merge conflicts on its own.
            rule.last_generated = Some(*at);
        }
    }
    data.transactions.extend(outcome.new_transactions);
}

/// In-memory store; the local-only default and the test double.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    data: Snapshot,
}

impl MemoryStore {
    #[must_use]
    pub fn new(data: Snapshot) -> Self {
        Self { data }
    }

    /// Empty store pre-seeded with the default categories.
    #[must_use]
    pub fn seeded() -> Self {
        Self {
            data: Snapshot {
                categories: Category::defaults(),
                ..Snapshot::default()
            },
        }
    }
}

impl LedgerStore for MemoryStore {
    fn snapshot(&self) -> Snapshot {
        self.data.clone()
    }

    fn replace(&mut self, snapshot: Snapshot) -> Result<()> {
        self.data = snapshot;
        Ok(())
    }

    fn commit(&mut self, outcome: GenerationOutcome) -> Result<()> {
        apply_outcome(&mut self.data, outcome);
        Ok(())
    }

    fn append_transaction(&mut self, transaction: Transaction) -> Result<()> {
        self.data.transactions.push(transaction);
        Ok(())
    }

    fn append_category(&mut self, category: Category) -> Result<()> {
        self.data.categories.push(category);
        Ok(())
    }

    fn append_rule(&mut self, rule: RecurringRule) -> Result<()> {
        self.data.rules.push(rule);
        Ok(())
    }

    fn remove_transaction(&mut self, id: &TransactionId) -> Result<()> {
        self.data.transactions.retain(|t| t.id != *id);
        Ok(())
    }

    fn remove_category(&mut self, id: &CategoryId) -> Result<()> {
        self.data.categories.retain(|c| c.id != *id);
        Ok(())
    }

    fn remove_rule(&mut self, id: &RuleId) -> Result<()> {
        self.data.rules.retain(|r| r.id != *id);
        Ok(())
    }
}

/// Single-file JSON persistence for the ledger.
///
/// The whole snapshot is loaded at open and the file rewritten after every
/// mutation, matching the full-collection semantics of the trait.
#[derive(Debug)]
pub struct JsonStore {
    path: PathBuf,
    data: Snapshot,
}

impl JsonStore {
    /// Open the store at `path`, creating an empty ledger when the file
    /// does not exist yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let data = if path.exists() {
            serde_json::from_str(&fs::read_to_string(&path)?)?
        } else {
            Snapshot::default()
        };
        Ok(Self { path, data })
    }

    fn persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(&self.data)?)?;
        Ok(())
    }

    fn mutate(&mut self, apply: impl FnOnce(&mut Snapshot)) -> Result<()> {
        apply(&mut self.data);
        self.persist()
    }
}

impl LedgerStore for JsonStore {
    fn snapshot(&self) -> Snapshot {
        self.data.clone()
    }

    fn replace(&mut self, snapshot: Snapshot) -> Result<()> {
        self.mutate(|data| *data = snapshot)
    }

    fn commit(&mut self, outcome: GenerationOutcome) -> Result<()> {
        self.mutate(|data| apply_outcome(data, outcome))
    }

    fn append_transaction(&mut self, transaction: Transaction) -> Result<()> {
        self.mutate(|data| data.transactions.push(transaction))
    }

    fn append_category(&mut self, category: Category) -> Result<()> {
        self.mutate(|data| data.categories.push(category))
    }

    fn append_rule(&mut self, rule: RecurringRule) -> Result<()> {
        self.mutate(|data| data.rules.push(rule))
    }

    fn remove_transaction(&mut self, id: &TransactionId) -> Result<()> {
        self.mutate(|data| data.transactions.retain(|t| t.id != *id))
    }

    fn remove_category(&mut self, id: &CategoryId) -> Result<()> {
        self.mutate(|data| data.categories.retain(|c| c.id != *id))
    }

    fn remove_rule(&mut self, id: &RuleId) -> Result<()> {
        self.mutate(|data| data.rules.retain(|r| r.id != *id))
    }
}
