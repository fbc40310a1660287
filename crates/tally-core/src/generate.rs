//! Materialization of recurring rules into concrete transactions.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tokio::time::MissedTickBehavior;

use crate::clock::Clock;
use crate::error::Result;
use crate::models::{
    period_key, RecurringRule, RuleId, Transaction, TransactionId, RECURRING_SUFFIX,
};
use crate::schedule::should_generate;
use crate::store::LedgerStore;

/// Cadence of the background generation pass.
pub const GENERATION_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// Result of one generation pass. The caller commits both parts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationOutcome {
    /// Transactions materialized by this pass.
    pub new_transactions: Vec<Transaction>,
    /// Rules that fired, with the instant to stamp as `last_generated`.
    pub rule_updates: HashMap<RuleId, DateTime<Utc>>,
}

impl GenerationOutcome {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.new_transactions.is_empty() && self.rule_updates.is_empty()
    }
}

/// Evaluate every rule against `now` and materialize the ones that are due.
///
/// A candidate is dropped when an entry for the same rule and calendar
/// month already exists, either in `existing` or earlier in the same pass,
/// so repeated invocations within one month produce nothing new. Dropping
/// a duplicate is silent; it is the expected outcome of re-evaluation, not
/// an error. `last_generated` is stamped with `now`, not with the effective
/// date the transaction carries.
#[must_use]
pub fn generate(
    rules: &[RecurringRule],
    existing: &[Transaction],
    now: DateTime<Utc>,
) -> GenerationOutcome {
    let mut seen: HashSet<(RuleId, String)> = existing
        .iter()
        .filter_map(|t| Some((t.generated_from?, t.period.clone()?)))
        .collect();

    let mut outcome = GenerationOutcome::default();
    for rule in rules {
        let Some(effective) = should_generate(rule, now) else {
            continue;
        };
        let period = period_key(effective);
        if !seen.insert((rule.id, period.clone())) {
            tracing::debug!("Rule {} already materialized for {}", rule.id, period);
            continue;
        }

        outcome.new_transactions.push(Transaction {
            id: TransactionId::new(),
            description: format!("{}{RECURRING_SUFFIX}", rule.description),
            amount: rule.amount,
            category_id: rule.category_id,
            date: effective,
            kind: rule.kind,
            created_at: now,
            updated_at: now,
            generated_from: Some(rule.id),
            period: Some(period),
        });
        outcome.rule_updates.insert(rule.id, now);
    }

    if !outcome.new_transactions.is_empty() {
        tracing::info!(
            "Generated {} recurring transaction(s)",
            outcome.new_transactions.len()
        );
    }
    outcome
}

/// Run one generation pass against `store`, committing the outcome.
///
/// Returns how many transactions were materialized.
pub fn run_once<S: LedgerStore>(store: &mut S, now: DateTime<Utc>) -> Result<usize> {
    let snapshot = store.snapshot();
    let outcome = generate(&snapshot.rules, &snapshot.transactions, now);
    let count = outcome.new_transactions.len();
    if !outcome.is_empty() {
        store.commit(outcome)?;
    }
    Ok(count)
}

/// Drive generation passes: once immediately, then every
/// [`GENERATION_INTERVAL`] for as long as the task is kept alive.
///
/// Best-effort cadence; failures to persist are logged and the next tick
/// retries, since fire decisions are date comparisons rather than
/// edge-triggered events.
pub async fn run_generation_loop<S, C>(store: Arc<Mutex<S>>, clock: C)
where
    S: LedgerStore + Send + 'static,
    C: Clock,
{
    let mut ticker = tokio::time::interval(GENERATION_INTERVAL);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        let now = clock.now();
        let mut store = store.lock().await;
        if let Err(error) = run_once(&mut *store, now) {
            tracing::error!("Generation pass failed: {}", error);
        }
    }
}
