//! Last-write-wins reconciliation of local and remote collections.

use std::collections::HashMap;
use std::hash::Hash;

use chrono::{DateTime, Utc};

use crate::models::Snapshot;

/// Merge two versions of a collection, keyed by record identity.
///
/// Seeds from `local`; a remote item replaces the entry only when no local
/// entry exists or its timestamp strictly exceeds the stored one, so equal
/// timestamps keep the local value. A `None` timestamp never exceeds
/// anything: collections without an ordering signal keep local copies on
/// conflict while remote-only items are still added. Output order is
/// unspecified.
pub fn merge<T, K, KF, TF>(local: Vec<T>, remote: Vec<T>, key_of: KF, timestamp_of: TF) -> Vec<T>
where
    K: Eq + Hash,
    KF: Fn(&T) -> K,
    TF: Fn(&T) -> Option<DateTime<Utc>>,
{
    let mut map: HashMap<K, (T, Option<DateTime<Utc>>)> = HashMap::new();

    for item in local {
        let timestamp = timestamp_of(&item);
        map.insert(key_of(&item), (item, timestamp));
    }

    for item in remote {
        let timestamp = timestamp_of(&item);
        let key = key_of(&item);
        let replace = match map.get(&key) {
            None => true,
            Some((_, existing)) => wins(timestamp, *existing),
        };
        if replace {
            map.insert(key, (item, timestamp));
        }
    }

    map.into_values().map(|(item, _)| item).collect()
}

fn wins(incoming: Option<DateTime<Utc>>, existing: Option<DateTime<Utc>>) -> bool {
    match (incoming, existing) {
        (Some(incoming), Some(existing)) => incoming > existing,
        (Some(_), None) => true,
        (None, _) => false,
    }
}

/// Merge the three synchronized collections of two snapshots.
///
/// Transactions and rules resolve by `updated_at`. Categories carry no
/// timestamps, so the local copy always wins on conflict.
#[must_use]
pub fn merge_snapshots(local: Snapshot, remote: Snapshot) -> Snapshot {
    Snapshot {
        transactions: merge(
            local.transactions,
            remote.transactions,
            |t| t.id,
            |t| Some(t.updated_at),
        ),
        categories: merge(local.categories, remote.categories, |c| c.id, |_| None),
        rules: merge(local.rules, remote.rules, |r| r.id, |r| Some(r.updated_at)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, CategoryId, Transaction, TransactionKind};
    use chrono::{NaiveDate, TimeZone};
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;

    fn entry(description: &str, updated_at: DateTime<Utc>) -> Transaction {
        let mut transaction = Transaction::new(
            description,
            Decimal::new(1000, 2),
            CategoryId::new(),
            TransactionKind::Expense,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        );
        transaction.updated_at = updated_at;
        transaction
    }

    fn instant(year: i32, month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap()
    }

    fn sorted_ids(items: &[Transaction]) -> Vec<String> {
        let mut ids: Vec<_> = items.iter().map(|t| t.id.as_str()).collect();
        ids.sort_unstable();
        ids
    }

    #[test]
    fn test_merge_with_self_is_identity() {
        let items = vec![
            entry("coffee", instant(2024, 1, 1)),
            entry("books", instant(2024, 2, 1)),
        ];

        let merged = merge(items.clone(), items.clone(), |t| t.id, |t| Some(t.updated_at));
        assert_eq!(sorted_ids(&merged), sorted_ids(&items));
    }

    #[test]
    fn test_newer_remote_wins() {
        let local = entry("local", instant(2024, 1, 1));
        let mut remote = local.clone();
        remote.description = "remote".to_string();
        remote.updated_at = instant(2024, 6, 1);

        let merged = merge(vec![local], vec![remote], |t| t.id, |t| Some(t.updated_at));
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].description, "remote");
    }

    #[test]
    fn test_newer_local_is_kept() {
        let local = entry("local", instant(2024, 6, 1));
        let mut remote = local.clone();
        remote.description = "remote".to_string();
        remote.updated_at = instant(2024, 1, 1);

        let merged = merge(vec![local], vec![remote], |t| t.id, |t| Some(t.updated_at));
        assert_eq!(merged[0].description, "local");
    }

    #[test]
    fn test_equal_timestamps_keep_local() {
        let local = entry("local", instant(2024, 3, 1));
        let mut remote = local.clone();
        remote.description = "remote".to_string();

        let merged = merge(vec![local], vec![remote], |t| t.id, |t| Some(t.updated_at));
        assert_eq!(merged[0].description, "local");
    }

    #[test]
    fn test_disjoint_items_are_united() {
        let local = entry("local-only", instant(2024, 1, 1));
        let remote = entry("remote-only", instant(2024, 1, 2));

        let merged = merge(
            vec![local],
            vec![remote],
            |t| t.id,
            |t| Some(t.updated_at),
        );
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_categories_keep_local_on_conflict() {
        let local = Category::new("Groceries", "#EF4444", "🍽️");
        let mut remote = local.clone();
        remote.name = "Mercado".to_string();
        let remote_only = Category::new("Travel", "#3B82F6", "✈️");

        let merged = merge(
            vec![local.clone()],
            vec![remote, remote_only],
            |c| c.id,
            |_| None,
        );

        assert_eq!(merged.len(), 2);
        let conflicted = merged.iter().find(|c| c.id == local.id).unwrap();
        assert_eq!(conflicted.name, "Groceries");
    }

    #[test]
    fn test_snapshot_merge_covers_all_collections() {
        let stale = entry("stale", instant(2024, 1, 1));
        let mut fresh = stale.clone();
        fresh.description = "fresh".to_string();
        fresh.updated_at = instant(2024, 6, 1);

        let local = Snapshot {
            transactions: vec![stale],
            categories: vec![Category::new("Home", "#6B7280", "🏠")],
            rules: Vec::new(),
        };
        let remote = Snapshot {
            transactions: vec![fresh],
            categories: Vec::new(),
            rules: Vec::new(),
        };

        let merged = merge_snapshots(local, remote);
        assert_eq!(merged.transactions[0].description, "fresh");
        assert_eq!(merged.categories.len(), 1);
    }
}
