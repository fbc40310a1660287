//! Supabase (PostgREST) implementation of [`RemoteStore`].

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::RemoteConfig;
use crate::error::{Error, Result};
use crate::models::{CategoryId, RuleId, Snapshot, TransactionId};

use super::remote::{CategoryRow, RecurringRow, RemoteStore, TransactionRow};

const TABLE_TRANSACTIONS: &str = "transactions";
const TABLE_CATEGORIES: &str = "categories";
const TABLE_RECURRING: &str = "recurring_transactions";

/// REST client for a hosted Supabase backend.
///
/// Rows are upserted with `on_conflict=id,user_id`, matching the remote's
/// per-user uniqueness constraint. Session-token exchange is the host
/// application's concern; this client authenticates every request with the
/// configured key.
#[derive(Clone)]
pub struct SupabaseRemote {
    rest_url: String,
    anon_key: String,
    client: Client,
}

impl SupabaseRemote {
    pub fn new(config: &RemoteConfig) -> Result<Self> {
        Ok(Self {
            rest_url: format!("{}/rest/v1", config.url()?),
            anon_key: config.anon_key()?,
            client: Client::builder().build()?,
        })
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.anon_key)
            .header("Accept", "application/json")
    }

    async fn select<T: DeserializeOwned>(&self, table: &str, user: &str) -> Result<Vec<T>> {
        let request = self
            .client
            .get(format!("{}/{table}", self.rest_url))
            .query(&[("select", "*"), ("user_id", &format!("eq.{user}"))]);

        let response = self.authorize(request).send().await?;
        let response = ensure_success(response).await?;
        Ok(response.json().await?)
    }

    async fn upsert<T: Serialize>(&self, table: &str, rows: &[T]) -> Result<()> {
        if rows.is_empty() {
            return Ok(());
        }

        let request = self
            .client
            .post(format!("{}/{table}", self.rest_url))
            .query(&[("on_conflict", "id,user_id")])
            .header("Prefer", "resolution=merge-duplicates")
            .json(rows);

        let response = self.authorize(request).send().await?;
        ensure_success(response).await?;
        Ok(())
    }

    async fn delete(&self, table: &str, user: &str, id: &str) -> Result<()> {
        let request = self
            .client
            .delete(format!("{}/{table}", self.rest_url))
            .query(&[("id", &format!("eq.{id}")), ("user_id", &format!("eq.{user}"))]);

        let response = self.authorize(request).send().await?;
        ensure_success(response).await?;
        Ok(())
    }
}

impl RemoteStore for SupabaseRemote {
    async fn download(&self, user: &str) -> Result<Snapshot> {
        let categories: Vec<CategoryRow> = self.select(TABLE_CATEGORIES, user).await?;
        let transactions: Vec<TransactionRow> = self.select(TABLE_TRANSACTIONS, user).await?;
        let rules: Vec<RecurringRow> = self.select(TABLE_RECURRING, user).await?;

        Ok(Snapshot {
            transactions: transactions
                .into_iter()
                .map(TransactionRow::into_domain)
                .collect(),
            categories: categories
                .into_iter()
                .map(CategoryRow::into_domain)
                .collect(),
            rules: rules.into_iter().map(RecurringRow::into_domain).collect(),
        })
    }

    async fn upload(&self, user: &str, snapshot: &Snapshot) -> Result<()> {
        let categories: Vec<CategoryRow> = snapshot
            .categories
            .iter()
            .map(|category| CategoryRow::from_domain(category, user))
            .collect();
        self.upsert(TABLE_CATEGORIES, &categories).await?;

        let transactions: Vec<TransactionRow> = snapshot
            .transactions
            .iter()
            .map(|transaction| TransactionRow::from_domain(transaction, user))
            .collect();
        self.upsert(TABLE_TRANSACTIONS, &transactions).await?;

        let rules: Vec<RecurringRow> = snapshot
            .rules
            .iter()
            .map(|rule| RecurringRow::from_domain(rule, user))
            .collect();
        self.upsert(TABLE_RECURRING, &rules).await?;

        Ok(())
    }

    async fn delete_transaction(&self, user: &str, id: &TransactionId) -> Result<()> {
        self.delete(TABLE_TRANSACTIONS, user, &id.as_str()).await
    }

    async fn delete_category(&self, user: &str, id: &CategoryId) -> Result<()> {
        self.delete(TABLE_CATEGORIES, user, &id.as_str()).await
    }

    async fn delete_rule(&self, user: &str, id: &RuleId) -> Result<()> {
        self.delete(TABLE_RECURRING, user, &id.as_str()).await
    }
}

async fn ensure_success(response: Response) -> Result<Response> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Err(Error::Api(parse_api_error(status, &body)))
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
    details: Option<String>,
}

/// Extract a readable message from a PostgREST error body.
///
/// Public for testability — callers can exercise parsing without network
/// access.
#[must_use]
pub fn parse_api_error(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<ApiErrorBody>(body) {
        if let Some(message) = payload.message.or(payload.details) {
            return format!("{} ({})", message.trim(), status.as_u16());
        }
    }

    let trimmed = compact_text(body);
    if trimmed.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        format!("{} ({})", trimmed, status.as_u16())
    }
}

/// Truncate text to at most 180 characters for error messages.
fn compact_text(value: &str) -> String {
    value.trim().chars().take(180).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn test_parse_api_error_prefers_message_field() {
        let body = r#"{"message": "duplicate key value", "details": "ignored"}"#;
        assert_eq!(
            parse_api_error(StatusCode::CONFLICT, body),
            "duplicate key value (409)"
        );
    }

    #[test]
    fn test_parse_api_error_falls_back_to_raw_body() {
        assert_eq!(
            parse_api_error(StatusCode::BAD_GATEWAY, "upstream unreachable"),
            "upstream unreachable (502)"
        );
        assert_eq!(parse_api_error(StatusCode::BAD_GATEWAY, "  "), "HTTP 502");
    }

    #[test]
    fn test_new_rejects_unconfigured_backend() {
        assert!(SupabaseRemote::new(&RemoteConfig::default()).is_err());
    }

    /// Integration test for Supabase sync - only runs if env vars are set
    /// Run with: SUPABASE_URL=... SUPABASE_ANON_KEY=... cargo test test_supabase_roundtrip -- --ignored
    #[tokio::test]
    #[ignore = "Requires SUPABASE_URL and SUPABASE_ANON_KEY"]
    async fn test_supabase_roundtrip() {
        let url = env::var("SUPABASE_URL").expect("SUPABASE_URL must be set");
        let key = env::var("SUPABASE_ANON_KEY").expect("SUPABASE_ANON_KEY must be set");

        let remote = SupabaseRemote::new(&RemoteConfig::new(url, key)).unwrap();
        let user = "tally-core-integration-test";

        let snapshot = Snapshot {
            categories: vec![crate::models::Category::new("Test", "#000000", "🧪")],
            ..Snapshot::default()
        };
        remote.upload(user, &snapshot).await.unwrap();

        let downloaded = remote.download(user).await.unwrap();
        assert!(!downloaded.categories.is_empty());
    }
}
