//! Remote backend configuration.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Public endpoint/key pair for the hosted backend.
///
/// These are safe-to-ship bootstrap values; secret credentials must never
/// be stored here. An unconfigured value leaves the core in local-only
/// mode.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RemoteConfig {
    #[serde(default)]
    pub supabase_url: Option<String>,
    #[serde(default)]
    pub supabase_anon_key: Option<String>,
}

impl RemoteConfig {
    pub fn new(url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            supabase_url: Some(url.into()),
            supabase_anon_key: Some(anon_key.into()),
        }
    }

    /// Whether both endpoint and key are present.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        normalize(self.supabase_url.as_deref()).is_some()
            && normalize(self.supabase_anon_key.as_deref()).is_some()
    }

    /// Validated base URL with any trailing slash removed.
    pub fn url(&self) -> Result<String> {
        let url = normalize(self.supabase_url.as_deref())
            .ok_or(Error::NotConfigured("backend URL is not set"))?;
        if is_http_url(&url) {
            Ok(url.trim_end_matches('/').to_string())
        } else {
            Err(Error::InvalidInput(format!(
                "backend URL must include http:// or https://, got '{url}'"
            )))
        }
    }

    /// Validated anon key.
    pub fn anon_key(&self) -> Result<String> {
        normalize(self.supabase_anon_key.as_deref())
            .ok_or(Error::NotConfigured("backend anon key is not set"))
    }
}

/// Trim whitespace and reject empties.
fn normalize(value: Option<&str>) -> Option<String> {
    let value = value?.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn is_http_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_not_configured() {
        assert!(!RemoteConfig::default().is_configured());
    }

    #[test]
    fn test_blank_values_are_not_configured() {
        let config = RemoteConfig::new("   ", "key");
        assert!(!config.is_configured());
    }

    #[test]
    fn test_url_strips_trailing_slash() {
        let config = RemoteConfig::new("https://project.supabase.co/", "anon");
        assert_eq!(config.url().unwrap(), "https://project.supabase.co");
    }

    #[test]
    fn test_url_rejects_missing_scheme() {
        let config = RemoteConfig::new("project.supabase.co", "anon");
        assert!(config.url().is_err());
    }
}
