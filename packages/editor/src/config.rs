//! Editor configuration.
//!
//! Every field has a default so a partial (or absent) config file still
//! produces a usable configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_SAVE_ENDPOINT: &str = "http://localhost:3000/api/admin/content/save";
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_TOOLBAR_GRACE_MS: u64 = 150;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorConfig {
    /// URL the grouped save posts each document to
    pub save_endpoint: String,

    /// Transport timeout for one document write
    pub request_timeout_ms: u64,

    /// How long the rich-text toolbar stays up after the editor blurs
    pub toolbar_grace_ms: u64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            save_endpoint: DEFAULT_SAVE_ENDPOINT.to_string(),
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            toolbar_grace_ms: DEFAULT_TOOLBAR_GRACE_MS,
        }
    }
}

impl EditorConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn toolbar_grace(&self) -> Duration {
        Duration::from_millis(self.toolbar_grace_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EditorConfig::default();
        assert_eq!(config.save_endpoint, DEFAULT_SAVE_ENDPOINT);
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert_eq!(config.toolbar_grace(), Duration::from_millis(150));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: EditorConfig = serde_json::from_str(r#"{"toolbarGraceMs": 300}"#).unwrap();
        assert_eq!(config.toolbar_grace_ms, 300);
        assert_eq!(config.request_timeout_ms, DEFAULT_REQUEST_TIMEOUT_MS);
        assert_eq!(config.save_endpoint, DEFAULT_SAVE_ENDPOINT);
    }
}
