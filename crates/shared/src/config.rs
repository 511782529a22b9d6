//! Configuration types for restdb

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Environment variable holding the endpoint URL
pub const ENV_URL: &str = "RESTDB_URL";

/// Environment variable holding the API key
pub const ENV_API_KEY: &str = "RESTDB_API_KEY";

/// Default file name looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "restdb.json";

const REST_PATH: &str = "/rest/v1";

fn default_timeout_secs() -> u64 {
    30
}

/// Connection settings for a PostgREST endpoint
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestConfig {
    /// Project URL, with or without the trailing `/rest/v1`
    #[serde(default)]
    pub url: String,

    /// API key sent both as `apikey` and as bearer token
    #[serde(default)]
    pub api_key: String,

    /// Non-default schema, sent as `Accept-Profile`/`Content-Profile`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for RestConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            api_key: String::new(),
            schema: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

// The key never shows up in logs.
impl fmt::Debug for RestConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestConfig")
            .field("url", &self.url)
            .field("api_key", &redact(&self.api_key))
            .field("schema", &self.schema)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

fn redact(key: &str) -> String {
    if key.is_empty() {
        "<unset>".to_string()
    } else {
        format!("<redacted, {} chars>", key.chars().count())
    }
}

impl RestConfig {
    /// Create a config from a URL and key
    pub fn new(url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    /// Load configuration from a JSON or YAML file
    pub fn from_file(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let is_yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml") | Some("yml")
        );

        let config: Self = if is_yaml {
            serde_yaml::from_str(&content)?
        } else {
            serde_json::from_str(&content)?
        };
        Ok(config)
    }

    /// Overlay values found through `lookup` (normally `std::env::var`)
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_URL).filter(|v| !v.is_empty()) {
            self.url = url;
        }
        if let Some(key) = lookup(ENV_API_KEY).filter(|v| !v.is_empty()) {
            self.api_key = key;
        }
    }

    /// Check that the config can be used to issue requests
    pub fn validate(&self) -> crate::Result<()> {
        let url = self.url.trim();
        if url.is_empty() {
            return Err(crate::RestError::Config(format!(
                "endpoint URL is not set (use --url, {} or a config file)",
                ENV_URL
            )));
        }

        let rest = url
            .strip_prefix("https://")
            .or_else(|| url.strip_prefix("http://"))
            .ok_or_else(|| {
                crate::RestError::Config(format!("URL '{}' must start with http:// or https://", url))
            })?;
        if rest.is_empty() || rest.starts_with('/') {
            return Err(crate::RestError::Config(format!("URL '{}' has no host", url)));
        }

        if self.api_key.trim().is_empty() {
            return Err(crate::RestError::Config(format!(
                "API key is not set (use --api-key, {} or a config file)",
                ENV_API_KEY
            )));
        }

        if self.timeout_secs == 0 {
            return Err(crate::RestError::Config("timeoutSecs must be greater than zero".to_string()));
        }

        Ok(())
    }

    /// Base URL of the REST resources, always ending in `/rest/v1`
    pub fn rest_base(&self) -> String {
        let trimmed = self.url.trim().trim_end_matches('/');
        if trimmed.ends_with(REST_PATH) {
            trimmed.to_string()
        } else {
            format!("{}{}", trimmed, REST_PATH)
        }
    }

    /// URL of a single table resource
    pub fn table_url(&self, table: &str) -> String {
        format!("{}/{}", self.rest_base(), table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    // ============== Parsing ==============

    #[test]
    fn test_config_parse() {
        let json = r#"{
            "url": "https://example.supabase.co",
            "apiKey": "secret",
            "schema": "catalog"
        }"#;

        let config: RestConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.url, "https://example.supabase.co");
        assert_eq!(config.api_key, "secret");
        assert_eq!(config.schema.as_deref(), Some("catalog"));
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn test_from_json_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"url": "http://localhost:54321", "apiKey": "k", "timeoutSecs": 5}}"#).unwrap();

        let config = RestConfig::from_file(file.path()).unwrap();
        assert_eq!(config.url, "http://localhost:54321");
        assert_eq!(config.timeout_secs, 5);
    }

    #[test]
    fn test_from_yaml_file() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "url: http://localhost:54321\napiKey: k").unwrap();

        let config = RestConfig::from_file(file.path()).unwrap();
        assert_eq!(config.api_key, "k");
    }

    #[test]
    fn test_from_missing_file() {
        let result = RestConfig::from_file(Path::new("/nonexistent/restdb.json"));
        assert!(matches!(result, Err(crate::RestError::Io(_))));
    }

    // ============== Environment ==============

    #[test]
    fn test_env_overrides_file_values() {
        let mut config = RestConfig::new("http://file", "file-key");
        config.apply_env(lookup_from(&[(ENV_URL, "http://env")]));

        assert_eq!(config.url, "http://env");
        assert_eq!(config.api_key, "file-key");
    }

    #[test]
    fn test_empty_env_is_ignored() {
        let mut config = RestConfig::new("http://file", "file-key");
        config.apply_env(lookup_from(&[(ENV_API_KEY, "")]));
        assert_eq!(config.api_key, "file-key");
    }

    // ============== Validation ==============

    #[test]
    fn test_validate_ok() {
        assert!(RestConfig::new("https://x.supabase.co", "k").validate().is_ok());
    }

    #[test]
    fn test_validate_missing_url() {
        let err = RestConfig::new("", "k").validate().unwrap_err();
        assert!(err.to_string().contains("URL is not set"));
    }

    #[test]
    fn test_validate_bad_scheme() {
        let err = RestConfig::new("ftp://host", "k").validate().unwrap_err();
        assert!(err.to_string().contains("http://"));
    }

    #[test]
    fn test_validate_no_host() {
        assert!(RestConfig::new("https://", "k").validate().is_err());
    }

    #[test]
    fn test_validate_missing_key() {
        let err = RestConfig::new("https://host", "  ").validate().unwrap_err();
        assert!(err.to_string().contains("API key"));
    }

    // ============== URLs ==============

    #[test]
    fn test_rest_base_appends_path() {
        let config = RestConfig::new("https://host.supabase.co/", "k");
        assert_eq!(config.rest_base(), "https://host.supabase.co/rest/v1");
    }

    #[test]
    fn test_rest_base_keeps_existing_path() {
        let config = RestConfig::new("https://host.supabase.co/rest/v1", "k");
        assert_eq!(config.rest_base(), "https://host.supabase.co/rest/v1");
        assert_eq!(config.table_url("opere"), "https://host.supabase.co/rest/v1/opere");
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = RestConfig::new("https://host", "super-secret");
        let debug = format!("{:?}", config);
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("redacted"));
    }
}
