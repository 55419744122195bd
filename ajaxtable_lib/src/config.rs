//! Table and HTTP configuration loaded from TOML, with environment overrides.
//!
//! ```toml
//! [http]
//! timeout_secs = 15
//!
//! [[tables]]
//! name = "orders"
//! container = "#orders-table"
//! base_url = "https://admin.example.com/admin/orders"
//! per_page = 20
//! searchable = ["status", "keyword"]
//! reload_delay_ms = 300
//!
//! [tables.stats]
//! total = "orders-total"
//! completed = "orders-completed"
//! ```

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use ajaxtable_api::{ClientOptions, DEFAULT_PER_PAGE};
use serde::Deserialize;
use url::Url;

use crate::error::TableError;

pub const ENV_TIMEOUT_SECS: &str = "AJAXTABLE_TIMEOUT_SECS";
pub const ENV_USER_AGENT: &str = "AJAXTABLE_USER_AGENT";

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_INVALID_FLAG_MS: u64 = 2000;

/// Top-level configuration file.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub tables: Vec<TableConfig>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct HttpConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: None,
        }
    }
}

/// Everything one table instance needs besides the page it lives on.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct TableConfig {
    /// Short handle used by the CLI. Falls back to the container selector.
    #[serde(default)]
    pub name: Option<String>,
    /// Selector of the region whose contents are replaced on refresh.
    pub container: String,
    /// Plain list endpoint. The search endpoint lives under it.
    pub base_url: Url,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
    /// Filter keys accepted from the URL. Empty accepts any key.
    #[serde(default)]
    pub searchable: Vec<String>,
    /// Logical stats field -> element id.
    #[serde(default)]
    pub stats: BTreeMap<String, String>,
    #[serde(default)]
    pub reload_delay_ms: u64,
    #[serde(default = "default_invalid_flag_ms")]
    pub invalid_flag_ms: u64,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_per_page() -> u32 {
    DEFAULT_PER_PAGE
}

fn default_invalid_flag_ms() -> u64 {
    DEFAULT_INVALID_FLAG_MS
}

impl TableConfig {
    pub fn new(container: impl Into<String>, base_url: Url) -> Self {
        Self {
            name: None,
            container: container.into(),
            base_url,
            per_page: DEFAULT_PER_PAGE,
            searchable: Vec::new(),
            stats: BTreeMap::new(),
            reload_delay_ms: 0,
            invalid_flag_ms: DEFAULT_INVALID_FLAG_MS,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page;
        self
    }

    pub fn with_searchable(mut self, fields: &[&str]) -> Self {
        self.searchable = fields.iter().map(|f| f.to_string()).collect();
        self
    }

    /// Binds a logical stats field to the element id that displays it.
    pub fn with_stat(mut self, field: impl Into<String>, element_id: impl Into<String>) -> Self {
        self.stats.insert(field.into(), element_id.into());
        self
    }

    pub fn with_reload_delay(mut self, delay: Duration) -> Self {
        self.reload_delay_ms = delay.as_millis() as u64;
        self
    }

    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.container)
    }

    pub fn reload_delay(&self) -> Duration {
        Duration::from_millis(self.reload_delay_ms)
    }

    pub fn invalid_flag(&self) -> Duration {
        Duration::from_millis(self.invalid_flag_ms)
    }

    pub fn validate(&self) -> Result<(), TableError> {
        if self.container.trim().is_empty() {
            return Err(TableError::Config("container selector is empty".into()));
        }
        if self.per_page == 0 {
            return Err(TableError::Config(format!(
                "per_page must be positive for {}",
                self.name()
            )));
        }
        if self.base_url.cannot_be_a_base() {
            return Err(TableError::Config(format!(
                "base_url {} cannot carry a path",
                self.base_url
            )));
        }
        Ok(())
    }
}

impl AppConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, TableError> {
        let config: AppConfig = toml::from_str(s)?;
        for table in config.tables.iter() {
            table.validate()?;
        }
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, TableError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Applies `AJAXTABLE_*` environment overrides.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies overrides from an arbitrary key lookup. Unparseable values
    /// are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(secs) = lookup(ENV_TIMEOUT_SECS).and_then(|v| v.parse::<u64>().ok()) {
            self.http.timeout_secs = secs;
        }
        if let Some(agent) = lookup(ENV_USER_AGENT).filter(|v| !v.is_empty()) {
            self.http.user_agent = Some(agent);
        }
    }

    pub fn client_options(&self) -> ClientOptions {
        let mut options = ClientOptions {
            timeout: Duration::from_secs(self.http.timeout_secs),
            ..ClientOptions::default()
        };
        if let Some(agent) = &self.http.user_agent {
            options.user_agent = agent.clone();
        }
        options
    }

    /// Looks a table up by name, then by container selector.
    pub fn table(&self, key: &str) -> Option<&TableConfig> {
        self.tables
            .iter()
            .find(|t| t.name.as_deref() == Some(key))
            .or_else(|| self.tables.iter().find(|t| t.container == key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r##"
[http]
timeout_secs = 15

[[tables]]
name = "orders"
container = "#orders-table"
base_url = "https://admin.example.com/admin/orders"
searchable = ["status", "keyword"]
reload_delay_ms = 300

[tables.stats]
total = "orders-total"

[[tables]]
container = "#notification-list"
base_url = "https://m.example.com/notifications"
per_page = 10
"##;

    #[test]
    fn parses_sample() {
        let config = AppConfig::from_toml_str(SAMPLE).unwrap();
        assert_eq!(config.http.timeout_secs, 15);
        assert_eq!(config.tables.len(), 2);

        let orders = config.table("orders").unwrap();
        assert_eq!(orders.per_page, 20);
        assert_eq!(orders.searchable, vec!["status", "keyword"]);
        assert_eq!(orders.stats.get("total").map(String::as_str), Some("orders-total"));
        assert_eq!(orders.reload_delay(), Duration::from_millis(300));
        assert_eq!(orders.invalid_flag(), Duration::from_millis(2000));

        let notifications = config.table("#notification-list").unwrap();
        assert_eq!(notifications.name(), "#notification-list");
        assert_eq!(notifications.per_page, 10);
    }

    #[test]
    fn example_config_parses() {
        let config =
            AppConfig::from_toml_str(include_str!("../../ajaxtable.example.toml")).unwrap();
        assert_eq!(config.tables.len(), 3);
        let notifications = config.table("notifications").unwrap();
        assert_eq!(notifications.stats.len(), 3);
        assert_eq!(notifications.reload_delay(), Duration::from_millis(300));
    }

    #[test]
    fn rejects_zero_per_page() {
        let s = r##"
[[tables]]
container = "#t"
base_url = "https://admin.example.com/t"
per_page = 0
"##;
        assert!(matches!(
            AppConfig::from_toml_str(s),
            Err(TableError::Config(_))
        ));
    }

    #[test]
    fn rejects_bad_url() {
        let s = r##"
[[tables]]
container = "#t"
base_url = "not a url"
"##;
        assert!(matches!(
            AppConfig::from_toml_str(s),
            Err(TableError::Config(_))
        ));
    }

    #[test]
    fn rejects_non_base_url() {
        let s = r##"
[[tables]]
container = "#t"
base_url = "mailto:ops@example.com"
"##;
        assert!(AppConfig::from_toml_str(s).is_err());
    }

    #[test]
    fn overrides_apply() {
        let mut config = AppConfig::default();
        config.apply_overrides(|key| match key {
            ENV_TIMEOUT_SECS => Some("5".to_string()),
            ENV_USER_AGENT => Some("dispatch-console/2".to_string()),
            _ => None,
        });
        let options = config.client_options();
        assert_eq!(options.timeout, Duration::from_secs(5));
        assert_eq!(options.user_agent, "dispatch-console/2");
    }

    #[test]
    fn bad_override_ignored() {
        let mut config = AppConfig::default();
        config.apply_overrides(|key| (key == ENV_TIMEOUT_SECS).then(|| "soon".to_string()));
        assert_eq!(config.http.timeout_secs, 30);
    }
}
