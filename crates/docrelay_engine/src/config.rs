//! Configuration for the sync core.

/// Configuration for the dispatcher and remote clients.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Base URL of the credential exchange service.
    pub exchange_url: String,
    /// Application key presented on exchange requests.
    pub app_key: String,
    /// API version string sent on document commands.
    pub api_version: String,
    /// Tables drained on an online edge, in drain order.
    pub tables: Vec<String>,
}

impl SyncConfig {
    /// Creates a configuration for the given exchange endpoint.
    pub fn new(exchange_url: impl Into<String>, app_key: impl Into<String>) -> Self {
        Self {
            exchange_url: exchange_url.into(),
            app_key: app_key.into(),
            api_version: "1".into(),
            tables: Vec::new(),
        }
    }

    /// Appends a table to the drain order.
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.tables.push(table.into());
        self
    }

    /// Replaces the drained tables.
    pub fn with_tables(mut self, tables: Vec<String>) -> Self {
        self.tables = tables;
        self
    }

    /// Sets the API version string.
    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self::new("", "")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder() {
        let config = SyncConfig::new("https://exchange.example.com", "app-1")
            .with_table("notes")
            .with_table("folders")
            .with_api_version("2");

        assert_eq!(config.exchange_url, "https://exchange.example.com");
        assert_eq!(config.app_key, "app-1");
        assert_eq!(config.tables, vec!["notes".to_string(), "folders".to_string()]);
        assert_eq!(config.api_version, "2");
    }

    #[test]
    fn table_order_is_preserved() {
        let config = SyncConfig::default()
            .with_tables(vec!["b".into(), "a".into(), "c".into()]);
        assert_eq!(config.tables, vec!["b", "a", "c"]);
    }
}
