//! Persistence configuration
//!
//! Loaded from TOML, e.g.:
//!
//! ```toml
//! keyspace_name = "events"
//!
//! [consistency]
//! read_default = "LOCAL_QUORUM"
//!
//! [consistency.read_map]
//! audit = "ALL"
//!
//! [statements]
//! default_batch_size = 200
//! ```

use crate::consistency::ConsistencyLevel;
use crate::error::{CqlError, CqlResult};
use crate::schema::{Identifier, IdentifierRole};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Process-wide persistence configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistenceConfig {
    /// Keyspace used to qualify tables that do not name one
    pub keyspace_name: String,
    pub consistency: ConsistencyConfig,
    pub statements: StatementConfig,
}

/// Default and per-table consistency levels
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsistencyConfig {
    pub read_default: ConsistencyLevel,
    pub write_default: ConsistencyLevel,
    /// Read level by table name
    pub read_map: HashMap<String, ConsistencyLevel>,
    /// Write level by table name
    pub write_map: HashMap<String, ConsistencyLevel>,
}

/// Statement preparation and paging settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatementConfig {
    /// Maximum number of cached prepared statements
    pub prepared_statements_cache_size: usize,
    /// Page size used by slice iterators when the query sets none
    pub default_batch_size: u32,
    pub force_table_creation: bool,
    pub force_batch_statements_ordering: bool,
}

impl Default for StatementConfig {
    fn default() -> Self {
        Self {
            prepared_statements_cache_size: 5000,
            default_batch_size: 100,
            force_table_creation: false,
            force_batch_statements_ordering: false,
        }
    }
}

impl PersistenceConfig {
    /// Default configuration for the given keyspace
    pub fn new(keyspace_name: impl Into<String>) -> Self {
        Self {
            keyspace_name: keyspace_name.into(),
            ..Default::default()
        }
    }

    /// Parse and validate configuration from a TOML string
    pub fn from_toml_str(content: &str) -> CqlResult<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub async fn load_from_file(path: &Path) -> CqlResult<Self> {
        let content = tokio::fs::read_to_string(path).await?;
        Self::from_toml_str(&content)
    }

    pub fn to_toml_string(&self) -> CqlResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Validate configuration
    pub fn validate(&self) -> CqlResult<()> {
        self.keyspace()?;

        if self.statements.prepared_statements_cache_size == 0 {
            return Err(CqlError::configuration(
                "statements.prepared_statements_cache_size",
                "Prepared statements cache size must be greater than 0",
            ));
        }
        if self.statements.default_batch_size == 0 {
            return Err(CqlError::configuration(
                "statements.default_batch_size",
                "Default batch size must be greater than 0",
            ));
        }
        Ok(())
    }

    /// Validated keyspace identifier
    pub fn keyspace(&self) -> CqlResult<Identifier> {
        if self.keyspace_name.trim().is_empty() {
            return Err(CqlError::configuration(
                "keyspace_name",
                "Keyspace name should be provided",
            ));
        }
        Ok(Identifier::new(&self.keyspace_name, IdentifierRole::Keyspace)?)
    }

    /// Read level for a table: per-table entry, else the read default
    pub fn read_level(&self, table: &str) -> ConsistencyLevel {
        self.consistency
            .read_map
            .get(table)
            .copied()
            .unwrap_or(self.consistency.read_default)
    }

    /// Write level for a table: per-table entry, else the write default
    pub fn write_level(&self, table: &str) -> ConsistencyLevel {
        self.consistency
            .write_map
            .get(table)
            .copied()
            .unwrap_or(self.consistency.write_default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;

    #[test]
    fn test_defaults() {
        let config = PersistenceConfig::new("events");
        assert!(config.validate().is_ok());
        assert_eq!(config.statements.prepared_statements_cache_size, 5000);
        assert_eq!(config.statements.default_batch_size, 100);
        assert_eq!(config.read_level("any"), ConsistencyLevel::One);
        assert_eq!(config.write_level("any"), ConsistencyLevel::One);
    }

    #[test]
    fn test_missing_keyspace_rejected() {
        let err = PersistenceConfig::from_toml_str("[statements]\ndefault_batch_size = 10\n")
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Configuration error: Keyspace name should be provided (key: keyspace_name)"
        );
    }

    #[test]
    fn test_reserved_keyspace_rejected() {
        let err = PersistenceConfig::new("keyspace").validate().unwrap_err();
        assert!(matches!(
            err,
            CqlError::Validation(ValidationError::ReservedKeyword {
                role: IdentifierRole::Keyspace,
                ..
            })
        ));
    }

    #[test]
    fn test_consistency_resolution() {
        let config = PersistenceConfig::from_toml_str(
            r#"
keyspace_name = "events"

[consistency]
read_default = "LOCAL_QUORUM"
write_default = "QUORUM"

[consistency.read_map]
audit = "ALL"

[consistency.write_map]
audit = "EACH_QUORUM"
"#,
        )
        .unwrap();

        assert_eq!(config.read_level("audit"), ConsistencyLevel::All);
        assert_eq!(config.read_level("other"), ConsistencyLevel::LocalQuorum);
        assert_eq!(config.write_level("audit"), ConsistencyLevel::EachQuorum);
        assert_eq!(config.write_level("other"), ConsistencyLevel::Quorum);
    }

    #[test]
    fn test_zero_sizes_rejected() {
        let mut config = PersistenceConfig::new("events");
        config.statements.default_batch_size = 0;
        assert!(config.validate().is_err());

        let mut config = PersistenceConfig::new("events");
        config.statements.prepared_statements_cache_size = 0;
        assert!(config.validate().is_err());
    }

    #[tokio::test]
    async fn test_config_serialization() {
        let config = PersistenceConfig::new("events");
        let toml_str = config.to_toml_string().unwrap();
        let deserialized = PersistenceConfig::from_toml_str(&toml_str).unwrap();
        assert_eq!(config, deserialized);
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("persistence.toml");
        tokio::fs::write(&path, "keyspace_name = \"ks\"\n")
            .await
            .unwrap();

        let config = PersistenceConfig::load_from_file(&path).await.unwrap();
        assert_eq!(config.keyspace_name, "ks");

        let missing = PersistenceConfig::load_from_file(&dir.path().join("missing.toml")).await;
        assert!(matches!(missing, Err(CqlError::Io(_))));
    }
}
