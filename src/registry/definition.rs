//! Serializable registry definition.
//!
//! A definition is the versioned, external description of the star schema:
//! fact table, table links, dimensions, metrics and incompatible pairs.
//! It can be written in TOML or JSON:
//!
//! ```toml
//! version = 1
//! date_dimension = "day"
//!
//! [fact]
//! table = "transactions"
//! alias = "t"
//! base_filter = { column = "status", value = "completed" }
//!
//! [[tables]]
//! table = "stores"
//! alias = "s"
//! parent = "transactions"
//! parent_column = "store_id"
//! column = "id"
//!
//! [[dimensions]]
//! id = "region"
//! table = "stores"
//! key_field = "region"
//! display_field = "region"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::{RegistryError, RegistryResult};
use crate::model::{Dimension, FactTable, Metric, TableLink};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryDefinition {
    #[serde(default = "default_version")]
    pub version: u32,
    /// Schema qualifying every table, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    /// Dimension used for date-range requests
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_dimension: Option<String>,
    pub fact: FactTable,
    #[serde(default)]
    pub tables: Vec<TableLink>,
    #[serde(default)]
    pub dimensions: Vec<Dimension>,
    #[serde(default)]
    pub metrics: Vec<Metric>,
    /// Unordered pairs of dimension ids that must not appear together
    #[serde(default)]
    pub incompatible: Vec<[String; 2]>,
}

fn default_version() -> u32 {
    1
}

impl RegistryDefinition {
    pub fn from_toml_str(s: &str) -> RegistryResult<Self> {
        Ok(toml::from_str(s)?)
    }

    pub fn from_json_str(s: &str) -> RegistryResult<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// Load a definition, picking the format from the file extension.
    pub fn load(path: &Path) -> RegistryResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| RegistryError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::from_toml_str(&content),
            Some("json") => Self::from_json_str(&content),
            _ => Err(RegistryError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
        [fact]
        table = "transactions"
        alias = "t"

        [[tables]]
        table = "stores"
        alias = "s"
        parent = "transactions"
        parent_column = "store_id"
        column = "id"

        [[dimensions]]
        id = "region"
        table = "stores"
        key_field = "region"
        display_field = "region"

        [[metrics]]
        id = "revenue"
        function = "sum"
        table = "transactions"
        column = "total_amount"
    "#;

    #[test]
    fn test_parse_minimal_toml() {
        let def = RegistryDefinition::from_toml_str(MINIMAL).unwrap();
        assert_eq!(def.version, 1);
        assert_eq!(def.fact.alias, "t");
        assert!(def.fact.base_filter.is_none());
        assert_eq!(def.tables[0].kind, crate::model::JoinKind::Inner);
        assert_eq!(def.dimensions[0].id, "region");
        assert!(def.incompatible.is_empty());
    }

    #[test]
    fn test_json_roundtrip_of_retail() {
        let def = RegistryDefinition::retail();
        let json = serde_json::to_string(&def).unwrap();
        assert_eq!(RegistryDefinition::from_json_str(&json).unwrap(), def);
    }

    #[test]
    fn test_load_by_extension() {
        let dir = std::env::temp_dir().join(format!("starql-registry-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let toml_path = dir.join("registry.toml");
        std::fs::write(&toml_path, MINIMAL).unwrap();
        assert!(RegistryDefinition::load(&toml_path).is_ok());

        let yaml_path = dir.join("registry.yaml");
        std::fs::write(&yaml_path, "").unwrap();
        assert!(matches!(
            RegistryDefinition::load(&yaml_path),
            Err(RegistryError::UnsupportedFormat(_))
        ));

        let missing = dir.join("missing.toml");
        assert!(matches!(
            RegistryDefinition::load(&missing),
            Err(RegistryError::Read { .. })
        ));

        std::fs::remove_dir_all(&dir).ok();
    }
}
