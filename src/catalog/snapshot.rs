//! File-backed catalog source.
//!
//! A snapshot is a YAML or JSON dump of the catalog rows for one or more
//! keyspaces, shaped like `system_schema`:
//!
//! ```yaml
//! keyspaces:
//!   shop:
//!     tables: [orders]
//!     columns:
//!       - { table_name: orders, column_name: id, type: uuid, kind: partition_key, position: 0 }
//!       - { table_name: orders, column_name: total, type: decimal, kind: regular }
//!     types:
//!       - { type_name: address, field_names: [street], field_types: [text] }
//! ```

use super::{CatalogError, CatalogSource, ColumnRow, TypeRow};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Connection settings handed to a catalog source. The generator never
/// interprets them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConnectionOptions {
    pub contact_points: Vec<String>,
    pub datacenter: Option<String>,
}

/// Catalog rows of one keyspace
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct KeyspaceSnapshot {
    #[serde(default)]
    pub tables: Vec<String>,
    #[serde(default)]
    pub columns: Vec<ColumnRow>,
    #[serde(default)]
    pub types: Vec<TypeRow>,
}

/// [`CatalogSource`] over an in-memory catalog dump
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SnapshotCatalog {
    #[serde(default)]
    pub keyspaces: IndexMap<String, KeyspaceSnapshot>,
    #[serde(skip)]
    connection: ConnectionOptions,
}

impl SnapshotCatalog {
    /// Load a snapshot; `.json` files are read as JSON, anything else as YAML
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read catalog snapshot {}: {}", path.display(), e))?;

        if path.extension().map(|ext| ext == "json").unwrap_or(false) {
            serde_json::from_str(&contents)
                .map_err(|e| format!("Failed to parse catalog snapshot {}: {}", path.display(), e))
        } else {
            Self::from_yaml_str(&contents)
                .map_err(|e| format!("Failed to parse catalog snapshot {}: {}", path.display(), e))
        }
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    pub fn with_keyspace(mut self, name: impl Into<String>, keyspace: KeyspaceSnapshot) -> Self {
        self.keyspaces.insert(name.into(), keyspace);
        self
    }

    /// Attach connection settings; recorded for diagnostics only
    pub fn with_connection(mut self, connection: ConnectionOptions) -> Self {
        self.connection = connection;
        self
    }

    pub fn connection(&self) -> &ConnectionOptions {
        &self.connection
    }

    fn keyspace(&self, keyspace: &str) -> Option<&KeyspaceSnapshot> {
        self.keyspaces.get(keyspace)
    }
}

impl CatalogSource for SnapshotCatalog {
    fn table_rows(&self, keyspace: &str) -> Result<Vec<String>, CatalogError> {
        Ok(self
            .keyspace(keyspace)
            .map(|ks| ks.tables.clone())
            .unwrap_or_default())
    }

    fn column_rows(&self, keyspace: &str) -> Result<Vec<ColumnRow>, CatalogError> {
        Ok(self
            .keyspace(keyspace)
            .map(|ks| ks.columns.clone())
            .unwrap_or_default())
    }

    fn type_rows(&self, keyspace: &str) -> Result<Vec<TypeRow>, CatalogError> {
        Ok(self
            .keyspace(keyspace)
            .map(|ks| ks.types.clone())
            .unwrap_or_default())
    }
}
