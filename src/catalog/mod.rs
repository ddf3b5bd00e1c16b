//! Schema introspection.
//!
//! The catalog is read through the [`CatalogSource`] query interface, which
//! mirrors the rows of a Cassandra-style `system_schema` keyspace. Rows are
//! assembled into immutable [`TableSchema`] and [`UdtSchema`] values.

mod snapshot;

pub use snapshot::{ConnectionOptions, KeyspaceSnapshot, SnapshotCatalog};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Error returned by a [`CatalogSource`] when a catalog query fails
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogError {
    pub message: String,
}

impl CatalogError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "catalog query failed: {}", self.message)
    }
}

impl std::error::Error for CatalogError {}

/// Role of a column in its table
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    PartitionKey,
    Clustering,
    Regular,
    Static,
}

impl ColumnKind {
    pub fn is_key(&self) -> bool {
        matches!(self, ColumnKind::PartitionKey | ColumnKind::Clustering)
    }
}

/// Clustering order of a clustering column
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ClusteringOrder {
    Asc,
    Desc,
    #[default]
    None,
}

impl ClusteringOrder {
    pub fn as_cql(&self) -> &'static str {
        match self {
            ClusteringOrder::Desc => "DESC",
            _ => "ASC",
        }
    }
}

/// One row of `system_schema.columns`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ColumnRow {
    pub table_name: String,
    pub column_name: String,
    #[serde(rename = "type")]
    pub cql_type: String,
    pub kind: ColumnKind,
    /// Position within the column's kind; the catalog reports -1 for non-key columns
    #[serde(default = "default_position")]
    pub position: i32,
    #[serde(default)]
    pub clustering_order: ClusteringOrder,
}

fn default_position() -> i32 {
    -1
}

/// One row of `system_schema.types`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TypeRow {
    pub type_name: String,
    pub field_names: Vec<String>,
    pub field_types: Vec<String>,
}

/// Read-only query interface over the data store's catalog.
///
/// Each method is one bounded query for the whole keyspace. Table rows come
/// back in catalog enumeration order, which the generator preserves in its
/// reports.
pub trait CatalogSource: Send + Sync {
    fn table_rows(&self, keyspace: &str) -> Result<Vec<String>, CatalogError>;

    fn column_rows(&self, keyspace: &str) -> Result<Vec<ColumnRow>, CatalogError>;

    fn type_rows(&self, keyspace: &str) -> Result<Vec<TypeRow>, CatalogError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSchema {
    pub name: String,
    pub cql_type: String,
    pub kind: ColumnKind,
    pub position: i32,
    pub clustering_order: ClusteringOrder,
}

impl From<ColumnRow> for ColumnSchema {
    fn from(row: ColumnRow) -> Self {
        Self {
            name: row.column_name,
            cql_type: row.cql_type,
            kind: row.kind,
            position: row.position,
            clustering_order: row.clustering_order,
        }
    }
}

/// A table and its columns.
///
/// Columns are ordered partition keys (by position), then clustering keys (by
/// position), then static and regular columns (by name).
#[derive(Debug, Clone, PartialEq)]
pub struct TableSchema {
    pub keyspace: String,
    pub name: String,
    columns: Vec<ColumnSchema>,
}

impl TableSchema {
    pub fn new(
        keyspace: impl Into<String>,
        name: impl Into<String>,
        mut columns: Vec<ColumnSchema>,
    ) -> Self {
        columns.sort_by(|a, b| {
            kind_rank(a.kind)
                .cmp(&kind_rank(b.kind))
                .then_with(|| {
                    if a.kind.is_key() {
                        a.position.cmp(&b.position)
                    } else {
                        a.name.cmp(&b.name)
                    }
                })
        });
        Self {
            keyspace: keyspace.into(),
            name: name.into(),
            columns,
        }
    }

    pub fn columns(&self) -> &[ColumnSchema] {
        &self.columns
    }

    pub fn partition_keys(&self) -> impl Iterator<Item = &ColumnSchema> {
        self.columns.iter().filter(|c| c.kind == ColumnKind::PartitionKey)
    }

    pub fn clustering_keys(&self) -> impl Iterator<Item = &ColumnSchema> {
        self.columns.iter().filter(|c| c.kind == ColumnKind::Clustering)
    }

    /// Static and regular columns
    pub fn non_key_columns(&self) -> impl Iterator<Item = &ColumnSchema> {
        self.columns.iter().filter(|c| !c.kind.is_key())
    }
}

fn kind_rank(kind: ColumnKind) -> u8 {
    match kind {
        ColumnKind::PartitionKey => 0,
        ColumnKind::Clustering => 1,
        ColumnKind::Static | ColumnKind::Regular => 2,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UdtField {
    pub name: String,
    pub cql_type: String,
}

/// A user-defined type and its fields, in declaration order
#[derive(Debug, Clone, PartialEq)]
pub struct UdtSchema {
    pub keyspace: String,
    pub name: String,
    pub fields: Vec<UdtField>,
}

/// Everything the generator needs from one keyspace
#[derive(Debug, Clone, PartialEq)]
pub struct KeyspaceSchema {
    pub keyspace: String,
    pub tables: Vec<TableSchema>,
    pub types: Vec<UdtSchema>,
}

/// Why introspection could not produce a schema
#[derive(Debug, Clone, PartialEq)]
pub enum IntrospectError {
    /// The keyspace has no tables and no types (or does not exist)
    SchemaNotFound { keyspace: String },
    Query(CatalogError),
}

impl fmt::Display for IntrospectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntrospectError::SchemaNotFound { keyspace } => {
                write!(f, "keyspace '{}' has no tables or types", keyspace)
            }
            IntrospectError::Query(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for IntrospectError {}

impl From<CatalogError> for IntrospectError {
    fn from(err: CatalogError) -> Self {
        IntrospectError::Query(err)
    }
}

/// Fetch every table and user-defined type of `keyspace`.
///
/// Performs exactly one query per row kind and no writes.
pub fn introspect(
    source: &dyn CatalogSource,
    keyspace: &str,
) -> Result<KeyspaceSchema, IntrospectError> {
    let table_names = source.table_rows(keyspace)?;
    let column_rows = source.column_rows(keyspace)?;
    let type_rows = source.type_rows(keyspace)?;

    tracing::debug!(
        keyspace,
        tables = table_names.len(),
        columns = column_rows.len(),
        types = type_rows.len(),
        "Fetched catalog rows"
    );

    if table_names.is_empty() && type_rows.is_empty() {
        return Err(IntrospectError::SchemaNotFound {
            keyspace: keyspace.to_string(),
        });
    }

    let mut grouped: IndexMap<String, Vec<ColumnSchema>> = table_names
        .into_iter()
        .map(|name| (name, Vec::new()))
        .collect();

    for row in column_rows {
        match grouped.get_mut(&row.table_name) {
            Some(columns) => columns.push(row.into()),
            None => tracing::warn!(
                table = %row.table_name,
                column = %row.column_name,
                "Skipping column of unknown table"
            ),
        }
    }

    let tables = grouped
        .into_iter()
        .map(|(name, columns)| TableSchema::new(keyspace, name, columns))
        .collect();

    let types = type_rows
        .into_iter()
        .map(|row| {
            if row.field_names.len() != row.field_types.len() {
                return Err(CatalogError::new(format!(
                    "type '{}' has {} field names but {} field types",
                    row.type_name,
                    row.field_names.len(),
                    row.field_types.len()
                )));
            }
            Ok(UdtSchema {
                keyspace: keyspace.to_string(),
                name: row.type_name,
                fields: row
                    .field_names
                    .into_iter()
                    .zip(row.field_types)
                    .map(|(name, cql_type)| UdtField { name, cql_type })
                    .collect(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(KeyspaceSchema {
        keyspace: keyspace.to_string(),
        tables,
        types,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(table: &str, name: &str, kind: ColumnKind, position: i32) -> ColumnRow {
        ColumnRow {
            table_name: table.to_string(),
            column_name: name.to_string(),
            cql_type: "int".to_string(),
            kind,
            position,
            clustering_order: ClusteringOrder::None,
        }
    }

    #[test]
    fn test_keys_are_sorted_regardless_of_row_order() {
        let mut snapshot = KeyspaceSnapshot::default();
        snapshot.tables.push("events".to_string());
        snapshot.columns = vec![
            column("events", "payload", ColumnKind::Regular, -1),
            column("events", "seq", ColumnKind::Clustering, 0),
            column("events", "bucket", ColumnKind::PartitionKey, 1),
            column("events", "device", ColumnKind::PartitionKey, 0),
            column("events", "owner", ColumnKind::Static, -1),
        ];
        let catalog = SnapshotCatalog::default().with_keyspace("ks", snapshot);

        let schema = introspect(&catalog, "ks").unwrap();
        let names: Vec<&str> = schema.tables[0]
            .columns()
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(names, ["device", "bucket", "seq", "owner", "payload"]);
    }

    #[test]
    fn test_empty_keyspace_is_not_found() {
        let catalog = SnapshotCatalog::default();
        assert_eq!(
            introspect(&catalog, "missing").unwrap_err(),
            IntrospectError::SchemaNotFound {
                keyspace: "missing".to_string()
            }
        );
    }

    #[test]
    fn test_types_only_keyspace_is_found() {
        let mut snapshot = KeyspaceSnapshot::default();
        snapshot.types.push(TypeRow {
            type_name: "address".to_string(),
            field_names: vec!["street".to_string(), "zip".to_string()],
            field_types: vec!["text".to_string(), "int".to_string()],
        });
        let catalog = SnapshotCatalog::default().with_keyspace("ks", snapshot);

        let schema = introspect(&catalog, "ks").unwrap();
        assert!(schema.tables.is_empty());
        assert_eq!(schema.types[0].fields[1].name, "zip");
        assert_eq!(schema.types[0].fields[1].cql_type, "int");
    }

    #[test]
    fn test_mismatched_type_row_is_a_query_error() {
        let mut snapshot = KeyspaceSnapshot::default();
        snapshot.types.push(TypeRow {
            type_name: "broken".to_string(),
            field_names: vec!["a".to_string()],
            field_types: vec![],
        });
        let catalog = SnapshotCatalog::default().with_keyspace("ks", snapshot);

        assert!(matches!(
            introspect(&catalog, "ks"),
            Err(IntrospectError::Query(_))
        ));
    }

    #[test]
    fn test_table_order_follows_catalog() {
        let mut snapshot = KeyspaceSnapshot::default();
        snapshot.tables = vec!["zeta".to_string(), "alpha".to_string()];
        snapshot.columns = vec![
            column("alpha", "id", ColumnKind::PartitionKey, 0),
            column("zeta", "id", ColumnKind::PartitionKey, 0),
            column("ghost", "id", ColumnKind::PartitionKey, 0),
        ];
        let catalog = SnapshotCatalog::default().with_keyspace("ks", snapshot);

        let schema = introspect(&catalog, "ks").unwrap();
        let names: Vec<&str> = schema.tables.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["zeta", "alpha"]);
    }
}
