//! Entity model building.
//!
//! Turns a [`TableSchema`] or [`UdtSchema`] plus its generation directives
//! into an [`EntityModel`]: names resolved, keys ordered, Java types and
//! imports mapped. Every artifact template renders from this model alone.

use crate::catalog::{ClusteringOrder, ColumnKind, ColumnSchema, TableSchema, UdtSchema};
use crate::codegen::types::{parse_cql_type, ImportSet, TypeError, TypeMapper};
use crate::codegen::utils::{capitalize, to_class_name, to_constant_name, to_field_name};
use crate::error::GeneratorError;
use std::collections::{BTreeSet, HashMap};

/// Constants every generated entity declares alongside its column constants
pub const RESERVED_CONSTANTS: &[&str] = &["CQL_KEYSPACE", "CQL_TABLE"];

/// Methods every generated entity declares or inherits besides its accessors
pub const RESERVED_METHODS: &[&str] = &["getID", "cacheKey", "equals", "hashCode", "toString", "getClass"];

/// Which artifacts to produce for one entity, and how to name it.
///
/// This is the explicit form of what would otherwise be annotations on a
/// hand-written class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationDirectives {
    /// Identifier to derive the class name from instead of the catalog name
    pub name_override: Option<String>,
    pub cacheable: bool,
    pub generate_factory: bool,
    pub generate_rest: bool,
    pub generate_tests: bool,
    pub generate_ddl: bool,
}

impl Default for GenerationDirectives {
    fn default() -> Self {
        Self {
            name_override: None,
            cacheable: false,
            generate_factory: true,
            generate_rest: true,
            generate_tests: true,
            generate_ddl: true,
        }
    }
}

/// Where an entity model came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    Table,
    Type,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Table => "table",
            SourceKind::Type => "type",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EntityFlags {
    pub is_cacheable: bool,
    pub has_clustering_keys: bool,
    pub generates_factory: bool,
    pub generates_rest: bool,
    pub generates_tests: bool,
    pub generates_ddl: bool,
}

/// One column (or UDT field) as the templates see it
#[derive(Debug, Clone, PartialEq)]
pub struct FieldModel {
    /// Catalog identifier
    pub column: String,
    pub field_name: String,
    pub constant_name: String,
    pub java_type: String,
    pub imports: ImportSet,
    pub cql_type: String,
    pub kind: ColumnKind,
    pub clustering_order: ClusteringOrder,
    pub frozen: bool,
    /// Java literal for scalar types, used by generated tests
    pub sample: Option<String>,
}

impl FieldModel {
    pub fn getter(&self) -> String {
        format!("get{}", capitalize(&self.field_name))
    }

    pub fn setter(&self) -> String {
        format!("set{}", capitalize(&self.field_name))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EntityModel {
    /// Catalog table or type name
    pub source_name: String,
    pub source_kind: SourceKind,
    pub keyspace: String,
    pub class_name: String,
    /// Base package; artifacts live in sub-packages of it
    pub package: String,
    pub partition_keys: Vec<FieldModel>,
    pub clustering_keys: Vec<FieldModel>,
    /// Static and regular columns, or UDT fields in declaration order
    pub fields: Vec<FieldModel>,
    /// User-defined types referenced by any field
    pub udt_refs: BTreeSet<String>,
    /// Union of every field's imports
    pub imports: ImportSet,
    pub flags: EntityFlags,
}

impl EntityModel {
    /// Partition keys then clustering keys
    pub fn key_fields(&self) -> impl Iterator<Item = &FieldModel> {
        self.partition_keys.iter().chain(self.clustering_keys.iter())
    }

    /// Key fields followed by non-key fields
    pub fn all_fields(&self) -> impl Iterator<Item = &FieldModel> {
        self.key_fields().chain(self.fields.iter())
    }

    pub fn entity_package(&self) -> String {
        format!("{}.entity", self.package)
    }

    pub fn is_table(&self) -> bool {
        self.source_kind == SourceKind::Table
    }
}

/// Class name an entity will get, before building its model
pub fn class_name_for(source_name: &str, directives: &GenerationDirectives) -> String {
    to_class_name(directives.name_override.as_deref().unwrap_or(source_name))
}

/// Builds entity models for one keyspace
#[derive(Debug, Clone)]
pub struct EntityModelBuilder {
    package: String,
    mapper: TypeMapper,
}

impl EntityModelBuilder {
    /// `udt_names` are the keyspace's user-defined types; references to any
    /// other type name fail with `UnsupportedType`
    pub fn new<I, S>(package: impl Into<String>, udt_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let package = package.into();
        let mapper = TypeMapper::new(udt_names, format!("{}.entity", package));
        Self { package, mapper }
    }

    pub fn mapper(&self) -> &TypeMapper {
        &self.mapper
    }

    pub fn build_table(
        &self,
        table: &TableSchema,
        directives: &GenerationDirectives,
    ) -> Result<EntityModel, GeneratorError> {
        let class_name = class_name_for(&table.name, directives);

        let mut partition: Vec<&ColumnSchema> = table.partition_keys().collect();
        partition.sort_by_key(|c| c.position);
        let mut clustering: Vec<&ColumnSchema> = table.clustering_keys().collect();
        clustering.sort_by_key(|c| c.position);
        let mut others: Vec<&ColumnSchema> = table.non_key_columns().collect();
        others.sort_by(|a, b| a.name.cmp(&b.name));

        let mut seed = 0;
        let mut field = |column: &ColumnSchema| {
            seed += 1;
            self.field(&column.name, &column.cql_type, column.kind, column.clustering_order, seed)
        };

        let partition_keys = partition.into_iter().map(&mut field).collect::<Result<Vec<_>, _>>()?;
        let clustering_keys = clustering.into_iter().map(&mut field).collect::<Result<Vec<_>, _>>()?;
        let fields = others.into_iter().map(&mut field).collect::<Result<Vec<_>, _>>()?;

        let flags = EntityFlags {
            is_cacheable: directives.cacheable,
            has_clustering_keys: !clustering_keys.is_empty(),
            generates_factory: directives.generate_factory,
            generates_rest: directives.generate_rest,
            generates_tests: directives.generate_tests,
            generates_ddl: directives.generate_ddl,
        };

        self.assemble(
            &table.name,
            SourceKind::Table,
            &table.keyspace,
            class_name,
            partition_keys,
            clustering_keys,
            fields,
            flags,
        )
    }

    /// UDT models carry no keys; only entity, test and DDL artifacts apply
    pub fn build_udt(
        &self,
        udt: &UdtSchema,
        directives: &GenerationDirectives,
    ) -> Result<EntityModel, GeneratorError> {
        let class_name = class_name_for(&udt.name, directives);

        let fields = udt
            .fields
            .iter()
            .enumerate()
            .map(|(i, f)| {
                self.field(&f.name, &f.cql_type, ColumnKind::Regular, ClusteringOrder::None, i + 1)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let flags = EntityFlags {
            is_cacheable: false,
            has_clustering_keys: false,
            generates_factory: false,
            generates_rest: false,
            generates_tests: directives.generate_tests,
            generates_ddl: directives.generate_ddl,
        };

        self.assemble(
            &udt.name,
            SourceKind::Type,
            &udt.keyspace,
            class_name,
            Vec::new(),
            Vec::new(),
            fields,
            flags,
        )
    }

    fn field(
        &self,
        column: &str,
        cql_type: &str,
        kind: ColumnKind,
        clustering_order: ClusteringOrder,
        seed: usize,
    ) -> Result<FieldModel, GeneratorError> {
        let unsupported = |source: TypeError| GeneratorError::UnsupportedType {
            column: column.to_string(),
            source,
        };

        let node = parse_cql_type(cql_type).map_err(unsupported)?;
        let (java, imports) = self
            .mapper
            .map_node(&node)
            .map_err(|reason| unsupported(TypeError { cql_type: cql_type.to_string(), reason }))?;

        Ok(FieldModel {
            column: column.to_string(),
            field_name: to_field_name(column),
            constant_name: to_constant_name(column),
            java_type: java.name,
            imports,
            cql_type: cql_type.to_string(),
            kind,
            clustering_order,
            frozen: java.frozen,
            sample: node.sample_literal(seed),
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn assemble(
        &self,
        source_name: &str,
        source_kind: SourceKind,
        keyspace: &str,
        class_name: String,
        partition_keys: Vec<FieldModel>,
        clustering_keys: Vec<FieldModel>,
        fields: Vec<FieldModel>,
        flags: EntityFlags,
    ) -> Result<EntityModel, GeneratorError> {
        let all: Vec<&FieldModel> = partition_keys
            .iter()
            .chain(clustering_keys.iter())
            .chain(fields.iter())
            .collect();

        check_unique(all.iter().map(|f| (f.field_name.as_str(), f.column.as_str())), &class_name)?;
        check_unique(
            RESERVED_CONSTANTS
                .iter()
                .map(|c| (*c, *c))
                .chain(all.iter().map(|f| (f.constant_name.as_str(), f.column.as_str()))),
            &class_name,
        )?;

        let accessors: Vec<(String, &str)> = all
            .iter()
            .flat_map(|f| [(f.getter(), f.column.as_str()), (f.setter(), f.column.as_str())])
            .collect();
        check_unique(
            RESERVED_METHODS
                .iter()
                .map(|m| (*m, *m))
                .chain(accessors.iter().map(|(name, column)| (name.as_str(), *column))),
            &class_name,
        )?;

        let mut imports = ImportSet::new();
        let mut udt_refs = BTreeSet::new();
        for f in &all {
            imports.extend(f.imports.iter().cloned());
            if let Ok(node) = parse_cql_type(&f.cql_type) {
                udt_refs.extend(node.udt_refs());
            }
        }

        Ok(EntityModel {
            source_name: source_name.to_string(),
            source_kind,
            keyspace: keyspace.to_string(),
            class_name,
            package: self.package.clone(),
            partition_keys,
            clustering_keys,
            fields,
            udt_refs,
            imports,
            flags,
        })
    }
}

/// Fail with `NameCollision` if two identifiers produce the same generated name
fn check_unique<'a>(
    names: impl Iterator<Item = (&'a str, &'a str)>,
    scope: &str,
) -> Result<(), GeneratorError> {
    let mut seen: HashMap<&str, &str> = HashMap::new();
    for (generated, identifier) in names {
        if let Some(previous) = seen.insert(generated, identifier) {
            return Err(GeneratorError::NameCollision {
                name: generated.to_string(),
                scope: scope.to_string(),
                identifiers: vec![previous.to_string(), identifier.to_string()],
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::UdtField;
    use crate::error::ErrorKind;

    fn column(name: &str, cql_type: &str, kind: ColumnKind, position: i32) -> ColumnSchema {
        ColumnSchema {
            name: name.to_string(),
            cql_type: cql_type.to_string(),
            kind,
            position,
            clustering_order: ClusteringOrder::None,
        }
    }

    fn builder() -> EntityModelBuilder {
        EntityModelBuilder::new("com.example", ["address"])
    }

    #[test]
    fn test_key_order_follows_positions() {
        let table = TableSchema::new(
            "ks",
            "readings",
            vec![
                column("bucket", "int", ColumnKind::PartitionKey, 1),
                column("ts", "timestamp", ColumnKind::Clustering, 0),
                column("sensor", "uuid", ColumnKind::PartitionKey, 0),
                column("value", "double", ColumnKind::Regular, -1),
            ],
        );

        let model = builder().build_table(&table, &GenerationDirectives::default()).unwrap();
        let keys: Vec<&str> = model.key_fields().map(|f| f.column.as_str()).collect();
        assert_eq!(keys, ["sensor", "bucket", "ts"]);
        assert!(model.flags.has_clustering_keys);
        assert_eq!(model.class_name, "Readings");
    }

    #[test]
    fn test_imports_are_deduplicated_across_columns() {
        let table = TableSchema::new(
            "ks",
            "profiles",
            vec![
                column("id", "uuid", ColumnKind::PartitionKey, 0),
                column("friends", "set<uuid>", ColumnKind::Regular, -1),
                column("addresses", "map<text, frozen<address>>", ColumnKind::Regular, -1),
                column("tags", "list<text>", ColumnKind::Regular, -1),
                column("aliases", "list<text>", ColumnKind::Regular, -1),
            ],
        );

        let model = builder().build_table(&table, &GenerationDirectives::default()).unwrap();
        let imports: Vec<&str> = model.imports.iter().map(String::as_str).collect();
        assert_eq!(
            imports,
            [
                "com.example.entity.Address",
                "java.util.List",
                "java.util.Map",
                "java.util.Set",
                "java.util.UUID",
            ]
        );
        assert_eq!(model.udt_refs, BTreeSet::from(["address".to_string()]));
        assert_eq!(model.fields[0].column, "addresses");
        assert_eq!(model.fields[0].java_type, "Map<String, Address>");
        assert_eq!(model.fields[1].java_type, "List<String>");
    }

    #[test]
    fn test_unknown_udt_fails_table() {
        let table = TableSchema::new(
            "ks",
            "shipments",
            vec![
                column("id", "int", ColumnKind::PartitionKey, 0),
                column("dest", "frozen<location>", ColumnKind::Regular, -1),
            ],
        );

        let err = builder().build_table(&table, &GenerationDirectives::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedType);
        assert!(err.to_string().contains("dest"));
    }

    #[test]
    fn test_field_name_collision() {
        let table = TableSchema::new(
            "ks",
            "dupes",
            vec![
                column("id", "int", ColumnKind::PartitionKey, 0),
                column("user_name", "text", ColumnKind::Regular, -1),
                column("userName", "text", ColumnKind::Regular, -1),
            ],
        );

        let err = builder().build_table(&table, &GenerationDirectives::default()).unwrap_err();
        match err {
            GeneratorError::NameCollision { name, scope, .. } => {
                assert_eq!(name, "userName");
                assert_eq!(scope, "Dupes");
            }
            other => panic!("expected collision, got {:?}", other),
        }
    }

    #[test]
    fn test_column_named_like_reserved_constant() {
        let table = TableSchema::new(
            "ks",
            "meta",
            vec![
                column("id", "int", ColumnKind::PartitionKey, 0),
                column("cql_table", "text", ColumnKind::Regular, -1),
            ],
        );
        let err = builder().build_table(&table, &GenerationDirectives::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NameCollision);
    }

    #[test]
    fn test_accessor_named_like_entity_method() {
        let table = TableSchema::new(
            "ks",
            "meta",
            vec![
                column("id", "int", ColumnKind::PartitionKey, 0),
                column("i_d", "int", ColumnKind::Regular, -1),
            ],
        );
        let err = builder().build_table(&table, &GenerationDirectives::default()).unwrap_err();
        match err {
            GeneratorError::NameCollision { name, identifiers, .. } => {
                assert_eq!(name, "getID");
                assert_eq!(identifiers, ["getID", "i_d"]);
            }
            other => panic!("expected collision, got {:?}", other),
        }
    }

    #[test]
    fn test_plain_id_column_is_not_an_accessor_collision() {
        let table = TableSchema::new(
            "ks",
            "meta",
            vec![
                column("id", "int", ColumnKind::PartitionKey, 0),
                column("class_name", "text", ColumnKind::Regular, -1),
            ],
        );
        let model = builder().build_table(&table, &GenerationDirectives::default()).unwrap();
        assert_eq!(model.partition_keys[0].getter(), "getId");
        assert_eq!(model.fields[0].getter(), "getClassName");
    }

    #[test]
    fn test_directives_drive_flags_and_name() {
        let table = TableSchema::new("ks", "orders", vec![column("id", "int", ColumnKind::PartitionKey, 0)]);
        let directives = GenerationDirectives {
            name_override: Some("purchase_orders".to_string()),
            cacheable: true,
            generate_rest: false,
            ..Default::default()
        };

        let model = builder().build_table(&table, &directives).unwrap();
        assert_eq!(model.class_name, "PurchaseOrders");
        assert_eq!(model.source_name, "orders");
        assert!(model.flags.is_cacheable);
        assert!(!model.flags.generates_rest);
        assert!(model.flags.generates_factory);
        assert!(!model.flags.has_clustering_keys);
    }

    #[test]
    fn test_udt_model() {
        let udt = UdtSchema {
            keyspace: "ks".to_string(),
            name: "address".to_string(),
            fields: vec![
                UdtField { name: "street".to_string(), cql_type: "text".to_string() },
                UdtField { name: "zip_code".to_string(), cql_type: "int".to_string() },
            ],
        };

        let model = builder().build_udt(&udt, &GenerationDirectives::default()).unwrap();
        assert_eq!(model.class_name, "Address");
        assert_eq!(model.source_kind, SourceKind::Type);
        assert_eq!(model.key_fields().count(), 0);
        assert_eq!(model.fields[1].field_name, "zipCode");
        assert_eq!(model.fields[1].getter(), "getZipCode");
        assert!(!model.flags.generates_factory);
        assert!(!model.flags.generates_rest);
    }
}
