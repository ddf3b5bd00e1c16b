//! Code generation framework for CQL catalogs.
//!
//! Turns introspected tables and user-defined types into Java sources
//! (entities, statement factories, REST controllers, JUnit tests) and CQL DDL.

pub mod ddl;
pub mod emitter;
pub mod fs_utils;
pub mod java;
pub mod model;
pub mod orchestration;
pub mod project_config;
pub mod types;
pub mod utils;

// Re-export key types
pub use emitter::{ArtifactEmitter, ArtifactKind, GeneratedArtifact};
pub use model::{EntityModel, EntityModelBuilder, FieldModel, GenerationDirectives, SourceKind};
pub use orchestration::{
    generate, EntityOutcome, FailureEntry, Generator, RunResult, RunState, RunStatus,
};
pub use project_config::{GeneratorConfig, TableDirectives};
pub use types::{parse_cql_type, JavaType, TypeError, TypeMapper, TypeNode};

/// Generate all code for the keyspace described by a cqlgen.yaml file
///
/// # Example
///
/// ```rust,no_run
/// use cqlgen::catalog::SnapshotCatalog;
///
/// let catalog = SnapshotCatalog::from_file("catalog.yaml").unwrap();
/// let result = cqlgen::codegen::generate_from_yaml("cqlgen.yaml", &catalog).unwrap();
/// println!("{}", result.status());
/// ```
pub fn generate_from_yaml(
    yaml_path: impl AsRef<std::path::Path>,
    source: &dyn crate::catalog::CatalogSource,
) -> Result<RunResult, crate::error::GeneratorError> {
    let mut config = GeneratorConfig::from_file(yaml_path)?;
    config.apply_env_overrides();
    generate(&config, source)
}
