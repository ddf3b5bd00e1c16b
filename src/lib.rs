//! # cqlgen: code generation from a CQL catalog
//!
//! cqlgen introspects the tables and user-defined types of one keyspace and
//! emits a compilable Java source set per entity: an entity class, a
//! statement factory, a REST controller, JUnit test scaffolding and the CQL
//! DDL that recreates it.
//!
//! ## Example configuration
//!
//! ```yaml
//! keyspace: shop
//! package_name: com.example.shop
//! output_folder: generated
//! tables:
//!   orders:
//!     cacheable: true
//! ```
//!
//! The catalog is read through the [`catalog::CatalogSource`] query
//! interface; [`catalog::SnapshotCatalog`] serves it from a YAML or JSON dump.

pub mod catalog;
pub mod codegen;
pub mod error;

// Re-export key types
pub use catalog::{introspect, CatalogSource, KeyspaceSchema, SnapshotCatalog};
pub use codegen::{generate, Generator, GeneratorConfig, RunResult, RunStatus};
pub use error::{ErrorKind, GeneratorError};
