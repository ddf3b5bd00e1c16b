//! Error taxonomy for generator runs.
//!
//! `Config`, `SchemaNotFound` and `Catalog` are fatal and end the run.
//! The others are recorded against a single table or type while the run
//! carries on with the rest.

use crate::catalog::{CatalogError, IntrospectError};
use crate::codegen::types::TypeError;
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Config,
    SchemaNotFound,
    Catalog,
    UnsupportedType,
    NameCollision,
    Io,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Config => "ConfigError",
            ErrorKind::SchemaNotFound => "SchemaNotFoundError",
            ErrorKind::Catalog => "CatalogError",
            ErrorKind::UnsupportedType => "UnsupportedTypeError",
            ErrorKind::NameCollision => "NameCollisionError",
            ErrorKind::Io => "IOError",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug)]
pub enum GeneratorError {
    Config(String),
    SchemaNotFound {
        keyspace: String,
    },
    Catalog(CatalogError),
    UnsupportedType {
        /// Column or UDT field whose type failed to map
        column: String,
        source: TypeError,
    },
    NameCollision {
        /// Generated name shared by more than one catalog identifier
        name: String,
        /// Package (for classes) or class (for fields) the names collide in
        scope: String,
        identifiers: Vec<String>,
    },
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl GeneratorError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GeneratorError::Config(_) => ErrorKind::Config,
            GeneratorError::SchemaNotFound { .. } => ErrorKind::SchemaNotFound,
            GeneratorError::Catalog(_) => ErrorKind::Catalog,
            GeneratorError::UnsupportedType { .. } => ErrorKind::UnsupportedType,
            GeneratorError::NameCollision { .. } => ErrorKind::NameCollision,
            GeneratorError::Io { .. } => ErrorKind::Io,
        }
    }

    /// Fatal errors abort the whole run
    pub fn is_fatal(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Config | ErrorKind::SchemaNotFound | ErrorKind::Catalog
        )
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        GeneratorError::Io {
            path: path.into(),
            source,
        }
    }
}

impl fmt::Display for GeneratorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeneratorError::Config(msg) => write!(f, "Invalid configuration: {}", msg),
            GeneratorError::SchemaNotFound { keyspace } => {
                write!(f, "No tables or types found in keyspace '{}'", keyspace)
            }
            GeneratorError::Catalog(e) => write!(f, "{}", e),
            GeneratorError::UnsupportedType { column, source } => {
                write!(f, "Column '{}': {}", column, source)
            }
            GeneratorError::NameCollision {
                name,
                scope,
                identifiers,
            } => write!(
                f,
                "Name '{}' in {} is generated by more than one identifier: {}",
                name,
                scope,
                identifiers.join(", ")
            ),
            GeneratorError::Io { path, source } => {
                write!(f, "Failed to write {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for GeneratorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GeneratorError::Catalog(e) => Some(e),
            GeneratorError::UnsupportedType { source, .. } => Some(source),
            GeneratorError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<IntrospectError> for GeneratorError {
    fn from(err: IntrospectError) -> Self {
        match err {
            IntrospectError::SchemaNotFound { keyspace } => {
                GeneratorError::SchemaNotFound { keyspace }
            }
            IntrospectError::Query(e) => GeneratorError::Catalog(e),
        }
    }
}
