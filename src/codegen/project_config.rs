//! Generator configuration schema (cqlgen.yaml)
//!
//! ```yaml
//! keyspace: shop
//! package_name: com.example.shop
//! output_folder: generated
//! contact_points: ["127.0.0.1:9042"]
//! datacenter: dc1
//! generate_rest: false
//! tables:
//!   orders:
//!     cacheable: true
//!     table_name_override: purchase_orders
//! ```
//!
//! The camelCase spellings (`packageName`, `outputFolder`, ...) are accepted
//! as aliases.

use crate::catalog::ConnectionOptions;
use crate::codegen::model::GenerationDirectives;
use crate::codegen::utils::is_java_reserved;
use crate::error::GeneratorError;
use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

pub const DEFAULT_RUNTIME_PACKAGE: &str = "io.cqlgen.runtime";

/// Environment variable overriding `contact_points` (comma separated)
pub const ENV_CONTACT_POINTS: &str = "CQLGEN_CONTACT_POINTS";
/// Environment variable overriding `datacenter`
pub const ENV_DATACENTER: &str = "CQLGEN_DATACENTER";

fn default_true() -> bool {
    true
}

fn default_output_folder() -> PathBuf {
    PathBuf::from("generated")
}

fn default_runtime_package() -> String {
    DEFAULT_RUNTIME_PACKAGE.to_string()
}

/// Top-level generator configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Catalog namespace to introspect
    pub keyspace: String,

    /// Base Java package for generated sources
    #[serde(alias = "packageName")]
    pub package_name: String,

    /// Filesystem root for generated files
    #[serde(alias = "outputFolder", default = "default_output_folder")]
    pub output_folder: PathBuf,

    /// Passed through untouched to the catalog source
    #[serde(alias = "contactPoints", default)]
    pub contact_points: Vec<String>,

    /// Passed through untouched to the catalog source
    #[serde(default)]
    pub datacenter: Option<String>,

    #[serde(alias = "generateFactory", default = "default_true")]
    pub generate_factory: bool,

    #[serde(alias = "generateTests", default = "default_true")]
    pub generate_tests: bool,

    #[serde(alias = "generateRest", default = "default_true")]
    pub generate_rest: bool,

    #[serde(alias = "generateDdl", default = "default_true")]
    pub generate_ddl: bool,

    /// Package of the runtime contract the generated code compiles against
    #[serde(alias = "runtimePackage", default = "default_runtime_package")]
    pub runtime_package: String,

    /// Worker threads for per-entity generation (0 = one per core)
    #[serde(default)]
    pub workers: usize,

    /// Render every artifact but write nothing
    #[serde(alias = "dryRun", default)]
    pub dry_run: bool,

    /// Per-table generation directives, keyed by catalog table name
    #[serde(default)]
    pub tables: IndexMap<String, TableDirectives>,
}

/// Per-table overrides of the global generation switches
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TableDirectives {
    /// Identifier used instead of the table name when deriving the class name
    #[serde(alias = "tableNameOverride", default)]
    pub table_name_override: Option<String>,

    /// Marks the entity cacheable in the runtime contract
    #[serde(default)]
    pub cacheable: bool,

    #[serde(alias = "generateFactory", default)]
    pub generate_factory: Option<bool>,

    #[serde(alias = "generateTests", default)]
    pub generate_tests: Option<bool>,

    #[serde(alias = "generateRest", default)]
    pub generate_rest: Option<bool>,

    #[serde(alias = "generateDdl", default)]
    pub generate_ddl: Option<bool>,
}

impl GeneratorConfig {
    /// Configuration with every switch at its default
    pub fn new(
        keyspace: impl Into<String>,
        package_name: impl Into<String>,
        output_folder: impl Into<PathBuf>,
    ) -> Self {
        Self {
            keyspace: keyspace.into(),
            package_name: package_name.into(),
            output_folder: output_folder.into(),
            contact_points: Vec::new(),
            datacenter: None,
            generate_factory: true,
            generate_tests: true,
            generate_rest: true,
            generate_ddl: true,
            runtime_package: default_runtime_package(),
            workers: 0,
            dry_run: false,
            tables: IndexMap::new(),
        }
    }

    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, GeneratorError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            GeneratorError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_yaml_str(&contents)
            .map_err(|e| GeneratorError::Config(format!("Failed to parse {}: {}", path.display(), e)))
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Replace connection settings with `CQLGEN_CONTACT_POINTS` / `CQLGEN_DATACENTER` when set
    pub fn apply_env_overrides(&mut self) {
        if let Ok(points) = std::env::var(ENV_CONTACT_POINTS) {
            self.contact_points = points
                .split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(String::from)
                .collect();
        }
        if let Ok(dc) = std::env::var(ENV_DATACENTER) {
            self.datacenter = Some(dc);
        }
    }

    /// Check the configuration before any catalog access
    pub fn validate(&self) -> Result<(), GeneratorError> {
        if self.keyspace.trim().is_empty() {
            return Err(GeneratorError::Config("keyspace is required".to_string()));
        }

        validate_package("package_name", &self.package_name)?;
        validate_package("runtime_package", &self.runtime_package)?;

        if self.output_folder.as_os_str().is_empty() {
            return Err(GeneratorError::Config("output_folder is required".to_string()));
        }

        for (table, directives) in &self.tables {
            if let Some(name) = &directives.table_name_override {
                if name.trim().is_empty() {
                    return Err(GeneratorError::Config(format!(
                        "tables.{}.table_name_override must not be empty",
                        table
                    )));
                }
            }
        }

        Ok(())
    }

    pub fn connection_options(&self) -> ConnectionOptions {
        ConnectionOptions {
            contact_points: self.contact_points.clone(),
            datacenter: self.datacenter.clone(),
        }
    }

    /// Package holding entity and UDT classes
    pub fn entity_package(&self) -> String {
        format!("{}.entity", self.package_name)
    }

    /// Resolve the directives for one table: global switches, then per-table overrides
    pub fn directives_for(&self, table: &str) -> GenerationDirectives {
        let overrides = self.tables.get(table);
        let pick = |global: bool, local: Option<Option<bool>>| local.flatten().unwrap_or(global);

        GenerationDirectives {
            name_override: overrides.and_then(|d| d.table_name_override.clone()),
            cacheable: overrides.map(|d| d.cacheable).unwrap_or(false),
            generate_factory: pick(self.generate_factory, overrides.map(|d| d.generate_factory)),
            generate_rest: pick(self.generate_rest, overrides.map(|d| d.generate_rest)),
            generate_tests: pick(self.generate_tests, overrides.map(|d| d.generate_tests)),
            generate_ddl: pick(self.generate_ddl, overrides.map(|d| d.generate_ddl)),
        }
    }
}

static PACKAGE_PATTERN: OnceLock<Regex> = OnceLock::new();

fn validate_package(field: &str, package: &str) -> Result<(), GeneratorError> {
    let pattern = PACKAGE_PATTERN.get_or_init(|| {
        Regex::new(r"^[a-z_][a-z0-9_]*(\.[a-z_][a-z0-9_]*)*$").expect("package pattern is valid")
    });

    if !pattern.is_match(package) {
        return Err(GeneratorError::Config(format!(
            "{} '{}' is not a lower-case dotted Java package name",
            field, package
        )));
    }
    if let Some(segment) = package.split('.').find(|s| is_java_reserved(s)) {
        return Err(GeneratorError::Config(format!(
            "{} '{}' uses the Java keyword '{}'",
            field, package, segment
        )));
    }
    Ok(())
}
