//! High-level orchestration API for code generation.
//!
//! A run validates the configuration, introspects the keyspace once, builds
//! one [`EntityModel`] per table and type, checks every generated class name
//! for uniqueness, and only then renders and writes artifacts on a worker
//! pool. Per-entity failures are recorded and the run carries on; the
//! [`RunResult`] lists outcomes in catalog order (tables, then types).

use crate::catalog::{introspect, CatalogSource, KeyspaceSchema};
use crate::codegen::emitter::{ArtifactEmitter, ArtifactKind, GeneratedArtifact};
use crate::codegen::model::{EntityModel, EntityModelBuilder, GenerationDirectives, SourceKind};
use crate::codegen::project_config::GeneratorConfig;
use crate::error::{ErrorKind, GeneratorError};
use rayon::prelude::*;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

/// Lifecycle of a generator run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Introspecting,
    Generating,
    Done,
    Failed,
}

/// Overall outcome of a completed run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Done,
    Failed,
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunStatus::Done => write!(f, "Done"),
            RunStatus::Failed => write!(f, "Failed"),
        }
    }
}

/// What happened to one table or type
#[derive(Debug)]
pub struct EntityOutcome {
    /// Catalog table or type name
    pub name: String,
    pub source_kind: SourceKind,
    pub result: Result<Vec<GeneratedArtifact>, GeneratorError>,
}

/// One line of the failure manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureEntry {
    pub name: String,
    pub kind: ErrorKind,
    pub message: String,
}

impl fmt::Display for FailureEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}\t{}", self.name, self.kind, self.message)
    }
}

#[derive(Debug)]
pub struct RunResult {
    pub keyspace: String,
    /// Tables in catalog order, then types in catalog order
    pub outcomes: Vec<EntityOutcome>,
}

impl RunResult {
    /// `Failed` if any table or type failed
    pub fn status(&self) -> RunStatus {
        if self.outcomes.iter().any(|o| o.result.is_err()) {
            RunStatus::Failed
        } else {
            RunStatus::Done
        }
    }

    /// Every failed entity, in outcome order
    pub fn failures(&self) -> Vec<FailureEntry> {
        self.outcomes
            .iter()
            .filter_map(|o| match &o.result {
                Err(e) => Some(FailureEntry {
                    name: o.name.clone(),
                    kind: e.kind(),
                    message: e.to_string(),
                }),
                Ok(_) => None,
            })
            .collect()
    }

    pub fn artifacts(&self) -> impl Iterator<Item = &GeneratedArtifact> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok())
            .flatten()
    }

    pub fn outcome(&self, name: &str) -> Option<&EntityOutcome> {
        self.outcomes.iter().find(|o| o.name == name)
    }
}

/// One unit of per-entity work
struct Job {
    name: String,
    source_kind: SourceKind,
    model: Result<EntityModel, GeneratorError>,
}

/// Drives a single generation run
#[derive(Debug)]
pub struct Generator {
    config: GeneratorConfig,
    state: RunState,
}

impl Generator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self {
            config,
            state: RunState::Idle,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    fn transition(&mut self, next: RunState) {
        tracing::info!(from = ?self.state, to = ?next, "Generator state");
        self.state = next;
    }

    /// Run the generator against `source`.
    ///
    /// Configuration, introspection and worker-pool failures are fatal and
    /// returned as `Err`; everything else ends up in the [`RunResult`].
    pub fn run(&mut self, source: &dyn CatalogSource) -> Result<RunResult, GeneratorError> {
        match self.try_run(source) {
            Ok(result) => {
                let next = match result.status() {
                    RunStatus::Done => RunState::Done,
                    RunStatus::Failed => RunState::Failed,
                };
                self.transition(next);
                Ok(result)
            }
            Err(e) => {
                tracing::error!("Generation aborted: {}", e);
                self.transition(RunState::Failed);
                Err(e)
            }
        }
    }

    fn try_run(&mut self, source: &dyn CatalogSource) -> Result<RunResult, GeneratorError> {
        self.config.validate()?;

        self.transition(RunState::Introspecting);
        let schema = introspect(source, &self.config.keyspace)?;
        tracing::info!(
            "Introspected keyspace '{}': {} tables, {} types",
            schema.keyspace,
            schema.tables.len(),
            schema.types.len()
        );
        self.warn_unknown_directives(&schema);

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.workers)
            .build()
            .map_err(|e| GeneratorError::Config(format!("Failed to start worker pool: {}", e)))?;

        self.transition(RunState::Generating);
        let config = &self.config;
        let builder = EntityModelBuilder::new(
            config.package_name.clone(),
            schema.types.iter().map(|t| t.name.as_str()),
        );

        // Models first: every class name is known before anything is written
        let mut jobs: Vec<Job> = pool.install(|| {
            let tables = schema.tables.par_iter().map(|table| Job {
                name: table.name.clone(),
                source_kind: SourceKind::Table,
                model: builder.build_table(table, &config.directives_for(&table.name)),
            });
            let types = schema.types.par_iter().map(|udt| Job {
                name: udt.name.clone(),
                source_kind: SourceKind::Type,
                model: builder.build_udt(udt, &type_directives(config)),
            });
            tables.chain(types).collect()
        });

        check_class_names(&mut jobs);

        let emitter = ArtifactEmitter::new(&config.output_folder, config.runtime_package.clone())
            .dry_run(config.dry_run);
        let outcomes: Vec<EntityOutcome> = pool.install(|| {
            jobs.into_par_iter()
                .map(|job| {
                    let result = job.model.and_then(|model| emitter.emit_all(&model));
                    match &result {
                        Ok(artifacts) => tracing::debug!(
                            "Generated {} artifacts for {} '{}'",
                            artifacts.len(),
                            job.source_kind.as_str(),
                            job.name
                        ),
                        Err(e) => tracing::warn!(
                            "Failed {} '{}': {}",
                            job.source_kind.as_str(),
                            job.name,
                            e
                        ),
                    }
                    EntityOutcome {
                        name: job.name,
                        source_kind: job.source_kind,
                        result,
                    }
                })
                .collect()
        });

        let result = RunResult {
            keyspace: schema.keyspace,
            outcomes,
        };
        tracing::info!(
            "Generated {} artifacts for {} entities ({} failed){}",
            result.artifacts().count(),
            result.outcomes.len(),
            result.failures().len(),
            if config.dry_run { ", dry run" } else { "" }
        );
        Ok(result)
    }

    fn warn_unknown_directives(&self, schema: &KeyspaceSchema) {
        let known: BTreeSet<&str> = schema.tables.iter().map(|t| t.name.as_str()).collect();
        for table in self.config.tables.keys() {
            if !known.contains(table.as_str()) {
                tracing::warn!(
                    "Directives for '{}' ignored: no such table in keyspace '{}'",
                    table,
                    schema.keyspace
                );
            }
        }
    }
}

/// Run one generation pass with `config` against `source`
pub fn generate(
    config: &GeneratorConfig,
    source: &dyn CatalogSource,
) -> Result<RunResult, GeneratorError> {
    Generator::new(config.clone()).run(source)
}

/// User-defined types follow the global switches only; their class name must
/// match what column types referencing them resolve to
fn type_directives(config: &GeneratorConfig) -> GenerationDirectives {
    GenerationDirectives {
        name_override: None,
        cacheable: false,
        generate_factory: false,
        generate_rest: false,
        generate_tests: config.generate_tests,
        generate_ddl: config.generate_ddl,
    }
}

/// Fail every job whose generated Java class shares a qualified name with
/// another job's
fn check_class_names(jobs: &mut [Job]) {
    let mut owners: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for (index, job) in jobs.iter().enumerate() {
        if let Ok(model) = &job.model {
            for kind in ArtifactKind::requested(model) {
                if let Some(name) = ArtifactEmitter::qualified_name(model, kind) {
                    owners.entry(name).or_default().push(index);
                }
            }
        }
    }

    let mut collisions: HashMap<usize, GeneratorError> = HashMap::new();
    for (qualified, indices) in owners {
        if indices.len() < 2 {
            continue;
        }
        let identifiers: Vec<String> = indices.iter().map(|&i| jobs[i].name.clone()).collect();
        let (scope, name) = match qualified.rsplit_once('.') {
            Some((package, class)) => (package.to_string(), class.to_string()),
            None => (String::new(), qualified.clone()),
        };
        for &index in &indices {
            collisions.entry(index).or_insert_with(|| GeneratorError::NameCollision {
                name: name.clone(),
                scope: scope.clone(),
                identifiers: identifiers.clone(),
            });
        }
    }

    for (index, error) in collisions {
        tracing::warn!("{}", error);
        jobs[index].model = Err(error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{
        ClusteringOrder, ColumnKind, ColumnRow, KeyspaceSnapshot, SnapshotCatalog, TypeRow,
    };
    use tempfile::TempDir;

    fn row(table: &str, column: &str, cql_type: &str, kind: ColumnKind, position: i32) -> ColumnRow {
        ColumnRow {
            table_name: table.to_string(),
            column_name: column.to_string(),
            cql_type: cql_type.to_string(),
            kind,
            position,
            clustering_order: ClusteringOrder::None,
        }
    }

    fn catalog(tables: &[&str], columns: Vec<ColumnRow>, types: Vec<TypeRow>) -> SnapshotCatalog {
        SnapshotCatalog::default().with_keyspace(
            "ks",
            KeyspaceSnapshot {
                tables: tables.iter().map(|t| t.to_string()).collect(),
                columns,
                types,
            },
        )
    }

    #[test]
    fn test_state_machine_ends_done() {
        let dir = TempDir::new().unwrap();
        let config = GeneratorConfig::new("ks", "com.example", dir.path());
        let source = catalog(
            &["users"],
            vec![row("users", "id", "uuid", ColumnKind::PartitionKey, 0)],
            vec![],
        );

        let mut generator = Generator::new(config);
        assert_eq!(generator.state(), RunState::Idle);
        let result = generator.run(&source).unwrap();
        assert_eq!(generator.state(), RunState::Done);
        assert_eq!(result.status(), RunStatus::Done);
        assert!(result.failures().is_empty());
    }

    #[test]
    fn test_invalid_config_is_fatal() {
        let config = GeneratorConfig::new("ks", "Not A Package", "out");
        let source = catalog(&["users"], vec![], vec![]);

        let mut generator = Generator::new(config);
        let err = generator.run(&source).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
        assert_eq!(generator.state(), RunState::Failed);
    }

    #[test]
    fn test_missing_keyspace_is_fatal() {
        let config = GeneratorConfig::new("other", "com.example", "out");
        let source = catalog(&["users"], vec![], vec![]);

        let err = generate(&config, &source).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SchemaNotFound);
    }

    #[test]
    fn test_class_name_collision_fails_both_tables() {
        let dir = TempDir::new().unwrap();
        let config = GeneratorConfig::new("ks", "com.example", dir.path());
        let source = catalog(
            &["user_events", "userEvents", "other"],
            vec![
                row("user_events", "id", "int", ColumnKind::PartitionKey, 0),
                row("userEvents", "id", "int", ColumnKind::PartitionKey, 0),
                row("other", "id", "int", ColumnKind::PartitionKey, 0),
            ],
            vec![],
        );

        let result = generate(&config, &source).unwrap();
        assert_eq!(result.status(), RunStatus::Failed);

        let failures = result.failures();
        let names: Vec<&str> = failures.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["user_events", "userEvents"]);
        assert!(failures.iter().all(|f| f.kind == ErrorKind::NameCollision));

        assert!(result.outcome("other").unwrap().result.is_ok());
        assert!(!dir.path().join("src/main/java/com/example/entity/UserEvents.java").exists());
    }

    #[test]
    fn test_types_follow_tables_and_skip_factories() {
        let dir = TempDir::new().unwrap();
        let config = GeneratorConfig::new("ks", "com.example", dir.path());
        let source = catalog(
            &["people"],
            vec![
                row("people", "id", "uuid", ColumnKind::PartitionKey, 0),
                row("people", "home", "frozen<address>", ColumnKind::Regular, -1),
            ],
            vec![TypeRow {
                type_name: "address".to_string(),
                field_names: vec!["street".to_string()],
                field_types: vec!["text".to_string()],
            }],
        );

        let result = generate(&config, &source).unwrap();
        let order: Vec<(&str, SourceKind)> = result
            .outcomes
            .iter()
            .map(|o| (o.name.as_str(), o.source_kind))
            .collect();
        assert_eq!(order, [("people", SourceKind::Table), ("address", SourceKind::Type)]);

        let kinds: Vec<ArtifactKind> = result
            .outcome("address")
            .unwrap()
            .result
            .as_ref()
            .unwrap()
            .iter()
            .map(|a| a.kind)
            .collect();
        assert_eq!(kinds, [ArtifactKind::Entity, ArtifactKind::TestSuite, ArtifactKind::Ddl]);
    }
}
