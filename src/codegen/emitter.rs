//! Artifact emission: render one artifact kind for an entity model and write
//! it under the output root.

use crate::codegen::ddl::generate_ddl;
use crate::codegen::fs_utils;
use crate::codegen::java::{
    generate_controller, generate_entity, generate_factory, generate_test_suite, JavaContext,
};
use crate::codegen::model::EntityModel;
use crate::codegen::utils::package_path;
use crate::error::GeneratorError;
use std::fmt;
use std::path::{Path, PathBuf};

/// The kinds of file generated per entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ArtifactKind {
    Entity,
    StatementFactory,
    RestController,
    TestSuite,
    Ddl,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 5] = [
        ArtifactKind::Entity,
        ArtifactKind::StatementFactory,
        ArtifactKind::RestController,
        ArtifactKind::TestSuite,
        ArtifactKind::Ddl,
    ];

    /// Source root below the output folder
    pub fn subpath(&self) -> &'static str {
        match self {
            ArtifactKind::Entity
            | ArtifactKind::StatementFactory
            | ArtifactKind::RestController => "src/main/java",
            ArtifactKind::TestSuite => "src/test/java",
            ArtifactKind::Ddl => "src/main/resources/cql",
        }
    }

    /// Sub-package of the base package
    pub fn subpackage(&self) -> &'static str {
        match self {
            ArtifactKind::Entity | ArtifactKind::TestSuite | ArtifactKind::Ddl => "entity",
            ArtifactKind::StatementFactory => "factory",
            ArtifactKind::RestController => "rest",
        }
    }

    pub fn file_suffix(&self) -> &'static str {
        match self {
            ArtifactKind::Entity | ArtifactKind::Ddl => "",
            ArtifactKind::StatementFactory => "Factory",
            ArtifactKind::RestController => "Controller",
            ArtifactKind::TestSuite => "Test",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ArtifactKind::Ddl => "cql",
            _ => "java",
        }
    }

    pub fn is_java(&self) -> bool {
        self.extension() == "java"
    }

    /// Whether the model's flags ask for this artifact. Factories and
    /// controllers need a primary key to address rows by.
    pub fn requested_for(&self, model: &EntityModel) -> bool {
        let addressable = model.is_table() && !model.partition_keys.is_empty();
        match self {
            ArtifactKind::Entity => true,
            ArtifactKind::StatementFactory => model.flags.generates_factory && addressable,
            ArtifactKind::RestController => model.flags.generates_rest && addressable,
            ArtifactKind::TestSuite => model.flags.generates_tests,
            ArtifactKind::Ddl => model.flags.generates_ddl,
        }
    }

    /// Kinds requested for `model`, in [`Self::ALL`] order
    pub fn requested(model: &EntityModel) -> Vec<ArtifactKind> {
        Self::ALL
            .iter()
            .copied()
            .filter(|kind| kind.requested_for(model))
            .collect()
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ArtifactKind::Entity => "Entity",
            ArtifactKind::StatementFactory => "StatementFactory",
            ArtifactKind::RestController => "RestController",
            ArtifactKind::TestSuite => "TestSuite",
            ArtifactKind::Ddl => "Ddl",
        };
        write!(f, "{}", name)
    }
}

/// A rendered file and where it belongs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedArtifact {
    pub kind: ArtifactKind,
    pub path: PathBuf,
    pub contents: String,
}

/// Renders and writes artifacts below one output root
#[derive(Debug, Clone)]
pub struct ArtifactEmitter {
    output_root: PathBuf,
    ctx: JavaContext,
    dry_run: bool,
}

impl ArtifactEmitter {
    pub fn new(output_root: impl Into<PathBuf>, runtime_package: impl Into<String>) -> Self {
        Self {
            output_root: output_root.into(),
            ctx: JavaContext {
                runtime_package: runtime_package.into(),
            },
            dry_run: false,
        }
    }

    /// Render without touching the filesystem
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    fn package(model: &EntityModel, kind: ArtifactKind) -> String {
        format!("{}.{}", model.package, kind.subpackage())
    }

    /// `<output>/<subpath>/<package path>/<Class><suffix>.<ext>`
    pub fn artifact_path(&self, model: &EntityModel, kind: ArtifactKind) -> PathBuf {
        self.output_root
            .join(kind.subpath())
            .join(package_path(&Self::package(model, kind)))
            .join(format!(
                "{}{}.{}",
                model.class_name,
                kind.file_suffix(),
                kind.extension()
            ))
    }

    /// Fully qualified Java class name, or `None` for non-Java artifacts
    pub fn qualified_name(model: &EntityModel, kind: ArtifactKind) -> Option<String> {
        if !kind.is_java() {
            return None;
        }
        Some(format!(
            "{}.{}{}",
            Self::package(model, kind),
            model.class_name,
            kind.file_suffix()
        ))
    }

    pub fn render(
        &self,
        model: &EntityModel,
        kind: ArtifactKind,
    ) -> Result<GeneratedArtifact, GeneratorError> {
        let path = self.artifact_path(model, kind);
        let mut buffer: Vec<u8> = Vec::new();

        let written = match kind {
            ArtifactKind::Entity => generate_entity(&mut buffer, model, &self.ctx),
            ArtifactKind::StatementFactory => generate_factory(&mut buffer, model, &self.ctx),
            ArtifactKind::RestController => generate_controller(&mut buffer, model, &self.ctx),
            ArtifactKind::TestSuite => generate_test_suite(&mut buffer, model, &self.ctx),
            ArtifactKind::Ddl => generate_ddl(&mut buffer, model),
        };
        written.map_err(|e| GeneratorError::io(&path, e))?;

        let contents = String::from_utf8(buffer).map_err(|e| {
            GeneratorError::io(
                &path,
                std::io::Error::new(std::io::ErrorKind::InvalidData, e),
            )
        })?;

        Ok(GeneratedArtifact {
            kind,
            path,
            contents,
        })
    }

    pub fn write(&self, artifact: &GeneratedArtifact) -> Result<(), GeneratorError> {
        if self.dry_run {
            tracing::debug!("dry run, not writing {}", artifact.path.display());
            return Ok(());
        }
        fs_utils::write_atomic(&artifact.path, &artifact.contents)
            .map_err(|e| GeneratorError::io(&artifact.path, e))?;
        tracing::debug!("wrote {} {}", artifact.kind, artifact.path.display());
        Ok(())
    }

    /// Render then write one artifact
    pub fn emit(
        &self,
        model: &EntityModel,
        kind: ArtifactKind,
    ) -> Result<GeneratedArtifact, GeneratorError> {
        let artifact = self.render(model, kind)?;
        self.write(&artifact)?;
        Ok(artifact)
    }

    /// Render every requested artifact for `model`, then write them.
    ///
    /// Nothing is written if any render fails.
    pub fn emit_all(&self, model: &EntityModel) -> Result<Vec<GeneratedArtifact>, GeneratorError> {
        let artifacts = ArtifactKind::requested(model)
            .into_iter()
            .map(|kind| self.render(model, kind))
            .collect::<Result<Vec<_>, _>>()?;

        for artifact in &artifacts {
            self.write(artifact)?;
        }
        Ok(artifacts)
    }
}
