//! Java source templates.
//!
//! One template per artifact kind, each writing a complete compilation unit
//! for a single [`EntityModel`] with `writeln!`.

mod controller;
mod entity;
mod factory;
mod test_suite;

pub use controller::generate_controller;
pub use entity::generate_entity;
pub use factory::generate_factory;
pub use test_suite::generate_test_suite;

use crate::codegen::model::{EntityModel, FieldModel};
use crate::codegen::types::ImportSet;
use std::io::{self, Write};

/// Settings shared by every Java template
#[derive(Debug, Clone)]
pub struct JavaContext {
    /// Package of the runtime contract (`Entity`, `Cacheable`, `StatementFactory`, `Repository`)
    pub runtime_package: String,
}

impl JavaContext {
    pub fn runtime(&self, class: &str) -> String {
        format!("{}.{}", self.runtime_package, class)
    }
}

/// Write the generated-file banner, package declaration and imports.
///
/// Imports from `package` itself are dropped; `static` imports go first.
pub(crate) fn write_preamble<W: Write>(
    output: &mut W,
    model: &EntityModel,
    package: &str,
    imports: &ImportSet,
) -> io::Result<()> {
    writeln!(
        output,
        "// Generated by cqlgen from {}.{}. Do not edit.",
        model.keyspace, model.source_name
    )?;
    writeln!(output, "package {};\n", package)?;

    let (statics, plain): (Vec<&String>, Vec<&String>) = imports
        .iter()
        .filter(|i| !is_same_package(i, package))
        .partition(|i| i.starts_with("static "));

    for import in &statics {
        writeln!(output, "import {};", import)?;
    }
    for import in &plain {
        writeln!(output, "import {};", import)?;
    }
    if !statics.is_empty() || !plain.is_empty() {
        writeln!(output)?;
    }
    Ok(())
}

fn is_same_package(import: &str, package: &str) -> bool {
    match import.rsplit_once('.') {
        Some((owner, _)) => owner == package,
        None => false,
    }
}

/// `Type name, Type name` parameter list
pub(crate) fn parameter_list<'a>(fields: impl IntoIterator<Item = &'a FieldModel>) -> String {
    fields
        .into_iter()
        .map(|f| format!("{} {}", f.java_type, f.field_name))
        .collect::<Vec<_>>()
        .join(", ")
}

/// `name, name` argument list
pub(crate) fn argument_list<'a>(fields: impl IntoIterator<Item = &'a FieldModel>) -> String {
    fields
        .into_iter()
        .map(|f| f.field_name.clone())
        .collect::<Vec<_>>()
        .join(", ")
}
