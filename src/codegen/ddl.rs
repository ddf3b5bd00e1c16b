//! CQL DDL generation: reproduces the CREATE TABLE / CREATE TYPE statement
//! an entity was introspected from.

use crate::catalog::{ClusteringOrder, ColumnKind};
use crate::codegen::model::{EntityModel, FieldModel};
use crate::codegen::utils::cql_identifier;
use std::io::{self, Write};

fn column_definition(field: &FieldModel) -> String {
    let mut def = format!("{} {}", cql_identifier(&field.column), field.cql_type.trim());
    if field.kind == ColumnKind::Static {
        def.push_str(" STATIC");
    }
    def
}

fn identifiers<'a>(fields: impl IntoIterator<Item = &'a FieldModel>) -> Vec<String> {
    fields
        .into_iter()
        .map(|f| cql_identifier(&f.column))
        .collect()
}

/// Generate the `.cql` DDL for `model`
pub fn generate_ddl<W: Write>(output: &mut W, model: &EntityModel) -> io::Result<()> {
    let name = format!(
        "{}.{}",
        cql_identifier(&model.keyspace),
        cql_identifier(&model.source_name)
    );

    writeln!(
        output,
        "-- Generated by cqlgen from {}.{}. Do not edit.",
        model.keyspace, model.source_name
    )?;

    if !model.is_table() {
        writeln!(output, "CREATE TYPE IF NOT EXISTS {} (", name)?;
        let defs: Vec<String> = model.fields.iter().map(column_definition).collect();
        writeln!(output, "    {}", defs.join(",\n    "))?;
        writeln!(output, ");")?;
        return Ok(());
    }

    writeln!(output, "CREATE TABLE IF NOT EXISTS {} (", name)?;
    for field in model.all_fields() {
        writeln!(output, "    {},", column_definition(field))?;
    }

    let partition = identifiers(&model.partition_keys);
    let clustering = identifiers(&model.clustering_keys);
    let mut primary_key = format!("({})", partition.join(", "));
    if !clustering.is_empty() {
        primary_key.push_str(", ");
        primary_key.push_str(&clustering.join(", "));
    }
    writeln!(output, "    PRIMARY KEY ({})", primary_key)?;

    if model.clustering_keys.is_empty() {
        writeln!(output, ");")?;
    } else {
        let order = model
            .clustering_keys
            .iter()
            .map(|f| {
                let direction = match f.clustering_order {
                    ClusteringOrder::Desc => "DESC",
                    ClusteringOrder::Asc | ClusteringOrder::None => "ASC",
                };
                format!("{} {}", cql_identifier(&f.column), direction)
            })
            .collect::<Vec<_>>()
            .join(", ");
        writeln!(output, ") WITH CLUSTERING ORDER BY ({});", order)?;
    }
    Ok(())
}
