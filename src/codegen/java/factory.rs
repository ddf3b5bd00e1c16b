//! Statement factory template: CQL text plus value binding for one table.

use super::{write_preamble, JavaContext};
use crate::codegen::model::{EntityModel, FieldModel};
use crate::codegen::types::ScalarKind;
use crate::codegen::utils::{cql_identifier, escape_java_string};
use std::io::{self, Write};

/// Package holding statement factories
pub fn factory_package(model: &EntityModel) -> String {
    format!("{}.factory", model.package)
}

/// Counter tables only accept increments, so their "insert" is an UPDATE
pub(crate) fn is_counter_table(model: &EntityModel) -> bool {
    !model.fields.is_empty()
        && model
            .fields
            .iter()
            .all(|f| ScalarKind::from_cql(f.cql_type.trim()) == Some(ScalarKind::Counter))
}

fn qualified_table(model: &EntityModel) -> String {
    format!(
        "{}.{}",
        cql_identifier(&model.keyspace),
        cql_identifier(&model.source_name)
    )
}

fn where_clause<'a>(fields: impl IntoIterator<Item = &'a FieldModel>) -> String {
    fields
        .into_iter()
        .map(|f| format!("{} = ?", cql_identifier(&f.column)))
        .collect::<Vec<_>>()
        .join(" AND ")
}

fn column_list<'a>(fields: impl IntoIterator<Item = &'a FieldModel>) -> String {
    fields
        .into_iter()
        .map(|f| cql_identifier(&f.column))
        .collect::<Vec<_>>()
        .join(", ")
}

/// CQL text of the write statement, and the order its markers bind in
pub(crate) fn insert_statement(model: &EntityModel) -> (String, Vec<&FieldModel>) {
    let table = qualified_table(model);
    if is_counter_table(model) {
        let assignments = model
            .fields
            .iter()
            .map(|f| {
                let column = cql_identifier(&f.column);
                format!("{0} = {0} + ?", column)
            })
            .collect::<Vec<_>>()
            .join(", ");
        let text = format!(
            "UPDATE {} SET {} WHERE {}",
            table,
            assignments,
            where_clause(model.key_fields())
        );
        let order = model.fields.iter().chain(model.key_fields()).collect();
        (text, order)
    } else {
        let fields: Vec<&FieldModel> = model.all_fields().collect();
        let markers = vec!["?"; fields.len()].join(", ");
        let text = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table,
            column_list(fields.iter().copied()),
            markers
        );
        (text, fields)
    }
}

/// Generate `<Class>Factory`, the runtime `StatementFactory` for a table.
pub fn generate_factory<W: Write>(
    output: &mut W,
    model: &EntityModel,
    ctx: &JavaContext,
) -> io::Result<()> {
    let package = factory_package(model);
    let class = &model.class_name;
    let table = qualified_table(model);

    let mut imports = model.imports.clone();
    imports.insert(format!("{}.{}", model.entity_package(), class));
    imports.insert(ctx.runtime("StatementFactory"));
    imports.insert("java.util.Map".to_string());
    write_preamble(output, model, &package, &imports)?;

    writeln!(output, "/**")?;
    writeln!(
        output,
        " * Statements and value binding for {{@code {}.{}}}.",
        model.keyspace, model.source_name
    )?;
    writeln!(output, " */")?;
    writeln!(
        output,
        "public class {0}Factory implements StatementFactory<{0}> {{\n",
        class
    )?;

    let (insert, insert_order) = insert_statement(model);
    let selected = column_list(model.all_fields());
    let statements = [
        ("INSERT", insert),
        (
            "SELECT_BY_ID",
            format!(
                "SELECT {} FROM {} WHERE {}",
                selected,
                table,
                where_clause(model.key_fields())
            ),
        ),
        (
            "SELECT_BY_PARTITION",
            format!(
                "SELECT {} FROM {} WHERE {}",
                selected,
                table,
                where_clause(&model.partition_keys)
            ),
        ),
        (
            "DELETE_BY_ID",
            format!("DELETE FROM {} WHERE {}", table, where_clause(model.key_fields())),
        ),
    ];
    for (name, text) in &statements {
        writeln!(
            output,
            "    public static final String {} =\n            \"{}\";",
            name,
            escape_java_string(text)
        )?;
    }
    writeln!(output)?;

    for (method, constant) in [
        ("insertQuery", "INSERT"),
        ("selectByIdQuery", "SELECT_BY_ID"),
        ("selectByPartitionQuery", "SELECT_BY_PARTITION"),
        ("deleteByIdQuery", "DELETE_BY_ID"),
    ] {
        writeln!(output, "    @Override")?;
        writeln!(output, "    public String {}() {{", method)?;
        writeln!(output, "        return {};", constant)?;
        writeln!(output, "    }}\n")?;
    }

    let partition: Vec<&FieldModel> = model.partition_keys.iter().collect();
    let keys: Vec<&FieldModel> = model.key_fields().collect();
    for (method, fields) in [
        ("insertValues", &insert_order),
        ("idValues", &keys),
        ("partitionValues", &partition),
    ] {
        writeln!(output, "    @Override")?;
        writeln!(output, "    public Object[] {}({} entity) {{", method, class)?;
        writeln!(output, "        return new Object[] {{")?;
        for field in fields.iter() {
            writeln!(output, "            entity.{}(),", field.getter())?;
        }
        writeln!(output, "        }};")?;
        writeln!(output, "    }}\n")?;
    }

    writeln!(output, "    @Override")?;
    writeln!(output, "    @SuppressWarnings(\"unchecked\")")?;
    writeln!(
        output,
        "    public {} fromValues(Map<String, Object> row) {{",
        class
    )?;
    writeln!(output, "        {0} entity = new {0}();", class)?;
    for field in model.all_fields() {
        writeln!(
            output,
            "        entity.{}(({}) row.get({}.{}));",
            field.setter(),
            field.java_type,
            class,
            field.constant_name
        )?;
    }
    writeln!(output, "        return entity;")?;
    writeln!(output, "    }}")?;

    if model.flags.is_cacheable {
        writeln!(output)?;
        writeln!(output, "    public String cacheKey({} entity) {{", class)?;
        writeln!(output, "        return entity.cacheKey();")?;
        writeln!(output, "    }}")?;
    }

    writeln!(output, "}}")?;
    Ok(())
}
