//! Entity class template.

use super::{parameter_list, write_preamble, JavaContext};
use crate::codegen::model::{EntityModel, FieldModel};
use crate::codegen::utils::escape_java_string;
use std::io::{self, Write};

/// Generate the entity (or UDT value) class for `model`.
///
/// Tables implement the runtime `Entity` contract (`getID()` returns the key
/// columns, partition keys first) and get one constructor per key prefix:
/// partition keys alone, then each additional clustering key. Equality,
/// hashing and `toString` are generated field by field.
pub fn generate_entity<W: Write>(
    output: &mut W,
    model: &EntityModel,
    ctx: &JavaContext,
) -> io::Result<()> {
    let package = model.entity_package();
    let class = &model.class_name;
    let fields: Vec<&FieldModel> = model.all_fields().collect();

    let mut imports = model.imports.clone();
    imports.insert("java.util.Objects".to_string());
    if model.is_table() {
        imports.insert(ctx.runtime("Entity"));
        imports.insert("java.util.Arrays".to_string());
        imports.insert("java.util.List".to_string());
        if model.flags.is_cacheable {
            imports.insert(ctx.runtime("Cacheable"));
        }
    }
    write_preamble(output, model, &package, &imports)?;

    // Class declaration
    writeln!(output, "/**")?;
    writeln!(
        output,
        " * {} {{@code {}.{}}}.",
        if model.is_table() { "Row of" } else { "Value of user-defined type" },
        model.keyspace,
        model.source_name
    )?;
    writeln!(output, " */")?;
    let implements = match (model.is_table(), model.flags.is_cacheable) {
        (true, true) => " implements Entity, Cacheable",
        (true, false) => " implements Entity",
        _ => "",
    };
    writeln!(output, "public class {}{} {{\n", class, implements)?;

    // Catalog constants
    writeln!(
        output,
        "    public static final String CQL_KEYSPACE = \"{}\";",
        escape_java_string(&model.keyspace)
    )?;
    writeln!(
        output,
        "    public static final String CQL_TABLE = \"{}\";\n",
        escape_java_string(&model.source_name)
    )?;
    for field in &fields {
        writeln!(
            output,
            "    public static final String {} = \"{}\";",
            field.constant_name,
            escape_java_string(&field.column)
        )?;
    }
    if !fields.is_empty() {
        writeln!(output)?;
    }

    // Fields
    for field in &fields {
        if field.frozen {
            writeln!(output, "    /** Frozen {}; replaced as a whole on update. */", field.cql_type)?;
        }
        writeln!(output, "    private {} {};", field.java_type, field.field_name)?;
    }
    if !fields.is_empty() {
        writeln!(output)?;
    }

    generate_constructors(output, model)?;

    if model.is_table() {
        writeln!(output, "    @Override")?;
        writeln!(output, "    public List<Object> getID() {{")?;
        writeln!(
            output,
            "        return Arrays.asList({});",
            model
                .key_fields()
                .map(|f| format!("this.{}", f.field_name))
                .collect::<Vec<_>>()
                .join(", ")
        )?;
        writeln!(output, "    }}\n")?;

        if model.flags.is_cacheable {
            writeln!(output, "    @Override")?;
            writeln!(output, "    public String cacheKey() {{")?;
            writeln!(
                output,
                "        return CQL_KEYSPACE + \".\" + CQL_TABLE + \":\" + getID();"
            )?;
            writeln!(output, "    }}\n")?;
        }
    }

    // Accessors
    for field in &fields {
        writeln!(output, "    public {} {}() {{", field.java_type, field.getter())?;
        writeln!(output, "        return this.{};", field.field_name)?;
        writeln!(output, "    }}\n")?;
        writeln!(
            output,
            "    public void {}({} {}) {{",
            field.setter(),
            field.java_type,
            field.field_name
        )?;
        writeln!(output, "        this.{0} = {0};", field.field_name)?;
        writeln!(output, "    }}\n")?;
    }

    generate_comparison(output, class, &fields)?;

    writeln!(output, "}}")?;
    Ok(())
}

fn generate_constructors<W: Write>(output: &mut W, model: &EntityModel) -> io::Result<()> {
    let class = &model.class_name;

    writeln!(output, "    public {}() {{", class)?;
    writeln!(output, "    }}\n")?;

    let mut signatures: Vec<Vec<&FieldModel>> = Vec::new();
    if !model.partition_keys.is_empty() {
        for prefix in 0..=model.clustering_keys.len() {
            signatures.push(
                model
                    .partition_keys
                    .iter()
                    .chain(model.clustering_keys[..prefix].iter())
                    .collect(),
            );
        }
    }
    if !model.fields.is_empty() {
        signatures.push(model.all_fields().collect());
    }

    for params in signatures {
        writeln!(
            output,
            "    public {}({}) {{",
            class,
            parameter_list(params.iter().copied())
        )?;
        for field in &params {
            writeln!(output, "        this.{0} = {0};", field.field_name)?;
        }
        writeln!(output, "    }}\n")?;
    }
    Ok(())
}

/// Explicit equals/hashCode/toString over the entity's own fields
fn generate_comparison<W: Write>(
    output: &mut W,
    class: &str,
    fields: &[&FieldModel],
) -> io::Result<()> {
    writeln!(output, "    @Override")?;
    writeln!(output, "    public boolean equals(Object o) {{")?;
    writeln!(output, "        if (this == o) {{")?;
    writeln!(output, "            return true;")?;
    writeln!(output, "        }}")?;
    writeln!(output, "        if (o == null || getClass() != o.getClass()) {{")?;
    writeln!(output, "            return false;")?;
    writeln!(output, "        }}")?;
    if fields.is_empty() {
        writeln!(output, "        return true;")?;
    } else {
        writeln!(output, "        {0} that = ({0}) o;", class)?;
        for (i, field) in fields.iter().enumerate() {
            let lead = if i == 0 { "        return " } else { "                && " };
            let tail = if i + 1 == fields.len() { ";" } else { "" };
            writeln!(
                output,
                "{}Objects.equals(this.{1}, that.{1}){2}",
                lead, field.field_name, tail
            )?;
        }
    }
    writeln!(output, "    }}\n")?;

    writeln!(output, "    @Override")?;
    writeln!(output, "    public int hashCode() {{")?;
    writeln!(
        output,
        "        return Objects.hash({});",
        fields
            .iter()
            .map(|f| format!("this.{}", f.field_name))
            .collect::<Vec<_>>()
            .join(", ")
    )?;
    writeln!(output, "    }}\n")?;

    writeln!(output, "    @Override")?;
    writeln!(output, "    public String toString() {{")?;
    writeln!(output, "        return \"{}{{\"", class)?;
    for (i, field) in fields.iter().enumerate() {
        let sep = if i == 0 { "" } else { ", " };
        writeln!(
            output,
            "                + \"{}{}=\" + this.{}",
            sep, field.field_name, field.field_name
        )?;
    }
    writeln!(output, "                + \"}}\";")?;
    writeln!(output, "    }}")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ColumnKind, ColumnSchema, ClusteringOrder, TableSchema};
    use crate::codegen::model::{EntityModelBuilder, GenerationDirectives};

    fn render(table: &TableSchema, directives: &GenerationDirectives) -> String {
        let model = EntityModelBuilder::new("com.example", ["address"])
            .build_table(table, directives)
            .unwrap();
        let ctx = JavaContext {
            runtime_package: "io.cqlgen.runtime".to_string(),
        };
        let mut buf = Vec::new();
        generate_entity(&mut buf, &model, &ctx).unwrap();
        String::from_utf8(buf).unwrap()
    }

    fn column(name: &str, cql_type: &str, kind: ColumnKind, position: i32) -> ColumnSchema {
        ColumnSchema {
            name: name.to_string(),
            cql_type: cql_type.to_string(),
            kind,
            position,
            clustering_order: ClusteringOrder::None,
        }
    }

    fn table_name() -> TableSchema {
        TableSchema::new(
            "ks",
            "table_name",
            vec![
                column("col_two", "text", ColumnKind::Regular, -1),
                column("key_two", "int", ColumnKind::Clustering, 0),
                column("col_one", "text", ColumnKind::Regular, -1),
                column("key_one", "int", ColumnKind::PartitionKey, 0),
            ],
        )
    }

    #[test]
    fn test_constructors_and_id() {
        let code = render(&table_name(), &GenerationDirectives::default());

        assert!(code.contains("package com.example.entity;"));
        assert!(code.contains("public class TableName implements Entity {"));
        assert!(code.contains("public TableName(Integer keyOne) {"));
        assert!(code.contains("public TableName(Integer keyOne, Integer keyTwo) {"));
        assert!(code.contains(
            "public TableName(Integer keyOne, Integer keyTwo, String colOne, String colTwo) {"
        ));
        assert!(code.contains("return Arrays.asList(this.keyOne, this.keyTwo);"));
        assert!(code.contains("private String colOne;"));
        assert!(code.contains("private String colTwo;"));
        assert!(code.contains("public static final String KEY_ONE = \"key_one\";"));
    }

    #[test]
    fn test_generated_comparison_lists_every_field() {
        let code = render(&table_name(), &GenerationDirectives::default());

        assert!(code.contains("TableName that = (TableName) o;"));
        assert!(code.contains("return Objects.equals(this.keyOne, that.keyOne)"));
        assert!(code.contains("&& Objects.equals(this.colTwo, that.colTwo);"));
        assert!(code.contains("return Objects.hash(this.keyOne, this.keyTwo, this.colOne, this.colTwo);"));
        assert!(!code.contains("reflect"));
    }

    #[test]
    fn test_imports_are_sorted_and_minimal() {
        let code = render(&table_name(), &GenerationDirectives::default());
        let imports: Vec<&str> = code.lines().filter(|l| l.starts_with("import ")).collect();
        assert_eq!(
            imports,
            [
                "import io.cqlgen.runtime.Entity;",
                "import java.util.Arrays;",
                "import java.util.List;",
                "import java.util.Objects;",
            ]
        );
    }

    #[test]
    fn test_cacheable_entity() {
        let directives = GenerationDirectives {
            cacheable: true,
            ..Default::default()
        };
        let code = render(&table_name(), &directives);
        assert!(code.contains("implements Entity, Cacheable {"));
        assert!(code.contains("import io.cqlgen.runtime.Cacheable;"));
        assert!(code.contains("public String cacheKey() {"));
    }

    #[test]
    fn test_frozen_udt_field_is_documented_and_same_package() {
        let table = TableSchema::new(
            "ks",
            "customers",
            vec![
                column("id", "uuid", ColumnKind::PartitionKey, 0),
                column("home", "frozen<address>", ColumnKind::Regular, -1),
            ],
        );
        let code = render(&table, &GenerationDirectives::default());
        assert!(code.contains("/** Frozen frozen<address>; replaced as a whole on update. */"));
        assert!(code.contains("private Address home;"));
        assert!(!code.contains("import com.example.entity.Address;"));
        assert!(code.contains("import java.util.UUID;"));
    }
}
