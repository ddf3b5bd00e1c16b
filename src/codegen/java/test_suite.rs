//! JUnit 5 test scaffolding for generated entities.

use super::factory::factory_package;
use super::{write_preamble, JavaContext};
use crate::codegen::model::{EntityModel, FieldModel};
use crate::codegen::types::ImportSet;
use std::io::{self, Write};

const ASSERTIONS: &str = "org.junit.jupiter.api.Assertions";

/// Generate `<Class>Test` next to the entity.
///
/// Fields are populated from each type's sample literal; fields without one
/// (collections, UDT values) stay null. The key-constructor checks are only
/// emitted when every key column has a sample.
pub fn generate_test_suite<W: Write>(
    output: &mut W,
    model: &EntityModel,
    _ctx: &JavaContext,
) -> io::Result<()> {
    let package = model.entity_package();
    let class = &model.class_name;
    let sampled: Vec<&FieldModel> = model.all_fields().filter(|f| f.sample.is_some()).collect();
    let keys: Vec<&FieldModel> = model.key_fields().collect();
    let key_tests = model.is_table()
        && !model.partition_keys.is_empty()
        && keys.iter().all(|f| f.sample.is_some());
    let factory_test = model.flags.generates_factory && !model.partition_keys.is_empty();

    let mut imports: ImportSet = sampled
        .iter()
        .flat_map(|f| f.imports.iter().cloned())
        .collect();
    imports.insert("org.junit.jupiter.api.Test".to_string());
    imports.insert(format!("static {}.assertEquals", ASSERTIONS));
    imports.insert(format!("static {}.assertTrue", ASSERTIONS));
    if !sampled.is_empty() {
        imports.insert(format!("static {}.assertNotEquals", ASSERTIONS));
    }
    if key_tests {
        imports.insert("java.util.Arrays".to_string());
    }
    if factory_test {
        imports.insert(format!("{}.{}Factory", factory_package(model), class));
        imports.insert("java.util.HashMap".to_string());
        imports.insert("java.util.Map".to_string());
    }
    write_preamble(output, model, &package, &imports)?;

    writeln!(output, "class {}Test {{\n", class)?;

    writeln!(output, "    private static {} sample() {{", class)?;
    writeln!(output, "        {0} entity = new {0}();", class)?;
    for field in &sampled {
        if let Some(sample) = &field.sample {
            writeln!(output, "        entity.{}({});", field.setter(), sample)?;
        }
    }
    writeln!(output, "        return entity;")?;
    writeln!(output, "    }}\n")?;

    if key_tests {
        let samples: Vec<&str> = keys.iter().filter_map(|f| f.sample.as_deref()).collect();

        writeln!(output, "    @Test")?;
        writeln!(output, "    void keyConstructorSetsId() {{")?;
        writeln!(output, "        {0} entity = new {0}({1});", class, samples.join(", "))?;
        writeln!(
            output,
            "        assertEquals(Arrays.asList({}), entity.getID());",
            samples.join(", ")
        )?;
        writeln!(output, "    }}\n")?;

        if model.flags.has_clustering_keys {
            let partition = &samples[..model.partition_keys.len()];
            let expected: Vec<&str> = partition
                .iter()
                .copied()
                .chain(std::iter::repeat("null").take(model.clustering_keys.len()))
                .collect();

            writeln!(output, "    @Test")?;
            writeln!(output, "    void partitionConstructorLeavesClusteringUnset() {{")?;
            writeln!(output, "        {0} entity = new {0}({1});", class, partition.join(", "))?;
            writeln!(
                output,
                "        assertEquals(Arrays.asList({}), entity.getID());",
                expected.join(", ")
            )?;
            writeln!(output, "    }}\n")?;
        }
    }

    writeln!(output, "    @Test")?;
    writeln!(output, "    void equalsAndHashCode() {{")?;
    writeln!(output, "        {} first = sample();", class)?;
    writeln!(output, "        {} second = sample();", class)?;
    writeln!(output, "        assertEquals(first, second);")?;
    writeln!(output, "        assertEquals(first.hashCode(), second.hashCode());")?;
    if let Some(field) = sampled.first() {
        writeln!(output, "        second.{}(null);", field.setter())?;
        writeln!(output, "        assertNotEquals(first, second);")?;
    }
    writeln!(output, "    }}\n")?;

    writeln!(output, "    @Test")?;
    writeln!(output, "    void toStringNamesClass() {{")?;
    writeln!(
        output,
        "        assertTrue(sample().toString().startsWith(\"{}{{\"));",
        class
    )?;
    writeln!(output, "    }}")?;

    if factory_test {
        let total = model.all_fields().count();

        writeln!(output)?;
        writeln!(output, "    @Test")?;
        writeln!(output, "    void factoryRoundTrip() {{")?;
        writeln!(output, "        {0}Factory factory = new {0}Factory();", class)?;
        writeln!(output, "        {} entity = sample();", class)?;
        writeln!(
            output,
            "        assertEquals({}, factory.insertValues(entity).length);",
            total
        )?;
        writeln!(output, "        Map<String, Object> row = new HashMap<>();")?;
        for field in model.all_fields() {
            writeln!(
                output,
                "        row.put({}.{}, entity.{}());",
                class,
                field.constant_name,
                field.getter()
            )?;
        }
        writeln!(output, "        assertEquals(entity, factory.fromValues(row));")?;
        writeln!(output, "    }}")?;
    }

    writeln!(output, "}}")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ClusteringOrder, ColumnKind, ColumnSchema, TableSchema, UdtField, UdtSchema};
    use crate::codegen::model::{EntityModelBuilder, GenerationDirectives};

    fn column(name: &str, cql_type: &str, kind: ColumnKind, position: i32) -> ColumnSchema {
        ColumnSchema {
            name: name.to_string(),
            cql_type: cql_type.to_string(),
            kind,
            position,
            clustering_order: ClusteringOrder::None,
        }
    }

    fn ctx() -> JavaContext {
        JavaContext {
            runtime_package: "io.cqlgen.runtime".to_string(),
        }
    }

    fn render(model: &EntityModel) -> String {
        let mut buf = Vec::new();
        generate_test_suite(&mut buf, model, &ctx()).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_table_suite() {
        let table = TableSchema::new(
            "ks",
            "table_name",
            vec![
                column("key_one", "int", ColumnKind::PartitionKey, 0),
                column("key_two", "int", ColumnKind::Clustering, 0),
                column("col_one", "text", ColumnKind::Regular, -1),
                column("col_two", "list<text>", ColumnKind::Regular, -1),
            ],
        );
        let model = EntityModelBuilder::new("com.example", Vec::<String>::new())
            .build_table(&table, &GenerationDirectives::default())
            .unwrap();
        let code = render(&model);

        assert!(code.contains("package com.example.entity;"));
        assert!(code.contains("import static org.junit.jupiter.api.Assertions.assertEquals;"));
        assert!(code.contains("import com.example.factory.TableNameFactory;"));
        assert!(code.contains("class TableNameTest {"));
        assert!(code.contains("entity.setKeyOne(1);"));
        assert!(code.contains("entity.setKeyTwo(2);"));
        assert!(code.contains("entity.setColOne(\"value3\");"));
        assert!(!code.contains("entity.setColTwo("));
        assert!(code.contains("TableName entity = new TableName(1, 2);"));
        assert!(code.contains("assertEquals(Arrays.asList(1, 2), entity.getID());"));
        assert!(code.contains("TableName entity = new TableName(1);"));
        assert!(code.contains("assertEquals(Arrays.asList(1, null), entity.getID());"));
        assert!(code.contains("second.setKeyOne(null);"));
        assert!(code.contains("assertEquals(4, factory.insertValues(entity).length);"));
        assert!(code.contains("row.put(TableName.COL_TWO, entity.getColTwo());"));
        assert!(!code.contains("import java.util.List;"));
    }

    #[test]
    fn test_udt_suite_has_no_key_or_factory_checks() {
        let udt = UdtSchema {
            keyspace: "ks".to_string(),
            name: "address".to_string(),
            fields: vec![UdtField {
                name: "zip".to_string(),
                cql_type: "uuid".to_string(),
            }],
        };
        let model = EntityModelBuilder::new("com.example", ["address"])
            .build_udt(&udt, &GenerationDirectives::default())
            .unwrap();
        let code = render(&model);

        assert!(code.contains("class AddressTest {"));
        assert!(code.contains("import java.util.UUID;"));
        assert!(!code.contains("getID"));
        assert!(!code.contains("Factory"));
        assert!(code.contains("assertTrue(sample().toString().startsWith(\"Address{\"));"));
    }
}
