//! REST controller template.

use super::{argument_list, write_preamble, JavaContext};
use crate::codegen::model::{EntityModel, FieldModel};
use crate::codegen::types::ImportSet;
use std::io::{self, Write};

/// Package holding REST controllers
pub fn controller_package(model: &EntityModel) -> String {
    format!("{}.rest", model.package)
}

/// `{keyOne}/{keyTwo}` path template for a run of key fields
fn path_template<'a>(fields: impl IntoIterator<Item = &'a FieldModel>) -> String {
    fields
        .into_iter()
        .map(|f| format!("{{{}}}", f.field_name))
        .collect::<Vec<_>>()
        .join("/")
}

fn path_parameters<'a>(fields: impl IntoIterator<Item = &'a FieldModel>) -> String {
    fields
        .into_iter()
        .map(|f| format!("@PathVariable(\"{}\") {} {}", f.field_name, f.java_type, f.field_name))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Generate `<Class>Controller`, exposing a table's rows over HTTP through
/// the runtime `Repository`.
///
/// Routes live under `/<keyspace>/<table>`: GET/DELETE by full primary key,
/// POST to save, and GET by partition key when the table has clustering keys.
pub fn generate_controller<W: Write>(
    output: &mut W,
    model: &EntityModel,
    ctx: &JavaContext,
) -> io::Result<()> {
    let package = controller_package(model);
    let class = &model.class_name;
    let keys: Vec<&FieldModel> = model.key_fields().collect();

    let mut imports = model
        .key_fields()
        .flat_map(|f| f.imports.iter().cloned())
        .collect::<ImportSet>();
    imports.insert(format!("{}.{}", model.entity_package(), class));
    imports.insert(ctx.runtime("Repository"));
    for annotation in [
        "DeleteMapping",
        "GetMapping",
        "PathVariable",
        "PostMapping",
        "RequestBody",
        "RequestMapping",
        "RestController",
    ] {
        imports.insert(format!("org.springframework.web.bind.annotation.{}", annotation));
    }
    imports.insert("org.springframework.http.ResponseEntity".to_string());
    if model.flags.has_clustering_keys {
        imports.insert("java.util.List".to_string());
    }
    write_preamble(output, model, &package, &imports)?;

    writeln!(output, "@RestController")?;
    writeln!(
        output,
        "@RequestMapping(\"/{}/{}\")",
        model.keyspace, model.source_name
    )?;
    writeln!(output, "public class {}Controller {{\n", class)?;

    writeln!(output, "    private final Repository<{}> repository;\n", class)?;
    writeln!(
        output,
        "    public {0}Controller(Repository<{0}> repository) {{",
        class
    )?;
    writeln!(output, "        this.repository = repository;")?;
    writeln!(output, "    }}\n")?;

    // Lookup by full key
    writeln!(output, "    @GetMapping(\"/{}\")", path_template(keys.iter().copied()))?;
    writeln!(
        output,
        "    public ResponseEntity<{}> findById({}) {{",
        class,
        path_parameters(keys.iter().copied())
    )?;
    writeln!(
        output,
        "        return this.repository.findById({})",
        argument_list(keys.iter().copied())
    )?;
    writeln!(output, "                .map(ResponseEntity::ok)")?;
    writeln!(
        output,
        "                .orElseGet(() -> ResponseEntity.notFound().build());"
    )?;
    writeln!(output, "    }}\n")?;

    if model.flags.has_clustering_keys {
        writeln!(
            output,
            "    @GetMapping(\"/{}\")",
            path_template(&model.partition_keys)
        )?;
        writeln!(
            output,
            "    public List<{}> findByPartition({}) {{",
            class,
            path_parameters(&model.partition_keys)
        )?;
        writeln!(
            output,
            "        return this.repository.findByPartition({});",
            argument_list(&model.partition_keys)
        )?;
        writeln!(output, "    }}\n")?;
    }

    writeln!(output, "    @PostMapping")?;
    writeln!(
        output,
        "    public ResponseEntity<{0}> save(@RequestBody {0} entity) {{",
        class
    )?;
    writeln!(output, "        this.repository.save(entity);")?;
    writeln!(output, "        return ResponseEntity.ok(entity);")?;
    writeln!(output, "    }}\n")?;

    writeln!(output, "    @DeleteMapping(\"/{}\")", path_template(keys.iter().copied()))?;
    writeln!(
        output,
        "    public ResponseEntity<Void> deleteById({}) {{",
        path_parameters(keys.iter().copied())
    )?;
    writeln!(
        output,
        "        this.repository.deleteById({});",
        argument_list(keys.iter().copied())
    )?;
    writeln!(output, "        return ResponseEntity.noContent().build();")?;
    writeln!(output, "    }}")?;

    writeln!(output, "}}")?;
    Ok(())
}
