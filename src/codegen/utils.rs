//! Naming conventions for generated code.
//!
//! Catalog identifiers are lower_snake_case; generated Java uses upper camel
//! case for classes and lower camel case for fields. Every conversion here is
//! pure and idempotent.

use convert_case::{Case, Casing};
use std::path::PathBuf;

/// Suffix appended to a generated identifier that collides with a Java keyword
pub const RESERVED_SUFFIX: &str = "_";

const JAVA_RESERVED: &[&str] = &[
    "abstract", "assert", "boolean", "break", "byte", "case", "catch", "char",
    "class", "const", "continue", "default", "do", "double", "else", "enum",
    "extends", "final", "finally", "float", "for", "goto", "if", "implements",
    "import", "instanceof", "int", "interface", "long", "native", "new",
    "package", "private", "protected", "public", "return", "short", "static",
    "strictfp", "super", "switch", "synchronized", "this", "throw", "throws",
    "transient", "try", "void", "volatile", "while", "var", "record", "yield",
    "true", "false", "null",
];

/// Simple type names generated sources use unqualified: `java.lang` types,
/// every type the templates import, and the runtime contract.
const RESERVED_TYPE_NAMES: &[&str] = &[
    "Object", "String", "Boolean", "Byte", "Short", "Integer", "Long", "Float",
    "Double", "Character", "Number", "Override", "SuppressWarnings", "Class",
    "BigDecimal", "BigInteger", "InetAddress", "ByteBuffer", "Instant",
    "LocalDate", "LocalTime", "CqlDuration", "UUID", "List", "Set", "Map",
    "HashMap", "Arrays", "Objects", "Test", "Assertions", "DeleteMapping",
    "GetMapping", "PathVariable", "PostMapping", "RequestBody",
    "RequestMapping", "RestController", "ResponseEntity", "Entity",
    "Cacheable", "StatementFactory", "Repository",
];

const CQL_RESERVED: &[&str] = &[
    "add", "allow", "alter", "and", "apply", "asc", "authorize", "batch",
    "begin", "by", "columnfamily", "create", "delete", "desc", "describe",
    "drop", "entries", "execute", "from", "full", "grant", "if", "in", "index",
    "infinity", "insert", "into", "keyspace", "limit", "modify", "nan",
    "norecursive", "not", "null", "of", "on", "or", "order", "primary",
    "rename", "replace", "revoke", "schema", "select", "set", "table", "to",
    "token", "truncate", "unlogged", "update", "use", "using", "view", "where",
    "with",
];

/// Convert a string to SCREAMING_SNAKE_CASE
pub fn to_screaming_snake_case(s: &str) -> String {
    s.to_case(Case::ScreamingSnake)
}

/// Split an identifier into words on separators and lower-to-upper
/// transitions. Upper-case runs stay together so converted output splits
/// back into the same words.
fn split_words(s: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;

    for c in s.chars() {
        if c == '_' || c == '-' || c.is_whitespace() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if c.is_uppercase() && prev_lower && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        prev_lower = c.is_lowercase() || c.is_ascii_digit();
        current.push(c);
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

/// Convert a string to PascalCase, keeping the tail of each word as written
pub fn to_pascal_case(s: &str) -> String {
    split_words(s).iter().map(|w| capitalize(w)).collect()
}

/// Convert a string to camelCase, keeping the tail of each word as written
pub fn to_camel_case(s: &str) -> String {
    let mut words = split_words(s).into_iter();
    let mut out = match words.next() {
        Some(first) => decapitalize(&first),
        None => String::new(),
    };
    for w in words {
        out.push_str(&capitalize(&w));
    }
    out
}

/// Whether `name` is a Java keyword or literal.
pub fn is_java_reserved(name: &str) -> bool {
    JAVA_RESERVED.contains(&name)
}

/// Whether a class called `name` would shadow a type generated code refers to.
pub fn is_reserved_type_name(name: &str) -> bool {
    RESERVED_TYPE_NAMES.contains(&name)
}

fn disambiguate(name: String) -> String {
    if is_java_reserved(&name) {
        format!("{}{}", name, RESERVED_SUFFIX)
    } else {
        name
    }
}

/// Class name for a catalog identifier (`user_events` -> `UserEvents`).
///
/// Idempotent: `to_class_name(&to_class_name(x)) == to_class_name(x)`.
pub fn to_class_name(identifier: &str) -> String {
    let name = to_pascal_case(identifier);
    if is_reserved_type_name(&name) {
        format!("{}{}", name, RESERVED_SUFFIX)
    } else {
        disambiguate(name)
    }
}

/// Field name for a catalog identifier (`created_at` -> `createdAt`).
///
/// Keyword collisions get [`RESERVED_SUFFIX`] (`class` -> `class_`). The case
/// conversion drops a trailing underscore, so re-applying is a no-op.
pub fn to_field_name(identifier: &str) -> String {
    disambiguate(to_camel_case(identifier))
}

/// Constant name for a catalog identifier (`created_at` -> `CREATED_AT`).
pub fn to_constant_name(identifier: &str) -> String {
    to_screaming_snake_case(identifier)
}

/// Capitalize the first character, for accessor names (`keyOne` -> `KeyOne`).
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn decapitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Relative directory for a dotted Java package.
pub fn package_path(package: &str) -> PathBuf {
    package.split('.').filter(|s| !s.is_empty()).collect()
}

/// Escape a string for use in Java string literals
pub fn escape_java_string(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
}

/// Render a catalog identifier for CQL text, quoting it when the unquoted
/// form would be case-folded or parsed as a keyword.
pub fn cql_identifier(name: &str) -> String {
    let plain = name
        .chars()
        .next()
        .map(|c| c.is_ascii_lowercase() || c == '_')
        .unwrap_or(false)
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');

    if plain && !CQL_RESERVED.contains(&name) {
        name.to_string()
    } else {
        format!("\"{}\"", name.replace('"', "\"\""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_conversions() {
        assert_eq!(to_pascal_case("hello_world"), "HelloWorld");
        assert_eq!(to_camel_case("hello_world"), "helloWorld");
        assert_eq!(to_screaming_snake_case("hello_world"), "HELLO_WORLD");
    }

    #[test]
    fn test_class_and_field_names() {
        assert_eq!(to_class_name("table_name"), "TableName");
        assert_eq!(to_field_name("key_one"), "keyOne");
        assert_eq!(to_constant_name("col_one"), "COL_ONE");
    }

    #[test]
    fn test_names_are_idempotent() {
        let identifiers = [
            "table_name", "key_one", "TableName", "keyOne", "user_events",
            "class", "default", "single", "a_b_c", "already_snake_case",
            "col_1", "address2_line", "User_ID", "_leading", "HTTPServer", "objects", "string",
        ];
        for id in identifiers {
            let class = to_class_name(id);
            assert_eq!(to_class_name(&class), class, "class name of {}", id);
            let field = to_field_name(id);
            assert_eq!(to_field_name(&field), field, "field name of {}", id);
        }
    }

    #[test]
    fn test_reserved_words_get_suffix() {
        assert_eq!(to_field_name("class"), "class_");
        assert_eq!(to_field_name("default"), "default_");
        assert_eq!(to_field_name("class_"), "class_");
        assert_eq!(to_field_name("classification"), "classification");
    }

    #[test]
    fn test_class_names_do_not_shadow_referenced_types() {
        assert_eq!(to_class_name("string"), "String_");
        assert_eq!(to_class_name("objects"), "Objects_");
        assert_eq!(to_class_name("entity"), "Entity_");
        assert_eq!(to_class_name("instant"), "Instant_");
        assert_eq!(to_class_name("Objects_"), "Objects_");
        assert_eq!(to_class_name("strings"), "Strings");
        assert_eq!(to_class_name("entity_log"), "EntityLog");
    }

    #[test]
    fn test_word_splitting() {
        assert_eq!(to_class_name("a_b_c"), "ABC");
        assert_eq!(to_field_name("a_b_c"), "aBC");
        assert_eq!(to_class_name("col_1"), "Col1");
        assert_eq!(to_field_name("TableName"), "tableName");
        assert_eq!(to_field_name("_private"), "private_");
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("keyOne"), "KeyOne");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn test_package_path() {
        assert_eq!(package_path("com.example.shop"), PathBuf::from("com/example/shop"));
    }

    #[test]
    fn test_escape_java_string() {
        assert_eq!(escape_java_string("hello\nworld"), "hello\\nworld");
        assert_eq!(escape_java_string("say \"hello\""), "say \\\"hello\\\"");
    }

    #[test]
    fn test_cql_identifier() {
        assert_eq!(cql_identifier("col_one"), "col_one");
        assert_eq!(cql_identifier("MixedCase"), "\"MixedCase\"");
        assert_eq!(cql_identifier("order"), "\"order\"");
        assert_eq!(cql_identifier("1st"), "\"1st\"");
    }
}
