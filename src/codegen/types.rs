//! CQL type parsing and Java type mapping.
//!
//! Catalog type strings (`text`, `frozen<list<int>>`, `map<text, frozen<address>>`)
//! are parsed into a [`TypeNode`] tree by recursive descent, then rendered to a
//! Java type name plus the set of imports that name needs.

use crate::codegen::utils::to_class_name;
use std::collections::{BTreeSet, HashMap};
use std::fmt;

/// Fully qualified imports needed by a generated type, sorted and deduplicated
pub type ImportSet = BTreeSet<String>;

/// Error raised for type strings outside the supported grammar, or for
/// references to user-defined types the keyspace does not declare
#[derive(Debug, Clone, PartialEq)]
pub struct TypeError {
    pub cql_type: String,
    pub reason: String,
}

impl TypeError {
    fn new(cql_type: &str, reason: impl Into<String>) -> Self {
        Self {
            cql_type: cql_type.to_string(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for TypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unsupported type '{}': {}", self.cql_type, self.reason)
    }
}

impl std::error::Error for TypeError {}

/// Built-in CQL scalar types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Ascii,
    Text,
    Varchar,
    Int,
    Bigint,
    Counter,
    Smallint,
    Tinyint,
    Varint,
    Decimal,
    Double,
    Float,
    Boolean,
    Timestamp,
    Date,
    Time,
    Uuid,
    Timeuuid,
    Inet,
    Blob,
    Duration,
}

impl ScalarKind {
    pub const ALL: [ScalarKind; 21] = [
        ScalarKind::Ascii,
        ScalarKind::Text,
        ScalarKind::Varchar,
        ScalarKind::Int,
        ScalarKind::Bigint,
        ScalarKind::Counter,
        ScalarKind::Smallint,
        ScalarKind::Tinyint,
        ScalarKind::Varint,
        ScalarKind::Decimal,
        ScalarKind::Double,
        ScalarKind::Float,
        ScalarKind::Boolean,
        ScalarKind::Timestamp,
        ScalarKind::Date,
        ScalarKind::Time,
        ScalarKind::Uuid,
        ScalarKind::Timeuuid,
        ScalarKind::Inet,
        ScalarKind::Blob,
        ScalarKind::Duration,
    ];

    /// Look up a scalar by its CQL name (case-insensitive)
    pub fn from_cql(name: &str) -> Option<Self> {
        let lower = name.to_ascii_lowercase();
        Self::ALL.iter().copied().find(|k| k.cql_name() == lower)
    }

    pub fn cql_name(&self) -> &'static str {
        match self {
            ScalarKind::Ascii => "ascii",
            ScalarKind::Text => "text",
            ScalarKind::Varchar => "varchar",
            ScalarKind::Int => "int",
            ScalarKind::Bigint => "bigint",
            ScalarKind::Counter => "counter",
            ScalarKind::Smallint => "smallint",
            ScalarKind::Tinyint => "tinyint",
            ScalarKind::Varint => "varint",
            ScalarKind::Decimal => "decimal",
            ScalarKind::Double => "double",
            ScalarKind::Float => "float",
            ScalarKind::Boolean => "boolean",
            ScalarKind::Timestamp => "timestamp",
            ScalarKind::Date => "date",
            ScalarKind::Time => "time",
            ScalarKind::Uuid => "uuid",
            ScalarKind::Timeuuid => "timeuuid",
            ScalarKind::Inet => "inet",
            ScalarKind::Blob => "blob",
            ScalarKind::Duration => "duration",
        }
    }

    /// Simple Java type name (boxed, so it can be null and used as a generic argument)
    pub fn java_type(&self) -> &'static str {
        match self {
            ScalarKind::Ascii | ScalarKind::Text | ScalarKind::Varchar => "String",
            ScalarKind::Int => "Integer",
            ScalarKind::Bigint | ScalarKind::Counter => "Long",
            ScalarKind::Smallint => "Short",
            ScalarKind::Tinyint => "Byte",
            ScalarKind::Varint => "BigInteger",
            ScalarKind::Decimal => "BigDecimal",
            ScalarKind::Double => "Double",
            ScalarKind::Float => "Float",
            ScalarKind::Boolean => "Boolean",
            ScalarKind::Timestamp => "Instant",
            ScalarKind::Date => "LocalDate",
            ScalarKind::Time => "LocalTime",
            ScalarKind::Uuid | ScalarKind::Timeuuid => "UUID",
            ScalarKind::Inet => "InetAddress",
            ScalarKind::Blob => "ByteBuffer",
            ScalarKind::Duration => "CqlDuration",
        }
    }

    /// Import required by [`Self::java_type`], if it is not in `java.lang`
    pub fn import(&self) -> Option<&'static str> {
        match self {
            ScalarKind::Varint => Some("java.math.BigInteger"),
            ScalarKind::Decimal => Some("java.math.BigDecimal"),
            ScalarKind::Timestamp => Some("java.time.Instant"),
            ScalarKind::Date => Some("java.time.LocalDate"),
            ScalarKind::Time => Some("java.time.LocalTime"),
            ScalarKind::Uuid | ScalarKind::Timeuuid => Some("java.util.UUID"),
            ScalarKind::Inet => Some("java.net.InetAddress"),
            ScalarKind::Blob => Some("java.nio.ByteBuffer"),
            ScalarKind::Duration => Some("com.datastax.oss.driver.api.core.data.CqlDuration"),
            _ => None,
        }
    }

    /// Deterministic Java expression of this type, distinct per `seed`.
    /// Only uses types already covered by [`Self::import`].
    pub fn sample_literal(&self, seed: usize) -> String {
        match self {
            ScalarKind::Ascii | ScalarKind::Text | ScalarKind::Varchar => {
                format!("\"value{}\"", seed)
            }
            ScalarKind::Int => format!("{}", seed),
            ScalarKind::Bigint | ScalarKind::Counter => format!("{}L", seed),
            ScalarKind::Smallint => format!("(short) {}", seed),
            ScalarKind::Tinyint => format!("(byte) {}", seed),
            ScalarKind::Varint => format!("BigInteger.valueOf({})", seed),
            ScalarKind::Decimal => format!("BigDecimal.valueOf({})", seed),
            ScalarKind::Double => format!("{}.5d", seed),
            ScalarKind::Float => format!("{}.5f", seed),
            ScalarKind::Boolean => (seed % 2 == 1).to_string(),
            ScalarKind::Timestamp => format!("Instant.ofEpochSecond({})", seed),
            ScalarKind::Date => format!("LocalDate.ofEpochDay({})", seed),
            ScalarKind::Time => format!("LocalTime.ofSecondOfDay({})", seed),
            ScalarKind::Uuid | ScalarKind::Timeuuid => {
                format!("UUID.fromString(\"00000000-0000-0000-0000-{:012}\")", seed)
            }
            ScalarKind::Inet => "InetAddress.getLoopbackAddress()".to_string(),
            ScalarKind::Blob => format!("ByteBuffer.wrap(new byte[] {{ (byte) {} }})", seed),
            ScalarKind::Duration => format!("CqlDuration.from(\"{}h\")", seed),
        }
    }
}

/// CQL collection containers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionKind {
    List,
    Set,
    Map,
}

impl CollectionKind {
    fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "list" => Some(CollectionKind::List),
            "set" => Some(CollectionKind::Set),
            "map" => Some(CollectionKind::Map),
            _ => None,
        }
    }

    pub fn cql_name(&self) -> &'static str {
        match self {
            CollectionKind::List => "list",
            CollectionKind::Set => "set",
            CollectionKind::Map => "map",
        }
    }

    /// Number of type arguments the container takes
    pub fn arity(&self) -> usize {
        match self {
            CollectionKind::Map => 2,
            _ => 1,
        }
    }

    pub fn java_type(&self) -> &'static str {
        match self {
            CollectionKind::List => "List",
            CollectionKind::Set => "Set",
            CollectionKind::Map => "Map",
        }
    }

    pub fn import(&self) -> &'static str {
        match self {
            CollectionKind::List => "java.util.List",
            CollectionKind::Set => "java.util.Set",
            CollectionKind::Map => "java.util.Map",
        }
    }
}

/// Parsed CQL type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeNode {
    Scalar(ScalarKind),
    Collection { kind: CollectionKind, args: Vec<TypeNode> },
    Frozen(Box<TypeNode>),
    UdtRef(String),
}

impl TypeNode {
    /// Whether the outermost type is wrapped in `frozen<..>`
    pub fn is_frozen(&self) -> bool {
        matches!(self, TypeNode::Frozen(_))
    }

    /// Nesting depth; a scalar has depth 1
    pub fn depth(&self) -> usize {
        match self {
            TypeNode::Scalar(_) | TypeNode::UdtRef(_) => 1,
            TypeNode::Frozen(inner) => inner.depth(),
            TypeNode::Collection { args, .. } => {
                1 + args.iter().map(TypeNode::depth).max().unwrap_or(0)
            }
        }
    }

    /// Names of every user-defined type referenced anywhere in the tree
    pub fn udt_refs(&self) -> BTreeSet<String> {
        let mut refs = BTreeSet::new();
        self.collect_udt_refs(&mut refs);
        refs
    }

    fn collect_udt_refs(&self, refs: &mut BTreeSet<String>) {
        match self {
            TypeNode::Scalar(_) => {}
            TypeNode::UdtRef(name) => {
                refs.insert(name.clone());
            }
            TypeNode::Frozen(inner) => inner.collect_udt_refs(refs),
            TypeNode::Collection { args, .. } => {
                for arg in args {
                    arg.collect_udt_refs(refs);
                }
            }
        }
    }

    /// Sample Java literal for scalar types (through `frozen`), used by test scaffolding
    pub fn sample_literal(&self, seed: usize) -> Option<String> {
        match self {
            TypeNode::Scalar(kind) => Some(kind.sample_literal(seed)),
            TypeNode::Frozen(inner) => inner.sample_literal(seed),
            _ => None,
        }
    }
}

impl fmt::Display for TypeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeNode::Scalar(kind) => write!(f, "{}", kind.cql_name()),
            TypeNode::UdtRef(name) => write!(f, "{}", name),
            TypeNode::Frozen(inner) => write!(f, "frozen<{}>", inner),
            TypeNode::Collection { kind, args } => {
                write!(f, "{}<", kind.cql_name())?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ">")
            }
        }
    }
}

/// Parse a catalog type string into a [`TypeNode`].
pub fn parse_cql_type(cql_type: &str) -> Result<TypeNode, TypeError> {
    parse_node(cql_type).map_err(|reason| TypeError::new(cql_type, reason))
}

fn parse_node(input: &str) -> Result<TypeNode, String> {
    let s = input.trim();
    if s.is_empty() {
        return Err("empty type".to_string());
    }

    if let Some((keyword, inner)) = split_parameterized(s)? {
        let keyword = keyword.to_ascii_lowercase();
        let args = split_top_level(inner)?;

        if keyword == "frozen" {
            if args.len() != 1 {
                return Err(format!("frozen takes 1 type argument, found {}", args.len()));
            }
            return Ok(TypeNode::Frozen(Box::new(parse_node(args[0])?)));
        }

        return match CollectionKind::from_keyword(&keyword) {
            Some(kind) => {
                if args.len() != kind.arity() {
                    return Err(format!(
                        "{} takes {} type argument(s), found {}",
                        kind.cql_name(),
                        kind.arity(),
                        args.len()
                    ));
                }
                let args = args
                    .into_iter()
                    .map(parse_node)
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(TypeNode::Collection { kind, args })
            }
            None if keyword == "tuple" || keyword == "vector" => {
                Err(format!("{} types are not supported", keyword))
            }
            None => Err(format!("unknown parameterized type '{}'", keyword)),
        };
    }

    if s.contains(['<', '>', ',']) {
        return Err("unbalanced angle brackets".to_string());
    }
    if s.starts_with('\'') {
        return Err("custom class types are not supported".to_string());
    }
    if let Some(kind) = ScalarKind::from_cql(s) {
        return Ok(TypeNode::Scalar(kind));
    }

    parse_identifier(s).map(TypeNode::UdtRef)
}

/// Split `keyword<inner>` into its parts; `None` if `s` has no type arguments.
fn split_parameterized(s: &str) -> Result<Option<(&str, &str)>, String> {
    let Some(open) = s.find('<') else {
        return Ok(None);
    };
    if !s.ends_with('>') {
        return Err("unbalanced angle brackets".to_string());
    }
    let keyword = s[..open].trim();
    if keyword.is_empty() {
        return Err("missing type name before '<'".to_string());
    }
    Ok(Some((keyword, &s[open + 1..s.len() - 1])))
}

/// Split type arguments on commas that are not nested inside angle brackets.
fn split_top_level(inner: &str) -> Result<Vec<&str>, String> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (i, c) in inner.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| "unbalanced angle brackets".to_string())?;
            }
            ',' if depth == 0 => {
                parts.push(inner[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err("unbalanced angle brackets".to_string());
    }
    parts.push(inner[start..].trim());

    if parts.iter().any(|p| p.is_empty()) {
        return Err("empty type argument".to_string());
    }
    Ok(parts)
}

fn parse_identifier(s: &str) -> Result<String, String> {
    if let Some(quoted) = s.strip_prefix('"') {
        let body = quoted
            .strip_suffix('"')
            .ok_or_else(|| format!("unterminated quoted identifier {}", s))?;
        return Ok(body.replace("\"\"", "\""));
    }
    // `keyspace.type` references are resolved by their type name.
    let name = s.rsplit('.').next().unwrap_or(s);
    if name.is_empty() || !name.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return Err(format!("invalid type name '{}'", s));
    }
    Ok(name.to_string())
}

/// Java type produced for a column or UDT field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JavaType {
    /// Rendered type, e.g. `Map<String, List<Integer>>`
    pub name: String,
    /// Outer value was `frozen<..>`; only affects generated documentation
    pub frozen: bool,
}

/// Maps CQL type strings to Java types for one keyspace.
///
/// User-defined type references resolve against the types fetched for the
/// keyspace; each resolves to its generated class in `entity_package`.
#[derive(Debug, Clone)]
pub struct TypeMapper {
    /// Catalog type name -> generated class name
    udts: HashMap<String, String>,
    entity_package: String,
}

impl TypeMapper {
    pub fn new<I, S>(udt_names: I, entity_package: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let udts = udt_names
            .into_iter()
            .map(|name| {
                let name = name.as_ref();
                (name.to_string(), to_class_name(name))
            })
            .collect();
        Self {
            udts,
            entity_package: entity_package.into(),
        }
    }

    /// Map a CQL type string to its Java type and required imports
    pub fn map(&self, cql_type: &str) -> Result<(JavaType, ImportSet), TypeError> {
        let node = parse_cql_type(cql_type)?;
        self.map_node(&node)
            .map_err(|reason| TypeError::new(cql_type, reason))
    }

    /// Map an already parsed type
    pub fn map_node(&self, node: &TypeNode) -> Result<(JavaType, ImportSet), String> {
        let mut imports = ImportSet::new();
        let name = self.render(node, &mut imports)?;
        Ok((
            JavaType {
                name,
                frozen: node.is_frozen(),
            },
            imports,
        ))
    }

    /// Resolve a UDT reference to its generated class name
    pub fn resolve_udt(&self, name: &str) -> Option<&str> {
        self.udts
            .get(name)
            .or_else(|| self.udts.get(&name.to_lowercase()))
            .map(String::as_str)
    }

    fn render(&self, node: &TypeNode, imports: &mut ImportSet) -> Result<String, String> {
        match node {
            TypeNode::Scalar(kind) => {
                if let Some(import) = kind.import() {
                    imports.insert(import.to_string());
                }
                Ok(kind.java_type().to_string())
            }
            TypeNode::Frozen(inner) => self.render(inner, imports),
            TypeNode::Collection { kind, args } => {
                imports.insert(kind.import().to_string());
                let rendered = args
                    .iter()
                    .map(|arg| self.render(arg, imports))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(format!("{}<{}>", kind.java_type(), rendered.join(", ")))
            }
            TypeNode::UdtRef(name) => {
                let class = self
                    .resolve_udt(name)
                    .ok_or_else(|| format!("user-defined type '{}' is not declared in this keyspace", name))?;
                imports.insert(format!("{}.{}", self.entity_package, class));
                Ok(class.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapper() -> TypeMapper {
        TypeMapper::new(["address", "phone_number"], "com.example.entity")
    }

    fn imports(items: &[&str]) -> ImportSet {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_every_scalar_maps() {
        let mapper = mapper();
        for kind in ScalarKind::ALL {
            let (java, first) = mapper.map(kind.cql_name()).unwrap();
            assert!(!java.name.is_empty(), "{:?}", kind);
            assert!(first.len() <= 1);
            let (again, second) = mapper.map(kind.cql_name()).unwrap();
            assert_eq!(java, again);
            assert_eq!(first, second);
        }
    }

    #[test]
    fn test_scalar_lookup_is_case_insensitive() {
        assert_eq!(parse_cql_type("TEXT").unwrap(), TypeNode::Scalar(ScalarKind::Text));
        assert_eq!(parse_cql_type(" int ").unwrap(), TypeNode::Scalar(ScalarKind::Int));
    }

    #[test]
    fn test_map_splits_on_top_level_comma_only() {
        let node = parse_cql_type("map<text, frozen<list<int>>>").unwrap();
        match &node {
            TypeNode::Collection { kind, args } => {
                assert_eq!(*kind, CollectionKind::Map);
                assert_eq!(args.len(), 2);
                assert_eq!(args[0], TypeNode::Scalar(ScalarKind::Text));
                assert_eq!(args[1].to_string(), "frozen<list<int>>");
            }
            other => panic!("expected map, got {:?}", other),
        }

        let (java, found) = mapper().map("map<text, frozen<list<int>>>").unwrap();
        assert_eq!(java.name, "Map<String, List<Integer>>");
        assert_eq!(found, imports(&["java.util.List", "java.util.Map"]));
    }

    #[test]
    fn test_nested_commas_inside_brackets() {
        let (java, found) = mapper()
            .map("map<frozen<map<text, int>>, frozen<list<frozen<address>>>>")
            .unwrap();
        assert_eq!(java.name, "Map<Map<String, Integer>, List<Address>>");
        assert_eq!(
            found,
            imports(&["com.example.entity.Address", "java.util.List", "java.util.Map"])
        );
    }

    #[test]
    fn test_depth_three_udt_value() {
        let node = parse_cql_type("map<uuid, frozen<list<frozen<phone_number>>>>").unwrap();
        assert_eq!(node.depth(), 3);
        assert_eq!(node.udt_refs(), BTreeSet::from(["phone_number".to_string()]));

        let (java, found) = mapper().map_node(&node).unwrap();
        assert_eq!(java.name, "Map<UUID, List<PhoneNumber>>");
        assert!(found.contains("java.util.UUID"));
        assert!(found.contains("com.example.entity.PhoneNumber"));
    }

    #[test]
    fn test_deep_nesting_has_no_limit() {
        let (java, _) = mapper()
            .map("list<frozen<map<text, frozen<set<frozen<list<frozen<map<int, address>>>>>>>>>")
            .unwrap();
        assert_eq!(java.name, "List<Map<String, Set<List<Map<Integer, Address>>>>>");
    }

    #[test]
    fn test_frozen_is_remembered_but_type_unchanged() {
        let (plain, _) = mapper().map("list<int>").unwrap();
        let (frozen, _) = mapper().map("frozen<list<int>>").unwrap();
        assert_eq!(plain.name, frozen.name);
        assert!(!plain.frozen);
        assert!(frozen.frozen);
    }

    #[test]
    fn test_unknown_udt_is_unsupported() {
        let err = mapper().map("frozen<location>").unwrap_err();
        assert_eq!(err.cql_type, "frozen<location>");
        assert!(err.reason.contains("location"));
    }

    #[test]
    fn test_quoted_and_qualified_udt_refs() {
        let mapper = TypeMapper::new(["Address"], "com.example.entity");
        assert_eq!(mapper.map("frozen<\"Address\">").unwrap().0.name, "Address");
        assert_eq!(mapper.map("shop.Address").unwrap().0.name, "Address");
    }

    #[test]
    fn test_malformed_types_are_rejected() {
        for bad in [
            "list<int",
            "map<text>",
            "map<text, int, int>",
            "list<>",
            "map<text,>",
            "list<int>>",
            "frozen<int, int>",
            "tuple<int, text>",
            "vector<float, 3>",
            "'org.example.CustomType'",
            "",
            "int, text",
        ] {
            assert!(parse_cql_type(bad).is_err(), "{:?} should be rejected", bad);
        }
    }

    #[test]
    fn test_display_round_trips_canonical_text() {
        let text = "map<text, frozen<list<frozen<address>>>>";
        assert_eq!(parse_cql_type(text).unwrap().to_string(), text);
    }

    #[test]
    fn test_sample_literals() {
        assert_eq!(ScalarKind::Int.sample_literal(2), "2");
        assert_eq!(ScalarKind::Text.sample_literal(1), "\"value1\"");
        assert_eq!(
            ScalarKind::Uuid.sample_literal(7),
            "UUID.fromString(\"00000000-0000-0000-0000-000000000007\")"
        );
        assert_eq!(parse_cql_type("list<int>").unwrap().sample_literal(1), None);
    }
}
