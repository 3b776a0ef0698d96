use crate::value::Value;
use crate::{EnvRef, PathValue, Quantity};
use serde::Serialize;
use std::collections::HashMap;

/// The value kinds a Pure schema can declare for a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Kind {
    Int,
    Float,
    Bool,
    String,
    Quantity,
    Path,
    Env,
    Group,
    Sequence,
    Mapping,
}

impl Kind {
    /// Returns `true` for kinds that bind a single literal, i.e.
    /// everything except groups, sequences, and mappings.
    pub fn is_scalar(self) -> bool {
        !matches!(self, Kind::Group | Kind::Sequence | Kind::Mapping)
    }

    /// The name used in diagnostics, lowercase like the source syntax.
    pub fn name(self) -> &'static str {
        match self {
            Kind::Int => "int",
            Kind::Float => "float",
            Kind::Bool => "bool",
            Kind::String => "string",
            Kind::Quantity => "quantity",
            Kind::Path => "path",
            Kind::Env => "env",
            Kind::Group => "group",
            Kind::Sequence => "sequence",
            Kind::Mapping => "mapping",
        }
    }
}

/// One bindable field of a target structure: the declared tag name, the
/// value kind, the optional `unquoted` modifier, and a nested schema when
/// the kind is [`Kind::Group`]. Sequences and mappings carry the declared
/// element kind instead.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    pub tag: String,
    pub kind: Kind,
    pub unquoted: bool,
    pub elem: Option<Kind>,
    pub group: Option<Schema>,
}

impl Field {
    /// A scalar field bound to `tag`.
    pub fn new(tag: impl Into<String>, kind: Kind) -> Field {
        Field {
            tag: tag.into(),
            kind,
            unquoted: false,
            elem: None,
            group: None,
        }
    }

    /// A string field that captures raw text to end of line instead of a
    /// quoted literal.
    pub fn unquoted(tag: impl Into<String>) -> Field {
        Field {
            tag: tag.into(),
            kind: Kind::String,
            unquoted: true,
            elem: None,
            group: None,
        }
    }

    /// An ordered sequence of `elem` scalars.
    pub fn sequence(tag: impl Into<String>, elem: Kind) -> Field {
        Field {
            tag: tag.into(),
            kind: Kind::Sequence,
            unquoted: false,
            elem: Some(elem),
            group: None,
        }
    }

    /// A key/value mapping with `elem` scalar values.
    pub fn mapping(tag: impl Into<String>, elem: Kind) -> Field {
        Field {
            tag: tag.into(),
            kind: Kind::Mapping,
            unquoted: false,
            elem: Some(elem),
            group: None,
        }
    }

    /// A nested named group with its own schema.
    pub fn group(tag: impl Into<String>, schema: Schema) -> Field {
        Field {
            tag: tag.into(),
            kind: Kind::Group,
            unquoted: false,
            elem: None,
            group: Some(schema),
        }
    }

    /// The default value a freshly allocated target holds for this field.
    pub fn default_value(&self) -> Value {
        match self.kind {
            Kind::Int => Value::Int(0),
            Kind::Float => Value::Float(0.0),
            Kind::Bool => Value::Bool(false),
            Kind::String => Value::String(String::new()),
            Kind::Quantity => Value::Quantity(Quantity::default()),
            Kind::Path => Value::Path(PathValue::default()),
            Kind::Env => Value::Env(EnvRef::default()),
            Kind::Sequence => Value::Sequence(Vec::new()),
            Kind::Mapping => Value::Mapping(HashMap::new()),
            Kind::Group => match &self.group {
                Some(schema) => schema.default_value(),
                None => Value::Group(HashMap::new()),
            },
        }
    }
}

/// An ordered set of field declarations for one target structure.
///
/// A schema is built once per target type and consulted for every
/// statement during decoding and for declaration order during encoding.
/// Lookup is first-match: when two fields carry the same tag, the field
/// declared first wins. Tags `""` and `"-"` never match, which excludes
/// a field from binding.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Schema {
    pub fields: Vec<Field>,
}

impl Schema {
    pub fn new(fields: Vec<Field>) -> Schema {
        Schema { fields }
    }

    /// The first field declared under `tag`, or `None` for unknown tags.
    pub fn field(&self, tag: &str) -> Option<&Field> {
        self.fields
            .iter()
            .find(|f| !f.tag.is_empty() && f.tag != "-" && f.tag == tag)
    }

    /// Resolves a chain of nested group tags to the schema of the
    /// innermost group. The empty path is this schema.
    pub fn at(&self, path: &[String]) -> Option<&Schema> {
        let mut schema = self;
        for tag in path {
            schema = schema.field(tag)?.group.as_ref()?;
        }
        Some(schema)
    }

    /// Allocates a target tree with every field set to its default.
    /// Decoding mutates this tree in place; fields absent from the
    /// source keep the defaults assigned here.
    pub fn default_value(&self) -> Value {
        let mut fields = HashMap::new();
        for field in &self.fields {
            if field.tag.is_empty() || field.tag == "-" {
                continue;
            }
            fields
                .entry(field.tag.clone())
                .or_insert_with(|| field.default_value());
        }
        Value::Group(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_match_wins_on_duplicate_tags() {
        let schema = Schema::new(vec![
            Field::new("port", Kind::Int),
            Field::new("port", Kind::String),
        ]);
        assert_eq!(schema.field("port").unwrap().kind, Kind::Int);
    }

    #[test]
    fn excluded_tags_never_match() {
        let schema = Schema::new(vec![
            Field::new("", Kind::Int),
            Field::new("-", Kind::Int),
        ]);
        assert!(schema.field("").is_none());
        assert!(schema.field("-").is_none());
    }

    #[test]
    fn nested_lookup() {
        let schema = Schema::new(vec![Field::group(
            "server",
            Schema::new(vec![Field::new("port", Kind::Int)]),
        )]);

        let path = vec!["server".to_owned()];
        let inner = schema.at(&path).unwrap();
        assert_eq!(inner.field("port").unwrap().kind, Kind::Int);
        assert!(schema.at(&["missing".to_owned()]).is_none());
    }

    #[test]
    fn default_tree_covers_every_kind() {
        let schema = Schema::new(vec![
            Field::new("count", Kind::Int),
            Field::new("ratio", Kind::Float),
            Field::new("on", Kind::Bool),
            Field::new("name", Kind::String),
            Field::new("size", Kind::Quantity),
            Field::sequence("ports", Kind::Int),
            Field::mapping("env", Kind::String),
            Field::group("sub", Schema::new(vec![Field::new("x", Kind::Int)])),
        ]);

        let value = schema.default_value();
        assert_eq!(value.get("count"), Some(&Value::Int(0)));
        assert_eq!(value.get("ratio"), Some(&Value::Float(0.0)));
        assert_eq!(value.get("on"), Some(&Value::Bool(false)));
        assert_eq!(value.get("name"), Some(&Value::String(String::new())));
        assert_eq!(value.get("ports"), Some(&Value::Sequence(Vec::new())));
        assert_eq!(value.get("sub").unwrap().get("x"), Some(&Value::Int(0)));
    }
}
