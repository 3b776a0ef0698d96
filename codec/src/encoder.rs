use crate::error::PureError;
use pure_schema::{Field, Kind, Schema, Value};

const INDENT: &str = "    ";

/// Renders a [Value::Group] tree back into Pure source text.
///
/// Fields render in schema declaration order, one statement per line,
/// with nested groups as indented blocks. Entries the tree doesn't hold
/// are skipped, so a partial tree renders a partial document. Mapping
/// keys sort lexicographically; the source never records their order.
pub fn encode(value: &Value, schema: &Schema) -> Result<Vec<u8>, PureError> {
    if !matches!(value, Value::Group(_)) {
        return Err(PureError::InvalidRoot);
    }
    let mut out = String::new();
    encode_group(&mut out, schema, value, 0);
    Ok(out.into_bytes())
}

fn pad(out: &mut String, level: usize) {
    for _ in 0..level {
        out.push_str(INDENT);
    }
}

fn encode_group(out: &mut String, schema: &Schema, group: &Value, level: usize) {
    for field in &schema.fields {
        if field.tag.is_empty() || field.tag == "-" {
            continue;
        }
        let Some(value) = group.get(&field.tag) else {
            continue;
        };
        match field.kind {
            Kind::Group => encode_nested(out, field, value, level),
            Kind::Sequence => encode_sequence(out, field, value, level),
            Kind::Mapping => encode_mapping(out, field, value, level),
            _ => {
                let text = scalar_text(value, !field.unquoted);
                // An unset wrapper or unquoted string renders to nothing,
                // and `tag = ` with no value wouldn't read back.
                if text.is_empty() {
                    continue;
                }
                pad(out, level);
                out.push_str(&field.tag);
                out.push_str(" = ");
                out.push_str(&text);
                out.push('\n');
            }
        }
    }
}

fn encode_nested(out: &mut String, field: &Field, value: &Value, level: usize) {
    let Some(schema) = &field.group else {
        return;
    };
    // A header with no members would read back as a dangling identifier,
    // so empty groups render as nothing at all.
    let mut body = String::new();
    encode_group(&mut body, schema, value, level + 1);
    if body.is_empty() {
        return;
    }
    pad(out, level);
    out.push_str(&field.tag);
    out.push('\n');
    out.push_str(&body);
}

fn encode_sequence(out: &mut String, field: &Field, value: &Value, level: usize) {
    let items = value.as_sequence();
    pad(out, level);
    out.push_str(&field.tag);
    if items.is_empty() {
        out.push_str(" = []\n");
        return;
    }
    out.push_str(" = [\n");
    for item in items {
        pad(out, level + 1);
        out.push_str(&scalar_text(item, true));
        out.push('\n');
    }
    pad(out, level);
    out.push_str("]\n");
}

fn encode_mapping(out: &mut String, field: &Field, value: &Value, level: usize) {
    let Value::Mapping(entries) = value else {
        return;
    };
    pad(out, level);
    out.push_str(&field.tag);
    if entries.is_empty() {
        out.push_str(" = []\n");
        return;
    }
    out.push_str(" = [\n");

    let mut keys: Vec<_> = entries.keys().collect();
    keys.sort();
    for key in keys {
        pad(out, level + 1);
        out.push_str(key);
        out.push_str(" = ");
        out.push_str(&scalar_text(&entries[key], true));
        out.push('\n');
    }
    pad(out, level);
    out.push_str("]\n");
}

/// One scalar as source text. Strings quote and escape unless the field
/// carried the `unquoted` modifier; the wrapper scalars render their
/// verbatim source text.
fn scalar_text(value: &Value, quote_strings: bool) -> String {
    match value {
        Value::Int(v) => v.to_string(),
        Value::Float(v) => v.to_string(),
        Value::Bool(v) => v.to_string(),
        Value::String(v) => {
            if quote_strings {
                format!("\"{}\"", v.replace('\\', "\\\\").replace('"', "\\\""))
            } else {
                v.clone()
            }
        }
        Value::Quantity(v) => v.text().to_owned(),
        Value::Path(v) => v.text().to_owned(),
        Value::Env(v) => v.text().to_owned(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pure_schema::{PathValue, Quantity};
    use std::collections::HashMap;

    #[test]
    fn encode_rejects_non_group_roots() {
        let err = encode(&Value::Int(1), &Schema::default()).unwrap_err();
        assert!(matches!(err, PureError::InvalidRoot));
    }

    #[test]
    fn scalars_render_in_declaration_order() {
        let schema = Schema::new(vec![
            Field::new("name", Kind::String),
            Field::new("age", Kind::Int),
            Field::new("disk", Kind::Quantity),
            Field::new("font", Kind::Path),
        ]);
        let mut root = schema.default_value();
        root.set("name", Value::String("Ada".to_owned()));
        root.set("age", Value::Int(36));
        root.set("disk", Value::Quantity(Quantity::new("10GB")));
        root.set("font", Value::Path(PathValue::new("./fonts/mono.ttf")));

        let text = String::from_utf8(encode(&root, &schema).unwrap()).unwrap();
        assert_eq!(
            text,
            "name = \"Ada\"\nage = 36\ndisk = 10GB\nfont = ./fonts/mono.ttf\n"
        );
    }

    #[test]
    fn unquoted_fields_render_bare() {
        let schema = Schema::new(vec![Field::unquoted("motd")]);
        let mut root = schema.default_value();
        root.set("motd", Value::String("hello \"world\"".to_owned()));

        let text = String::from_utf8(encode(&root, &schema).unwrap()).unwrap();
        assert_eq!(text, "motd = hello \"world\"\n");
    }

    #[test]
    fn groups_render_as_indented_blocks() {
        let schema = Schema::new(vec![Field::group(
            "server",
            Schema::new(vec![
                Field::new("host", Kind::String),
                Field::new("port", Kind::Int),
            ]),
        )]);
        let mut root = schema.default_value();
        let server = root.get_mut("server").unwrap();
        server.set("host", Value::String("localhost".to_owned()));
        server.set("port", Value::Int(8080));

        let text = String::from_utf8(encode(&root, &schema).unwrap()).unwrap();
        assert_eq!(text, "server\n    host = \"localhost\"\n    port = 8080\n");
    }

    #[test]
    fn sequences_and_mappings_render_one_element_per_line() {
        let schema = Schema::new(vec![
            Field::sequence("sizes", Kind::Int),
            Field::mapping("ports", Kind::Int),
            Field::sequence("none", Kind::Int),
        ]);
        let mut root = schema.default_value();
        root.set(
            "sizes",
            Value::Sequence(vec![Value::Int(1), Value::Int(2), Value::Int(3)]),
        );
        let mut ports = HashMap::new();
        ports.insert("https".to_owned(), Value::Int(443));
        ports.insert("http".to_owned(), Value::Int(80));
        root.set("ports", Value::Mapping(ports));

        let text = String::from_utf8(encode(&root, &schema).unwrap()).unwrap();
        assert_eq!(
            text,
            "sizes = [\n    1\n    2\n    3\n]\nports = [\n    http = 80\n    https = 443\n]\nnone = []\n"
        );
    }

    #[test]
    fn empty_wrapper_scalars_are_skipped() {
        let schema = Schema::new(vec![
            Field::new("name", Kind::String),
            Field::new("disk", Kind::Quantity),
            Field::unquoted("motd"),
        ]);
        let root = schema.default_value();

        let text = String::from_utf8(encode(&root, &schema).unwrap()).unwrap();
        assert_eq!(text, "name = \"\"\n");
    }

    #[test]
    fn absent_entries_are_skipped() {
        let schema = Schema::new(vec![
            Field::new("a", Kind::Int),
            Field::new("b", Kind::Int),
        ]);
        let mut root = Value::Group(HashMap::new());
        root.set("b", Value::Int(2));

        let text = String::from_utf8(encode(&root, &schema).unwrap()).unwrap();
        assert_eq!(text, "b = 2\n");
    }
}
