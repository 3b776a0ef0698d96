use crate::scalar::{EnvRef, PathValue, Quantity};
use crate::schema::Kind;

use std::collections::HashMap;
use std::fmt;
use std::ops::Index;

/// This type holds dynamic Pure data.
///
/// Values can represent anything a Pure schema declares and form the
/// caller-owned target tree the decoder mutates in place. Groups and
/// mappings store their entries keyed by tag; declaration order lives in
/// the [Schema](crate::Schema), not here.
#[derive(Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Bool(bool),
    String(String),
    Quantity(Quantity),
    Path(PathValue),
    Env(EnvRef),
    Sequence(Vec<Value>),
    Mapping(HashMap<String, Value>),
    Group(HashMap<String, Value>),
}

impl Value {
    /// The schema kind this value belongs to.
    pub fn kind(&self) -> Kind {
        match *self {
            Value::Int(_) => Kind::Int,
            Value::Float(_) => Kind::Float,
            Value::Bool(_) => Kind::Bool,
            Value::String(_) => Kind::String,
            Value::Quantity(_) => Kind::Quantity,
            Value::Path(_) => Kind::Path,
            Value::Env(_) => Kind::Env,
            Value::Sequence(_) => Kind::Sequence,
            Value::Mapping(_) => Kind::Mapping,
            Value::Group(_) => Kind::Group,
        }
    }

    /// A convenience method to extract the value out of an [Int](#variant.Int).
    /// Returns `0` for other value kinds.
    pub fn as_int(&self) -> i64 {
        match *self {
            Value::Int(value) => value,
            _ => 0,
        }
    }

    /// A convenience method to extract the value out of a [Float](#variant.Float).
    /// Returns `0.0` for other value kinds.
    pub fn as_float(&self) -> f64 {
        match *self {
            Value::Float(value) => value,
            _ => 0.0,
        }
    }

    /// A convenience method to extract the value out of a [Bool](#variant.Bool).
    /// Returns `false` for other value kinds.
    pub fn as_bool(&self) -> bool {
        match *self {
            Value::Bool(value) => value,
            _ => false,
        }
    }

    /// A convenience method to extract the text out of a
    /// [String](#variant.String) or any of the wrapper scalars, which
    /// yield their verbatim source text. Returns `""` for other kinds.
    pub fn as_str(&self) -> &str {
        match *self {
            Value::String(ref value) => value.as_str(),
            Value::Quantity(ref value) => value.text(),
            Value::Path(ref value) => value.text(),
            Value::Env(ref value) => value.text(),
            _ => "",
        }
    }

    /// A convenience method to get the elements out of a
    /// [Sequence](#variant.Sequence). Returns an empty slice for other
    /// value kinds.
    pub fn as_sequence(&self) -> &[Value] {
        match *self {
            Value::Sequence(ref values) => values.as_slice(),
            _ => &[],
        }
    }

    /// A convenience method to extract the length out of a
    /// [Sequence](#variant.Sequence), [Mapping](#variant.Mapping), or
    /// [Group](#variant.Group). Returns `0` for other value kinds.
    pub fn len(&self) -> usize {
        match *self {
            Value::Sequence(ref values) => values.len(),
            Value::Mapping(ref entries) => entries.len(),
            Value::Group(ref entries) => entries.len(),
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A convenience method to append to a [Sequence](#variant.Sequence).
    /// Does nothing for other value kinds.
    pub fn push(&mut self, value: Value) {
        if let Value::Sequence(ref mut values) = *self {
            values.push(value);
        }
    }

    /// A convenience method to extract an entry out of a
    /// [Group](#variant.Group) or [Mapping](#variant.Mapping). Returns
    /// `None` for other value kinds or if the entry isn't present.
    pub fn get(&self, tag: &str) -> Option<&Value> {
        match *self {
            Value::Group(ref entries) => entries.get(tag),
            Value::Mapping(ref entries) => entries.get(tag),
            _ => None,
        }
    }

    /// A convenience method to update an entry on a
    /// [Group](#variant.Group) or [Mapping](#variant.Mapping). Does
    /// nothing for other value kinds.
    pub fn set(&mut self, tag: impl Into<String>, value: Value) {
        match *self {
            Value::Group(ref mut entries) => {
                entries.insert(tag.into(), value);
            }
            Value::Mapping(ref mut entries) => {
                entries.insert(tag.into(), value);
            }
            _ => {}
        }
    }

    /// A mutable borrow of a [Group](#variant.Group) or
    /// [Mapping](#variant.Mapping) entry.
    pub fn get_mut(&mut self, tag: &str) -> Option<&mut Value> {
        match *self {
            Value::Group(ref mut entries) => entries.get_mut(tag),
            Value::Mapping(ref mut entries) => entries.get_mut(tag),
            _ => None,
        }
    }
}

fn fmt_entries(
    name: &str,
    entries: &HashMap<String, Value>,
    f: &mut fmt::Formatter,
) -> fmt::Result {
    let mut keys: Vec<_> = entries.keys().collect();
    let mut first = true;
    keys.sort();
    write!(f, "{} {{", name)?;

    for key in keys {
        if first {
            first = false;
        } else {
            write!(f, ", ")?;
        }
        write!(f, "{}: {:?}", key, entries[key])?;
    }

    write!(f, "}}")
}

impl Index<usize> for Value {
    type Output = Value;

    /// A convenience method that adds support for `self[index]`
    /// expressions. It will panic if this value isn't a
    /// [Sequence](#variant.Sequence) or if the index is out of bounds.
    fn index(&self, index: usize) -> &Value {
        match *self {
            Value::Sequence(ref values) => &values[index],
            _ => panic!(),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Value::Int(value) => value.fmt(f),
            Value::Float(value) => value.fmt(f),
            Value::Bool(value) => value.fmt(f),
            Value::String(ref value) => value.fmt(f),
            Value::Quantity(ref value) => value.fmt(f),
            Value::Path(ref value) => value.fmt(f),
            Value::Env(ref value) => value.fmt(f),
            Value::Sequence(ref values) => values.fmt(f),
            Value::Mapping(ref entries) => fmt_entries("map", entries, f),
            Value::Group(ref entries) => fmt_entries("group", entries, f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_basic() {
        let value = Value::Sequence(vec![
            Value::Bool(true),
            Value::Int(-1),
            Value::Float(0.5),
            Value::String("abc".to_owned()),
            Value::Quantity(Quantity::new("10GB")),
            Value::Group({
                let mut map = HashMap::new();
                map.insert("key1".to_owned(), Value::String("value1".to_owned()));
                map.insert("key2".to_owned(), Value::String("value2".to_owned()));
                map
            }),
        ]);

        assert_eq!(value.len(), 6);
        assert_eq!(value[0], Value::Bool(true));
        assert_eq!(value[1], Value::Int(-1));
        assert_eq!(value[0].as_bool(), true);
        assert_eq!(value[1].as_int(), -1);
        assert_eq!(value[2].as_float(), 0.5);
        assert_eq!(value[3].as_str(), "abc");
        assert_eq!(value[4].as_str(), "10GB");
        assert_eq!(value.get("key1"), None);
        assert_eq!(
            value[5].get("key1"),
            Some(&Value::String("value1".to_owned()))
        );

        assert_eq!(
            format!("{:?}", value),
            "[true, -1, 0.5, \"abc\", Quantity(10GB), group {key1: \"value1\", key2: \"value2\"}]"
        );
    }

    #[test]
    fn value_push() {
        let mut value = Value::Sequence(vec![]);
        assert_eq!(value.len(), 0);

        value.push(Value::Int(123));
        assert_eq!(value.len(), 1);
        assert_eq!(value[0], Value::Int(123));

        value.push(Value::Int(456));
        assert_eq!(value.len(), 2);
        assert_eq!(value[0], Value::Int(123));
        assert_eq!(value[1], Value::Int(456));
    }

    #[test]
    fn value_set() {
        let mut value = Value::Group(HashMap::new());
        assert_eq!(value.get("x"), None);

        value.set("x", Value::Int(123));
        assert_eq!(value.get("x"), Some(&Value::Int(123)));

        value.set("y", Value::Int(456));
        assert_eq!(value.get("x"), Some(&Value::Int(123)));
        assert_eq!(value.get("y"), Some(&Value::Int(456)));

        value.set("x", Value::Int(789));
        assert_eq!(value.get("x"), Some(&Value::Int(789)));
        assert_eq!(value.get("y"), Some(&Value::Int(456)));
    }

    #[test]
    fn value_kind() {
        assert_eq!(Value::Int(1).kind(), Kind::Int);
        assert_eq!(Value::Sequence(vec![]).kind(), Kind::Sequence);
        assert_eq!(Value::Group(HashMap::new()).kind(), Kind::Group);
    }
}
