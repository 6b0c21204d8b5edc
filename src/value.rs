//! Tri-state attribute values and typed access to attribute trees.
//!
//! The host exchanges resource state as a JSON object tree in which every
//! leaf is in one of three states: null (absent), unknown (to be computed
//! during apply) or a known value. Unknown leaves are carried as the
//! [`UNKNOWN_VALUE`] sentinel string.
//!
//! [`ObjectReader`] walks such a tree into typed [`StateObject`]s and
//! records a diagnostic for every leaf of the wrong type instead of
//! stopping at the first one. [`ObjectWriter`] renders typed state back.

use serde_json::{Map, Value};

use crate::schema::Diagnostics;

/// Sentinel carried in place of a value that is not yet known.
pub const UNKNOWN_VALUE: &str = "74D93920-ED26-11E3-AC10-0800200C9A66";

/// Returns the JSON encoding of an unknown value.
pub fn unknown() -> Value {
    Value::String(UNKNOWN_VALUE.to_string())
}

/// Whether a JSON value is the unknown sentinel.
pub fn is_unknown(value: &Value) -> bool {
    value.as_str() == Some(UNKNOWN_VALUE)
}

/// Whether a JSON tree holds at least one leaf that is neither null nor unknown.
pub fn has_known_leaf(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Object(map) => map.values().any(has_known_leaf),
        Value::Array(items) => items.iter().any(has_known_leaf),
        other => !is_unknown(other),
    }
}

/// A single attribute value: absent, not yet known, or known.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum AttrValue<T> {
    /// The attribute is absent.
    #[default]
    Null,
    /// The attribute will be known after apply.
    Unknown,
    /// The attribute holds a value.
    Known(T),
}

impl<T> AttrValue<T> {
    /// Wrap a known value.
    pub fn known(value: impl Into<T>) -> Self {
        Self::Known(value.into())
    }

    /// `None` becomes [`AttrValue::Null`].
    pub fn from_option(value: Option<T>) -> Self {
        match value {
            Some(value) => Self::Known(value),
            None => Self::Null,
        }
    }

    /// Whether the value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Whether the value is unknown.
    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    /// Whether the value is known.
    pub fn is_known(&self) -> bool {
        matches!(self, Self::Known(_))
    }

    /// Borrow the known value, if any.
    pub fn as_known(&self) -> Option<&T> {
        match self {
            Self::Known(value) => Some(value),
            _ => None,
        }
    }

    /// Take the known value, if any.
    pub fn into_known(self) -> Option<T> {
        match self {
            Self::Known(value) => Some(value),
            _ => None,
        }
    }

    /// Map the known value, preserving null and unknown.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> AttrValue<U> {
        match self {
            Self::Null => AttrValue::Null,
            Self::Unknown => AttrValue::Unknown,
            Self::Known(value) => AttrValue::Known(f(value)),
        }
    }

    /// Borrowing form of the value.
    pub fn as_ref(&self) -> AttrValue<&T> {
        match self {
            Self::Null => AttrValue::Null,
            Self::Unknown => AttrValue::Unknown,
            Self::Known(value) => AttrValue::Known(value),
        }
    }
}

impl<T: Clone> AttrValue<T> {
    /// Clone out the known value, if any.
    pub fn known_cloned(&self) -> Option<T> {
        self.as_known().cloned()
    }
}

impl<T> From<Option<T>> for AttrValue<T> {
    fn from(value: Option<T>) -> Self {
        Self::from_option(value)
    }
}

/// A scalar (or scalar list) leaf that can live in an attribute tree.
pub trait LeafValue: Sized {
    /// Name used in type mismatch diagnostics.
    const TYPE_NAME: &'static str;

    /// Convert a non-null, non-unknown JSON value.
    fn from_json(value: &Value) -> Option<Self>;

    /// Render as JSON.
    fn to_json(&self) -> Value;
}

impl LeafValue for String {
    const TYPE_NAME: &'static str = "string";

    fn from_json(value: &Value) -> Option<Self> {
        value.as_str().map(str::to_string)
    }

    fn to_json(&self) -> Value {
        Value::String(self.clone())
    }
}

impl LeafValue for bool {
    const TYPE_NAME: &'static str = "bool";

    fn from_json(value: &Value) -> Option<Self> {
        value.as_bool()
    }

    fn to_json(&self) -> Value {
        Value::Bool(*self)
    }
}

impl LeafValue for i64 {
    const TYPE_NAME: &'static str = "number";

    // Fractional numbers are truncated toward zero.
    fn from_json(value: &Value) -> Option<Self> {
        if let Some(i) = value.as_i64() {
            return Some(i);
        }
        let f = value.as_f64()?;
        let truncated = f.trunc();
        if truncated.is_finite() && truncated >= i64::MIN as f64 && truncated < i64::MAX as f64 {
            Some(truncated as i64)
        } else {
            None
        }
    }

    fn to_json(&self) -> Value {
        Value::from(*self)
    }
}

impl LeafValue for f64 {
    const TYPE_NAME: &'static str = "number";

    fn from_json(value: &Value) -> Option<Self> {
        value.as_f64()
    }

    fn to_json(&self) -> Value {
        serde_json::Number::from_f64(*self)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }
}

impl LeafValue for Vec<String> {
    const TYPE_NAME: &'static str = "list of string";

    fn from_json(value: &Value) -> Option<Self> {
        value
            .as_array()?
            .iter()
            .map(|item| item.as_str().map(str::to_string))
            .collect()
    }

    fn to_json(&self) -> Value {
        Value::Array(self.iter().cloned().map(Value::String).collect())
    }
}

/// A typed object that maps to one level of an attribute tree.
pub trait StateObject: Sized {
    /// Read the object's attributes.
    fn decode(reader: &mut ObjectReader<'_>) -> Self;

    /// Write the object's attributes.
    fn encode(&self, writer: &mut ObjectWriter);
}

/// Decode a whole attribute tree into a typed object.
pub fn decode_object<T: StateObject>(value: &Value, diags: &mut Diagnostics) -> T {
    let mut reader = ObjectReader::root(value, diags);
    T::decode(&mut reader)
}

/// Encode a typed object into an attribute tree.
pub fn encode_object<T: StateObject>(object: &T) -> Value {
    let mut writer = ObjectWriter::new();
    object.encode(&mut writer);
    writer.finish()
}

/// Reads one object level of an attribute tree.
pub struct ObjectReader<'a> {
    path: String,
    map: Option<&'a Map<String, Value>>,
    diags: &'a mut Diagnostics,
}

impl<'a> ObjectReader<'a> {
    /// Reader over the root of a tree. A null root reads as an empty object.
    pub fn root(value: &'a Value, diags: &'a mut Diagnostics) -> Self {
        let map = match value {
            Value::Object(map) => Some(map),
            Value::Null => None,
            other => {
                diags.error(
                    "Invalid attribute tree",
                    format!("expected an object, got {}", json_type_name(other)),
                );
                None
            },
        };
        Self {
            path: String::new(),
            map,
            diags,
        }
    }

    /// Path of a child attribute, dotted from the root.
    pub fn path_of(&self, key: &str) -> String {
        if self.path.is_empty() {
            key.to_string()
        } else {
            format!("{}.{}", self.path, key)
        }
    }

    /// The raw JSON of a child attribute.
    pub fn raw(&self, key: &str) -> Option<&'a Value> {
        self.map.and_then(|map| map.get(key))
    }

    /// Record an error at a child attribute.
    pub fn error(&mut self, key: &str, summary: impl Into<String>, detail: impl Into<String>) {
        let path = self.path_of(key);
        self.diags.attribute_error(path, summary, detail);
    }

    /// Record an error against the object being read.
    pub fn object_error(&mut self, summary: impl Into<String>, detail: impl Into<String>) {
        if self.path.is_empty() {
            self.diags.error(summary, detail);
        } else {
            self.diags
                .attribute_error(self.path.clone(), summary, detail);
        }
    }

    /// Read a scalar leaf.
    pub fn leaf<T: LeafValue>(&mut self, key: &str) -> AttrValue<T> {
        match self.raw(key) {
            None | Some(Value::Null) => AttrValue::Null,
            Some(value) if is_unknown(value) => AttrValue::Unknown,
            Some(value) => match T::from_json(value) {
                Some(parsed) => AttrValue::Known(parsed),
                None => {
                    self.error(
                        key,
                        "Incorrect attribute type",
                        format!("expected {}, got {}", T::TYPE_NAME, json_type_name(value)),
                    );
                    AttrValue::Null
                },
            },
        }
    }

    /// Read a string leaf.
    pub fn string(&mut self, key: &str) -> AttrValue<String> {
        self.leaf(key)
    }

    /// Read a bool leaf.
    pub fn bool(&mut self, key: &str) -> AttrValue<bool> {
        self.leaf(key)
    }

    /// Read an integer leaf.
    pub fn int(&mut self, key: &str) -> AttrValue<i64> {
        self.leaf(key)
    }

    /// Read a float leaf.
    pub fn float(&mut self, key: &str) -> AttrValue<f64> {
        self.leaf(key)
    }

    /// Read a list of strings.
    pub fn string_list(&mut self, key: &str) -> AttrValue<Vec<String>> {
        self.leaf(key)
    }

    /// Read a nested object.
    pub fn object<T: StateObject>(&mut self, key: &str) -> AttrValue<T> {
        match self.raw(key) {
            None | Some(Value::Null) => AttrValue::Null,
            Some(value) if is_unknown(value) => AttrValue::Unknown,
            Some(Value::Object(map)) => AttrValue::Known(self.decode_child(key.to_string(), map)),
            Some(value) => {
                self.error(
                    key,
                    "Incorrect attribute type",
                    format!("expected object, got {}", json_type_name(value)),
                );
                AttrValue::Null
            },
        }
    }

    /// Read a list of nested objects.
    pub fn object_list<T: StateObject>(&mut self, key: &str) -> AttrValue<Vec<T>> {
        match self.raw(key) {
            None | Some(Value::Null) => AttrValue::Null,
            Some(value) if is_unknown(value) => AttrValue::Unknown,
            Some(Value::Array(items)) => {
                let mut decoded = Vec::with_capacity(items.len());
                for (index, item) in items.iter().enumerate() {
                    let child_key = format!("{}[{}]", key, index);
                    match item {
                        Value::Object(map) => decoded.push(self.decode_child(child_key, map)),
                        other => self.error(
                            &child_key,
                            "Incorrect attribute type",
                            format!("expected object, got {}", json_type_name(other)),
                        ),
                    }
                }
                AttrValue::Known(decoded)
            },
            Some(value) => {
                self.error(
                    key,
                    "Incorrect attribute type",
                    format!("expected list, got {}", json_type_name(value)),
                );
                AttrValue::Null
            },
        }
    }

    fn decode_child<T: StateObject>(&mut self, key: String, map: &'a Map<String, Value>) -> T {
        let mut child = ObjectReader {
            path: self.path_of(&key),
            map: Some(map),
            diags: &mut *self.diags,
        };
        T::decode(&mut child)
    }
}

/// Builds one object level of an attribute tree.
#[derive(Debug, Default)]
pub struct ObjectWriter {
    map: Map<String, Value>,
}

impl ObjectWriter {
    /// Create an empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Write a raw JSON value.
    pub fn value(&mut self, key: &str, value: Value) {
        self.map.insert(key.to_string(), value);
    }

    /// Write a scalar leaf.
    pub fn leaf<T: LeafValue>(&mut self, key: &str, value: &AttrValue<T>) {
        let json = match value {
            AttrValue::Null => Value::Null,
            AttrValue::Unknown => unknown(),
            AttrValue::Known(value) => value.to_json(),
        };
        self.value(key, json);
    }

    /// Write a nested object.
    pub fn object<T: StateObject>(&mut self, key: &str, value: &AttrValue<T>) {
        let json = match value {
            AttrValue::Null => Value::Null,
            AttrValue::Unknown => unknown(),
            AttrValue::Known(object) => encode_object(object),
        };
        self.value(key, json);
    }

    /// Write a list of nested objects.
    pub fn object_list<T: StateObject>(&mut self, key: &str, value: &AttrValue<Vec<T>>) {
        let json = match value {
            AttrValue::Null => Value::Null,
            AttrValue::Unknown => unknown(),
            AttrValue::Known(items) => Value::Array(items.iter().map(encode_object).collect()),
        };
        self.value(key, json);
    }

    /// Finish the object.
    pub fn finish(self) -> Value {
        Value::Object(self.map)
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[derive(Debug, Default, PartialEq)]
    struct Inner {
        flag: AttrValue<bool>,
    }

    impl StateObject for Inner {
        fn decode(reader: &mut ObjectReader<'_>) -> Self {
            Self {
                flag: reader.bool("flag"),
            }
        }

        fn encode(&self, writer: &mut ObjectWriter) {
            writer.leaf("flag", &self.flag);
        }
    }

    #[derive(Debug, Default, PartialEq)]
    struct Outer {
        name: AttrValue<String>,
        count: AttrValue<i64>,
        ratio: AttrValue<f64>,
        tags: AttrValue<Vec<String>>,
        inner: AttrValue<Inner>,
    }

    impl StateObject for Outer {
        fn decode(reader: &mut ObjectReader<'_>) -> Self {
            Self {
                name: reader.string("name"),
                count: reader.int("count"),
                ratio: reader.float("ratio"),
                tags: reader.string_list("tags"),
                inner: reader.object("inner"),
            }
        }

        fn encode(&self, writer: &mut ObjectWriter) {
            writer.leaf("name", &self.name);
            writer.leaf("count", &self.count);
            writer.leaf("ratio", &self.ratio);
            writer.leaf("tags", &self.tags);
            writer.object("inner", &self.inner);
        }
    }

    #[test]
    fn test_tri_state_decoding() {
        let mut diags = Diagnostics::new();
        let outer: Outer = decode_object(
            &json!({
                "name": "ep",
                "count": null,
                "ratio": UNKNOWN_VALUE,
                "inner": {"flag": true}
            }),
            &mut diags,
        );

        assert!(diags.is_empty());
        assert_eq!(outer.name, AttrValue::Known("ep".to_string()));
        assert_eq!(outer.count, AttrValue::Null);
        assert_eq!(outer.ratio, AttrValue::Unknown);
        assert_eq!(outer.tags, AttrValue::Null);
        assert_eq!(
            outer.inner,
            AttrValue::Known(Inner {
                flag: AttrValue::Known(true)
            })
        );
    }

    #[test]
    fn test_integer_leaf_truncates_fractions() {
        assert_eq!(i64::from_json(&json!(3.9)), Some(3));
        assert_eq!(i64::from_json(&json!(-3.9)), Some(-3));
        assert_eq!(i64::from_json(&json!(42)), Some(42));
        assert_eq!(i64::from_json(&json!(1e300)), None);
    }

    #[test]
    fn test_type_errors_accumulate_with_paths() {
        let mut diags = Diagnostics::new();
        let _: Outer = decode_object(
            &json!({"name": 7, "count": "x", "inner": {"flag": "yes"}}),
            &mut diags,
        );

        let paths: Vec<_> = diags
            .iter()
            .map(|d| d.attribute.clone().unwrap_or_default())
            .collect();
        assert_eq!(paths, vec!["name", "count", "inner.flag"]);
        assert!(diags.has_errors());
    }

    #[test]
    fn test_encode_preserves_states() {
        let outer = Outer {
            name: AttrValue::known("ep"),
            count: AttrValue::Unknown,
            ratio: AttrValue::Known(0.5),
            tags: AttrValue::Known(vec!["a".to_string()]),
            inner: AttrValue::Null,
        };

        assert_eq!(
            encode_object(&outer),
            json!({
                "name": "ep",
                "count": UNKNOWN_VALUE,
                "ratio": 0.5,
                "tags": ["a"],
                "inner": null
            })
        );
    }

    #[test]
    fn test_has_known_leaf() {
        assert!(!has_known_leaf(&json!(null)));
        assert!(!has_known_leaf(&json!({"a": null, "b": UNKNOWN_VALUE})));
        assert!(has_known_leaf(&json!({"a": null, "b": {"c": 0}})));
        assert!(has_known_leaf(&json!({"a": false})));
    }

    #[test]
    fn test_attr_value_helpers() {
        let value: AttrValue<i64> = Some(5).into();
        assert_eq!(value.as_known(), Some(&5));
        assert_eq!(value.clone().map(|v| v * 2), AttrValue::Known(10));

        let none: AttrValue<i64> = None.into();
        assert!(none.is_null());
        assert!(AttrValue::<i64>::Unknown.map(|v| v + 1).is_unknown());
    }

    proptest! {
        #[test]
        fn prop_integer_leaves_truncate_toward_zero(whole in 0i64..1_000_000, frac in 0.0f64..0.99) {
            let value = whole as f64 + frac;
            prop_assert_eq!(i64::from_json(&json!(value)), Some(whole));
            prop_assert_eq!(i64::from_json(&json!(-value)), Some(-whole));
        }

        #[test]
        fn prop_integers_survive_json(n in any::<i64>()) {
            prop_assert_eq!(i64::from_json(&n.to_json()), Some(n));
        }
    }
}
