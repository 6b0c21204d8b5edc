//! Schema validation helpers.
//!
//! Checks a configuration tree against a [`Schema`] before any typed
//! decoding happens. Unknown values are accepted wherever a value is
//! allowed; only their eventual known form can be checked, during apply.
//!
//! # Example
//!
//! ```
//! use huggingface_provider::schema::{Attribute, Schema};
//! use huggingface_provider::validation::validate;
//! use serde_json::json;
//!
//! let schema = Schema::v0()
//!     .with_attribute("name", Attribute::required_string())
//!     .with_attribute("max_replica", Attribute::optional_int64());
//!
//! let diagnostics = validate(&schema, &json!({"name": "ep1", "max_replica": 2}));
//! assert!(diagnostics.is_empty());
//!
//! let diagnostics = validate(&schema, &json!({"name": "ep1", "max_replica": "two"}));
//! assert_eq!(diagnostics.len(), 1);
//! assert_eq!(diagnostics.iter().next().and_then(|d| d.attribute.as_deref()), Some("max_replica"));
//! ```

use serde_json::{Map, Value};

use crate::schema::{
    Attribute, AttributeType, Block, BlockNestingMode, Diagnostic, Diagnostics, NestedBlock,
    Schema,
};
use crate::value::{has_known_leaf, is_unknown, LeafValue};

/// Validate a configuration tree against a schema.
///
/// # Validation Rules
///
/// - Required attributes and blocks must be present and non-null
/// - Computed-only attributes and blocks must not be set
/// - Attributes the schema does not declare are rejected
/// - Attribute types must match the schema
/// - Unknown values are always accepted
pub fn validate(schema: &Schema, value: &Value) -> Diagnostics {
    let mut diagnostics = Diagnostics::new();
    validate_block(&schema.block, value, "", &mut diagnostics);
    diagnostics
}

/// Validate a configuration tree, returning Ok if valid or Err with diagnostics.
pub fn validate_result(schema: &Schema, value: &Value) -> Result<(), Diagnostics> {
    let diagnostics = validate(schema, value);
    if diagnostics.has_errors() {
        Err(diagnostics)
    } else {
        Ok(())
    }
}

/// Check if a configuration tree is valid against a schema.
pub fn is_valid(schema: &Schema, value: &Value) -> bool {
    !validate(schema, value).has_errors()
}

fn validate_block(block: &Block, value: &Value, path: &str, diagnostics: &mut Diagnostics) {
    let obj = match value {
        Value::Object(map) => map,
        Value::Null => return,
        v if is_unknown(v) => return,
        _ => {
            diagnostics.push(with_path(
                Diagnostic::error("Expected object")
                    .with_detail(format!("Got {}", value_type_name(value))),
                path,
            ));
            return;
        },
    };

    check_unsupported(block, obj, path, diagnostics);

    for (name, attr) in &block.attributes {
        let attr_path = join_path(path, name);
        validate_attribute(attr, obj.get(name), &attr_path, diagnostics);
    }

    for (name, nested) in &block.blocks {
        let block_path = join_path(path, name);
        validate_nested_block(nested, obj.get(name), &block_path, diagnostics);
    }
}

fn check_unsupported(
    block: &Block,
    obj: &Map<String, Value>,
    path: &str,
    diagnostics: &mut Diagnostics,
) {
    for key in obj.keys() {
        if !block.attributes.contains_key(key) && !block.blocks.contains_key(key) {
            let attr_path = join_path(path, key);
            diagnostics.push(
                Diagnostic::error("Unsupported attribute")
                    .with_detail(format!("An attribute named '{}' is not expected here", key))
                    .with_attribute(attr_path),
            );
        }
    }
}

fn validate_attribute(
    attr: &Attribute,
    value: Option<&Value>,
    path: &str,
    diagnostics: &mut Diagnostics,
) {
    match value {
        None | Some(Value::Null) => {
            if attr.flags.required {
                diagnostics.push(missing(path, "attribute"));
            }
        },
        Some(v) if is_unknown(v) => {},
        Some(v) => {
            if attr.flags.is_computed_only() {
                diagnostics.push(computed_set(path));
                return;
            }
            validate_attribute_type(&attr.attr_type, v, path, diagnostics);
        },
    }
}

fn validate_attribute_type(
    attr_type: &AttributeType,
    value: &Value,
    path: &str,
    diagnostics: &mut Diagnostics,
) {
    if is_unknown(value) {
        return;
    }
    let ok = match attr_type {
        AttributeType::String => String::from_json(value).is_some(),
        AttributeType::Int64 => i64::from_json(value).is_some(),
        AttributeType::Float64 => f64::from_json(value).is_some(),
        AttributeType::Bool => bool::from_json(value).is_some(),
        AttributeType::List(element_type) => match value.as_array() {
            Some(items) => {
                for (i, item) in items.iter().enumerate() {
                    let item_path = format!("{}[{}]", path, i);
                    validate_attribute_type(element_type, item, &item_path, diagnostics);
                }
                true
            },
            None => false,
        },
    };
    if !ok {
        diagnostics.push(type_error(path, attr_type, value));
    }
}

fn validate_nested_block(
    nested: &NestedBlock,
    value: Option<&Value>,
    path: &str,
    diagnostics: &mut Diagnostics,
) {
    let value = match value {
        None | Some(Value::Null) => {
            if nested.flags.required {
                diagnostics.push(missing(path, "block"));
            }
            return;
        },
        Some(v) if is_unknown(v) => return,
        // An optional block with only null leaves is a placeholder.
        Some(v) if !nested.flags.required && v.is_object() && !has_known_leaf(v) => return,
        Some(v) => v,
    };

    if nested.flags.is_computed_only() {
        diagnostics.push(computed_set(path));
        return;
    }

    match nested.nesting_mode {
        BlockNestingMode::Single => validate_block(&nested.block, value, path, diagnostics),
        BlockNestingMode::List => match value.as_array() {
            Some(items) => {
                for (i, item) in items.iter().enumerate() {
                    let item_path = format!("{}[{}]", path, i);
                    validate_block(&nested.block, item, &item_path, diagnostics);
                }
            },
            None => diagnostics.push(
                Diagnostic::error(format!("Expected list for block '{}'", path))
                    .with_detail(format!("Got {}", value_type_name(value)))
                    .with_attribute(path),
            ),
        },
    }
}

// Helper functions

fn missing(path: &str, what: &str) -> Diagnostic {
    Diagnostic::error(format!("Missing required {} '{}'", what, path))
        .with_detail(format!("This {} is required and must be provided", what))
        .with_attribute(path)
}

fn computed_set(path: &str) -> Diagnostic {
    Diagnostic::error(format!("Value for unconfigurable attribute '{}'", path))
        .with_detail("This attribute is computed by the provider and cannot be set in configuration")
        .with_attribute(path)
}

fn type_error(path: &str, expected: &AttributeType, value: &Value) -> Diagnostic {
    Diagnostic::error("Incorrect attribute type")
        .with_detail(format!(
            "Expected {}, got {}",
            type_name(expected),
            value_type_name(value)
        ))
        .with_attribute(path)
}

fn with_path(diagnostic: Diagnostic, path: &str) -> Diagnostic {
    if path.is_empty() {
        diagnostic
    } else {
        diagnostic.with_attribute(path)
    }
}

fn join_path(base: &str, name: &str) -> String {
    if base.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", base, name)
    }
}

fn type_name(attr_type: &AttributeType) -> String {
    match attr_type {
        AttributeType::String => "string".to_string(),
        AttributeType::Int64 => "int64".to_string(),
        AttributeType::Float64 => "float64".to_string(),
        AttributeType::Bool => "bool".to_string(),
        AttributeType::List(element) => format!("list of {}", type_name(element)),
    }
}

fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::AttributeFlags;
    use crate::value::UNKNOWN_VALUE;
    use serde_json::json;

    fn test_schema() -> Schema {
        Schema::v0()
            .with_attribute("id", Attribute::computed_string())
            .with_attribute("name", Attribute::required_string())
            .with_attribute("tags", Attribute::new(
                AttributeType::list(AttributeType::String),
                AttributeFlags::optional(),
            ))
            .with_block(
                "compute",
                NestedBlock::required(
                    Block::new()
                        .with_attribute("instance_size", Attribute::required_string())
                        .with_block(
                            "scaling",
                            NestedBlock::required(
                                Block::new()
                                    .with_attribute("max_replica", Attribute::optional_int64())
                                    .with_attribute("threshold", Attribute::optional_float64()),
                            ),
                        ),
                ),
            )
            .with_block(
                "status",
                NestedBlock::computed(Block::new().with_attribute("state", Attribute::computed_string())),
            )
    }

    fn paths(diagnostics: &Diagnostics) -> Vec<String> {
        diagnostics
            .iter()
            .map(|d| d.attribute.clone().unwrap_or_default())
            .collect()
    }

    #[test]
    fn test_valid_config() {
        let config = json!({
            "name": "ep1",
            "tags": ["dev"],
            "compute": {
                "instance_size": "x1",
                "scaling": {"max_replica": 2, "threshold": 0.5}
            }
        });
        assert!(validate(&test_schema(), &config).is_empty());
        assert!(is_valid(&test_schema(), &config));
    }

    #[test]
    fn test_missing_required_attribute_and_block() {
        let diagnostics = validate(&test_schema(), &json!({"compute": {"scaling": {}}}));
        assert_eq!(paths(&diagnostics), vec!["name", "compute.instance_size"]);

        let diagnostics = validate(&test_schema(), &json!({"name": "ep1"}));
        assert_eq!(paths(&diagnostics), vec!["compute"]);
        assert!(diagnostics
            .iter()
            .all(|d| d.summary.starts_with("Missing required block")));
    }

    #[test]
    fn test_unknown_values_are_accepted() {
        let config = json!({
            "name": UNKNOWN_VALUE,
            "tags": UNKNOWN_VALUE,
            "compute": {
                "instance_size": "x1",
                "scaling": UNKNOWN_VALUE
            }
        });
        assert!(validate(&test_schema(), &config).is_empty());
    }

    #[test]
    fn test_type_errors() {
        let config = json!({
            "name": 7,
            "tags": ["dev", 1],
            "compute": {
                "instance_size": "x1",
                "scaling": {"max_replica": "two", "threshold": true}
            }
        });
        let diagnostics = validate(&test_schema(), &config);
        assert_eq!(
            paths(&diagnostics),
            vec![
                "name",
                "tags[1]",
                "compute.scaling.max_replica",
                "compute.scaling.threshold"
            ]
        );
        assert!(diagnostics
            .iter()
            .all(|d| d.summary == "Incorrect attribute type"));
    }

    #[test]
    fn test_computed_only_values_are_rejected() {
        let config = json!({
            "id": "ns/ep1",
            "name": "ep1",
            "compute": {"instance_size": "x1", "scaling": {}},
            "status": {"state": "running"}
        });
        let diagnostics = validate(&test_schema(), &config);
        assert_eq!(paths(&diagnostics), vec!["id", "status"]);
    }

    #[test]
    fn test_unsupported_attribute() {
        let config = json!({
            "name": "ep1",
            "region": "us-east-1",
            "compute": {"instance_size": "x1", "scaling": {}}
        });
        let diagnostics = validate(&test_schema(), &config);
        assert_eq!(paths(&diagnostics), vec!["region"]);
        assert_eq!(
            diagnostics.iter().next().map(|d| d.summary.as_str()),
            Some("Unsupported attribute")
        );
    }

    #[test]
    fn test_placeholder_blocks_are_skipped() {
        let schema = Schema::v0().with_block(
            "tgi",
            NestedBlock::optional(Block::new().with_attribute("url", Attribute::required_string())),
        );
        assert!(validate(&schema, &json!({"tgi": {"url": null}})).is_empty());
        assert_eq!(
            paths(&validate(&schema, &json!({"tgi": {"url": null, "port": 80}}))),
            vec!["tgi.port", "tgi.url"]
        );
    }

    #[test]
    fn test_validate_result() {
        assert!(validate_result(&test_schema(), &json!({"name": "ep1"})).is_err());
        assert!(validate_result(&test_schema(), &Value::Null).is_ok());
    }

    #[test]
    fn test_fractional_numbers_are_integers() {
        let config = json!({
            "name": "ep1",
            "compute": {"instance_size": "x1", "scaling": {"max_replica": 2.0}}
        });
        assert!(validate(&test_schema(), &config).is_empty());
    }
}
