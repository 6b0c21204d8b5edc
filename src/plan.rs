//! Plan computation over attribute trees.
//!
//! A plan starts from the proposed state and fills in computed values the
//! configuration left null: unknown on create, the prior value on update.
//! Changes are reported per leaf with dotted paths.

use std::collections::BTreeSet;

use serde_json::{Map, Value};

use crate::schema::{Block, BlockNestingMode};
use crate::types::AttributeChange;
use crate::value::unknown;

/// Compute the leaf-level changes between two attribute trees.
///
/// A missing key, a null leaf and an object whose leaves are all null are
/// equivalent, so placeholder objects never show up as changes.
pub fn diff(before: &Value, after: &Value) -> Vec<AttributeChange> {
    let mut changes = Vec::new();
    diff_into("", before, after, &mut changes);
    changes
}

fn diff_into(path: &str, before: &Value, after: &Value, changes: &mut Vec<AttributeChange>) {
    static EMPTY: Value = Value::Null;

    match (before, after) {
        (Value::Object(_), _) | (_, Value::Object(_))
            if is_object_or_null(before) && is_object_or_null(after) =>
        {
            let keys: BTreeSet<&String> = object_keys(before).chain(object_keys(after)).collect();
            for key in keys {
                diff_into(
                    &join_path(path, key),
                    before.get(key.as_str()).unwrap_or(&EMPTY),
                    after.get(key.as_str()).unwrap_or(&EMPTY),
                    changes,
                );
            }
        },
        _ if before == after => {},
        (Value::Null, after) => changes.push(AttributeChange::added(path, after.clone())),
        (before, Value::Null) => changes.push(AttributeChange::removed(path, before.clone())),
        (before, after) => {
            changes.push(AttributeChange::modified(path, before.clone(), after.clone()))
        },
    }
}

fn is_object_or_null(value: &Value) -> bool {
    matches!(value, Value::Object(_) | Value::Null)
}

fn object_keys(value: &Value) -> impl Iterator<Item = &String> {
    value.as_object().into_iter().flat_map(Map::keys)
}

fn join_path(base: &str, name: &str) -> String {
    if base.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", base, name)
    }
}

/// Mark every computed attribute or block left null in `state` as unknown.
pub fn mark_computed_unknown(block: &Block, state: &mut Value) {
    let Some(obj) = state.as_object_mut() else {
        return;
    };

    for (name, attr) in &block.attributes {
        if attr.flags.computed && is_null(obj.get(name)) {
            obj.insert(name.clone(), unknown());
        }
    }

    for (name, nested) in &block.blocks {
        match obj.get_mut(name) {
            None | Some(Value::Null) => {
                if nested.flags.computed {
                    obj.insert(name.clone(), unknown());
                }
            },
            Some(value) => match nested.nesting_mode {
                BlockNestingMode::Single => mark_computed_unknown(&nested.block, value),
                BlockNestingMode::List => {
                    if let Some(items) = value.as_array_mut() {
                        for item in items {
                            mark_computed_unknown(&nested.block, item);
                        }
                    }
                },
            },
        }
    }
}

/// Carry prior values into computed attributes or blocks left null in `state`.
///
/// Returns the paths that were filled from `prior`.
pub fn keep_prior_computed(block: &Block, prior: &Value, state: &mut Value) -> Vec<String> {
    let mut kept = Vec::new();
    keep_prior_into(block, prior, state, "", &mut kept);
    kept
}

fn keep_prior_into(block: &Block, prior: &Value, state: &mut Value, path: &str, kept: &mut Vec<String>) {
    let (Some(prior), Some(obj)) = (prior.as_object(), state.as_object_mut()) else {
        return;
    };

    for (name, attr) in &block.attributes {
        if !attr.flags.computed || !is_null(obj.get(name)) {
            continue;
        }
        if let Some(value) = prior.get(name).filter(|v| !v.is_null()) {
            obj.insert(name.clone(), value.clone());
            kept.push(join_path(path, name));
        }
    }

    for (name, nested) in &block.blocks {
        let prior_value = match prior.get(name) {
            Some(value) if !value.is_null() => value,
            _ => continue,
        };
        match obj.get_mut(name) {
            None | Some(Value::Null) => {
                if nested.flags.computed {
                    obj.insert(name.clone(), prior_value.clone());
                    kept.push(join_path(path, name));
                }
            },
            Some(value) => {
                if nested.nesting_mode == BlockNestingMode::Single {
                    keep_prior_into(&nested.block, prior_value, value, &join_path(path, name), kept);
                }
            },
        }
    }
}

fn is_null(value: Option<&Value>) -> bool {
    matches!(value, None | Some(Value::Null))
}
