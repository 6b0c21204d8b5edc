//! Values returned by [`crate::ProviderService`] calls.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One leaf that differs between the prior and the planned state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeChange {
    /// Dotted path of the leaf, with `[i]` for list items.
    pub path: String,
    /// Prior value; `None` when the leaf was unset.
    pub before: Option<Value>,
    /// Planned value; `None` when the leaf becomes unset.
    pub after: Option<Value>,
}

impl AttributeChange {
    /// A leaf that goes from `before` to `after`.
    pub fn new(path: impl Into<String>, before: Option<Value>, after: Option<Value>) -> Self {
        Self {
            path: path.into(),
            before,
            after,
        }
    }

    /// A leaf that becomes set.
    pub fn added(path: impl Into<String>, value: Value) -> Self {
        Self::new(path, None, Some(value))
    }

    /// A leaf that becomes unset.
    pub fn removed(path: impl Into<String>, value: Value) -> Self {
        Self::new(path, Some(value), None)
    }

    /// A leaf whose value changes.
    pub fn modified(path: impl Into<String>, before: Value, after: Value) -> Self {
        Self::new(path, Some(before), Some(after))
    }

    /// Whether the planned value is not known until apply.
    pub fn is_deferred(&self) -> bool {
        self.after.as_ref().is_some_and(crate::value::is_unknown)
    }
}

/// Outcome of [`crate::ProviderService::plan`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanResult {
    /// State the resource will have after apply. Null for a delete.
    pub planned_state: Value,
    /// Leaves that differ from the prior state.
    pub changes: Vec<AttributeChange>,
    /// Whether apply has to destroy and recreate the resource.
    pub requires_replace: bool,
}

impl PlanResult {
    /// A plan that leaves the resource as it is.
    pub fn no_change(state: Value) -> Self {
        Self::with_changes(state, Vec::new(), false)
    }

    /// A plan that applies `changes`.
    pub fn with_changes(planned_state: Value, changes: Vec<AttributeChange>, requires_replace: bool) -> Self {
        Self {
            planned_state,
            changes,
            requires_replace,
        }
    }

    /// Whether the plan changes anything.
    pub fn has_changes(&self) -> bool {
        !self.changes.is_empty()
    }

    /// Paths of every changed leaf.
    pub fn changed_paths(&self) -> impl Iterator<Item = &str> {
        self.changes.iter().map(|c| c.path.as_str())
    }
}

/// A remote object adopted by [`crate::ProviderService::import_resource`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportedResource {
    /// Resource type the state belongs to.
    pub resource_type: String,
    /// State read from the remote object.
    pub state: Value,
}

impl ImportedResource {
    /// Pair a state with its resource type.
    pub fn new(resource_type: impl Into<String>, state: Value) -> Self {
        Self {
            resource_type: resource_type.into(),
            state,
        }
    }
}

/// Type names served by a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ProviderMetadata {
    /// Provider type name, the prefix of every resource type.
    pub type_name: String,
    /// Resource type names.
    pub resources: Vec<String>,
    /// Data source type names.
    pub data_sources: Vec<String>,
}
