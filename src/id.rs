//! Composite endpoint identifiers of the form `<namespace>/<name>`.

use std::fmt;
use std::str::FromStr;

use crate::error::ProviderError;

/// Identifies an endpoint within the API.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EndpointId {
    /// Owning user or organization.
    pub namespace: String,
    /// Endpoint name, unique within the namespace.
    pub name: String,
}

impl EndpointId {
    /// Build an id from its parts.
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for EndpointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

impl FromStr for EndpointId {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split('/');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(namespace), Some(name), None) if !namespace.is_empty() && !name.is_empty() => {
                Ok(Self::new(namespace, name))
            },
            _ => Err(ProviderError::InvalidId(format!(
                "expected \"<namespace>/<name>\", got {:?}",
                s
            ))),
        }
    }
}
