//! Managed resources.

pub mod endpoint;

pub use endpoint::EndpointResource;
