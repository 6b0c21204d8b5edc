//! Data sources.

pub mod endpoints;

pub use endpoints::EndpointsDataSource;
