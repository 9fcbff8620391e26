//! Servlet and filter resolution library

pub mod config;
pub mod descriptor;
pub mod observability;
pub mod registry;
pub mod request;
pub mod resource_type;
pub mod routing;

pub use config::schema::ResolverConfig;
pub use registry::{BindingRegistry, Snapshot};
pub use request::RequestDescriptor;
pub use routing::MatchResult;
