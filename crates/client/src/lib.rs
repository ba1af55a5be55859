// crates/client/src/lib.rs
//! HTTP implementation of the report portal gateways.

pub mod config;
pub mod http;

pub use config::ClientConfig;
pub use http::PortalClient;
