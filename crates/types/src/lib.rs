// crates/types/src/lib.rs
//! Shared vocabulary for the report portal: sites, categories, report keys,
//! upload decisions and the wire shapes exchanged with the backend.

pub mod auth;
pub mod category;
pub mod error;
pub mod report;
pub mod site;
pub mod upload;

pub use auth::*;
pub use category::*;
pub use error::*;
pub use report::*;
pub use site::*;
pub use upload::*;
