// crates/types/src/error.rs
use thiserror::Error;

/// A free-form value (path segment, form field, wire string) that does not
/// name a member of one of the enumerated domain sets.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidValue {
    #[error("Unknown site: {0}")]
    Site(String),

    #[error("Unknown report category: {0}")]
    Category(String),

    #[error("Invalid report date: {0}")]
    Date(String),
}
