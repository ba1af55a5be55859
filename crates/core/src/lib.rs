// crates/core/src/lib.rs
pub mod cache;
pub mod error;
pub mod gateway;
pub mod navigation;
pub mod paths;
pub mod portal;
pub mod resolver;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;

pub use cache::ReportCache;
pub use error::*;
pub use gateway::*;
pub use navigation::*;
pub use portal::*;
pub use resolver::{
    ConflictSummary, UploadForm, UploadOutcome, UploadPhase, UploadResolver, UploadStatus,
};
pub use session::*;
