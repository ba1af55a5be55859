// crates/core/src/resolver/mod.rs
//! Upload conflict resolution.
//!
//! Before uploading, the resolver asks the backend whether a report already
//! exists for the (site, category, date) key. If one does, the upload is
//! parked until the user chooses override, save-as-new or cancel; no upload
//! call is made before that choice.
//!
//! ```text
//! Idle -> CheckingExisting -> Uploading -> Done | Failed
//!                          \-> AwaitingDecision -> Uploading | Idle (cancel)
//! ```

pub mod types;
pub mod workflow;

pub use types::{ConflictSummary, UploadForm, UploadOutcome, UploadPhase, UploadStatus};
pub use workflow::UploadResolver;
