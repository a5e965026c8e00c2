//! Releases domain - the DRAFT -> PROCESSING -> PENDING_REVIEW ->
//! PUBLISHED | REJECTED lifecycle and everything editable along the way.

pub mod actions;
pub mod completeness;
pub mod errors;
pub mod models;

pub use completeness::TrackCompleteness;
pub use errors::{ReleaseError, StoreError};
pub use models::{Release, ReleaseStatus, Track};
