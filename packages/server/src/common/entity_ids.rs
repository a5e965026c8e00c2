//! Typed ID definitions for the release domain.
//!
//! ```rust
//! use release_core::common::{ReleaseId, TrackId};
//!
//! let release_id = ReleaseId::new();
//! let track_id = TrackId::new();
//! // let wrong: TrackId = release_id; // compile error
//! # let _ = (release_id, track_id);
//! ```

pub use super::id::Id;

// ============================================================================
// Entity marker types
// ============================================================================

/// Marker type for users (artists and admins share one identity space).
pub struct User;

/// Marker type for Release entities.
pub struct Release;

/// Marker type for Track entities.
pub struct Track;

// ============================================================================
// Type aliases
// ============================================================================

/// Typed ID for users.
pub type UserId = Id<User>;

/// A user acting as the owner of releases.
pub type ArtistId = UserId;

/// Typed ID for Release entities.
pub type ReleaseId = Id<Release>;

/// Typed ID for Track entities.
pub type TrackId = Id<Track>;
