//! Release domain actions - business logic functions
//!
//! Routes and the promotion sweep call these; every status change goes
//! through one conditional store write.

pub mod access;
pub mod drafts;
pub mod promote;
pub mod review;
pub mod submit;
pub mod tracks;
pub mod uploads;

pub use access::find_release_for_actor;
pub use drafts::{create_release, get_release, list_releases_for_artist, update_release_draft};
pub use promote::{promote_ready_releases_once, SweepReport};
pub use review::{
    approve_release, list_pending_review, list_releases_admin, reject_release, review_release,
    ReviewDecision,
};
pub use submit::{submit_release, SubmitOutcome};
pub use tracks::{create_track, delete_track, list_tracks, update_track};
pub use uploads::{finalize_cover_art, finalize_track_audio};
