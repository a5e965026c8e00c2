pub mod release;
pub mod track;

pub use release::{AssetRef, NewRelease, Release, ReleaseStatus, TransitionAttempt};
pub use track::{NewTrack, Track, TrackUpdate};
