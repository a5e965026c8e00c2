// TestDependencies - in-memory implementations for testing
//
// Provides a release store that can be injected into ServerDeps for tests
// without a database.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;

use super::{BaseReleaseStore, ServerDeps};
use crate::common::{ArtistId, ReleaseId, TrackId};
use crate::domains::auth::JwtService;
use crate::domains::releases::completeness::TrackCompleteness;
use crate::domains::releases::errors::StoreError;
use crate::domains::releases::models::{
    AssetRef, NewRelease, NewTrack, Release, ReleaseStatus, Track, TrackUpdate,
    TransitionAttempt,
};

// =============================================================================
// In-memory Release Store
// =============================================================================

/// A status change that actually applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppliedTransition {
    pub release_id: ReleaseId,
    pub from: ReleaseStatus,
    pub to: ReleaseStatus,
}

/// A competing write that lands just before a release's next status change
/// is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interleaved {
    /// Another caller moves the release to this status first.
    Status(ReleaseStatus),
    /// Every track of the release is deleted first.
    ClearTracks,
}

#[derive(Default)]
struct State {
    releases: HashMap<ReleaseId, (u64, Release)>,
    tracks: Vec<Track>,
    next_seq: u64,
    transitions: Vec<AppliedTransition>,
    failing_completeness: HashSet<ReleaseId>,
    interleaved: HashMap<ReleaseId, Interleaved>,
}

impl State {
    fn sorted_releases<'a>(&'a self, filter: impl Fn(&Release) -> bool) -> Vec<&'a (u64, Release)> {
        let mut rows: Vec<&(u64, Release)> =
            self.releases.values().filter(|(_, r)| filter(r)).collect();
        rows.sort_by(|(sa, a), (sb, b)| a.created_at.cmp(&b.created_at).then(sa.cmp(sb)));
        rows
    }

    fn is_draft(&self, release_id: ReleaseId) -> bool {
        self.releases
            .get(&release_id)
            .map(|(_, r)| r.status == ReleaseStatus::Draft)
            .unwrap_or(false)
    }

    fn set_status(&mut self, release_id: ReleaseId, next: ReleaseStatus) {
        if let Some((_, release)) = self.releases.get_mut(&release_id) {
            let from = release.status;
            release.status = next;
            self.transitions.push(AppliedTransition {
                release_id,
                from,
                to: next,
            });
        }
    }

    fn run_interleaved(&mut self, release_id: ReleaseId) {
        match self.interleaved.remove(&release_id) {
            Some(Interleaved::Status(status)) => self.set_status(release_id, status),
            Some(Interleaved::ClearTracks) => self.tracks.retain(|t| t.release_id != release_id),
            None => {}
        }
    }

    fn isrc_taken(&self, isrc: &str, except: Option<TrackId>) -> bool {
        self.tracks
            .iter()
            .any(|t| t.isrc == isrc && Some(t.id) != except)
    }
}

/// Release store held in process memory.
///
/// One mutex guards all state and is released before returning, so each
/// method is an atomic check-and-set just like the SQL statements.
#[derive(Clone, Default)]
pub struct InMemoryReleaseStore {
    state: Arc<Mutex<State>>,
}

impl InMemoryReleaseStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every status change that applied, in order.
    pub fn applied_transitions(&self) -> Vec<AppliedTransition> {
        self.state.lock().unwrap().transitions.clone()
    }

    /// Make `track_completeness` fail for this release.
    pub fn fail_completeness_for(&self, release_id: ReleaseId) {
        self.state
            .lock()
            .unwrap()
            .failing_completeness
            .insert(release_id);
    }

    /// Set a track's audio without the DRAFT guard, like a late storage
    /// callback landing after submission.
    pub fn force_track_audio(&self, track_id: TrackId, audio: AssetRef) {
        let mut state = self.state.lock().unwrap();
        if let Some(track) = state.tracks.iter_mut().find(|t| t.id == track_id) {
            track.audio = Some(audio);
        }
    }

    /// Apply `write` inside the next status change of this release, after the
    /// caller has read the release but before its condition is checked.
    pub fn interleave_before_transition(&self, release_id: ReleaseId, write: Interleaved) {
        self.state
            .lock()
            .unwrap()
            .interleaved
            .insert(release_id, write);
    }

    pub fn status_of(&self, release_id: ReleaseId) -> Option<ReleaseStatus> {
        self.state
            .lock()
            .unwrap()
            .releases
            .get(&release_id)
            .map(|(_, r)| r.status)
    }
}

#[async_trait]
impl BaseReleaseStore for InMemoryReleaseStore {
    async fn get_release(&self, release_id: ReleaseId) -> Result<Option<Release>, StoreError> {
        let state = self.state.lock().unwrap();
        Ok(state.releases.get(&release_id).map(|(_, r)| r.clone()))
    }

    async fn conditional_transition(
        &self,
        release_id: ReleaseId,
        expected: Option<ReleaseStatus>,
        next: ReleaseStatus,
    ) -> Result<bool, StoreError> {
        let mut state = self.state.lock().unwrap();
        state.run_interleaved(release_id);
        let Some((_, release)) = state.releases.get(&release_id) else {
            return Ok(false);
        };
        if expected.is_some_and(|e| e != release.status) {
            return Ok(false);
        }
        // Domain code always names the expected state; tests may force any status.
        debug_assert!(expected.map_or(true, |e| e.can_transition_to(next)));
        state.set_status(release_id, next);
        Ok(true)
    }

    async fn submit_transition(&self, release_id: ReleaseId) -> Result<bool, StoreError> {
        let mut state = self.state.lock().unwrap();
        state.run_interleaved(release_id);
        if !state.is_draft(release_id) {
            return Ok(false);
        }
        let mut tracks = state.tracks.iter().filter(|t| t.release_id == release_id);
        let complete = match tracks.next() {
            Some(first) => first.has_audio() && tracks.all(|t| t.has_audio()),
            None => false,
        };
        if !complete {
            return Ok(false);
        }
        state.set_status(release_id, ReleaseStatus::Processing);
        Ok(true)
    }

    async fn review_transition(
        &self,
        release_id: ReleaseId,
        next: ReleaseStatus,
    ) -> Result<TransitionAttempt, StoreError> {
        let exists = self.state.lock().unwrap().releases.contains_key(&release_id);
        if !exists {
            return Ok(TransitionAttempt::NotFound);
        }
        // Releases are never deleted, so existence cannot change in between.
        let applied = self
            .conditional_transition(release_id, Some(ReleaseStatus::PendingReview), next)
            .await?;
        Ok(if applied {
            TransitionAttempt::Applied
        } else {
            TransitionAttempt::Rejected
        })
    }

    async fn list_releases_by_status(
        &self,
        status: ReleaseStatus,
        limit: i64,
    ) -> Result<Vec<Release>, StoreError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .sorted_releases(|r| r.status == status)
            .into_iter()
            .take(usize::try_from(limit).unwrap_or(0))
            .map(|(_, r)| r.clone())
            .collect())
    }

    async fn track_completeness(
        &self,
        release_id: ReleaseId,
    ) -> Result<TrackCompleteness, StoreError> {
        let state = self.state.lock().unwrap();
        if state.failing_completeness.contains(&release_id) {
            return Err(StoreError::Timeout(std::time::Duration::from_millis(0)));
        }
        let tracks: Vec<&Track> = state
            .tracks
            .iter()
            .filter(|t| t.release_id == release_id)
            .collect();
        let with_audio = tracks.iter().filter(|t| t.has_audio()).count();
        Ok(TrackCompleteness::from_counts(
            tracks.len() as i64,
            with_audio as i64,
        ))
    }

    async fn create_release(&self, new: NewRelease) -> Result<Release, StoreError> {
        let mut state = self.state.lock().unwrap();
        let release = Release {
            id: ReleaseId::new(),
            artist_id: new.artist_id,
            title: new.title,
            genre: new.genre,
            status: ReleaseStatus::Draft,
            cover_art: None,
            created_at: Utc::now(),
        };
        let seq = state.next_seq;
        state.next_seq += 1;
        state.releases.insert(release.id, (seq, release.clone()));
        Ok(release)
    }

    async fn list_releases_for_artist(
        &self,
        artist_id: ArtistId,
    ) -> Result<Vec<Release>, StoreError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .sorted_releases(|r| r.artist_id == artist_id)
            .into_iter()
            .rev()
            .map(|(_, r)| r.clone())
            .collect())
    }

    async fn list_releases(
        &self,
        status: Option<ReleaseStatus>,
    ) -> Result<Vec<Release>, StoreError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .sorted_releases(|r| status.map_or(true, |s| r.status == s))
            .into_iter()
            .rev()
            .map(|(_, r)| r.clone())
            .collect())
    }

    async fn update_release_draft(
        &self,
        release_id: ReleaseId,
        title: &str,
        genre: &str,
    ) -> Result<bool, StoreError> {
        let mut state = self.state.lock().unwrap();
        match state.releases.get_mut(&release_id) {
            Some((_, r)) if r.status == ReleaseStatus::Draft => {
                r.title = title.to_string();
                r.genre = genre.to_string();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn set_cover_art(
        &self,
        release_id: ReleaseId,
        cover_art: AssetRef,
    ) -> Result<bool, StoreError> {
        let mut state = self.state.lock().unwrap();
        match state.releases.get_mut(&release_id) {
            Some((_, r)) if r.status == ReleaseStatus::Draft => {
                r.cover_art = Some(cover_art);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn create_track(
        &self,
        release_id: ReleaseId,
        new: NewTrack,
    ) -> Result<Option<Track>, StoreError> {
        let mut state = self.state.lock().unwrap();
        if !state.is_draft(release_id) {
            return Ok(None);
        }
        if state.isrc_taken(&new.isrc, None) {
            return Err(StoreError::Conflict("tracks_isrc_unique".to_string()));
        }
        let track = Track {
            id: TrackId::new(),
            release_id,
            title: new.title,
            isrc: new.isrc,
            duration_seconds: new.duration_seconds,
            audio: None,
            created_at: Utc::now(),
        };
        state.tracks.push(track.clone());
        Ok(Some(track))
    }

    async fn list_tracks(&self, release_id: ReleaseId) -> Result<Vec<Track>, StoreError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .tracks
            .iter()
            .filter(|t| t.release_id == release_id)
            .cloned()
            .collect())
    }

    async fn update_track(
        &self,
        release_id: ReleaseId,
        track_id: TrackId,
        update: TrackUpdate,
    ) -> Result<bool, StoreError> {
        let mut state = self.state.lock().unwrap();
        if !state.is_draft(release_id) {
            return Ok(false);
        }
        if let Some(isrc) = &update.isrc {
            if state.isrc_taken(isrc, Some(track_id)) {
                return Err(StoreError::Conflict("tracks_isrc_unique".to_string()));
            }
        }
        let Some(track) = state
            .tracks
            .iter_mut()
            .find(|t| t.id == track_id && t.release_id == release_id)
        else {
            return Ok(false);
        };
        track.title = update.title;
        if let Some(isrc) = update.isrc {
            track.isrc = isrc;
        }
        if update.duration_seconds.is_some() {
            track.duration_seconds = update.duration_seconds;
        }
        Ok(true)
    }

    async fn delete_track(
        &self,
        release_id: ReleaseId,
        track_id: TrackId,
    ) -> Result<bool, StoreError> {
        let mut state = self.state.lock().unwrap();
        if !state.is_draft(release_id) {
            return Ok(false);
        }
        let before = state.tracks.len();
        state
            .tracks
            .retain(|t| !(t.id == track_id && t.release_id == release_id));
        Ok(state.tracks.len() < before)
    }

    async fn attach_track_audio(
        &self,
        release_id: ReleaseId,
        track_id: TrackId,
        audio: AssetRef,
    ) -> Result<bool, StoreError> {
        let mut state = self.state.lock().unwrap();
        if !state.is_draft(release_id) {
            return Ok(false);
        }
        match state
            .tracks
            .iter_mut()
            .find(|t| t.id == track_id && t.release_id == release_id)
        {
            Some(track) => {
                track.audio = Some(audio);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

// =============================================================================
// TestDependencies
// =============================================================================

pub const TEST_JWT_SECRET: &str = "test_secret_key";
pub const TEST_JWT_ISSUER: &str = "test_issuer";

/// ServerDeps wired to an in-memory store, with a handle on the store for
/// assertions.
pub struct TestDependencies {
    pub store: InMemoryReleaseStore,
    pub deps: ServerDeps,
    isrc_counter: AtomicU32,
}

impl TestDependencies {
    pub fn new() -> Self {
        let store = InMemoryReleaseStore::new();
        let deps = ServerDeps::new(
            Arc::new(store.clone()),
            Arc::new(JwtService::new(TEST_JWT_SECRET, TEST_JWT_ISSUER.to_string())),
        );
        Self {
            store,
            deps,
            isrc_counter: AtomicU32::new(1),
        }
    }

    /// Insert a DRAFT release owned by `artist_id`.
    pub async fn draft_release(&self, artist_id: ArtistId) -> Release {
        self.store
            .create_release(NewRelease {
                artist_id,
                title: "Test Release".to_string(),
                genre: "Electronic".to_string(),
            })
            .await
            .expect("in-memory create never fails")
    }

    /// Add a track with a fresh ISRC, optionally with audio already attached.
    /// The release must still be DRAFT.
    pub async fn add_track(&self, release_id: ReleaseId, with_audio: bool) -> Track {
        let n = self.isrc_counter.fetch_add(1, Ordering::SeqCst);
        let track = self
            .store
            .create_track(
                release_id,
                NewTrack {
                    title: format!("Track {n}"),
                    isrc: format!("USTST{n:07}"),
                    duration_seconds: Some(180),
                },
            )
            .await
            .expect("in-memory create never fails")
            .expect("release must be DRAFT");

        if with_audio {
            self.attach_audio(release_id, track.id).await;
        }
        track
    }

    pub async fn attach_audio(&self, release_id: ReleaseId, track_id: TrackId) {
        let applied = self
            .store
            .attach_track_audio(
                release_id,
                track_id,
                AssetRef {
                    object_key: format!("releases/{release_id}/tracks/{track_id}/audio/take.wav"),
                    public_url: None,
                },
            )
            .await
            .expect("in-memory attach never fails");
        assert!(applied, "release must be DRAFT to attach audio");
    }
}

impl Default for TestDependencies {
    fn default() -> Self {
        Self::new()
    }
}
