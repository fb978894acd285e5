/// Upload tracking state
///
/// One upload may be active at a time. Every upload gets its own id, and
/// progress is only accepted for the id that is currently active, so a
/// transfer that was superseded by a newer capture can never overwrite the
/// newer upload's percentage.

use std::fmt;

use uuid::Uuid;

/// Identifies a single capture-to-upload cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadId(Uuid);

impl UploadId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for UploadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Progress of the active upload, if any.
///
/// Invariants:
/// - `percent()` stays within [0, 100]
/// - `percent()` never decreases while one upload is active
/// - after `finish()`, `in_progress()` is false and `percent()` reads 0
#[derive(Debug, Default)]
pub struct UploadState {
    active: Option<ActiveUpload>,
}

#[derive(Debug)]
struct ActiveUpload {
    id: UploadId,
    percent: f32,
}

impl UploadState {
    /// Start tracking a new upload, superseding any previous one.
    /// Returns the id that progress events must carry to be accepted.
    pub fn begin(&mut self) -> UploadId {
        let id = UploadId::new();
        self.active = Some(ActiveUpload { id, percent: 0.0 });
        id
    }

    pub fn in_progress(&self) -> bool {
        self.active.is_some()
    }

    /// Filled fraction of the progress bar, 0 when idle.
    pub fn percent(&self) -> f32 {
        self.active.as_ref().map_or(0.0, |active| active.percent)
    }

    /// Whether events tagged with `id` belong to the active upload.
    pub fn is_current(&self, id: UploadId) -> bool {
        self.active.as_ref().is_some_and(|active| active.id == id)
    }

    /// Record a progress notification as cumulative byte counts.
    ///
    /// The percentage is clamped to [0, 100] and never moves backwards
    /// within one upload. A zero-byte transfer counts as complete.
    pub fn record_progress(&mut self, transferred: u64, total: u64) {
        if let Some(active) = &mut self.active {
            let percent = if total == 0 {
                100.0
            } else {
                (transferred as f32 / total as f32) * 100.0
            };
            active.percent = active.percent.max(percent.clamp(0.0, 100.0));
        }
    }

    /// Reset after a terminal event, success or error alike.
    pub fn finish(&mut self) {
        self.active = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn begin_starts_at_zero() {
        let mut state = UploadState::default();
        let id = state.begin();

        assert!(state.in_progress());
        assert!(state.is_current(id));
        assert_eq!(state.percent(), 0.0);
    }

    #[test]
    fn progress_is_a_byte_ratio() {
        let mut state = UploadState::default();
        state.begin();

        state.record_progress(50, 200);

        assert_eq!(state.percent(), 25.0);
    }

    #[test]
    fn percent_never_decreases() {
        let mut state = UploadState::default();
        state.begin();

        state.record_progress(100, 200);
        state.record_progress(50, 200);

        assert_eq!(state.percent(), 50.0);
    }

    #[test]
    fn percent_is_clamped_to_100() {
        let mut state = UploadState::default();
        state.begin();

        state.record_progress(400, 200);

        assert_eq!(state.percent(), 100.0);
    }

    #[test]
    fn empty_transfer_counts_as_complete() {
        let mut state = UploadState::default();
        state.begin();

        state.record_progress(0, 0);

        assert_eq!(state.percent(), 100.0);
    }

    #[test]
    fn finish_resets_everything() {
        let mut state = UploadState::default();
        let id = state.begin();
        state.record_progress(150, 200);

        state.finish();

        assert!(!state.in_progress());
        assert_eq!(state.percent(), 0.0);
        assert!(!state.is_current(id));
    }

    #[test]
    fn superseded_upload_id_is_no_longer_current() {
        let mut state = UploadState::default();
        let first = state.begin();
        let second = state.begin();

        assert!(!state.is_current(first));
        assert!(state.is_current(second));

        // A stale notification leaves the new upload untouched.
        assert_eq!(state.percent(), 0.0);
    }

    #[test]
    fn progress_without_active_upload_is_ignored() {
        let mut state = UploadState::default();

        state.record_progress(50, 100);

        assert!(!state.in_progress());
        assert_eq!(state.percent(), 0.0);
    }
}
