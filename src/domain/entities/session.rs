//! Download session state published to observers.

use chrono::{DateTime, Utc};

/// Snapshot of the bulk download state.
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadSession {
    /// Fraction of the manifest accounted for, in `[0, 1]`.
    pub progress: f64,
    /// True between session start and session end.
    pub is_downloading: bool,
    /// Property of the most recent session, if any ran.
    pub property_slug: Option<String>,
    /// When the most recent session started.
    pub started_at: Option<DateTime<Utc>>,
    /// When the most recent session finished.
    pub finished_at: Option<DateTime<Utc>>,
}

impl DownloadSession {
    /// Idle state before any session has run.
    #[must_use]
    pub const fn idle() -> Self {
        Self {
            progress: 0.0,
            is_downloading: false,
            property_slug: None,
            started_at: None,
            finished_at: None,
        }
    }

    /// State at the beginning of a session.
    #[must_use]
    pub fn started(property_slug: &str) -> Self {
        Self {
            progress: 0.0,
            is_downloading: true,
            property_slug: Some(property_slug.to_string()),
            started_at: Some(Utc::now()),
            finished_at: None,
        }
    }

    /// Marks the session finished; progress is forced to 1.0.
    pub fn finish(&mut self) {
        self.progress = 1.0;
        self.is_downloading = false;
        self.finished_at = Some(Utc::now());
    }
}

impl Default for DownloadSession {
    fn default() -> Self {
        Self::idle()
    }
}

/// Outcome counters for one session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DownloadReport {
    /// Photos listed in the manifest.
    pub total: usize,
    /// Photos downloaded and stored during this session.
    pub fetched: usize,
    /// Photos already on disk.
    pub skipped: usize,
    /// Photos that could not be fetched or stored.
    pub failed: usize,
    /// True if the manifest itself could not be retrieved.
    pub manifest_failed: bool,
}

impl std::fmt::Display for DownloadReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.manifest_failed {
            return write!(f, "manifest unavailable");
        }
        write!(
            f,
            "{} photos: {} fetched, {} cached, {} failed",
            self.total, self.fetched, self.skipped, self.failed
        )
    }
}
