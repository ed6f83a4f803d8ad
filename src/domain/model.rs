use std::path::PathBuf;

use crate::domain::ItemError;
use crate::utils::filename_for;

/// One result image queued for download. Built once when the batch is
/// invoked and immutable for the duration of the run.
#[derive(Debug, Clone)]
pub struct DownloadTarget {
    pub source_url: String,
    pub suggested_filename: String,
}

impl DownloadTarget {
    /// Assigns filenames by 1-based position ("photo-1.jpg", "photo-2.jpg", ...)
    /// regardless of what the source URLs are called.
    pub fn numbered<I>(urls: I) -> Vec<Self>
    where
        I: IntoIterator<Item = String>,
    {
        urls.into_iter()
            .enumerate()
            .map(|(index, source_url)| Self {
                source_url,
                suggested_filename: filename_for(index + 1),
            })
            .collect()
    }
}

/// Outcome of a single item, kept in input order inside [`BatchResult`].
#[derive(Debug, Clone)]
pub struct ItemOutcome {
    /// 1-based position in the batch.
    pub position: usize,
    pub filename: String,
    pub status: ItemStatus,
}

#[derive(Debug, Clone)]
pub enum ItemStatus {
    Saved(PathBuf),
    Failed(ItemError),
}

impl ItemOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self.status, ItemStatus::Saved(_))
    }
}

/// Aggregate counters for one batch run. Discarded once the summary
/// notice has been shown.
#[derive(Debug, Clone, Default)]
pub struct BatchResult {
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub outcomes: Vec<ItemOutcome>,
}

impl BatchResult {
    pub fn from_outcomes(outcomes: Vec<ItemOutcome>) -> Self {
        let succeeded = outcomes.iter().filter(|o| o.is_saved()).count();
        Self {
            attempted: outcomes.len(),
            succeeded,
            failed: outcomes.len() - succeeded,
            outcomes,
        }
    }
}

/// User-facing notification emitted by the batch workflow.
#[derive(Debug, Clone)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchPhase {
    Idle,
    Discovering,
    Downloading,
}
