pub mod error;
pub mod model;

pub use error::ItemError;
pub use model::{
    BatchPhase, BatchResult, DownloadTarget, ItemOutcome, ItemStatus, Notice, NoticeLevel,
};
