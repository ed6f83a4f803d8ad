pub mod batch_downloader;
pub mod staging;

pub use batch_downloader::{BatchDownloader, BatchEvent, BatchObserver};
