use std::path::{Path, PathBuf};
use std::time::Duration;

use futures::{stream::BoxStream, StreamExt};

use crate::{
    api::GalleryClient,
    application::staging::StagedPhoto,
    domain::{BatchResult, DownloadTarget, ItemError, ItemOutcome, ItemStatus, Notice},
};

/// Delay between consecutive items, so a long batch does not hammer the
/// server with back-to-back requests.
pub const PACING_INTERVAL: Duration = Duration::from_millis(300);

/// Progress reported while a batch is running.
#[derive(Debug, Clone)]
pub enum BatchEvent {
    Notice(Notice),
    ItemFinished {
        outcome: ItemOutcome,
        completed: usize,
        total: usize,
    },
    Finished(BatchResult),
}

/// Sink for batch notifications, so the workflow stays independent of any
/// particular UI. Notices are the only user-visible output of a run.
pub trait BatchObserver: Send + Sync {
    fn notice(&self, notice: Notice);
    fn item_finished(&self, outcome: &ItemOutcome, total: usize);
}

/// Downloads a batch of result photos strictly sequentially, in input
/// order. A single item failing never aborts the run; failures are logged,
/// counted, and skipped over.
#[derive(Clone)]
pub struct BatchDownloader {
    client: GalleryClient,
    pacing: Duration,
}

impl BatchDownloader {
    pub fn new(client: GalleryClient) -> Self {
        Self {
            client,
            pacing: PACING_INTERVAL,
        }
    }

    pub fn with_pacing(client: GalleryClient, pacing: Duration) -> Self {
        Self { client, pacing }
    }

    /// Run the whole batch and return the aggregate result.
    ///
    /// An empty batch emits one warning notice and performs no network
    /// activity. A non-empty batch emits an info notice up front, then
    /// exactly one success notice at the end reporting the attempted count.
    pub async fn run_batch(
        &self,
        targets: Vec<DownloadTarget>,
        dest: &Path,
        observer: &dyn BatchObserver,
    ) -> BatchResult {
        let mut stream = self.batch_stream(targets, dest.to_path_buf());
        let mut result = BatchResult::default();

        while let Some(event) = stream.next().await {
            match event {
                BatchEvent::Notice(notice) => observer.notice(notice),
                BatchEvent::ItemFinished { outcome, total, .. } => {
                    observer.item_finished(&outcome, total)
                }
                BatchEvent::Finished(batch_result) => result = batch_result,
            }
        }

        result
    }

    /// The batch as an event stream, for consumers that want mid-run
    /// progress. The stream is lazy; nothing happens until it is polled.
    pub fn batch_stream(
        &self,
        targets: Vec<DownloadTarget>,
        dest: PathBuf,
    ) -> BoxStream<'static, BatchEvent> {
        futures::stream::unfold(
            BatchState::Start {
                downloader: self.clone(),
                targets,
                dest,
            },
            |state| async move {
                match state {
                    BatchState::Start {
                        downloader,
                        targets,
                        dest,
                    } => {
                        if targets.is_empty() {
                            return Some((
                                BatchEvent::Notice(Notice::warning("No photos to download")),
                                BatchState::Done {
                                    result: BatchResult::default(),
                                },
                            ));
                        }

                        Some((
                            BatchEvent::Notice(Notice::info(
                                "Downloading photos... This may take a moment",
                            )),
                            BatchState::Running {
                                downloader,
                                targets,
                                dest,
                                next: 0,
                                outcomes: Vec::new(),
                            },
                        ))
                    }
                    BatchState::Running {
                        downloader,
                        targets,
                        dest,
                        next,
                        mut outcomes,
                    } => {
                        // Pace every item after the first; no delay trails
                        // the last one.
                        if next > 0 {
                            tokio::time::sleep(downloader.pacing).await;
                        }

                        let outcome = downloader.download_one(next + 1, &targets[next], &dest).await;
                        outcomes.push(outcome.clone());

                        let completed = next + 1;
                        let total = targets.len();
                        let event = BatchEvent::ItemFinished {
                            outcome,
                            completed,
                            total,
                        };

                        if completed == total {
                            Some((
                                event,
                                BatchState::Summary {
                                    result: BatchResult::from_outcomes(outcomes),
                                },
                            ))
                        } else {
                            Some((
                                event,
                                BatchState::Running {
                                    downloader,
                                    targets,
                                    dest,
                                    next: completed,
                                    outcomes,
                                },
                            ))
                        }
                    }
                    BatchState::Summary { result } => {
                        tracing::info!(
                            attempted = result.attempted,
                            succeeded = result.succeeded,
                            failed = result.failed,
                            "batch finished"
                        );
                        if result.failed > 0 {
                            let failed_positions = result
                                .outcomes
                                .iter()
                                .filter(|o| !o.is_saved())
                                .map(|o| o.position)
                                .collect::<Vec<_>>();
                            tracing::debug!(?failed_positions, "items that failed");
                        }

                        // The notice reports the attempted count, matching
                        // the site's observed behavior even when items failed.
                        Some((
                            BatchEvent::Notice(Notice::success(format!(
                                "Downloaded {} photos successfully!",
                                result.attempted
                            ))),
                            BatchState::Done { result },
                        ))
                    }
                    BatchState::Done { result } => {
                        Some((BatchEvent::Finished(result), BatchState::Finished))
                    }
                    BatchState::Finished => None,
                }
            },
        )
        .boxed()
    }

    async fn download_one(&self, position: usize, target: &DownloadTarget, dest: &Path) -> ItemOutcome {
        let status = match self.try_download(target, dest).await {
            Ok(path) => ItemStatus::Saved(path),
            Err(error) => {
                tracing::warn!(
                    url = %target.source_url,
                    filename = %target.suggested_filename,
                    %error,
                    "photo download failed"
                );
                ItemStatus::Failed(error)
            }
        };

        ItemOutcome {
            position,
            filename: target.suggested_filename.clone(),
            status,
        }
    }

    async fn try_download(
        &self,
        target: &DownloadTarget,
        dest: &Path,
    ) -> Result<PathBuf, ItemError> {
        let (_total, stream) = self
            .client
            .fetch_image_stream(&target.source_url)
            .await
            .map_err(|e| ItemError::Retrieval(e.to_string()))?;

        // Dropping the staged file on any early return below removes the
        // part file, so failures never leak half-written photos.
        let mut staged = StagedPhoto::create(dest, &target.suggested_filename)
            .await
            .map_err(|e| ItemError::Save(e.to_string()))?;

        let mut stream = stream.boxed();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| ItemError::Retrieval(e.to_string()))?;
            staged
                .write(&chunk)
                .await
                .map_err(|e| ItemError::Save(e.to_string()))?;
        }

        staged
            .persist()
            .await
            .map_err(|e| ItemError::Save(e.to_string()))
    }
}

enum BatchState {
    Start {
        downloader: BatchDownloader,
        targets: Vec<DownloadTarget>,
        dest: PathBuf,
    },
    Running {
        downloader: BatchDownloader,
        targets: Vec<DownloadTarget>,
        dest: PathBuf,
        next: usize,
        outcomes: Vec<ItemOutcome>,
    },
    Summary {
        result: BatchResult,
    },
    Done {
        result: BatchResult,
    },
    Finished,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ClientConfig;
    use crate::domain::NoticeLevel;
    use std::sync::Mutex;
    use std::time::Instant;

    #[derive(Default)]
    struct RecordingObserver {
        notices: Mutex<Vec<Notice>>,
        items: Mutex<Vec<(usize, bool)>>,
    }

    impl BatchObserver for RecordingObserver {
        fn notice(&self, notice: Notice) {
            self.notices.lock().unwrap().push(notice);
        }

        fn item_finished(&self, outcome: &ItemOutcome, _total: usize) {
            self.items
                .lock()
                .unwrap()
                .push((outcome.position, outcome.is_saved()));
        }
    }

    fn downloader() -> BatchDownloader {
        BatchDownloader::with_pacing(
            GalleryClient::new(ClientConfig::default()),
            Duration::from_millis(10),
        )
    }

    fn targets_for(server: &mockito::ServerGuard, paths: &[&str]) -> Vec<DownloadTarget> {
        DownloadTarget::numbered(
            paths
                .iter()
                .map(|p| format!("{}{}", server.url(), p))
                .collect::<Vec<_>>(),
        )
    }

    #[tokio::test]
    async fn test_empty_batch_short_circuits() {
        let dir = tempfile::tempdir().unwrap();
        let observer = RecordingObserver::default();

        let result = downloader()
            .run_batch(Vec::new(), dir.path(), &observer)
            .await;

        assert_eq!(result.attempted, 0);
        assert_eq!(result.succeeded, 0);
        assert_eq!(result.failed, 0);

        let notices = observer.notices.lock().unwrap();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].level, NoticeLevel::Warning);
        assert_eq!(notices[0].message, "No photos to download");
        assert!(observer.items.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_downloads_all_photos_in_order() {
        let mut server = mockito::Server::new_async().await;
        let mocks = [
            server.mock("GET", "/p1.jpg").with_body("one").create_async().await,
            server.mock("GET", "/p2.jpg").with_body("two").create_async().await,
            server.mock("GET", "/p3.jpg").with_body("three").create_async().await,
        ];
        let dir = tempfile::tempdir().unwrap();
        let observer = RecordingObserver::default();

        let result = downloader()
            .run_batch(
                targets_for(&server, &["/p1.jpg", "/p2.jpg", "/p3.jpg"]),
                dir.path(),
                &observer,
            )
            .await;

        for mock in &mocks {
            mock.assert_async().await;
        }
        assert_eq!(result.attempted, 3);
        assert_eq!(result.succeeded, 3);
        assert_eq!(result.failed, 0);

        assert_eq!(std::fs::read(dir.path().join("photo-1.jpg")).unwrap(), b"one");
        assert_eq!(std::fs::read(dir.path().join("photo-2.jpg")).unwrap(), b"two");
        assert_eq!(std::fs::read(dir.path().join("photo-3.jpg")).unwrap(), b"three");

        let items = observer.items.lock().unwrap();
        assert_eq!(*items, vec![(1, true), (2, true), (3, true)]);

        let notices = observer.notices.lock().unwrap();
        assert_eq!(notices.len(), 2);
        assert_eq!(notices[0].level, NoticeLevel::Info);
        assert_eq!(notices[1].level, NoticeLevel::Success);
        assert_eq!(notices[1].message, "Downloaded 3 photos successfully!");
    }

    #[tokio::test]
    async fn test_failure_does_not_abort_batch() {
        let mut server = mockito::Server::new_async().await;
        let _first = server
            .mock("GET", "/p1.jpg")
            .with_status(500)
            .create_async()
            .await;
        let second = server
            .mock("GET", "/p2.jpg")
            .with_body("two")
            .create_async()
            .await;
        let dir = tempfile::tempdir().unwrap();
        let observer = RecordingObserver::default();

        let result = downloader()
            .run_batch(
                targets_for(&server, &["/p1.jpg", "/p2.jpg"]),
                dir.path(),
                &observer,
            )
            .await;

        second.assert_async().await;
        assert_eq!(result.attempted, 2);
        assert_eq!(result.succeeded, 1);
        assert_eq!(result.failed, 1);
        assert!(matches!(
            result.outcomes[0].status,
            ItemStatus::Failed(ItemError::Retrieval(_))
        ));

        assert!(!dir.path().join("photo-1.jpg").exists());
        assert!(!dir.path().join("photo-1.jpg.part").exists());
        assert_eq!(std::fs::read(dir.path().join("photo-2.jpg")).unwrap(), b"two");

        // The terminal notice still reports the attempted count.
        let notices = observer.notices.lock().unwrap();
        assert_eq!(notices[1].message, "Downloaded 2 photos successfully!");
    }

    #[tokio::test]
    async fn test_pacing_between_items() {
        let mut server = mockito::Server::new_async().await;
        let mut mocks = Vec::new();
        for path in ["/p1.jpg", "/p2.jpg", "/p3.jpg"] {
            mocks.push(server.mock("GET", path).with_body("x").create_async().await);
        }
        let dir = tempfile::tempdir().unwrap();
        let observer = RecordingObserver::default();
        let pacing = Duration::from_millis(50);
        let downloader = BatchDownloader::with_pacing(
            GalleryClient::new(ClientConfig::default()),
            pacing,
        );

        let started = Instant::now();
        let result = downloader
            .run_batch(
                targets_for(&server, &["/p1.jpg", "/p2.jpg", "/p3.jpg"]),
                dir.path(),
                &observer,
            )
            .await;

        assert_eq!(result.succeeded, 3);
        // Two pacing delays for three items, none after the last.
        assert!(started.elapsed() >= pacing * 2);
    }

    #[tokio::test]
    async fn test_batch_stream_event_sequence() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server.mock("GET", "/p1.jpg").with_body("x").create_async().await;
        let dir = tempfile::tempdir().unwrap();

        let events = downloader()
            .batch_stream(
                targets_for(&server, &["/p1.jpg"]),
                dir.path().to_path_buf(),
            )
            .collect::<Vec<_>>()
            .await;

        assert_eq!(events.len(), 4);
        assert!(matches!(&events[0], BatchEvent::Notice(n) if n.level == NoticeLevel::Info));
        assert!(matches!(
            &events[1],
            BatchEvent::ItemFinished { completed: 1, total: 1, .. }
        ));
        assert!(matches!(&events[2], BatchEvent::Notice(n) if n.level == NoticeLevel::Success));
        assert!(matches!(&events[3], BatchEvent::Finished(r) if r.attempted == 1));
    }
}
