use std::path::PathBuf;
use std::time::Duration;

use futures::StreamExt;
use iced::Task;

use crate::api::GalleryClient;
use crate::application::{BatchDownloader, BatchEvent};
use crate::domain::{BatchPhase, DownloadTarget, Notice};
use crate::ui::{DownloadMessage, DownloadView};

/// How long a notice stays on screen before it dismisses itself.
const NOTICE_TTL: Duration = Duration::from_secs(5);

pub struct DownloadApp {
    view: DownloadView,
    client: GalleryClient,
    downloader: BatchDownloader,
    // Targets found by the last discovery, consumed by "Download All"
    targets: Vec<DownloadTarget>,
    next_notice_id: u64,
}

impl Default for DownloadApp {
    fn default() -> Self {
        Self::new()
    }
}

impl DownloadApp {
    pub fn new() -> Self {
        let client = GalleryClient::new(Default::default());
        let downloader = BatchDownloader::new(client.clone());

        Self {
            view: DownloadView::default(),
            client,
            downloader,
            targets: Vec::new(),
            next_notice_id: 0,
        }
    }

    /// Show a notice and schedule its expiry.
    fn push_notice(&mut self, notice: Notice) -> Task<Message> {
        let id = self.next_notice_id;
        self.next_notice_id += 1;
        self.view.notices.push((id, notice));

        Task::perform(
            async move {
                tokio::time::sleep(NOTICE_TTL).await;
                id
            },
            Message::NoticeExpired,
        )
    }
}

#[derive(Debug, Clone)]
pub enum Message {
    UiMessage(DownloadMessage),
    /// Targets found on the results page, or an error message
    TargetsDiscovered(Result<Vec<DownloadTarget>, String>),
    /// Destination folder picked by the user (None on cancel)
    FolderSelected(Option<PathBuf>),
    /// Progress from the running batch
    BatchProgress(BatchEvent),
    NoticeExpired(u64),
}

pub fn update(app: &mut DownloadApp, message: Message) -> Task<Message> {
    match message {
        Message::UiMessage(ui_msg) => {
            app.view.update(ui_msg.clone());

            match ui_msg {
                DownloadMessage::FindPhotosPressed => {
                    if app.view.phase == BatchPhase::Idle && !app.view.gallery_url.is_empty() {
                        let client = app.client.clone();
                        let input = app.view.gallery_url.clone();

                        app.view.phase = BatchPhase::Discovering;
                        app.view.status_message = "Looking for photos...".to_string();

                        return Task::perform(
                            async move {
                                client
                                    .discover_targets(&input)
                                    .await
                                    .map_err(|e| e.to_string())
                            },
                            Message::TargetsDiscovered,
                        );
                    }
                }
                DownloadMessage::ChooseFolderPressed => {
                    return Task::perform(
                        async move {
                            rfd::AsyncFileDialog::new()
                                .pick_folder()
                                .await
                                .map(|handle| handle.path().to_path_buf())
                        },
                        Message::FolderSelected,
                    );
                }
                DownloadMessage::DownloadAllPressed => {
                    if app.view.phase != BatchPhase::Idle {
                        return Task::none();
                    }

                    let Some(dest) = app.view.dest_dir.clone() else {
                        return app.push_notice(Notice::warning(
                            "Choose a destination folder first",
                        ));
                    };

                    app.view.phase = BatchPhase::Downloading;
                    app.view.status_message = "Starting download...".to_string();

                    // The empty-targets case flows through the batch too; it
                    // reports "No photos to download" and finishes at once.
                    let stream = app
                        .downloader
                        .batch_stream(app.targets.clone(), dest)
                        .map(Message::BatchProgress);

                    return Task::stream(stream);
                }
                DownloadMessage::GalleryUrlChanged(_) | DownloadMessage::DismissNotice(_) => {}
            }
        }
        Message::TargetsDiscovered(result) => {
            app.view.phase = BatchPhase::Idle;
            match result {
                Ok(targets) => {
                    app.view.targets_found = targets.len();
                    app.view.status_message = format!("Found {} photos", targets.len());
                    app.targets = targets;
                }
                Err(e) => {
                    app.view.status_message = format!("Search failed: {}", e);
                }
            }
        }
        Message::FolderSelected(path_opt) => match path_opt {
            Some(path) => {
                app.view.dest_dir = Some(path);
            }
            None => {
                app.view.status_message = "Folder selection cancelled".to_string();
            }
        },
        Message::BatchProgress(event) => match event {
            BatchEvent::Notice(notice) => {
                return app.push_notice(notice);
            }
            BatchEvent::ItemFinished {
                outcome,
                completed,
                total,
            } => {
                app.view.status_message = format!(
                    "Downloading photo {} of {} ({})",
                    completed, total, outcome.filename
                );
            }
            BatchEvent::Finished(_) => {
                app.view.phase = BatchPhase::Idle;
                app.view.status_message = "Download complete".to_string();
            }
        },
        Message::NoticeExpired(id) => {
            app.view.notices.retain(|(notice_id, _)| *notice_id != id);
        }
    }
    Task::none()
}

pub fn view(app: &DownloadApp) -> iced::Element<'_, Message> {
    app.view.view().map(Message::UiMessage)
}
