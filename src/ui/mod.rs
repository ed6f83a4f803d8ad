use std::path::PathBuf;

use iced::{
    widget::{button, column, row, text, text_input, Space},
    Element, Length,
};

use crate::domain::{BatchPhase, Notice, NoticeLevel};

/// Main view state
pub struct DownloadView {
    pub gallery_url: String,
    pub dest_dir: Option<PathBuf>,
    pub targets_found: usize,
    pub phase: BatchPhase,
    pub status_message: String,
    /// Visible notices with their dismissal ids.
    pub notices: Vec<(u64, Notice)>,
}

impl Default for DownloadView {
    fn default() -> Self {
        Self {
            gallery_url: String::new(),
            dest_dir: None,
            targets_found: 0,
            phase: BatchPhase::Idle,
            status_message: "Paste a results page link to find your photos".to_string(),
            notices: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum DownloadMessage {
    GalleryUrlChanged(String),
    FindPhotosPressed,
    ChooseFolderPressed,
    DownloadAllPressed,
    DismissNotice(u64),
}

impl DownloadView {
    pub fn update(&mut self, message: DownloadMessage) {
        match message {
            DownloadMessage::GalleryUrlChanged(url) => {
                self.gallery_url = url;
            }
            DownloadMessage::DismissNotice(id) => {
                self.notices.retain(|(notice_id, _)| *notice_id != id);
            }
            DownloadMessage::FindPhotosPressed
            | DownloadMessage::ChooseFolderPressed
            | DownloadMessage::DownloadAllPressed => {
                // Handled by the app
            }
        }
    }

    pub fn view(&self) -> Element<'_, DownloadMessage> {
        let folder_line = match &self.dest_dir {
            Some(dir) => format!("Saving to: {}", dir.display()),
            None => "No folder selected".to_string(),
        };

        let found_line = if self.targets_found > 0 {
            format!("{} photos ready to download", self.targets_found)
        } else {
            String::new()
        };

        let mut notices = column![].spacing(5);
        for (id, notice) in &self.notices {
            notices = notices.push(
                row![
                    text(format!("{} {}", level_label(notice.level), notice.message)).size(14),
                    button("x")
                        .on_press(DownloadMessage::DismissNotice(*id))
                        .padding([2, 6]),
                ]
                .spacing(10),
            );
        }

        column![
            text("Event Photo Downloader").size(32),
            Space::new().height(Length::Fixed(20.0)),
            text("Results page:").size(16),
            text_input("Paste the link to your results page...", &self.gallery_url)
                .on_input(DownloadMessage::GalleryUrlChanged)
                .padding(10),
            Space::new().height(Length::Fixed(10.0)),
            row![
                button("Find Photos")
                    .on_press(DownloadMessage::FindPhotosPressed)
                    .padding([10, 20]),
                button("Choose Folder...")
                    .on_press(DownloadMessage::ChooseFolderPressed)
                    .padding([10, 20]),
                button("Download All")
                    .on_press(DownloadMessage::DownloadAllPressed)
                    .padding([10, 20]),
            ]
            .spacing(10),
            Space::new().height(Length::Fixed(10.0)),
            text(folder_line).size(14),
            text(found_line).size(14),
            text(&self.status_message).size(14),
            Space::new().height(Length::Fixed(10.0)),
            notices,
        ]
        .padding(20)
        .spacing(10)
        .into()
    }
}

fn level_label(level: NoticeLevel) -> &'static str {
    match level {
        NoticeLevel::Info => "[info]",
        NoticeLevel::Success => "[ok]",
        NoticeLevel::Warning => "[warning]",
    }
}
