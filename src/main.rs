use iced::widget::{button, column, container, image, progress_bar, text, Column};
use iced::{Alignment, Element, Length, Task, Theme};
use std::path::PathBuf;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

mod capture;
mod config;
mod state;
mod upload;

use capture::{CaptureOptions, CaptureOutcome};
use config::AppConfig;
use state::upload::{UploadId, UploadState};
use upload::{RemoteObjectKey, StorageBucket, UploadEvent};

/// Main application state
struct UploadScreen {
    /// Destination bucket handle; None when storage is not configured
    bucket: Option<StorageBucket>,
    /// The most recently captured photo, shown until replaced
    image: Option<PathBuf>,
    /// Progress of the active upload, if any
    upload: UploadState,
    /// Status message to display to the user
    status: String,
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    /// User pressed the capture trigger
    PickImage,
    /// The picker came back with one of its outcomes
    CaptureFinished(CaptureOutcome),
    /// An event from the upload tagged with `UploadId`
    Upload(UploadId, UploadEvent),
    /// The user dismissed an alert dialog
    AlertClosed,
}

impl UploadScreen {
    /// Create a new instance of the application
    fn new() -> (Self, Task<Message>) {
        let config = AppConfig::load_or_default();

        let bucket = match StorageBucket::from_config(&config.storage) {
            Ok(bucket) => Some(bucket),
            Err(error) => {
                warn!(%error, "object storage unavailable, uploads disabled");
                None
            }
        };

        let status = if bucket.is_some() {
            format!("Ready. Uploading to \"{}\".", config.storage.bucket)
        } else {
            "Storage is not configured; captures stay local.".to_string()
        };

        (
            UploadScreen {
                bucket,
                image: None,
                upload: UploadState::default(),
                status,
            },
            Task::none(),
        )
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::PickImage => Task::perform(
                capture::capture_photo(CaptureOptions::camera()),
                Message::CaptureFinished,
            ),
            Message::CaptureFinished(outcome) => match outcome {
                CaptureOutcome::Cancelled => {
                    debug!("user cancelled the picker");
                    Task::none()
                }
                CaptureOutcome::Failed(reason) => {
                    warn!(%reason, "picker failed");
                    Task::none()
                }
                CaptureOutcome::Custom(action) => {
                    info!(%action, "picker surfaced a custom action");
                    Self::alert(action)
                }
                CaptureOutcome::Captured(path) => {
                    self.image = Some(path.clone());
                    self.begin_upload(path)
                }
            },
            Message::Upload(id, event) => {
                if !self.upload.is_current(id) {
                    debug!(%id, "ignoring event from a superseded upload");
                    return Task::none();
                }

                match event {
                    UploadEvent::Progress { transferred, total } => {
                        self.upload.record_progress(transferred, total);
                        self.status = format!("Uploading {:.0}%", self.upload.percent());
                        Task::none()
                    }
                    UploadEvent::Completed => {
                        self.upload.finish();
                        self.status = "Upload complete.".to_string();
                        Task::none()
                    }
                    UploadEvent::Failed(reason) => {
                        self.upload.finish();
                        self.status = "Upload failed.".to_string();
                        warn!(%reason, "upload failed");
                        Self::alert("Sorry, try again.")
                    }
                }
            }
            Message::AlertClosed => Task::none(),
        }
    }

    /// Generate a destination key for the captured file and start streaming
    /// it to the bucket. The returned events are tagged with a fresh upload
    /// id so progress from superseded transfers can be discarded.
    fn begin_upload(&mut self, source: PathBuf) -> Task<Message> {
        let Some(bucket) = self.bucket.clone() else {
            warn!("skipping upload, no storage configured");
            self.status = "Storage is not configured; capture kept locally.".to_string();
            return Task::none();
        };

        let key = RemoteObjectKey::for_file(&source);
        let id = self.upload.begin();
        self.status = "Uploading 0%".to_string();
        info!(%id, %key, "starting upload");

        Task::run(upload::transfer(bucket, source, key), move |event| {
            Message::Upload(id, event)
        })
    }

    /// Show a user-facing notification dialog
    fn alert(message: impl Into<String>) -> Task<Message> {
        let description = message.into();

        Task::perform(
            async move {
                rfd::AsyncMessageDialog::new()
                    .set_level(rfd::MessageLevel::Warning)
                    .set_title("Upload")
                    .set_description(description.as_str())
                    .show()
                    .await
            },
            |_| Message::AlertClosed,
        )
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        let preview: Element<Message> = match &self.image {
            Some(path) => image(image::Handle::from_path(path))
                .width(Length::Fixed(320.0))
                .height(Length::Fixed(240.0))
                .into(),
            None => text("Select an Image!").size(16).into(),
        };

        let mut content: Column<Message> = column![
            text("Photo Upload").size(40),
            text("Capture a photo and send it to your bucket.").size(16),
            button("Pick Image").on_press(Message::PickImage).padding(10),
            preview,
        ]
        .spacing(20)
        .padding(40)
        .align_x(Alignment::Center);

        if self.upload.in_progress() {
            content = content.push(progress_bar(0.0..=100.0, self.upload.percent()));
        }

        content = content.push(text(&self.status).size(14));

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .center_x(Length::Fill)
            .center_y(Length::Fill)
            .into()
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

fn main() -> iced::Result {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    iced::application("Photo Upload", UploadScreen::update, UploadScreen::view)
        .theme(UploadScreen::theme)
        .centered()
        .run_with(UploadScreen::new)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn screen() -> UploadScreen {
        UploadScreen {
            bucket: None,
            image: None,
            upload: UploadState::default(),
            status: String::new(),
        }
    }

    #[test]
    fn cancellation_leaves_state_untouched() {
        let mut app = screen();

        let _ = app.update(Message::CaptureFinished(CaptureOutcome::Cancelled));

        assert!(app.image.is_none());
        assert!(!app.upload.in_progress());
    }

    #[test]
    fn picker_failure_leaves_state_untouched() {
        let mut app = screen();

        let _ = app.update(Message::CaptureFinished(CaptureOutcome::Failed(
            "backend went away".to_string(),
        )));

        assert!(app.image.is_none());
        assert!(!app.upload.in_progress());
    }

    #[test]
    fn custom_action_does_not_touch_the_image() {
        let mut app = screen();

        let _ = app.update(Message::CaptureFinished(CaptureOutcome::Custom(
            "open-gallery".to_string(),
        )));

        assert!(app.image.is_none());
        assert!(!app.upload.in_progress());
    }

    #[test]
    fn capture_sets_the_image_reference() {
        let mut app = screen();
        let path = PathBuf::from("/tmp/a.jpg");

        let _ = app.update(Message::CaptureFinished(CaptureOutcome::Captured(
            path.clone(),
        )));

        assert_eq!(app.image, Some(path));
    }

    #[test]
    fn progress_updates_the_percentage() {
        let mut app = screen();
        let id = app.upload.begin();

        let _ = app.update(Message::Upload(
            id,
            UploadEvent::Progress {
                transferred: 50,
                total: 200,
            },
        ));

        assert_eq!(app.upload.percent(), 25.0);
        assert_eq!(app.status, "Uploading 25%");
    }

    #[test]
    fn stale_progress_is_discarded() {
        let mut app = screen();
        let stale = app.upload.begin();
        let _current = app.upload.begin();

        let _ = app.update(Message::Upload(
            stale,
            UploadEvent::Progress {
                transferred: 200,
                total: 200,
            },
        ));

        assert_eq!(app.upload.percent(), 0.0);
    }

    #[test]
    fn completion_resets_the_upload() {
        let mut app = screen();
        let id = app.upload.begin();
        app.upload.record_progress(200, 200);

        let _ = app.update(Message::Upload(id, UploadEvent::Completed));

        assert!(!app.upload.in_progress());
        assert_eq!(app.upload.percent(), 0.0);
    }

    #[test]
    fn failure_resets_the_upload_but_keeps_the_image() {
        let mut app = screen();
        app.image = Some(PathBuf::from("/tmp/a.jpg"));
        let id = app.upload.begin();
        app.upload.record_progress(100, 200);

        let _ = app.update(Message::Upload(
            id,
            UploadEvent::Failed("connection reset".to_string()),
        ));

        assert!(!app.upload.in_progress());
        assert_eq!(app.upload.percent(), 0.0);
        assert_eq!(app.image, Some(PathBuf::from("/tmp/a.jpg")));
    }

    #[test]
    fn terminal_events_from_old_uploads_are_ignored() {
        let mut app = screen();
        let stale = app.upload.begin();
        let _current = app.upload.begin();
        app.upload.record_progress(50, 200);

        let _ = app.update(Message::Upload(stale, UploadEvent::Completed));

        assert!(app.upload.in_progress());
        assert_eq!(app.upload.percent(), 25.0);
    }
}
