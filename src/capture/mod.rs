/// Capture module
///
/// Thin wrapper around the platform picker. The picker itself is an external
/// collaborator; this module only shapes the request and maps its response
/// onto [`CaptureOutcome`] so the screen can react uniformly.

use std::path::PathBuf;

use rfd::AsyncFileDialog;
use tracing::debug;

/// Configuration for one capture request.
#[derive(Debug, Clone)]
pub struct CaptureOptions {
    /// Dialog title.
    pub title: String,
    /// Folder offered to the picker, created on demand.
    pub destination: PathBuf,
    /// Ask the backend to keep captures out of system backups. The stock
    /// desktop dialog has no such switch; backends that do honor it.
    pub skip_backup: bool,
}

impl CaptureOptions {
    /// Options for the photo flow: captures land in an `images` folder under
    /// the user's picture directory.
    pub fn camera() -> Self {
        let pictures = dirs::picture_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));

        Self {
            title: "Select Image".to_string(),
            destination: pictures.join("images"),
            skip_backup: true,
        }
    }
}

/// Every way a capture request can come back. Exactly one outcome per
/// invocation; no retries.
#[derive(Debug, Clone)]
pub enum CaptureOutcome {
    /// The user dismissed the picker.
    Cancelled,
    /// The picker itself failed before a file could be chosen.
    Failed(String),
    /// The picker surfaced an auxiliary dialog action instead of a file.
    /// The stock file dialog never emits this; kept for backends that do.
    Custom(String),
    /// A photo was captured; the locator points at the local file.
    Captured(PathBuf),
}

/// Open the native picker and wait for the user's decision.
pub async fn capture_photo(options: CaptureOptions) -> CaptureOutcome {
    debug!(
        destination = %options.destination.display(),
        skip_backup = options.skip_backup,
        "opening picker"
    );

    if let Err(error) = tokio::fs::create_dir_all(&options.destination).await {
        return CaptureOutcome::Failed(format!(
            "could not prepare {}: {error}",
            options.destination.display()
        ));
    }

    let picked = AsyncFileDialog::new()
        .set_title(&options.title)
        .set_directory(&options.destination)
        .add_filter("Image", &["jpg", "jpeg", "png", "webp", "heic"])
        .pick_file()
        .await;

    match picked {
        Some(handle) => {
            let path = handle.path().to_path_buf();
            debug!(path = %path.display(), "picker returned a file");
            CaptureOutcome::Captured(path)
        }
        None => {
            debug!("picker cancelled");
            CaptureOutcome::Cancelled
        }
    }
}
