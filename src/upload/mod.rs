/// Upload module
///
/// Streams a captured photo to the object store and turns the transfer into
/// a sequence of [`UploadEvent`]s the UI consumes:
/// - Unique destination keys (key.rs)
/// - Byte-level progress reporting (progress.rs)
/// - The injected bucket handle (storage.rs)

pub mod key;
pub mod progress;
pub mod storage;

pub use key::RemoteObjectKey;
pub use storage::{StorageBucket, StorageError};

use std::path::PathBuf;

use futures::channel::mpsc::Sender;
use futures::{SinkExt, Stream};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use progress::ProgressReader;

/// Progress notifications buffered between UI frames. Counts are cumulative,
/// so dropping an intermediate notification loses nothing.
const PROGRESS_BUFFER: usize = 64;

/// Why a transfer attempt ended without a stored object.
#[derive(Debug, Error)]
pub enum TransferError {
    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Events reported by an in-flight transfer. Progress events carry
/// cumulative byte counts; exactly one terminal event closes the stream.
#[derive(Debug, Clone)]
pub enum UploadEvent {
    Progress { transferred: u64, total: u64 },
    Completed,
    Failed(String),
}

/// Stream `source` to the bucket under `key`.
///
/// The caller tags the resulting messages with its own upload id and
/// discards events from transfers it has since superseded.
pub fn transfer(
    bucket: StorageBucket,
    source: PathBuf,
    key: RemoteObjectKey,
) -> impl Stream<Item = UploadEvent> {
    iced::stream::channel(PROGRESS_BUFFER, move |mut output| async move {
        match run(bucket, source, key, &mut output).await {
            Ok(()) => {
                let _ = output.send(UploadEvent::Completed).await;
            }
            Err(error) => {
                warn!(%error, "transfer failed");
                let _ = output.send(UploadEvent::Failed(error.to_string())).await;
            }
        }
    })
}

async fn run(
    bucket: StorageBucket,
    source: PathBuf,
    key: RemoteObjectKey,
    output: &mut Sender<UploadEvent>,
) -> Result<(), TransferError> {
    let file = tokio::fs::File::open(&source)
        .await
        .map_err(|error| TransferError::Read {
            path: source.clone(),
            source: error,
        })?;
    let total = file
        .metadata()
        .await
        .map_err(|error| TransferError::Read {
            path: source.clone(),
            source: error,
        })?
        .len();

    let content_type = mime_guess::from_path(&source).first_or_octet_stream();
    let destination = bucket.object_path(&key);
    info!(
        source = %source.display(),
        %destination,
        total,
        content_type = content_type.essence_str(),
        "starting transfer"
    );

    let (events, mut notifications) = mpsc::channel(PROGRESS_BUFFER);
    let mut reader = ProgressReader::new(file, total, events);

    let put = bucket.put_stream(&mut reader, &destination, content_type.essence_str());
    tokio::pin!(put);

    // Forward progress while the storage client drains the reader.
    let outcome = loop {
        tokio::select! {
            Some(update) = notifications.recv() => {
                let _ = output
                    .send(UploadEvent::Progress {
                        transferred: update.transferred,
                        total: update.total,
                    })
                    .await;
            }
            result = &mut put => break result,
        }
    };

    // Flush notifications that raced with completion.
    while let Ok(update) = notifications.try_recv() {
        let _ = output
            .send(UploadEvent::Progress {
                transferred: update.transferred,
                total: update.total,
            })
            .await;
    }

    outcome?;
    debug!(%destination, "transfer complete");

    Ok(())
}
