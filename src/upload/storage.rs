use s3::creds::Credentials;
use s3::{Bucket, Region};
use thiserror::Error;
use tokio::io::AsyncRead;

use super::key::RemoteObjectKey;
use crate::config::StorageConfig;

/// Errors raised while setting up or talking to the object store.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage credentials unavailable: {0}")]
    Credentials(String),
    #[error("invalid region {0:?}")]
    Region(String),
    #[error(transparent)]
    Backend(#[from] s3::error::S3Error),
}

/// Handle to the destination bucket.
///
/// Constructed once at startup from [`StorageConfig`] and passed into every
/// transfer, so tests can point it at their own endpoint and no client state
/// hides in a global.
#[derive(Clone)]
pub struct StorageBucket {
    bucket: Box<Bucket>,
    prefix: String,
}

impl StorageBucket {
    /// Build the bucket handle. Credentials resolve through the SDK's
    /// standard chain (environment, shared profile).
    pub fn from_config(config: &StorageConfig) -> Result<Self, StorageError> {
        let region = match &config.endpoint {
            Some(endpoint) => Region::Custom {
                region: config.region.clone(),
                endpoint: endpoint.clone(),
            },
            None => config
                .region
                .parse()
                .map_err(|_| StorageError::Region(config.region.clone()))?,
        };

        let credentials = Credentials::default()
            .map_err(|error| StorageError::Credentials(error.to_string()))?;

        let bucket = Bucket::new(&config.bucket, region, credentials)?;
        let bucket = if config.path_style {
            bucket.with_path_style()
        } else {
            bucket
        };

        Ok(Self {
            bucket: Box::new(bucket),
            prefix: config.prefix.clone(),
        })
    }

    /// Full destination path for a key under the configured prefix.
    pub fn object_path(&self, key: &RemoteObjectKey) -> String {
        join_prefix(&self.prefix, key.as_str())
    }

    /// Stream `reader` into the bucket at `path`.
    pub async fn put_stream<R>(
        &self,
        reader: &mut R,
        path: &str,
        content_type: &str,
    ) -> Result<(), StorageError>
    where
        R: AsyncRead + Unpin,
    {
        self.bucket
            .put_object_stream_with_content_type(reader, path, content_type)
            .await?;

        Ok(())
    }
}

fn join_prefix(prefix: &str, key: &str) -> String {
    let prefix = prefix.trim_matches('/');
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}/{key}")
    }
}
