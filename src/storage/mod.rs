//! Storage Adapter (§4.5 item 5): puts/gets bundle blobs from an
//! S3-compatible object store, keyed `{name}/{version}.tar.gz`.

use aws_sdk_s3::Client;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::primitives::ByteStream;

use crate::config::StorageConfig;
use crate::error::StorageError;

#[derive(Clone)]
pub struct StorageAdapter {
    client: Client,
    bucket: String,
}

impl StorageAdapter {
    /// Build a client against the configured endpoint. Path-style addressing
    /// keeps this MinIO-friendly as well as AWS-compatible.
    pub fn new(config: &StorageConfig) -> Self {
        let credentials = Credentials::new(
            config.access_key.clone(),
            config.secret_key().to_string(),
            None,
            None,
            "clawhub-registry-static",
        );

        let s3_config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .endpoint_url(config.endpoint.clone())
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials)
            .force_path_style(true)
            .build();

        Self {
            client: Client::from_conf(s3_config),
            bucket: config.bucket.clone(),
        }
    }

    /// The storage key for a given skill name/version pair.
    pub fn bundle_key(name: &str, version: &str) -> String {
        format!("{name}/{version}.tar.gz")
    }

    /// Upload bundle bytes to `key`, returning the key unchanged for the
    /// caller's convenience.
    pub async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<(), StorageError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type("application/gzip")
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| StorageError::UploadFailed {
                key: key.to_string(),
                reason: e.to_string(),
            })?;
        Ok(())
    }

    /// Download the raw bundle bytes stored at `key`.
    pub async fn get(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        let output =
            self.client
                .get_object()
                .bucket(&self.bucket)
                .key(key)
                .send()
                .await
                .map_err(|e| StorageError::DownloadFailed {
                    key: key.to_string(),
                    reason: e.to_string(),
                })?;

        let data = output
            .body
            .collect()
            .await
            .map_err(|e| StorageError::DownloadFailed {
                key: key.to_string(),
                reason: e.to_string(),
            })?;

        Ok(data.into_bytes().to_vec())
    }

    /// Health check backing `GET /health`'s `storage` field.
    pub async fn health(&self) -> Result<(), StorageError> {
        self.client
            .head_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .map_err(|e| StorageError::HealthCheckFailed {
                reason: e.to_string(),
            })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundle_key_format() {
        assert_eq!(
            StorageAdapter::bundle_key("test-skill", "1.0.0"),
            "test-skill/1.0.0.tar.gz"
        );
    }
}
