/// S3-compatible blob store
///
/// Credentials come from the AWS SDK default provider chain. Setting
/// `BLOB_ENDPOINT_URL` points the client at MinIO/LocalStack and switches to
/// path-style addressing.

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::{
    error::DisplayErrorContext,
    primitives::ByteStream,
    types::{BucketLocationConstraint, CreateBucketConfiguration},
    Client as S3Client,
};
use bytes::Bytes;
use tracing::{debug, info};

use super::{BlobItem, BlobObject, BlobStore, BlobStoreConfig, StorageError, DEFAULT_CONTENT_TYPE};

fn backend_error<E>(operation: &str, err: E) -> StorageError
where
    E: std::error::Error,
{
    StorageError::Backend(format!("S3 {} failed: {}", operation, DisplayErrorContext(&err)))
}

/// [`BlobStore`] backed by an S3 bucket
#[derive(Debug, Clone)]
pub struct S3BlobStore {
    client: S3Client,
    bucket: String,
    region: String,
}

impl S3BlobStore {
    /// Wraps an existing client
    pub fn new(client: S3Client, bucket: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            region: region.into(),
        }
    }

    /// Loads SDK configuration from the environment and builds a client
    pub async fn from_config(config: &BlobStoreConfig) -> Self {
        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .load()
            .await;

        let mut builder = aws_sdk_s3::config::Builder::from(&sdk_config);
        if let Some(endpoint) = &config.endpoint_url {
            debug!(endpoint = %endpoint, "Using custom S3 endpoint");
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        Self::new(
            S3Client::from_conf(builder.build()),
            config.container.clone(),
            config.region.clone(),
        )
    }

    async fn object_exists(&self, key: &str) -> Result<bool, StorageError> {
        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(err) => match err.as_service_error() {
                Some(service) if service.is_not_found() => Ok(false),
                _ => Err(backend_error("head_object", err)),
            },
        }
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    fn container(&self) -> &str {
        &self.bucket
    }

    async fn container_exists(&self) -> Result<bool, StorageError> {
        match self.client.head_bucket().bucket(&self.bucket).send().await {
            Ok(_) => Ok(true),
            Err(err) => match err.as_service_error() {
                Some(service) if service.is_not_found() => Ok(false),
                _ => Err(backend_error("head_bucket", err)),
            },
        }
    }

    async fn create_container_if_missing(&self) -> Result<bool, StorageError> {
        if self.container_exists().await? {
            return Ok(false);
        }

        let mut request = self.client.create_bucket().bucket(&self.bucket);
        // us-east-1 rejects an explicit location constraint
        if self.region != "us-east-1" {
            request = request.create_bucket_configuration(
                CreateBucketConfiguration::builder()
                    .location_constraint(BucketLocationConstraint::from(self.region.as_str()))
                    .build(),
            );
        }

        match request.send().await {
            Ok(_) => {
                info!(bucket = %self.bucket, "Created blob container");
                Ok(true)
            }
            Err(err) => match err.as_service_error() {
                Some(service) if service.is_bucket_already_owned_by_you() => Ok(false),
                _ => Err(backend_error("create_bucket", err)),
            },
        }
    }

    async fn upload(
        &self,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<(), StorageError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(|e| backend_error("put_object", e))?;

        Ok(())
    }

    async fn download(&self, key: &str) -> Result<BlobObject, StorageError> {
        let response = match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => {
                return match err.as_service_error() {
                    Some(service) if service.is_no_such_key() => {
                        Err(StorageError::NotFound(key.to_string()))
                    }
                    _ => Err(backend_error("get_object", err)),
                }
            }
        };

        let content_type = response
            .content_type()
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_string();

        let data = response
            .body
            .collect()
            .await
            .map_err(|e| backend_error("get_object body", e))?
            .into_bytes();

        Ok(BlobObject { data, content_type })
    }

    async fn delete_if_exists(&self, key: &str) -> Result<bool, StorageError> {
        // DeleteObject succeeds for missing keys, so existence is checked first
        if !self.object_exists(key).await? {
            return Ok(false);
        }

        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| backend_error("delete_object", e))?;

        Ok(true)
    }

    async fn list(&self) -> Result<Vec<BlobItem>, StorageError> {
        let mut items = Vec::new();
        let mut continuation: Option<String> = None;

        loop {
            let mut request = self.client.list_objects_v2().bucket(&self.bucket);
            if let Some(token) = continuation.as_ref() {
                request = request.continuation_token(token);
            }

            let response = match request.send().await {
                Ok(response) => response,
                Err(err) => {
                    return match err.as_service_error() {
                        Some(service) if service.is_no_such_bucket() => {
                            Err(StorageError::ContainerNotFound(self.bucket.clone()))
                        }
                        _ => Err(backend_error("list_objects_v2", err)),
                    }
                }
            };

            items.extend(response.contents().iter().filter_map(|object| {
                object.key().map(|key| BlobItem {
                    key: key.to_string(),
                    size: object.size(),
                })
            }));

            if response.is_truncated().unwrap_or(false) {
                continuation = response.next_continuation_token().map(|s| s.to_string());
                if continuation.is_none() {
                    break;
                }
            } else {
                break;
            }
        }

        Ok(items)
    }

    async fn copy(&self, source: &str, destination: &str) -> Result<(), StorageError> {
        let copy_source = format!("{}/{}", self.bucket, urlencoding::encode(source));

        match self
            .client
            .copy_object()
            .bucket(&self.bucket)
            .copy_source(copy_source)
            .key(destination)
            .send()
            .await
        {
            Ok(_) => Ok(()),
            Err(err) if err.raw_response().map(|r| r.status().as_u16()) == Some(404) => {
                Err(StorageError::NotFound(source.to_string()))
            }
            Err(err) => Err(backend_error("copy_object", err)),
        }
    }
}
