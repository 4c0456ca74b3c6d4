//! S3-compatible blob storage using the AWS SDK.

use crate::blob::{cache_control_or_none, content_type_or_default, require_key};
use crate::{BlobHead, BlobStore, DEFAULT_CACHE_CONTROL, StoredBlob};
use aws_config::{BehaviorVersion, Region};
use aws_credential_types::Credentials;
use aws_sdk_s3::Client;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use curator_error::{CuratorResult, StorageError, StorageErrorKind};

/// Blob store for S3-compatible services such as Cloudflare R2.
///
/// Uses path-style addressing so custom endpoints work without
/// bucket-subdomain DNS.
#[derive(Clone)]
pub struct S3BlobStore {
    client: Client,
    bucket: String,
    cache_control: String,
}

impl std::fmt::Debug for S3BlobStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3BlobStore")
            .field("bucket", &self.bucket)
            .field("cache_control", &self.cache_control)
            .finish_non_exhaustive()
    }
}

impl S3BlobStore {
    /// Connect to a bucket.
    ///
    /// Static credentials are used when both keys are given; otherwise the
    /// SDK's default provider chain applies.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` for a blank bucket or when only one of the
    /// two credential halves is set.
    #[tracing::instrument(skip(access_key_id, secret_access_key))]
    pub async fn connect(
        bucket: &str,
        endpoint: Option<&str>,
        region: &str,
        access_key_id: Option<&str>,
        secret_access_key: Option<&str>,
    ) -> CuratorResult<Self> {
        let bucket = bucket.trim();
        if bucket.is_empty() {
            return Err(StorageError::new(StorageErrorKind::InvalidConfig(
                "s3 bucket is required".to_string(),
            ))
            .into());
        }
        let region = match region.trim() {
            "" => "auto",
            r => r,
        };

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.to_string()));

        match (access_key_id, secret_access_key) {
            (Some(key_id), Some(secret)) => {
                loader = loader.credentials_provider(Credentials::new(
                    key_id.to_string(),
                    secret.to_string(),
                    None,
                    None,
                    "curator-config",
                ));
            }
            (None, None) => {}
            _ => {
                return Err(StorageError::new(StorageErrorKind::InvalidConfig(
                    "s3 config requires both access_key_id and secret_access_key when either is set"
                        .to_string(),
                ))
                .into());
            }
        }

        if let Some(endpoint) = endpoint.map(str::trim).filter(|e| !e.is_empty()) {
            loader = loader.endpoint_url(endpoint);
        }

        let sdk_config = loader.load().await;
        let client = Client::from_conf(
            aws_sdk_s3::config::Builder::from(&sdk_config)
                .force_path_style(true)
                .build(),
        );

        tracing::info!(bucket, region, "Connected S3 blob store");
        Ok(Self {
            client,
            bucket: bucket.to_string(),
            cache_control: DEFAULT_CACHE_CONTROL.to_string(),
        })
    }

    /// Override the default cache policy.
    pub fn with_cache_control(mut self, cache_control: impl Into<String>) -> Self {
        self.cache_control = cache_control.into();
        self
    }

    /// Target bucket.
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    fn backend_error(operation: &str, key: &str, err: impl std::error::Error) -> StorageError {
        StorageError::new(StorageErrorKind::Backend(format!(
            "{} {}: {}",
            operation,
            key,
            DisplayErrorContext(err)
        )))
    }
}

#[async_trait::async_trait]
impl BlobStore for S3BlobStore {
    fn backend(&self) -> &'static str {
        "s3"
    }

    fn cache_control(&self) -> &str {
        &self.cache_control
    }

    #[tracing::instrument(skip(self, data, cache_control), fields(bucket = %self.bucket, size = data.len()))]
    async fn put_with_cache_control(
        &self,
        key: &str,
        data: Bytes,
        content_type: &str,
        cache_control: &str,
    ) -> CuratorResult<()> {
        let key = require_key(key)?;
        let size = data.len();

        let mut request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type_or_default(content_type))
            .body(ByteStream::from(data));
        if let Some(cache_control) = cache_control_or_none(cache_control) {
            request = request.cache_control(cache_control);
        }

        request
            .send()
            .await
            .map_err(|e| Self::backend_error("put", key, e))?;

        tracing::info!(key, size, "Uploaded blob");
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(bucket = %self.bucket))]
    async fn get(&self, key: &str) -> CuratorResult<StoredBlob> {
        let key = require_key(key)?;

        let output = match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(output) => output,
            Err(e) if e.as_service_error().is_some_and(|se| se.is_no_such_key()) => {
                return Err(StorageError::new(StorageErrorKind::NotFound(key.to_string())).into());
            }
            Err(e) => return Err(Self::backend_error("get", key, e).into()),
        };

        let content_type = output
            .content_type()
            .map(str::to_string)
            .unwrap_or_else(|| crate::DEFAULT_CONTENT_TYPE.to_string());
        let cache_control = output.cache_control().map(str::to_string);
        let data = output
            .body
            .collect()
            .await
            .map_err(|e| Self::backend_error("read body", key, e))?
            .into_bytes();

        Ok(StoredBlob {
            data,
            content_type,
            cache_control,
        })
    }

    async fn head(&self, key: &str) -> CuratorResult<Option<BlobHead>> {
        let key = require_key(key)?;

        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(output) => Ok(Some(BlobHead {
                size: output.content_length().unwrap_or(0).max(0) as u64,
                content_type: output
                    .content_type()
                    .map(str::to_string)
                    .unwrap_or_else(|| crate::DEFAULT_CONTENT_TYPE.to_string()),
                cache_control: output.cache_control().map(str::to_string),
            })),
            Err(e) if e.as_service_error().is_some_and(|se| se.is_not_found()) => Ok(None),
            Err(e) => Err(Self::backend_error("head", key, e).into()),
        }
    }

    #[tracing::instrument(skip(self), fields(bucket = %self.bucket))]
    async fn delete(&self, key: &str) -> CuratorResult<()> {
        let key = key.trim();
        if key.is_empty() {
            return Ok(());
        }

        // DeleteObject succeeds for missing keys
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| Self::backend_error("delete", key, e))?;

        tracing::info!(key, "Deleted blob");
        Ok(())
    }
}
