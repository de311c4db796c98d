use super::artifact_store::{ArtifactKey, ArtifactStore, StorageError};
use crate::infrastructure::config::Config;
use async_trait::async_trait;
use aws_sdk_s3::{
    config::Credentials,
    presigning::PresigningConfig,
    primitives::ByteStream,
    types::{BucketLocationConstraint, CorsConfiguration, CorsRule, CreateBucketConfiguration},
    Client as S3Client,
};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// S3 (or MinIO) implementation of the artifact store
pub struct S3ArtifactStore {
    s3_client: Arc<S3Client>,
    bucket: String,
    region: String,
}

impl S3ArtifactStore {
    pub fn new(s3_client: Arc<S3Client>, bucket: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            s3_client,
            bucket: bucket.into(),
            region: region.into(),
        }
    }

    /// Build a client from the service configuration.
    ///
    /// A custom endpoint switches to path-style addressing so MinIO works;
    /// static keys, when both are set, take precedence over the default
    /// AWS credential chain.
    pub async fn from_config(config: &Config) -> Self {
        let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(config.s3_region.clone()))
            .load()
            .await;

        let mut builder = aws_sdk_s3::config::Builder::from(&sdk_config);

        if let Some(endpoint) = &config.s3_endpoint {
            tracing::info!(endpoint = %endpoint, "Using custom S3 endpoint with path-style addressing");
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        match (&config.s3_access_key, &config.s3_secret_key) {
            (Some(access_key), Some(secret_key)) => {
                builder = builder.credentials_provider(Credentials::new(
                    access_key,
                    secret_key,
                    None,
                    None,
                    "voice-forge-static",
                ));
            }
            _ => {
                tracing::warn!("S3 static credentials not set. Falling back to the default AWS credential chain");
            }
        }

        let s3_client = S3Client::from_conf(builder.build());
        Self::new(Arc::new(s3_client), config.s3_bucket.clone(), config.s3_region.clone())
    }

    /// Create the bucket if needed and allow browsers to fetch signed URLs
    pub async fn ensure_bucket(&self) -> Result<(), StorageError> {
        let mut request = self.s3_client.create_bucket().bucket(&self.bucket);
        if self.region != "us-east-1" {
            request = request.create_bucket_configuration(
                CreateBucketConfiguration::builder()
                    .location_constraint(BucketLocationConstraint::from(self.region.as_str()))
                    .build(),
            );
        }

        match request.send().await {
            Ok(_) => tracing::info!(bucket = %self.bucket, "Bucket created"),
            Err(e) => {
                let service_error = e.into_service_error();
                if service_error.is_bucket_already_owned_by_you()
                    || service_error.is_bucket_already_exists()
                {
                    tracing::debug!(bucket = %self.bucket, "Bucket already exists");
                } else {
                    return Err(StorageError::Backend(format!(
                        "failed to create bucket {}: {}",
                        self.bucket, service_error
                    )));
                }
            }
        }

        let rule = CorsRule::builder()
            .allowed_origins("*")
            .allowed_methods("GET")
            .allowed_methods("PUT")
            .allowed_methods("POST")
            .allowed_methods("DELETE")
            .allowed_methods("HEAD")
            .allowed_headers("*")
            .expose_headers("ETag")
            .max_age_seconds(3600)
            .build()
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        let cors = CorsConfiguration::builder()
            .cors_rules(rule)
            .build()
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        self.s3_client
            .put_bucket_cors()
            .bucket(&self.bucket)
            .cors_configuration(cors)
            .send()
            .await
            .map_err(|e| StorageError::Backend(format!("failed to set bucket CORS: {}", e)))?;

        Ok(())
    }
}

#[async_trait]
impl ArtifactStore for S3ArtifactStore {
    async fn put(&self, key: &ArtifactKey, bytes: Vec<u8>) -> Result<(), StorageError> {
        let start_time = Instant::now();
        let path = key.to_string();
        let size = bytes.len();

        self.s3_client
            .put_object()
            .bucket(&self.bucket)
            .key(&path)
            .content_type(key.content_type())
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    error = ?e,
                    bucket = %self.bucket,
                    key = %path,
                    "S3 put_object failed"
                );
                StorageError::Backend(format!("failed to store {}: {}", path, e))
            })?;

        tracing::info!(
            provider = "s3",
            key = %path,
            size_bytes = size,
            latency_ms = start_time.elapsed().as_millis(),
            "Artifact stored"
        );

        Ok(())
    }

    async fn get(&self, path: &str) -> Result<Vec<u8>, StorageError> {
        let output = self
            .s3_client
            .get_object()
            .bucket(&self.bucket)
            .key(path)
            .send()
            .await
            .map_err(|e| {
                let service_error = e.into_service_error();
                if service_error.is_no_such_key() {
                    StorageError::NotFound(path.to_string())
                } else {
                    StorageError::Backend(format!("failed to fetch {}: {}", path, service_error))
                }
            })?;

        let data = output.body.collect().await.map_err(|e| {
            tracing::error!(error = %e, key = %path, "Failed to read S3 object body");
            StorageError::Backend(format!("failed to read {}: {}", path, e))
        })?;

        Ok(data.into_bytes().to_vec())
    }

    async fn delete(&self, path: &str) -> Result<(), StorageError> {
        self.s3_client
            .delete_object()
            .bucket(&self.bucket)
            .key(path)
            .send()
            .await
            .map_err(|e| StorageError::Backend(format!("failed to delete {}: {}", path, e)))?;
        Ok(())
    }

    async fn signed_url(&self, path: &str, expires_in: Duration) -> Result<String, StorageError> {
        let presigning = PresigningConfig::expires_in(expires_in)
            .map_err(|e| StorageError::Backend(format!("invalid signed URL expiry: {}", e)))?;

        let request = self
            .s3_client
            .get_object()
            .bucket(&self.bucket)
            .key(path)
            .presigned(presigning)
            .await
            .map_err(|e| StorageError::Backend(format!("failed to sign {}: {}", path, e)))?;

        Ok(request.uri().to_string())
    }

    async fn health_check(&self) -> bool {
        self.s3_client
            .head_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .is_ok()
    }
}
