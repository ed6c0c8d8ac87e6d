//! S3 client wrapper for the staging bucket

use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{
    BucketLocationConstraint, BucketVersioningStatus, CreateBucketConfiguration,
    VersioningConfiguration,
};
use aws_sdk_s3::Client as S3Client;
use std::path::Path;

use super::{remote_error, RemoteError};

/// Region where S3 rejects an explicit location constraint.
const DEFAULT_BUCKET_REGION: &str = "us-east-1";

/// Object storage calls used by cfnctl. Each method is a single attempt.
#[async_trait]
pub trait ObjectStorageApi: Send + Sync {
    async fn list_buckets(&self) -> Result<Vec<String>, RemoteError>;

    async fn create_bucket(&self, bucket: &str, region: &str) -> Result<(), RemoteError>;

    async fn put_bucket_versioning(&self, bucket: &str) -> Result<(), RemoteError>;

    async fn upload_file(&self, file: &Path, bucket: &str, key: &str) -> Result<(), RemoteError>;
}

pub struct AwsS3Client {
    client: S3Client,
}

impl AwsS3Client {
    pub fn new(client: S3Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ObjectStorageApi for AwsS3Client {
    async fn list_buckets(&self) -> Result<Vec<String>, RemoteError> {
        let response = self
            .client
            .list_buckets()
            .send()
            .await
            .map_err(|e| remote_error("ListBuckets", e))?;

        Ok(response
            .buckets()
            .iter()
            .filter_map(|bucket| bucket.name().map(str::to_string))
            .collect())
    }

    async fn create_bucket(&self, bucket: &str, region: &str) -> Result<(), RemoteError> {
        let mut request = self.client.create_bucket().bucket(bucket);
        if region != DEFAULT_BUCKET_REGION {
            request = request.create_bucket_configuration(
                CreateBucketConfiguration::builder()
                    .location_constraint(BucketLocationConstraint::from(region))
                    .build(),
            );
        }
        request
            .send()
            .await
            .map_err(|e| remote_error("CreateBucket", e))?;
        Ok(())
    }

    async fn put_bucket_versioning(&self, bucket: &str) -> Result<(), RemoteError> {
        self.client
            .put_bucket_versioning()
            .bucket(bucket)
            .versioning_configuration(
                VersioningConfiguration::builder()
                    .status(BucketVersioningStatus::Enabled)
                    .build(),
            )
            .send()
            .await
            .map_err(|e| remote_error("PutBucketVersioning", e))?;
        Ok(())
    }

    async fn upload_file(&self, file: &Path, bucket: &str, key: &str) -> Result<(), RemoteError> {
        let body = ByteStream::from_path(file).await.map_err(|e| {
            RemoteError::new(
                "PutObject",
                format!("Failed to read '{}': {e}", file.display()),
            )
        })?;

        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(body)
            .send()
            .await
            .map_err(|e| remote_error("PutObject", e))?;
        Ok(())
    }
}
