//! Staging bucket handling
//!
//! Makes sure a versioned staging bucket exists, maps local templates and
//! archives to S3 keys and URLs, and uploads them. Locations that are already
//! `http(s)://` URLs pass through untouched.

use log::info;
use std::path::Path;

use crate::aws::s3::ObjectStorageApi;
use crate::error::{CfnctlError, CfnctlResult};

/// Host used when building public object URLs.
pub const STORAGE_HOST: &str = "s3.amazonaws.com";

const STAGING_BUCKET_PREFIX: &str = "cfnctl-staging-bucket";

/// True when `location` starts with an `http://` or `https://` scheme.
pub fn is_url(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

/// Staging bucket name for an account in a region.
pub fn staging_bucket_name(region: &str, account_id: &str) -> String {
    format!("{STAGING_BUCKET_PREFIX}-{region}-{account_id}")
}

/// Object key for `resource` under `prefix`: `{prefix}/{basename(resource)}`.
pub fn s3_key(prefix: &str, resource: &str) -> String {
    let base = Path::new(resource)
        .file_name()
        .map_or_else(|| resource.to_string(), |name| name.to_string_lossy().into_owned());
    format!("{prefix}/{base}")
}

/// Public URL of `resource` once staged under `prefix` in `bucket`.
pub fn file_url(bucket: &str, prefix: &str, resource: &str) -> String {
    if is_url(resource) {
        return resource.to_string();
    }
    format!("https://{STORAGE_HOST}/{bucket}/{}", s3_key(prefix, resource))
}

/// Return the staging bucket for this account and region, creating it with
/// versioning enabled when it is missing.
///
/// A bucket that gets created but fails to have versioning enabled is left
/// in place and the error is returned.
pub async fn ensure_staging_bucket(
    storage: &dyn ObjectStorageApi,
    region: &str,
    account_id: &str,
) -> CfnctlResult<String> {
    let bucket = staging_bucket_name(region, account_id);
    info!("Verifying S3 bucket {} exists", bucket);

    let buckets = storage.list_buckets().await.map_err(CfnctlError::storage)?;
    if buckets.iter().any(|name| *name == bucket) {
        info!("Bucket exists");
        return Ok(bucket);
    }

    info!("No S3 bucket found, creating {}", bucket);
    storage
        .create_bucket(&bucket, region)
        .await
        .map_err(CfnctlError::storage)?;
    storage
        .put_bucket_versioning(&bucket)
        .await
        .map_err(CfnctlError::storage)?;
    Ok(bucket)
}

/// Upload a local file to `{prefix}/{basename}` in `bucket`.
///
/// Returns the object key, or `None` when `resource` is a URL and nothing was
/// uploaded.
pub async fn upload_file(
    storage: &dyn ObjectStorageApi,
    prefix: &str,
    bucket: &str,
    resource: &str,
) -> CfnctlResult<Option<String>> {
    if is_url(resource) {
        return Ok(None);
    }

    let path = Path::new(resource);
    if !path.is_file() {
        return Err(CfnctlError::invalid_input(format!(
            "'{resource}' is neither a URL nor a readable file"
        )));
    }

    let key = s3_key(prefix, resource);
    info!("Uploading file {} to s3://{}/{}", resource, bucket, key);
    storage
        .upload_file(path, bucket, &key)
        .await
        .map_err(CfnctlError::storage)?;
    Ok(Some(key))
}

/// Stage a template for `stack` and return the URL CloudFormation should read.
pub async fn staged_path(
    storage: &dyn ObjectStorageApi,
    bucket: &str,
    stack: &str,
    resource: &str,
) -> CfnctlResult<String> {
    upload_file(storage, stack, bucket, resource).await?;
    Ok(file_url(bucket, stack, resource))
}
