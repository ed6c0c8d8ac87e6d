//! Lambda packaging logic for the cfnctl service

use log::info;
use std::path::PathBuf;

use crate::archive::{default_archive_path, zip_dir};
use crate::config::PackageOptions;
use crate::error::{CfnctlError, CfnctlResult};
use crate::storage::{file_url, upload_file};

/// Key prefix for uploaded code archives.
pub const LAMBDA_PREFIX: &str = "lambda";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageReport {
    pub archive: PathBuf,
    pub bucket: String,
    pub url: String,
}

impl super::service::CfnctlService {
    /// Zip a source directory and upload it to `lambda/{archive name}`.
    pub async fn package(&self, options: &PackageOptions) -> CfnctlResult<PackageReport> {
        let output = options
            .output
            .clone()
            .unwrap_or_else(|| default_archive_path(&options.source));
        let source = options.source.clone();
        let target = output.clone();

        let archive = tokio::task::spawn_blocking(move || zip_dir(&source, &target))
            .await
            .map_err(|e| CfnctlError::Archive {
                path: output,
                message: e.to_string(),
            })??;

        let bucket = self.resolve_bucket(options.bucket.as_deref()).await?;
        let archive_name = archive.to_string_lossy().into_owned();
        upload_file(self.storage.as_ref(), LAMBDA_PREFIX, &bucket, &archive_name).await?;

        let url = file_url(&bucket, LAMBDA_PREFIX, &archive_name);
        info!("Lambda archive available at {}", url);
        Ok(PackageReport {
            archive,
            bucket,
            url,
        })
    }
}
