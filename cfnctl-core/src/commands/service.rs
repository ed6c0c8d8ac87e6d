//! cfnctl service layer
//!
//! [`CfnctlService`] owns the control-plane clients and the resolved
//! [`AwsContext`], and exposes the high-level `deploy` and `package`
//! operations used by the CLI.

use aws_config::{BehaviorVersion, Region};
use aws_sdk_cloudformation::Client as CfnClient;
use aws_sdk_s3::Client as S3Client;
use aws_sdk_sts::Client as StsClient;
use log::{debug, info};

use crate::aws::cloudformation::{AwsCloudFormationClient, CloudFormationApi};
use crate::aws::s3::{AwsS3Client, ObjectStorageApi};
use crate::aws::{sts, AwsError};
use crate::config::AwsContext;
use crate::error::CfnctlResult;
use crate::polling::{Pause, PollSettings, TokioPause};
use crate::storage::ensure_staging_bucket;

/// Main service struct holding the AWS clients and per-run settings.
pub struct CfnctlService {
    pub(crate) cfn: Box<dyn CloudFormationApi>,
    pub(crate) storage: Box<dyn ObjectStorageApi>,
    pub(crate) pause: Box<dyn Pause>,
    pub(crate) context: AwsContext,
    pub(crate) poll: PollSettings,
}

impl CfnctlService {
    /// Create a service backed by the AWS SDK.
    ///
    /// Credentials come from the default provider chain. `profile` and
    /// `region` override what the chain would pick. The caller's account id
    /// is looked up once here.
    ///
    /// # Errors
    ///
    /// Returns an error when no region can be resolved or the caller identity
    /// cannot be determined.
    pub async fn new(profile: Option<&str>, region: Option<&str>) -> CfnctlResult<Self> {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(profile) = profile {
            loader = loader.profile_name(profile);
        }
        if let Some(region) = region {
            loader = loader.region(Region::new(region.to_string()));
        }
        let config = loader.load().await;

        let region = config
            .region()
            .map(ToString::to_string)
            .ok_or_else(|| {
                AwsError::ConfigError(
                    "No AWS region configured. Pass --region or set AWS_REGION".to_string(),
                )
            })?;
        let account_id = sts::caller_account_id(&StsClient::new(&config)).await?;
        debug!("Running in account {} region {}", account_id, region);

        Ok(Self::with_clients(
            Box::new(AwsCloudFormationClient::new(CfnClient::new(&config))),
            Box::new(AwsS3Client::new(S3Client::new(&config))),
            Box::new(TokioPause),
            AwsContext { region, account_id },
        ))
    }

    /// Create a service from already-built clients.
    pub fn with_clients(
        cfn: Box<dyn CloudFormationApi>,
        storage: Box<dyn ObjectStorageApi>,
        pause: Box<dyn Pause>,
        context: AwsContext,
    ) -> Self {
        Self {
            cfn,
            storage,
            pause,
            context,
            poll: PollSettings::default(),
        }
    }

    #[must_use]
    pub fn with_poll_settings(mut self, poll: PollSettings) -> Self {
        self.poll = poll;
        self
    }

    pub fn context(&self) -> &AwsContext {
        &self.context
    }

    /// The bucket to stage into: `requested` when given, otherwise the
    /// account's staging bucket, created on first use.
    pub(crate) async fn resolve_bucket(&self, requested: Option<&str>) -> CfnctlResult<String> {
        match requested {
            Some(bucket) => {
                info!("Using bucket {}", bucket);
                Ok(bucket.to_string())
            }
            None => {
                ensure_staging_bucket(
                    self.storage.as_ref(),
                    &self.context.region,
                    &self.context.account_id,
                )
                .await
            }
        }
    }

    // deploy() is implemented in deploy.rs
    // package() is implemented in package.rs
}
