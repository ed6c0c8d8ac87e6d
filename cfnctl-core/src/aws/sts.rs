//! Caller identity lookup

use crate::aws::{AwsError, AwsResult};
use aws_sdk_sts::Client as StsClient;

/// Account id of the credentials in use.
pub(crate) async fn caller_account_id(client: &StsClient) -> AwsResult<String> {
    let identity = client
        .get_caller_identity()
        .send()
        .await
        .map_err(|e| AwsError::Identity(format!("Failed to get caller identity: {e}")))?;

    identity
        .account()
        .map(str::to_string)
        .ok_or_else(|| AwsError::Identity("Caller identity has no account id".to_string()))
}
