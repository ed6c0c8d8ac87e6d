//! AWS SDK integration: CloudFormation and S3 client wrappers, caller identity.

pub mod cloudformation;
pub mod s3;
pub(crate) mod sts;

use aws_sdk_cloudformation::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use thiserror::Error;

/// Substring CloudFormation puts in the message of a describe call against a
/// stack that is absent. The API has no dedicated error code for this case.
const NOT_FOUND_MARKER: &str = "not exist";

/// How a failed remote call should be treated by the orchestration layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteErrorKind {
    /// The addressed stack or stack set does not exist.
    NotFound,
    /// Anything else. Fatal for the current command.
    Other,
}

/// A failed call against one of the control-plane APIs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{operation} failed: {message}")]
pub struct RemoteError {
    pub operation: String,
    pub code: Option<String>,
    pub message: String,
}

impl RemoteError {
    pub fn new(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            code: None,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Classify the failure. Only the message text is inspected; swap this for
    /// an error-code match if the provider ever returns one.
    pub fn classify(&self) -> RemoteErrorKind {
        if self.message.contains(NOT_FOUND_MARKER) {
            RemoteErrorKind::NotFound
        } else {
            RemoteErrorKind::Other
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.classify() == RemoteErrorKind::NotFound
    }
}

#[derive(Error, Debug)]
pub enum AwsError {
    #[error("AWS configuration error: {0}")]
    ConfigError(String),
    #[error("CloudFormation error: {0}")]
    CloudFormation(RemoteError),
    #[error("S3 error: {0}")]
    Storage(RemoteError),
    #[error("STS error: {0}")]
    Identity(String),
}

pub type AwsResult<T> = Result<T, AwsError>;

/// Flatten an SDK failure into a [`RemoteError`], keeping the service's own
/// code and message when it sent one.
pub(crate) fn remote_error<E, R>(operation: &str, err: SdkError<E, R>) -> RemoteError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    let message = err
        .message()
        .map_or_else(|| DisplayErrorContext(&err).to_string(), str::to_string);
    let error = RemoteError::new(operation, message);
    match err.code() {
        Some(code) => error.with_code(code),
        None => error,
    }
}

/// Owned text out of an SDK getter. Required members come back as `&T`,
/// optional ones as `Option<&T>`; a missing value becomes an empty string.
pub(crate) trait TextField {
    fn text(self) -> String;
}

impl<T: AsRef<str> + ?Sized> TextField for &T {
    fn text(self) -> String {
        self.as_ref().to_string()
    }
}

impl<T: AsRef<str> + ?Sized> TextField for Option<&T> {
    fn text(self) -> String {
        self.map(|value| value.as_ref().to_string()).unwrap_or_default()
    }
}
