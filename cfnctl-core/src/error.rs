//! Crate-level error type

use crate::aws::{AwsError, RemoteError};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CfnctlError {
    #[error(transparent)]
    Aws(#[from] AwsError),

    #[error("Failed to render parameter file '{path}': {message}")]
    ParameterRender { path: PathBuf, message: String },

    #[error("Invalid parameter file '{path}': {message}")]
    ParameterParse { path: PathBuf, message: String },

    #[error("Failed to {operation} '{path}': {source}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write archive '{path}': {message}")]
    Archive { path: PathBuf, message: String },

    #[error("Gave up waiting for {target} after {polls} polls")]
    PollLimitExceeded { target: String, polls: u32 },

    #[error("Stack '{stack}' finished in {status}")]
    StackFailed { stack: String, status: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl CfnctlError {
    pub fn io(operation: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Wrap a failed CloudFormation call.
    pub fn cloudformation(err: RemoteError) -> Self {
        Self::Aws(AwsError::CloudFormation(err))
    }

    /// Wrap a failed S3 call.
    pub fn storage(err: RemoteError) -> Self {
        Self::Aws(AwsError::Storage(err))
    }
}

pub type CfnctlResult<T> = Result<T, CfnctlError>;
