//! This crate provides the core logic for cfnctl:
//! - Template staging in a versioned S3 bucket
//! - Change set creation, polling and execution
//! - Stack event streaming until a stack settles
//! - Stack set deployment across accounts
//! - Lambda source packaging
//!

pub mod archive;
pub mod aws;
pub mod commands;
pub mod config;
mod error;
pub mod parameters;
pub mod polling;
pub mod stack;
pub mod stack_set;
pub mod storage;
mod types;

#[cfg(test)]
mod testing;

// Re-exports for a small, focused public API
pub use aws::{AwsError, RemoteError, RemoteErrorKind};
pub use commands::{CfnctlService, DeployReport, PackageReport};
pub use config::{AwsContext, DeployOptions, PackageOptions};
pub use error::{CfnctlError, CfnctlResult};
pub use polling::{Pause, PollSettings, TokioPause, DEFAULT_POLL_INTERVAL};
pub use stack::StackCompletion;
pub use stack_set::{InstanceAction, InstanceDeployment, StackSetAction};
pub use types::{
    ChangeSetDescription, ChangeSetRequest, ChangeSetType, Page, Parameter, ParameterSet,
    StackEvent, StackInstanceSummary, StackSetOperationSummary, StackSetRequest,
    StackSetSummary, StackSummary, CAPABILITY_NAMED_IAM,
};
