//! Per-invocation settings passed explicitly into the command layer.

use std::path::PathBuf;

/// Region and account the tool runs against, resolved once at start-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AwsContext {
    pub region: String,
    pub account_id: String,
}

/// Inputs to a stack or stack set deployment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeployOptions {
    pub stack_name: String,
    /// Local template path or `http(s)://` URL.
    pub template: String,
    /// Staging bucket override. The account's staging bucket is used otherwise.
    pub bucket: Option<String>,
    /// Parameter file override. `parameters.json` is used otherwise.
    pub parameters_file: Option<PathBuf>,
    pub no_rollback: bool,
    /// Deploy as a stack set across `accounts` instead of a single stack.
    pub stack_set: bool,
    pub accounts: Vec<String>,
    pub execution_role: Option<String>,
}

/// Inputs to packaging a directory as deployable code.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageOptions {
    pub source: PathBuf,
    pub output: Option<PathBuf>,
    pub bucket: Option<String>,
}
