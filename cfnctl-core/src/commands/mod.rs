//! Commands module - service layer for cfnctl operations

mod deploy;
mod package;
pub(crate) mod service;

pub use deploy::DeployReport;
pub use package::{PackageReport, LAMBDA_PREFIX};
pub use service::CfnctlService;
