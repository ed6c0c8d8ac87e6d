//! Change set creation, polling and execution for a single stack

use chrono::{DateTime, Local};
use log::{error, info};

use crate::aws::cloudformation::CloudFormationApi;
use crate::error::{CfnctlError, CfnctlResult};
use crate::polling::{Pause, PollBudget, PollSettings};
use crate::types::{
    ChangeSetDescription, ChangeSetRequest, ChangeSetType, ParameterSet, CAPABILITY_NAMED_IAM,
};

/// Change set status once it is ready to execute.
pub const CHANGE_SET_READY: &str = "CREATE_COMPLETE";
/// Change set status when it could not be created.
pub const CHANGE_SET_FAILED: &str = "FAILED";

/// Check whether a stack exists.
///
/// A describe error mentioning "not exist" means no; any other error is
/// returned to the caller.
pub async fn stack_exists(cfn: &dyn CloudFormationApi, name: &str) -> CfnctlResult<bool> {
    info!("Verifying stack {} exists", name);
    match cfn.describe_stacks(name).await {
        Ok(stacks) => Ok(stacks.iter().any(|stack| stack.name == name)),
        Err(err) if err.is_not_found() => Ok(false),
        Err(err) => Err(CfnctlError::cloudformation(err)),
    }
}

/// Unique change set name: the stack name plus a `YYMMDD-HHMMSS` timestamp.
pub fn change_set_name(stack: &str, now: DateTime<Local>) -> String {
    format!("{stack}-{}", now.format("%y%m%d-%H%M%S"))
}

/// Submit a change set against `stack` and return its name without waiting.
///
/// The type is CREATE when the stack does not exist yet and UPDATE otherwise.
/// Existence is checked right before submission; a stack created or deleted
/// concurrently in between is not detected.
pub async fn make_change_set(
    cfn: &dyn CloudFormationApi,
    stack: &str,
    template_url: &str,
    parameters: &ParameterSet,
) -> CfnctlResult<String> {
    info!("Creating change set");
    let exists = stack_exists(cfn, stack).await?;
    let change_set_type = if exists {
        ChangeSetType::Update
    } else {
        ChangeSetType::Create
    };
    let name = change_set_name(stack, Local::now());
    info!("Stack exists: {}", exists);
    info!("Template url: {}", template_url);

    let request = ChangeSetRequest {
        stack_name: stack.to_string(),
        change_set_name: name.clone(),
        template_url: template_url.to_string(),
        parameters: parameters.clone(),
        capabilities: vec![CAPABILITY_NAMED_IAM.to_string()],
        change_set_type,
    };
    cfn.create_change_set(&request)
        .await
        .map_err(CfnctlError::cloudformation)?;
    Ok(name)
}

/// Poll a change set until it is ready (`true`) or failed (`false`).
pub async fn wait_for_change_set(
    cfn: &dyn CloudFormationApi,
    pause: &dyn Pause,
    settings: &PollSettings,
    change_set: &str,
    stack: &str,
) -> CfnctlResult<bool> {
    let settled = wait_for_change_set_status(cfn, pause, settings, change_set, stack).await?;
    Ok(settled.status == CHANGE_SET_READY)
}

/// [`wait_for_change_set`], returning the final description so callers can
/// report the status reason of a failed change set.
pub async fn wait_for_change_set_status(
    cfn: &dyn CloudFormationApi,
    pause: &dyn Pause,
    settings: &PollSettings,
    change_set: &str,
    stack: &str,
) -> CfnctlResult<ChangeSetDescription> {
    let mut budget = PollBudget::new(settings, format!("change set {change_set}"));
    loop {
        budget.tick()?;
        let description = cfn
            .describe_change_set(change_set, stack)
            .await
            .map_err(CfnctlError::cloudformation)?;

        match description.status.as_str() {
            CHANGE_SET_READY => {
                info!("Change set {} created", change_set);
                return Ok(description);
            }
            CHANGE_SET_FAILED => {
                error!("Error: Failed to create change set {}", change_set);
                error!(
                    "{}",
                    description
                        .status_reason
                        .as_deref()
                        .unwrap_or("No reason given")
                );
                return Ok(description);
            }
            status => {
                info!("Waiting for change set creation. Status: {}", status);
                pause.pause(settings.interval).await;
            }
        }
    }
}

/// Start executing a created change set. Does not wait for the stack.
pub async fn execute_change_set(
    cfn: &dyn CloudFormationApi,
    change_set: &str,
    stack: &str,
    disable_rollback: bool,
) -> CfnctlResult<()> {
    info!("Executing change set {}", change_set);
    cfn.execute_change_set(change_set, stack, disable_rollback)
        .await
        .map_err(CfnctlError::cloudformation)
}
