//! Stack set deployment across accounts
//!
//! A stack set is created or updated from a template, then realised as one
//! stack instance per target account. Instances are always created or updated
//! for the whole requested account list in a single call.

use log::info;

use crate::aws::cloudformation::CloudFormationApi;
use crate::error::{CfnctlError, CfnctlResult};
use crate::polling::{Pause, PollBudget, PollSettings};
use crate::types::{ParameterSet, StackSetRequest, CAPABILITY_NAMED_IAM};

/// Role CloudFormation assumes in target accounts unless one is given.
pub const DEFAULT_EXECUTION_ROLE: &str = "AWSCloudFormationStackSetAdministrationRole";

/// Region every stack instance is deployed to.
pub const INSTANCE_REGION: &str = "us-east-1";

const STACK_SET_DESCRIPTION: &str = "Codepipeline cross account roles";

/// Operation status that blocks further stack set work.
const OPERATION_RUNNING: &str = "RUNNING";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackSetAction {
    Created,
    Updated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstanceAction {
    Created,
    Updated,
}

/// Outcome of [`deploy_stacks`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceDeployment {
    pub action: InstanceAction,
    pub accounts: Vec<String>,
    pub operation_id: Option<String>,
}

/// Check every page of the stack set listing for `name`.
pub async fn stack_set_exists(cfn: &dyn CloudFormationApi, name: &str) -> CfnctlResult<bool> {
    let mut next_token: Option<String> = None;
    loop {
        let page = cfn
            .list_stack_sets(next_token.as_deref())
            .await
            .map_err(CfnctlError::cloudformation)?;

        if page.items.iter().any(|summary| summary.name == name) {
            return Ok(true);
        }

        match page.next_token {
            Some(token) => next_token = Some(token),
            None => return Ok(false),
        }
    }
}

/// Create the stack set, or update it when it already exists.
pub async fn deploy_stack_set(
    cfn: &dyn CloudFormationApi,
    name: &str,
    template_url: &str,
    parameters: &ParameterSet,
    execution_role: Option<&str>,
) -> CfnctlResult<StackSetAction> {
    let exists = stack_set_exists(cfn, name).await?;
    let mut request = StackSetRequest {
        name: name.to_string(),
        description: None,
        template_url: template_url.to_string(),
        parameters: parameters.clone(),
        capabilities: vec![CAPABILITY_NAMED_IAM.to_string()],
        execution_role: execution_role.unwrap_or(DEFAULT_EXECUTION_ROLE).to_string(),
    };

    if exists {
        info!("Updating stack set {}", name);
        cfn.update_stack_set(&request)
            .await
            .map_err(CfnctlError::cloudformation)?;
        Ok(StackSetAction::Updated)
    } else {
        info!("Creating stack set {}", name);
        request.description = Some(STACK_SET_DESCRIPTION.to_string());
        cfn.create_stack_set(&request)
            .await
            .map_err(CfnctlError::cloudformation)?;
        Ok(StackSetAction::Created)
    }
}

/// Wait until no operation on the stack set is running.
///
/// Whenever a page shows a running operation the scan pauses and starts over
/// from the first page.
pub async fn wait_for_stack_set(
    cfn: &dyn CloudFormationApi,
    pause: &dyn Pause,
    settings: &PollSettings,
    name: &str,
) -> CfnctlResult<()> {
    let mut budget = PollBudget::new(settings, format!("stack set {name}"));
    let mut next_token: Option<String> = None;

    loop {
        budget.tick()?;
        let page = cfn
            .list_stack_set_operations(name, next_token.as_deref())
            .await
            .map_err(CfnctlError::cloudformation)?;

        if page.items.iter().any(|op| op.status == OPERATION_RUNNING) {
            info!("Waiting for stack set {} operations to finish", name);
            pause.pause(settings.interval).await;
            next_token = None;
            continue;
        }

        match page.next_token {
            Some(token) => next_token = Some(token),
            None => return Ok(()),
        }
    }
}

/// Requested accounts that have no stack instance yet.
///
/// Each existing instance accounts for one occurrence of its account, so an
/// account requested twice with one instance is still reported once.
pub async fn need_create_stack_instances(
    cfn: &dyn CloudFormationApi,
    name: &str,
    accounts: &[String],
) -> CfnctlResult<Vec<String>> {
    let instances = cfn
        .list_stack_instances(name)
        .await
        .map_err(CfnctlError::cloudformation)?;

    let mut missing = accounts.to_vec();
    for instance in &instances {
        if let Some(index) = missing.iter().position(|account| *account == instance.account) {
            missing.remove(index);
        }
    }
    Ok(missing)
}

/// Requested accounts with repeats dropped, first occurrence wins.
fn unique_accounts(accounts: &[String]) -> Vec<String> {
    let mut unique: Vec<String> = Vec::with_capacity(accounts.len());
    for account in accounts {
        if !unique.contains(account) {
            unique.push(account.clone());
        }
    }
    unique
}

/// Create instances for every account when any account lacks one, otherwise
/// update them all. Both calls receive the full account list, with repeated
/// accounts collapsed.
pub async fn deploy_stacks(
    cfn: &dyn CloudFormationApi,
    name: &str,
    accounts: &[String],
) -> CfnctlResult<InstanceDeployment> {
    let unique = unique_accounts(accounts);
    let accounts = unique.as_slice();
    let missing = need_create_stack_instances(cfn, name, accounts).await?;
    let regions = vec![INSTANCE_REGION.to_string()];

    if missing.is_empty() {
        info!("Updating stack instances for {} accounts", accounts.len());
        let operation_id = cfn
            .update_stack_instances(name, accounts, &regions)
            .await
            .map_err(CfnctlError::cloudformation)?;
        Ok(InstanceDeployment {
            action: InstanceAction::Updated,
            accounts: accounts.to_vec(),
            operation_id,
        })
    } else {
        info!(
            "Creating stack instances, not yet launched in: {}",
            missing.join(", ")
        );
        let operation_id = cfn
            .create_stack_instances(name, accounts, &regions)
            .await
            .map_err(CfnctlError::cloudformation)?;
        Ok(InstanceDeployment {
            action: InstanceAction::Created,
            accounts: accounts.to_vec(),
            operation_id,
        })
    }
}
