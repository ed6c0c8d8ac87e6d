//! Deploy logic for the cfnctl service

use log::info;

use crate::config::DeployOptions;
use crate::error::{CfnctlError, CfnctlResult};
use crate::parameters::load_parameters;
use crate::stack::change_set::CHANGE_SET_READY;
use crate::stack::{
    execute_change_set, make_change_set, wait_for_change_set_status, wait_for_stack,
    StackCompletion,
};
use crate::stack_set::{
    deploy_stack_set, deploy_stacks, wait_for_stack_set, InstanceDeployment, StackSetAction,
};
use crate::storage::{is_url, staged_path};
use crate::types::ParameterSet;

/// What a successful deployment did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployReport {
    Stack {
        stack: String,
        change_set: String,
        completion: StackCompletion,
    },
    /// The change set could not be created, so nothing was executed. A
    /// redeploy without changes ends here.
    ChangeSetFailed {
        stack: String,
        change_set: String,
        reason: Option<String>,
    },
    StackSet {
        name: String,
        action: StackSetAction,
        instances: InstanceDeployment,
    },
}

impl super::service::CfnctlService {
    /// Deploy a template as a single stack or as a stack set.
    ///
    /// A change set that fails to create is reported, not raised. A stack that
    /// settles in a status other than `CREATE_COMPLETE`/`UPDATE_COMPLETE` is
    /// an error.
    pub async fn deploy(&self, options: &DeployOptions) -> CfnctlResult<DeployReport> {
        if options.stack_name.is_empty() {
            return Err(CfnctlError::invalid_input("Stack name must not be empty"));
        }
        if options.stack_set && options.accounts.is_empty() {
            return Err(CfnctlError::invalid_input(
                "Stack set deployment needs at least one target account",
            ));
        }

        let parameters = load_parameters(options.parameters_file.as_deref())?;
        let template_url = self.template_url(options).await?;

        if options.stack_set {
            self.deploy_set(options, &template_url, &parameters).await
        } else {
            self.deploy_stack(options, &template_url, &parameters).await
        }
    }

    async fn template_url(&self, options: &DeployOptions) -> CfnctlResult<String> {
        if is_url(&options.template) {
            return Ok(options.template.clone());
        }
        let bucket = self.resolve_bucket(options.bucket.as_deref()).await?;
        staged_path(
            self.storage.as_ref(),
            &bucket,
            &options.stack_name,
            &options.template,
        )
        .await
    }

    async fn deploy_stack(
        &self,
        options: &DeployOptions,
        template_url: &str,
        parameters: &ParameterSet,
    ) -> CfnctlResult<DeployReport> {
        let stack = options.stack_name.as_str();
        let cfn = self.cfn.as_ref();
        let pause = self.pause.as_ref();

        let change_set = make_change_set(cfn, stack, template_url, parameters).await?;
        let settled =
            wait_for_change_set_status(cfn, pause, &self.poll, &change_set, stack).await?;
        if settled.status != CHANGE_SET_READY {
            return Ok(DeployReport::ChangeSetFailed {
                stack: stack.to_string(),
                change_set,
                reason: settled.status_reason,
            });
        }

        execute_change_set(cfn, &change_set, stack, options.no_rollback).await?;
        let completion = wait_for_stack(cfn, pause, &self.poll, stack).await?;
        if !completion.succeeded() {
            return Err(CfnctlError::StackFailed {
                stack: stack.to_string(),
                status: completion.status,
            });
        }

        Ok(DeployReport::Stack {
            stack: stack.to_string(),
            change_set,
            completion,
        })
    }

    async fn deploy_set(
        &self,
        options: &DeployOptions,
        template_url: &str,
        parameters: &ParameterSet,
    ) -> CfnctlResult<DeployReport> {
        let name = options.stack_name.as_str();
        let cfn = self.cfn.as_ref();
        let pause = self.pause.as_ref();

        let action = deploy_stack_set(
            cfn,
            name,
            template_url,
            parameters,
            options.execution_role.as_deref(),
        )
        .await?;
        wait_for_stack_set(cfn, pause, &self.poll, name).await?;

        let instances = deploy_stacks(cfn, name, &options.accounts).await?;
        wait_for_stack_set(cfn, pause, &self.poll, name).await?;
        info!("Stack set {} deployed to {} accounts", name, instances.accounts.len());

        Ok(DeployReport::StackSet {
            name: name.to_string(),
            action,
            instances,
        })
    }
}
