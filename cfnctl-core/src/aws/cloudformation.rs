//! CloudFormation client wrapper
//!
//! [`CloudFormationApi`] is the narrow surface the orchestration code talks to.
//! [`AwsCloudFormationClient`] backs it with the AWS SDK; tests back it with
//! scripted fakes.

use async_trait::async_trait;
use aws_sdk_cloudformation::types::{Capability, ChangeSetType as SdkChangeSetType, Parameter as SdkParameter};
use aws_sdk_cloudformation::Client as CfnClient;

use super::{remote_error, RemoteError, TextField};
use crate::types::{
    ChangeSetDescription, ChangeSetRequest, Page, ParameterSet, StackEvent,
    StackInstanceSummary, StackSetOperationSummary, StackSetRequest, StackSetSummary,
    StackSummary,
};

pub type RemoteResult<T> = Result<T, RemoteError>;

/// Stack control-plane calls used by cfnctl. Every method is one remote request.
#[async_trait]
pub trait CloudFormationApi: Send + Sync {
    async fn describe_stacks(&self, stack_name: &str) -> RemoteResult<Vec<StackSummary>>;

    async fn create_change_set(&self, request: &ChangeSetRequest) -> RemoteResult<()>;

    async fn describe_change_set(
        &self,
        change_set_name: &str,
        stack_name: &str,
    ) -> RemoteResult<ChangeSetDescription>;

    async fn execute_change_set(
        &self,
        change_set_name: &str,
        stack_name: &str,
        disable_rollback: bool,
    ) -> RemoteResult<()>;

    async fn describe_stack_events(
        &self,
        stack_name: &str,
        next_token: Option<&str>,
    ) -> RemoteResult<Page<StackEvent>>;

    /// Returns the new stack set id.
    async fn create_stack_set(&self, request: &StackSetRequest) -> RemoteResult<Option<String>>;

    /// Returns the id of the update operation.
    async fn update_stack_set(&self, request: &StackSetRequest) -> RemoteResult<Option<String>>;

    async fn list_stack_set_operations(
        &self,
        stack_set_name: &str,
        next_token: Option<&str>,
    ) -> RemoteResult<Page<StackSetOperationSummary>>;

    async fn list_stack_sets(&self, next_token: Option<&str>) -> RemoteResult<Page<StackSetSummary>>;

    /// Single request, no pagination.
    async fn list_stack_instances(&self, stack_set_name: &str) -> RemoteResult<Vec<StackInstanceSummary>>;

    async fn create_stack_instances(
        &self,
        stack_set_name: &str,
        accounts: &[String],
        regions: &[String],
    ) -> RemoteResult<Option<String>>;

    async fn update_stack_instances(
        &self,
        stack_set_name: &str,
        accounts: &[String],
        regions: &[String],
    ) -> RemoteResult<Option<String>>;
}

pub struct AwsCloudFormationClient {
    client: CfnClient,
}

impl AwsCloudFormationClient {
    pub fn new(client: CfnClient) -> Self {
        Self { client }
    }
}

fn sdk_parameters(parameters: &ParameterSet) -> Vec<SdkParameter> {
    parameters
        .iter()
        .map(|p| {
            SdkParameter::builder()
                .parameter_key(&p.key)
                .parameter_value(&p.value)
                .build()
        })
        .collect()
}

fn sdk_capabilities(capabilities: &[String]) -> Vec<Capability> {
    capabilities.iter().map(|c| Capability::from(c.as_str())).collect()
}

#[async_trait]
impl CloudFormationApi for AwsCloudFormationClient {
    async fn describe_stacks(&self, stack_name: &str) -> RemoteResult<Vec<StackSummary>> {
        let response = self
            .client
            .describe_stacks()
            .stack_name(stack_name)
            .send()
            .await
            .map_err(|e| remote_error("DescribeStacks", e))?;

        Ok(response
            .stacks()
            .iter()
            .map(|stack| StackSummary {
                name: stack.stack_name().text(),
                status: stack.stack_status().text(),
            })
            .collect())
    }

    async fn create_change_set(&self, request: &ChangeSetRequest) -> RemoteResult<()> {
        self.client
            .create_change_set()
            .stack_name(&request.stack_name)
            .template_url(&request.template_url)
            .use_previous_template(false)
            .set_parameters(Some(sdk_parameters(&request.parameters)))
            .set_capabilities(Some(sdk_capabilities(&request.capabilities)))
            .change_set_name(&request.change_set_name)
            .change_set_type(SdkChangeSetType::from(request.change_set_type.as_str()))
            .send()
            .await
            .map_err(|e| remote_error("CreateChangeSet", e))?;
        Ok(())
    }

    async fn describe_change_set(
        &self,
        change_set_name: &str,
        stack_name: &str,
    ) -> RemoteResult<ChangeSetDescription> {
        let response = self
            .client
            .describe_change_set()
            .change_set_name(change_set_name)
            .stack_name(stack_name)
            .send()
            .await
            .map_err(|e| remote_error("DescribeChangeSet", e))?;

        Ok(ChangeSetDescription {
            status: response.status().text(),
            status_reason: response.status_reason().map(str::to_string),
        })
    }

    async fn execute_change_set(
        &self,
        change_set_name: &str,
        stack_name: &str,
        disable_rollback: bool,
    ) -> RemoteResult<()> {
        self.client
            .execute_change_set()
            .change_set_name(change_set_name)
            .stack_name(stack_name)
            .disable_rollback(disable_rollback)
            .send()
            .await
            .map_err(|e| remote_error("ExecuteChangeSet", e))?;
        Ok(())
    }

    async fn describe_stack_events(
        &self,
        stack_name: &str,
        next_token: Option<&str>,
    ) -> RemoteResult<Page<StackEvent>> {
        let response = self
            .client
            .describe_stack_events()
            .stack_name(stack_name)
            .set_next_token(next_token.map(str::to_string))
            .send()
            .await
            .map_err(|e| remote_error("DescribeStackEvents", e))?;

        let items = response
            .stack_events()
            .iter()
            .map(|event| StackEvent {
                event_id: event.event_id().text(),
                logical_resource_id: event.logical_resource_id().text(),
                resource_status: event.resource_status().text(),
                reason: event.resource_status_reason().map(str::to_string),
            })
            .collect();

        Ok(Page {
            items,
            next_token: response.next_token().map(str::to_string),
        })
    }

    async fn create_stack_set(&self, request: &StackSetRequest) -> RemoteResult<Option<String>> {
        let response = self
            .client
            .create_stack_set()
            .stack_set_name(&request.name)
            .set_description(request.description.clone())
            .template_url(&request.template_url)
            .set_parameters(Some(sdk_parameters(&request.parameters)))
            .set_capabilities(Some(sdk_capabilities(&request.capabilities)))
            .execution_role_name(&request.execution_role)
            .send()
            .await
            .map_err(|e| remote_error("CreateStackSet", e))?;
        Ok(response.stack_set_id().map(str::to_string))
    }

    async fn update_stack_set(&self, request: &StackSetRequest) -> RemoteResult<Option<String>> {
        let response = self
            .client
            .update_stack_set()
            .stack_set_name(&request.name)
            .template_url(&request.template_url)
            .set_parameters(Some(sdk_parameters(&request.parameters)))
            .set_capabilities(Some(sdk_capabilities(&request.capabilities)))
            .execution_role_name(&request.execution_role)
            .send()
            .await
            .map_err(|e| remote_error("UpdateStackSet", e))?;
        Ok(response.operation_id().map(str::to_string))
    }

    async fn list_stack_set_operations(
        &self,
        stack_set_name: &str,
        next_token: Option<&str>,
    ) -> RemoteResult<Page<StackSetOperationSummary>> {
        let response = self
            .client
            .list_stack_set_operations()
            .stack_set_name(stack_set_name)
            .set_next_token(next_token.map(str::to_string))
            .send()
            .await
            .map_err(|e| remote_error("ListStackSetOperations", e))?;

        let items = response
            .summaries()
            .iter()
            .map(|op| StackSetOperationSummary {
                status: op.status().text(),
            })
            .collect();

        Ok(Page {
            items,
            next_token: response.next_token().map(str::to_string),
        })
    }

    async fn list_stack_sets(&self, next_token: Option<&str>) -> RemoteResult<Page<StackSetSummary>> {
        let response = self
            .client
            .list_stack_sets()
            .set_next_token(next_token.map(str::to_string))
            .send()
            .await
            .map_err(|e| remote_error("ListStackSets", e))?;

        let items = response
            .summaries()
            .iter()
            .map(|summary| StackSetSummary {
                name: summary.stack_set_name().text(),
            })
            .collect();

        Ok(Page {
            items,
            next_token: response.next_token().map(str::to_string),
        })
    }

    async fn list_stack_instances(&self, stack_set_name: &str) -> RemoteResult<Vec<StackInstanceSummary>> {
        let response = self
            .client
            .list_stack_instances()
            .stack_set_name(stack_set_name)
            .send()
            .await
            .map_err(|e| remote_error("ListStackInstances", e))?;

        Ok(response
            .summaries()
            .iter()
            .map(|instance| StackInstanceSummary {
                account: instance.account().text(),
            })
            .collect())
    }

    async fn create_stack_instances(
        &self,
        stack_set_name: &str,
        accounts: &[String],
        regions: &[String],
    ) -> RemoteResult<Option<String>> {
        let response = self
            .client
            .create_stack_instances()
            .stack_set_name(stack_set_name)
            .set_accounts(Some(accounts.to_vec()))
            .set_regions(Some(regions.to_vec()))
            .send()
            .await
            .map_err(|e| remote_error("CreateStackInstances", e))?;
        Ok(response.operation_id().map(str::to_string))
    }

    async fn update_stack_instances(
        &self,
        stack_set_name: &str,
        accounts: &[String],
        regions: &[String],
    ) -> RemoteResult<Option<String>> {
        let response = self
            .client
            .update_stack_instances()
            .stack_set_name(stack_set_name)
            .set_accounts(Some(accounts.to_vec()))
            .set_regions(Some(regions.to_vec()))
            .send()
            .await
            .map_err(|e| remote_error("UpdateStackInstances", e))?;
        Ok(response.operation_id().map(str::to_string))
    }
}
