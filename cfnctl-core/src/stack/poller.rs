//! Stack status polling and event streaming
//!
//! After a change set is executed the stack moves through a series of
//! in-progress statuses. [`wait_for_stack`] follows it, logging every stack
//! event once, until the stack lands in one of [`TERMINAL_STACK_STATUSES`].

use log::info;
use std::collections::HashSet;

use crate::aws::cloudformation::CloudFormationApi;
use crate::aws::RemoteError;
use crate::error::{CfnctlError, CfnctlResult};
use crate::polling::{Pause, PollBudget, PollSettings};
use crate::types::StackEvent;

/// Statuses after which a stack does not change without a new operation.
/// Failures are included.
pub const TERMINAL_STACK_STATUSES: [&str; 8] = [
    "CREATE_FAILED",
    "CREATE_COMPLETE",
    "ROLLBACK_COMPLETE",
    "DELETE_FAILED",
    "DELETE_COMPLETE",
    "UPDATE_COMPLETE",
    "UPDATE_ROLLBACK_FAILED",
    "UPDATE_ROLLBACK_COMPLETE",
];

const SUCCESSFUL_STACK_STATUSES: [&str; 2] = ["CREATE_COMPLETE", "UPDATE_COMPLETE"];

pub fn is_terminal_status(status: &str) -> bool {
    TERMINAL_STACK_STATUSES.contains(&status)
}

/// Result of a single stack status query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackCompletion {
    /// The stack reached a terminal status, successful or not.
    pub complete: bool,
    pub status: String,
}

impl StackCompletion {
    pub fn from_status(status: impl Into<String>) -> Self {
        let status = status.into();
        Self {
            complete: is_terminal_status(&status),
            status,
        }
    }

    /// Whether the stack ended up where the deployment wanted it.
    pub fn succeeded(&self) -> bool {
        SUCCESSFUL_STACK_STATUSES.contains(&self.status.as_str())
    }
}

/// Event ids already reported during one wait. Grows monotonically.
#[derive(Debug, Default)]
pub struct SeenEvents {
    ids: HashSet<String>,
}

impl SeenEvents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Events from `events` not reported yet, in page order.
    pub fn unseen<'a>(&self, events: &'a [StackEvent]) -> Vec<&'a StackEvent> {
        events
            .iter()
            .filter(|event| !self.ids.contains(&event.event_id))
            .collect()
    }

    pub fn record(&mut self, events: &[StackEvent]) {
        self.ids
            .extend(events.iter().map(|event| event.event_id.clone()));
    }
}

/// Query a stack's status once.
pub async fn stack_complete(cfn: &dyn CloudFormationApi, name: &str) -> CfnctlResult<StackCompletion> {
    let stacks = cfn
        .describe_stacks(name)
        .await
        .map_err(CfnctlError::cloudformation)?;
    let stack = stacks.into_iter().next().ok_or_else(|| {
        CfnctlError::cloudformation(RemoteError::new(
            "DescribeStacks",
            format!("Stack {name} does not exist"),
        ))
    })?;
    Ok(StackCompletion::from_status(stack.status))
}

fn log_event(event: &StackEvent) {
    info!(
        "{} {} {}",
        event.logical_resource_id,
        event.resource_status,
        event.reason.as_deref().unwrap_or("")
    );
}

/// Block until `stack` reaches a terminal status, logging new stack events as
/// they show up. Returns the final status.
pub async fn wait_for_stack(
    cfn: &dyn CloudFormationApi,
    pause: &dyn Pause,
    settings: &PollSettings,
    stack: &str,
) -> CfnctlResult<StackCompletion> {
    wait_for_stack_with(cfn, pause, settings, stack, &mut log_event).await
}

/// [`wait_for_stack`] with a caller-supplied sink for new events.
pub async fn wait_for_stack_with(
    cfn: &dyn CloudFormationApi,
    pause: &dyn Pause,
    settings: &PollSettings,
    stack: &str,
    on_event: &mut (dyn FnMut(&StackEvent) + Send),
) -> CfnctlResult<StackCompletion> {
    let mut budget = PollBudget::new(settings, format!("stack {stack}"));
    let mut seen = SeenEvents::new();
    let mut next_token: Option<String> = None;

    loop {
        budget.tick()?;
        let page = cfn
            .describe_stack_events(stack, next_token.as_deref())
            .await
            .map_err(CfnctlError::cloudformation)?;

        for event in seen.unseen(&page.items) {
            on_event(event);
        }

        pause.pause(settings.interval).await;

        let completion = stack_complete(cfn, stack).await?;
        if completion.complete {
            info!("Stack finished in {} state", completion.status);
            return Ok(completion);
        }

        seen.record(&page.items);
        next_token = page.next_token;
    }
}
