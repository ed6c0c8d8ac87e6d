//! Scripted stand-ins for the control-plane adapters, shared by unit tests.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::aws::cloudformation::{CloudFormationApi, RemoteResult};
use crate::aws::s3::ObjectStorageApi;
use crate::aws::RemoteError;
use crate::polling::Pause;
use crate::types::{
    ChangeSetDescription, ChangeSetRequest, Page, StackEvent, StackInstanceSummary,
    StackSetOperationSummary, StackSetRequest, StackSetSummary, StackSummary,
};

/// Every request the fake received, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum CfnCall {
    DescribeStacks(String),
    CreateChangeSet(ChangeSetRequest),
    DescribeChangeSet { change_set: String, stack: String },
    ExecuteChangeSet { change_set: String, stack: String, disable_rollback: bool },
    DescribeStackEvents { stack: String, next_token: Option<String> },
    CreateStackSet(StackSetRequest),
    UpdateStackSet(StackSetRequest),
    ListStackSetOperations { stack_set: String, next_token: Option<String> },
    ListStackSets { next_token: Option<String> },
    ListStackInstances(String),
    CreateStackInstances { stack_set: String, accounts: Vec<String>, regions: Vec<String> },
    UpdateStackInstances { stack_set: String, accounts: Vec<String>, regions: Vec<String> },
}

/// CloudFormation fake answering from per-operation response queues.
/// Running a queue dry panics, which surfaces an unexpected extra call.
/// Clones share state, so a test can keep a handle after boxing one.
#[derive(Clone, Default)]
pub(crate) struct FakeCloudFormation(Arc<CfnState>);

#[derive(Default)]
pub(crate) struct CfnState {
    describe_stacks: Mutex<VecDeque<RemoteResult<Vec<StackSummary>>>>,
    change_sets: Mutex<VecDeque<ChangeSetDescription>>,
    event_pages: Mutex<VecDeque<Page<StackEvent>>>,
    operation_pages: Mutex<VecDeque<Page<StackSetOperationSummary>>>,
    stack_set_pages: Mutex<VecDeque<Page<StackSetSummary>>>,
    instances: Mutex<Vec<StackInstanceSummary>>,
    fail_create_change_set: Mutex<Option<RemoteError>>,
    calls: Mutex<Vec<CfnCall>>,
}

impl Deref for FakeCloudFormation {
    type Target = CfnState;

    fn deref(&self) -> &CfnState {
        &self.0
    }
}

impl FakeCloudFormation {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_describe_stacks(self, response: RemoteResult<Vec<StackSummary>>) -> Self {
        self.describe_stacks.lock().unwrap().push_back(response);
        self
    }

    pub(crate) fn with_stack_status(self, name: &str, status: &str) -> Self {
        self.with_describe_stacks(Ok(vec![stack(name, status)]))
    }

    pub(crate) fn with_change_set_status(self, status: &str, reason: Option<&str>) -> Self {
        self.change_sets.lock().unwrap().push_back(ChangeSetDescription {
            status: status.to_string(),
            status_reason: reason.map(str::to_string),
        });
        self
    }

    pub(crate) fn with_event_page(self, page: Page<StackEvent>) -> Self {
        self.event_pages.lock().unwrap().push_back(page);
        self
    }

    pub(crate) fn with_operation_page(self, page: Page<StackSetOperationSummary>) -> Self {
        self.operation_pages.lock().unwrap().push_back(page);
        self
    }

    pub(crate) fn with_stack_set_page(self, page: Page<StackSetSummary>) -> Self {
        self.stack_set_pages.lock().unwrap().push_back(page);
        self
    }

    pub(crate) fn with_instances(self, accounts: &[&str]) -> Self {
        *self.instances.lock().unwrap() = accounts
            .iter()
            .map(|account| StackInstanceSummary {
                account: (*account).to_string(),
            })
            .collect();
        self
    }

    pub(crate) fn failing_create_change_set(self, err: RemoteError) -> Self {
        *self.fail_create_change_set.lock().unwrap() = Some(err);
        self
    }

    pub(crate) fn calls(&self) -> Vec<CfnCall> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn count(&self, matches: impl Fn(&CfnCall) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| matches(c)).count()
    }

    fn record(&self, call: CfnCall) {
        self.calls.lock().unwrap().push(call);
    }
}

fn next<T>(queue: &Mutex<VecDeque<T>>, operation: &str) -> T {
    queue
        .lock()
        .unwrap()
        .pop_front()
        .unwrap_or_else(|| panic!("unexpected {operation} call: no scripted response left"))
}

#[async_trait]
impl CloudFormationApi for FakeCloudFormation {
    async fn describe_stacks(&self, stack_name: &str) -> RemoteResult<Vec<StackSummary>> {
        self.record(CfnCall::DescribeStacks(stack_name.to_string()));
        next(&self.describe_stacks, "DescribeStacks")
    }

    async fn create_change_set(&self, request: &ChangeSetRequest) -> RemoteResult<()> {
        self.record(CfnCall::CreateChangeSet(request.clone()));
        match self.fail_create_change_set.lock().unwrap().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn describe_change_set(
        &self,
        change_set_name: &str,
        stack_name: &str,
    ) -> RemoteResult<ChangeSetDescription> {
        self.record(CfnCall::DescribeChangeSet {
            change_set: change_set_name.to_string(),
            stack: stack_name.to_string(),
        });
        Ok(next(&self.change_sets, "DescribeChangeSet"))
    }

    async fn execute_change_set(
        &self,
        change_set_name: &str,
        stack_name: &str,
        disable_rollback: bool,
    ) -> RemoteResult<()> {
        self.record(CfnCall::ExecuteChangeSet {
            change_set: change_set_name.to_string(),
            stack: stack_name.to_string(),
            disable_rollback,
        });
        Ok(())
    }

    async fn describe_stack_events(
        &self,
        stack_name: &str,
        next_token: Option<&str>,
    ) -> RemoteResult<Page<StackEvent>> {
        self.record(CfnCall::DescribeStackEvents {
            stack: stack_name.to_string(),
            next_token: next_token.map(str::to_string),
        });
        Ok(next(&self.event_pages, "DescribeStackEvents"))
    }

    async fn create_stack_set(&self, request: &StackSetRequest) -> RemoteResult<Option<String>> {
        self.record(CfnCall::CreateStackSet(request.clone()));
        Ok(Some(format!("{}:stack-set-id", request.name)))
    }

    async fn update_stack_set(&self, request: &StackSetRequest) -> RemoteResult<Option<String>> {
        self.record(CfnCall::UpdateStackSet(request.clone()));
        Ok(Some("update-operation".to_string()))
    }

    async fn list_stack_set_operations(
        &self,
        stack_set_name: &str,
        next_token: Option<&str>,
    ) -> RemoteResult<Page<StackSetOperationSummary>> {
        self.record(CfnCall::ListStackSetOperations {
            stack_set: stack_set_name.to_string(),
            next_token: next_token.map(str::to_string),
        });
        Ok(next(&self.operation_pages, "ListStackSetOperations"))
    }

    async fn list_stack_sets(&self, next_token: Option<&str>) -> RemoteResult<Page<StackSetSummary>> {
        self.record(CfnCall::ListStackSets {
            next_token: next_token.map(str::to_string),
        });
        Ok(next(&self.stack_set_pages, "ListStackSets"))
    }

    async fn list_stack_instances(&self, stack_set_name: &str) -> RemoteResult<Vec<StackInstanceSummary>> {
        self.record(CfnCall::ListStackInstances(stack_set_name.to_string()));
        Ok(self.instances.lock().unwrap().clone())
    }

    async fn create_stack_instances(
        &self,
        stack_set_name: &str,
        accounts: &[String],
        regions: &[String],
    ) -> RemoteResult<Option<String>> {
        self.record(CfnCall::CreateStackInstances {
            stack_set: stack_set_name.to_string(),
            accounts: accounts.to_vec(),
            regions: regions.to_vec(),
        });
        Ok(Some("create-instances-operation".to_string()))
    }

    async fn update_stack_instances(
        &self,
        stack_set_name: &str,
        accounts: &[String],
        regions: &[String],
    ) -> RemoteResult<Option<String>> {
        self.record(CfnCall::UpdateStackInstances {
            stack_set: stack_set_name.to_string(),
            accounts: accounts.to_vec(),
            regions: regions.to_vec(),
        });
        Ok(Some("update-instances-operation".to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum S3Call {
    ListBuckets,
    CreateBucket { bucket: String, region: String },
    PutBucketVersioning(String),
    UploadFile { file: PathBuf, bucket: String, key: String },
}

#[derive(Clone, Default)]
pub(crate) struct FakeStorage(Arc<StorageState>);

#[derive(Default)]
pub(crate) struct StorageState {
    buckets: Mutex<Vec<String>>,
    fail_create_bucket: Mutex<Option<RemoteError>>,
    fail_put_bucket_versioning: Mutex<Option<RemoteError>>,
    calls: Mutex<Vec<S3Call>>,
}

impl Deref for FakeStorage {
    type Target = StorageState;

    fn deref(&self) -> &StorageState {
        &self.0
    }
}

impl FakeStorage {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_buckets(self, buckets: &[&str]) -> Self {
        *self.buckets.lock().unwrap() = buckets.iter().map(|b| (*b).to_string()).collect();
        self
    }

    pub(crate) fn failing_create_bucket(self, err: RemoteError) -> Self {
        *self.fail_create_bucket.lock().unwrap() = Some(err);
        self
    }

    pub(crate) fn failing_put_bucket_versioning(self, err: RemoteError) -> Self {
        *self.fail_put_bucket_versioning.lock().unwrap() = Some(err);
        self
    }

    pub(crate) fn calls(&self) -> Vec<S3Call> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObjectStorageApi for FakeStorage {
    async fn list_buckets(&self) -> Result<Vec<String>, RemoteError> {
        self.calls.lock().unwrap().push(S3Call::ListBuckets);
        Ok(self.buckets.lock().unwrap().clone())
    }

    async fn create_bucket(&self, bucket: &str, region: &str) -> Result<(), RemoteError> {
        self.calls.lock().unwrap().push(S3Call::CreateBucket {
            bucket: bucket.to_string(),
            region: region.to_string(),
        });
        if let Some(err) = self.fail_create_bucket.lock().unwrap().take() {
            return Err(err);
        }
        self.buckets.lock().unwrap().push(bucket.to_string());
        Ok(())
    }

    async fn put_bucket_versioning(&self, bucket: &str) -> Result<(), RemoteError> {
        self.calls
            .lock()
            .unwrap()
            .push(S3Call::PutBucketVersioning(bucket.to_string()));
        if let Some(err) = self.fail_put_bucket_versioning.lock().unwrap().take() {
            return Err(err);
        }
        Ok(())
    }

    async fn upload_file(&self, file: &Path, bucket: &str, key: &str) -> Result<(), RemoteError> {
        self.calls.lock().unwrap().push(S3Call::UploadFile {
            file: file.to_path_buf(),
            bucket: bucket.to_string(),
            key: key.to_string(),
        });
        Ok(())
    }
}

/// Pause that returns immediately and remembers what it was asked for.
#[derive(Clone, Default)]
pub(crate) struct RecordingPause {
    pauses: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingPause {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn pauses(&self) -> Vec<Duration> {
        self.pauses.lock().unwrap().clone()
    }
}

#[async_trait]
impl Pause for RecordingPause {
    async fn pause(&self, duration: Duration) {
        self.pauses.lock().unwrap().push(duration);
    }
}

pub(crate) fn stack(name: &str, status: &str) -> StackSummary {
    StackSummary {
        name: name.to_string(),
        status: status.to_string(),
    }
}

pub(crate) fn event(id: &str, resource: &str, status: &str) -> StackEvent {
    StackEvent {
        event_id: id.to_string(),
        logical_resource_id: resource.to_string(),
        resource_status: status.to_string(),
        reason: None,
    }
}

pub(crate) fn operation(status: &str) -> StackSetOperationSummary {
    StackSetOperationSummary {
        status: status.to_string(),
    }
}

pub(crate) fn stack_set(name: &str) -> StackSetSummary {
    StackSetSummary {
        name: name.to_string(),
    }
}
