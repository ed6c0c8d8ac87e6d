//! Pause abstraction and poll limits shared by every wait loop.

use async_trait::async_trait;
use std::time::Duration;

use crate::error::{CfnctlError, CfnctlResult};

/// Fixed delay between two status queries.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// How wait loops pace themselves.
///
/// `max_polls` of `None` waits for as long as the remote operation takes;
/// stack operations can legitimately run for tens of minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub interval: Duration,
    pub max_polls: Option<u32>,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_polls: None,
        }
    }
}

/// Suspends a wait loop between two polls.
#[async_trait]
pub trait Pause: Send + Sync {
    async fn pause(&self, duration: Duration);
}

/// Real-time pause backed by the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioPause;

#[async_trait]
impl Pause for TokioPause {
    async fn pause(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Counts status queries of one wait loop against `PollSettings::max_polls`.
pub(crate) struct PollBudget {
    target: String,
    max_polls: Option<u32>,
    polls: u32,
}

impl PollBudget {
    pub(crate) fn new(settings: &PollSettings, target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            max_polls: settings.max_polls,
            polls: 0,
        }
    }

    /// Record one more poll; fails once the limit is used up.
    pub(crate) fn tick(&mut self) -> CfnctlResult<()> {
        self.polls += 1;
        match self.max_polls {
            Some(max) if self.polls > max => Err(CfnctlError::PollLimitExceeded {
                target: self.target.clone(),
                polls: max,
            }),
            _ => Ok(()),
        }
    }
}
