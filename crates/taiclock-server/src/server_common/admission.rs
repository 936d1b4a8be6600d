// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinHandle;
use tracing::debug;

use super::ServerMetrics;

/// Bounded pool of response tokens with a per-task deadline.
///
/// Admission never waits: when every token is taken the caller drops the
/// request. An admitted task holds its token until it finishes or its
/// deadline passes, whichever comes first. A task cut off at the deadline is
/// dropped where it stands, so nothing it had not yet sent goes out.
#[derive(Debug)]
pub struct ResponseAdmission {
    permits: Arc<Semaphore>,
    capacity: usize,
    deadline: Duration,
    metrics: Arc<ServerMetrics>,
}

impl ResponseAdmission {
    /// Create a pool of `capacity` tokens whose tasks run for at most
    /// `deadline`.
    pub fn new(capacity: usize, deadline: Duration, metrics: Arc<ServerMetrics>) -> Self {
        ResponseAdmission {
            permits: Arc::new(Semaphore::new(capacity)),
            capacity,
            deadline,
            metrics,
        }
    }

    /// Number of tasks currently holding a token.
    pub fn in_flight(&self) -> usize {
        self.capacity - self.permits.available_permits()
    }

    /// Try to take a token without waiting.
    pub fn try_admit(&self) -> Option<OwnedSemaphorePermit> {
        Arc::clone(&self.permits).try_acquire_owned().ok()
    }

    /// Spawn `work` under the deadline, releasing `permit` when it ends.
    ///
    /// The handle resolves to `None` if the deadline passed first.
    pub fn spawn<F>(&self, permit: OwnedSemaphorePermit, work: F) -> JoinHandle<Option<F::Output>>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        let deadline = self.deadline;
        let metrics = Arc::clone(&self.metrics);
        tokio::spawn(async move {
            let _permit = permit;
            match tokio::time::timeout(deadline, work).await {
                Ok(output) => Some(output),
                Err(_) => {
                    metrics.inc_responses_timed_out();
                    debug!(?deadline, "response task abandoned at deadline");
                    None
                }
            }
        })
    }

    /// Admit and spawn `work`, or return `None` if the pool is exhausted.
    pub fn try_spawn<F>(&self, work: F) -> Option<JoinHandle<Option<F::Output>>>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        let permit = self.try_admit()?;
        Some(self.spawn(permit, work))
    }
}
