//! Build-queue collaborator surface and polled trigger glue
//!
//! The host owns build execution; this module only derives what to enqueue
//! from a polled patch set and keeps one bad poll from ever destabilizing
//! the host's scheduler: poll failures are logged here and surface as zero
//! queued builds, never as a propagated error.

use std::fmt::Write;

use thiserror::Error;

use crate::models::GerritPatchSet;
use crate::poller::PollEngine;
use crate::transport::GerritQueryTransport;
use crate::watermark::WatermarkStore;

/// Internal name of the trigger, as registered with the host.
pub const TRIGGER_NAME: &str = "gerritBuildTrigger";

/// Display name of the trigger.
pub const TRIGGER_DISPLAY_NAME: &str = "Gerrit Build Trigger";

/// Initiator tag every queued build is attributed to.
pub const TRIGGER_INITIATOR: &str = "Gerrit";

/// One build submission derived from a new patch set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggeredBuild {
    /// Branch name the build runs on: the patch set's remote ref with the
    /// `refs/` prefix stripped, e.g. `changes/48/2448/7`
    pub branch_name: String,
    /// Initiator tag, always [`TRIGGER_INITIATOR`]
    pub initiator: String,
}

impl TriggeredBuild {
    /// Derives the build submission for a patch set.
    #[must_use]
    pub fn for_patch_set(patch_set: &GerritPatchSet) -> Self {
        Self {
            branch_name: patch_set.build_branch_name().to_string(),
            initiator: TRIGGER_INITIATOR.to_string(),
        }
    }
}

/// Error a host build queue reports for a rejected submission.
#[derive(Debug, Error)]
#[error("failed to enqueue build for '{branch_name}': {reason}")]
pub struct QueueError {
    /// Branch name of the rejected submission
    pub branch_name: String,
    /// Host-reported reason
    pub reason: String,
}

/// Host collaborator that accepts build submissions.
pub trait BuildQueue: Send {
    /// Enqueues one build.
    ///
    /// # Errors
    ///
    /// Returns a [`QueueError`] when the host rejects the submission.
    fn enqueue(&mut self, build: TriggeredBuild) -> Result<(), QueueError>;
}

/// Polled trigger for one configured target: engine plus build queue.
#[derive(Debug)]
pub struct PolledTrigger<T, S, Q> {
    engine: PollEngine<T, S>,
    queue: Q,
}

impl<T, S, Q> PolledTrigger<T, S, Q>
where
    T: GerritQueryTransport,
    S: WatermarkStore,
    Q: BuildQueue,
{
    /// Creates the trigger from an engine and the host's build queue.
    pub const fn new(engine: PollEngine<T, S>, queue: Q) -> Self {
        Self { engine, queue }
    }

    /// The underlying engine.
    pub const fn engine(&self) -> &PollEngine<T, S> {
        &self.engine
    }

    /// Human-readable description of what this trigger watches,
    /// e.g. `Listening to tools/master on review.example.com`.
    #[must_use]
    pub fn describe(&self) -> String {
        let params = self.engine.parameters();
        let mut description = String::from("Listening");

        if let Some(project) = params.project() {
            let _ = write!(description, " to {project}");
            if let Some(branch) = params.branch() {
                let _ = write!(description, "/{branch}");
            }
        }

        let _ = write!(description, " on {}", params.host());
        description
    }

    /// Runs one poll and enqueues one build per new patch set.
    ///
    /// Returns the number of builds queued. A failed poll or a rejected
    /// submission is logged and never propagated.
    pub async fn poll_and_queue(&mut self) -> usize {
        let patch_sets = match self.engine.poll().await {
            Ok(patch_sets) => patch_sets,
            Err(e) => {
                tracing::error!(error = %e, "gerrit poll failed, no builds triggered");
                return 0;
            }
        };

        tracing::debug!(count = patch_sets.len(), "going to trigger new builds");

        let mut queued = 0;
        for patch_set in &patch_sets {
            match self.queue.enqueue(TriggeredBuild::for_patch_set(patch_set)) {
                Ok(()) => queued += 1,
                Err(e) => {
                    tracing::error!(error = %e, project = patch_set.project, "build enqueue rejected");
                }
            }
        }

        queued
    }
}
