//! The per-target polling engine
//!
//! One [`PollEngine`] exists per configured trigger target and owns that
//! target's transport, watermark store, and parameters; nothing is shared
//! between targets. A poll is one sequential session-open, query,
//! stream-read, close cycle bounded by the configured query timeout.

use std::time::Duration;

use thiserror::Error;

use crate::config::{PollSettings, TriggerParameters};
use crate::models::GerritPatchSet;
use crate::query::build_query_command;
use crate::stream::{RecordStream, StreamError};
use crate::transport::{GerritQueryTransport, QuerySession, TransportError};
use crate::watermark::{Watermark, WatermarkError, WatermarkStore};

/// Errors that abandon a poll.
///
/// A failed poll commits no watermark change and reports no patch sets; the
/// scheduler's next interval is the retry mechanism.
#[derive(Debug, Error)]
pub enum PollError {
    /// The remote session failed (spawn, connect, auth, stderr, timeout).
    #[error("transport failure: {0}")]
    Transport(#[from] TransportError),

    /// The query response stream could not be parsed.
    #[error("response parse failure: {0}")]
    Stream(#[from] StreamError),

    /// The watermark store failed or held a malformed value.
    #[error("watermark failure: {0}")]
    Watermark(#[from] WatermarkError),
}

/// Result type for poll operations.
pub type PollResult<T> = Result<T, PollError>;

/// Polls one Gerrit target for patch sets created since the last poll.
#[derive(Debug)]
pub struct PollEngine<T, S> {
    transport: T,
    store: S,
    params: TriggerParameters,
    settings: PollSettings,
}

impl<T: GerritQueryTransport, S: WatermarkStore> PollEngine<T, S> {
    /// Creates an engine for one configured target.
    pub const fn new(
        transport: T,
        store: S,
        params: TriggerParameters,
        settings: PollSettings,
    ) -> Self {
        Self {
            transport,
            store,
            params,
            settings,
        }
    }

    /// The target's trigger parameters.
    pub const fn parameters(&self) -> &TriggerParameters {
        &self.params
    }

    /// The target's poll settings.
    pub const fn settings(&self) -> &PollSettings {
        &self.settings
    }

    /// The target's transport.
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// The target's watermark store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Runs one poll and returns the patch sets created since the last one.
    ///
    /// The first-ever poll establishes a wall-clock baseline watermark and
    /// always returns empty, so pre-existing open changes never trigger
    /// builds. Later polls return the records strictly newer than the
    /// stored watermark and advance it; the advanced watermark is committed
    /// once, only after the response stream has ended and the session has
    /// finished cleanly.
    ///
    /// # Errors
    ///
    /// Returns a [`PollError`] when the poll was abandoned; no watermark
    /// change is committed in that case.
    pub async fn poll(&mut self) -> PollResult<Vec<GerritPatchSet>> {
        let command = build_query_command(&self.params, &self.settings);
        let previous = Watermark::load(&self.store)?;

        tracing::debug!(
            host = self.params.host(),
            command,
            has_watermark = previous.is_some(),
            "polling gerrit for new patch sets"
        );

        let timeout_secs = u64::from(self.settings.effective_query_timeout_secs());
        let outcome = tokio::time::timeout(
            Duration::from_secs(timeout_secs),
            run_query(&self.transport, &command, previous),
        )
        .await
        .map_err(|_| TransportError::Timeout {
            seconds: timeout_secs,
        })??;

        if previous.is_none() {
            // First-ever poll: baseline at "now" so that only patch sets
            // created after this moment are reported in the future.
            let baseline = Watermark::now();
            baseline.save(&mut self.store)?;
            tracing::debug!(
                watermark = baseline.as_millis(),
                "established baseline watermark on first poll"
            );
            return Ok(Vec::new());
        }

        if let Some(advanced) = outcome.advanced {
            advanced.save(&mut self.store)?;
            tracing::debug!(watermark = advanced.as_millis(), "advanced watermark");
        }

        tracing::debug!(
            count = outcome.patch_sets.len(),
            "poll found new patch sets"
        );
        Ok(outcome.patch_sets)
    }
}

/// Result of draining one query's record stream.
struct QueryOutcome {
    patch_sets: Vec<GerritPatchSet>,
    /// Watermark to commit, when any record advanced it.
    advanced: Option<Watermark>,
}

async fn run_query<T: GerritQueryTransport>(
    transport: &T,
    command: &str,
    previous: Option<Watermark>,
) -> PollResult<QueryOutcome> {
    let mut session = transport.execute(command).await?;

    match consume_records(&mut session, previous).await {
        Ok(outcome) => {
            // Deferred failure signals (exit status, stderr) still abandon
            // the poll even though the stream itself parsed cleanly.
            session.finish().await?;
            Ok(outcome)
        }
        // Dropping the session tears the remote execution down.
        Err(e) => Err(e),
    }
}

async fn consume_records(
    session: &mut QuerySession,
    previous: Option<Watermark>,
) -> PollResult<QueryOutcome> {
    let mut stream = RecordStream::new(session.stdout());

    let Some(mark) = previous else {
        // No baseline to filter against yet: drain and discard.
        while stream.next_patch_set().await?.is_some() {}
        return Ok(QueryOutcome {
            patch_sets: Vec::new(),
            advanced: None,
        });
    };

    let mut patch_sets = Vec::new();
    let mut advanced = mark;

    while let Some(patch_set) = stream.next_patch_set().await? {
        // Each record is judged against the poll-start watermark; the
        // result set is not assumed sorted.
        if mark.admits(patch_set.created_on_ms) {
            advanced = advanced.advanced_by(patch_set.created_on_ms);
            patch_sets.push(patch_set);
        }
    }

    Ok(QueryOutcome {
        patch_sets,
        advanced: (advanced != mark).then_some(advanced),
    })
}
