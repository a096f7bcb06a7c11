//! `GerritPoll` Core Library
//!
//! This crate provides the polling engine behind the `GerritPoll` build
//! trigger: it queries a Gerrit code-review server over SSH for open changes,
//! parses the streamed JSON response, and reports the patch sets created
//! since the previous poll so that the host can enqueue exactly one build
//! per new revision.
//!
//! # Crate Structure
//!
//! - [`models`] - The `GerritPatchSet` value type and raw wire rows
//! - [`config`] - Typed trigger parameters and poll settings
//! - [`query`] - Gerrit query command construction
//! - [`transport`] - SSH remote query execution with guaranteed teardown
//! - [`stream`] - Incremental parser for the streamed JSON query response
//! - [`watermark`] - Persisted "last processed" timestamp handling
//! - [`poller`] - The per-target polling engine
//! - [`trigger`] - Build-queue collaborator surface and polled trigger glue
//! - [`logging`] - Tracing subscriber initialization
//!
//! # Security Note
//!
//! Host-key verification is disabled by default for compatibility with
//! existing deployments; see [`config::PollSettings::strict_host_key_checking`]
//! to opt into strict checking.

// Enable missing_docs warning for public API documentation
#![warn(missing_docs)]

pub mod config;
pub mod logging;
pub mod models;
pub mod poller;
pub mod query;
pub mod stream;
pub mod transport;
pub mod trigger;
pub mod watermark;

pub use config::{ConfigError, ConfigResult, PollSettings, TriggerParameters};
pub use logging::{
    LoggingConfig, LoggingError, LoggingResult, init_logging, is_logging_initialized,
};
pub use models::GerritPatchSet;
pub use poller::{PollEngine, PollError, PollResult};
pub use query::{QUERY_LIMIT, build_query_command};
pub use stream::{RecordStream, StreamError, StreamResult};
pub use transport::{
    GERRIT_SSH_PORT, GerritQueryTransport, QuerySession, SessionCloser, SshTransport,
    TransportError, TransportResult,
};
pub use trigger::{
    BuildQueue, PolledTrigger, QueueError, TRIGGER_DISPLAY_NAME, TRIGGER_INITIATOR, TRIGGER_NAME,
    TriggeredBuild,
};
pub use watermark::{
    FileWatermarkStore, MemoryWatermarkStore, TIMESTAMP_KEY, Watermark, WatermarkError,
    WatermarkResult, WatermarkStore,
};
