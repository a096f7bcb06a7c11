//! Remote query transport
//!
//! One poll opens one authenticated session against the Gerrit SSH service,
//! runs a single non-interactive query command, and streams its standard
//! output back to the engine. The transport owns the teardown contract: the
//! remote session and its channel are released on every exit path, whether
//! the poll succeeds, the parse fails, or the engine abandons the stream.

mod ssh;

pub use ssh::SshTransport;

use async_trait::async_trait;
use thiserror::Error;
use tokio::io::AsyncRead;

/// Fixed port of the Gerrit SSH command interface.
pub const GERRIT_SSH_PORT: u16 = 29418;

/// Errors raised by the remote query transport.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The local ssh client could not be started.
    #[error("failed to spawn ssh client: {source}")]
    Spawn {
        /// Underlying process spawn error
        source: std::io::Error,
    },

    /// The askpass helper for a passphrase-protected key could not be set up.
    #[error("failed to prepare passphrase helper: {source}")]
    Askpass {
        /// Underlying filesystem error
        source: std::io::Error,
    },

    /// I/O on the session streams failed.
    #[error("i/o error on query session: {0}")]
    Io(#[from] std::io::Error),

    /// The remote command exited unsuccessfully (covers authentication and
    /// connection failures surfaced by the ssh client).
    #[error("gerrit query failed ({status}): {stderr}")]
    RemoteFailure {
        /// Exit status of the ssh client
        status: String,
        /// Captured standard error output, trimmed
        stderr: String,
    },

    /// The remote command succeeded but wrote diagnostics to stderr.
    #[error("gerrit query produced diagnostics on stderr: {0}")]
    StderrOutput(String),

    /// The query did not complete within the configured time budget.
    #[error("gerrit query timed out after {seconds}s")]
    Timeout {
        /// The exceeded budget in seconds
        seconds: u64,
    },
}

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Releases the resources behind a [`QuerySession`].
///
/// `finish` consumes the closer: it reaps the underlying session, surfaces
/// any failure signals (exit status, stderr output), and must release every
/// held resource whether or not it returns an error. Dropping a closer
/// without calling `finish` must release the resources too.
#[async_trait]
pub trait SessionCloser: Send {
    /// Waits for the session to end and checks its failure signals.
    async fn finish(self: Box<Self>) -> TransportResult<()>;
}

/// An open remote query execution.
///
/// Exposes the remote command's standard output as an incremental byte
/// stream. Call [`QuerySession::finish`] after the stream has been consumed
/// to surface deferred failure signals; dropping the session instead tears
/// the remote execution down immediately.
pub struct QuerySession {
    stdout: Box<dyn AsyncRead + Send + Unpin>,
    closer: Box<dyn SessionCloser>,
}

impl QuerySession {
    /// Creates a session from a stdout stream and a closer.
    pub fn new(
        stdout: impl AsyncRead + Send + Unpin + 'static,
        closer: impl SessionCloser + 'static,
    ) -> Self {
        Self {
            stdout: Box::new(stdout),
            closer: Box::new(closer),
        }
    }

    /// The remote command's standard output stream.
    pub fn stdout(&mut self) -> &mut (dyn AsyncRead + Send + Unpin) {
        &mut *self.stdout
    }

    /// Ends the session, surfacing exit-status and stderr failure signals.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] when the session ended unsuccessfully or
    /// produced stderr output.
    pub async fn finish(self) -> TransportResult<()> {
        self.closer.finish().await
    }
}

impl std::fmt::Debug for QuerySession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuerySession").finish_non_exhaustive()
    }
}

/// Executes Gerrit query commands against a remote server.
///
/// The engine only ever holds this seam, so tests drive it with in-memory
/// sessions and production uses [`SshTransport`].
#[async_trait]
pub trait GerritQueryTransport: Send + Sync {
    /// Opens a session and starts the given query command on it.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] when the session cannot be established.
    async fn execute(&self, command: &str) -> TransportResult<QuerySession>;
}
