//! SSH transport backed by the system `ssh` client
//!
//! Spawns `ssh` as a separate non-interactive process per query. Key-based
//! authentication uses `-i` with `IdentitiesOnly=yes`; a key passphrase is
//! delivered through a one-shot `SSH_ASKPASS` helper that reads it from the
//! child environment, so the secret never appears on a command line or in a
//! file. The child is spawned with `kill_on_drop`, which is what guarantees
//! session teardown when a poll is abandoned mid-stream.

use std::path::PathBuf;
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use secrecy::ExposeSecret;
use tokio::io::AsyncReadExt;
use tokio::process::{Child, Command};

use super::{GERRIT_SSH_PORT, QuerySession, SessionCloser, TransportError, TransportResult};
use crate::config::{PollSettings, TriggerParameters};

/// Environment variable the askpass helper reads the passphrase from.
const ASKPASS_ENV: &str = "GERRITPOLL_PASSPHRASE";

/// Shell body of the askpass helper. Contains no secret itself.
const ASKPASS_SCRIPT: &str = "#!/bin/sh\nprintf '%s\\n' \"$GERRITPOLL_PASSPHRASE\"\n";

static ASKPASS_SEQ: AtomicU64 = AtomicU64::new(0);

/// Gerrit query transport over the system `ssh` client.
pub struct SshTransport {
    params: TriggerParameters,
    settings: PollSettings,
    askpass: Option<AskpassHelper>,
}

impl SshTransport {
    /// Creates a transport for one configured target.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Askpass`] when a passphrase is configured
    /// and the helper script cannot be written.
    pub fn new(params: TriggerParameters, settings: PollSettings) -> TransportResult<Self> {
        let askpass = if params.passphrase().is_some() {
            Some(AskpassHelper::create()?)
        } else {
            None
        };

        Ok(Self {
            params,
            settings,
            askpass,
        })
    }
}

#[async_trait]
impl super::GerritQueryTransport for SshTransport {
    async fn execute(&self, command: &str) -> TransportResult<QuerySession> {
        let mut cmd = Command::new("ssh");

        match (&self.askpass, self.params.passphrase()) {
            (Some(helper), Some(passphrase)) => {
                // Requires OpenSSH 8.4+ for SSH_ASKPASS_REQUIRE.
                cmd.env("SSH_ASKPASS", &helper.path);
                cmd.env("SSH_ASKPASS_REQUIRE", "force");
                cmd.env(ASKPASS_ENV, passphrase.expose_secret());
            }
            _ => {
                // Batch mode only when no passphrase prompt is expected
                cmd.arg("-o").arg("BatchMode=yes");
            }
        }

        let strict = if self.settings.strict_host_key_checking {
            "yes"
        } else {
            "no"
        };
        cmd.arg("-o").arg(format!("StrictHostKeyChecking={strict}"));
        cmd.arg("-o").arg(format!(
            "ConnectTimeout={}",
            self.settings.effective_connect_timeout_secs()
        ));

        cmd.arg("-p").arg(GERRIT_SSH_PORT.to_string());

        cmd.arg("-i").arg(self.params.private_key_path());
        cmd.arg("-o").arg("IdentitiesOnly=yes");

        cmd.arg(format!(
            "{}@{}",
            self.params.username(),
            self.params.host()
        ));
        cmd.arg(command);

        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd.kill_on_drop(true);

        tracing::debug!(
            host = self.params.host(),
            port = GERRIT_SSH_PORT,
            "opening gerrit query session"
        );

        let mut child = cmd
            .spawn()
            .map_err(|source| TransportError::Spawn { source })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| std::io::Error::other("ssh stdout was not captured"))?;

        Ok(QuerySession::new(stdout, SshSessionCloser { child }))
    }
}

impl std::fmt::Debug for SshTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SshTransport")
            .field("host", &self.params.host())
            .field("username", &self.params.username())
            .finish_non_exhaustive()
    }
}

/// Closer that reaps the ssh child and checks its failure signals.
struct SshSessionCloser {
    child: Child,
}

#[async_trait]
impl SessionCloser for SshSessionCloser {
    async fn finish(mut self: Box<Self>) -> TransportResult<()> {
        let mut stderr_buf = Vec::new();
        if let Some(mut stderr) = self.child.stderr.take() {
            stderr.read_to_end(&mut stderr_buf).await?;
        }

        let status = self.child.wait().await?;
        let stderr_text = String::from_utf8_lossy(&stderr_buf).trim().to_string();

        if !status.success() {
            return Err(TransportError::RemoteFailure {
                status: status.to_string(),
                stderr: stderr_text,
            });
        }

        // A clean exit with stderr output still fails the poll: Gerrit
        // writes query errors there while exiting zero in some versions.
        if !stderr_text.is_empty() {
            return Err(TransportError::StderrOutput(stderr_text));
        }

        Ok(())
    }
}

/// One-shot `SSH_ASKPASS` helper script, removed again on drop.
struct AskpassHelper {
    path: PathBuf,
}

impl AskpassHelper {
    fn create() -> TransportResult<Self> {
        let path = std::env::temp_dir().join(format!(
            "gerritpoll-askpass-{}-{}",
            std::process::id(),
            ASKPASS_SEQ.fetch_add(1, Ordering::Relaxed)
        ));

        std::fs::write(&path, ASKPASS_SCRIPT)
            .map_err(|source| TransportError::Askpass { source })?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o700))
                .map_err(|source| TransportError::Askpass { source })?;
        }

        Ok(Self { path })
    }
}

impl Drop for AskpassHelper {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}
