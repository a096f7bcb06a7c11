//! Poll behavior settings
//!
//! Tunables that are not per-target credentials. Defaults reproduce the
//! observable behavior of existing deployments; anything that changes
//! compatibility (host-key checking, filter case folding) is an explicit
//! knob here rather than a hard-coded choice.

use serde::{Deserialize, Serialize};

/// Settings controlling how a poll talks to Gerrit and interprets filters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollSettings {
    /// Lowercase `project`/`branch` filters before building the query.
    ///
    /// Off by default: filters match case-sensitively as typed.
    #[serde(default)]
    pub case_insensitive_filters: bool,
    /// Verify the remote host key strictly.
    ///
    /// Off by default to stay compatible with deployments that never
    /// provisioned known-hosts entries for Gerrit; enabling this is the
    /// recommended hardening where those entries exist.
    #[serde(default)]
    pub strict_host_key_checking: bool,
    /// SSH connection timeout in seconds (1-60, default: 10)
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u16,
    /// Overall timeout for one query, connect to close, in seconds
    /// (1-300, default: 30)
    #[serde(default = "default_query_timeout_secs")]
    pub query_timeout_secs: u16,
}

const fn default_connect_timeout_secs() -> u16 {
    10
}

const fn default_query_timeout_secs() -> u16 {
    30
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            case_insensitive_filters: false,
            strict_host_key_checking: false,
            connect_timeout_secs: default_connect_timeout_secs(),
            query_timeout_secs: default_query_timeout_secs(),
        }
    }
}

impl PollSettings {
    /// Returns the connect timeout clamped to the valid range (1-60 seconds).
    #[must_use]
    pub const fn effective_connect_timeout_secs(&self) -> u16 {
        clamp(self.connect_timeout_secs, 1, 60)
    }

    /// Returns the query timeout clamped to the valid range (1-300 seconds).
    #[must_use]
    pub const fn effective_query_timeout_secs(&self) -> u16 {
        clamp(self.query_timeout_secs, 1, 300)
    }
}

const fn clamp(value: u16, min: u16, max: u16) -> u16 {
    if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}
