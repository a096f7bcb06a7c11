//! Gerrit query command construction
//!
//! Builds the remote command one poll executes. The clause order is fixed so
//! commands are reproducible and directly assertable in tests.

use std::fmt::Write;

use crate::config::{PollSettings, TriggerParameters};

/// Maximum number of rows one query returns.
///
/// Tunable query-cost cap: the design assumes no more than this many new
/// patch sets are created between two consecutive polls. Raise it if polls
/// are infrequent enough for bursts to exceed it.
pub const QUERY_LIMIT: u32 = 10;

/// Builds the `gerrit query` command string for one poll.
///
/// Shape: `gerrit query --format=JSON status:open [project:<p>] [branch:<b>]
/// limit:10 --current-patch-set`. Filters appear only when configured
/// non-blank; they are lowercased only when
/// [`PollSettings::case_insensitive_filters`] is set.
#[must_use]
pub fn build_query_command(params: &TriggerParameters, settings: &PollSettings) -> String {
    let mut command = String::from("gerrit query --format=JSON status:open");

    if let Some(project) = params.project() {
        let _ = write!(command, " project:{}", fold_case(project, settings));
    }

    if let Some(branch) = params.branch() {
        let _ = write!(command, " branch:{}", fold_case(branch, settings));
    }

    let _ = write!(command, " limit:{QUERY_LIMIT}");
    command.push_str(" --current-patch-set");

    command
}

fn fold_case(value: &str, settings: &PollSettings) -> String {
    if settings.case_insensitive_filters {
        value.to_lowercase()
    } else {
        value.to_string()
    }
}
