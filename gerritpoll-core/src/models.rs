//! Data model for Gerrit patch sets
//!
//! A patch set is one revision of a code-review change. The engine builds one
//! [`GerritPatchSet`] per data row of a `gerrit query` response; the raw wire
//! rows live here too so the whole wire format is described in one place.

use serde::Deserialize;

/// Prefix every Gerrit change ref carries (`refs/changes/...`).
pub(crate) const REFS_PREFIX: &str = "refs/";

/// One patch set reported by a Gerrit query.
///
/// Constructed once per parsed row and immutable afterwards. Identity is
/// field equality; the value is owned by the caller once returned from a
/// poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GerritPatchSet {
    /// Gerrit project the change belongs to
    pub project: String,
    /// Destination branch of the change
    pub branch: String,
    /// Fetchable remote ref, e.g. `refs/changes/48/2448/7`
    pub ref_name: String,
    /// Creation time of the patch set, millisecond epoch
    pub created_on_ms: i64,
}

impl GerritPatchSet {
    /// Creates a patch set value.
    #[must_use]
    pub fn new(
        project: impl Into<String>,
        branch: impl Into<String>,
        ref_name: impl Into<String>,
        created_on_ms: i64,
    ) -> Self {
        Self {
            project: project.into(),
            branch: branch.into(),
            ref_name: ref_name.into(),
            created_on_ms,
        }
    }

    /// Branch name to hand to the build queue.
    ///
    /// Strips the fixed `refs/` prefix from the remote ref, turning
    /// `refs/changes/48/2448/7` into `changes/48/2448/7`. A ref without the
    /// prefix is returned unchanged.
    #[must_use]
    pub fn build_branch_name(&self) -> &str {
        self.ref_name
            .strip_prefix(REFS_PREFIX)
            .unwrap_or(&self.ref_name)
    }
}

/// Raw top-level row of a `gerrit query --format=JSON` response.
///
/// Gerrit emits many more fields per row; everything the engine does not
/// consume is ignored on decode.
#[derive(Debug, Deserialize)]
pub(crate) struct PatchSetRow {
    pub project: String,
    pub branch: String,
    #[serde(rename = "currentPatchSet")]
    pub current_patch_set: CurrentPatchSetRow,
}

/// The `currentPatchSet` object nested in a query row.
#[derive(Debug, Deserialize)]
pub(crate) struct CurrentPatchSetRow {
    #[serde(rename = "ref")]
    pub ref_name: String,
    /// Creation time in whole seconds, as Gerrit reports it on the wire
    #[serde(rename = "createdOn")]
    pub created_on: i64,
}

impl TryFrom<PatchSetRow> for GerritPatchSet {
    type Error = String;

    fn try_from(row: PatchSetRow) -> Result<Self, Self::Error> {
        if row.project.is_empty() {
            return Err("empty project field".into());
        }
        if row.branch.is_empty() {
            return Err("empty branch field".into());
        }
        if row.current_patch_set.ref_name.is_empty() {
            return Err("empty currentPatchSet.ref field".into());
        }

        // Wire timestamps are second precision; normalize to milliseconds.
        Ok(Self {
            project: row.project,
            branch: row.branch,
            ref_name: row.current_patch_set.ref_name,
            created_on_ms: row.current_patch_set.created_on * 1000,
        })
    }
}
