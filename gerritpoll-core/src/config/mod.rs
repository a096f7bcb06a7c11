//! Configuration for a polled Gerrit trigger
//!
//! The host hands the trigger a loose string map; this module turns it into
//! a validated [`TriggerParameters`] value once, at construction, so the
//! engine never works with stringly-typed lookups. Tunables that are not
//! per-target credentials live in [`PollSettings`].

mod params;
mod settings;

pub use params::{
    ConfigError, ConfigResult, PARAM_BRANCH, PARAM_HOST, PARAM_PASSPHRASE, PARAM_PRIVATE_KEY_PATH,
    PARAM_PROJECT, PARAM_USERNAME, TriggerParameters,
};
pub use settings::PollSettings;
