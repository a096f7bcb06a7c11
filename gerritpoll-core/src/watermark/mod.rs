//! Persisted "last processed" timestamp handling
//!
//! The engine deduplicates patch sets against a single millisecond-epoch
//! watermark persisted per configured target. The persistence surface is an
//! opaque string key-value store supplied by the host; [`FileWatermarkStore`]
//! is the bundled implementation for hosts without one.

mod file_store;

pub use file_store::FileWatermarkStore;

use std::collections::HashMap;

use thiserror::Error;

/// Fixed store key the watermark is persisted under.
pub const TIMESTAMP_KEY: &str = "timestamp";

/// Errors raised by watermark handling and stores.
#[derive(Debug, Error)]
pub enum WatermarkError {
    /// A stored value could not be parsed as a millisecond timestamp.
    #[error("stored watermark '{value}' is not a millisecond timestamp")]
    MalformedTimestamp {
        /// The offending stored value
        value: String,
    },

    /// Reading or writing the backing file failed.
    #[error("watermark store i/o failed: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file could not be serialized.
    #[error("failed to encode watermark store: {0}")]
    Encode(#[from] toml::ser::Error),

    /// The backing file could not be parsed.
    #[error("failed to parse watermark store: {0}")]
    Decode(#[from] toml::de::Error),
}

/// Result type for watermark operations.
pub type WatermarkResult<T> = Result<T, WatermarkError>;

/// The "process newer than this" timestamp, millisecond epoch.
///
/// Once persisted it only ever advances; [`Watermark::advanced_by`] never
/// regresses it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Watermark(i64);

impl Watermark {
    /// Creates a watermark from a millisecond epoch timestamp.
    #[must_use]
    pub const fn from_millis(ms: i64) -> Self {
        Self(ms)
    }

    /// Current wall-clock time as a watermark.
    #[must_use]
    pub fn now() -> Self {
        Self(chrono::Utc::now().timestamp_millis())
    }

    /// The watermark as a millisecond epoch timestamp.
    #[must_use]
    pub const fn as_millis(self) -> i64 {
        self.0
    }

    /// Whether a record with the given creation time is strictly newer.
    ///
    /// Strict: a record created exactly at the watermark is not newer,
    /// which guards against re-triggering the record that set it.
    #[must_use]
    pub const fn admits(self, created_on_ms: i64) -> bool {
        created_on_ms > self.0
    }

    /// This watermark advanced by a candidate timestamp, never regressed.
    #[must_use]
    pub const fn advanced_by(self, candidate_ms: i64) -> Self {
        if candidate_ms > self.0 {
            Self(candidate_ms)
        } else {
            self
        }
    }

    /// Encodes the watermark as its decimal store representation.
    #[must_use]
    pub fn encode(self) -> String {
        self.0.to_string()
    }

    /// Parses the decimal store representation.
    ///
    /// # Errors
    ///
    /// Returns [`WatermarkError::MalformedTimestamp`] when the value is not
    /// a decimal integer.
    pub fn decode(value: &str) -> WatermarkResult<Self> {
        value
            .trim()
            .parse::<i64>()
            .map(Self)
            .map_err(|_| WatermarkError::MalformedTimestamp {
                value: value.to_string(),
            })
    }

    /// Reads the watermark from a store; `None` before the first-ever poll.
    ///
    /// # Errors
    ///
    /// Propagates store failures and malformed stored values.
    pub fn load(store: &dyn WatermarkStore) -> WatermarkResult<Option<Self>> {
        store
            .get(TIMESTAMP_KEY)?
            .map(|value| Self::decode(&value))
            .transpose()
    }

    /// Writes the watermark to a store.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub fn save(self, store: &mut dyn WatermarkStore) -> WatermarkResult<()> {
        store.put(TIMESTAMP_KEY, &self.encode())
    }
}

/// Opaque string key-value persistence surface for the watermark.
///
/// The host guarantees per-key serialization of concurrent access; the
/// engine performs one read and at most one write per poll.
pub trait WatermarkStore: Send {
    /// Reads a stored value; `None` when the key was never written.
    ///
    /// # Errors
    ///
    /// Returns a [`WatermarkError`] when the backing storage fails.
    fn get(&self, key: &str) -> WatermarkResult<Option<String>>;

    /// Writes a value under a key, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns a [`WatermarkError`] when the backing storage fails.
    fn put(&mut self, key: &str, value: &str) -> WatermarkResult<()>;
}

/// In-memory store for tests and for hosts that persist elsewhere.
#[derive(Debug, Default, Clone)]
pub struct MemoryWatermarkStore {
    values: HashMap<String, String>,
}

impl MemoryWatermarkStore {
    /// Creates an empty store (first-ever-poll state).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-seeded with a watermark.
    #[must_use]
    pub fn with_watermark(watermark: Watermark) -> Self {
        let mut store = Self::new();
        store
            .values
            .insert(TIMESTAMP_KEY.to_string(), watermark.encode());
        store
    }
}

impl WatermarkStore for MemoryWatermarkStore {
    fn get(&self, key: &str) -> WatermarkResult<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn put(&mut self, key: &str, value: &str) -> WatermarkResult<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
