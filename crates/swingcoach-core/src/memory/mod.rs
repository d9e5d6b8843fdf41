//! Profile memory: extraction prompt, tolerant payload decoding, merge and
//! the single-flight updater.

pub mod merge;
pub mod payload;
pub mod prompt;
pub mod updater;

pub use merge::{ExchangeMode, merge_profile};
pub use payload::ProfileUpdate;
pub use updater::{MemoryUpdater, SkipReason, UpdateOutcome};
