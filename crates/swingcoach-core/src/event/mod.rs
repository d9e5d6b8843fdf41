//! Event bus for UI subscribers.
//!
//! Profile and conversation changes are broadcast as `CoachEvent`s instead
//! of exposing shared mutable state.

pub mod bus;

pub use bus::EventBus;
