// SPDX-License-Identifier: MIT OR Apache-2.0
//! Errors reported by the sequencer.

use crate::animation::Msecs;
use thiserror::Error;

/// Sequencer errors
///
/// None of these are fatal: the operation that produced one is ignored and
/// the timeline keeps its previous state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimelineError {
    /// Index outside of the child list
    #[error("Index {index} is out of bounds (animation count is {len})")]
    IndexOutOfBounds {
        /// Requested index
        index: usize,
        /// Number of children at the time of the request
        len: usize,
    },

    /// A pause or duration cannot be negative
    #[error("Cannot use a negative duration: {0}")]
    NegativeDuration(Msecs),

    /// `resume` called on an animation that is not paused
    #[error("Cannot resume an animation that is not paused")]
    NotPaused,

    /// `pause` called on a stopped animation
    #[error("Cannot pause a stopped animation")]
    Stopped,
}

/// Result type for sequencer operations
pub type Result<T> = std::result::Result<T, TimelineError>;
