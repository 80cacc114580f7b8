// SPDX-License-Identifier: MIT OR Apache-2.0
//! Sequential animation timing for OrdoPlay.
//!
//! This crate plays animations one after another on a shared timeline:
//! - Mapping a group time onto the active child and its local time
//! - Multi-loop playback and reversed direction
//! - Scrubbing forward and backward with boundary children driven in order
//! - Children of unknown length that report when they are done
//!
//! ## Architecture
//!
//! The sequencer is built on:
//! - The [`Animation`] trait with a shared [`AnimationClock`]
//! - Leaf animations ([`PauseAnimation`], [`UncontrolledAnimation`])
//! - [`SequentialTimeline`], itself an animation, so sequences nest
//!
//! Timelines own their children; the active child is tracked by index and
//! identity, and notifications are queued as [`TimelineEvent`]s.

pub mod animation;
pub mod animations;
pub mod clock;
pub mod error;
pub mod timeline;

pub use animation::{Animation, AnimationId, AnimationState, Direction, Msecs};
pub use animations::{PauseAnimation, UncontrolledAnimation};
pub use clock::{AnimationClock, Seek};
pub use error::{Result, TimelineError};
pub use timeline::{ChildSpan, SequentialTimeline, TimelineEvent};
