// SPDX-License-Identifier: MIT OR Apache-2.0
//! The animation capability sequenced by timelines.

use crate::clock::AnimationClock;
use crate::error::{Result, TimelineError};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Time unit used by every animation (milliseconds)
pub type Msecs = i32;

/// Unique identifier for an animation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnimationId(pub Uuid);

impl AnimationId {
    /// Create a new random animation ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AnimationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AnimationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Playback direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Direction {
    /// Time grows from 0 to the end
    #[default]
    Forward,
    /// Time shrinks from the end to 0
    Backward,
}

/// Play state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AnimationState {
    /// Not playing; the next start rewinds
    #[default]
    Stopped,
    /// Holding its position
    Paused,
    /// Playing
    Running,
}

/// Something that can be placed on a timeline.
///
/// Implementors provide an identity, a single-loop duration and an
/// [`AnimationClock`]; everything else has a default built on the clock.
/// The `update_*` hooks are where an implementation reacts to time, state
/// and direction changes.
pub trait Animation: fmt::Debug {
    /// Identity, stable for the lifetime of the animation
    fn id(&self) -> AnimationId;

    /// Duration of a single loop, `None` if it is not known in advance
    fn duration(&self) -> Option<Msecs>;

    /// Shared time/state bookkeeping
    fn clock(&self) -> &AnimationClock;

    /// Mutable access to the shared bookkeeping
    fn clock_mut(&mut self) -> &mut AnimationClock;

    /// Called with the loop-local time after every [`set_current_time`](Self::set_current_time)
    fn update_current_time(&mut self, _loop_time: Msecs) {}

    /// Called after every state change
    fn update_state(&mut self, _new_state: AnimationState, _old_state: AnimationState) {}

    /// Called after the direction changed
    fn update_direction(&mut self, _direction: Direction) {}

    /// Called by a timeline when it adopts this animation (`false`) and
    /// when it hands it back (`true`).
    ///
    /// Animations that queue notifications for their owner stop queuing
    /// while nested, since nobody drains them.
    fn set_reports_events(&mut self, _enabled: bool) {}

    /// Duration over every loop, `None` if undefined or looping forever
    fn total_duration(&self) -> Option<Msecs> {
        self.clock().total_duration(self.duration())
    }

    /// Elapsed time across all loops
    fn current_time(&self) -> Msecs {
        self.clock().total_current_time()
    }

    /// Elapsed time inside the current loop
    fn current_loop_time(&self) -> Msecs {
        self.clock().current_time()
    }

    /// Index of the loop being played
    fn current_loop(&self) -> i32 {
        self.clock().current_loop()
    }

    /// Number of loops, -1 for infinite
    fn loop_count(&self) -> i32 {
        self.clock().loop_count()
    }

    /// Set the number of loops, -1 for infinite
    fn set_loop_count(&mut self, loop_count: i32) {
        self.clock_mut().set_loop_count(loop_count);
    }

    /// Current state
    fn state(&self) -> AnimationState {
        self.clock().state()
    }

    /// Playback direction
    fn direction(&self) -> Direction {
        self.clock().direction()
    }

    /// Change the playback direction
    fn set_direction(&mut self, direction: Direction) {
        let duration = self.duration();
        if self.clock_mut().set_direction(direction, duration) {
            self.update_direction(direction);
        }
    }

    /// Jump to `msecs` of total elapsed time.
    ///
    /// Reaching the end for the current direction stops the animation as
    /// completed.
    fn set_current_time(&mut self, msecs: Msecs) {
        let duration = self.duration();
        let seek = self.clock_mut().seek(msecs, duration);
        self.update_current_time(seek.loop_time);
        if seek.reached_end {
            self.finish();
        }
    }

    /// Switch to `new_state`, running the state hooks.
    fn set_state(&mut self, new_state: AnimationState) {
        let duration = self.duration();
        let Some(old_state) = self.clock_mut().set_state(new_state, duration) else {
            return;
        };
        self.update_state(new_state, old_state);

        // Apply the starting position right away
        if new_state == AnimationState::Running
            && old_state == AnimationState::Stopped
            && self.state() == AnimationState::Running
        {
            let start = self.current_time();
            self.set_current_time(start);
        }
    }

    /// Start from the beginning, or resume if paused
    fn start(&mut self) {
        if self.state() != AnimationState::Running {
            self.set_state(AnimationState::Running);
        }
    }

    /// Pause a running animation
    fn pause(&mut self) -> Result<()> {
        if self.state() == AnimationState::Stopped {
            tracing::warn!("Cannot pause stopped animation {}", self.id());
            return Err(TimelineError::Stopped);
        }
        self.set_state(AnimationState::Paused);
        Ok(())
    }

    /// Resume a paused animation
    fn resume(&mut self) -> Result<()> {
        if self.state() != AnimationState::Paused {
            tracing::warn!("Cannot resume animation {} that is not paused", self.id());
            return Err(TimelineError::NotPaused);
        }
        self.set_state(AnimationState::Running);
        Ok(())
    }

    /// Stop without completing
    fn stop(&mut self) {
        self.set_state(AnimationState::Stopped);
    }

    /// Stop as completed, raising the finished flag
    fn finish(&mut self) {
        if let Some(old_state) = self.clock_mut().finish() {
            self.update_state(AnimationState::Stopped, old_state);
        }
    }

    /// Collect a completion that happened since the last call
    fn take_finished(&mut self) -> bool {
        self.clock_mut().take_finished()
    }

    /// Advance a running animation by `delta` in its direction.
    ///
    /// Only top-level animations are ticked; children are driven by their
    /// timeline.
    fn tick(&mut self, delta: Msecs) {
        if self.state() != AnimationState::Running {
            return;
        }
        let now = self.current_time();
        let next = match self.direction() {
            Direction::Forward => now.saturating_add(delta),
            Direction::Backward => now.saturating_sub(delta),
        };
        self.set_current_time(next);
    }
}
