// SPDX-License-Identifier: MIT OR Apache-2.0
//! Time, loop and state bookkeeping shared by every animation.
//!
//! An [`AnimationClock`] knows nothing about what an animation does; it only
//! maps a total elapsed time onto a loop number and a loop-local time, and
//! tracks the play/pause/stop state machine. Concrete animations embed one
//! and expose it through [`Animation::clock`](crate::Animation::clock).

use crate::animation::{AnimationState, Direction, Msecs};
use serde::{Deserialize, Serialize};

/// Outcome of [`AnimationClock::seek`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Seek {
    /// Time inside the current loop
    pub loop_time: Msecs,
    /// Whether the loop counter changed
    pub loop_changed: bool,
    /// Whether the clock sits at its end for the current direction
    pub reached_end: bool,
}

/// Elapsed-time and state tracker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimationClock {
    state: AnimationState,
    direction: Direction,
    /// Number of loops, -1 for infinite
    loop_count: i32,
    current_loop: i32,
    /// Time inside the current loop
    current_time: Msecs,
    /// Time across all loops
    total_current_time: Msecs,
    /// Set when the animation stopped because it completed
    finished: bool,
}

impl AnimationClock {
    /// Create a stopped, forward, single-loop clock
    pub fn new() -> Self {
        Self {
            state: AnimationState::Stopped,
            direction: Direction::Forward,
            loop_count: 1,
            current_loop: 0,
            current_time: 0,
            total_current_time: 0,
            finished: false,
        }
    }

    /// Current state
    pub fn state(&self) -> AnimationState {
        self.state
    }

    /// Playback direction
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Loop count, -1 meaning infinite
    pub fn loop_count(&self) -> i32 {
        self.loop_count
    }

    /// Set the loop count, -1 meaning infinite
    pub fn set_loop_count(&mut self, loop_count: i32) {
        self.loop_count = loop_count;
    }

    /// Index of the loop being played
    pub fn current_loop(&self) -> i32 {
        self.current_loop
    }

    /// Time inside the current loop
    pub fn current_time(&self) -> Msecs {
        self.current_time
    }

    /// Time across all loops
    pub fn total_current_time(&self) -> Msecs {
        self.total_current_time
    }

    /// Total duration over every loop for a single-loop `duration`
    pub fn total_duration(&self, duration: Option<Msecs>) -> Option<Msecs> {
        match duration {
            None => None,
            Some(d) if d <= 0 => Some(d),
            Some(_) if self.loop_count < 0 => None,
            Some(d) => Some(d.saturating_mul(self.loop_count)),
        }
    }

    /// Move to `msecs` of total elapsed time.
    pub fn seek(&mut self, msecs: Msecs, duration: Option<Msecs>) -> Seek {
        let total = self.total_duration(duration);
        let mut msecs = msecs.max(0);
        if let Some(total) = total {
            msecs = msecs.min(total);
        }
        self.total_current_time = msecs;

        let old_loop = self.current_loop;
        match duration {
            Some(d) if d > 0 => {
                self.current_loop = msecs / d;
                if self.current_loop == self.loop_count {
                    self.current_time = d;
                    self.current_loop = (self.loop_count - 1).max(0);
                } else if self.direction == Direction::Forward {
                    self.current_time = msecs % d;
                } else {
                    // The end of a loop belongs to that loop when going backward
                    self.current_time = ((msecs - 1) % d) + 1;
                    if self.current_time == d {
                        self.current_loop -= 1;
                    }
                }
            }
            _ => {
                self.current_loop = 0;
                if self.loop_count == 0 {
                    self.current_time = duration.unwrap_or(0).max(0);
                } else {
                    self.current_time = msecs;
                }
            }
        }

        let reached_end = match self.direction {
            Direction::Forward => total == Some(self.total_current_time),
            Direction::Backward => self.total_current_time == 0,
        };

        Seek {
            loop_time: self.current_time,
            loop_changed: self.current_loop != old_loop,
            reached_end,
        }
    }

    /// Overwrite the loop-local time, keeping the total in step.
    pub fn set_loop_time(&mut self, msecs: Msecs) {
        let delta = msecs - self.current_time;
        self.current_time = msecs;
        self.total_current_time += delta;
    }

    /// Overwrite the total elapsed time without recomputing the loop.
    pub fn set_total_current_time(&mut self, msecs: Msecs) {
        self.total_current_time = msecs;
    }

    /// Place the cursor inside `current_loop` directly.
    pub fn set_loop_position(&mut self, current_loop: i32, loop_time: Msecs) {
        self.current_loop = current_loop;
        self.current_time = loop_time;
    }

    /// Switch state. Returns the previous state if anything changed.
    pub fn set_state(
        &mut self,
        new_state: AnimationState,
        duration: Option<Msecs>,
    ) -> Option<AnimationState> {
        if self.state == new_state || self.loop_count == 0 {
            return None;
        }

        let old_state = self.state;
        if old_state == AnimationState::Stopped {
            // Rewind to where this run starts
            self.finished = false;
            let start = match self.direction {
                Direction::Forward => {
                    self.current_loop = 0;
                    0
                }
                Direction::Backward => {
                    self.current_loop = (self.loop_count - 1).max(0);
                    let end = if self.loop_count == -1 {
                        duration
                    } else {
                        self.total_duration(duration)
                    };
                    end.unwrap_or(0)
                }
            };
            self.current_time = start;
            self.total_current_time = start;
        }

        self.state = new_state;
        Some(old_state)
    }

    /// Stop because the run completed. Raises the finished flag.
    pub fn finish(&mut self) -> Option<AnimationState> {
        if self.state == AnimationState::Stopped {
            return None;
        }
        let old_state = self.state;
        self.state = AnimationState::Stopped;
        self.finished = true;
        Some(old_state)
    }

    /// Whether a completion has not been collected yet
    pub fn has_finished(&self) -> bool {
        self.finished
    }

    /// Collect a pending completion
    pub fn take_finished(&mut self) -> bool {
        std::mem::take(&mut self.finished)
    }

    /// Change direction. Returns false if it was already set.
    ///
    /// A stopped clock also moves its cursor to where a run in the new
    /// direction starts.
    pub fn set_direction(&mut self, direction: Direction, duration: Option<Msecs>) -> bool {
        if self.direction == direction {
            return false;
        }
        if self.state == AnimationState::Stopped {
            match direction {
                Direction::Backward => {
                    self.current_time = duration.unwrap_or(0);
                    self.current_loop = (self.loop_count - 1).max(0);
                }
                Direction::Forward => {
                    self.current_time = 0;
                    self.current_loop = 0;
                }
            }
        }
        self.direction = direction;
        true
    }
}

impl Default for AnimationClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_duration() {
        let mut clock = AnimationClock::new();
        assert_eq!(clock.total_duration(Some(300)), Some(300));
        assert_eq!(clock.total_duration(None), None);

        clock.set_loop_count(3);
        assert_eq!(clock.total_duration(Some(300)), Some(900));
        assert_eq!(clock.total_duration(Some(0)), Some(0));

        clock.set_loop_count(-1);
        assert_eq!(clock.total_duration(Some(300)), None);
        assert_eq!(clock.total_duration(Some(0)), Some(0));
    }

    #[test]
    fn test_seek_forward_loops() {
        let mut clock = AnimationClock::new();
        clock.set_loop_count(3);

        let seek = clock.seek(250, Some(100));
        assert_eq!(seek.loop_time, 50);
        assert!(seek.loop_changed);
        assert!(!seek.reached_end);
        assert_eq!(clock.current_loop(), 2);

        // Loop boundaries belong to the next loop going forward
        let seek = clock.seek(100, Some(100));
        assert_eq!(seek.loop_time, 0);
        assert_eq!(clock.current_loop(), 1);

        // Past the end clamps to the end of the last loop
        let seek = clock.seek(10_000, Some(100));
        assert_eq!(seek.loop_time, 100);
        assert!(seek.reached_end);
        assert_eq!(clock.current_loop(), 2);
        assert_eq!(clock.total_current_time(), 300);
    }

    #[test]
    fn test_seek_backward_keeps_loop_end() {
        let mut clock = AnimationClock::new();
        clock.set_loop_count(2);
        clock.set_direction(Direction::Backward, Some(100));

        let seek = clock.seek(100, Some(100));
        assert_eq!(seek.loop_time, 100);
        assert_eq!(clock.current_loop(), 0);

        let seek = clock.seek(0, Some(100));
        assert_eq!(seek.loop_time, 0);
        assert!(seek.reached_end);
    }

    #[test]
    fn test_seek_undefined_duration() {
        let mut clock = AnimationClock::new();
        let seek = clock.seek(12_345, None);
        assert_eq!(seek.loop_time, 12_345);
        assert!(!seek.reached_end);
        assert_eq!(clock.current_loop(), 0);
    }

    #[test]
    fn test_state_rewinds_on_start() {
        let mut clock = AnimationClock::new();
        clock.set_loop_count(2);
        clock.seek(150, Some(100));

        assert_eq!(
            clock.set_state(AnimationState::Running, Some(100)),
            Some(AnimationState::Stopped)
        );
        assert_eq!(clock.total_current_time(), 0);
        assert_eq!(clock.set_state(AnimationState::Running, Some(100)), None);

        clock.set_state(AnimationState::Stopped, Some(100));
        clock.set_direction(Direction::Backward, Some(100));
        clock.set_state(AnimationState::Running, Some(100));
        assert_eq!(clock.total_current_time(), 200);
        assert_eq!(clock.current_loop(), 1);
    }

    #[test]
    fn test_zero_loops_never_start() {
        let mut clock = AnimationClock::new();
        clock.set_loop_count(0);
        assert_eq!(clock.set_state(AnimationState::Running, Some(100)), None);
        assert_eq!(clock.state(), AnimationState::Stopped);
    }

    #[test]
    fn test_finish_flag() {
        let mut clock = AnimationClock::new();
        assert_eq!(clock.finish(), None);

        clock.set_state(AnimationState::Running, Some(100));
        assert_eq!(clock.finish(), Some(AnimationState::Running));
        assert!(clock.take_finished());
        assert!(!clock.take_finished());

        // A stale flag does not survive a restart
        clock.set_state(AnimationState::Running, Some(100));
        clock.finish();
        clock.set_state(AnimationState::Running, Some(100));
        assert!(!clock.has_finished());
    }
}
