// SPDX-License-Identifier: MIT OR Apache-2.0
//! Leaf animations.

use crate::animation::{Animation, AnimationId, AnimationState, Msecs};
use crate::clock::AnimationClock;
use crate::error::{Result, TimelineError};

/// A gap of fixed length with no side effects
#[derive(Debug, Clone)]
pub struct PauseAnimation {
    id: AnimationId,
    clock: AnimationClock,
    duration: Msecs,
}

impl PauseAnimation {
    /// Create a pause of `duration` milliseconds
    pub fn new(duration: Msecs) -> Result<Self> {
        let mut pause = Self {
            id: AnimationId::new(),
            clock: AnimationClock::new(),
            duration: 0,
        };
        pause.set_duration(duration)?;
        Ok(pause)
    }

    /// Change the length of the pause
    pub fn set_duration(&mut self, duration: Msecs) -> Result<()> {
        if duration < 0 {
            tracing::warn!("PauseAnimation cannot have a negative duration ({duration})");
            return Err(TimelineError::NegativeDuration(duration));
        }
        self.duration = duration;
        Ok(())
    }
}

impl Animation for PauseAnimation {
    fn id(&self) -> AnimationId {
        self.id
    }

    fn duration(&self) -> Option<Msecs> {
        Some(self.duration)
    }

    fn clock(&self) -> &AnimationClock {
        &self.clock
    }

    fn clock_mut(&mut self) -> &mut AnimationClock {
        &mut self.clock
    }
}

/// An animation whose length is only known once it completes.
///
/// It reports an undefined duration and raises its finished flag when its
/// local time reaches `run_for`, or when [`complete`](Self::complete) is
/// called.
#[derive(Debug, Clone)]
pub struct UncontrolledAnimation {
    id: AnimationId,
    clock: AnimationClock,
    run_for: Option<Msecs>,
}

impl UncontrolledAnimation {
    /// Create an animation that completes after `run_for` milliseconds, or
    /// never on its own if `None`
    pub fn new(run_for: Option<Msecs>) -> Self {
        Self {
            id: AnimationId::new(),
            clock: AnimationClock::new(),
            run_for: run_for.map(|t| t.max(0)),
        }
    }

    /// Time after which the animation completes on its own
    pub fn run_for(&self) -> Option<Msecs> {
        self.run_for
    }

    /// Complete now, at the current time
    pub fn complete(&mut self) {
        self.finish();
    }
}

impl Animation for UncontrolledAnimation {
    fn id(&self) -> AnimationId {
        self.id
    }

    fn duration(&self) -> Option<Msecs> {
        None
    }

    fn clock(&self) -> &AnimationClock {
        &self.clock
    }

    fn clock_mut(&mut self) -> &mut AnimationClock {
        &mut self.clock
    }

    fn update_current_time(&mut self, loop_time: Msecs) {
        let Some(run_for) = self.run_for else {
            return;
        };
        if loop_time >= run_for && self.state() != AnimationState::Stopped {
            self.clock.set_loop_time(run_for);
            self.finish();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Direction;

    #[test]
    fn test_pause_rejects_negative() {
        assert_eq!(
            PauseAnimation::new(-5).unwrap_err(),
            TimelineError::NegativeDuration(-5)
        );

        let mut pause = PauseAnimation::new(100).unwrap();
        assert!(pause.set_duration(-1).is_err());
        assert_eq!(pause.duration(), Some(100));
    }

    #[test]
    fn test_pause_runs_to_end() {
        let mut pause = PauseAnimation::new(100).unwrap();
        pause.start();
        assert_eq!(pause.state(), AnimationState::Running);

        pause.tick(60);
        assert_eq!(pause.current_time(), 60);
        pause.tick(60);
        assert_eq!(pause.current_time(), 100);
        assert_eq!(pause.state(), AnimationState::Stopped);
        assert!(pause.take_finished());
    }

    #[test]
    fn test_stop_is_not_completion() {
        let mut pause = PauseAnimation::new(100).unwrap();
        pause.start();
        pause.tick(10);
        pause.stop();
        assert!(!pause.take_finished());
    }

    #[test]
    fn test_pause_and_resume() {
        let mut pause = PauseAnimation::new(100).unwrap();
        assert_eq!(pause.pause(), Err(TimelineError::Stopped));
        assert_eq!(pause.resume(), Err(TimelineError::NotPaused));

        pause.start();
        pause.tick(30);
        pause.pause().unwrap();
        pause.tick(30);
        assert_eq!(pause.current_time(), 30);

        pause.resume().unwrap();
        pause.tick(30);
        assert_eq!(pause.current_time(), 60);
    }

    #[test]
    fn test_backward_pause() {
        let mut pause = PauseAnimation::new(100).unwrap();
        pause.set_direction(Direction::Backward);
        pause.start();
        assert_eq!(pause.current_time(), 100);

        pause.tick(100);
        assert_eq!(pause.current_time(), 0);
        assert!(pause.take_finished());
    }

    #[test]
    fn test_uncontrolled_completes_itself() {
        let mut anim = UncontrolledAnimation::new(Some(250));
        assert_eq!(anim.total_duration(), None);

        anim.start();
        anim.tick(200);
        assert_eq!(anim.state(), AnimationState::Running);

        anim.tick(200);
        assert_eq!(anim.state(), AnimationState::Stopped);
        assert_eq!(anim.current_time(), 250);
        assert!(anim.take_finished());
    }

    #[test]
    fn test_uncontrolled_manual_completion() {
        let mut anim = UncontrolledAnimation::new(None);
        anim.start();
        anim.tick(1_000_000);
        assert_eq!(anim.state(), AnimationState::Running);

        anim.complete();
        assert!(anim.take_finished());
        assert_eq!(anim.current_time(), 1_000_000);
    }
}
