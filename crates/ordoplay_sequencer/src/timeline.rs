// SPDX-License-Identifier: MIT OR Apache-2.0
//! Sequential timeline: plays its children one after another.
//!
//! The timeline keeps a single group time and maps it onto the child that
//! is active at that time. Moving the group time across children drives
//! every child in between to its boundary (fully played or fully rewound)
//! so their own completion fires in order. Looping and reversed playback
//! are handled by replaying a whole lap when the loop counter moves.

use crate::animation::{Animation, AnimationId, AnimationState, Direction, Msecs};
use crate::animations::PauseAnimation;
use crate::clock::AnimationClock;
use crate::error::{Result, TimelineError};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;


/// Notification queued by a timeline, drained with [`SequentialTimeline::take_events`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimelineEvent {
    /// A different child became the current one
    CurrentAnimationChanged {
        /// Index of the new current child
        index: usize,
        /// Identity of the new current child
        id: AnimationId,
    },
    /// The timeline changed state
    StateChanged {
        /// State before the change
        old: AnimationState,
        /// State after the change
        new: AnimationState,
    },
    /// The playback direction changed
    DirectionChanged(Direction),
    /// The timeline entered another of its loops
    CurrentLoopChanged(i32),
    /// The timeline stopped because it completed
    Finished,
}

/// Child selected for a group time, with the group time at which it starts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChildSpan {
    /// Index of the child
    pub index: usize,
    /// Group time at which the child starts
    pub offset: Msecs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CurrentChild {
    index: usize,
    id: AnimationId,
}

/// Plays child animations one after another
#[derive(Debug)]
pub struct SequentialTimeline {
    id: AnimationId,
    clock: AnimationClock,
    children: Vec<Box<dyn Animation>>,
    /// Observed durations of uncontrolled children that already finished
    actual_durations: Vec<Option<Msecs>>,
    current: Option<CurrentChild>,
    /// Loop seen by the previous time update
    last_loop: i32,
    /// Uncontrolled child whose completion is being waited for
    uncontrolled: Option<AnimationId>,
    events: Vec<TimelineEvent>,
    /// Cleared while another timeline owns this one
    reports_events: bool,
}

impl SequentialTimeline {
    /// Create an empty timeline
    pub fn new() -> Self {
        Self {
            id: AnimationId::new(),
            clock: AnimationClock::new(),
            children: Vec::new(),
            actual_durations: Vec::new(),
            current: None,
            last_loop: 0,
            uncontrolled: None,
            events: Vec::new(),
            reports_events: true,
        }
    }

    /// Append a child
    pub fn add_animation(&mut self, mut animation: Box<dyn Animation>) -> AnimationId {
        animation.set_reports_events(false);
        let id = animation.id();
        let index = self.children.len();
        self.children.push(animation);
        self.animation_inserted_at(index);
        id
    }

    /// Insert a child at `index`
    pub fn insert_animation(
        &mut self,
        index: usize,
        mut animation: Box<dyn Animation>,
    ) -> Result<AnimationId> {
        let len = self.children.len();
        if index > len {
            tracing::warn!("Cannot insert animation at index {index}: out of bounds (count is {len})");
            return Err(TimelineError::IndexOutOfBounds { index, len });
        }

        animation.set_reports_events(false);
        let id = animation.id();
        self.children.insert(index, animation);
        self.animation_inserted_at(index);
        Ok(id)
    }

    /// Append a pause of `msecs`
    pub fn add_pause(&mut self, msecs: Msecs) -> Result<AnimationId> {
        self.insert_pause(self.children.len(), msecs)
    }

    /// Insert a pause of `msecs` at `index`
    pub fn insert_pause(&mut self, index: usize, msecs: Msecs) -> Result<AnimationId> {
        let len = self.children.len();
        if index > len {
            tracing::warn!("Cannot insert pause at index {index}: out of bounds (count is {len})");
            return Err(TimelineError::IndexOutOfBounds { index, len });
        }
        let pause = PauseAnimation::new(msecs)?;
        self.insert_animation(index, Box::new(pause))
    }

    /// Remove the child at `index` and hand it back
    pub fn take_animation(&mut self, index: usize) -> Result<Box<dyn Animation>> {
        let len = self.children.len();
        if index >= len {
            tracing::warn!("Cannot take animation at index {index}: out of bounds (count is {len})");
            return Err(TimelineError::IndexOutOfBounds { index, len });
        }

        let mut removed = self.children.remove(index);
        self.animation_removed(index, removed.as_mut());
        removed.set_reports_events(true);
        Ok(removed)
    }

    /// Remove every child, returning them in their original order.
    ///
    /// Only the current child is stopped; no other child becomes current on
    /// the way.
    pub fn clear(&mut self) -> Vec<Box<dyn Animation>> {
        if let Some(current) = self.current.take() {
            self.children[current.index].stop();
        }
        self.uncontrolled = None;
        self.actual_durations.clear();

        let mut removed = std::mem::take(&mut self.children);
        for child in &mut removed {
            child.set_reports_events(true);
        }

        let current_loop = self.clock.current_loop();
        self.clock.set_loop_position(current_loop, 0);
        self.clock.set_total_current_time(0);
        removed
    }

    /// Number of children
    pub fn animation_count(&self) -> usize {
        self.children.len()
    }

    /// Child at `index`
    pub fn animation_at(&self, index: usize) -> Option<&dyn Animation> {
        let child = self.children.get(index)?;
        Some(child.as_ref())
    }

    /// Mutable child at `index`
    pub fn animation_at_mut(&mut self, index: usize) -> Option<&mut dyn Animation> {
        let child = self.children.get_mut(index)?;
        Some(child.as_mut())
    }

    /// Position of the child with the given identity
    pub fn index_of(&self, id: AnimationId) -> Option<usize> {
        self.children.iter().position(|child| child.id() == id)
    }

    /// The active child
    pub fn current_animation(&self) -> Option<&dyn Animation> {
        self.current.and_then(|current| self.animation_at(current.index))
    }

    /// Index of the active child
    pub fn current_animation_index(&self) -> Option<usize> {
        self.current.map(|current| current.index)
    }

    /// Elapsed time inside the current loop of the sequence
    pub fn group_current_time(&self) -> Msecs {
        self.clock.current_time()
    }

    /// Drain queued notifications
    pub fn take_events(&mut self) -> Vec<TimelineEvent> {
        std::mem::take(&mut self.events)
    }

    /// Duration used for sequencing the child at `index`.
    ///
    /// Falls back to the observed duration of an uncontrolled child once it
    /// has finished.
    pub fn actual_duration(&self, index: usize) -> Option<Msecs> {
        let child = self.children.get(index)?;
        child
            .total_duration()
            .or_else(|| self.actual_durations.get(index).copied().flatten())
    }

    /// Child that is active at group time `time`.
    ///
    /// On an exact boundary, forward playback picks the later child and
    /// backward playback the earlier one. An uncontrolled child covers the
    /// rest of time, and the last child covers anything past the end.
    pub fn index_for_current_time(&self, time: Msecs) -> ChildSpan {
        debug_assert!(!self.children.is_empty());

        let backward = self.clock.direction() == Direction::Backward;
        let last = self.children.len().saturating_sub(1);
        let mut offset = 0;

        for index in 0..last {
            let Some(duration) = self.actual_duration(index) else {
                return ChildSpan { index, offset };
            };
            let end = offset.saturating_add(duration);
            if time < end || (time == end && backward) {
                return ChildSpan { index, offset };
            }
            offset = end;
        }

        ChildSpan { index: last, offset }
    }

    /// Position the sequence at `group_time` inside loop `current_loop`.
    ///
    /// This is the raw entry point behind [`Animation::set_current_time`],
    /// for owners that track loops themselves.
    pub fn seek_in_loop(&mut self, group_time: Msecs, current_loop: i32) {
        self.clock.set_loop_position(current_loop, group_time);
        self.update_current_time(group_time);
    }

    fn push_event(&mut self, event: TimelineEvent) {
        if self.reports_events {
            self.events.push(event);
        }
    }

    fn current_index(&self) -> Option<usize> {
        self.current.map(|current| current.index)
    }

    fn set_current_animation(&mut self, index: usize, intermediate: bool) {
        if self.children.is_empty() {
            self.current = None;
            return;
        }

        let index = index.min(self.children.len() - 1);
        let id = self.children[index].id();
        let target = CurrentChild { index, id };
        // The current child may have been removed already, so compare both
        if self.current == Some(target) {
            return;
        }

        if let Some(previous) = self.current {
            if let Some(position) = self.index_of(previous.id) {
                self.children[position].stop();
            }
        }

        self.uncontrolled = None;
        self.current = Some(target);
        tracing::trace!("Current animation is now #{index} ({id}), intermediate: {intermediate}");
        self.push_event(TimelineEvent::CurrentAnimationChanged { index, id });

        self.activate_current(intermediate);
    }

    fn activate_current(&mut self, intermediate: bool) {
        let Some(current) = self.current else {
            return;
        };
        let state = self.clock.state();
        if state == AnimationState::Stopped {
            return;
        }
        let direction = self.clock.direction();

        let child = &mut self.children[current.index];
        child.stop();
        child.set_direction(direction);
        let uncontrolled = child.total_duration().is_none();
        child.start();
        if !intermediate && state == AnimationState::Paused && child.state() == AnimationState::Running {
            // The child was running a moment ago, so this cannot fail
            let _ = child.pause();
        }

        if uncontrolled {
            self.uncontrolled = Some(current.id);
        }
    }

    /// Make the first (forward) or last (backward) child current again.
    fn restart(&mut self) {
        let Some(last) = self.children.len().checked_sub(1) else {
            return;
        };

        let index = match self.clock.direction() {
            Direction::Forward => {
                self.last_loop = 0;
                0
            }
            Direction::Backward => {
                self.last_loop = self.clock.loop_count() - 1;
                last
            }
        };

        if self.current_index() == Some(index) {
            self.activate_current(false);
        } else {
            self.set_current_animation(index, false);
        }
    }

    fn fast_forward(&mut self, index: usize) {
        self.set_current_animation(index, true);
        let end = self.actual_duration(index).unwrap_or(0);
        self.children[index].set_current_time(end);
    }

    fn fast_rewind(&mut self, index: usize) {
        self.set_current_animation(index, true);
        self.children[index].set_current_time(0);
    }

    fn advance_forwards(&mut self, new_index: usize) {
        let count = self.children.len();

        if self.last_loop < self.clock.current_loop() {
            // Play out what is left of the previous lap
            let from = self.current_index().unwrap_or(0);
            for index in from..count {
                self.fast_forward(index);
            }
            if count == 1 {
                // Same child again, so it has to be reactivated by hand
                self.activate_current(false);
            } else {
                self.set_current_animation(0, true);
            }
            tracing::debug!("Sequence {} wrapped into loop {}", self.id, self.clock.current_loop());
        }

        let from = self.current_index().unwrap_or(0);
        for index in from..new_index {
            self.fast_forward(index);
        }
    }

    fn rewind_forwards(&mut self, new_index: usize) {
        let count = self.children.len();

        if self.last_loop > self.clock.current_loop() {
            // Rewind what was played of the later lap
            let from = self.current_index().unwrap_or(0);
            for index in (0..=from).rev() {
                self.fast_rewind(index);
            }
            if count == 1 {
                self.activate_current(false);
            } else {
                self.set_current_animation(count - 1, true);
            }
            tracing::debug!("Sequence {} rewound into loop {}", self.id, self.clock.current_loop());
        }

        let from = self.current_index().unwrap_or(0);
        for index in (new_index + 1..=from).rev() {
            self.fast_rewind(index);
        }
    }

    /// A paused sequence never leaves its settled child running.
    fn settle_paused_child(&mut self) {
        if self.clock.state() != AnimationState::Paused {
            return;
        }
        if let Some(current) = self.current {
            let child = &mut self.children[current.index];
            if child.state() == AnimationState::Running {
                let _ = child.pause();
            }
        }
    }

    fn at_end(&self) -> bool {
        let Some(current) = self.current else {
            return false;
        };
        self.clock.current_loop() == self.clock.loop_count() - 1
            && self.clock.direction() == Direction::Forward
            && current.index + 1 == self.children.len()
            && Some(self.children[current.index].current_time()) == self.actual_duration(current.index)
    }

    fn poll_uncontrolled(&mut self) {
        let Some(current) = self.current else {
            return;
        };
        if self.uncontrolled != Some(current.id) {
            return;
        }
        if self.children[current.index].take_finished() {
            self.uncontrolled_finished(current);
        }
    }

    fn uncontrolled_finished(&mut self, current: CurrentChild) {
        let elapsed = self.children[current.index].current_time();
        if self.actual_durations.len() <= current.index {
            self.actual_durations.resize(current.index + 1, None);
        }
        self.actual_durations[current.index] = Some(elapsed);
        self.uncontrolled = None;
        tracing::debug!("Uncontrolled animation #{} finished after {elapsed}ms", current.index);

        let forward = self.clock.direction() == Direction::Forward;
        let at_boundary = if forward {
            current.index + 1 == self.children.len()
        } else {
            current.index == 0
        };

        if at_boundary {
            // A sequence with an undefined duration does not loop
            self.finish();
        } else if forward {
            self.set_current_animation(current.index + 1, false);
        } else {
            self.set_current_animation(current.index - 1, false);
        }
    }

    fn animation_inserted_at(&mut self, index: usize) {
        if self.current.is_none() {
            self.set_current_animation(0, false);
        }
        let Some(current) = self.current else {
            return;
        };

        // A current child that has not started yet gives way to the new one
        if current.index == index {
            let untouched = self
                .index_of(current.id)
                .map(|position| &self.children[position])
                .is_some_and(|child| child.current_time() == 0 && child.current_loop() == 0);
            if untouched {
                self.set_current_animation(index, false);
            }
        }

        // Insertion shifts indices; follow the current child by identity
        let Some(current) = self.current else {
            return;
        };
        let Some(position) = self.index_of(current.id) else {
            return;
        };
        self.current = Some(CurrentChild {
            index: position,
            id: current.id,
        });

        if index < position && self.clock.current_loop() != 0 {
            tracing::warn!(
                "Animation inserted at {index}, before the current one ({position}), while in loop {}; \
                 only insertions after the current animation are supported",
                self.clock.current_loop()
            );
        }
    }

    fn animation_removed(&mut self, index: usize, removed: &mut dyn Animation) {
        debug_assert!(self.current.is_some(), "current animation must be set once a child exists");
        let Some(current) = self.current else {
            return;
        };

        if index < self.actual_durations.len() {
            self.actual_durations.remove(index);
        }

        let removed_current = removed.id() == current.id;
        if removed_current {
            if self.uncontrolled == Some(current.id) {
                self.uncontrolled = None;
            }
            removed.stop();

            let len = self.children.len();
            if index < len {
                // Take the next one
                self.set_current_animation(index, false);
            } else if index > 0 {
                self.set_current_animation(index - 1, false);
            } else {
                self.current = None;
            }
        } else if current.index > index {
            self.current = Some(CurrentChild {
                index: current.index - 1,
                id: current.id,
            });
        }

        // Rebuild the group time from the children before the current one
        let current_index = self.current_index().unwrap_or(0);
        let mut group_time = (0..current_index)
            .filter_map(|i| self.actual_duration(i))
            .fold(0, Msecs::saturating_add);
        if !removed_current {
            if let Some(current) = self.current {
                group_time = group_time.saturating_add(self.children[current.index].current_time());
            }
        }

        // Loops before the current one are complete
        let current_loop = self.clock.current_loop();
        self.clock.set_loop_position(current_loop, group_time);
        let total = match self.duration() {
            Some(duration) => group_time.saturating_add(current_loop.saturating_mul(duration)),
            None => group_time,
        };
        self.clock.set_total_current_time(total);
    }
}

impl Default for SequentialTimeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Animation for SequentialTimeline {
    fn id(&self) -> AnimationId {
        self.id
    }

    /// Sum of the children's total durations, undefined if any is
    fn duration(&self) -> Option<Msecs> {
        self.children.iter().try_fold(0, |sum: Msecs, child| {
            Some(sum.saturating_add(child.total_duration()?))
        })
    }

    fn clock(&self) -> &AnimationClock {
        &self.clock
    }

    fn clock_mut(&mut self) -> &mut AnimationClock {
        &mut self.clock
    }

    fn set_current_time(&mut self, msecs: Msecs) {
        let duration = self.duration();
        let seek = self.clock.seek(msecs, duration);
        self.update_current_time(seek.loop_time);
        if seek.loop_changed {
            let current_loop = self.clock.current_loop();
            self.push_event(TimelineEvent::CurrentLoopChanged(current_loop));
        }
        if seek.reached_end {
            self.finish();
        }
    }

    fn update_current_time(&mut self, loop_time: Msecs) {
        if self.current.is_none() {
            // Nothing left to play
            debug_assert!(self.children.is_empty());
            self.clock.set_loop_time(0);
            self.finish();
            return;
        }

        let target = self.index_for_current_time(loop_time);
        // Cached durations past the new child may be stale once we come back
        self.actual_durations.truncate(target.index);

        let current_loop = self.clock.current_loop();
        let current_index = self.current_index().unwrap_or(0);
        match (self.last_loop, current_index).cmp(&(current_loop, target.index)) {
            // Advancing forward is the same as rewinding backward
            Ordering::Less => self.advance_forwards(target.index),
            Ordering::Greater => self.rewind_forwards(target.index),
            Ordering::Equal => {}
        }

        self.set_current_animation(target.index, false);
        self.settle_paused_child();

        let local_time = loop_time - target.offset;
        if let Some(current) = self.current {
            self.children[current.index].set_current_time(local_time);
            self.poll_uncontrolled();

            if self.at_end() {
                // Never run past the end of the last child
                if let Some(current) = self.current {
                    let overshoot = self.children[current.index].current_time() - local_time;
                    self.clock.set_loop_time(self.clock.current_time() + overshoot);
                }
                self.finish();
            }
        }

        self.last_loop = current_loop;
    }

    fn update_state(&mut self, new_state: AnimationState, old_state: AnimationState) {
        if let Some(current) = self.current {
            let child_state = self.children[current.index].state();
            match new_state {
                AnimationState::Stopped => self.children[current.index].stop(),
                AnimationState::Paused => {
                    if old_state == child_state && old_state == AnimationState::Running {
                        let _ = self.children[current.index].pause();
                    } else {
                        self.restart();
                    }
                }
                AnimationState::Running => {
                    if old_state == child_state && old_state == AnimationState::Paused {
                        self.children[current.index].start();
                    } else {
                        self.restart();
                    }
                }
            }
        }

        self.push_event(TimelineEvent::StateChanged {
            old: old_state,
            new: new_state,
        });
        if new_state == AnimationState::Stopped && self.clock.has_finished() {
            tracing::debug!("Sequence {} finished", self.id);
            self.push_event(TimelineEvent::Finished);
        }
    }

    fn update_direction(&mut self, direction: Direction) {
        if self.clock.state() != AnimationState::Stopped {
            if let Some(current) = self.current {
                self.children[current.index].set_direction(direction);
            }
        }
        self.push_event(TimelineEvent::DirectionChanged(direction));
    }

    fn set_reports_events(&mut self, enabled: bool) {
        self.reports_events = enabled;
        if !enabled {
            self.events.clear();
        }
    }
}
