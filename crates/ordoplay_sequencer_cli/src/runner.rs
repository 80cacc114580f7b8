// SPDX-License-Identifier: MIT OR Apache-2.0
//! Headless playback of a scenario.
//!
//! The runner plays the top-level sequence with a fixed tick, the way a
//! frame loop would, and collects everything the sequence reported.

use crate::error::RunnerError;
use crate::scenario::Scenario;
use ordoplay_sequencer::{Animation, AnimationState, Msecs, SequentialTimeline, TimelineEvent};
use serde::Serialize;

/// Outcome of a run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Scenario name
    pub scenario: String,
    /// State when the run ended
    pub state: AnimationState,
    /// Ticks played
    pub ticks: u32,
    /// Elapsed time across all loops
    pub total_time: Msecs,
    /// Elapsed time inside the last loop
    pub group_time: Msecs,
    /// Loop being played when the run ended
    pub current_loop: i32,
    /// Index of the active child when the run ended
    pub current_index: Option<usize>,
    /// Everything the sequence reported, in order
    pub events: Vec<TimelineEvent>,
}

impl RunReport {
    /// Encode as pretty JSON
    pub fn to_json(&self) -> Result<String, RunnerError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Play `scenario` until it stops or runs out of ticks
pub fn run(scenario: &Scenario) -> Result<RunReport, RunnerError> {
    let mut timeline = scenario.build()?;
    tracing::info!(
        "Running '{}' ({} children, {} loop(s), {:?})",
        scenario.name,
        timeline.animation_count(),
        timeline.loop_count(),
        timeline.direction()
    );

    let mut events = Vec::new();
    timeline.start();
    drain_events(&mut timeline, &mut events);

    let mut ticks = 0;
    while timeline.state() == AnimationState::Running && ticks < scenario.max_ticks {
        timeline.tick(scenario.tick_ms);
        ticks += 1;
        drain_events(&mut timeline, &mut events);
    }

    if timeline.state() == AnimationState::Running {
        tracing::warn!("'{}' still running after {ticks} ticks", scenario.name);
    }

    Ok(RunReport {
        scenario: scenario.name.clone(),
        state: timeline.state(),
        ticks,
        total_time: timeline.current_time(),
        group_time: timeline.group_current_time(),
        current_loop: timeline.current_loop(),
        current_index: timeline.current_animation_index(),
        events,
    })
}

fn drain_events(timeline: &mut SequentialTimeline, events: &mut Vec<TimelineEvent>) {
    for event in timeline.take_events() {
        match event {
            TimelineEvent::CurrentAnimationChanged { index, id } => {
                tracing::debug!("Current animation: #{index} ({id})");
            }
            TimelineEvent::StateChanged { old, new } => {
                tracing::info!("State: {old:?} -> {new:?}");
            }
            TimelineEvent::DirectionChanged(direction) => {
                tracing::info!("Direction: {direction:?}");
            }
            TimelineEvent::CurrentLoopChanged(current_loop) => {
                tracing::debug!("Loop {current_loop}");
            }
            TimelineEvent::Finished => {
                tracing::info!("Finished at {}ms", timeline.current_time());
            }
        }
        events.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::ChildSpec;
    use ordoplay_sequencer::Direction;

    fn scenario(children: Vec<ChildSpec>) -> Scenario {
        Scenario {
            name: "Test".to_string(),
            tick_ms: 50,
            children,
            ..Scenario::default()
        }
    }

    #[test]
    fn test_run_to_completion() {
        let mut scenario = scenario(vec![
            ChildSpec::Pause { duration: 100 },
            ChildSpec::Pause { duration: 200 },
        ]);
        scenario.loop_count = 2;

        let report = run(&scenario).unwrap();
        assert_eq!(report.state, AnimationState::Stopped);
        assert_eq!(report.ticks, 12);
        assert_eq!(report.total_time, 600);
        assert_eq!(report.current_index, Some(1));
        assert!(report.events.contains(&TimelineEvent::CurrentLoopChanged(1)));
        assert_eq!(report.events.last(), Some(&TimelineEvent::Finished));
    }

    #[test]
    fn test_run_backward() {
        let mut scenario = scenario(vec![
            ChildSpec::Pause { duration: 100 },
            ChildSpec::Pause { duration: 100 },
        ]);
        scenario.direction = Direction::Backward;

        let report = run(&scenario).unwrap();
        assert_eq!(report.state, AnimationState::Stopped);
        assert_eq!(report.total_time, 0);
        assert_eq!(report.current_index, Some(0));
    }

    #[test]
    fn test_uncontrolled_tail_ends_run() {
        let scenario = scenario(vec![
            ChildSpec::Pause { duration: 100 },
            ChildSpec::Uncontrolled { run_for: Some(120) },
        ]);

        let report = run(&scenario).unwrap();
        assert_eq!(report.state, AnimationState::Stopped);
        assert_eq!(report.group_time, 220);
        assert!(report.events.contains(&TimelineEvent::Finished));
    }

    #[test]
    fn test_tick_budget() {
        let mut scenario = scenario(vec![ChildSpec::Pause { duration: 100 }]);
        scenario.loop_count = -1;
        scenario.max_ticks = 25;

        let report = run(&scenario).unwrap();
        assert_eq!(report.state, AnimationState::Running);
        assert_eq!(report.ticks, 25);
    }

    #[test]
    fn test_report_json() {
        let report = run(&scenario(vec![ChildSpec::Pause { duration: 10 }])).unwrap();
        let json = report.to_json().unwrap();
        assert!(json.contains("\"scenario\": \"Test\""));
        assert!(json.contains("Finished"));
    }
}
