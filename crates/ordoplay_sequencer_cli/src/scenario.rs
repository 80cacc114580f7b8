// SPDX-License-Identifier: MIT OR Apache-2.0
//! Scenario files.
//!
//! A scenario describes a sequence to play:
//! - Loop count and direction of the top-level sequence
//! - Fixed tick length and a tick budget
//! - The children, possibly nested sequences

use crate::error::RunnerError;
use ordoplay_sequencer::{
    Animation, Direction, Msecs, PauseAnimation, SequentialTimeline, TimelineError,
    UncontrolledAnimation,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Current scenario format version
pub const SCENARIO_FORMAT_VERSION: u32 = 1;

/// One child of a sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ChildSpec {
    /// Fixed-length gap
    Pause {
        /// Length in milliseconds
        duration: Msecs,
    },
    /// Child of unknown length, completing after `run_for` if set
    Uncontrolled {
        /// Time after which it completes on its own
        run_for: Option<Msecs>,
    },
    /// Nested sequence
    Sequence {
        /// Loops of the nested sequence, -1 for infinite
        loop_count: i32,
        /// Children of the nested sequence
        children: Vec<ChildSpec>,
    },
}

impl ChildSpec {
    fn build(&self) -> Result<Box<dyn Animation>, TimelineError> {
        match self {
            ChildSpec::Pause { duration } => Ok(Box::new(PauseAnimation::new(*duration)?)),
            ChildSpec::Uncontrolled { run_for } => Ok(Box::new(UncontrolledAnimation::new(*run_for))),
            ChildSpec::Sequence {
                loop_count,
                children,
            } => {
                let mut timeline = build_sequence(children)?;
                timeline.set_loop_count(*loop_count);
                Ok(Box::new(timeline))
            }
        }
    }
}

fn build_sequence(children: &[ChildSpec]) -> Result<SequentialTimeline, TimelineError> {
    let mut timeline = SequentialTimeline::new();
    for child in children {
        timeline.add_animation(child.build()?);
    }
    Ok(timeline)
}

/// A sequence to play, with its playback settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scenario {
    /// Format version
    pub version: u32,
    /// Display name
    pub name: String,
    /// Loops of the top-level sequence, -1 for infinite
    pub loop_count: i32,
    /// Playback direction
    pub direction: Direction,
    /// Length of one tick in milliseconds
    pub tick_ms: Msecs,
    /// Upper bound on ticks, so infinite loops terminate
    pub max_ticks: u32,
    /// Children of the top-level sequence
    pub children: Vec<ChildSpec>,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            version: SCENARIO_FORMAT_VERSION,
            name: "Untitled Scenario".to_string(),
            loop_count: 1,
            direction: Direction::Forward,
            tick_ms: 16,
            max_ticks: 10_000,
            children: Vec::new(),
        }
    }
}

impl Scenario {
    /// Load a scenario from a file
    pub fn load(path: &Path) -> Result<Self, RunnerError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_ron(&content)
    }

    /// Parse a scenario from RON
    pub fn from_ron(content: &str) -> Result<Self, RunnerError> {
        let scenario: Scenario = ron::from_str(content)?;

        if scenario.version > SCENARIO_FORMAT_VERSION {
            return Err(RunnerError::UnsupportedVersion {
                found: scenario.version,
                supported: SCENARIO_FORMAT_VERSION,
            });
        }

        Ok(scenario)
    }

    /// Serialize to RON
    pub fn to_ron(&self) -> Result<String, RunnerError> {
        let config = ron::ser::PrettyConfig::default()
            .struct_names(true)
            .enumerate_arrays(false);
        Ok(ron::ser::to_string_pretty(self, config)?)
    }

    /// Build the top-level sequence, stopped and ready to start
    pub fn build(&self) -> Result<SequentialTimeline, RunnerError> {
        let mut timeline = build_sequence(&self.children)?;
        timeline.set_loop_count(self.loop_count);
        timeline.set_direction(self.direction);
        Ok(timeline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        Scenario(
            version: 1,
            name: "Intro",
            loop_count: 2,
            direction: Backward,
            children: [
                Pause(duration: 500),
                Sequence(
                    loop_count: 3,
                    children: [Pause(duration: 100)],
                ),
                Uncontrolled(run_for: Some(250)),
            ],
        )
    "#;

    #[test]
    fn test_scenario_parsing() {
        let scenario = Scenario::from_ron(SAMPLE).unwrap();
        assert_eq!(scenario.name, "Intro");
        assert_eq!(scenario.loop_count, 2);
        assert_eq!(scenario.direction, Direction::Backward);
        assert_eq!(scenario.tick_ms, 16);
        assert_eq!(scenario.children.len(), 3);
    }

    #[test]
    fn test_scenario_build() {
        let scenario = Scenario::from_ron(SAMPLE).unwrap();
        let timeline = scenario.build().unwrap();
        assert_eq!(timeline.animation_count(), 3);
        assert_eq!(timeline.loop_count(), 2);
        assert_eq!(timeline.direction(), Direction::Backward);
        assert_eq!(timeline.animation_at(1).and_then(|a| a.total_duration()), Some(300));
        // The uncontrolled child makes the whole sequence open-ended
        assert_eq!(timeline.duration(), None);
    }

    #[test]
    fn test_newer_version_rejected() {
        let err = Scenario::from_ron("Scenario(version: 99)").unwrap_err();
        assert!(matches!(
            err,
            RunnerError::UnsupportedVersion { found: 99, .. }
        ));
    }

    #[test]
    fn test_negative_pause_rejected() {
        let scenario = Scenario {
            children: vec![ChildSpec::Pause { duration: -1 }],
            ..Scenario::default()
        };
        assert!(matches!(
            scenario.build(),
            Err(RunnerError::Timeline(TimelineError::NegativeDuration(-1)))
        ));
    }

    #[test]
    fn test_scenario_ron_roundtrip() {
        let scenario = Scenario::from_ron(SAMPLE).unwrap();
        let ron = scenario.to_ron().unwrap();
        let loaded = Scenario::from_ron(&ron).unwrap();
        assert_eq!(loaded, scenario);
    }
}
