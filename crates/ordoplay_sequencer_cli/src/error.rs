// SPDX-License-Identifier: MIT OR Apache-2.0
//! Runner errors.

use ordoplay_sequencer::TimelineError;
use thiserror::Error;

/// Error type for loading and running scenarios
#[derive(Debug, Error)]
pub enum RunnerError {
    /// No scenario path on the command line
    #[error("Usage: sequencer_run <scenario.ron> | --template")]
    MissingScenario,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Scenario could not be parsed
    #[error("Invalid scenario: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// Scenario could not be written
    #[error("Serialization error: {0}")]
    Serialization(#[from] ron::Error),

    /// Report could not be encoded
    #[error("Report encoding error: {0}")]
    Report(#[from] serde_json::Error),

    /// Scenario written by a newer runner
    #[error("Scenario version {found} is newer than supported version {supported}")]
    UnsupportedVersion {
        /// Version found in the file
        found: u32,
        /// Newest version this runner reads
        supported: u32,
    },

    /// Timeline rejected the scenario
    #[error("Timeline error: {0}")]
    Timeline(#[from] TimelineError),
}
