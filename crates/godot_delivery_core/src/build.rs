use crate::package::PckMetadata;

use serde::{Deserialize, Serialize};

/// The result of running the export pipeline for one repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BuildOutput {
    /// Packages exported in preset order, all sharing one game name.
    Packages(Vec<PckMetadata>),
    /// The pipeline stopped cleanly without touching storage.
    Skipped(SkipReason),
}

/// Expected, recoverable reasons for a build to export nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    /// The repository could not be cloned.
    FetchFailed,
    /// No usable export preset was declared.
    NoPresets,
    /// The project declares no game name.
    MissingGameName,
}

impl BuildOutput {
    /// The produced packages, empty when skipped.
    pub fn packages(&self) -> &[PckMetadata] {
        match self {
            Self::Packages(packages) => packages,
            Self::Skipped(_) => &[],
        }
    }
}
