pub mod errors;

pub use errors::{ComputeResult, OcaError, OcaErrorCategory, OcaResult, ParserResult};

use serde::Serialize;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CalibrationTool {
    Absorption,
    PmtResponse,
    GreyDisc,
    HighStatJobs,
    ShadowingJobs,
}

impl CalibrationTool {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Absorption => "ABSORPTION",
            Self::PmtResponse => "PMT_RESPONSE",
            Self::GreyDisc => "GREY_DISC",
            Self::HighStatJobs => "HIGH_STAT_JOBS",
            Self::ShadowingJobs => "SHADOWING_JOBS",
        }
    }
}

impl Display for CalibrationTool {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).as_str())
    }
}

/// A file written by one of the tools.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputArtifact {
    pub path: PathBuf,
}

impl OutputArtifact {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}
