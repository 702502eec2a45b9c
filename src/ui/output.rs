//! Output verbosity mode.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Output verbosity mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Everything, including installer output and per-item progress.
    Verbose,
    /// Reports and status.
    #[default]
    Normal,
    /// Final verdicts, warnings and errors.
    Quiet,
    /// Errors only.
    Silent,
}

impl FromStr for OutputMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "verbose" => Ok(Self::Verbose),
            "normal" => Ok(Self::Normal),
            "quiet" => Ok(Self::Quiet),
            "silent" => Ok(Self::Silent),
            _ => Err(format!("unknown output mode: {}", s)),
        }
    }
}

impl OutputMode {
    /// Whether detailed output (installer logs, summary lines) is shown.
    pub fn shows_details(&self) -> bool {
        matches!(self, Self::Verbose | Self::Normal)
    }

    /// Whether progress spinners are shown.
    pub fn shows_spinners(&self) -> bool {
        !matches!(self, Self::Silent)
    }

    /// Whether status messages are shown.
    pub fn shows_status(&self) -> bool {
        !matches!(self, Self::Silent)
    }
}
