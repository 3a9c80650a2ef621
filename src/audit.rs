//! Append-only, line-oriented audit logs. Written, never read back.

use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{CalibrationError, Result};
use crate::params::ParameterState;

#[derive(Clone, Debug)]
pub struct AuditLog {
    path: PathBuf,
}

impl AuditLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one record, creating the file on first use.
    pub fn append(&self, record: &impl fmt::Display) -> Result<()> {
        let err = |source| CalibrationError::Audit { path: self.path.clone(), source };
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path).map_err(err)?;
        writeln!(file, "{record}").map_err(err)
    }
}

/// Chosen action and resulting state of one calibration step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AuditRecord {
    pub step: usize,
    pub action: usize,
    pub state: ParameterState,
}

impl fmt::Display for AuditRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Chosen ActionNumber in Step {}   :  {}", self.step, self.action)?;
        write!(f, "Produced ParameterSet in Step {} :  {}", self.step, self.state)
    }
}

/// Distance of one simulated candidate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RmseRecord {
    pub step: usize,
    pub action: usize,
    pub rmse: f64,
}

impl fmt::Display for RmseRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RMSE-Value in Step {} Action Number {}: {:?}", self.step, self.action, self.rmse)
    }
}

/// Drawn action and resulting state of one exploration tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExploreRecord {
    pub step: usize,
    pub action: usize,
    pub state: ParameterState,
}

impl fmt::Display for ExploreRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ActionNumber in Step {}: {}", self.step, self.action)?;
        write!(f, "ParameterSet in Step {}: {}", self.step, self.state)
    }
}
