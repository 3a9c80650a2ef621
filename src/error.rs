//! Error taxonomy for the calibration loop.
//!
//! Infeasible parameter values are not errors: they are scored with the
//! penalty sentinel and never reach this module. Everything here halts the
//! run.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::mechanics::distance::ShapeMismatch;

/// Result type alias using [`CalibrationError`].
pub type Result<T> = std::result::Result<T, CalibrationError>;

#[derive(Debug, Error)]
pub enum CalibrationError {
    #[error("mesh shape mismatch: reference has {reference} points, simulated has {simulated}")]
    ShapeMismatch { reference: usize, simulated: usize },

    #[error("simulator failed: {0}")]
    Simulator(#[from] SimError),

    #[error("mesh conversion failed: {0}")]
    Conversion(#[from] ConvertError),

    #[error("cannot read mesh {path}: {reason}")]
    Mesh { path: PathBuf, reason: String },

    #[error("parameter store {path}: {source}")]
    StoreIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("parameter store: {0}")]
    Store(#[from] StoreError),

    #[error("audit log {path}: {source}")]
    Audit {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("no candidates to select from")]
    NoCandidates,
}

impl From<ShapeMismatch> for CalibrationError {
    fn from(e: ShapeMismatch) -> Self {
        Self::ShapeMismatch { reference: e.reference, simulated: e.simulated }
    }
}

/// Failures of the external solver invocation.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("process count must be at least 1, got {0}")]
    InvalidProcessCount(usize),

    #[error("cannot launch `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("`{program}` exited with {}", describe_exit(.code))]
    Exit { program: String, code: Option<i32> },
}

/// Failures of the external mesh-conversion step.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("cannot launch `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("`{program}` exited with {}", describe_exit(.code))]
    Exit { program: String, code: Option<i32> },

    #[error("expected converted mesh {0} was not produced")]
    MissingOutput(PathBuf),

    #[error("cannot remove stale output {path}: {source}")]
    ClearOutput {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot list results directory {path}: {source}")]
    ListDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Structural problems in the parameter document.
#[derive(Debug, Error, PartialEq)]
pub enum StoreError {
    #[error("no <{0}> element found")]
    MissingField(&'static str),

    #[error("<{tag}> holds `{text}`, which is not a number")]
    InvalidValue { tag: &'static str, text: String },

    #[error("<{0}> element is not closed")]
    UnterminatedElement(&'static str),
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("status {c}"),
        None => "no status (terminated by signal)".to_string(),
    }
}
