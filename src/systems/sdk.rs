// src/systems/sdk.rs

//! # Collaborator SDK
//!
//! Capability traits for everything the calibration loop does not compute
//! itself. The drivers only see these traits, so the loop can be exercised
//! with stubs and the real process-spawning implementations stay in
//! [`simulator`](super::simulator), [`converter`](super::converter) and
//! [`scoring`](super::scoring).
//!
//! ## Seams
//! - [`Simulator`]: run the external solver on a parameter file and wait.
//! - [`MeshConverter`]: turn raw solver output into a mesh with displaced
//!   point coordinates.
//! - [`Evaluator`]: simulate one parameter file and return its distance to
//!   the reference mesh.
//! - [`Scorer`]: score one calibration candidate. The scoring pipeline
//!   implements it by materialising the candidate file and evaluating it.
//! - [`Hook`]: observe scores, selections and exploration ticks (console
//!   reporting, test recorders). All methods default to no-ops.
//!
//! ## Determinism
//! Candidates are scored one at a time, in index order, with the solver
//! pinned to a single process. The RMSE compares nodes by index, and only
//! single-process runs keep node order stable between runs.

use std::path::Path;

use crate::error::{ConvertError, SimError};
use crate::mechanics::actions::{Action, Candidate};
use crate::mechanics::select::Selection;
use crate::params::{ParameterState, ParameterStore};

/// Runs the external solver. `processes == 1` is sequential; more uses MPI.
pub trait Simulator {
    fn run(&mut self, processes: usize, params: &Path) -> Result<(), SimError>;
}

/// Normalises raw solver output under `results_dir`. λ and μ are forwarded
/// for the derived stress field only.
pub trait MeshConverter {
    fn convert(&mut self, results_dir: &Path, lambda: f64, mu: f64) -> Result<(), ConvertError>;
}

pub trait Evaluator {
    fn evaluate(
        &mut self,
        step: usize,
        action: Action,
        params: &Path,
        state: &ParameterState,
    ) -> crate::Result<f64>;
}

pub trait Scorer {
    /// Distance of `candidate`, whose file is `base` with only λ/μ replaced.
    fn score(&mut self, step: usize, candidate: &Candidate, base: &ParameterStore) -> crate::Result<f64>;
}

/// A candidate's score for one step. Lower is better.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Score {
    /// RMSE of a simulated candidate
    Distance(f64),
    /// Sentinel for an infeasible candidate; it was never simulated
    Penalty(f64),
}

impl Score {
    pub fn value(self) -> f64 {
        match self {
            Score::Distance(v) | Score::Penalty(v) => v,
        }
    }

    pub fn is_penalty(self) -> bool {
        matches!(self, Score::Penalty(_))
    }
}

pub trait Hook {
    fn on_scored(&mut self, _step: usize, _candidate: &Candidate, _score: Score) {}
    /// Called after the winner has been written to the store.
    fn on_selected(&mut self, _step: usize, _selection: &Selection, _state: &ParameterState) {}
    fn on_explored(&mut self, _step: usize, _action: Action, _state: &ParameterState, _rmse: f64) {}
}
