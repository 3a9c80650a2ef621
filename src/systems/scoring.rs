//! Scoring pipeline: candidate file → solver → conversion → RMSE.
//!
//! Collaborator failures are returned, not turned into a penalty: a broken
//! solver must stop the run instead of steering the search.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::audit::{AuditLog, RmseRecord};
use crate::error::{ConvertError, Result};
use crate::mechanics::actions::{Action, Candidate};
use crate::mechanics::distance::{Point3, rmse};
use crate::mesh;
use crate::params::{ParameterState, ParameterStore, candidate_path};
use crate::systems::converter::remove_stale;
use crate::systems::sdk::{Evaluator, MeshConverter, Scorer, Simulator};

/// Node order is only stable between single-process runs.
pub const SCORING_PROCESSES: usize = 1;

pub struct ScoringPipeline<S, C> {
    simulator: S,
    converter: C,
    reference: Vec<Point3>,
    simulated_mesh: PathBuf,
    results_dir: PathBuf,
    store_path: PathBuf,
    rmse_log: AuditLog,
}

impl<S: Simulator, C: MeshConverter> ScoringPipeline<S, C> {
    /// Loads the reference mesh once; it is never written.
    pub fn new(
        simulator: S,
        converter: C,
        reference_mesh: &Path,
        simulated_mesh: impl Into<PathBuf>,
        results_dir: impl Into<PathBuf>,
        store_path: impl Into<PathBuf>,
        rmse_log: AuditLog,
    ) -> Result<Self> {
        let reference = mesh::read_points(reference_mesh)?;
        info!(points = reference.len(), path = %reference_mesh.display(), "reference mesh loaded");
        Ok(Self {
            simulator,
            converter,
            reference,
            simulated_mesh: simulated_mesh.into(),
            results_dir: results_dir.into(),
            store_path: store_path.into(),
            rmse_log,
        })
    }

    pub fn reference(&self) -> &[Point3] {
        &self.reference
    }

    pub fn simulator(&self) -> &S {
        &self.simulator
    }

    pub fn converter(&self) -> &C {
        &self.converter
    }
}

impl<S: Simulator, C: MeshConverter> Evaluator for ScoringPipeline<S, C> {
    fn evaluate(
        &mut self,
        step: usize,
        action: Action,
        params: &Path,
        state: &ParameterState,
    ) -> Result<f64> {
        // a mesh left by the previous candidate must never be scored for this one
        remove_stale(&self.simulated_mesh)?;
        self.simulator.run(SCORING_PROCESSES, params)?;
        self.converter.convert(&self.results_dir, state.lambda, state.mu)?;
        if !self.simulated_mesh.exists() {
            return Err(ConvertError::MissingOutput(self.simulated_mesh.clone()).into());
        }

        let simulated = mesh::read_points(&self.simulated_mesh)?;
        let distance = rmse(&self.reference, &simulated)?;
        debug!(step, action = action.number(), distance, "candidate distance");

        self.rmse_log.append(&RmseRecord { step, action: action.number(), rmse: distance })?;
        Ok(distance)
    }
}

impl<S: Simulator, C: MeshConverter> Scorer for ScoringPipeline<S, C> {
    fn score(&mut self, step: usize, candidate: &Candidate, base: &ParameterStore) -> Result<f64> {
        let mut doc = base.clone();
        doc.apply(&candidate.state)?;
        let path = candidate_path(&self.store_path, candidate.index);
        doc.write(&path)?;
        debug!(step, index = candidate.index, file = %path.display(), "candidate file written");

        self.evaluate(step, candidate.action, &path, &candidate.state)
    }
}
