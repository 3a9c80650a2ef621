// src/drivers/calibrate.rs

//! Greedy calibration loop.
//!
//! One tick:
//! 1. re-read the canonical parameter file,
//! 2. enumerate `[no-op, λ+ε, λ−ε, μ+ε, μ−ε]`,
//! 3. score every candidate in order (infeasible ones get the penalty and
//!    never reach the scorer),
//! 4. pick the first minimum,
//! 5. write the winner back to the canonical file and append an audit record.
//!
//! The loop stops on the tick where the no-op wins. That tick still rewrites
//! the (unchanged) winner and still appends its audit record.

use std::cell::RefCell;
use std::path::PathBuf;

use tracing::{info, warn};

use crate::audit::{AuditLog, AuditRecord};
use crate::error::{CalibrationError, Result};
use crate::mechanics::actions::{Candidate, StepSizes, enumerate};
use crate::mechanics::select::{Selection, select};
use crate::params::{ParameterState, ParameterStore};
use crate::refine;
use crate::systems::sdk::{Hook, Score, Scorer};

/// All five candidates of one tick with their scores.
#[derive(Clone, Debug)]
pub struct Evaluation {
    pub step: usize,
    pub candidates: [Candidate; 5],
    pub scores: [Score; 5],
}

/// The winning candidate of one tick.
#[derive(Clone, Debug)]
pub struct Decision {
    pub step: usize,
    pub selection: Selection,
    pub winner: Candidate,
    pub scores: [Score; 5],
}

#[derive(Clone, Debug)]
pub struct Outcome {
    pub state: ParameterState,
    pub ticks: usize,
    pub converged: bool,
    pub last: Option<Decision>,
}

pub struct Calibrator<S> {
    store_path: PathBuf,
    steps: StepSizes,
    penalty: f64,
    scorer: S,
    audit: AuditLog,
    hooks: Vec<Box<dyn Hook>>,
    step: usize,
}

impl<S: Scorer> Calibrator<S> {
    pub fn new(
        store_path: impl Into<PathBuf>,
        steps: StepSizes,
        penalty: f64,
        scorer: S,
        audit: AuditLog,
    ) -> Self {
        Self {
            store_path: store_path.into(),
            steps,
            penalty,
            scorer,
            audit,
            hooks: Vec::new(),
            step: 0,
        }
    }

    pub fn with_hook(mut self, hook: Box<dyn Hook>) -> Self {
        self.hooks.push(hook);
        self
    }

    pub fn scorer(&self) -> &S {
        &self.scorer
    }

    /// Number of ticks started so far.
    pub fn step(&self) -> usize {
        self.step
    }

    /// Scores the five candidates around the state currently in the store.
    pub fn evaluate(&mut self) -> Result<Evaluation> {
        self.step += 1;
        let step = self.step;
        let store = ParameterStore::read(&self.store_path)?;
        let current = store.state()?;
        let candidates = enumerate(&current, &self.steps);

        let mut scores = [Score::Penalty(self.penalty); 5];
        for (slot, c) in scores.iter_mut().zip(&candidates) {
            *slot = if c.feasible {
                Score::Distance(self.scorer.score(step, c, &store)?)
            } else {
                warn!(step, index = c.index, action = ?c.action, "infeasible candidate, penalised");
                Score::Penalty(self.penalty)
            };
            for h in self.hooks.iter_mut() {
                h.on_scored(step, c, *slot);
            }
        }

        info!(step, scores = ?scores.map(Score::value), "action space evaluated");
        Ok(Evaluation { step, candidates, scores })
    }

    /// Writes the winner to the canonical store and appends the audit record.
    pub fn commit(&mut self, d: &Decision) -> Result<ParameterState> {
        let mut store = ParameterStore::read(&self.store_path)?;
        store.apply(&d.winner.state)?;
        store.write(&self.store_path)?;
        self.audit.append(&AuditRecord {
            step: d.step,
            action: d.selection.index,
            state: d.winner.state,
        })?;

        info!(
            step = d.step,
            action = d.selection.index,
            state = %d.winner.state,
            converged = d.selection.converged,
            "best action committed"
        );
        for h in self.hooks.iter_mut() {
            h.on_selected(d.step, &d.selection, &d.winner.state);
        }
        Ok(d.winner.state)
    }

    /// One full tick: evaluate, decide, commit.
    pub fn tick(&mut self) -> Result<Decision> {
        let ev = self.evaluate()?;
        let d = decide(&ev)?;
        self.commit(&d)?;
        Ok(d)
    }

    /// Ticks until the no-op wins. There is no iteration cap.
    pub fn run(&mut self) -> Result<Outcome> {
        let initial = ParameterStore::read(&self.store_path)?.state()?;
        info!(state = %initial, "calibration started");

        let last = RefCell::new(None);
        let this = RefCell::new(self);
        let refined = refine(
            initial,
            |_theta| this.borrow_mut().evaluate(),
            decide,
            |_theta, d: &Decision| {
                let state = this.borrow_mut().commit(d)?;
                *last.borrow_mut() = Some(d.clone());
                Ok(state)
            },
            |_theta, d: &Decision| d.selection.converged,
            None,
        )?;

        Ok(Outcome {
            state: refined.theta,
            ticks: refined.iters,
            converged: refined.converged,
            last: last.into_inner(),
        })
    }
}

/// Greedy pick over an evaluation.
pub fn decide(ev: &Evaluation) -> Result<Decision> {
    let values = ev.scores.map(Score::value);
    let selection = select(&values).ok_or(CalibrationError::NoCandidates)?;
    Ok(Decision {
        step: ev.step,
        selection,
        winner: ev.candidates[selection.index],
        scores: ev.scores,
    })
}
