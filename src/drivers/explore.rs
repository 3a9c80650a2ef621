// src/drivers/explore.rs
#![cfg(feature = "explore")]

//! Random-walk training-data generator.
//!
//! Each tick draws one of the seven actions uniformly, applies it to the
//! canonical parameter file with reflecting feasibility, logs the new state,
//! then simulates and scores the file. There is no selection and no
//! convergence; the run stops after `max_ticks`.

use std::cell::RefCell;
use std::path::PathBuf;

use bevy_prng::WyRand;
use tracing::info;

use crate::audit::{AuditLog, ExploreRecord};
use crate::error::{CalibrationError, Result};
use crate::mechanics::actions::{Action, StepSizes};
use crate::mechanics::stoch;
use crate::params::{ParameterState, ParameterStore};
use crate::refine;
use crate::systems::sdk::{Evaluator, Hook};

/// The state change of one tick, before it is simulated.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Move {
    pub step: usize,
    /// What the RNG asked for
    pub drawn: Action,
    /// What was applied after reflection
    pub action: Action,
    pub state: ParameterState,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExploreTick {
    pub mv: Move,
    pub rmse: f64,
}

#[derive(Clone, Debug)]
pub struct ExploreOutcome {
    pub state: ParameterState,
    pub ticks: usize,
}

pub struct Explorer<E> {
    store_path: PathBuf,
    steps: StepSizes,
    evaluator: E,
    log: AuditLog,
    rng: RefCell<WyRand>,
    hooks: Vec<Box<dyn Hook>>,
    step: usize,
}

impl<E: Evaluator> Explorer<E> {
    pub fn new(
        store_path: impl Into<PathBuf>,
        steps: StepSizes,
        evaluator: E,
        log: AuditLog,
        seed: u64,
    ) -> Self {
        Self {
            store_path: store_path.into(),
            steps,
            evaluator,
            log,
            rng: stoch::seeded(seed),
            hooks: Vec::new(),
            step: 0,
        }
    }

    pub fn with_hook(mut self, hook: Box<dyn Hook>) -> Self {
        self.hooks.push(hook);
        self
    }

    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }

    /// Draws an action, applies it to the store and logs the new state.
    pub fn advance(&mut self) -> Result<Move> {
        self.step += 1;
        let mut store = ParameterStore::read(&self.store_path)?;
        let current = store.state()?;

        let drawn = stoch::pick(&self.rng, &Action::ALL).unwrap_or(Action::NoOp);
        let (action, state) = drawn.reflect(&current, &self.steps);
        store.apply(&state)?;
        store.write(&self.store_path)?;

        self.log.append(&ExploreRecord { step: self.step, action: action.number(), state })?;
        info!(step = self.step, drawn = ?drawn, applied = ?action, state = %state, "exploration move");
        Ok(Move { step: self.step, drawn, action, state })
    }

    /// Simulates the store as left by `mv` and scores it.
    pub fn measure(&mut self, mv: &Move) -> Result<ExploreTick> {
        let rmse = self.evaluator.evaluate(mv.step, mv.action, &self.store_path, &mv.state)?;
        for h in self.hooks.iter_mut() {
            h.on_explored(mv.step, mv.action, &mv.state, rmse);
        }
        Ok(ExploreTick { mv: *mv, rmse })
    }

    pub fn tick(&mut self) -> Result<ExploreTick> {
        let mv = self.advance()?;
        self.measure(&mv)
    }

    /// Runs exactly `max_ticks` ticks unless a collaborator fails.
    pub fn run(&mut self, max_ticks: usize) -> Result<ExploreOutcome> {
        let initial = ParameterStore::read(&self.store_path)?.state()?;
        info!(state = %initial, max_ticks, "exploration started");

        let this = RefCell::new(self);
        let refined = refine(
            initial,
            |_theta| this.borrow_mut().advance(),
            |mv: &Move| this.borrow_mut().measure(mv),
            |_theta, t: &ExploreTick| Ok::<_, CalibrationError>(t.mv.state),
            |_theta, _t: &ExploreTick| false,
            Some(max_ticks),
        )?;

        Ok(ExploreOutcome { state: refined.theta, ticks: refined.iters })
    }
}
