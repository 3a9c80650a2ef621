// tests/explore.rs
#![cfg(feature = "explore")]

mod common;

use std::cell::RefCell;
use std::fs;
use std::rc::Rc;

use common::*;
use lame_calibration::audit::AuditLog;
use lame_calibration::drivers::Explorer;
use lame_calibration::error::{CalibrationError, ConvertError};
use lame_calibration::mechanics::actions::{Action, StepSizes};
use lame_calibration::mechanics::stoch;
use lame_calibration::params::ParameterState;

fn explorer_at(
    dir: &std::path::Path,
    state: ParameterState,
    seed: u64,
) -> Explorer<FnEvaluator<impl FnMut(&ParameterState) -> f64>> {
    let store = dir.join("beam.xml");
    write_store(&store, state.lambda, state.mu, state.gravity);
    Explorer::new(
        store,
        StepSizes::default(),
        FnEvaluator::new(|s: &ParameterState| s.lambda / 1000.0 + s.mu / 1000.0),
        AuditLog::new(dir.join("state_list.txt")),
        seed,
    )
}

#[test]
fn walk_stays_in_the_domain() {
    let dir = tempfile::tempdir().unwrap();
    let start = ParameterState::new(5_000.0, 3_000.0).with_gravity(-0.5);
    let observed = Rc::new(RefCell::new(Observed::default()));
    let mut ex = explorer_at(dir.path(), start, 11).with_hook(Box::new(RecordingHook(Rc::clone(&observed))));

    let out = ex.run(300).unwrap();

    assert_eq!(out.ticks, 300);
    let p = observed.borrow();
    assert_eq!(p.explored.len(), 300);
    for (_, _, s, _) in &p.explored {
        assert!(s.lambda >= 0.0 && s.mu >= 0.0, "{s}");
        assert!(s.gravity.is_some_and(|g| g <= 0.0), "{s}");
    }
    assert_eq!(read_state(&dir.path().join("beam.xml")), out.state);
    assert_eq!(p.explored.last().map(|e| e.2), Some(out.state));
}

#[test]
fn every_tick_is_logged_and_scored() {
    let dir = tempfile::tempdir().unwrap();
    let mut ex = explorer_at(dir.path(), ParameterState::new(20_000.0, 20_000.0), 3);
    let calls = Rc::clone(&ex.evaluator().calls);

    ex.run(25).unwrap();

    let log = fs::read_to_string(dir.path().join("state_list.txt")).unwrap();
    assert_eq!(log.lines().count(), 50);
    assert!(log.starts_with("ActionNumber in Step 1: "));
    assert!(log.contains("ParameterSet in Step 25: ["));

    let calls = calls.borrow();
    assert_eq!(calls.len(), 25);
    assert_eq!(calls.iter().map(|c| c.0).collect::<Vec<_>>(), (1..=25).collect::<Vec<_>>());
}

#[test]
fn logged_action_is_the_one_applied() {
    let dir = tempfile::tempdir().unwrap();
    let mut ex = explorer_at(dir.path(), ParameterState::new(0.0, 0.0).with_gravity(0.0), 99);

    let store = dir.path().join("beam.xml");
    for _ in 0..40 {
        let before = read_state(&store);
        let mv = ex.advance().unwrap();
        assert_eq!(mv.drawn.reflect(&before, &StepSizes::default()), (mv.action, mv.state));
        assert_eq!(read_state(&store), mv.state);

        let log = fs::read_to_string(dir.path().join("state_list.txt")).unwrap();
        let last_action = log.lines().rev().nth(1).unwrap();
        assert_eq!(last_action, format!("ActionNumber in Step {}: {}", mv.step, mv.action.number()));

        let tick = ex.measure(&mv).unwrap();
        assert_eq!(tick.mv, mv);
    }
}

#[test]
fn same_seed_same_walk() {
    let a = tempfile::tempdir().unwrap();
    let b = tempfile::tempdir().unwrap();
    let start = ParameterState::new(10_000.0, 10_000.0).with_gravity(-1.0);

    let out_a = explorer_at(a.path(), start, 42).run(60).unwrap();
    let out_b = explorer_at(b.path(), start, 42).run(60).unwrap();

    assert_eq!(out_a.state, out_b.state);
    assert_eq!(
        fs::read_to_string(a.path().join("state_list.txt")).unwrap(),
        fs::read_to_string(b.path().join("state_list.txt")).unwrap()
    );
}

#[test]
fn zero_ticks_leave_the_store_alone() {
    let dir = tempfile::tempdir().unwrap();
    let start = ParameterState::new(1.0, 2.0);
    let mut ex = explorer_at(dir.path(), start, 1);

    let out = ex.run(0).unwrap();

    assert_eq!(out.ticks, 0);
    assert_eq!(out.state, start);
    assert!(!dir.path().join("state_list.txt").exists());
}

#[test]
fn evaluator_failure_stops_the_walk() {
    struct Broken;
    impl lame_calibration::systems::Evaluator for Broken {
        fn evaluate(
            &mut self,
            _step: usize,
            _action: Action,
            _params: &std::path::Path,
            _state: &ParameterState,
        ) -> lame_calibration::Result<f64> {
            Err(ConvertError::Exit { program: "python".into(), code: Some(1) }.into())
        }
    }

    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("beam.xml");
    write_store(&store, 10_000.0, 10_000.0, None);
    let mut ex = Explorer::new(&store, StepSizes::default(), Broken, AuditLog::new(dir.path().join("log.txt")), 5);

    let err = ex.run(10).unwrap_err();
    assert!(matches!(err, CalibrationError::Conversion(ConvertError::Exit { .. })));
    // the first move was applied and logged before the evaluator ran
    let log = fs::read_to_string(dir.path().join("log.txt")).unwrap();
    assert_eq!(log.lines().count(), 2);
}

/* ──────────────────────────────────────────────────────────────────────────
RNG helpers
────────────────────────────────────────────────────────────────────────── */

#[test]
fn uniform01_stays_in_unit_interval() {
    let rng = stoch::seeded(7);
    for _ in 0..10_000 {
        let u = stoch::uniform01(&rng);
        assert!((0.0..1.0).contains(&u));
    }
}

#[test]
fn pick_covers_every_action() {
    let rng = stoch::seeded(2024);
    let mut seen = [0usize; 7];
    for _ in 0..7_000 {
        let a = stoch::pick(&rng, &Action::ALL).unwrap();
        seen[a.number()] += 1;
    }
    assert!(seen.iter().all(|&n| n > 700), "{seen:?}");
}

#[test]
fn pick_from_nothing_is_none() {
    let rng = stoch::seeded(0);
    assert_eq!(stoch::pick::<Action>(&rng, &[]), None);
}

#[test]
fn seeds_replay() {
    let a = stoch::seeded(123);
    let b = stoch::seeded(123);
    let xs: Vec<usize> = (0..32).map(|_| stoch::uniform_index(&a, 1000)).collect();
    let ys: Vec<usize> = (0..32).map(|_| stoch::uniform_index(&b, 1000)).collect();
    assert_eq!(xs, ys);
}
