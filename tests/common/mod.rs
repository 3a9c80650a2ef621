// tests/common/mod.rs
#![allow(dead_code)]

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

use lame_calibration::Result;
use lame_calibration::mechanics::actions::{Action, Candidate};
use lame_calibration::mechanics::distance::Point3;
use lame_calibration::mechanics::select::Selection;
use lame_calibration::params::{ParameterState, ParameterStore};
use lame_calibration::systems::{Evaluator, Hook, Score, Scorer};

/// A small simulator input with every field the store cares about.
pub fn store_xml(lambda: f64, mu: f64, gravity: Option<f64>) -> String {
    let gravity = gravity
        .map(|g| format!("    <gravity>{g:?}</gravity>\n"))
        .unwrap_or_default();
    format!(
        "<Param>\n\
         \x20 <OutputPathAndPrefix>RL_TestSimResults/TestRL_Beam</OutputPathAndPrefix>\n\
         \x20 <Mesh>\n    <Filename>beam.inp</Filename>\n  </Mesh>\n\
         \x20 <ElasticityParameters>\n\
         \x20   <density>1070.0</density>\n\
         \x20   <lambda>{lambda:?}</lambda>\n\
         \x20   <mu>{mu:?}</mu>\n\
         {gravity}\
         \x20 </ElasticityParameters>\n\
         </Param>\n"
    )
}

pub fn write_store(path: &Path, lambda: f64, mu: f64, gravity: Option<f64>) {
    std::fs::write(path, store_xml(lambda, mu, gravity)).unwrap();
}

pub fn read_state(path: &Path) -> ParameterState {
    ParameterStore::read(path).unwrap().state().unwrap()
}

/// ASCII `.vtu` with only the parts the reader looks at.
pub fn vtu_xml(points: &[Point3]) -> String {
    let coords: Vec<String> = points
        .iter()
        .map(|p| format!("{} {} {}", p[0], p[1], p[2]))
        .collect();
    format!(
        "<?xml version=\"1.0\"?>\n\
         <VTKFile type=\"UnstructuredGrid\" version=\"0.1\" byte_order=\"LittleEndian\">\n\
         <UnstructuredGrid>\n\
         <Piece NumberOfPoints=\"{n}\" NumberOfCells=\"0\">\n\
         <PointData>\n\
         <DataArray type=\"Float64\" Name=\"u0\" format=\"ascii\">{zeros}</DataArray>\n\
         </PointData>\n\
         <Points>\n\
         <DataArray type=\"Float32\" NumberOfComponents=\"3\" format=\"ascii\">\n{body}\n</DataArray>\n\
         </Points>\n\
         </Piece>\n\
         </UnstructuredGrid>\n\
         </VTKFile>\n",
        n = points.len(),
        zeros = vec!["0"; points.len()].join(" "),
        body = coords.join("\n"),
    )
}

pub fn write_vtu(path: &Path, points: &[Point3]) {
    std::fs::write(path, vtu_xml(points)).unwrap();
}

/// A tiny beam: eight corners of a box.
pub fn beam_points() -> Vec<Point3> {
    let mut pts = Vec::new();
    for &x in &[0.0, 10.0] {
        for &y in &[0.0, 1.0] {
            for &z in &[0.0, 1.0] {
                pts.push([x, y, z]);
            }
        }
    }
    pts
}

/// Scores candidates with a closure of their state and records every call.
pub struct FnScorer<F> {
    pub f: F,
    pub calls: Rc<RefCell<Vec<(usize, usize)>>>,
}

impl<F: FnMut(&ParameterState) -> Result<f64>> FnScorer<F> {
    pub fn new(f: F) -> Self {
        Self { f, calls: Rc::new(RefCell::new(Vec::new())) }
    }
}

impl<F: FnMut(&ParameterState) -> Result<f64>> Scorer for FnScorer<F> {
    fn score(&mut self, step: usize, candidate: &Candidate, _base: &ParameterStore) -> Result<f64> {
        self.calls.borrow_mut().push((step, candidate.index));
        (self.f)(&candidate.state)
    }
}

/// Evaluates parameter files with a closure of their state.
pub struct FnEvaluator<F> {
    pub f: F,
    pub calls: Rc<RefCell<Vec<(usize, Action)>>>,
}

impl<F: FnMut(&ParameterState) -> f64> FnEvaluator<F> {
    pub fn new(f: F) -> Self {
        Self { f, calls: Rc::new(RefCell::new(Vec::new())) }
    }
}

impl<F: FnMut(&ParameterState) -> f64> Evaluator for FnEvaluator<F> {
    fn evaluate(
        &mut self,
        step: usize,
        action: Action,
        params: &Path,
        state: &ParameterState,
    ) -> Result<f64> {
        // the evaluator must see the file the driver just wrote
        let on_disk = ParameterStore::read(params)?.state()?;
        assert_eq!(&on_disk, state);
        self.calls.borrow_mut().push((step, action));
        Ok((self.f)(state))
    }
}

#[derive(Default)]
pub struct Observed {
    pub scored: Vec<(usize, usize, Score)>,
    pub selected: Vec<(usize, Selection, ParameterState)>,
    pub explored: Vec<(usize, Action, ParameterState, f64)>,
}

/// Hook that copies every notification into a shared `Observed`.
pub struct RecordingHook(pub Rc<RefCell<Observed>>);

impl Hook for RecordingHook {
    fn on_scored(&mut self, step: usize, candidate: &Candidate, score: Score) {
        self.0.borrow_mut().scored.push((step, candidate.index, score));
    }
    fn on_selected(&mut self, step: usize, selection: &Selection, state: &ParameterState) {
        self.0.borrow_mut().selected.push((step, *selection, *state));
    }
    fn on_explored(&mut self, step: usize, action: Action, state: &ParameterState, rmse: f64) {
        self.0.borrow_mut().explored.push((step, action, *state, rmse));
    }
}
