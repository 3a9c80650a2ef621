/// Actions: single-parameter perturbations and the feasibility policy.

use crate::params::ParameterState;

/// Fixed perturbation magnitudes (ε) per parameter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepSizes {
    pub lambda: f64,
    pub mu: f64,
    pub gravity: f64,
}

impl Default for StepSizes {
    fn default() -> Self {
        Self { lambda: 5000.0, mu: 3000.0, gravity: 0.5 }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    NoOp,
    LambdaIncrease,
    LambdaDecrease,
    MuIncrease,
    MuDecrease,
    GravityIncrease,
    GravityDecrease,
}

impl Action {
    /// Candidate order of one calibration step; the index is the action number.
    pub const CALIBRATION: [Action; 5] = [
        Action::NoOp,
        Action::LambdaIncrease,
        Action::LambdaDecrease,
        Action::MuIncrease,
        Action::MuDecrease,
    ];

    /// Everything the exploration generator may draw from.
    pub const ALL: [Action; 7] = [
        Action::NoOp,
        Action::LambdaIncrease,
        Action::LambdaDecrease,
        Action::MuIncrease,
        Action::MuDecrease,
        Action::GravityIncrease,
        Action::GravityDecrease,
    ];

    pub fn number(self) -> usize {
        match self {
            Action::NoOp => 0,
            Action::LambdaIncrease => 1,
            Action::LambdaDecrease => 2,
            Action::MuIncrease => 3,
            Action::MuDecrease => 4,
            Action::GravityIncrease => 5,
            Action::GravityDecrease => 6,
        }
    }

    /// Applies the action, or `None` when the result leaves the domain
    /// (λ or μ below zero, gravity above zero). Gravity actions on a state
    /// without gravity change nothing.
    #[inline]
    pub fn apply(self, s: &ParameterState, eps: &StepSizes) -> Option<ParameterState> {
        let mut next = *s;
        match self {
            Action::NoOp => {}
            Action::LambdaIncrease => next.lambda += eps.lambda,
            Action::LambdaDecrease => {
                next.lambda -= eps.lambda;
                if next.lambda < 0.0 {
                    return None;
                }
            }
            Action::MuIncrease => next.mu += eps.mu,
            Action::MuDecrease => {
                next.mu -= eps.mu;
                if next.mu < 0.0 {
                    return None;
                }
            }
            Action::GravityIncrease => {
                if let Some(g) = next.gravity.as_mut() {
                    *g += eps.gravity;
                    if *g > 0.0 {
                        return None;
                    }
                }
            }
            Action::GravityDecrease => {
                if let Some(g) = next.gravity.as_mut() {
                    *g -= eps.gravity;
                }
            }
        }
        Some(next)
    }

    /// The opposite move along the same parameter.
    pub fn mirrored(self) -> Action {
        match self {
            Action::NoOp => Action::NoOp,
            Action::LambdaIncrease => Action::LambdaDecrease,
            Action::LambdaDecrease => Action::LambdaIncrease,
            Action::MuIncrease => Action::MuDecrease,
            Action::MuDecrease => Action::MuIncrease,
            Action::GravityIncrease => Action::GravityDecrease,
            Action::GravityDecrease => Action::GravityIncrease,
        }
    }

    /// Exploration policy: an infeasible move is replaced by its mirror.
    /// Returns the action that was effectively applied.
    pub fn reflect(self, s: &ParameterState, eps: &StepSizes) -> (Action, ParameterState) {
        match self.apply(s, eps) {
            Some(next) => (self, next),
            None => {
                let back = self.mirrored();
                // the mirror of an infeasible move always stays in the domain
                (back, back.apply(s, eps).unwrap_or(*s))
            }
        }
    }
}

/// An action paired with the state it leads to. Infeasible candidates keep
/// the current state and are never simulated.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Candidate {
    pub index: usize,
    pub action: Action,
    pub state: ParameterState,
    pub feasible: bool,
}

/// The five calibration candidates for `s`, in action-number order.
pub fn enumerate(s: &ParameterState, eps: &StepSizes) -> [Candidate; 5] {
    Action::CALIBRATION.map(|action| {
        let (state, feasible) = match action.apply(s, eps) {
            Some(next) => (next, true),
            None => (*s, false),
        };
        Candidate { index: action.number(), action, state, feasible }
    })
}
