/*!
`lame_calibration`: greedy calibration of Lamé parameters (λ, μ) against an
external elasticity simulator.

What it does
- Holds the current parameters θ = (λ, μ) in an XML parameter file.
- Every step enumerates five candidates `[no-op, λ+ε, λ−ε, μ+ε, μ−ε]`,
  runs the simulator once per feasible candidate, scores each output mesh
  against a fixed reference mesh by RMSE and commits the best candidate.
- Stops when the no-op candidate scores best (a local optimum under the
  single-parameter neighbourhood).

How it is put together
- [`refine`] is the fallible closed loop
  `θ_{t+1} = update(θ_t, measure(simulate(θ_t)))`; both drivers run through it.
- [`mechanics`]: pure pieces (actions, feasibility clamp, RMSE, selector, RNG).
- [`systems`]: external collaborators behind traits (simulator, mesh
  converter, scoring pipeline) so the loop is testable with stubs.
- [`drivers`]: the calibration loop and the random exploration generator.

What it does NOT do
- No learned value function, no discount, no stochastic policy. A "Q-value"
  is just this step's candidate score.
*/

/// Result of a [`refine`] run.
#[derive(Clone, Debug)]
pub struct Refined<P> {
    pub theta: P,
    pub iters: usize,
    pub converged: bool,
}

/// Fallible refinement: θ_{t+1} = update(θ_t, measure(simulate(θ_t))).
///
/// `converged` is checked after `update`, so the returned θ always carries the
/// last update even on the converging step. `max_iters = None` runs until
/// `converged` holds or a closure fails.
pub fn refine<P, D, M, E, Sim, Meas, Upd, Conv>(
    mut theta: P,
    mut simulate: Sim,
    mut measure: Meas,
    mut update: Upd,
    converged: Conv,
    max_iters: Option<usize>,
) -> std::result::Result<Refined<P>, E>
where
    Sim: FnMut(&P) -> std::result::Result<D, E>,
    Meas: FnMut(&D) -> std::result::Result<M, E>,
    Upd: FnMut(&P, &M) -> std::result::Result<P, E>,
    Conv: Fn(&P, &M) -> bool,
{
    let mut iters = 0usize;
    while max_iters.is_none_or(|cap| iters < cap) {
        let data = simulate(&theta)?;
        let pi = measure(&data)?;
        let theta_next = update(&theta, &pi)?;
        iters += 1;
        if converged(&theta_next, &pi) {
            return Ok(Refined { theta: theta_next, iters, converged: true });
        }
        theta = theta_next;
    }
    Ok(Refined { theta, iters, converged: false })
}

pub mod audit;
pub mod config;
pub mod drivers;
pub mod error;
pub mod mechanics;
pub mod mesh;
pub mod params;
pub mod systems;

pub use error::{CalibrationError, Result};
