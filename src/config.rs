//! Calibration configuration

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CalibrationError, Result};
use crate::mechanics::actions::StepSizes;

/// Everything the drivers need that is not in the parameter file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    /// ε for λ actions
    pub epsilon_lambda: f64,
    /// ε for μ actions
    pub epsilon_mu: f64,
    /// ε for gravity actions (exploration only)
    pub epsilon_gravity: f64,
    /// Score given to infeasible candidates
    pub penalty_score: f64,
    /// Ground-truth mesh, never written
    pub reference_mesh_path: PathBuf,
    /// Converted mesh the simulator run produces
    pub simulated_mesh_path: PathBuf,
    /// Where the simulator writes raw results
    pub results_dir: PathBuf,
    pub simulator: SimulatorSettings,
    pub converter: ConverterSettings,
    pub audit: AuditSettings,
    pub explore: ExploreSettings,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            epsilon_lambda: 5000.0,
            epsilon_mu: 3000.0,
            epsilon_gravity: 0.5,
            penalty_score: 10_000.0,
            reference_mesh_path: PathBuf::from(
                "RL_TestSimResults/Beam_REALDATA_solution_np1_RefLvl0_Tstep.0010_outVis.vtu",
            ),
            simulated_mesh_path: PathBuf::from(
                "RL_TestSimResults/TestRL_Beam_solution_np1_RefLvl0_Tstep.0010_outVis.vtu",
            ),
            results_dir: PathBuf::from("RL_TestSimResults"),
            simulator: SimulatorSettings::default(),
            converter: ConverterSettings::default(),
            audit: AuditSettings::default(),
            explore: ExploreSettings::default(),
        }
    }
}

impl CalibrationConfig {
    /// Defaults, overlaid with `path` when given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let cfg = match path {
            Some(p) => {
                let text = fs::read_to_string(p)
                    .map_err(|e| CalibrationError::Config(format!("{}: {e}", p.display())))?;
                serde_json::from_str(&text)
                    .map_err(|e| CalibrationError::Config(format!("{}: {e}", p.display())))?
            }
            None => Self::default(),
        };
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        for (name, eps) in [
            ("epsilon_lambda", self.epsilon_lambda),
            ("epsilon_mu", self.epsilon_mu),
            ("epsilon_gravity", self.epsilon_gravity),
        ] {
            if !(eps.is_finite() && eps > 0.0) {
                return Err(CalibrationError::Config(format!("{name} must be positive, got {eps}")));
            }
        }
        if !(self.penalty_score.is_finite() && self.penalty_score >= 0.0) {
            return Err(CalibrationError::Config(format!(
                "penalty_score must be non-negative, got {}",
                self.penalty_score
            )));
        }
        Ok(())
    }

    pub fn steps(&self) -> StepSizes {
        StepSizes {
            lambda: self.epsilon_lambda,
            mu: self.epsilon_mu,
            gravity: self.epsilon_gravity,
        }
    }
}

/// External solver settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorSettings {
    pub executable: PathBuf,
    /// Used only for multi-process runs
    pub mpi_launcher: String,
}

impl Default for SimulatorSettings {
    fn default() -> Self {
        Self { executable: PathBuf::from("./elasticity"), mpi_launcher: "mpirun".to_string() }
    }
}

/// Mesh conversion command. Invoked as `<program> <args..> <dir>/ <lambda> <mu>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConverterSettings {
    pub program: String,
    pub args: Vec<String>,
}

impl Default for ConverterSettings {
    fn default() -> Self {
        Self {
            program: "python".to_string(),
            args: vec!["RL_Pvtu2vtuConverterAndVMStressCalculator.py".to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditSettings {
    pub state_log: PathBuf,
    pub rmse_log: PathBuf,
}

impl Default for AuditSettings {
    fn default() -> Self {
        Self {
            state_log: PathBuf::from("RL_state_list.txt"),
            rmse_log: PathBuf::from("RL_rmse_value_list.txt"),
        }
    }
}

/// Random-walk dataset generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExploreSettings {
    pub max_ticks: usize,
    pub seed: u64,
    pub state_log: PathBuf,
}

impl Default for ExploreSettings {
    fn default() -> Self {
        Self { max_ticks: 1000, seed: 0x5EED, state_log: PathBuf::from("state_list.txt") }
    }
}
