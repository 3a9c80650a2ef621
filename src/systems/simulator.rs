//! Process-spawning solver invocation.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, info};

use crate::config::SimulatorSettings;
use crate::error::SimError;
use crate::systems::sdk::Simulator;

/// Runs the solver executable as a blocking child process.
#[derive(Clone, Debug)]
pub struct ProcessSimulator {
    executable: PathBuf,
    mpi_launcher: String,
    results_dir: PathBuf,
}

impl ProcessSimulator {
    pub fn new(settings: &SimulatorSettings, results_dir: impl Into<PathBuf>) -> Self {
        Self {
            executable: settings.executable.clone(),
            mpi_launcher: settings.mpi_launcher.clone(),
            results_dir: results_dir.into(),
        }
    }

    /// `<exe> <params>` for one process, `<launcher> -np N <exe> <params>` otherwise.
    pub fn command(&self, processes: usize, params: &Path) -> Result<Command, SimError> {
        match processes {
            0 => Err(SimError::InvalidProcessCount(0)),
            1 => {
                let mut cmd = Command::new(&self.executable);
                cmd.arg(params);
                Ok(cmd)
            }
            n => {
                let mut cmd = Command::new(&self.mpi_launcher);
                cmd.arg("-np").arg(n.to_string()).arg(&self.executable).arg(params);
                Ok(cmd)
            }
        }
    }
}

impl Simulator for ProcessSimulator {
    fn run(&mut self, processes: usize, params: &Path) -> Result<(), SimError> {
        let mut cmd = self.command(processes, params)?;
        let program = cmd.get_program().to_string_lossy().into_owned();

        // the solver expects its output directory to exist
        fs::create_dir_all(&self.results_dir)
            .map_err(|source| SimError::Spawn { program: program.clone(), source })?;

        let mode = if processes == 1 { "sequential" } else { "parallel" };
        info!(processes, params = %params.display(), "starting solver in {mode} mode");
        debug!(?cmd, "solver command");

        let status = cmd
            .status()
            .map_err(|source| SimError::Spawn { program: program.clone(), source })?;
        if !status.success() {
            return Err(SimError::Exit { program, code: status.code() });
        }
        Ok(())
    }
}
