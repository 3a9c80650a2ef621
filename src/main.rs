//! CLI for greedy Lamé-parameter calibration

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use lame_calibration::audit::AuditLog;
use lame_calibration::config::CalibrationConfig;
use lame_calibration::drivers::Calibrator;
use lame_calibration::mechanics::actions::{Action, Candidate};
use lame_calibration::mechanics::distance::rmse;
use lame_calibration::mechanics::select::Selection;
use lame_calibration::mesh;
use lame_calibration::params::{self, ParameterState};
use lame_calibration::systems::converter::CommandConverter;
use lame_calibration::systems::scoring::ScoringPipeline;
use lame_calibration::systems::simulator::ProcessSimulator;
use lame_calibration::systems::{Hook, Score, Simulator};

#[derive(Parser)]
#[command(name = "lame-calibrate")]
#[command(about = "Greedy calibration of Lamé parameters against an elasticity simulator", long_about = None)]
struct Cli {
    /// JSON configuration file (defaults apply to missing fields)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the calibration loop until the no-op action wins
    Calibrate {
        /// Canonical parameter file, rewritten after every step
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Generate training data by random parameter walks
    #[cfg(feature = "explore")]
    Explore {
        /// Parameter file mutated in place
        #[arg(short, long)]
        input: PathBuf,

        /// Number of ticks (overrides config)
        #[arg(short, long)]
        ticks: Option<usize>,

        /// RNG seed (overrides config)
        #[arg(short, long)]
        seed: Option<u64>,
    },

    /// RMSE between the points of two .vtu meshes
    Rmse {
        #[arg(short, long)]
        reference: PathBuf,

        #[arg(short, long)]
        simulated: PathBuf,
    },

    /// Derive a new parameter file from a template
    Setup {
        #[arg(short, long)]
        template: PathBuf,

        #[arg(short, long)]
        output: PathBuf,

        #[arg(short, long)]
        lambda: f64,

        #[arg(short, long)]
        mu: f64,

        /// New value for OutputPathAndPrefix
        #[arg(short = 'p', long)]
        output_prefix: Option<String>,
    },

    /// Run the solver once
    Simulate {
        /// Process count; more than one launches through MPI
        #[arg(short, long, default_value_t = 1)]
        np: usize,

        #[arg(short, long)]
        input: PathBuf,
    },
}

/// Coloured progress on stdout.
struct ConsoleReporter;

impl Hook for ConsoleReporter {
    fn on_scored(&mut self, step: usize, candidate: &Candidate, score: Score) {
        let line = format!(
            "Step {step}, action {} ({:?}): {}",
            candidate.index,
            candidate.action,
            score.value()
        );
        if score.is_penalty() {
            println!("{}", format!("{line} (infeasible, not simulated)").red());
        } else {
            println!("{}", line.yellow());
        }
    }

    fn on_selected(&mut self, step: usize, selection: &Selection, state: &ParameterState) {
        println!(
            "{}",
            format!("Step {step}: best action is {} -> {state}", selection.index).green().bold()
        );
        if selection.converged {
            println!(
                "{}",
                "Locally best parameter combination found for this initial guess.".red().bold()
            );
            println!(
                "{}",
                "A different initial guess may be needed to reach another (possibly better) local optimum."
                    .red()
            );
        }
    }

    fn on_explored(&mut self, step: usize, action: Action, state: &ParameterState, rmse: f64) {
        println!(
            "{}",
            format!("Step {step}: action {} -> {state}, RMSE {rmse}", action.number()).yellow()
        );
    }
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let cfg = CalibrationConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Calibrate { input } => calibrate(&cfg, &input),
        #[cfg(feature = "explore")]
        Commands::Explore { input, ticks, seed } => explore(&cfg, &input, ticks, seed),
        Commands::Rmse { reference, simulated } => {
            let a = mesh::read_points(&reference)?;
            let b = mesh::read_points(&simulated)?;
            let d = rmse(&a, &b)?;
            println!("{} {}", "RMSE:".green().bold(), d);
            Ok(())
        }
        Commands::Setup { template, output, lambda, mu, output_prefix } => {
            let state = params::setup(&template, &output, lambda, mu, output_prefix.as_deref())?;
            println!("{} {} -> {}", "Wrote".green(), output.display(), state);
            Ok(())
        }
        Commands::Simulate { np, input } => {
            let mut sim = ProcessSimulator::new(&cfg.simulator, &cfg.results_dir);
            sim.run(np, &input)
                .with_context(|| format!("simulating {}", input.display()))?;
            println!("{}", "Simulation finished.".green());
            Ok(())
        }
    }
}

fn pipeline(
    cfg: &CalibrationConfig,
    input: &Path,
) -> Result<ScoringPipeline<ProcessSimulator, CommandConverter>> {
    let pipeline = ScoringPipeline::new(
        ProcessSimulator::new(&cfg.simulator, &cfg.results_dir),
        CommandConverter::new(&cfg.converter),
        &cfg.reference_mesh_path,
        &cfg.simulated_mesh_path,
        &cfg.results_dir,
        input,
        AuditLog::new(&cfg.audit.rmse_log),
    )?;
    Ok(pipeline)
}

fn calibrate(cfg: &CalibrationConfig, input: &Path) -> Result<()> {
    println!("{}", "Calibration started.".yellow());
    let mut calibrator = Calibrator::new(
        input,
        cfg.steps(),
        cfg.penalty_score,
        pipeline(cfg, input)?,
        AuditLog::new(&cfg.audit.state_log),
    )
    .with_hook(Box::new(ConsoleReporter));

    let outcome = calibrator
        .run()
        .with_context(|| format!("calibrating {}", input.display()))?;
    println!(
        "{}",
        format!("Calibration finished after {} steps: {}", outcome.ticks, outcome.state).yellow()
    );
    Ok(())
}

#[cfg(feature = "explore")]
fn explore(cfg: &CalibrationConfig, input: &Path, ticks: Option<usize>, seed: Option<u64>) -> Result<()> {
    use lame_calibration::drivers::Explorer;

    let ticks = ticks.unwrap_or(cfg.explore.max_ticks);
    let seed = seed.unwrap_or(cfg.explore.seed);
    println!("{}", format!("Exploration started ({ticks} ticks, seed {seed}).").yellow());

    let mut explorer = Explorer::new(
        input,
        cfg.steps(),
        pipeline(cfg, input)?,
        AuditLog::new(&cfg.explore.state_log),
        seed,
    )
    .with_hook(Box::new(ConsoleReporter));

    let outcome = explorer
        .run(ticks)
        .with_context(|| format!("exploring from {}", input.display()))?;
    println!(
        "{}",
        format!("Exploration finished after {} ticks: {}", outcome.ticks, outcome.state).yellow()
    );
    Ok(())
}
