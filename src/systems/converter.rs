//! External mesh conversion (`.pvtu` → displaced `.vtu` with stress field).

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

use crate::config::ConverterSettings;
use crate::error::ConvertError;
use crate::systems::sdk::MeshConverter;

/// Raw outputs carrying one of these markers are not converted.
const SKIPPED_MARKERS: [&str; 3] = ["_deformedSolution_", "_initial_mesh_", "_REALDATA_"];

/// A raw partitioned output and the converted file it maps to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConversionTarget {
    pub source: PathBuf,
    pub output: PathBuf,
}

/// `*.pvtu` files under `dir` that the converter will process, sorted by name.
pub fn conversion_targets(dir: &Path) -> Result<Vec<ConversionTarget>, ConvertError> {
    let entries = fs::read_dir(dir)
        .map_err(|source| ConvertError::ListDir { path: dir.to_path_buf(), source })?;

    let mut targets = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|source| ConvertError::ListDir { path: dir.to_path_buf(), source })?
            .path();
        if path.extension().is_none_or(|e| e != "pvtu") {
            continue;
        }
        let Some(stem) = path.file_stem().map(|s| s.to_string_lossy().into_owned()) else {
            continue;
        };
        if SKIPPED_MARKERS.iter().any(|m| stem.contains(m)) {
            continue;
        }
        let output = path.with_file_name(format!("{stem}_outVis.vtu"));
        targets.push(ConversionTarget { source: path, output });
    }
    targets.sort_by(|a, b| a.source.cmp(&b.source));
    Ok(targets)
}

/// Deletes `path` if it exists, so a later existence check proves a fresh write.
pub fn remove_stale(path: &Path) -> Result<(), ConvertError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(ConvertError::ClearOutput { path: path.to_path_buf(), source }),
    }
}

/// Runs a conversion script and checks that every expected output appeared.
#[derive(Clone, Debug)]
pub struct CommandConverter {
    program: String,
    args: Vec<String>,
}

impl CommandConverter {
    pub fn new(settings: &ConverterSettings) -> Self {
        Self { program: settings.program.clone(), args: settings.args.clone() }
    }
}

impl MeshConverter for CommandConverter {
    fn convert(&mut self, results_dir: &Path, lambda: f64, mu: f64) -> Result<(), ConvertError> {
        let targets = conversion_targets(results_dir)?;
        debug!(count = targets.len(), dir = %results_dir.display(), "conversion targets");
        // outputs of an earlier run must not pass the check below
        for t in &targets {
            remove_stale(&t.output)?;
        }

        // the script globs `<dir>*.pvtu`, so the separator is required
        let dir_arg = format!("{}/", results_dir.display());
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args).arg(dir_arg).arg(lambda.to_string()).arg(mu.to_string());
        debug!(?cmd, "converter command");

        let status = cmd
            .status()
            .map_err(|source| ConvertError::Spawn { program: self.program.clone(), source })?;
        if !status.success() {
            return Err(ConvertError::Exit { program: self.program.clone(), code: status.code() });
        }

        if let Some(missing) = targets.into_iter().find(|t| !t.output.exists()) {
            return Err(ConvertError::MissingOutput(missing.output));
        }
        Ok(())
    }
}
