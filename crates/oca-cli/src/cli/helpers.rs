use super::CliError;
use anyhow::Context;
use oca_core::common::{RunConfig, load_run_config};
use oca_core::domain::{OcaError, OutputArtifact};
use oca_core::modules::fit_inputs::resolve_fit_path;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub(super) fn load_config(path: Option<&Path>) -> Result<RunConfig, CliError> {
    match path {
        Some(path) => {
            let config = load_run_config(path).map_err(OcaError::from)?;
            debug!(path = %path.display(), "loaded run configuration");
            Ok(config)
        }
        None => Ok(RunConfig::default()),
    }
}

pub(super) fn resolve_fit_paths(fits_dir: Option<&Path>, names: &[PathBuf]) -> Vec<PathBuf> {
    names
        .iter()
        .map(|name| resolve_fit_path(fits_dir, name))
        .collect()
}

pub(super) fn print_artifacts(artifacts: &[OutputArtifact]) {
    for artifact in artifacts {
        println!("wrote {}", artifact.path.display());
    }
}

pub(super) fn write_report<T: Serialize>(path: Option<&Path>, report: &T) -> Result<(), CliError> {
    let Some(path) = path else {
        return Ok(());
    };

    let mut content =
        serde_json::to_string_pretty(report).context("failed to serialize run report")?;
    content.push('\n');

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).with_context(|| {
            format!("failed to create report directory '{}'", parent.display())
        })?;
    }
    fs::write(path, content)
        .with_context(|| format!("failed to write run report '{}'", path.display()))?;
    Ok(())
}
