//! Resolution of fit-output files and the laser wavelength each one belongs to.
//!
//! Fit files are named after their data set, e.g. `oct15_watersin_505.ocadb`;
//! the trailing `_NNN` of the stem is the laser wavelength in nanometres.

use crate::common::constants::FIT_FILE_EXTENSION;
use crate::domain::{OcaError, OcaResult};
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct FitInput {
    pub path: PathBuf,
    pub wavelength: f64,
    pub laser_index: usize,
}

/// Joins `name` onto `fits_dir` and appends the fit extension when `name` has none.
pub fn resolve_fit_path(fits_dir: Option<&Path>, name: &Path) -> PathBuf {
    let path = match fits_dir {
        Some(dir) if name.is_relative() => dir.join(name),
        _ => name.to_path_buf(),
    };
    if path.extension().is_some() {
        path
    } else {
        path.with_extension(FIT_FILE_EXTENSION)
    }
}

pub fn wavelength_from_name(path: &Path) -> Option<f64> {
    let stem = path.file_stem()?.to_str()?;
    let (_, suffix) = stem.rsplit_once('_')?;
    if suffix.is_empty() || !suffix.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    suffix.parse::<u32>().ok().map(f64::from)
}

/// Pairs each fit file with a configured laser wavelength.
///
/// Names carrying a `_NNN` suffix are matched by value. When none of them do
/// and exactly one file per laser is given, files are taken in ascending
/// wavelength order. The result is sorted by laser index.
pub fn assign_fit_inputs(paths: &[PathBuf], lasers: &[f64]) -> OcaResult<Vec<FitInput>> {
    if paths.is_empty() {
        return Err(OcaError::input_validation(
            "INPUT.FIT_FILES",
            "at least one fit file is required",
        ));
    }

    let named = paths
        .iter()
        .map(|path| wavelength_from_name(path))
        .collect::<Vec<_>>();

    let mut inputs = if named.iter().all(Option::is_none) {
        if paths.len() != lasers.len() {
            return Err(OcaError::input_validation(
                "INPUT.FIT_WAVELENGTH",
                format!(
                    "fit file names carry no wavelength suffix and {} files were given for {} laser wavelengths",
                    paths.len(),
                    lasers.len()
                ),
            ));
        }
        paths
            .iter()
            .zip(lasers)
            .enumerate()
            .map(|(laser_index, (path, wavelength))| FitInput {
                path: path.clone(),
                wavelength: *wavelength,
                laser_index,
            })
            .collect::<Vec<_>>()
    } else {
        let mut inputs = Vec::with_capacity(paths.len());
        for (path, wavelength) in paths.iter().zip(named) {
            let wavelength = wavelength.ok_or_else(|| {
                OcaError::input_validation(
                    "INPUT.FIT_WAVELENGTH",
                    format!(
                        "fit file '{}' has no '_NNN' wavelength suffix",
                        path.display()
                    ),
                )
            })?;
            let laser_index = lasers
                .iter()
                .position(|laser| *laser == wavelength)
                .ok_or_else(|| {
                    OcaError::input_validation(
                        "INPUT.FIT_WAVELENGTH",
                        format!(
                            "fit file '{}' is for {} nm, which is not a configured laser wavelength",
                            path.display(),
                            wavelength
                        ),
                    )
                })?;
            inputs.push(FitInput {
                path: path.clone(),
                wavelength,
                laser_index,
            });
        }
        inputs
    };

    inputs.sort_by_key(|input| input.laser_index);
    if let Some(pair) = inputs
        .windows(2)
        .find(|pair| pair[0].laser_index == pair[1].laser_index)
    {
        return Err(OcaError::input_validation(
            "INPUT.DUPLICATE_WAVELENGTH",
            format!(
                "fit files '{}' and '{}' are both for {} nm",
                pair[0].path.display(),
                pair[1].path.display(),
                pair[0].wavelength
            ),
        ));
    }

    for input in &inputs {
        debug!(path = %input.path.display(), wavelength = input.wavelength, "assigned fit file");
    }
    Ok(inputs)
}
