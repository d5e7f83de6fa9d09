//! Optional JSON run configuration.
//!
//! Every field has a default matching the calibration constants in
//! [`super::constants`], so an empty object `{}` is a valid configuration.

use super::constants::{
    ABSORPTION_GRID, ANGLE_BINS, ATTENUATION_SYSTEMATICS, DEFAULT_FIT_DEGREE,
    DEFAULT_OPTICS_SECTION, DEFAULT_SCATTERING_FACTOR, LASER_WAVELENGTHS, PMT_GRID,
    pmt_systematic_rows,
};
use crate::domain::{OcaError, OcaResult};
use crate::numerics::{MAX_FIT_DEGREE, RegularGrid};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Which absorption-length combination to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormulaVariant {
    #[default]
    Ratio,
    Reciprocal,
}

impl FormulaVariant {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ratio => "ratio",
            Self::Reciprocal => "reciprocal",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct RunConfig {
    pub laser_wavelengths: Vec<f64>,
    pub attenuation_systematics: Vec<f64>,
    pub pmt_systematics: Vec<Vec<f64>>,
    pub formula: FormulaVariant,
    pub scattering_factor: f64,
    pub fit_degree: usize,
    pub optics_section: String,
    pub absorption_grid: RegularGrid,
    pub pmt_grid: RegularGrid,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            laser_wavelengths: LASER_WAVELENGTHS.to_vec(),
            attenuation_systematics: ATTENUATION_SYSTEMATICS.to_vec(),
            pmt_systematics: pmt_systematic_rows(),
            formula: FormulaVariant::default(),
            scattering_factor: DEFAULT_SCATTERING_FACTOR,
            fit_degree: DEFAULT_FIT_DEGREE,
            optics_section: DEFAULT_OPTICS_SECTION.to_string(),
            absorption_grid: RegularGrid {
                start: ABSORPTION_GRID.0,
                stop: ABSORPTION_GRID.1,
                step: ABSORPTION_GRID.2,
            },
            pmt_grid: RegularGrid {
                start: PMT_GRID.0,
                stop: PMT_GRID.1,
                step: PMT_GRID.2,
            },
        }
    }
}

impl RunConfig {
    pub fn validate(&self) -> OcaResult<()> {
        let lasers = self.laser_wavelengths.len();
        if lasers < 2 {
            return Err(config_error(format!(
                "at least 2 laser wavelengths are required, got {lasers}"
            )));
        }
        if !self
            .laser_wavelengths
            .windows(2)
            .all(|pair| pair[0].is_finite() && pair[0] < pair[1])
        {
            return Err(config_error(
                "laser wavelengths must be finite and strictly increasing",
            ));
        }
        if self.attenuation_systematics.len() != lasers {
            return Err(config_error(format!(
                "attenuationSystematics has {} entries for {} laser wavelengths",
                self.attenuation_systematics.len(),
                lasers
            )));
        }
        if self.pmt_systematics.len() != lasers
            || self.pmt_systematics.iter().any(|row| row.len() != ANGLE_BINS)
        {
            return Err(config_error(format!(
                "pmtSystematics must be {lasers} rows of {ANGLE_BINS} angle bins"
            )));
        }
        if !self.scattering_factor.is_finite() {
            return Err(config_error("scatteringFactor must be finite"));
        }
        if self.fit_degree == 0 || self.fit_degree > MAX_FIT_DEGREE {
            return Err(config_error(format!(
                "fitDegree must be between 1 and {MAX_FIT_DEGREE}, got {}",
                self.fit_degree
            )));
        }
        for (name, grid) in [
            ("absorptionGrid", &self.absorption_grid),
            ("pmtGrid", &self.pmt_grid),
        ] {
            grid.validate()
                .map_err(|source| config_error(format!("{name}: {source}")))?;
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RunConfigError {
    #[error("failed to read run configuration '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse run configuration '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl From<RunConfigError> for OcaError {
    fn from(error: RunConfigError) -> Self {
        match &error {
            RunConfigError::Read { .. } => OcaError::io_system("IO.CONFIG_READ", error.to_string()),
            RunConfigError::Parse { .. } => {
                OcaError::input_validation("INPUT.CONFIG_PARSE", error.to_string())
            }
        }
    }
}

pub fn load_run_config(path: impl AsRef<Path>) -> Result<RunConfig, RunConfigError> {
    let path = path.as_ref();
    let source = fs::read_to_string(path).map_err(|source| RunConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&source).map_err(|source| RunConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn config_error(message: impl Into<String>) -> OcaError {
    OcaError::input_validation("INPUT.CONFIG_VALUE", message)
}

#[cfg(test)]
mod tests {
    use super::{FormulaVariant, RunConfig, RunConfigError, load_run_config};
    use crate::domain::OcaError;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn default_config_is_valid() {
        let config = RunConfig::default();
        config.validate().expect("defaults should validate");
        assert_eq!(config.absorption_grid.len(), 31);
        assert_eq!(config.pmt_grid.len(), 50);
        assert_eq!(config.formula, FormulaVariant::Ratio);
    }

    #[test]
    fn partial_json_keeps_remaining_defaults() {
        let temp = TempDir::new().expect("tempdir should be created");
        let path = temp.path().join("run.json");
        fs::write(
            &path,
            r#"{ "formula": "reciprocal", "scatteringFactor": 0.5, "fitDegree": 2 }"#,
        )
        .expect("config should be written");

        let config = load_run_config(&path).expect("config should load");
        assert_eq!(config.formula, FormulaVariant::Reciprocal);
        assert_eq!(config.scattering_factor, 0.5);
        assert_eq!(config.fit_degree, 2);
        assert_eq!(config.laser_wavelengths, RunConfig::default().laser_wavelengths);
    }

    #[test]
    fn unknown_fields_and_missing_files_are_reported() {
        let temp = TempDir::new().expect("tempdir should be created");
        let path = temp.path().join("run.json");
        fs::write(&path, r#"{ "fitDegre": 2 }"#).expect("config should be written");

        let error = load_run_config(&path).expect_err("typo should fail");
        assert!(matches!(error, RunConfigError::Parse { .. }));
        assert_eq!(OcaError::from(error).placeholder(), "INPUT.CONFIG_PARSE");

        let missing = load_run_config(temp.path().join("absent.json"))
            .expect_err("missing file should fail");
        assert_eq!(OcaError::from(missing).exit_code(), 3);
    }

    #[test]
    fn inconsistent_tables_fail_validation() {
        let config = RunConfig {
            attenuation_systematics: vec![1.0e-6; 4],
            ..RunConfig::default()
        };
        let error = config.validate().expect_err("length mismatch should fail");
        assert_eq!(error.placeholder(), "INPUT.CONFIG_VALUE");

        let config = RunConfig {
            fit_degree: 4,
            ..RunConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
