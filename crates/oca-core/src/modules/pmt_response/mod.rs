mod model;
mod parser;

use super::ToolExecutor;
use super::fit_inputs::assign_fit_inputs;
use super::serialization::{TableHeader, TableRecord, ValueFormat};
use crate::common::RunConfig;
use crate::common::constants::ANGLE_BINS;
use crate::domain::{ComputeResult, OutputArtifact};
use crate::parser::TableDocument;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, info};

pub use model::{AngularResponseMatrix, AngularRow, RelativeResponse};
use parser::parse_angular_fit;

pub const PMT_TABLE_TYPE: &str = "PMT_RESPONSE";
pub const PMT_TABLE_INDEX: &str = "snoplus";
pub const PMT_RESPONSE_FIELD: &str = "pmt_relative_response";
pub const DEFAULT_PMT_OUTPUT: &str = "pmtresponses_snoplus.ratdb";

#[derive(Debug, Clone, PartialEq)]
pub struct PmtResponseRequest {
    pub fit_paths: Vec<PathBuf>,
    pub output_path: PathBuf,
    pub config: RunConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PmtResponseReport {
    pub matrix: AngularResponseMatrix,
    pub response: RelativeResponse,
    pub artifacts: Vec<OutputArtifact>,
}

pub struct PmtResponseTool;

impl PmtResponseTool {
    pub fn load_matrix(&self, request: &PmtResponseRequest) -> ComputeResult<AngularResponseMatrix> {
        let config = &request.config;
        config.validate()?;

        let inputs = assign_fit_inputs(&request.fit_paths, &config.laser_wavelengths)?;
        let mut rows = Vec::with_capacity(inputs.len());
        for input in &inputs {
            let document = TableDocument::read(&input.path)?;
            let fit = parse_angular_fit(&document)?;
            let systematics = &config.pmt_systematics[input.laser_index];
            let errors = fit
                .errors
                .iter()
                .zip(systematics)
                .map(|(statistical, systematic)| statistical + systematic)
                .collect();
            debug!(wavelength = input.wavelength, "read angular response");
            rows.push(AngularRow {
                wavelength: input.wavelength,
                values: fit.values,
                errors,
            });
        }

        AngularResponseMatrix::from_rows(rows, ANGLE_BINS)
    }
}

impl ToolExecutor for PmtResponseTool {
    type Request = PmtResponseRequest;
    type Report = PmtResponseReport;

    fn execute(&self, request: &PmtResponseRequest) -> ComputeResult<PmtResponseReport> {
        let matrix = self.load_matrix(request)?;
        let response = matrix.relative_response(&request.config.pmt_grid.points())?;
        info!(
            wavelengths = matrix.wavelengths().len(),
            grid_points = response.wavelengths.len(),
            values = response.values.len(),
            "interpolated PMT angular response"
        );

        let artifact = pmt_response_record(&response).write(&request.output_path)?;
        Ok(PmtResponseReport {
            matrix,
            response,
            artifacts: vec![artifact],
        })
    }
}

pub fn pmt_response_record(response: &RelativeResponse) -> TableRecord {
    TableRecord::new(TableHeader::new(PMT_TABLE_TYPE, PMT_TABLE_INDEX))
        .with_numbers(
            PMT_RESPONSE_FIELD,
            response.values.clone(),
            ValueFormat::Fixed(4),
        )
        .with_properties([PMT_RESPONSE_FIELD])
}

/// One line per angle bin: the measured response at each laser wavelength
/// with its total error.
pub fn pmt_response_summary(matrix: &AngularResponseMatrix) -> String {
    let header = matrix
        .wavelengths()
        .iter()
        .map(|wavelength| format!("{:>18}", format!("{wavelength:.0} nm")))
        .collect::<String>();
    let mut lines = vec![format!("{:>5}{}", "bin", header)];
    for angle_bin in 0..matrix.angle_bins() {
        let cells = (0..matrix.wavelengths().len())
            .map(|row| {
                let value = matrix.value(row, angle_bin).unwrap_or(f64::NAN);
                let error = matrix.error(row, angle_bin).unwrap_or(f64::NAN);
                format!("{:>18}", format!("{value:.4}+/-{error:.4}"))
            })
            .collect::<String>();
        lines.push(format!("{angle_bin:>5}{cells}"));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::{PmtResponseRequest, PmtResponseTool, pmt_response_summary};
    use crate::common::RunConfig;
    use crate::modules::ToolExecutor;
    use crate::parser::TableDocument;
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    fn write_fit(dir: &Path, wavelength: u32, value: f64) -> PathBuf {
        let values = vec![format!("{value}"); 90].join(", ");
        let errors = vec!["0.001".to_string(); 90].join(", ");
        let path = dir.join(format!("oct15_watersin_{wavelength}.ocadb"));
        fs::write(
            &path,
            format!(
                "{{\npmt_angular_response : [ {values}, ],\npmt_angular_response_errors : [ {errors}, ],\n}}\n"
            ),
        )
        .expect("fit should be written");
        path
    }

    #[test]
    fn execute_writes_all_grid_points_for_every_angle() {
        let temp = TempDir::new().expect("tempdir should be created");
        let fit_paths = [(505, 1.5), (337, 1.1), (369, 1.2), (385, 1.3), (420, 1.4)]
            .iter()
            .map(|(wavelength, value)| write_fit(temp.path(), *wavelength, *value))
            .collect();
        let request = PmtResponseRequest {
            fit_paths,
            output_path: temp.path().join("pmtresponses_snoplus.ratdb"),
            config: RunConfig::default(),
        };

        let report = PmtResponseTool.execute(&request).expect("tool should run");
        assert_eq!(report.matrix.wavelengths(), &[337.0, 369.0, 385.0, 420.0, 505.0]);
        assert_eq!(report.matrix.error(0, 1), Some(0.001 + 0.00186736));
        assert_eq!(report.matrix.error(0, 60), Some(0.001));

        let document = TableDocument::read(&request.output_path).expect("output should exist");
        let values = document
            .reader()
            .values("pmt_relative_response")
            .expect("field should parse");
        assert_eq!(values.len(), 50 * 90);
        // 220 nm clamps to the 337 nm row, 710 nm to the 505 nm row.
        assert_eq!(values[0], 1.1);
        assert_eq!(values[89], 1.1);
        assert_eq!(values[49 * 90], 1.5);

        let summary = pmt_response_summary(&report.matrix);
        assert_eq!(summary.lines().count(), 91);
    }

    #[test]
    fn missing_fit_file_writes_nothing() {
        let temp = TempDir::new().expect("tempdir should be created");
        let request = PmtResponseRequest {
            fit_paths: vec![temp.path().join("oct15_watersin_337.ocadb")],
            output_path: temp.path().join("out.ratdb"),
            config: RunConfig::default(),
        };
        let error = PmtResponseTool.execute(&request).expect_err("missing fit should fail");
        assert_eq!(error.placeholder(), "IO.TABLE_READ");
        assert!(!request.output_path.exists());
    }
}
