//! Grey-disc absorption probabilities corrected by the measured PMT response.

use super::ToolExecutor;
use super::pmt_response::PMT_RESPONSE_FIELD;
use super::serialization::{TableHeader, TableRecord, ValueFormat};
use crate::common::constants::{ANGLE_BINS, GREY_DISC_CORRECTED_BINS};
use crate::domain::{ComputeResult, OcaError, OutputArtifact, ParserResult};
use crate::parser::TableDocument;
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

pub const ABSORPTION_PROBABILITY_FIELD: &str = "absorption_probability";
pub const DEFAULT_GREY_DISC_TYPE: &str = "GREY_DISC_PARAMETERS";
pub const DEFAULT_GREY_DISC_INDEX: &str = "DiscOptics0_0";
pub const DEFAULT_GREY_DISC_OUTPUT: &str = "greydisc_snoplus.ratdb";

#[derive(Debug, Clone, PartialEq)]
pub struct GreyDiscRequest {
    pub parameters_path: PathBuf,
    pub responses_path: PathBuf,
    pub output_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GreyDiscReport {
    pub rows: usize,
    pub angle_bins: usize,
    pub corrected_bins: usize,
    pub absorption_probability: Vec<f64>,
    pub artifacts: Vec<OutputArtifact>,
}

/// For each wavelength row, the first `corrected_bins` angle bins become the
/// row's normal-incidence probability times the relative response; the
/// remaining bins keep the original probability.
pub fn correct_absorption_probability(
    probability: &[f64],
    response: &[f64],
    angle_bins: usize,
    corrected_bins: usize,
) -> ComputeResult<Vec<f64>> {
    if angle_bins == 0 || probability.is_empty() || probability.len() % angle_bins != 0 {
        return Err(OcaError::input_validation(
            "INPUT.GREY_DISC_SHAPE",
            format!(
                "{} absorption probabilities do not form rows of {} angle bins",
                probability.len(),
                angle_bins
            ),
        ));
    }
    if response.len() != probability.len() {
        return Err(OcaError::input_validation(
            "INPUT.GREY_DISC_SHAPE",
            format!(
                "{} relative responses for {} absorption probabilities",
                response.len(),
                probability.len()
            ),
        ));
    }

    let corrected = probability
        .chunks(angle_bins)
        .zip(response.chunks(angle_bins))
        .flat_map(|(probability_row, response_row)| {
            let normal_incidence = probability_row[0];
            probability_row
                .iter()
                .zip(response_row)
                .enumerate()
                .map(move |(angle_bin, (probability, response))| {
                    if angle_bin < corrected_bins {
                        normal_incidence * response
                    } else {
                        *probability
                    }
                })
        })
        .collect();
    Ok(corrected)
}

pub struct GreyDiscTool;

impl ToolExecutor for GreyDiscTool {
    type Request = GreyDiscRequest;
    type Report = GreyDiscReport;

    fn execute(&self, request: &GreyDiscRequest) -> ComputeResult<GreyDiscReport> {
        let parameters = TableDocument::read(&request.parameters_path)?;
        let responses = TableDocument::read(&request.responses_path)?;

        let parameter_reader = parameters.reader();
        let probability = parameter_reader.values(ABSORPTION_PROBABILITY_FIELD)?;
        let response = responses.reader().values(PMT_RESPONSE_FIELD)?;
        let corrected =
            correct_absorption_probability(&probability, &response, ANGLE_BINS, GREY_DISC_CORRECTED_BINS)?;

        let header = TableHeader::new(
            optional_text(&parameters, "type")?.unwrap_or_else(|| DEFAULT_GREY_DISC_TYPE.to_string()),
            optional_text(&parameters, "index")?.unwrap_or_else(|| DEFAULT_GREY_DISC_INDEX.to_string()),
        );
        let artifact = TableRecord::new(header)
            .with_numbers(
                ABSORPTION_PROBABILITY_FIELD,
                corrected.clone(),
                ValueFormat::Scientific(5),
            )
            .with_properties([ABSORPTION_PROBABILITY_FIELD])
            .write(&request.output_path)?;

        let rows = corrected.len() / ANGLE_BINS;
        info!(rows, angle_bins = ANGLE_BINS, "corrected grey-disc absorption probabilities");
        Ok(GreyDiscReport {
            rows,
            angle_bins: ANGLE_BINS,
            corrected_bins: GREY_DISC_CORRECTED_BINS,
            absorption_probability: corrected,
            artifacts: vec![artifact],
        })
    }
}

fn optional_text(document: &TableDocument, key: &str) -> ParserResult<Option<String>> {
    let reader = document.reader();
    if reader.contains_key(key) {
        reader.text(key).map(Some)
    } else {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::{GreyDiscRequest, GreyDiscTool, correct_absorption_probability};
    use crate::modules::ToolExecutor;
    use crate::parser::TableDocument;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn leading_bins_use_normal_incidence_times_response() {
        let probability = [0.5, 0.6, 0.7, 0.8, 0.1, 0.2, 0.3, 0.4];
        let response = [1.0, 2.0, 3.0, 4.0, 1.0, 2.0, 2.0, 2.5];
        let corrected =
            correct_absorption_probability(&probability, &response, 4, 2).expect("shape is valid");
        assert_eq!(corrected, vec![0.5, 1.0, 0.7, 0.8, 0.1, 0.2, 0.3, 0.4]);
    }

    #[test]
    fn mismatched_shapes_are_rejected() {
        let error = correct_absorption_probability(&[0.1; 5], &[1.0; 5], 4, 2)
            .expect_err("5 values are not whole rows");
        assert_eq!(error.placeholder(), "INPUT.GREY_DISC_SHAPE");

        let error = correct_absorption_probability(&[0.1; 8], &[1.0; 4], 4, 2)
            .expect_err("lengths differ");
        assert_eq!(error.placeholder(), "INPUT.GREY_DISC_SHAPE");
    }

    #[test]
    fn execute_keeps_the_parameter_header_and_writes_scientific_values() {
        let temp = TempDir::new().expect("tempdir should be created");
        let parameters = temp.path().join("GREY_DISC_PARAMETERS.ratdb");
        let responses = temp.path().join("pmtresponses_snoplus.ratdb");
        let output = temp.path().join("greydisc.ratdb");

        let probability = vec!["0.25".to_string(); 180].join(", ");
        let response = vec!["1.2000".to_string(); 180].join(", ");
        fs::write(
            &parameters,
            format!(
                "{{\ntype: \"GREY_DISC_PARAMETERS\",\nindex: \"DiscOptics_snoplus\",\nabsorption_probability: [ {probability}, ],\n}}\n"
            ),
        )
        .expect("parameters should be written");
        fs::write(
            &responses,
            format!("{{\npmt_relative_response: [{response}],\n}}\n"),
        )
        .expect("responses should be written");

        let report = GreyDiscTool
            .execute(&GreyDiscRequest {
                parameters_path: parameters,
                responses_path: responses,
                output_path: output.clone(),
            })
            .expect("tool should run");
        assert_eq!(report.rows, 2);

        let written = fs::read_to_string(&output).expect("output should exist");
        assert!(written.contains("index: \"DiscOptics_snoplus\","));
        assert!(written.contains("absorption_probability: [3.00000e-01, "));
        assert!(written.contains(", 2.50000e-01, "));

        let values = TableDocument::from_source("out", written)
            .reader()
            .values("absorption_probability")
            .expect("output should parse");
        assert_eq!(values.len(), 180);
        assert_eq!(values[43], 0.3);
        assert_eq!(values[44], 0.25);
    }
}
