mod model;
mod parser;

use super::ToolExecutor;
use super::fit_inputs::assign_fit_inputs;
use super::serialization::{TableHeader, TableRecord, ValueFormat};
use crate::common::RunConfig;
use crate::domain::{ComputeResult, OutputArtifact};
use crate::parser::TableDocument;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{info, warn};

pub use model::{
    AbsorptionAnalysis, AbsorptionFormula, AbsorptionPoint, AttenuationLength, MIN_DENOMINATOR,
    RatioFit, ScaledPoint, WaterAttenuation,
};
use model::AbsorptionModel;
use parser::{ReferenceOptics, parse_fit_coefficient};

pub const ABSORPTION_TABLE_TYPE: &str = "OPTICS";
pub const ABSORPTION_TABLE_INDEX: &str = "lightwater_snoplus";
pub const ABSORPTION_PROPERTIES: [&str; 2] = ["ABSLENGTH0", "ABSLENGTH_SCALING"];
pub const DEFAULT_ABSORPTION_OUTPUT: &str = "lightwater_snoplus.ratdb";

#[derive(Debug, Clone, PartialEq)]
pub struct AbsorptionRequest {
    pub fit_paths: Vec<PathBuf>,
    pub optics_table: PathBuf,
    pub output_path: PathBuf,
    pub config: RunConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AbsorptionReport {
    pub analysis: AbsorptionAnalysis,
    pub artifacts: Vec<OutputArtifact>,
}

pub struct AbsorptionTool;

impl AbsorptionTool {
    /// Reads the inputs and runs the calculation without writing anything.
    pub fn analyse(&self, request: &AbsorptionRequest) -> ComputeResult<AbsorptionAnalysis> {
        let config = &request.config;
        config.validate()?;

        let optics = TableDocument::read(&request.optics_table)?;
        let reference = ReferenceOptics::from_document(&optics, &config.optics_section)?;

        let inputs = assign_fit_inputs(&request.fit_paths, &config.laser_wavelengths)?;
        let mut coefficients = Vec::with_capacity(inputs.len());
        for input in &inputs {
            let document = TableDocument::read(&input.path)?;
            let fit = parse_fit_coefficient(&document, input.wavelength)?;
            coefficients.push((fit, config.attenuation_systematics[input.laser_index]));
        }

        let formula = AbsorptionFormula::from_variant(config.formula, config.scattering_factor);
        let model = AbsorptionModel {
            formula,
            reference: &reference,
            fit_degree: config.fit_degree,
            grid: config.absorption_grid,
        };
        let analysis = model.analyse(&coefficients)?;

        for point in &analysis.points {
            info!(
                wavelength = point.wavelength,
                attenuation = point.attenuation.length,
                absorption = point.absorption_length,
                absorption_error = point.absorption_error,
                ratio = point.ratio,
                "absorption length"
            );
        }
        if analysis.water.is_empty() {
            warn!("no water_extinction_length found in fit files");
        }
        Ok(analysis)
    }
}

impl ToolExecutor for AbsorptionTool {
    type Request = AbsorptionRequest;
    type Report = AbsorptionReport;

    fn execute(&self, request: &AbsorptionRequest) -> ComputeResult<AbsorptionReport> {
        let analysis = self.analyse(request)?;
        let artifact = absorption_record(&analysis).write(&request.output_path)?;
        Ok(AbsorptionReport {
            analysis,
            artifacts: vec![artifact],
        })
    }
}

pub fn absorption_record(analysis: &AbsorptionAnalysis) -> TableRecord {
    let wavelengths = analysis
        .scaled
        .iter()
        .map(|point| point.wavelength)
        .collect::<Vec<_>>();
    let lengths = analysis
        .scaled
        .iter()
        .map(|point| point.absorption_length)
        .collect::<Vec<_>>();

    TableRecord::new(TableHeader::new(ABSORPTION_TABLE_TYPE, ABSORPTION_TABLE_INDEX))
        .with_text("ABSLENGTH0_option", "wavelength")
        .with_numbers("ABSLENGTH0_value1", wavelengths, ValueFormat::Plain)
        .with_numbers("ABSLENGTH0_value2", lengths, ValueFormat::Fixed(1))
        .with_numbers("ABSLENGTH_SCALING", vec![1.0], ValueFormat::Fixed(1))
        .with_properties(ABSORPTION_PROPERTIES)
}

/// Plain-text table of the per-wavelength results.
pub fn absorption_summary(analysis: &AbsorptionAnalysis) -> String {
    let mut lines = vec![format!(
        "{:>10} {:>14} {:>14} {:>14} {:>12} {:>10} {:>10}",
        "lambda", "attenuation", "absorption", "abs_error", "reference", "ratio", "ratio_err"
    )];
    for point in &analysis.points {
        lines.push(format!(
            "{:>10.1} {:>14.1} {:>14.1} {:>14.1} {:>12.1} {:>10.4} {:>10.4}",
            point.wavelength,
            point.attenuation.length,
            point.absorption_length,
            point.absorption_error,
            point.reference_absorption,
            point.ratio,
            point.ratio_error
        ));
    }
    for water in &analysis.water {
        lines.push(format!(
            "water attenuation at {:.1} nm: {:.1} +/- {:.1}",
            water.wavelength, water.length, water.error
        ));
    }
    for fit in &analysis.fits {
        let marker = if fit.degree == analysis.selected_degree {
            " (written)"
        } else {
            ""
        };
        let terms = fit
            .coefficients
            .iter()
            .map(|coefficient| format!("{coefficient:.6e}"))
            .collect::<Vec<_>>()
            .join(", ");
        lines.push(format!("ratio fit degree {}: [{}]{}", fit.degree, terms, marker));
    }
    lines.join("\n")
}
