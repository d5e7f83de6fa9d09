use super::parser::{FitCoefficient, ReferenceOptics};
use crate::common::FormulaVariant;
use crate::domain::{ComputeResult, OcaError};
use crate::numerics::{BoundaryPolicy, PolynomialFit, RegularGrid, fit_polynomial};
use serde::Serialize;

/// Denominators smaller than this fraction of the terms they combine are
/// treated as a cancellation failure.
pub const MIN_DENOMINATOR: f64 = 1.0e-9;

/// How attenuation and scattering are combined into an absorption length.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AbsorptionFormula {
    /// `A = L·S / (S − f·L)`.
    RatioCombination { factor: f64 },
    /// `A = 1 / (c − k/S)`, subtracting in coefficient space.
    ReciprocalSubtraction { factor: f64 },
}

impl AbsorptionFormula {
    pub const fn from_variant(variant: FormulaVariant, factor: f64) -> Self {
        match variant {
            FormulaVariant::Ratio => Self::RatioCombination { factor },
            FormulaVariant::Reciprocal => Self::ReciprocalSubtraction { factor },
        }
    }

    pub const fn factor(&self) -> f64 {
        match *self {
            Self::RatioCombination { factor } | Self::ReciprocalSubtraction { factor } => factor,
        }
    }

    /// Absorption length and its propagated error.
    pub fn absorption_length(
        &self,
        attenuation: &AttenuationLength,
        scattering_length: f64,
    ) -> ComputeResult<(f64, f64)> {
        let wavelength = attenuation.wavelength;
        if !scattering_length.is_finite() || scattering_length <= 0.0 {
            return Err(OcaError::computation(
                "RUN.SCATTERING_LENGTH",
                format!(
                    "scattering length at {wavelength} nm must be positive, got {scattering_length}"
                ),
            ));
        }

        let (absorption, error) = match *self {
            Self::RatioCombination { factor } => {
                let length = attenuation.length;
                let sigma = attenuation.error;
                let scaled = factor * length;
                let denominator = scattering_length - scaled;
                check_denominator(wavelength, denominator, scattering_length, scaled)?;

                let absorption = length * scattering_length / denominator;
                let error = sigma * scattering_length / denominator
                    + sigma * length * scattering_length / (denominator * denominator);
                (absorption, error)
            }
            Self::ReciprocalSubtraction { factor } => {
                let coefficient = attenuation.coefficient;
                let scattering_coefficient = factor / scattering_length;
                let denominator = coefficient - scattering_coefficient;
                check_denominator(wavelength, denominator, coefficient, scattering_coefficient)?;

                let absorption = 1.0 / denominator;
                (absorption, absorption * absorption * attenuation.coefficient_error)
            }
        };

        if !absorption.is_finite() || absorption <= 0.0 || !error.is_finite() {
            return Err(OcaError::computation(
                "RUN.ABSORPTION_DENOMINATOR",
                format!(
                    "absorption length at {wavelength} nm is not a positive finite value ({absorption})"
                ),
            ));
        }
        Ok((absorption, error))
    }
}

fn check_denominator(wavelength: f64, denominator: f64, lhs: f64, rhs: f64) -> ComputeResult<()> {
    let magnitude = lhs.abs().max(rhs.abs());
    if !denominator.is_finite() || denominator.abs() <= MIN_DENOMINATOR * magnitude {
        return Err(OcaError::computation(
            "RUN.ABSORPTION_DENOMINATOR",
            format!(
                "absorption denominator at {wavelength} nm vanishes ({denominator:e} against terms of {magnitude:e})"
            ),
        ));
    }
    Ok(())
}

/// Attenuation length `L = 1/c` with `σ_L = L²(σ_stat + σ_sys)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AttenuationLength {
    pub wavelength: f64,
    pub coefficient: f64,
    pub coefficient_error: f64,
    pub length: f64,
    pub error: f64,
}

impl AttenuationLength {
    pub fn from_coefficient(
        wavelength: f64,
        coefficient: f64,
        statistical_error: f64,
        systematic_error: f64,
    ) -> ComputeResult<Self> {
        if !coefficient.is_finite() || coefficient <= 0.0 {
            return Err(OcaError::input_validation(
                "INPUT.ATTENUATION_COEFFICIENT",
                format!(
                    "attenuation coefficient at {wavelength} nm must be positive, got {coefficient}"
                ),
            ));
        }
        let length = 1.0 / coefficient;
        let coefficient_error = statistical_error + systematic_error;
        Ok(Self {
            wavelength,
            coefficient,
            coefficient_error,
            length,
            error: length * length * coefficient_error,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AbsorptionPoint {
    pub wavelength: f64,
    pub attenuation: AttenuationLength,
    pub scattering_length: f64,
    pub absorption_length: f64,
    pub absorption_error: f64,
    pub reference_absorption: f64,
    pub reference_attenuation: f64,
    pub ratio: f64,
    pub ratio_error: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WaterAttenuation {
    pub wavelength: f64,
    pub length: f64,
    pub error: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatioFit {
    pub degree: usize,
    /// Lowest power first.
    pub coefficients: Vec<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScaledPoint {
    pub wavelength: f64,
    pub reference_absorption: f64,
    pub scale: f64,
    pub absorption_length: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AbsorptionAnalysis {
    pub formula: AbsorptionFormula,
    pub points: Vec<AbsorptionPoint>,
    pub water: Vec<WaterAttenuation>,
    pub fits: Vec<RatioFit>,
    pub selected_degree: usize,
    pub scaled: Vec<ScaledPoint>,
}

pub(super) struct AbsorptionModel<'a> {
    pub(super) formula: AbsorptionFormula,
    pub(super) reference: &'a ReferenceOptics,
    pub(super) fit_degree: usize,
    pub(super) grid: RegularGrid,
}

impl AbsorptionModel<'_> {
    /// `coefficients` pairs each fit with the systematic error of its laser.
    pub(super) fn analyse(
        &self,
        coefficients: &[(FitCoefficient, f64)],
    ) -> ComputeResult<AbsorptionAnalysis> {
        let mut points = Vec::with_capacity(coefficients.len());
        let mut water = Vec::new();

        for (fit, systematic) in coefficients {
            let wavelength = fit.wavelength;
            let attenuation = AttenuationLength::from_coefficient(
                wavelength,
                fit.coefficient,
                fit.statistical_error,
                *systematic,
            )?;
            let scattering_length = self.reference.scattering_length(wavelength)?;
            let (absorption_length, absorption_error) =
                self.formula.absorption_length(&attenuation, scattering_length)?;
            let reference_absorption =
                self.reference.absorption_length(wavelength, BoundaryPolicy::Error)?;

            points.push(AbsorptionPoint {
                wavelength,
                attenuation,
                scattering_length,
                absorption_length,
                absorption_error,
                reference_absorption,
                reference_attenuation: self.reference.attenuation_length(wavelength)?,
                ratio: absorption_length / reference_absorption,
                ratio_error: absorption_error / reference_absorption,
            });

            if let Some((coefficient, error)) = fit.water
                && coefficient.is_finite()
                && coefficient > 0.0
            {
                water.push(WaterAttenuation {
                    wavelength,
                    length: 1.0 / coefficient,
                    error: error / (coefficient * coefficient),
                });
            }
        }

        let wavelengths = points.iter().map(|point| point.wavelength).collect::<Vec<_>>();
        let ratios = points.iter().map(|point| point.ratio).collect::<Vec<_>>();

        let selected = ratio_fit(&wavelengths, &ratios, self.fit_degree)?;
        let fits = (1..=crate::numerics::MAX_FIT_DEGREE)
            .filter(|degree| *degree + 1 <= wavelengths.len())
            .map(|degree| {
                ratio_fit(&wavelengths, &ratios, degree).map(|fit| RatioFit {
                    degree,
                    coefficients: fit.power_coefficients(),
                })
            })
            .collect::<ComputeResult<Vec<_>>>()?;

        let scaled = self.scaled_table(&selected)?;

        Ok(AbsorptionAnalysis {
            formula: self.formula,
            points,
            water,
            fits,
            selected_degree: self.fit_degree,
            scaled,
        })
    }

    /// Reference absorption on the output grid scaled by the ratio fit, which
    /// is held constant outside the laser wavelength range.
    fn scaled_table(&self, fit: &PolynomialFit) -> ComputeResult<Vec<ScaledPoint>> {
        self.grid
            .points()
            .into_iter()
            .map(|wavelength| {
                let reference_absorption = self
                    .reference
                    .absorption_length(wavelength, BoundaryPolicy::Clamp)?;
                let scale = fit
                    .evaluate(wavelength, BoundaryPolicy::Clamp)
                    .map_err(|source| fit_error(fit.degree(), source))?;
                Ok(ScaledPoint {
                    wavelength,
                    reference_absorption,
                    scale,
                    absorption_length: reference_absorption * scale,
                })
            })
            .collect()
    }
}

fn ratio_fit(wavelengths: &[f64], ratios: &[f64], degree: usize) -> ComputeResult<PolynomialFit> {
    fit_polynomial(wavelengths, ratios, degree).map_err(|source| fit_error(degree, source))
}

fn fit_error(degree: usize, source: crate::numerics::PolyFitError) -> OcaError {
    OcaError::computation(
        "RUN.RATIO_FIT",
        format!("degree {degree} fit of calculated/reference absorption failed: {source}"),
    )
}
