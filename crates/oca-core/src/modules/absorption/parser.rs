use crate::domain::{OcaError, ParserResult};
use crate::numerics::{BoundaryPolicy, LinearInterpolator};
use crate::parser::{TableDocument, TableReader};

pub(super) const EXTINCTION_KEY: &str = "inner_av_extinction_length";
pub(super) const EXTINCTION_ERROR_KEY: &str = "inner_av_extinction_length_error";
pub(super) const WATER_EXTINCTION_KEY: &str = "water_extinction_length";
pub(super) const WATER_EXTINCTION_ERROR_KEY: &str = "water_extinction_length_error";

pub(super) const SCATTERING_WAVELENGTH_KEY: &str = "RSLENGTH0_value1";
pub(super) const SCATTERING_LENGTH_KEY: &str = "RSLENGTH0_value2";
pub(super) const ABSORPTION_WAVELENGTH_KEY: &str = "ABSLENGTH0_value1";
pub(super) const ABSORPTION_LENGTH_KEY: &str = "ABSLENGTH0_value2";

/// Fitted inner-vessel attenuation coefficient (1/mm) for one laser wavelength.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) struct FitCoefficient {
    pub(super) wavelength: f64,
    pub(super) coefficient: f64,
    pub(super) statistical_error: f64,
    pub(super) water: Option<(f64, f64)>,
}

pub(super) fn parse_fit_coefficient(
    document: &TableDocument,
    wavelength: f64,
) -> ParserResult<FitCoefficient> {
    let reader = document.reader();
    let coefficient = reader.scalar(EXTINCTION_KEY)?;
    let statistical_error = reader.optional_scalar(EXTINCTION_ERROR_KEY)?.unwrap_or(0.0);
    let water = match reader.optional_scalar(WATER_EXTINCTION_KEY)? {
        Some(value) => Some((
            value,
            reader
                .optional_scalar(WATER_EXTINCTION_ERROR_KEY)?
                .unwrap_or(0.0),
        )),
        None => None,
    };

    Ok(FitCoefficient {
        wavelength,
        coefficient,
        statistical_error,
        water,
    })
}

/// Reference Rayleigh scattering and absorption lengths (mm) from the optics table.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct ReferenceOptics {
    scattering: LinearInterpolator,
    absorption: LinearInterpolator,
}

impl ReferenceOptics {
    pub(super) fn from_document(document: &TableDocument, section: &str) -> ParserResult<Self> {
        let reader = document.reader().section(section)?;
        let scattering_wavelengths = reader.values(SCATTERING_WAVELENGTH_KEY)?;
        let scattering_lengths = reader.values(SCATTERING_LENGTH_KEY)?;
        let absorption_lengths = reader.values(ABSORPTION_LENGTH_KEY)?;
        // The absorption grid defaults to the scattering grid when not listed.
        let absorption_wavelengths = reader
            .optional_values(ABSORPTION_WAVELENGTH_KEY)?
            .unwrap_or_else(|| scattering_wavelengths.clone());

        Ok(Self {
            scattering: build_curve(
                &reader,
                SCATTERING_LENGTH_KEY,
                scattering_wavelengths,
                scattering_lengths,
            )?,
            absorption: build_curve(
                &reader,
                ABSORPTION_LENGTH_KEY,
                absorption_wavelengths,
                absorption_lengths,
            )?,
        })
    }

    #[cfg(test)]
    pub(super) fn from_curves(scattering: LinearInterpolator, absorption: LinearInterpolator) -> Self {
        Self {
            scattering,
            absorption,
        }
    }

    pub(super) fn scattering_length(&self, wavelength: f64) -> ParserResult<f64> {
        evaluate(&self.scattering, "scattering", wavelength, BoundaryPolicy::Error)
    }

    pub(super) fn absorption_length(
        &self,
        wavelength: f64,
        policy: BoundaryPolicy,
    ) -> ParserResult<f64> {
        evaluate(&self.absorption, "absorption", wavelength, policy)
    }

    /// Combined reference attenuation length `S·A / (S + A)`.
    pub(super) fn attenuation_length(&self, wavelength: f64) -> ParserResult<f64> {
        let scattering = self.scattering_length(wavelength)?;
        let absorption = self.absorption_length(wavelength, BoundaryPolicy::Error)?;
        Ok(scattering * absorption / (scattering + absorption))
    }
}

fn build_curve(
    reader: &TableReader<'_>,
    key: &str,
    wavelengths: Vec<f64>,
    lengths: Vec<f64>,
) -> ParserResult<LinearInterpolator> {
    LinearInterpolator::new(wavelengths, lengths).map_err(|source| {
        OcaError::input_validation(
            "INPUT.REFERENCE_TABLE",
            format!(
                "reference curve '{}' in '{}' is invalid: {}",
                key,
                reader.label(),
                source
            ),
        )
    })
}

fn evaluate(
    curve: &LinearInterpolator,
    name: &str,
    wavelength: f64,
    policy: BoundaryPolicy,
) -> ParserResult<f64> {
    curve.evaluate(wavelength, policy).map_err(|source| {
        OcaError::input_validation(
            "INPUT.REFERENCE_DOMAIN",
            format!("reference {name} length unavailable at {wavelength} nm: {source}"),
        )
    })
}
