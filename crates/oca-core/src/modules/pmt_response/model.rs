use crate::domain::{ComputeResult, OcaError};
use crate::numerics::{BoundaryPolicy, LinearInterpolator};
use serde::Serialize;

/// Responses and total errors indexed by (wavelength, angle bin).
///
/// Rows are held in ascending wavelength order regardless of the order in
/// which the measurements were supplied.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AngularResponseMatrix {
    wavelengths: Vec<f64>,
    angle_bins: usize,
    values: Vec<f64>,
    errors: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AngularRow {
    pub wavelength: f64,
    pub values: Vec<f64>,
    pub errors: Vec<f64>,
}

impl AngularResponseMatrix {
    pub fn from_rows(mut rows: Vec<AngularRow>, angle_bins: usize) -> ComputeResult<Self> {
        if rows.len() < 2 {
            return Err(OcaError::input_validation(
                "INPUT.PMT_WAVELENGTHS",
                format!(
                    "angular response needs at least 2 wavelengths, got {}",
                    rows.len()
                ),
            ));
        }
        rows.sort_by(|a, b| a.wavelength.total_cmp(&b.wavelength));

        let mut wavelengths = Vec::with_capacity(rows.len());
        let mut values = Vec::with_capacity(rows.len() * angle_bins);
        let mut errors = Vec::with_capacity(rows.len() * angle_bins);
        for row in rows {
            if row.values.len() != angle_bins || row.errors.len() != angle_bins {
                return Err(OcaError::input_validation(
                    "INPUT.ANGLE_BINS",
                    format!(
                        "row for {} nm has {} values and {} errors, expected {}",
                        row.wavelength,
                        row.values.len(),
                        row.errors.len(),
                        angle_bins
                    ),
                ));
            }
            if wavelengths.last() == Some(&row.wavelength) {
                return Err(OcaError::input_validation(
                    "INPUT.DUPLICATE_WAVELENGTH",
                    format!("angular response for {} nm given twice", row.wavelength),
                ));
            }
            wavelengths.push(row.wavelength);
            values.extend(row.values);
            errors.extend(row.errors);
        }

        Ok(Self {
            wavelengths,
            angle_bins,
            values,
            errors,
        })
    }

    pub fn wavelengths(&self) -> &[f64] {
        &self.wavelengths
    }

    pub fn angle_bins(&self) -> usize {
        self.angle_bins
    }

    pub fn value(&self, wavelength_index: usize, angle_bin: usize) -> Option<f64> {
        self.offset(wavelength_index, angle_bin)
            .map(|offset| self.values[offset])
    }

    pub fn error(&self, wavelength_index: usize, angle_bin: usize) -> Option<f64> {
        self.offset(wavelength_index, angle_bin)
            .map(|offset| self.errors[offset])
    }

    pub fn angle_column(&self, angle_bin: usize) -> Vec<f64> {
        (0..self.wavelengths.len())
            .filter_map(|row| self.value(row, angle_bin))
            .collect()
    }

    /// Interpolates every angle bin onto `grid`, clamping outside the measured
    /// wavelengths.
    pub fn relative_response(&self, grid: &[f64]) -> ComputeResult<RelativeResponse> {
        let mut values = vec![0.0; grid.len() * self.angle_bins];
        for angle_bin in 0..self.angle_bins {
            let curve = LinearInterpolator::new(self.wavelengths.clone(), self.angle_column(angle_bin))
                .map_err(|source| {
                    OcaError::computation(
                        "RUN.PMT_INTERPOLATION",
                        format!("angle bin {angle_bin} cannot be interpolated: {source}"),
                    )
                })?;
            let column = curve
                .evaluate_many(grid, BoundaryPolicy::Clamp)
                .map_err(|source| {
                    OcaError::computation(
                        "RUN.PMT_INTERPOLATION",
                        format!("angle bin {angle_bin} on the output grid: {source}"),
                    )
                })?;
            for (row, value) in column.into_iter().enumerate() {
                values[row * self.angle_bins + angle_bin] = value;
            }
        }

        Ok(RelativeResponse {
            wavelengths: grid.to_vec(),
            angle_bins: self.angle_bins,
            values,
        })
    }

    fn offset(&self, wavelength_index: usize, angle_bin: usize) -> Option<usize> {
        (wavelength_index < self.wavelengths.len() && angle_bin < self.angle_bins)
            .then_some(wavelength_index * self.angle_bins + angle_bin)
    }
}

/// Response on the output wavelength grid, stored wavelength-major.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelativeResponse {
    pub wavelengths: Vec<f64>,
    pub angle_bins: usize,
    pub values: Vec<f64>,
}

impl RelativeResponse {
    pub fn at(&self, wavelength_index: usize, angle_bin: usize) -> Option<f64> {
        (angle_bin < self.angle_bins)
            .then(|| self.values.get(wavelength_index * self.angle_bins + angle_bin))
            .flatten()
            .copied()
    }
}
