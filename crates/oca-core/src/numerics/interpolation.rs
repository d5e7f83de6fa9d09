use serde::{Deserialize, Serialize};

/// What to do with a query outside `[min, max]` of the sampled domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryPolicy {
    #[default]
    Error,
    Clamp,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InterpolationError {
    #[error("linear interpolation requires at least 2 samples, got {actual}")]
    InsufficientPoints { actual: usize },
    #[error("interpolation input length mismatch: x={x}, y={y}")]
    LengthMismatch { x: usize, y: usize },
    #[error("abscissa must be finite at index {index}, got {value}")]
    NonFiniteAbscissa { index: usize, value: f64 },
    #[error(
        "abscissa must be strictly increasing, index {index} has {current} after {previous}"
    )]
    NonIncreasingAbscissa {
        index: usize,
        previous: f64,
        current: f64,
    },
    #[error("sample value must be finite at index {index}, got {value}")]
    NonFiniteOrdinate { index: usize, value: f64 },
    #[error("interpolation query must be finite, got {value}")]
    NonFiniteQuery { value: f64 },
    #[error("query {value} lies outside the sampled domain [{min}, {max}]")]
    OutOfDomain { value: f64, min: f64, max: f64 },
}

/// Piecewise-linear curve through a strictly increasing set of samples.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearInterpolator {
    x: Vec<f64>,
    y: Vec<f64>,
}

impl LinearInterpolator {
    pub fn new(x: Vec<f64>, y: Vec<f64>) -> Result<Self, InterpolationError> {
        validate_samples(&x, &y)?;
        Ok(Self { x, y })
    }

    pub fn from_slices(x: &[f64], y: &[f64]) -> Result<Self, InterpolationError> {
        Self::new(x.to_vec(), y.to_vec())
    }

    pub fn domain(&self) -> (f64, f64) {
        (self.x[0], self.x[self.x.len() - 1])
    }

    pub fn evaluate(&self, query: f64, policy: BoundaryPolicy) -> Result<f64, InterpolationError> {
        if !query.is_finite() {
            return Err(InterpolationError::NonFiniteQuery { value: query });
        }

        let last = self.x.len() - 1;
        let (min, max) = self.domain();
        if query < min || query > max {
            return match policy {
                BoundaryPolicy::Error => Err(InterpolationError::OutOfDomain {
                    value: query,
                    min,
                    max,
                }),
                BoundaryPolicy::Clamp if query < min => Ok(self.y[0]),
                BoundaryPolicy::Clamp => Ok(self.y[last]),
            };
        }

        match self.x.binary_search_by(|sample| sample.total_cmp(&query)) {
            Ok(index) => Ok(self.y[index]),
            Err(upper) => {
                let lower = upper - 1;
                let x0 = self.x[lower];
                let x1 = self.x[upper];
                let y0 = self.y[lower];
                let y1 = self.y[upper];
                let fraction = (query - x0) / (x1 - x0);
                Ok(y0 + (y1 - y0) * fraction)
            }
        }
    }

    pub fn evaluate_many(
        &self,
        queries: &[f64],
        policy: BoundaryPolicy,
    ) -> Result<Vec<f64>, InterpolationError> {
        queries
            .iter()
            .map(|query| self.evaluate(*query, policy))
            .collect()
    }
}

fn validate_samples(x: &[f64], y: &[f64]) -> Result<(), InterpolationError> {
    if x.len() != y.len() {
        return Err(InterpolationError::LengthMismatch {
            x: x.len(),
            y: y.len(),
        });
    }
    if x.len() < 2 {
        return Err(InterpolationError::InsufficientPoints { actual: x.len() });
    }

    for (index, value) in x.iter().copied().enumerate() {
        if !value.is_finite() {
            return Err(InterpolationError::NonFiniteAbscissa { index, value });
        }
        if index > 0 && value <= x[index - 1] {
            return Err(InterpolationError::NonIncreasingAbscissa {
                index,
                previous: x[index - 1],
                current: value,
            });
        }
    }

    for (index, value) in y.iter().copied().enumerate() {
        if !value.is_finite() {
            return Err(InterpolationError::NonFiniteOrdinate { index, value });
        }
    }

    Ok(())
}
