use super::interpolation::BoundaryPolicy;
use super::linalg::{DenseMatrix, LuError, lu_solve};

pub const MAX_FIT_DEGREE: usize = 3;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PolyFitError {
    #[error("polynomial degree must be between 1 and 3, got {degree}")]
    UnsupportedDegree { degree: usize },
    #[error("degree {degree} fit requires at least {required} points, got {actual}")]
    InsufficientPoints {
        degree: usize,
        required: usize,
        actual: usize,
    },
    #[error("fit input length mismatch: x={x}, y={y}")]
    LengthMismatch { x: usize, y: usize },
    #[error("fit sample must be finite at index {index}")]
    NonFiniteSample { index: usize },
    #[error("fit abscissae span a zero-width domain")]
    DegenerateDomain,
    #[error("normal equations could not be solved: {0}")]
    Solve(#[from] LuError),
    #[error("fit query must be finite, got {value}")]
    NonFiniteQuery { value: f64 },
    #[error("query {value} lies outside the fitted domain [{min}, {max}]")]
    OutOfDomain { value: f64, min: f64, max: f64 },
}

/// Least-squares polynomial over a small sample set.
///
/// Coefficients are stored in the centred and scaled variable
/// `t = (x - center) / scale`, which keeps the normal equations well
/// conditioned for wavelengths in the hundreds of nanometres.
#[derive(Debug, Clone, PartialEq)]
pub struct PolynomialFit {
    degree: usize,
    center: f64,
    scale: f64,
    domain: (f64, f64),
    scaled_coefficients: Vec<f64>,
}

pub fn fit_polynomial(x: &[f64], y: &[f64], degree: usize) -> Result<PolynomialFit, PolyFitError> {
    if degree == 0 || degree > MAX_FIT_DEGREE {
        return Err(PolyFitError::UnsupportedDegree { degree });
    }
    if x.len() != y.len() {
        return Err(PolyFitError::LengthMismatch {
            x: x.len(),
            y: y.len(),
        });
    }
    if x.len() < degree + 1 {
        return Err(PolyFitError::InsufficientPoints {
            degree,
            required: degree + 1,
            actual: x.len(),
        });
    }
    if let Some(index) = x
        .iter()
        .zip(y)
        .position(|(xi, yi)| !xi.is_finite() || !yi.is_finite())
    {
        return Err(PolyFitError::NonFiniteSample { index });
    }

    let min = x.iter().copied().fold(f64::INFINITY, f64::min);
    let max = x.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let scale = (max - min) / 2.0;
    if scale <= 0.0 {
        return Err(PolyFitError::DegenerateDomain);
    }
    let center = (max + min) / 2.0;

    let terms = degree + 1;
    let mut normal = DenseMatrix::zeros(terms, terms);
    let mut rhs = vec![0.0; terms];
    for (xi, yi) in x.iter().zip(y) {
        let powers = scaled_powers((xi - center) / scale, degree);
        for row in 0..terms {
            rhs[row] += powers[row] * yi;
            for col in 0..terms {
                normal[(row, col)] += powers[row] * powers[col];
            }
        }
    }

    let scaled_coefficients = lu_solve(&normal, &rhs)?;

    Ok(PolynomialFit {
        degree,
        center,
        scale,
        domain: (min, max),
        scaled_coefficients,
    })
}

impl PolynomialFit {
    pub fn degree(&self) -> usize {
        self.degree
    }

    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    pub fn evaluate(&self, x: f64, policy: BoundaryPolicy) -> Result<f64, PolyFitError> {
        if !x.is_finite() {
            return Err(PolyFitError::NonFiniteQuery { value: x });
        }

        let (min, max) = self.domain;
        let x = if x < min || x > max {
            match policy {
                BoundaryPolicy::Error => {
                    return Err(PolyFitError::OutOfDomain { value: x, min, max });
                }
                BoundaryPolicy::Clamp => x.clamp(min, max),
            }
        } else {
            x
        };

        Ok(self.evaluate_unchecked(x))
    }

    /// Coefficients of the fit in the raw variable, lowest power first.
    pub fn power_coefficients(&self) -> Vec<f64> {
        let mut coefficients = vec![0.0; self.degree + 1];
        let shift = -self.center;

        for (power, scaled) in self.scaled_coefficients.iter().enumerate() {
            let factor = scaled / self.scale.powi(power as i32);
            for (exponent, coefficient) in coefficients.iter_mut().enumerate().take(power + 1) {
                *coefficient += factor
                    * binomial(power, exponent)
                    * shift.powi((power - exponent) as i32);
            }
        }

        coefficients
    }

    fn evaluate_unchecked(&self, x: f64) -> f64 {
        let t = (x - self.center) / self.scale;
        self.scaled_coefficients
            .iter()
            .rev()
            .fold(0.0, |accumulator, coefficient| accumulator * t + coefficient)
    }
}

fn scaled_powers(t: f64, degree: usize) -> Vec<f64> {
    let mut powers = Vec::with_capacity(degree + 1);
    let mut value = 1.0;
    for _ in 0..=degree {
        powers.push(value);
        value *= t;
    }
    powers
}

fn binomial(n: usize, k: usize) -> f64 {
    (0..k).fold(1.0, |accumulator, index| {
        accumulator * (n - index) as f64 / (index + 1) as f64
    })
}
