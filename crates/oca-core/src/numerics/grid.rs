use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GridError {
    #[error("grid step must be finite and positive, got {step}")]
    InvalidStep { step: f64 },
    #[error("grid bounds must be finite with start <= stop, got [{start}, {stop}]")]
    InvalidBounds { start: f64, stop: f64 },
}

const LATTICE_SLACK: f64 = 1.0e-9;

/// Evenly spaced abscissae `start, start + step, ...` up to and including
/// `stop`; the last point never exceeds `stop`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegularGrid {
    pub start: f64,
    pub stop: f64,
    pub step: f64,
}

impl RegularGrid {
    pub fn inclusive(start: f64, stop: f64, step: f64) -> Result<Self, GridError> {
        let grid = Self { start, stop, step };
        grid.validate()?;
        Ok(grid)
    }

    pub fn validate(&self) -> Result<(), GridError> {
        if !self.step.is_finite() || self.step <= 0.0 {
            return Err(GridError::InvalidStep { step: self.step });
        }
        if !self.start.is_finite() || !self.stop.is_finite() || self.start > self.stop {
            return Err(GridError::InvalidBounds {
                start: self.start,
                stop: self.stop,
            });
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        // Slack absorbs rounding when stop sits on the lattice.
        ((self.stop - self.start) / self.step + LATTICE_SLACK).floor() as usize + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Points computed by multiplication so accumulated rounding never drifts.
    pub fn points(&self) -> Vec<f64> {
        (0..self.len())
            .map(|index| self.start + index as f64 * self.step)
            .collect()
    }
}
