//! Error type for fluid configuration and spawn requests.
//!
//! The solver itself has no recoverable failures; everything here is raised
//! when a simulation is built or when new particles are handed to it.

use std::fmt;

/// Errors produced while configuring a simulation or ingesting particles.
#[derive(Clone, Debug, PartialEq)]
pub enum FluidError {
    /// A scalar parameter is non-finite or outside its valid range.
    InvalidParameter {
        name: &'static str,
        value: f64,
    },
    /// The simulation domain has a non-finite or non-positive extent.
    InvalidDomain {
        width: f64,
        height: f64,
    },
    /// A spawn rectangle is non-finite or has a negative size.
    InvalidRegion {
        left: f64,
        bottom: f64,
        width: f64,
        height: f64,
    },
    /// A spawn rectangle would create more particles than one batch allows.
    TooManyParticles {
        count_x: f64,
        count_y: f64,
        limit: usize,
    },
    /// A single spawn was requested at a non-finite position.
    NonFinitePosition {
        x: f64,
        y: f64,
    },
    /// A single spawn was requested with a non-finite velocity.
    NonFiniteVelocity {
        x: f64,
        y: f64,
    },
}

impl fmt::Display for FluidError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FluidError::InvalidParameter { name, value } => {
                write!(f, "invalid parameter `{name}`: {value}")
            }
            FluidError::InvalidDomain { width, height } => {
                write!(f, "invalid domain size {width} x {height}")
            }
            FluidError::InvalidRegion {
                left,
                bottom,
                width,
                height,
            } => write!(
                f,
                "invalid spawn region at ({left}, {bottom}) with size {width} x {height}"
            ),
            FluidError::TooManyParticles {
                count_x,
                count_y,
                limit,
            } => write!(
                f,
                "spawn region needs {count_x} x {count_y} particles, at most {limit} per batch"
            ),
            FluidError::NonFinitePosition { x, y } => {
                write!(f, "non-finite spawn position ({x}, {y})")
            }
            FluidError::NonFiniteVelocity { x, y } => {
                write!(f, "non-finite spawn velocity ({x}, {y})")
            }
        }
    }
}

impl std::error::Error for FluidError {}

/// Checks that `value` is finite and strictly positive.
pub(crate) fn ensure_positive(name: &'static str, value: f64) -> Result<f64, FluidError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(FluidError::InvalidParameter { name, value })
    }
}

/// Checks that `value` is finite and not negative.
pub(crate) fn ensure_non_negative(name: &'static str, value: f64) -> Result<f64, FluidError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(FluidError::InvalidParameter { name, value })
    }
}
