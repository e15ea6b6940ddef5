//! Poly6 smoothing kernel in two dimensions.
//!
//! W(r, h) = (4 / πh⁸) * (h² - r²)³ for r < h
//!
//! The same gradient is used for the pressure term and for the viscosity
//! term of the force pass.

use std::f64::consts::PI;

use super::vector::Vector2;

/// Poly6 kernel with its normalisation precomputed for a support radius.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Poly6Kernel {
    h: f64,
    h_sq: f64,
    alpha: f64,
}

impl Poly6Kernel {
    /// Creates the kernel for support radius `h`. `h` must be positive;
    /// callers validate it through the environment.
    pub fn new(h: f64) -> Self {
        Self {
            h,
            h_sq: h * h,
            alpha: 4.0 / (PI * h.powi(8)),
        }
    }

    /// Support radius.
    #[inline]
    pub fn support_radius(&self) -> f64 {
        self.h
    }

    /// Normalisation constant `4 / (π·h⁸)`.
    #[inline]
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Kernel value at distance `r`.
    #[inline]
    pub fn value(&self, r: f64) -> f64 {
        if r < self.h {
            let diff = self.h_sq - r * r;
            self.alpha * diff * diff * diff
        } else {
            0.0
        }
    }

    /// Kernel gradient for the separation vector `rv`.
    /// ∇W = -6α(h² - r²)² · rv
    #[inline]
    pub fn gradient(&self, rv: Vector2) -> Vector2 {
        let r = rv.length();
        if r < self.h {
            let diff = self.h_sq - r * r;
            rv * (-6.0 * self.alpha * diff * diff)
        } else {
            Vector2::ZERO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poly6_zero_outside_support() {
        let kernel = Poly6Kernel::new(0.015);

        for &r in &[0.015, 0.016, 0.1, 10.0] {
            assert_eq!(kernel.value(r), 0.0);
            assert_eq!(kernel.gradient(Vector2::new(r, 0.0)), Vector2::ZERO);
            assert_eq!(kernel.gradient(Vector2::new(0.0, -r)), Vector2::ZERO);
        }
    }

    #[test]
    fn test_poly6_at_origin() {
        let h = 0.015;
        let kernel = Poly6Kernel::new(h);
        let alpha = 4.0 / (PI * h.powi(8));

        let expected = alpha * h.powi(6);
        assert!((kernel.value(0.0) - expected).abs() <= expected * 1e-12);
        assert_eq!(kernel.alpha(), alpha);
    }

    #[test]
    fn test_poly6_decreasing() {
        let kernel = Poly6Kernel::new(1.0);

        let w_0 = kernel.value(0.0);
        let w_half = kernel.value(0.5);
        let w_near = kernel.value(0.99);
        assert!(w_0 > w_half);
        assert!(w_half > w_near);
        assert!(w_near > 0.0);
    }

    #[test]
    fn test_gradient_points_back_along_separation() {
        let kernel = Poly6Kernel::new(1.0);

        // Separation from neighbour to target along +x: gradient along -x
        let grad = kernel.gradient(Vector2::new(0.5, 0.0));
        assert!(grad.x < 0.0);
        assert_eq!(grad.y, 0.0);

        // Zero separation gives a zero gradient rather than NaN
        assert_eq!(kernel.gradient(Vector2::ZERO), Vector2::ZERO);
    }

    #[test]
    fn test_gradient_closed_form() {
        let h = 2.0;
        let kernel = Poly6Kernel::new(h);
        let rv = Vector2::new(0.6, 0.8);

        let c = -6.0 * kernel.alpha() * (h * h - 1.0).powi(2);
        let grad = kernel.gradient(rv);
        assert!((grad - rv * c).length() < 1e-12);
    }
}
