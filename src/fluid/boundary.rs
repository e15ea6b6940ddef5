//! Domain edges and spawn rectangles.
//!
//! The domain is the axis-aligned box `[0, width] x [0, height]`. What happens
//! to a particle leaving it is decided by the [`BoundaryPolicy`]:
//! - `Open`: the particle is deactivated and never simulated again
//! - `Periodic`: the particle re-enters on the opposite edge
//!
//! Solid walls are not a policy. They are built from kinematic particles,
//! see [`crate::fluid::simulation::FluidSimulation::spawn_tank`].

use bevy::prelude::*;

use super::error::FluidError;
use super::vector::{wrap_position, Vector2};

/// What happens to particles that leave the domain.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Reflect)]
pub enum BoundaryPolicy {
    /// Deactivate particles outside `[0, width] x [0, height]`.
    #[default]
    Open,
    /// Wrap positions onto a torus and measure separations across the seam.
    Periodic,
}

/// Result of applying the boundary policy to one particle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BoundaryOutcome {
    /// Still inside the domain (possibly after wrapping).
    Inside(Vector2),
    /// Left the domain under the open policy.
    Escaped,
}

impl BoundaryPolicy {
    /// Maps a freshly integrated position through the policy.
    #[inline]
    pub fn apply(self, position: Vector2, domain: Vector2) -> BoundaryOutcome {
        match self {
            BoundaryPolicy::Periodic => BoundaryOutcome::Inside(wrap_position(position, domain)),
            BoundaryPolicy::Open => {
                if position.x < 0.0
                    || position.x > domain.x
                    || position.y < 0.0
                    || position.y > domain.y
                {
                    BoundaryOutcome::Escaped
                } else {
                    BoundaryOutcome::Inside(position)
                }
            }
        }
    }
}

/// Axis-aligned rectangle given by its lower-left corner and size.
#[derive(Clone, Copy, Debug, Default, PartialEq, Reflect)]
pub struct Rectangle {
    pub left: f64,
    pub bottom: f64,
    pub width: f64,
    pub height: f64,
}

impl Rectangle {
    pub fn new(left: f64, bottom: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            bottom,
            width,
            height,
        }
    }

    /// Square of side `size` centred on `center`.
    pub fn centered(center: Vector2, size: f64) -> Self {
        Self::new(center.x - size * 0.5, center.y - size * 0.5, size, size)
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn top(&self) -> f64 {
        self.bottom + self.height
    }

    /// Check if a point lies inside, edges included.
    pub fn contains(&self, point: Vector2) -> bool {
        point.x >= self.left && point.x <= self.right() && point.y >= self.bottom && point.y <= self.top()
    }

    /// Rejects non-finite coordinates and negative sizes.
    pub fn validate(&self) -> Result<(), FluidError> {
        let finite = self.left.is_finite()
            && self.bottom.is_finite()
            && self.width.is_finite()
            && self.height.is_finite();
        if finite && self.width >= 0.0 && self.height >= 0.0 {
            Ok(())
        } else {
            Err(FluidError::InvalidRegion {
                left: self.left,
                bottom: self.bottom,
                width: self.width,
                height: self.height,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOMAIN: Vector2 = Vector2::new(0.9, 0.9);

    #[test]
    fn test_open_keeps_inside_and_edges() {
        for &p in &[
            Vector2::new(0.45, 0.45),
            Vector2::new(0.0, 0.0),
            Vector2::new(0.9, 0.9),
        ] {
            assert_eq!(BoundaryPolicy::Open.apply(p, DOMAIN), BoundaryOutcome::Inside(p));
        }
    }

    #[test]
    fn test_open_escapes_on_every_side() {
        for &p in &[
            Vector2::new(-0.001, 0.5),
            Vector2::new(0.901, 0.5),
            Vector2::new(0.5, -0.001),
            Vector2::new(0.5, 0.901),
        ] {
            assert_eq!(BoundaryPolicy::Open.apply(p, DOMAIN), BoundaryOutcome::Escaped);
        }
    }

    #[test]
    fn test_periodic_wraps() {
        match BoundaryPolicy::Periodic.apply(Vector2::new(0.95, -0.05), DOMAIN) {
            BoundaryOutcome::Inside(p) => {
                assert!((p.x - 0.05).abs() < 1e-12);
                assert!((p.y - 0.85).abs() < 1e-12);
            }
            BoundaryOutcome::Escaped => panic!("periodic policy never deactivates"),
        }
    }

    #[test]
    fn test_rectangle_edges() {
        let rect = Rectangle::new(0.1, 0.2, 0.3, 0.4);
        assert!((rect.right() - 0.4).abs() < 1e-12);
        assert!((rect.top() - 0.6).abs() < 1e-12);
        assert!(rect.contains(Vector2::new(0.1, 0.2)));
        assert!(rect.contains(Vector2::new(0.25, 0.5)));
        assert!(!rect.contains(Vector2::new(0.05, 0.5)));

        let square = Rectangle::centered(Vector2::new(0.5, 0.5), 0.02);
        assert!((square.left - 0.49).abs() < 1e-12);
        assert!((square.width - 0.02).abs() < 1e-12);
    }

    #[test]
    fn test_rectangle_validate() {
        assert!(Rectangle::new(0.0, 0.0, 0.0, 0.0).validate().is_ok());
        assert!(Rectangle::new(0.0, 0.0, -0.1, 0.2).validate().is_err());
        assert!(Rectangle::new(f64::NAN, 0.0, 0.1, 0.2).validate().is_err());
        assert!(Rectangle::new(0.0, 0.0, 0.1, f64::INFINITY).validate().is_err());
    }
}
