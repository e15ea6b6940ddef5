//! Two-component vector helpers.
//!
//! The solver works in `f64` on [`DVec2`], which already covers `add`, `sub`,
//! `dot` and `magnitude` (`length`) as allocation-free value operations. This
//! module adds the torus arithmetic used by periodic domains.

use bevy::math::DVec2;

/// 2D vector of `f64` components used throughout the solver.
pub type Vector2 = DVec2;

/// Euclidean remainder: always in `[0, size)` for positive `size`.
#[inline]
pub fn euclid_mod(value: f64, size: f64) -> f64 {
    let r = value.rem_euclid(size);
    // Tiny negative inputs round up to exactly `size`
    if r >= size {
        0.0
    } else {
        r
    }
}

/// Signed minimum-image separation `a - b` on a torus of the given size.
///
/// Per axis: `((delta + size / 2) mod size) - size / 2`.
#[inline]
pub fn torus_separation(a: Vector2, b: Vector2, size: Vector2) -> Vector2 {
    let half = size * 0.5;
    let delta = a - b;
    Vector2::new(
        euclid_mod(delta.x + half.x, size.x) - half.x,
        euclid_mod(delta.y + half.y, size.y) - half.y,
    )
}

/// Per-axis absolute minimum-image distance between two points on a torus.
///
/// Same magnitude as [`torus_separation`], with the sign dropped.
#[inline]
pub fn distance_in_torus(a: Vector2, b: Vector2, size: Vector2) -> Vector2 {
    torus_separation(a, b, size).abs()
}

/// Wraps a position back into `[0, size.x) x [0, size.y)`.
#[inline]
pub fn wrap_position(position: Vector2, size: Vector2) -> Vector2 {
    Vector2::new(
        euclid_mod(position.x, size.x),
        euclid_mod(position.y, size.y),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    #[test]
    fn test_euclid_mod_negative() {
        assert!((euclid_mod(-0.1, 1.0) - 0.9).abs() < EPS);
        assert!((euclid_mod(1.25, 1.0) - 0.25).abs() < EPS);
        assert_eq!(euclid_mod(0.0, 1.0), 0.0);
        assert!(euclid_mod(-1e-18, 0.9) < 0.9);
    }

    #[test]
    fn test_torus_separation_crosses_seam() {
        let size = Vector2::new(1.0, 1.0);
        let a = Vector2::new(0.02, 0.5);
        let b = Vector2::new(0.98, 0.5);

        let sep = torus_separation(a, b, size);
        assert!((sep.x - 0.04).abs() < EPS);
        assert!(sep.y.abs() < EPS);

        // Reversed order flips the sign
        let back = torus_separation(b, a, size);
        assert!((back.x + 0.04).abs() < EPS);
    }

    #[test]
    fn test_torus_separation_matches_plain_inside() {
        let size = Vector2::new(1.0, 2.0);
        let a = Vector2::new(0.4, 1.1);
        let b = Vector2::new(0.3, 0.9);

        let sep = torus_separation(a, b, size);
        let plain = a - b;
        assert!((sep - plain).length() < EPS);
    }

    #[test]
    fn test_distance_in_torus_is_absolute() {
        let size = Vector2::new(1.0, 1.0);
        let a = Vector2::new(0.9, 0.1);
        let b = Vector2::new(0.1, 0.9);

        let d = distance_in_torus(a, b, size);
        assert!(d.x >= 0.0 && d.y >= 0.0);
        assert!((d.x - 0.2).abs() < EPS);
        assert!((d.y - 0.2).abs() < EPS);
        assert_eq!(d.length(), torus_separation(a, b, size).length());
    }

    #[test]
    fn test_wrap_position_idempotent_inside() {
        let size = Vector2::new(0.9, 0.9);
        for &p in &[
            Vector2::new(0.0, 0.0),
            Vector2::new(0.45, 0.3),
            Vector2::new(0.8999, 0.0001),
        ] {
            assert_eq!(wrap_position(p, size), p);
        }
    }

    #[test]
    fn test_wrap_position_outside() {
        let size = Vector2::new(1.0, 1.0);
        let wrapped = wrap_position(Vector2::new(-0.25, 1.5), size);
        assert!((wrapped.x - 0.75).abs() < EPS);
        assert!((wrapped.y - 0.5).abs() < EPS);
    }
}
