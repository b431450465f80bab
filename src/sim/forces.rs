//! Fictitious forces in a uniformly rotating frame
//!
//! All quantities are per unit mass. `omega` is the frame's angular velocity
//! under the convention documented in [`super::frame`].

use glam::DVec3;

/// Centrifugal acceleration `-ω × (ω × x)`, pointing away from the rotation axis
#[inline]
pub fn centrifugal(omega: DVec3, position: DVec3) -> DVec3 {
    -omega.cross(omega.cross(position))
}

/// Coriolis acceleration `2 (ω × v)`
#[inline]
pub fn coriolis(omega: DVec3, velocity: DVec3) -> DVec3 {
    2.0 * omega.cross(velocity)
}

/// Total pseudo-acceleration on a unit mass
#[inline]
pub fn pseudo_acceleration(omega: DVec3, position: DVec3, velocity: DVec3) -> DVec3 {
    centrifugal(omega, position) + coriolis(omega, velocity)
}

/// Jacobi energy `½|v|² - ½|ω × x|²`.
///
/// Constant along exact trajectories: the Coriolis term is perpendicular to
/// `v` and the centrifugal term derives from the potential `-½|ω × x|²`.
pub fn jacobi_energy(omega: DVec3, position: DVec3, velocity: DVec3) -> f64 {
    0.5 * velocity.length_squared() - 0.5 * omega.cross(position).length_squared()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centrifugal_points_outward() {
        let omega = DVec3::Y;
        let a = centrifugal(omega, DVec3::new(2.0, 0.0, 0.0));
        assert!((a - DVec3::new(2.0, 0.0, 0.0)).length() < 1e-12);
    }

    #[test]
    fn test_centrifugal_ignores_axial_component() {
        // Only the distance from the axis matters
        let omega = DVec3::new(0.0, 3.0, 0.0);
        let on_axis = centrifugal(omega, DVec3::new(0.0, 7.0, 0.0));
        assert_eq!(on_axis, DVec3::ZERO);

        let off_axis = centrifugal(omega, DVec3::new(1.0, 7.0, 0.0));
        assert!((off_axis - DVec3::new(9.0, 0.0, 0.0)).length() < 1e-12);
    }

    #[test]
    fn test_coriolis_right_handed() {
        // ŷ × x̂ = -ẑ
        let a = coriolis(DVec3::Y, DVec3::X);
        assert!((a - DVec3::new(0.0, 0.0, -2.0)).length() < 1e-12);
    }

    #[test]
    fn test_coriolis_does_no_work() {
        let omega = DVec3::new(0.3, -1.2, 0.7);
        let v = DVec3::new(4.0, 1.0, -2.5);
        assert!(coriolis(omega, v).dot(v).abs() < 1e-12);
    }

    #[test]
    fn test_zero_vectors() {
        assert_eq!(pseudo_acceleration(DVec3::ZERO, DVec3::ONE, DVec3::ONE), DVec3::ZERO);
        assert_eq!(pseudo_acceleration(DVec3::Y, DVec3::ZERO, DVec3::ZERO), DVec3::ZERO);
    }

    #[test]
    fn test_jacobi_energy() {
        let omega = DVec3::Y;
        // At rest one unit from the axis
        let e = jacobi_energy(omega, DVec3::X, DVec3::ZERO);
        assert!((e - (-0.5)).abs() < 1e-12);

        let e = jacobi_energy(omega, DVec3::ZERO, DVec3::new(0.0, 2.0, 0.0));
        assert!((e - 2.0).abs() < 1e-12);
    }
}
