//! Lab and rotating reference frames
//!
//! Convention: vectors use the standard right-handed cross product, and the
//! integrator's force law `-ω × (ω × x) + 2 (ω × v)` then describes a frame
//! that turns with angular velocity `-ω` relative to the lab. A positive
//! `ω.y` therefore turns the frame clockwise seen from above, like the
//! cannon dial. [`frame_rotation_rate`] is the only place that sign appears.

use std::f64::consts::TAU;

use glam::{DQuat, DVec3};
use serde::{Deserialize, Serialize};

/// Frame in which positions and velocities are reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ReferenceFrame {
    /// Inertial frame of the room the cannon stands in
    Lab,
    /// Frame co-rotating with the cannon
    #[default]
    Rotating,
}

impl ReferenceFrame {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReferenceFrame::Lab => "Lab",
            ReferenceFrame::Rotating => "Rotating",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "lab" | "inertial" => Some(ReferenceFrame::Lab),
            "rotating" | "cannon" | "gun" => Some(ReferenceFrame::Rotating),
            _ => None,
        }
    }

    /// The other frame
    pub fn toggled(&self) -> Self {
        match self {
            ReferenceFrame::Lab => ReferenceFrame::Rotating,
            ReferenceFrame::Rotating => ReferenceFrame::Lab,
        }
    }
}

/// Angular velocity of the rotating frame relative to the lab
#[inline]
pub fn frame_rotation_rate(omega: DVec3) -> DVec3 {
    -omega
}

/// Advance the frame's orientation (rotating -> lab) by one timestep.
///
/// `omega` is expressed in rotating-frame coordinates, so the increment is
/// applied on the body side.
pub fn advance_orientation(orientation: DQuat, omega: DVec3, dt: f64) -> DQuat {
    let delta = DQuat::from_scaled_axis(frame_rotation_rate(omega) * dt);
    (orientation * delta).normalize()
}

/// Rotating-frame position to lab coordinates
#[inline]
pub fn position_to_lab(orientation: DQuat, position: DVec3) -> DVec3 {
    orientation * position
}

/// Lab position to rotating-frame coordinates
#[inline]
pub fn position_to_rotating(orientation: DQuat, lab_position: DVec3) -> DVec3 {
    orientation.inverse() * lab_position
}

/// Rotating-frame velocity to lab velocity: `R (v - ω × x)`
pub fn velocity_to_lab(
    orientation: DQuat,
    omega: DVec3,
    position: DVec3,
    velocity: DVec3,
) -> DVec3 {
    orientation * (velocity + frame_rotation_rate(omega).cross(position))
}

/// Lab velocity to rotating-frame velocity, inverse of [`velocity_to_lab`]
pub fn velocity_to_rotating(
    orientation: DQuat,
    omega: DVec3,
    lab_position: DVec3,
    lab_velocity: DVec3,
) -> DVec3 {
    let position = position_to_rotating(orientation, lab_position);
    orientation.inverse() * lab_velocity - frame_rotation_rate(omega).cross(position)
}

/// Angular velocity about +y for a rotation frequency in turns per second
#[inline]
pub fn omega_from_frequency(rotations_per_second: f64) -> DVec3 {
    DVec3::Y * (rotations_per_second * TAU)
}

/// Turns per second about +y
#[inline]
pub fn frequency_from_omega(omega: DVec3) -> f64 {
    omega.y / TAU
}

/// Wrap an angle in degrees to [0, 360)
#[inline]
pub fn wrap_degrees(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}
