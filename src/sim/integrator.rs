//! Leapfrog integrator for a unit point mass in a rotating frame
//!
//! One call advances the state by exactly one `dt`:
//!
//! ```text
//! x' = x + dt (v + ½ dt a0)
//! a1 = a(x', v)              new position, old velocity
//! v' = v + ½ dt (a0 + a1)
//! ```
//!
//! `a0` is the acceleration cached by the previous call, and `a1` is cached
//! for the next one. Evaluating `a1` with the old velocity is the contract,
//! not textbook velocity Verlet: energy drift is first order in `dt` and
//! reversing the step restores the position but not quite the velocity.

use glam::DVec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::forces::pseudo_acceleration;

/// Rejected inputs for [`try_step`]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IntegratorError {
    /// Timestep is zero or negative
    #[error("time step must be positive, got {0}")]
    NonPositiveTimeStep(f64),

    /// Timestep is NaN or infinite
    #[error("time step must be finite, got {0}")]
    NonFiniteTimeStep(f64),

    /// A state vector holds NaN or infinity
    #[error("particle {field} is not finite")]
    NonFiniteState {
        /// Offending field name
        field: &'static str,
    },

    /// Angular velocity holds NaN or infinity
    #[error("angular velocity is not finite")]
    NonFiniteOmega,
}

/// Kinematic state of one projectile, unit mass
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParticleState {
    pub position: DVec3,
    pub velocity: DVec3,
    /// Trailing acceleration of the last step, reused as the next `a0`
    pub acceleration: DVec3,
}

impl ParticleState {
    /// Create a state with its acceleration evaluated for `omega`
    pub fn new(position: DVec3, velocity: DVec3, omega: DVec3) -> Self {
        Self {
            position,
            velocity,
            acceleration: pseudo_acceleration(omega, position, velocity),
        }
    }

    /// Re-evaluate the cached acceleration (after `omega` changed between steps)
    pub fn refresh_acceleration(&mut self, omega: DVec3) {
        self.acceleration = pseudo_acceleration(omega, self.position, self.velocity);
    }

    /// Advance in place by one `dt`
    pub fn step(&mut self, omega: DVec3, dt: f64) {
        *self = step(self, omega, dt);
    }

    /// Advance in place by `n` steps of `dt`
    pub fn step_n(&mut self, omega: DVec3, dt: f64, n: u32) {
        for _ in 0..n {
            self.step(omega, dt);
        }
    }

    /// Distance from the rotation origin
    #[inline]
    pub fn distance(&self) -> f64 {
        self.position.length()
    }
}

/// Advance `state` by one `dt` under the centrifugal and Coriolis pseudo-forces.
///
/// No validation: `dt` may be negative, and non-finite inputs propagate.
/// Use [`try_step`] to fail fast instead.
pub fn step(state: &ParticleState, omega: DVec3, dt: f64) -> ParticleState {
    let x = state.position;
    let v = state.velocity;
    let a0 = state.acceleration;

    let position = x + dt * (v + 0.5 * dt * a0);
    let a1 = pseudo_acceleration(omega, position, v);
    let velocity = v + 0.5 * dt * (a0 + a1);

    ParticleState {
        position,
        velocity,
        acceleration: a1,
    }
}

/// [`step`] with precondition checks on `dt`, `omega` and the state
pub fn try_step(
    state: &ParticleState,
    omega: DVec3,
    dt: f64,
) -> Result<ParticleState, IntegratorError> {
    if !dt.is_finite() {
        return Err(IntegratorError::NonFiniteTimeStep(dt));
    }
    if dt <= 0.0 {
        return Err(IntegratorError::NonPositiveTimeStep(dt));
    }
    if !omega.is_finite() {
        return Err(IntegratorError::NonFiniteOmega);
    }
    if !state.position.is_finite() {
        return Err(IntegratorError::NonFiniteState { field: "position" });
    }
    if !state.velocity.is_finite() {
        return Err(IntegratorError::NonFiniteState { field: "velocity" });
    }
    if !state.acceleration.is_finite() {
        return Err(IntegratorError::NonFiniteState {
            field: "acceleration",
        });
    }
    Ok(step(state, omega, dt))
}
