//! Deterministic simulation module
//!
//! All physics lives here. This module must be pure and deterministic:
//! - Fixed timestep only, sub-stepped by the caller
//! - Stable iteration order (by bullet ID)
//! - No rendering or platform dependencies

pub mod forces;
pub mod frame;
pub mod integrator;
pub mod state;
pub mod tick;

pub use forces::{centrifugal, coriolis, jacobi_energy, pseudo_acceleration};
pub use frame::{
    ReferenceFrame, advance_orientation, frame_rotation_rate, frequency_from_omega,
    omega_from_frequency, position_to_lab, position_to_rotating, velocity_to_lab,
    velocity_to_rotating, wrap_degrees,
};
pub use integrator::{IntegratorError, ParticleState, step, try_step};
pub use state::{Bullet, Readout, SimEvent, SimPhase, SimulationState};
pub use tick::{TickInput, tick};
