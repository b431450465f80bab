//! Coriolis Lab - projectile motion in a rotating reference frame
//!
//! Core modules:
//! - `sim`: Deterministic simulation (integrator, pseudo-forces, frames, cannon loop)
//! - `settings`: Data-driven simulation parameters

pub mod settings;
pub mod sim;

pub use settings::{Settings, SettingsError};
pub use sim::{IntegratorError, ParticleState, step, try_step};

/// Simulation configuration constants
pub mod consts {
    /// Fixed simulation timestep (50 Hz, the host's fixed update rate)
    pub const SIM_DT: f64 = 1.0 / 50.0;
    /// Default integrator calls per tick
    pub const DEFAULT_SUBSTEPS: u32 = 10;

    /// Angular velocity range (rad/s)
    pub const MAX_ANGULAR_VELOCITY: f64 = 5.0;
    /// Muzzle speed range (units/s)
    pub const MAX_BULLET_SPEED: f64 = 30.0;

    /// Maximum points kept in the traced bullet path
    pub const MAX_PATH_POINTS: usize = 4096;
}
