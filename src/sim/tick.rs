//! Fixed timestep simulation tick
//!
//! Core loop that advances the cannon frame and its bullets deterministically.

use super::frame::{ReferenceFrame, advance_orientation, wrap_degrees};
use super::state::{SimEvent, SimPhase, SimulationState};

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Fire the cannon
    pub fire: bool,
    /// Pause toggle
    pub pause: bool,
    /// New rotation rate (rad/s about +y)
    pub angular_velocity: Option<f64>,
    /// Switch reporting frame
    pub reference_frame: Option<ReferenceFrame>,
    /// New playback speed in [0, 1]
    pub time_scale: Option<f64>,
}

/// Advance the simulation by one fixed timestep.
///
/// `dt` is wall time; simulated time advances by `dt * time_scale`.
pub fn tick(state: &mut SimulationState, input: &TickInput, dt: f64) {
    if input.pause {
        state.toggle_pause();
    }

    // Controls apply while paused and take effect on resume
    if let Some(angular_velocity) = input.angular_velocity {
        state.set_angular_velocity(angular_velocity);
    }
    if let Some(frame) = input.reference_frame {
        state.set_reference_frame(frame);
    }
    if let Some(time_scale) = input.time_scale {
        state.set_time_scale(time_scale);
    }

    if state.phase == SimPhase::Paused {
        return;
    }

    let dt = dt * state.settings.time_scale;

    // Every bullet this tick sees the same rotation
    let omega = state.omega();

    if input.fire {
        state.fire();
    }
    if state.settings.auto_fire && state.settings.fire_frequency > 0.0 {
        let period = 1.0 / state.settings.fire_frequency;
        state.auto_fire_clock += dt;
        if state.auto_fire_clock > period {
            state.fire();
            // Carry the remainder so the rate does not round to whole ticks
            state.auto_fire_clock %= period;
        }
    }

    state.time_ticks += 1;

    // Turn the cannon frame
    state.orientation = advance_orientation(state.orientation, omega, dt);
    state.angle = wrap_degrees(state.angle + omega.y.to_degrees() * dt);

    // Integrate bullets with fixed substeps
    let substeps = state.settings.substeps.max(1);
    let sub_dt = dt / substeps as f64;
    for bullet in &mut state.bullets {
        bullet.advance(omega, sub_dt, substeps);
    }

    cull_out_of_bounds(state);
    check_pause_distance(state);
    state.record_path();
}

/// Remove bullets past their cull radius
fn cull_out_of_bounds(state: &mut SimulationState) {
    let mut culled = Vec::new();
    state.bullets.retain(|bullet| {
        if bullet.is_out_of_bounds() {
            culled.push((bullet.id, bullet.particle.position));
            false
        } else {
            true
        }
    });

    for (id, position) in culled {
        log::debug!("Bullet {id} out of bounds at distance {:.3}", position.length());
        if state.current_bullet == Some(id) {
            state.current_bullet = None;
        }
        state.push_event(SimEvent::OutOfBounds { id, position });
    }

    if state.bullets.is_empty() {
        state.current_bullet = None;
        state.reset_path();
    }
}

/// Pause once when the current bullet first passes the pause distance
fn check_pause_distance(state: &mut SimulationState) {
    let Some(pause_distance) = state.settings.pause_distance else {
        return;
    };
    if state.paused_on_current() {
        return;
    }
    let Some(bullet) = state.current() else {
        return;
    };
    if bullet.particle.distance() <= pause_distance {
        return;
    }

    let event = SimEvent::ReachedPauseDistance {
        id: bullet.id,
        position: bullet.particle.position,
        velocity: bullet.particle.velocity,
        omega: state.omega(),
    };
    log::debug!("Bullet {} reached pause distance {pause_distance}", bullet.id);

    state.mark_paused_on_current();
    state.phase = SimPhase::Paused;
    state.push_event(event);
}
