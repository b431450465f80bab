//! Simulation state and core types
//!
//! Everything the cannon loop needs lives in [`SimulationState`], owned by
//! the caller and passed to [`super::tick`] explicitly.

use glam::{DQuat, DVec3};
use serde::{Deserialize, Serialize};

use super::forces::{centrifugal, coriolis};
use super::frame::{ReferenceFrame, position_to_lab, velocity_to_lab};
use super::integrator::ParticleState;
use crate::consts::*;
use crate::settings::Settings;

/// Whether the loop advances
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimPhase {
    Running,
    Paused,
}

/// A bullet fired by the cannon, integrated in rotating-frame coordinates
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bullet {
    pub id: u32,
    pub particle: ParticleState,
    /// Cull radius measured from the rotation origin
    pub max_distance: f64,
}

impl Bullet {
    pub fn new(id: u32, position: DVec3, velocity: DVec3, omega: DVec3, max_distance: f64) -> Self {
        Self {
            id,
            particle: ParticleState::new(position, velocity, omega),
            max_distance,
        }
    }

    /// Advance by `substeps` integrator calls of `dt` each
    pub fn advance(&mut self, omega: DVec3, dt: f64, substeps: u32) {
        self.particle.step_n(omega, dt, substeps);
    }

    pub fn is_out_of_bounds(&self) -> bool {
        self.particle.distance() >= self.max_distance
    }
}

/// Notifications for the host, drained once per tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SimEvent {
    /// Cannon fired a new bullet
    Fired { id: u32 },
    /// Bullet crossed its cull radius and was removed
    OutOfBounds { id: u32, position: DVec3 },
    /// Current bullet passed the pause distance; the simulation is now paused
    ReachedPauseDistance {
        id: u32,
        position: DVec3,
        velocity: DVec3,
        omega: DVec3,
    },
}

/// Display snapshot of the current bullet in the selected frame.
///
/// Fictitious forces only exist in the rotating frame and read zero in the lab.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Readout {
    /// Cannon dial angle, degrees in [0, 360)
    pub angle: f64,
    pub omega: DVec3,
    pub position: DVec3,
    pub velocity: DVec3,
    pub centrifugal: DVec3,
    pub coriolis: DVec3,
}

/// Complete simulation state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationState {
    pub settings: Settings,
    pub phase: SimPhase,
    /// Rotating -> lab orientation of the cannon frame
    pub orientation: DQuat,
    /// Dial angle in degrees
    pub angle: f64,
    /// Live bullets (sorted by id for determinism)
    pub bullets: Vec<Bullet>,
    /// Most recently fired bullet still in flight
    pub current_bullet: Option<u32>,
    /// Traced path of the current bullet in the selected frame
    #[serde(skip)]
    pub path: Vec<DVec3>,
    /// Seconds since the last automatic shot
    pub auto_fire_clock: f64,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Current bullet already triggered the pause distance
    paused_on_current: bool,
    #[serde(skip)]
    events: Vec<SimEvent>,
    /// Next entity ID
    next_id: u32,
}

impl SimulationState {
    /// Create a state from `settings`; out-of-range rates are clamped with a warning
    pub fn new(mut settings: Settings) -> Self {
        settings.angular_velocity = clamp_angular_velocity(settings.angular_velocity).unwrap_or(0.0);
        settings.time_scale = clamp_time_scale(settings.time_scale).unwrap_or(1.0);
        Self {
            settings,
            phase: SimPhase::Running,
            orientation: DQuat::IDENTITY,
            angle: 0.0,
            bullets: Vec::new(),
            current_bullet: None,
            path: Vec::new(),
            auto_fire_clock: 0.0,
            time_ticks: 0,
            paused_on_current: false,
            events: Vec::new(),
            next_id: 1,
        }
    }

    /// Frame angular velocity from the settings
    #[inline]
    pub fn omega(&self) -> DVec3 {
        self.settings.omega()
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Fire a bullet from the muzzle along the barrel (+x in the rotating frame).
    ///
    /// Returns the new bullet's id, or `None` when paused or at the bullet limit.
    pub fn fire(&mut self) -> Option<u32> {
        if self.phase == SimPhase::Paused {
            return None;
        }
        if self.bullets.len() >= self.settings.max_bullets {
            log::debug!(
                "Fire refused: {} bullets in flight (limit {})",
                self.bullets.len(),
                self.settings.max_bullets
            );
            return None;
        }

        let id = self.next_entity_id();
        let position = DVec3::X * self.settings.muzzle_offset;
        let velocity = DVec3::X * self.settings.bullet_speed;
        self.bullets.push(Bullet::new(
            id,
            position,
            velocity,
            self.omega(),
            self.settings.max_bullet_distance,
        ));

        self.current_bullet = Some(id);
        self.paused_on_current = false;
        self.reset_path();
        self.events.push(SimEvent::Fired { id });
        log::debug!("Fired bullet {id} at speed {}", self.settings.bullet_speed);
        Some(id)
    }

    /// Set the rotation rate (rad/s about +y), clamped to the allowed range.
    ///
    /// Cached accelerations of bullets in flight are re-evaluated so the next
    /// step starts from the new force law. Returns the value applied.
    pub fn set_angular_velocity(&mut self, angular_velocity: f64) -> f64 {
        let Some(clamped) = clamp_angular_velocity(angular_velocity) else {
            return self.settings.angular_velocity;
        };

        if clamped != self.settings.angular_velocity {
            self.settings.angular_velocity = clamped;
            let omega = self.omega();
            for bullet in &mut self.bullets {
                bullet.particle.refresh_acceleration(omega);
            }
        }
        clamped
    }

    /// Set the playback speed, clamped to [0, 1]. Returns the value applied.
    pub fn set_time_scale(&mut self, time_scale: f64) -> f64 {
        if let Some(clamped) = clamp_time_scale(time_scale) {
            self.settings.time_scale = clamped;
        }
        self.settings.time_scale
    }

    /// Switch the reporting frame; the traced path restarts
    pub fn set_reference_frame(&mut self, frame: ReferenceFrame) {
        if self.settings.reference_frame != frame {
            self.settings.reference_frame = frame;
            self.reset_path();
        }
    }

    /// Toggle between running and paused
    pub fn toggle_pause(&mut self) {
        self.phase = match self.phase {
            SimPhase::Running => SimPhase::Paused,
            SimPhase::Paused => SimPhase::Running,
        };
    }

    pub fn is_paused(&self) -> bool {
        self.phase == SimPhase::Paused
    }

    /// The current bullet, if it is still in flight
    pub fn current(&self) -> Option<&Bullet> {
        let id = self.current_bullet?;
        self.bullets.iter().find(|b| b.id == id)
    }

    /// Snapshot of the current bullet in the selected reference frame
    pub fn readout(&self) -> Readout {
        let omega = self.omega();
        let mut readout = Readout {
            angle: self.angle,
            omega,
            ..Default::default()
        };

        if let Some(bullet) = self.current() {
            let p = &bullet.particle;
            match self.settings.reference_frame {
                ReferenceFrame::Lab => {
                    readout.position = position_to_lab(self.orientation, p.position);
                    readout.velocity = velocity_to_lab(self.orientation, omega, p.position, p.velocity);
                }
                ReferenceFrame::Rotating => {
                    readout.position = p.position;
                    readout.velocity = p.velocity;
                    readout.centrifugal = centrifugal(omega, p.position);
                    readout.coriolis = coriolis(omega, p.velocity);
                }
            }
        }

        readout
    }

    /// Take all events produced since the last drain
    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }

    pub(crate) fn push_event(&mut self, event: SimEvent) {
        self.events.push(event);
    }

    pub(crate) fn paused_on_current(&self) -> bool {
        self.paused_on_current
    }

    pub(crate) fn mark_paused_on_current(&mut self) {
        self.paused_on_current = true;
    }

    /// Clear the traced path
    pub fn reset_path(&mut self) {
        self.path.clear();
    }

    /// Append the current bullet's position to the path (oldest dropped past the cap)
    pub fn record_path(&mut self) {
        let point = match self.current() {
            Some(bullet) => match self.settings.reference_frame {
                ReferenceFrame::Lab => position_to_lab(self.orientation, bullet.particle.position),
                ReferenceFrame::Rotating => bullet.particle.position,
            },
            None => return,
        };

        self.path.push(point);
        if self.path.len() > MAX_PATH_POINTS {
            self.path.remove(0);
        }
    }

    /// Return the cannon to its initial pose with no bullets; settings are kept
    pub fn reset(&mut self) {
        self.phase = SimPhase::Running;
        self.orientation = DQuat::IDENTITY;
        self.angle = 0.0;
        self.bullets.clear();
        self.current_bullet = None;
        self.path.clear();
        self.auto_fire_clock = 0.0;
        self.paused_on_current = false;
        self.events.clear();
    }

    /// Ensure bullets are sorted by ID for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.bullets.sort_by_key(|b| b.id);
    }
}

/// Clamp to ±`MAX_ANGULAR_VELOCITY`; `None` for NaN or infinity
fn clamp_angular_velocity(angular_velocity: f64) -> Option<f64> {
    if !angular_velocity.is_finite() {
        log::warn!("Ignoring non-finite angular velocity {angular_velocity}");
        return None;
    }
    let clamped = angular_velocity.clamp(-MAX_ANGULAR_VELOCITY, MAX_ANGULAR_VELOCITY);
    if clamped != angular_velocity {
        log::warn!("Angular velocity {angular_velocity} clamped to {clamped}");
    }
    Some(clamped)
}

fn clamp_time_scale(time_scale: f64) -> Option<f64> {
    if !time_scale.is_finite() {
        log::warn!("Ignoring non-finite time scale {time_scale}");
        return None;
    }
    let clamped = time_scale.clamp(0.0, 1.0);
    if clamped != time_scale {
        log::warn!("Time scale {time_scale} clamped to {clamped}");
    }
    Some(clamped)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> Settings {
        Settings {
            angular_velocity: 1.0,
            bullet_speed: 2.0,
            max_bullets: 2,
            ..Default::default()
        }
    }

    #[test]
    fn test_fire_spawns_at_muzzle() {
        let mut state = SimulationState::new(settings());
        let id = state.fire().expect("should fire");

        let bullet = state.current().expect("current bullet");
        assert_eq!(bullet.id, id);
        assert_eq!(bullet.particle.position, DVec3::new(0.5, 0.0, 0.0));
        assert_eq!(bullet.particle.velocity, DVec3::new(2.0, 0.0, 0.0));
        assert_eq!(state.drain_events(), vec![SimEvent::Fired { id }]);
        assert!(state.drain_events().is_empty());
    }

    #[test]
    fn test_fire_respects_limit() {
        let mut state = SimulationState::new(settings());
        assert!(state.fire().is_some());
        assert!(state.fire().is_some());
        assert!(state.fire().is_none());
        assert_eq!(state.bullets.len(), 2);
        // Newest bullet is current
        assert_eq!(state.current_bullet, Some(2));
    }

    #[test]
    fn test_fire_ignored_while_paused() {
        let mut state = SimulationState::new(settings());
        state.toggle_pause();
        assert!(state.is_paused());
        assert!(state.fire().is_none());
        assert!(state.bullets.is_empty());
    }

    #[test]
    fn test_set_angular_velocity_clamps_and_refreshes() {
        let mut state = SimulationState::new(settings());
        state.fire();

        assert_eq!(state.set_angular_velocity(12.0), MAX_ANGULAR_VELOCITY);
        assert_eq!(state.settings.angular_velocity, MAX_ANGULAR_VELOCITY);

        let omega = state.omega();
        let p = state.bullets[0].particle;
        let expected = centrifugal(omega, p.position) + coriolis(omega, p.velocity);
        assert!((p.acceleration - expected).length() < 1e-12);

        // NaN leaves the rate alone
        assert_eq!(state.set_angular_velocity(f64::NAN), MAX_ANGULAR_VELOCITY);
    }

    #[test]
    fn test_new_clamps_rates() {
        let state = SimulationState::new(Settings {
            angular_velocity: 7.0,
            time_scale: 3.0,
            ..settings()
        });
        assert_eq!(state.settings.angular_velocity, MAX_ANGULAR_VELOCITY);
        assert_eq!(state.omega(), DVec3::new(0.0, MAX_ANGULAR_VELOCITY, 0.0));
        assert_eq!(state.settings.time_scale, 1.0);

        let state = SimulationState::new(Settings {
            angular_velocity: f64::NAN,
            time_scale: f64::INFINITY,
            ..settings()
        });
        assert_eq!(state.settings.angular_velocity, 0.0);
        assert_eq!(state.settings.time_scale, 1.0);
    }

    #[test]
    fn test_set_time_scale() {
        let mut state = SimulationState::new(settings());
        assert_eq!(state.set_time_scale(0.25), 0.25);
        assert_eq!(state.set_time_scale(-1.0), 0.0);
        assert_eq!(state.set_time_scale(f64::NAN), 0.0);
        assert_eq!(state.set_time_scale(2.0), 1.0);
    }

    #[test]
    fn test_readout_rotating_frame() {
        let mut state = SimulationState::new(settings());
        state.fire();
        let r = state.readout();

        assert_eq!(r.position, DVec3::new(0.5, 0.0, 0.0));
        assert_eq!(r.velocity, DVec3::new(2.0, 0.0, 0.0));
        // ω² r outward, 2 ω × v toward -z
        assert!((r.centrifugal - DVec3::new(0.5, 0.0, 0.0)).length() < 1e-12);
        assert!((r.coriolis - DVec3::new(0.0, 0.0, -4.0)).length() < 1e-12);
    }

    #[test]
    fn test_readout_lab_frame() {
        let mut state = SimulationState::new(Settings {
            reference_frame: ReferenceFrame::Lab,
            ..settings()
        });
        state.fire();
        let r = state.readout();

        assert_eq!(r.position, DVec3::new(0.5, 0.0, 0.0));
        // v - ω × x = (2, 0, 0) - (0, 0, -0.5)
        assert!((r.velocity - DVec3::new(2.0, 0.0, 0.5)).length() < 1e-12);
        assert_eq!(r.centrifugal, DVec3::ZERO);
        assert_eq!(r.coriolis, DVec3::ZERO);
    }

    #[test]
    fn test_readout_without_bullet() {
        let state = SimulationState::new(settings());
        let r = state.readout();
        assert_eq!(r.omega, DVec3::Y);
        assert_eq!(r.position, DVec3::ZERO);
    }

    #[test]
    fn test_path_is_bounded() {
        let mut state = SimulationState::new(settings());
        state.fire();
        for _ in 0..MAX_PATH_POINTS + 10 {
            state.record_path();
        }
        assert_eq!(state.path.len(), MAX_PATH_POINTS);
    }

    #[test]
    fn test_reference_frame_switch_resets_path() {
        let mut state = SimulationState::new(settings());
        state.fire();
        state.record_path();
        state.set_reference_frame(ReferenceFrame::Rotating);
        assert_eq!(state.path.len(), 1);
        state.set_reference_frame(ReferenceFrame::Lab);
        assert!(state.path.is_empty());
    }

    #[test]
    fn test_reset() {
        let mut state = SimulationState::new(settings());
        state.fire();
        state.angle = 90.0;
        state.reset();
        assert!(state.bullets.is_empty());
        assert_eq!(state.current_bullet, None);
        assert_eq!(state.angle, 0.0);
        assert!(state.drain_events().is_empty());
        // Ids keep increasing across resets
        assert_eq!(state.fire(), Some(2));
    }
}
