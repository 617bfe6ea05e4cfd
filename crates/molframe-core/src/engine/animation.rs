//! Eased camera transitions.
//!
//! An [`Animator`] owns at most one running transition. Starting a new one replaces the
//! old and hands out a fresh [`AnimationTicket`]; ticks carrying an older ticket are
//! reported as superseded and never touch the camera, so only one interpolation loop can
//! drive it at a time.

use super::camera::CameraState;
use super::config::{AnimationConfig, RotationInterpolation};
use crate::core::geometry::rotation::{geodesic_angle, orthonormalize};
use nalgebra::{Matrix3, Point3, Rotation3, UnitQuaternion};
use std::time::Duration;

const SLERP_EPSILON: f64 = 1e-9;

/// Cubic ease-in/ease-out on `[0, 1]`.
pub fn ease_in_out_cubic(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

fn lerp_gram_schmidt(start: &Matrix3<f64>, target: &Matrix3<f64>, t: f64) -> Matrix3<f64> {
    orthonormalize(&(start * (1.0 - t) + target * t))
}

pub fn interpolate_rotation(
    start: &Matrix3<f64>,
    target: &Matrix3<f64>,
    t: f64,
    mode: RotationInterpolation,
) -> Matrix3<f64> {
    match mode {
        RotationInterpolation::LinearGramSchmidt => lerp_gram_schmidt(start, target, t),
        RotationInterpolation::Slerp => {
            let q0 = UnitQuaternion::from_rotation_matrix(&Rotation3::from_matrix_unchecked(*start));
            let q1 =
                UnitQuaternion::from_rotation_matrix(&Rotation3::from_matrix_unchecked(*target));
            match q0.try_slerp(&q1, t, SLERP_EPSILON) {
                Some(q) => q.to_rotation_matrix().into_inner(),
                // Antipodal quaternions have no unique slerp path.
                None => lerp_gram_schmidt(start, target, t),
            }
        }
    }
}

fn lerp_point(a: &Point3<f64>, b: &Point3<f64>, t: f64) -> Point3<f64> {
    Point3::from(a.coords.lerp(&b.coords, t))
}

/// Camera at eased progress `t` between `start` and `target`.
///
/// A framing field missing on the start side is taken from the target, so it appears
/// without sliding in.
pub fn interpolate_camera(
    start: &CameraState,
    target: &CameraState,
    t: f64,
    mode: RotationInterpolation,
) -> CameraState {
    let center = match (start.center, target.center) {
        (Some(a), Some(b)) => Some(lerp_point(&a, &b, t)),
        (_, b) => b,
    };
    let extent = match (start.extent, target.extent) {
        (Some(a), Some(b)) => Some(a + (b - a) * t),
        (_, b) => b,
    };
    CameraState {
        rotation: interpolate_rotation(&start.rotation, &target.rotation, t, mode),
        zoom: start.zoom + (target.zoom - start.zoom) * t,
        center,
        extent,
    }
}

/// Duration proportional to the rotation angle, clamped to the configured bounds.
pub fn animation_duration(angle: f64, config: &AnimationConfig) -> Duration {
    let millis = angle.abs() * config.ms_per_radian;
    let scaled = Duration::try_from_secs_f64(millis / 1000.0).unwrap_or(config.max_duration);
    scaled.max(config.min_duration).min(config.max_duration)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnimationTicket(u64);

#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub ticket: AnimationTicket,
    pub start: CameraState,
    pub target: CameraState,
    pub duration: Duration,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum AnimationState {
    #[default]
    Idle,
    Running(Transition),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// Camera moved to eased progress `progress` (in `[0, 1)`).
    Progressed { progress: f64 },
    /// Camera snapped to the target; the animator is idle again.
    Finished,
    /// The ticket belongs to a replaced or finished animation; the camera was not touched.
    Superseded,
}

#[derive(Debug, Clone)]
pub struct Animator {
    config: AnimationConfig,
    state: AnimationState,
    next_ticket: u64,
}

impl Animator {
    pub fn new(config: AnimationConfig) -> Self {
        Self {
            config,
            state: AnimationState::Idle,
            next_ticket: 0,
        }
    }

    pub fn config(&self) -> &AnimationConfig {
        &self.config
    }

    pub fn state(&self) -> &AnimationState {
        &self.state
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, AnimationState::Running(_))
    }

    /// Starts a transition from `from` to `target`, replacing any running one.
    pub fn start(&mut self, from: &CameraState, target: CameraState) -> (AnimationTicket, Duration) {
        let angle = geodesic_angle(&from.rotation, &target.rotation);
        let duration = animation_duration(angle, &self.config);
        self.next_ticket += 1;
        let ticket = AnimationTicket(self.next_ticket);
        self.state = AnimationState::Running(Transition {
            ticket,
            start: from.clone(),
            target,
            duration,
        });
        (ticket, duration)
    }

    /// Advances the transition owned by `ticket` to `elapsed` since its start.
    pub fn tick(
        &mut self,
        ticket: AnimationTicket,
        elapsed: Duration,
        camera: &mut CameraState,
    ) -> TickOutcome {
        let transition = match &self.state {
            AnimationState::Running(transition) if transition.ticket == ticket => transition,
            _ => return TickOutcome::Superseded,
        };

        if elapsed >= transition.duration {
            *camera = transition.target.clone();
            self.state = AnimationState::Idle;
            return TickOutcome::Finished;
        }

        let linear = elapsed.as_secs_f64() / transition.duration.as_secs_f64();
        let progress = ease_in_out_cubic(linear);
        *camera = interpolate_camera(
            &transition.start,
            &transition.target,
            progress,
            self.config.interpolation,
        );
        TickOutcome::Progressed { progress }
    }

    pub fn cancel(&mut self) {
        self.state = AnimationState::Idle;
    }
}
