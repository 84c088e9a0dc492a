//! Procedural motion used by the scene update step.
//!
//! Everything time-based takes elapsed seconds, so recomputing with the same
//! time gives the same answer and motion speed does not depend on frame rate.
//! `RotationAccumulator` is the exception: it advances a fixed amount per tick.

use std::f32::consts::TAU;

use glam::Vec2;

use crate::core::FrameInfo;

/// Vertical bounce offset `sin(t * k) * amplitude`
pub fn bounce(t: f32, k: f32, amplitude: f32) -> f32 {
    (t * k).sin() * amplitude
}

/// Point on an axis-aligned ellipse in the XZ plane
pub fn orbit(angle: f32, radius_x: f32, radius_z: f32) -> Vec2 {
    Vec2::new(angle.cos() * radius_x, angle.sin() * radius_z)
}

/// Traveling wave `sin(t * speed + phase) * amplitude`
pub fn wave(t: f32, speed: f32, phase: f32, amplitude: f32) -> f32 {
    (t * speed + phase).sin() * amplitude
}

/// Angle advanced by a fixed increment per tick, kept in `[0, 2π)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationAccumulator {
    angle: f32,
    increment: f32,
}

impl RotationAccumulator {
    pub fn new(increment: f32) -> Self {
        Self { angle: 0.0, increment }
    }

    pub fn starting_at(angle: f32, increment: f32) -> Self {
        Self {
            angle: angle.rem_euclid(TAU),
            increment,
        }
    }

    pub fn advance(&mut self) -> f32 {
        self.angle = (self.angle + self.increment).rem_euclid(TAU);
        self.angle
    }

    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn increment(&self) -> f32 {
        self.increment
    }
}

/// Lifecycle of the animation loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoopState {
    #[default]
    Stopped,
    Running,
    /// Terminal
    Disposed,
}

/// Per-tick timing seen by scene updates
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AnimationState {
    /// Seconds since the loop first started
    pub elapsed: f32,
    pub delta: f32,
    pub ticks: u64,
}

impl AnimationState {
    pub fn advance(&mut self, frame: &FrameInfo) {
        self.elapsed = frame.time;
        self.delta = frame.delta;
        self.ticks += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn bounce_is_pure() {
        assert_eq!(bounce(3.7, 2.0, 2.0), bounce(3.7, 2.0, 2.0));
        assert_relative_eq!(bounce(0.0, 2.0, 2.0), 0.0);
    }

    #[test]
    fn orbit_traces_ellipse() {
        let p = orbit(0.0, 2.5, 2.0);
        assert_relative_eq!(p.x, 2.5);
        assert_relative_eq!(p.y, 0.0);
        let q = orbit(std::f32::consts::FRAC_PI_2, 2.5, 2.0);
        assert_relative_eq!(q.y, 2.0);
    }

    #[test]
    fn accumulator_wraps() {
        let mut acc = RotationAccumulator::starting_at(TAU - 0.01, 0.02);
        let angle = acc.advance();
        assert_relative_eq!(angle, 0.01, epsilon = 1e-5);
    }

    #[test]
    fn animation_state_tracks_frames() {
        let mut state = AnimationState::default();
        state.advance(&FrameInfo::new(0, 0.5, 0.5));
        state.advance(&FrameInfo::new(1, 0.75, 0.25));
        assert_eq!(state.ticks, 2);
        assert_eq!(state.elapsed, 0.75);
    }
}
