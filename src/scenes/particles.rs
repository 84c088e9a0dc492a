use std::f32::consts::{PI, TAU};

use anyhow::{Context, Result};
use glam::Vec3;

use super::{Scene, SceneContext, World};
use crate::animation::{wave, AnimationState, RotationAccumulator};
use crate::camera::PerspectiveCamera;
use crate::controls::{ControlPanel, ParamChange};
use crate::math::{Color, SeededRandom};
use crate::params::ParameterStore;
use crate::scene::{Light, Node, NodeId, PointCloud};

const POINT_SIZE: f32 = 0.009;

/// Rest positions of a point cloud plus the node that shows the animated copy
#[derive(Debug)]
struct Cloud {
    id: NodeId,
    rest: Vec<Vec3>,
}

/// A ringed planet made of particles. The planet's bands ripple sideways,
/// the ring ripples vertically, and the ring slowly turns.
#[derive(Debug)]
pub struct ParticlesScene {
    seed: u32,
    particle_count: usize,
    ring_count: usize,
    planet: Option<Cloud>,
    ring: Option<Cloud>,
    ring_spin: RotationAccumulator,
}

impl ParticlesScene {
    pub fn new(ctx: &SceneContext) -> Self {
        Self {
            seed: ctx.seed,
            particle_count: ctx.particle_count,
            ring_count: ctx.ring_count,
            planet: None,
            ring: None,
            ring_spin: RotationAccumulator::new(0.0005),
        }
    }

    pub fn particle_total(&self) -> usize {
        self.particle_count + self.ring_count
    }
}

/// Uniform points inside the unit sphere with pink-red HSL colors
fn planet(rng: &mut SeededRandom, count: usize) -> (Vec<Vec3>, Vec<Color>) {
    let mut positions = Vec::with_capacity(count);
    let mut colors = Vec::with_capacity(count);
    while positions.len() < count {
        let p = Vec3::new(rng.spread(2.0), rng.spread(2.0), rng.spread(2.0));
        if p.length_squared() > 1.0 {
            continue;
        }
        positions.push(p);
        colors.push(Color::from_hsl(rng.range(0.9, 1.0), 0.8, rng.range(0.5, 0.7)));
    }
    (positions, colors)
}

/// Flat annulus between radius 1.3 and 2.5
fn ring(rng: &mut SeededRandom, count: usize) -> Vec<Vec3> {
    (0..count)
        .map(|_| {
            let radius = rng.range(1.3, 2.5);
            let angle = rng.next_f32() * TAU;
            Vec3::new(angle.cos() * radius, rng.range(-0.02, 0.02), angle.sin() * radius)
        })
        .collect()
}

/// Planet bands: x and z shift together by a wave keyed on height
pub fn band_wave(rest: &[Vec3], out: &mut [Vec3], t: f32) {
    for (p, r) in out.iter_mut().zip(rest) {
        let offset = wave(t, 1.5, r.y * 6.0, 0.015);
        *p = Vec3::new(r.x + offset, r.y, r.z + offset);
    }
}

/// Ring ripple: y follows a wave keyed on x
pub fn ring_wave(rest: &[Vec3], out: &mut [Vec3], t: f32) {
    for (p, r) in out.iter_mut().zip(rest) {
        p.y = r.y + wave(t, 1.5, r.x * 2.0, 0.099);
    }
}

impl Scene for ParticlesScene {
    fn name(&self) -> &'static str {
        "particles"
    }

    fn setup(&mut self, _store: &mut ParameterStore, _panel: &mut ControlPanel, world: &mut World) -> Result<()> {
        world.set_camera(PerspectiveCamera::new(75.0, 16.0 / 9.0, 0.1, 100.0).at(0.0, 2.0, 6.0));
        world.controls = world.controls.with_damping(0.05);
        world.graph.background = Color::BLACK;

        let mut rng = SeededRandom::new(self.seed);
        let (positions, colors) = planet(&mut rng, self.particle_count);
        let mut cloud = PointCloud::new(positions.clone(), Color::WHITE, POINT_SIZE);
        cloud.colors = Some(colors);
        self.planet = Some(Cloud {
            id: world.graph.add(Node::points("planet", cloud)),
            rest: positions,
        });

        let positions = ring(&mut rng, self.ring_count);
        let cloud = PointCloud::new(positions.clone(), Color::from_hex(0xff477e), POINT_SIZE);
        self.ring = Some(Cloud {
            id: world
                .graph
                .add(Node::points("ring", cloud).rotated((PI * 150.0).rem_euclid(TAU), 0.0, 0.0)),
            rest: positions,
        });

        world.graph.add(Node::light("ambient", Light::ambient(Color::WHITE, 0.9)));
        world
            .graph
            .add(Node::light("sun", Light::directional(Color::WHITE, 1.0)).at(5.0, 5.0, 5.0));

        log::info!("particles: {} planet + {} ring points", self.particle_count, self.ring_count);
        Ok(())
    }

    fn apply(&mut self, _change: &ParamChange, _store: &ParameterStore, _world: &mut World) -> Result<()> {
        Ok(())
    }

    fn update(&mut self, state: &AnimationState, _store: &ParameterStore, world: &mut World) -> Result<()> {
        let t = state.elapsed;
        let (planet, ring) = self
            .planet
            .as_ref()
            .zip(self.ring.as_ref())
            .context("particles scene used before setup")?;

        band_wave(&planet.rest, &mut world.graph.points_mut(planet.id)?.positions, t);
        ring_wave(&ring.rest, &mut world.graph.points_mut(ring.id)?.positions, t);
        world.graph.transform_mut(ring.id)?.rotation.y = self.ring_spin.advance();
        Ok(())
    }
}
