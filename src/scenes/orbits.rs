use anyhow::Result;
use glam::Vec3;

use super::{Scene, World};
use crate::animation::{orbit, AnimationState, RotationAccumulator};
use crate::camera::PerspectiveCamera;
use crate::controls::{ControlPanel, ParamChange};
use crate::geometry::Geometry;
use crate::math::Color;
use crate::params::ParameterStore;
use crate::scene::{Material, Node, NodeId};

const RADIUS: f32 = 2.0;

#[derive(Debug)]
struct Body {
    id: NodeId,
    spin: RotationAccumulator,
}

/// Three wireframe planes: one spinning in place, two circling it
#[derive(Debug)]
pub struct OrbitsScene {
    bodies: Vec<Body>,
    inner: RotationAccumulator,
    outer: RotationAccumulator,
}

impl OrbitsScene {
    pub fn new() -> Self {
        Self {
            bodies: Vec::new(),
            inner: RotationAccumulator::new(0.005),
            outer: RotationAccumulator::new(0.004),
        }
    }
}

impl Default for OrbitsScene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene for OrbitsScene {
    fn name(&self) -> &'static str {
        "orbits"
    }

    fn setup(&mut self, _store: &mut ParameterStore, _panel: &mut ControlPanel, world: &mut World) -> Result<()> {
        world.set_camera(PerspectiveCamera::default().at(0.0, 5.0, 5.0).looking_at(Vec3::ZERO));

        let material = Material::basic(Color::from_hex(0x00ff00)).wireframe(true);
        self.bodies = [("center", 0.01), ("inner", 0.02), ("outer", 0.03)]
            .into_iter()
            .map(|(name, spin)| Body {
                id: world
                    .graph
                    .add(Node::mesh(name, Geometry::plane(5.0, 3.0, 32, 32), material.clone())),
                spin: RotationAccumulator::new(spin),
            })
            .collect();
        Ok(())
    }

    fn apply(&mut self, _change: &ParamChange, _store: &ParameterStore, _world: &mut World) -> Result<()> {
        Ok(())
    }

    fn update(&mut self, _state: &AnimationState, _store: &ParameterStore, world: &mut World) -> Result<()> {
        let inner = orbit(self.inner.advance(), 1.25 * RADIUS, RADIUS);
        let outer = orbit(self.outer.advance(), 2.0 * RADIUS, 2.0 * RADIUS);
        let positions = [None, Some(inner), Some(outer)];

        for (body, position) in self.bodies.iter_mut().zip(positions) {
            let transform = world.graph.transform_mut(body.id)?;
            if let Some(p) = position {
                transform.position.x = p.x;
                transform.position.z = p.y;
            }
            transform.rotation.y = body.spin.advance();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn inner_plane_follows_its_ellipse() {
        let mut scene = OrbitsScene::new();
        let mut world = World::default();
        scene
            .setup(&mut ParameterStore::new(), &mut ControlPanel::new("orbits"), &mut world)
            .unwrap();

        let store = ParameterStore::new();
        for _ in 0..100 {
            scene.update(&AnimationState::default(), &store, &mut world).unwrap();
        }

        let inner = world.graph.node(scene.bodies[1].id).unwrap().transform;
        assert_relative_eq!(inner.position.x, 0.5f32.cos() * 2.5, epsilon = 1e-4);
        assert_relative_eq!(inner.position.z, 0.5f32.sin() * 2.0, epsilon = 1e-4);
        assert_relative_eq!(inner.rotation.y, 2.0, epsilon = 1e-4);
    }
}
