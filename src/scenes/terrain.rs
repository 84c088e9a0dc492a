use std::sync::Arc;

use anyhow::{Context, Result};

use super::common::{axis_of, Controls};
use super::{Scene, SceneContext, World};
use crate::animation::AnimationState;
use crate::camera::PerspectiveCamera;
use crate::controls::{ControlPanel, ParamChange};
use crate::geometry::{Geometry, Heightfield};
use crate::math::Color;
use crate::params::ParameterStore;
use crate::scene::{Light, Material, Node, NodeId};

/// Displacement per pixel of pointer height
const POINTER_DISPLACEMENT: f32 = 0.0005;
const SPIN_SPEED: f32 = 0.3;

/// A displaced terrain patch that spins in place. Moving the pointer
/// down the window raises the relief.
#[derive(Debug)]
pub struct TerrainScene {
    seed: u32,
    plane: Option<NodeId>,
    light: Option<NodeId>,
}

impl TerrainScene {
    pub fn new(ctx: &SceneContext) -> Self {
        Self {
            seed: ctx.seed,
            plane: None,
            light: None,
        }
    }

    fn ids(&self) -> Result<(NodeId, NodeId)> {
        self.plane.zip(self.light).context("terrain scene used before setup")
    }
}

impl Scene for TerrainScene {
    fn name(&self) -> &'static str {
        "terrain"
    }

    fn setup(&mut self, store: &mut ParameterStore, panel: &mut ControlPanel, world: &mut World) -> Result<()> {
        let mut controls = Controls::new(store, panel);
        controls.slider("PlaneRotation", (0.0, 20.0, 0.0), 5.0)?;
        controls.slider("positionLight-x", (0.0, 20.0, 0.0), 2.0)?;
        controls.slider("positionLight-y", (0.0, 20.0, 0.0), 3.0)?;
        controls.slider("positionLight-z", (0.0, 20.0, 0.0), 4.0)?;
        controls.color("pointLightColor", 0x00ff00)?;
        controls.color("backgroundColor", 0x123ff2)?;

        world.set_camera(PerspectiveCamera::new(75.0, 16.0 / 9.0, 0.1, 100.0).at(0.0, 0.0, 1.3));
        world.graph.background = Color::BLACK;

        let mut material = Material::standard(Color::WHITE);
        material.displacement_scale = 0.3;
        self.plane = Some(
            world.graph.add(
                Node::mesh("terrain", Geometry::plane(3.0, 3.0, 100, 100), material)
                    .with_heightfield(Arc::new(Heightfield::generate(128, 128, self.seed)))
                    .at(0.0, -0.5, 0.0)
                    .rotated(5.0, 0.0, 0.0),
            ),
        );
        // the light stays white until the color control is touched
        self.light = Some(
            world
                .graph
                .add(Node::light("point", Light::point(Color::WHITE, 50.0, 0.0, 2.0)).at(2.0, 3.0, 4.0)),
        );
        Ok(())
    }

    fn apply(&mut self, change: &ParamChange, _store: &ParameterStore, world: &mut World) -> Result<()> {
        let (plane, light) = self.ids()?;
        let name = change.name.as_str();

        if name == "PlaneRotation" {
            world.graph.transform_mut(plane)?.rotation.x = change.number()?;
        } else if let Some(axis) = name.strip_prefix("positionLight-").and_then(axis_of) {
            world.graph.transform_mut(light)?.position[axis] = change.number()?;
        } else if name == "pointLightColor" {
            world.graph.light_mut(light)?.color = change.color()?;
        } else if name == "backgroundColor" {
            world.graph.background = change.color()?;
        }
        Ok(())
    }

    fn update(&mut self, state: &AnimationState, _store: &ParameterStore, world: &mut World) -> Result<()> {
        let (plane, _) = self.ids()?;
        world.graph.transform_mut(plane)?.rotation.z = state.elapsed * SPIN_SPEED;
        world.graph.mesh_mut(plane)?.material.displacement_scale = world.pointer.y * POINTER_DISPLACEMENT;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn setup() -> (TerrainScene, ParameterStore, ControlPanel, World) {
        let mut scene = TerrainScene::new(&SceneContext::default());
        let mut store = ParameterStore::new();
        let mut panel = ControlPanel::new("terrain");
        let mut world = World::default();
        scene.setup(&mut store, &mut panel, &mut world).unwrap();
        (scene, store, panel, world)
    }

    #[test]
    fn pointer_drives_displacement() {
        let (mut scene, store, _panel, mut world) = setup();
        world.pointer = Vec2::new(10.0, 400.0);
        let state = AnimationState {
            elapsed: 2.0,
            ..AnimationState::default()
        };
        scene.update(&state, &store, &mut world).unwrap();

        let node = world.graph.node(scene.plane.unwrap()).unwrap();
        assert!((node.as_mesh().unwrap().material.displacement_scale - 0.2).abs() < 1e-6);
        assert!((node.transform.rotation.z - 0.6).abs() < 1e-6);
    }

    #[test]
    fn light_color_waits_for_an_edit() {
        let (mut scene, mut store, mut panel, mut world) = setup();
        let light = scene.light.unwrap();
        assert_eq!(world.graph.node(light).unwrap().as_light().unwrap().color, Color::WHITE);

        panel.interact(&mut store, "pointLightColor", Color::from_hex(0xff00ff)).unwrap();
        panel.interact(&mut store, "positionLight-y", 7.0).unwrap();
        for change in panel.drain_changes() {
            scene.apply(&change, &store, &mut world).unwrap();
        }

        let node = world.graph.node(light).unwrap();
        assert_eq!(node.as_light().unwrap().color.to_hex(), 0xff00ff);
        assert_eq!(node.transform.position.y, 7.0);
    }
}
