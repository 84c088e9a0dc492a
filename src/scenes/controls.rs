use anyhow::{Context, Result};
use glam::Vec3;

use super::common::{axis_of, Controls};
use super::{Scene, World};
use crate::animation::{bounce, AnimationState, RotationAccumulator};
use crate::camera::PerspectiveCamera;
use crate::controls::{ControlPanel, ParamChange};
use crate::geometry::Geometry;
use crate::math::Color;
use crate::params::ParameterStore;
use crate::scene::{Fog, Light, Material, Node, NodeId};

const SHAPES: [(&str, &str); 4] = [
    ("Cube", "cube"),
    ("Sphere", "sphere"),
    ("Cylinder", "cylinder"),
    ("Torus", "torus"),
];

const ANIMATIONS: [(&str, &str); 3] = [("None", "none"), ("Rotate", "rotate"), ("Bounce", "bounce")];

fn shape_geometry(shape: &str) -> Option<Geometry> {
    match shape {
        "cube" => Some(Geometry::cube(1.0, 10)),
        "sphere" => Some(Geometry::sphere(0.7, 32)),
        "cylinder" => Some(Geometry::cylinder(0.5, 1.0, 32)),
        "torus" => Some(Geometry::torus(2.0, 0.8, 16, 200)),
        _ => None,
    }
}

/// One mesh driven entirely by the debug panel: size, position,
/// visibility, colors, shape, and an optional animation.
#[derive(Debug)]
pub struct ControlsScene {
    shape: Option<NodeId>,
    shape_name: String,
    spin: RotationAccumulator,
}

impl ControlsScene {
    pub fn new() -> Self {
        Self {
            shape: None,
            shape_name: "cube".to_string(),
            spin: RotationAccumulator::new(0.01),
        }
    }

    fn shape_id(&self) -> Result<NodeId> {
        self.shape.context("controls scene used before setup")
    }

    /// Swap the mesh for a new geometry, keeping its transform and material
    fn rebuild(&mut self, shape: &str, world: &mut World) -> Result<()> {
        if shape == self.shape_name {
            return Ok(());
        }
        let geometry = shape_geometry(shape).with_context(|| format!("unknown shape '{}'", shape))?;

        let old = self.shape_id()?;
        let previous = world.graph.node(old)?.clone();
        let material = previous
            .as_mesh()
            .map(|m| m.material.clone())
            .unwrap_or_default();

        world.graph.remove(old)?;
        let mut node = Node::mesh("shape", geometry, material);
        node.transform = previous.transform;
        node.visible = previous.visible;
        self.shape = Some(world.graph.add(node));
        self.shape_name = shape.to_string();

        log::debug!("shape {} -> {}", old, shape);
        Ok(())
    }
}

impl Default for ControlsScene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene for ControlsScene {
    fn name(&self) -> &'static str {
        "controls"
    }

    fn setup(&mut self, store: &mut ParameterStore, panel: &mut ControlPanel, world: &mut World) -> Result<()> {
        let mut controls = Controls::new(store, panel);
        controls.folder("Size Controls");
        controls.slider("size", (0.1, 1.5, 0.1), 1.0)?;
        controls.folder("Position Folder");
        controls.position((-5.0, 5.0, 0.01), Vec3::ZERO)?;
        controls.folder("Visibility");
        controls.toggle("visible", true)?;
        controls.toggle("wireframe", true)?;
        controls.folder("Color Settings");
        controls.color("color", 0x00ff00)?;
        controls.color("background", 0x030659)?;
        controls.folder("Dropdown Controls");
        controls.choice("shape", &SHAPES, "cube")?;
        controls.choice("animation", &ANIMATIONS, "none")?;

        world.set_camera(PerspectiveCamera::new(75.0, 16.0 / 9.0, 0.1, 1000.0).at(0.0, 0.0, 5.0));
        world.graph.background = Color::from_hex(0x030659);
        world.graph.fog = Some(Fog::new(Color::from_hex(0xcccccc), 10.0, 15.0));

        let cube = Geometry::Box {
            width: 1.0,
            height: 1.0,
            depth: 1.0,
            segments: [20, 10, 10],
        };
        let material = Material::standard(Color::from_hex(0x00ff00)).wireframe(true);
        self.shape = Some(world.graph.add(Node::mesh("shape", cube, material)));
        self.shape_name = "cube".to_string();

        world
            .graph
            .add(Node::light("sun", Light::directional(Color::WHITE, 1.0)).at(5.0, 5.0, 5.0));
        Ok(())
    }

    fn apply(&mut self, change: &ParamChange, store: &ParameterStore, world: &mut World) -> Result<()> {
        let id = self.shape_id()?;
        match change.name.as_str() {
            "size" => world.graph.transform_mut(id)?.set_uniform_scale(change.number()?),
            "posX" | "posZ" => {
                if let Some(axis) = axis_of(&change.name) {
                    world.graph.transform_mut(id)?.position[axis] = change.number()?;
                }
            }
            "posY" => {
                // bounce owns the height while it runs
                if store.choice("animation")? != "bounce" {
                    world.graph.transform_mut(id)?.position.y = change.number()?;
                }
            }
            "visible" => world.graph.set_visible(id, change.flag()?)?,
            "wireframe" => world.graph.mesh_mut(id)?.material.wireframe = change.flag()?,
            "color" => world.graph.mesh_mut(id)?.material.color = change.color()?,
            "background" => world.graph.background = change.color()?,
            "shape" => self.rebuild(change.choice()?, world)?,
            "animation" => {
                if change.choice()? != "bounce" {
                    world.graph.transform_mut(id)?.position.y = store.number("posY")?;
                }
            }
            other => log::debug!("controls scene ignores '{}'", other),
        }
        Ok(())
    }

    fn update(&mut self, state: &AnimationState, store: &ParameterStore, world: &mut World) -> Result<()> {
        let id = self.shape_id()?;
        match store.choice("animation")? {
            "rotate" => {
                let angle = self.spin.advance();
                let transform = world.graph.transform_mut(id)?;
                transform.rotation.x = angle;
                transform.rotation.y = angle;
            }
            "bounce" => {
                world.graph.transform_mut(id)?.position.y = bounce(state.elapsed, 2.0, 2.0);
            }
            _ => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn setup() -> (ControlsScene, ParameterStore, ControlPanel, World) {
        let mut scene = ControlsScene::new();
        let mut store = ParameterStore::new();
        let mut panel = ControlPanel::new("controls");
        let mut world = World::default();
        scene.setup(&mut store, &mut panel, &mut world).unwrap();
        (scene, store, panel, world)
    }

    fn edit(
        scene: &mut ControlsScene,
        store: &mut ParameterStore,
        panel: &mut ControlPanel,
        world: &mut World,
        name: &str,
        value: impl Into<crate::params::ParamValue>,
    ) {
        panel.interact(store, name, value).unwrap();
        for change in panel.drain_changes() {
            scene.apply(&change, store, world).unwrap();
        }
    }

    #[test]
    fn same_shape_does_not_rebuild() {
        let (mut scene, mut store, mut panel, mut world) = setup();
        let before = scene.shape.unwrap();
        scene
            .apply(&ParamChange::new("shape", "cube"), &store, &mut world)
            .unwrap();
        assert_eq!(scene.shape, Some(before));

        edit(&mut scene, &mut store, &mut panel, &mut world, "shape", "torus");
        assert_ne!(scene.shape, Some(before));
        assert!(!world.graph.contains(before));
    }

    #[test]
    fn rebuilt_shape_keeps_transform_and_color() {
        let (mut scene, mut store, mut panel, mut world) = setup();
        edit(&mut scene, &mut store, &mut panel, &mut world, "posX", 2.0);
        edit(&mut scene, &mut store, &mut panel, &mut world, "color", Color::from_hex(0xff0000));
        edit(&mut scene, &mut store, &mut panel, &mut world, "shape", "cylinder");

        let node = world.graph.node(scene.shape.unwrap()).unwrap();
        assert_relative_eq!(node.transform.position.x, 2.0);
        assert_eq!(node.as_mesh().unwrap().material.color.to_hex(), 0xff0000);
        assert_eq!(node.as_mesh().unwrap().geometry.label(), "cylinder");
    }

    #[test]
    fn bounce_overrides_height_and_none_restores_it() {
        let (mut scene, mut store, mut panel, mut world) = setup();
        edit(&mut scene, &mut store, &mut panel, &mut world, "posY", 1.0);
        edit(&mut scene, &mut store, &mut panel, &mut world, "animation", "bounce");

        let state = AnimationState {
            elapsed: 0.5,
            ..AnimationState::default()
        };
        scene.update(&state, &store, &mut world).unwrap();
        let id = scene.shape.unwrap();
        assert_relative_eq!(world.graph.node(id).unwrap().transform.position.y, bounce(0.5, 2.0, 2.0));

        edit(&mut scene, &mut store, &mut panel, &mut world, "animation", "none");
        assert_relative_eq!(world.graph.node(id).unwrap().transform.position.y, 1.0);
    }

    #[test]
    fn rotate_accumulates_per_tick() {
        let (mut scene, mut store, mut panel, mut world) = setup();
        edit(&mut scene, &mut store, &mut panel, &mut world, "animation", "rotate");
        for _ in 0..10 {
            scene.update(&AnimationState::default(), &store, &mut world).unwrap();
        }
        let rotation = world.graph.node(scene.shape.unwrap()).unwrap().transform.rotation;
        assert_relative_eq!(rotation.x, 0.1, epsilon = 1e-5);
        assert_relative_eq!(rotation.y, 0.1, epsilon = 1e-5);
    }
}
