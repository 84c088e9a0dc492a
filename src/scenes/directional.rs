use anyhow::{Context, Result};
use glam::Vec3;

use super::common::{floor, Controls, ROTATION_RANGE};
use super::{Scene, World};
use crate::animation::AnimationState;
use crate::camera::PerspectiveCamera;
use crate::controls::{ControlPanel, ParamChange};
use crate::geometry::Geometry;
use crate::math::Color;
use crate::params::ParameterStore;
use crate::scene::{Light, Material, Node, NodeId};

/// Radius of the light's circular sweep around its configured position
const SWEEP_RADIUS: f32 = 10.0;
/// Radians per second
const SWEEP_SPEED: f32 = 0.1;

/// A row of primitives under one directional light that sweeps in a
/// circle around the position set on the panel.
#[derive(Debug, Default)]
pub struct DirectionalScene {
    sphere: Option<NodeId>,
    light: Option<NodeId>,
}

impl DirectionalScene {
    pub fn new() -> Self {
        Self::default()
    }

    fn ids(&self) -> Result<(NodeId, NodeId)> {
        self.sphere
            .zip(self.light)
            .context("directional scene used before setup")
    }
}

impl Scene for DirectionalScene {
    fn name(&self) -> &'static str {
        "directional"
    }

    fn setup(&mut self, store: &mut ParameterStore, panel: &mut ControlPanel, world: &mut World) -> Result<()> {
        let mut controls = Controls::new(store, panel);
        controls.toggle("wireframe", false)?;
        controls.action("visibleToggle")?;
        controls.color("meshColor", 0x003049)?;
        controls.color("lightColor", 0x312dfb)?;
        controls.slider("intensity", (0.0, 50.0, 0.01), 16.81)?;
        controls.folder("Position");
        controls.position((-10.0, 10.0, 0.01), Vec3::new(2.0, 1.0, 4.0))?;
        controls.folder("Rotation");
        controls.slider("rotationX", ROTATION_RANGE, 0.0)?;
        controls.slider("rotationY", ROTATION_RANGE, 0.0)?;
        controls.slider("rotationZ", ROTATION_RANGE, 0.0)?;

        world.set_camera(PerspectiveCamera::default().at(2.0, 3.0, 5.0));

        let graph = &mut world.graph;
        graph.add(Node::light("ambient", Light::ambient(Color::WHITE, 1.0)));
        self.light = Some(graph.add(
            Node::light("sun", Light::directional(Color::from_hex(0xcaf0f8), 0.8)).at(2.0, 1.0, 4.0),
        ));

        let standard = |hex| Material::standard(Color::from_hex(hex));
        self.sphere = Some(graph.add(
            Node::mesh("sphere", Geometry::sphere(1.0, 32), standard(0x003049)).at(-4.5, 0.0, 0.0),
        ));
        graph.add(Node::mesh("box", Geometry::cube(1.0, 1), standard(0xff0054)).at(-2.0, 0.0, 0.0));
        graph.add(Node::mesh("cylinder", Geometry::cylinder(1.0, 1.0, 32), standard(0x3a0ca3)).at(0.5, 0.0, 0.0));
        graph.add(Node::mesh("sphere2", Geometry::sphere(1.0, 32), standard(0xff0000)).at(3.0, 0.0, 0.0));
        graph.add(floor(30.0, 0x333d29, -2.0));
        Ok(())
    }

    fn apply(&mut self, change: &ParamChange, _store: &ParameterStore, world: &mut World) -> Result<()> {
        if change.name == "visibleToggle" {
            let (sphere, _) = self.ids()?;
            let visible = world.graph.node(sphere)?.visible;
            world.graph.set_visible(sphere, !visible)?;
        }
        Ok(())
    }

    /// Everything else is pulled from the store each tick
    fn update(&mut self, state: &AnimationState, store: &ParameterStore, world: &mut World) -> Result<()> {
        let (sphere, light) = self.ids()?;

        let material = &mut world.graph.mesh_mut(sphere)?.material;
        material.wireframe = store.flag("wireframe")?;
        material.color = store.color("meshColor")?;

        let sun = world.graph.light_mut(light)?;
        sun.color = store.color("lightColor")?;
        sun.intensity = store.number("intensity")?;

        let angle = state.elapsed * SWEEP_SPEED;
        let transform = world.graph.transform_mut(light)?;
        transform.position = Vec3::new(
            store.number("posX")? + angle.sin() * SWEEP_RADIUS,
            store.number("posY")?,
            store.number("posZ")? + angle.cos() * SWEEP_RADIUS,
        );
        transform.rotation = Vec3::new(
            store.number("rotationX")?,
            store.number("rotationY")?,
            store.number("rotationZ")?,
        );
        Ok(())
    }
}
