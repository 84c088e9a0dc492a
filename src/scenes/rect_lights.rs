use std::f32::consts::PI;

use anyhow::{Context, Result};

use super::common::{floor, Controls};
use super::{Scene, World};
use crate::animation::{AnimationState, RotationAccumulator};
use crate::camera::PerspectiveCamera;
use crate::controls::{ControlPanel, ParamChange};
use crate::geometry::Geometry;
use crate::math::Color;
use crate::params::ParameterStore;
use crate::scene::{Light, LightKind, Material, Node, NodeId};

struct LightPreset {
    folder: &'static str,
    color: u32,
    x: f32,
}

const LIGHTS: [LightPreset; 3] = [
    LightPreset { folder: "Light 1 (Green)", color: 0x37ff00, x: -5.0 },
    LightPreset { folder: "Light 2 (Red)", color: 0xff0000, x: 0.0 },
    LightPreset { folder: "Light 3 (Blue)", color: 0x0008ff, x: 5.0 },
];

/// Split `intensity2` into ("intensity", 1)
fn numbered(name: &str) -> Option<(&str, usize)> {
    let digit = name.chars().last()?.to_digit(10)? as usize;
    (1..=LIGHTS.len())
        .contains(&digit)
        .then(|| (&name[..name.len() - 1], digit - 1))
}

/// Three colored rect-area lights over a shared physical material
#[derive(Debug)]
pub struct RectLightsScene {
    lights: Vec<NodeId>,
    shaded: Vec<NodeId>,
    knot: Option<NodeId>,
    knot_spin: RotationAccumulator,
}

impl RectLightsScene {
    pub fn new() -> Self {
        Self {
            lights: Vec::new(),
            shaded: Vec::new(),
            knot: None,
            knot_spin: RotationAccumulator::new(0.005),
        }
    }
}

impl Default for RectLightsScene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene for RectLightsScene {
    fn name(&self) -> &'static str {
        "rect-lights"
    }

    fn setup(&mut self, store: &mut ParameterStore, panel: &mut ControlPanel, world: &mut World) -> Result<()> {
        let mut controls = Controls::new(store, panel);
        controls.toggle("wireframe", false)?;
        controls.color("color", 0xffffff)?;
        controls.slider("roughness", (0.0, 1.0, 0.01), 0.4)?;
        for (i, preset) in LIGHTS.iter().enumerate() {
            let n = i + 1;
            controls.folder(preset.folder);
            controls.color(&format!("color{n}"), preset.color)?;
            controls.slider(&format!("intensity{n}"), (0.0, 50.0, 0.0), 20.0)?;
            controls.slider(&format!("width{n}"), (0.0, 20.0, 0.0), 4.0)?;
            controls.slider(&format!("height{n}"), (0.0, 20.0, 0.0), 10.0)?;
            controls.slider(&format!("x{n}"), (-10.0, 10.0, 0.0), preset.x)?;
            controls.slider(&format!("y{n}"), (-10.0, 10.0, 0.0), 2.0)?;
            controls.slider(&format!("z{n}"), (-10.0, 10.0, 0.0), -5.0)?;
        }

        world.set_camera(PerspectiveCamera::default().at(0.0, 2.0, 10.0));

        let mut material = Material::standard(Color::WHITE);
        material.roughness = 0.4;
        material.metalness = 0.5;
        let graph = &mut world.graph;
        self.shaded = vec![
            graph.add(Node::mesh("sphere1", Geometry::sphere(1.0, 32), material.clone()).at(-3.0, 0.0, 0.0)),
            graph.add(Node::mesh("sphere2", Geometry::sphere(1.0, 32), material.clone()).at(3.0, 0.0, 0.0)),
            graph.add(Node::mesh("knot", Geometry::torus_knot(1.2, 0.4, 100, 16), material)),
        ];
        self.knot = self.shaded.last().copied();

        let mut plane = floor(30.0, 0x888888, -2.0);
        if let Some(mesh) = plane.as_mesh_mut() {
            mesh.material.roughness = 0.3;
        }
        graph.add(plane);
        graph.add(Node::light("ambient", Light::ambient(Color::WHITE, 0.3)));

        self.lights = LIGHTS
            .iter()
            .enumerate()
            .map(|(i, preset)| {
                let light = Light::rect_area(Color::from_hex(preset.color), 20.0, 4.0, 10.0);
                graph.add(
                    Node::light(&format!("rectLight{}", i + 1), light)
                        .at(preset.x, 2.0, -5.0)
                        .rotated(0.0, PI, 0.0),
                )
            })
            .collect();
        Ok(())
    }

    fn apply(&mut self, change: &ParamChange, _store: &ParameterStore, world: &mut World) -> Result<()> {
        let Some((field, index)) = numbered(&change.name) else {
            return Ok(());
        };
        let id = *self.lights.get(index).context("rect lights used before setup")?;

        match field {
            "color" => world.graph.light_mut(id)?.color = change.color()?,
            "intensity" => world.graph.light_mut(id)?.intensity = change.number()?,
            "width" | "height" => {
                let value = change.number()?;
                if let LightKind::RectArea { width, height } = &mut world.graph.light_mut(id)?.kind {
                    if field == "width" {
                        *width = value;
                    } else {
                        *height = value;
                    }
                }
            }
            "x" => world.graph.transform_mut(id)?.position.x = change.number()?,
            "y" => world.graph.transform_mut(id)?.position.y = change.number()?,
            "z" => world.graph.transform_mut(id)?.position.z = change.number()?,
            _ => {}
        }
        Ok(())
    }

    /// The shared material has no callbacks; it follows the store every tick
    fn update(&mut self, _state: &AnimationState, store: &ParameterStore, world: &mut World) -> Result<()> {
        let wireframe = store.flag("wireframe")?;
        let color = store.color("color")?;
        let roughness = store.number("roughness")?;
        for &id in &self.shaded {
            let material = &mut world.graph.mesh_mut(id)?.material;
            material.wireframe = wireframe;
            material.color = color;
            material.roughness = roughness;
        }

        if let Some(knot) = self.knot {
            world.graph.transform_mut(knot)?.rotation.y = self.knot_spin.advance();
        }
        Ok(())
    }
}
