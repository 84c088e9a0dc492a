use anyhow::{Context, Result};

use super::common::{axis_of, floor, place_model, Controls, ROTATION_RANGE};
use super::{Scene, SceneContext, World};
use crate::animation::AnimationState;
use crate::camera::PerspectiveCamera;
use crate::controls::{ControlPanel, ParamChange};
use crate::loaders::ModelSlot;
use crate::math::Color;
use crate::params::ParameterStore;
use crate::scene::{Light, Node, NodeId};

const MODEL_TINT: u32 = 0x378f3e;

/// A loaded glTF model on a floor, with panels for the camera, the model,
/// and the lights.
#[derive(Debug)]
pub struct ModelScene {
    ctx: SceneContext,
    model: Option<ModelSlot>,
    ambient: Option<NodeId>,
    sun: Option<NodeId>,
}

impl ModelScene {
    pub fn new(ctx: &SceneContext) -> Self {
        Self {
            ctx: ctx.clone(),
            model: None,
            ambient: None,
            sun: None,
        }
    }

    fn lights(&self) -> Result<(NodeId, NodeId)> {
        self.ambient.zip(self.sun).context("model scene used before setup")
    }
}

impl Scene for ModelScene {
    fn name(&self) -> &'static str {
        "model"
    }

    fn setup(&mut self, store: &mut ParameterStore, panel: &mut ControlPanel, world: &mut World) -> Result<()> {
        let mut controls = Controls::new(store, panel);
        controls.folder("Camera Position");
        for (axis, default) in ["X", "Y", "Z"].iter().zip([5.0, 2.0, 3.0]) {
            controls
                .slider(&format!("camera.pos{axis}"), (-10.0, 10.0, 0.1), default)?
                .label(&format!("pos{axis}"));
        }
        controls.folder("Vecna Controls");
        controls.slider("model.posX", (-4.0, 4.0, 0.1), 0.0)?.label("posX");
        controls.slider("model.posY", (-2.0, 2.0, 0.1), -1.0)?.label("posY");
        controls.slider("model.posZ", (-2.0, 2.0, 0.1), 0.0)?.label("posZ");
        controls.slider("model.scale", (0.2, 2.0, 0.1), 0.5)?.label("scale");
        controls.top_level();
        controls.slider("ambient", (0.0, 10.0, 0.1), 0.3)?.label("Ambient Light");
        controls.folder("Direction Light");
        for (axis, default) in ["X", "Y", "Z"].iter().zip([5.0, 2.0, 3.0]) {
            controls
                .slider(&format!("light.pos{axis}"), (-10.0, 10.0, 0.1), default)?
                .label(&format!("pos{axis}"));
        }
        controls.slider("light.intensity", (0.0, 50.0, 0.1), 10.0)?.label("intensity");
        for axis in ["X", "Y", "Z"] {
            controls
                .slider(&format!("light.rotate{axis}"), ROTATION_RANGE, 0.0)?
                .label(&format!("rotate{axis}"));
        }
        controls.top_level();
        controls.color("background", 0x111111)?.label("Background Color");

        world.set_camera(PerspectiveCamera::new(70.0, 16.0 / 9.0, 0.1, 100.0).at(0.0, 1.0, 3.0));
        world.controls = world.controls.with_damping(0.05);
        world.graph.background = Color::from_hex(0x111111);

        self.ambient = Some(world.graph.add(Node::light("ambient", Light::ambient(Color::WHITE, 0.3))));
        self.sun = Some(
            world
                .graph
                .add(Node::light("sun", Light::directional(Color::WHITE, 1.0)).at(0.0, 0.0, 5.0)),
        );
        world.graph.add(floor(20.0, 0x808080, -1.5));

        self.model = Some(ModelSlot::new(self.ctx.load_model()));
        Ok(())
    }

    fn apply(&mut self, change: &ParamChange, _store: &ParameterStore, world: &mut World) -> Result<()> {
        let (ambient, sun) = self.lights()?;
        let name = change.name.as_str();

        if let Some(axis) = name.strip_prefix("camera.pos").and_then(axis_of) {
            let mut position = world.camera.position;
            position[axis] = change.number()?;
            world.move_camera(position);
        } else if name == "model.scale" {
            let scale = change.number()?;
            if let Some(slot) = &self.model {
                slot.with_node(&mut world.graph, |g, id| {
                    g.transform_mut(id).map(|t| t.set_uniform_scale(scale))
                })?;
            }
        } else if let Some(axis) = name.strip_prefix("model.pos").and_then(axis_of) {
            let value = change.number()?;
            if let Some(slot) = &self.model {
                slot.with_node(&mut world.graph, |g, id| {
                    g.transform_mut(id).map(|t| t.position[axis] = value)
                })?;
            }
        } else if name == "ambient" {
            world.graph.light_mut(ambient)?.intensity = change.number()?;
        } else if name == "light.intensity" {
            world.graph.light_mut(sun)?.intensity = change.number()?;
        } else if let Some(axis) = name.strip_prefix("light.pos").and_then(axis_of) {
            world.graph.transform_mut(sun)?.position[axis] = change.number()?;
        } else if let Some(axis) = name.strip_prefix("light.rotate").and_then(axis_of) {
            world.graph.transform_mut(sun)?.rotation[axis] = change.number()?;
        } else if name == "background" {
            world.graph.background = change.color()?;
        }
        Ok(())
    }

    fn update(&mut self, _state: &AnimationState, store: &ParameterStore, world: &mut World) -> Result<()> {
        if let Some(slot) = self.model.as_mut() {
            if let Some(id) = slot.poll_into(&mut world.graph, "vecna", Color::from_hex(MODEL_TINT)) {
                place_model(&mut world.graph, id, store)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::TriangleMesh;
    use crate::loaders::{AssetHandle, ModelData, ModelMesh};
    use glam::Vec3;
    use std::sync::Arc;

    fn setup() -> (ModelScene, ParameterStore, ControlPanel, World) {
        let ctx = SceneContext {
            model_path: None,
            ..SceneContext::default()
        };
        let mut scene = ModelScene::new(&ctx);
        let mut store = ParameterStore::new();
        let mut panel = ControlPanel::new("model");
        let mut world = World::default();
        scene.setup(&mut store, &mut panel, &mut world).unwrap();
        (scene, store, panel, world)
    }

    fn triangle_model() -> ModelData {
        ModelData {
            meshes: vec![ModelMesh {
                name: "body.0".to_string(),
                mesh: Arc::new(TriangleMesh {
                    positions: vec![Vec3::ZERO, Vec3::X, Vec3::Y],
                    indices: vec![0, 1, 2],
                }),
                color: Color::WHITE,
            }],
            anchors: Default::default(),
        }
    }

    fn apply_all(scene: &mut ModelScene, store: &ParameterStore, panel: &mut ControlPanel, world: &mut World) {
        for change in panel.drain_changes() {
            scene.apply(&change, store, world).unwrap();
        }
    }

    #[test]
    fn model_lands_at_the_default_placement() {
        let (mut scene, store, _, mut world) = setup();
        scene.model = Some(ModelSlot::new(AssetHandle::from_value("vecna.gltf", triangle_model())));
        scene.update(&AnimationState::default(), &store, &mut world).unwrap();

        let id = scene.model.as_ref().unwrap().node().unwrap();
        let transform = world.graph.node(id).unwrap().transform;
        assert_eq!(transform.position, Vec3::new(0.0, -1.0, 0.0));
        assert_eq!(transform.scale, Vec3::splat(0.5));
    }

    #[test]
    fn edits_made_while_loading_apply_when_the_model_arrives() {
        let (mut scene, mut store, mut panel, mut world) = setup();
        let (completer, handle) = AssetHandle::pair("vecna.gltf");
        scene.model = Some(ModelSlot::new(handle));

        panel.interact(&mut store, "model.scale", 1.5).unwrap();
        panel.interact(&mut store, "model.posX", -3.0).unwrap();
        apply_all(&mut scene, &store, &mut panel, &mut world);
        scene.update(&AnimationState::default(), &store, &mut world).unwrap();
        assert!(!scene.model.as_ref().unwrap().is_loaded());

        completer.complete(Ok(triangle_model()));
        scene.update(&AnimationState::default(), &store, &mut world).unwrap();

        let id = scene.model.as_ref().unwrap().node().unwrap();
        let transform = world.graph.node(id).unwrap().transform;
        assert_eq!(transform.scale, Vec3::splat(1.5));
        assert_eq!(transform.position, Vec3::new(-3.0, -1.0, 0.0));
    }

    #[test]
    fn model_edits_without_a_model_are_ignored() {
        let (mut scene, mut store, mut panel, mut world) = setup();
        let before = world.graph.len();

        panel.interact(&mut store, "model.scale", 1.5).unwrap();
        for change in panel.drain_changes() {
            scene.apply(&change, &store, &mut world).unwrap();
        }
        scene.update(&AnimationState::default(), &store, &mut world).unwrap();

        assert_eq!(world.graph.len(), before);
    }

    #[test]
    fn camera_slider_moves_the_camera() {
        let (mut scene, mut store, mut panel, mut world) = setup();
        panel.interact(&mut store, "camera.posY", 4.0).unwrap();
        for change in panel.drain_changes() {
            scene.apply(&change, &store, &mut world).unwrap();
        }
        assert_eq!(world.camera.position.y, 4.0);

        world.controls.update(&mut world.camera);
        assert!((world.camera.position.y - 4.0).abs() < 1e-4);
    }
}
