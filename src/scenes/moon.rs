use std::f32::consts::{FRAC_PI_2, PI};
use std::sync::Arc;

use anyhow::{Context, Result};
use glam::Vec3;

use super::common::{axis_of, place_model, Controls};
use super::{Scene, SceneContext, World};
use crate::animation::{bounce, AnimationState};
use crate::camera::PerspectiveCamera;
use crate::controls::{ControlPanel, ParamChange};
use crate::geometry::{Geometry, Heightfield};
use crate::loaders::ModelSlot;
use crate::math::{Color, SeededRandom};
use crate::params::ParameterStore;
use crate::scene::{Fog, Light, Material, Node, NodeId, PointCloud};

const HEAD_BONES: [&str; 2] = ["Head", "mixamorigHead"];
/// Look-at height above the model origin when it has no head bone
const HEAD_FALLBACK: f32 = 2.4;
/// Fraction of the distance to the head the orbit target closes per tick
const TARGET_FOLLOW: f32 = 0.08;

#[derive(Debug, Clone, Copy)]
struct Ids {
    ambient: NodeId,
    sun: NodeId,
    rim: NodeId,
    stars: NodeId,
    target: NodeId,
}

/// The model under a cold moonlight: fog, a beam of light, a displaced
/// water plane, and a twinkling starfield. The orbit camera is held close
/// and keeps turning toward the model's head.
#[derive(Debug)]
pub struct MoonScene {
    ctx: SceneContext,
    model: Option<ModelSlot>,
    ids: Option<Ids>,
    star_rest: Vec<Vec3>,
}

impl MoonScene {
    pub fn new(ctx: &SceneContext) -> Self {
        Self {
            ctx: ctx.clone(),
            model: None,
            ids: None,
            star_rest: Vec::new(),
        }
    }

    fn ids(&self) -> Result<Ids> {
        self.ids.context("moon scene used before setup")
    }

    /// Where the camera should look: the head bone if the model has one
    fn head_position(&self, world: &World) -> Result<Option<Vec3>> {
        let Some(slot) = &self.model else {
            return Ok(None);
        };
        let Some(id) = slot.node() else {
            return Ok(None);
        };
        let matrix = world.graph.world_matrix(id)?;
        let head = match slot.anchor(&HEAD_BONES) {
            Some(anchor) => matrix.transform_point3(anchor),
            None => matrix.transform_point3(Vec3::ZERO) + Vec3::Y * HEAD_FALLBACK,
        };
        Ok(Some(head))
    }
}

fn starfield(rng: &mut SeededRandom, count: usize) -> Vec<Vec3> {
    (0..count)
        .map(|_| Vec3::new(rng.spread(40.0), rng.spread(50.0), rng.range(-10.0, 10.0)))
        .collect()
}

/// Each star drifts on its own phase, so the field shimmers instead of
/// moving as one sheet
pub fn twinkle(rest: &[Vec3], out: &mut [Vec3], t: f32) {
    for (i, (p, r)) in out.iter_mut().zip(rest).enumerate() {
        let i = i as f32;
        p.y = r.y + (t + i * 0.1).sin() * 0.3;
        p.z = r.z + (t + i * 0.05).cos() * 0.15;
    }
}

impl Scene for MoonScene {
    fn name(&self) -> &'static str {
        "moon"
    }

    fn setup(&mut self, store: &mut ParameterStore, panel: &mut ControlPanel, world: &mut World) -> Result<()> {
        let mut controls = Controls::new(store, panel);
        controls.folder("Vecna Controls");
        controls.slider("model.posX", (-4.0, 4.0, 0.1), 0.0)?.label("posX");
        controls.slider("model.posY", (-2.0, 10.0, 0.1), -2.0)?.label("posY");
        controls.slider("model.posZ", (-2.0, 2.0, 0.1), 0.0)?.label("posZ");
        controls.slider("model.scale", (0.2, 2.0, 0.1), 1.2)?.label("scale");
        controls.top_level();
        controls.slider("ambient", (0.0, 10.0, 0.0), 0.03)?.label("Ambient Light");
        controls.folder("Directional Light");
        controls.slider("light.posX", (-10.0, 10.0, 0.1), 5.0)?.label("posX");
        controls.slider("light.posY", (-10.0, 10.0, 0.1), 10.0)?.label("posY");
        controls.slider("light.posZ", (-10.0, 20.0, 0.1), 5.0)?.label("posZ");
        controls.slider("light.intensity", (0.0, 50.0, 0.1), 0.0)?.label("intensity");
        controls.top_level();
        controls.color("model.color", 0x1ad9ff)?.label("Vecna Color");
        controls.folder("Rim Light");
        controls.slider("rim.x", (-10.0, 10.0, 0.1), -5.0)?.label("x");
        controls.slider("rim.y", (-10.0, 10.0, 0.1), 4.0)?.label("y");
        controls.slider("rim.z", (-10.0, 10.0, 0.1), -6.0)?.label("z");
        controls.slider("rim.intensity", (0.0, 5.0, 0.1), 0.0)?.label("intensity");
        controls.top_level();
        controls.color("background", 0x000000)?.label("Background Color");

        world.set_camera(PerspectiveCamera::new(70.0, 16.0 / 9.0, 0.1, 100.0).at(0.22, 1.55, 1.85));
        world.controls = world
            .controls
            .with_damping(0.05)
            .with_polar_limits(PI * 0.35, PI * 0.55)
            .with_distance_limits(1.7, 2.0);
        world.graph.background = Color::BLACK;
        world.graph.fog = Some(Fog::new(Color::BLACK, 6.0, 18.0));

        let graph = &mut world.graph;
        let ambient = graph.add(Node::light("ambient", Light::ambient(Color::WHITE, 0.03)));
        let sun = graph.add(Node::light("sun", Light::directional(Color::WHITE, 6.4)).at(5.6, 6.2, 5.4));
        graph.add(
            Node::light("under", Light::point(Color::from_hex(0x223344), 0.8, 3.0, 2.0)).at(0.1, 1.2, 1.3),
        );
        graph.add(
            Node::light(
                "sky",
                Light::hemisphere(Color::from_hex(0x88ccff), Color::from_hex(0x222222), 0.03),
            )
            .at(0.0, 10.0, 0.0),
        );
        let rim = graph.add(
            Node::light("rim", Light::directional(Color::from_hex(0x66ccff), 0.0)).at(-5.0, 4.0, -6.0),
        );

        let mut beam = Material::basic(Color::from_hex(0x66ccff));
        beam.opacity = 0.6;
        graph.add(
            Node::mesh("beam", Geometry::cone(1.2, 4.0, 32, true), beam)
                .at(1.2, 4.2, 2.0)
                .rotated(PI, 0.0, 0.0),
        );

        let mut water = Material::standard(Color::from_hex(0x87ceeb));
        water.displacement_scale = 1.1;
        graph.add(
            Node::mesh("water", Geometry::plane(50.0, 50.0, 100, 100), water)
                .with_heightfield(Arc::new(Heightfield::generate(64, 64, self.ctx.seed)))
                .at(0.0, -2.5, 0.0)
                .rotated(-FRAC_PI_2, 0.0, 0.0),
        );

        let mut rng = SeededRandom::new(self.ctx.seed.wrapping_add(1));
        self.star_rest = starfield(&mut rng, self.ctx.star_count);
        let mut cloud = PointCloud::new(self.star_rest.clone(), Color::WHITE, 0.042);
        cloud.opacity = 0.5;
        let stars = graph.add(Node::points("stars", cloud).at(0.0, 1.0, -2.0).rotated(FRAC_PI_2, 0.0, 0.0));

        let target = graph.add(Node::mesh(
            "target",
            Geometry::sphere(0.05, 8),
            Material::basic(Color::from_hex(0xff0000)),
        ));

        self.ids = Some(Ids {
            ambient,
            sun,
            rim,
            stars,
            target,
        });
        self.model = Some(ModelSlot::new(self.ctx.load_model()));
        Ok(())
    }

    fn apply(&mut self, change: &ParamChange, _store: &ParameterStore, world: &mut World) -> Result<()> {
        let ids = self.ids()?;
        let name = change.name.as_str();

        if name == "model.scale" {
            let scale = change.number()?;
            if let Some(slot) = &self.model {
                slot.with_node(&mut world.graph, |g, id| {
                    g.transform_mut(id).map(|t| t.set_uniform_scale(scale))
                })?;
            }
        } else if name == "model.color" {
            let color = change.color()?;
            if let Some(slot) = &self.model {
                slot.with_node(&mut world.graph, |g, id| {
                    g.traverse_meshes_mut(id, |mesh| mesh.material.color = color)
                })?;
            }
        } else if let Some(axis) = name.strip_prefix("model.pos").and_then(axis_of) {
            // the bob in `update` rewrites y from the store every tick
            let value = change.number()?;
            if let Some(slot) = &self.model {
                slot.with_node(&mut world.graph, |g, id| {
                    g.transform_mut(id).map(|t| t.position[axis] = value)
                })?;
            }
        } else if name == "ambient" {
            world.graph.light_mut(ids.ambient)?.intensity = change.number()?;
        } else if name == "light.intensity" {
            world.graph.light_mut(ids.sun)?.intensity = change.number()?;
        } else if let Some(axis) = name.strip_prefix("light.pos").and_then(axis_of) {
            world.graph.transform_mut(ids.sun)?.position[axis] = change.number()?;
        } else if name == "rim.intensity" {
            world.graph.light_mut(ids.rim)?.intensity = change.number()?;
        } else if let Some(axis) = name.strip_prefix("rim.").and_then(axis_of) {
            world.graph.transform_mut(ids.rim)?.position[axis] = change.number()?;
        } else if name == "background" {
            world.graph.background = change.color()?;
        }
        Ok(())
    }

    fn update(&mut self, state: &AnimationState, store: &ParameterStore, world: &mut World) -> Result<()> {
        let ids = self.ids()?;
        let t = state.elapsed;

        twinkle(&self.star_rest, &mut world.graph.points_mut(ids.stars)?.positions, t);

        if let Some(slot) = self.model.as_mut() {
            let tint = store.color("model.color")?;
            if let Some(id) = slot.poll_into(&mut world.graph, "vecna", tint) {
                place_model(&mut world.graph, id, store)?;
            }
        }

        let base_y = store.number("model.posY")?;
        if let Some(slot) = &self.model {
            slot.with_node(&mut world.graph, |g, id| {
                let transform = g.transform_mut(id)?;
                transform.position.y = base_y + bounce(t, 1.5, 0.08);
                transform.rotation.y = bounce(t, 0.4, 0.08);
                Ok(())
            })?;
        }

        if let Some(head) = self.head_position(world)? {
            let target = world.controls.target.lerp(head, TARGET_FOLLOW);
            world.controls.set_target(target);
        }
        world.graph.transform_mut(ids.target)?.position = world.controls.target;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::TriangleMesh;
    use crate::loaders::{AssetHandle, ModelData, ModelMesh};
    use approx::assert_relative_eq;

    fn setup_with(model: Option<ModelData>) -> (MoonScene, ParameterStore, ControlPanel, World) {
        let ctx = SceneContext {
            model_path: None,
            star_count: 50,
            ..SceneContext::default()
        };
        let mut scene = MoonScene::new(&ctx);
        let mut store = ParameterStore::new();
        let mut panel = ControlPanel::new("moon");
        let mut world = World::default();
        scene.setup(&mut store, &mut panel, &mut world).unwrap();
        if let Some(model) = model {
            scene.model = Some(ModelSlot::new(AssetHandle::from_value("vecna.gltf", model)));
        }
        (scene, store, panel, world)
    }

    fn headless_model() -> ModelData {
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

    #[test]
    fn twinkle_is_a_pure_function_of_time() {
        let rest = vec![Vec3::ZERO; 3];
        let mut out = rest.clone();
        twinkle(&rest, &mut out, 1.0);
        assert_relative_eq!(out[2].y, (1.0f32 + 0.2).sin() * 0.3);
        assert_relative_eq!(out[2].z, (1.0f32 + 0.1).cos() * 0.15);
    }

    #[test]
    fn model_attaches_tinted_and_bobs_around_store_height() {
        let (mut scene, store, _panel, mut world) = setup_with(Some(headless_model()));
        let state = AnimationState {
            elapsed: 1.0,
            ..AnimationState::default()
        };
        scene.update(&state, &store, &mut world).unwrap();

        let id = scene.model.as_ref().unwrap().node().unwrap();
        let node = world.graph.node(id).unwrap();
        assert_relative_eq!(node.transform.position.y, -2.0 + bounce(1.0, 1.5, 0.08));
        let child = world.graph.node(node.children()[0]).unwrap();
        assert_eq!(child.as_mesh().unwrap().material.color, Color::from_hex(0x1ad9ff));
    }

    #[test]
    fn orbit_target_moves_toward_the_head() {
        let (mut scene, store, _panel, mut world) = setup_with(Some(headless_model()));
        let start = world.controls.target;
        scene.update(&AnimationState::default(), &store, &mut world).unwrap();

        let model = world.graph.world_matrix(scene.model.as_ref().unwrap().node().unwrap()).unwrap();
        let head = model.transform_point3(Vec3::ZERO) + Vec3::Y * HEAD_FALLBACK;
        assert_relative_eq!(world.controls.target.y, start.y + (head.y - start.y) * TARGET_FOLLOW, epsilon = 1e-5);
    }

    #[test]
    fn color_edit_retints_every_model_mesh() {
        let (mut scene, mut store, mut panel, mut world) = setup_with(Some(headless_model()));
        scene.update(&AnimationState::default(), &store, &mut world).unwrap();

        panel.interact(&mut store, "model.color", Color::from_hex(0xff0000)).unwrap();
        for change in panel.drain_changes() {
            scene.apply(&change, &store, &mut world).unwrap();
        }

        let id = scene.model.as_ref().unwrap().node().unwrap();
        let child = world.graph.node(id).unwrap().children()[0];
        assert_eq!(world.graph.node(child).unwrap().as_mesh().unwrap().material.color.to_hex(), 0xff0000);
    }

    #[test]
    fn model_arriving_late_picks_up_pending_edits() {
        let (mut scene, mut store, mut panel, mut world) = setup_with(None);
        let (completer, handle) = AssetHandle::pair("vecna.gltf");
        scene.model = Some(ModelSlot::new(handle));

        panel.interact(&mut store, "model.scale", 0.6).unwrap();
        panel.interact(&mut store, "model.posZ", 1.5).unwrap();
        panel.interact(&mut store, "model.color", Color::from_hex(0xff8800)).unwrap();
        for change in panel.drain_changes() {
            scene.apply(&change, &store, &mut world).unwrap();
        }
        scene.update(&AnimationState::default(), &store, &mut world).unwrap();

        completer.complete(Ok(headless_model()));
        scene.update(&AnimationState::default(), &store, &mut world).unwrap();

        let id = scene.model.as_ref().unwrap().node().unwrap();
        let node = world.graph.node(id).unwrap();
        assert_relative_eq!(node.transform.scale.x, 0.6);
        assert_relative_eq!(node.transform.position.z, 1.5);
        let child = world.graph.node(node.children()[0]).unwrap();
        assert_eq!(child.as_mesh().unwrap().material.color.to_hex(), 0xff8800);
    }
}
