//! The demo scenes.
//!
//! A scene declares its parameters and controls, builds its objects, and
//! then only ever changes them in two places: `apply`, the reducer for
//! queued control edits, and `update`, the per-tick animation.

mod common;
mod controls;
mod directional;
mod model;
mod moon;
mod orbits;
mod particles;
mod rect_lights;
mod terrain;

use std::path::PathBuf;

use anyhow::Result;
use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::animation::AnimationState;
use crate::camera::{OrbitControls, PerspectiveCamera};
use crate::controls::{ControlPanel, ParamChange};
use crate::loaders::{AssetError, AssetHandle, AssetLoader, ModelData};
use crate::params::ParameterStore;
use crate::scene::SceneGraph;

pub use controls::ControlsScene;
pub use directional::DirectionalScene;
pub use model::ModelScene;
pub use moon::{twinkle, MoonScene};
pub use orbits::OrbitsScene;
pub use particles::{band_wave, ring_wave, ParticlesScene};
pub use rect_lights::RectLightsScene;
pub use terrain::TerrainScene;

/// Everything a scene mutates
#[derive(Debug)]
pub struct World {
    pub graph: SceneGraph,
    pub camera: PerspectiveCamera,
    pub controls: OrbitControls,
    /// Last cursor position in physical pixels
    pub pointer: Vec2,
}

impl World {
    pub fn new(camera: PerspectiveCamera) -> Self {
        Self {
            graph: SceneGraph::new(),
            controls: OrbitControls::new(&camera),
            camera,
            pointer: Vec2::ZERO,
        }
    }

    /// Replace the camera; orbit controls restart from its pose
    pub fn set_camera(&mut self, camera: PerspectiveCamera) {
        let aspect = self.camera.aspect;
        self.camera = camera;
        self.camera.aspect = aspect;
        self.controls = OrbitControls::new(&self.camera);
    }

    /// Move the camera without losing orbit limits
    pub fn move_camera(&mut self, position: Vec3) {
        self.camera.position = position;
        self.controls.sync(&self.camera);
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(PerspectiveCamera::default())
    }
}

/// Shared inputs for building scenes
#[derive(Debug, Clone)]
pub struct SceneContext {
    /// glTF file for the model scenes; `None` skips loading
    pub model_path: Option<PathBuf>,
    pub seed: u32,
    pub particle_count: usize,
    pub ring_count: usize,
    pub star_count: usize,
}

impl Default for SceneContext {
    fn default() -> Self {
        Self {
            model_path: Some(PathBuf::from(crate::config::DEFAULT_MODEL_PATH)),
            seed: 7,
            particle_count: 5_000,
            ring_count: 200_000,
            star_count: 20_000,
        }
    }
}

impl SceneContext {
    /// Start loading the configured model
    pub fn load_model(&self) -> AssetHandle<ModelData> {
        match &self.model_path {
            Some(path) => AssetLoader::new().load(path.clone()),
            None => AssetHandle::from_error(
                "<none>",
                AssetError::Import {
                    path: "<none>".to_string(),
                    reason: "no model path configured".to_string(),
                },
            ),
        }
    }
}

pub trait Scene {
    fn name(&self) -> &'static str;

    /// Declare parameters, bind controls, and build the initial graph
    fn setup(&mut self, store: &mut ParameterStore, panel: &mut ControlPanel, world: &mut World) -> Result<()>;

    /// Apply one queued control edit to the world
    fn apply(&mut self, change: &ParamChange, store: &ParameterStore, world: &mut World) -> Result<()>;

    /// Advance procedural motion for this tick
    fn update(&mut self, state: &AnimationState, store: &ParameterStore, world: &mut World) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum SceneKind {
    Controls,
    Orbits,
    RectLights,
    Directional,
    Particles,
    Model,
    Moon,
    Terrain,
}

impl SceneKind {
    pub const ALL: [SceneKind; 8] = [
        SceneKind::Controls,
        SceneKind::Orbits,
        SceneKind::RectLights,
        SceneKind::Directional,
        SceneKind::Particles,
        SceneKind::Model,
        SceneKind::Moon,
        SceneKind::Terrain,
    ];

    pub fn create(&self, ctx: &SceneContext) -> Box<dyn Scene> {
        match self {
            SceneKind::Controls => Box::new(ControlsScene::new()),
            SceneKind::Orbits => Box::new(OrbitsScene::new()),
            SceneKind::RectLights => Box::new(RectLightsScene::new()),
            SceneKind::Directional => Box::new(DirectionalScene::new()),
            SceneKind::Particles => Box::new(ParticlesScene::new(ctx)),
            SceneKind::Model => Box::new(ModelScene::new(ctx)),
            SceneKind::Moon => Box::new(MoonScene::new(ctx)),
            SceneKind::Terrain => Box::new(TerrainScene::new(ctx)),
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            SceneKind::Controls => "Debug controls",
            SceneKind::Orbits => "Orbiting planes",
            SceneKind::RectLights => "Rect area lights",
            SceneKind::Directional => "Directional light",
            SceneKind::Particles => "Particles",
            SceneKind::Model => "Model viewer",
            SceneKind::Moon => "Moonlit model",
            SceneKind::Terrain => "Land terrain",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_context() -> SceneContext {
        SceneContext {
            model_path: None,
            particle_count: 50,
            ring_count: 200,
            star_count: 100,
            ..SceneContext::default()
        }
    }

    #[test]
    fn every_scene_sets_up_with_consistent_controls() {
        for kind in SceneKind::ALL {
            let mut scene = kind.create(&small_context());
            let mut store = ParameterStore::new();
            let mut panel = ControlPanel::new(kind.title());
            let mut world = World::default();

            scene.setup(&mut store, &mut panel, &mut world).unwrap();

            assert!(!world.graph.is_empty(), "{} built nothing", scene.name());
            for param in store.iter() {
                assert!(panel.binding(param.name()).is_some(), "{} is not bound", param.name());
            }
        }
    }

    #[test]
    fn every_scene_accepts_its_own_defaults() {
        for kind in SceneKind::ALL {
            let mut scene = kind.create(&small_context());
            let mut store = ParameterStore::new();
            let mut panel = ControlPanel::new(kind.title());
            let mut world = World::default();
            scene.setup(&mut store, &mut panel, &mut world).unwrap();

            panel.queue_current_values(&store);
            for change in panel.drain_changes() {
                scene.apply(&change, &store, &mut world).unwrap();
            }
            scene.update(&AnimationState::default(), &store, &mut world).unwrap();
        }
    }

    #[test]
    fn scene_kind_names_are_kebab_case() {
        assert_eq!(serde_json::to_string(&SceneKind::RectLights).unwrap(), "\"rect-lights\"");
    }
}
