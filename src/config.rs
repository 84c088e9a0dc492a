//! Viewer configuration: a JSON file, overridden by command-line flags.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::cli::Cli;
use crate::params::{ClampPolicy, Preset};
use crate::scenes::{SceneContext, SceneKind};

pub const DEFAULT_MODEL_PATH: &str = "assets/models/scene.gltf";

/// Environment variable that replaces `DEFAULT_MODEL_PATH`
pub const MODEL_ENV: &str = "SCENE_LAB_MODEL";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub scene: SceneKind,
    pub width: u32,
    pub height: u32,
    pub fps: f32,
    pub model: Option<PathBuf>,
    pub preset: Option<PathBuf>,
    pub clamp_policy: ClampPolicy,
    pub show_ui: bool,
    pub seed: u32,
    pub particle_count: usize,
    pub ring_count: usize,
    pub star_count: usize,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        let scene = SceneContext::default();
        Self {
            scene: SceneKind::Controls,
            width: 800,
            height: 600,
            fps: 60.0,
            model: None,
            preset: None,
            clamp_policy: ClampPolicy::default(),
            show_ui: true,
            seed: scene.seed,
            particle_count: scene.particle_count,
            ring_count: scene.ring_count,
            star_count: scene.star_count,
        }
    }
}

impl ViewerConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    /// File from `--config` (if any), then every flag that was given
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let mut config = match &cli.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.apply_overrides(cli);
        Ok(config)
    }

    pub fn apply_overrides(&mut self, cli: &Cli) {
        if let Some(scene) = cli.scene {
            self.scene = scene;
        }
        if let Some(width) = cli.width {
            self.width = width;
        }
        if let Some(height) = cli.height {
            self.height = height;
        }
        if let Some(fps) = cli.fps {
            self.fps = fps;
        }
        if let Some(model) = &cli.model {
            self.model = Some(model.clone());
        }
        if let Some(preset) = &cli.preset {
            self.preset = Some(preset.clone());
        }
        if let Some(policy) = cli.clamp_policy {
            self.clamp_policy = policy;
        }
        if cli.no_ui {
            self.show_ui = false;
        }
    }

    /// Model path: explicit setting, then the environment, then the default
    pub fn model_path(&self) -> PathBuf {
        self.model
            .clone()
            .or_else(|| std::env::var_os(MODEL_ENV).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MODEL_PATH))
    }

    pub fn scene_context(&self) -> SceneContext {
        SceneContext {
            model_path: Some(self.model_path()),
            seed: self.seed,
            particle_count: self.particle_count,
            ring_count: self.ring_count,
            star_count: self.star_count,
        }
    }

    pub fn load_preset(&self) -> Result<Option<Preset>> {
        self.preset.as_deref().map(load_preset).transpose()
    }
}

pub fn load_preset(path: &Path) -> Result<Preset> {
    let text = fs::read_to_string(path).with_context(|| format!("reading preset {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing preset {}", path.display()))
}
