pub mod animation;
pub mod camera;
pub mod cli;
pub mod config;
pub mod controls;
pub mod core;
pub mod geometry;
pub mod loaders;
pub mod math;
pub mod params;
pub mod render;
pub mod runner;
pub mod scene;
pub mod scenes;
pub mod viewer;

pub use runner::SceneRunner;
pub use scenes::{Scene, SceneContext, SceneKind, World};
