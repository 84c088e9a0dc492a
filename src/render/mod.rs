//! Rendering seam. A `Renderer` turns the scene graph and camera into output
//! once per tick; what "output" means is up to the implementation.

mod canvas;
mod recording;
mod software;

use anyhow::Result;

use crate::camera::PerspectiveCamera;
use crate::scene::SceneGraph;

pub use canvas::{byte_len, Canvas, DrawOp};
pub use recording::{DrawRecord, RecordingRenderer, RenderedFrame};
pub use software::CanvasRenderer;

pub trait Renderer {
    fn render(&mut self, graph: &SceneGraph, camera: &PerspectiveCamera) -> Result<()>;

    /// Output size changed, in physical pixels
    fn resize(&mut self, _width: u32, _height: u32) {}
}
