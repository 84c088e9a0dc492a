//! Windowed front end: a winit event loop that drives a `SceneRunner`,
//! shows its canvas through wgpu, and edits its parameters through egui.

mod gpu;
mod panel;

use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use glam::Vec2;
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use crate::config::ViewerConfig;
use crate::core::SystemTime;
use crate::animation::LoopState;
use crate::render::{CanvasRenderer, Renderer};
use crate::runner::SceneRunner;

use gpu::Gpu;

/// Wheel notches to zoom factor
const WHEEL_ZOOM: f32 = 0.9;
const FPS_SMOOTHING: f32 = 0.1;

struct App {
    config: ViewerConfig,
    runner: SceneRunner<SystemTime>,
    renderer: CanvasRenderer,
    window: Option<Arc<Window>>,
    gpu: Option<Gpu>,
    fps: f32,
    next_refresh: Option<Instant>,
    error: Option<anyhow::Error>,
}

impl App {
    fn new(config: ViewerConfig, runner: SceneRunner<SystemTime>) -> Self {
        Self {
            renderer: CanvasRenderer::new(config.width, config.height),
            config,
            runner,
            window: None,
            gpu: None,
            fps: 0.0,
            next_refresh: None,
            error: None,
        }
    }

    /// Startup and device failures end the event loop
    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        log::error!("{:#}", error);
        self.error = Some(error);
        self.runner.dispose();
        event_loop.exit();
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.renderer.resize(width, height);
        self.runner.resize(width, height);
        if let Some(gpu) = &mut self.gpu {
            gpu.resize(winit::dpi::PhysicalSize::new(width, height));
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(gpu), Some(window)) = (&mut self.gpu, &self.window) else {
            return;
        };

        match self.runner.poll(&mut self.renderer) {
            Ok(Some(frame)) => {
                self.fps += (frame.fps() - self.fps) * FPS_SMOOTHING;
                let (width, height) = self.renderer.dimensions();
                gpu.upload_canvas(self.renderer.pixels(), width, height);
            }
            Ok(None) => {}
            // The runner has logged the error and stopped; the last frame stays up
            Err(_) => log::warn!("scene halted, press Space to resume"),
        }
        self.next_refresh = Some(Instant::now() + self.runner.time_to_next_refresh());

        let mut edits = Vec::new();
        let (show_ui, fps) = (self.config.show_ui, self.fps);
        let runner = &self.runner;
        let result = gpu.render(window, |ctx| {
            panel::show_fps(ctx, fps);
            if show_ui {
                edits = panel::show(ctx, runner.panel(), runner.store());
            }
        });
        match result {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => gpu.reconfigure(),
            Err(wgpu::SurfaceError::OutOfMemory) => {
                self.fail(event_loop, anyhow::anyhow!("GPU out of memory"));
                return;
            }
            Err(e) => log::warn!("render error: {}", e),
        }

        for (name, value) in edits {
            if let Err(e) = self.runner.interact(&name, value) {
                log::warn!("edit to '{}' rejected: {}", name, e);
            }
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window = match event_loop.create_window(
            Window::default_attributes()
                .with_title(format!("scene-lab - {}", self.config.scene.title()))
                .with_inner_size(winit::dpi::PhysicalSize::new(self.config.width, self.config.height)),
        ) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                self.fail(event_loop, anyhow::Error::new(e).context("creating window"));
                return;
            }
        };

        let gpu = match pollster::block_on(Gpu::new(window.clone())) {
            Ok(gpu) => gpu,
            Err(e) => {
                self.fail(event_loop, e.context("initializing the viewer"));
                return;
            }
        };

        let size = window.inner_size();
        self.window = Some(window);
        self.gpu = Some(gpu);
        self.resize(size.width, size.height);

        if let Err(e) = self.runner.start() {
            self.fail(event_loop, e.into());
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        // Let egui handle the event first
        if let (Some(gpu), Some(window)) = (&mut self.gpu, &self.window) {
            if gpu.handle_event(window, &event) {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        ..
                    },
                ..
            } => {
                self.runner.dispose();
                event_loop.exit();
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(KeyCode::Space),
                        repeat: false,
                        ..
                    },
                ..
            } if self.runner.state() == LoopState::Stopped => {
                if let Err(e) = self.runner.start() {
                    log::warn!("cannot resume: {}", e);
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                self.runner.world_mut().controls.process_keyboard(&event);
            }
            WindowEvent::Resized(size) => self.resize(size.width, size.height),
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                let controls = &mut self.runner.world_mut().controls;
                if state.is_pressed() {
                    controls.begin_drag();
                } else {
                    controls.end_drag();
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                let world = self.runner.world_mut();
                world.pointer = Vec2::new(position.x as f32, position.y as f32);
                world.controls.cursor_moved(world.pointer.x, world.pointer.y);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let notches = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(p) => p.y as f32 / 40.0,
                };
                if notches != 0.0 {
                    self.runner.world_mut().controls.zoom(WHEEL_ZOOM.powf(notches));
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        match self.next_refresh {
            Some(at) if Instant::now() < at => event_loop.set_control_flow(ControlFlow::WaitUntil(at)),
            _ => {
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
        }
    }
}

/// Open a window and run until it is closed
pub fn run(config: ViewerConfig, runner: SceneRunner<SystemTime>) -> Result<()> {
    let event_loop = EventLoop::new()?;
    let mut app = App::new(config, runner);

    println!("scene-lab - drag to orbit, wheel or Q/E to zoom, Space to resume after an error, Escape to quit");
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
