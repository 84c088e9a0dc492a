//! Drives one scene: control edits in, animated frames out.
//!
//! A tick drains the panel's change queue through the scene reducer,
//! advances animation time, runs the scene update, and renders. The
//! scheduler decides when a tick is due; a failing tick stops the loop
//! and hands the error back to the caller.

use std::time::Duration;

use anyhow::{Context, Result};

use crate::animation::{AnimationState, LoopState};
use crate::controls::ControlPanel;
use crate::core::{Clock, EveryNTicks, FrameInfo, FrameScheduler, ManualClock, SchedulerError, TimeSource};
use crate::params::{ClampPolicy, ParamError, ParamValue, ParameterStore, Preset, SetOutcome};
use crate::render::Renderer;
use crate::scenes::{Scene, World};

/// Ticks between frame-rate debug lines
const STATS_INTERVAL: u64 = 120;

pub struct SceneRunner<S: TimeSource> {
    scene: Box<dyn Scene>,
    store: ParameterStore,
    panel: ControlPanel,
    world: World,
    scheduler: FrameScheduler,
    clock: Clock<S>,
    animation: AnimationState,
    stats: EveryNTicks,
}

impl<S: TimeSource> SceneRunner<S> {
    /// Set the scene up against a fresh store and panel. The loop starts
    /// stopped.
    pub fn new(mut scene: Box<dyn Scene>, source: S, refresh_hz: f32, policy: ClampPolicy) -> Result<Self> {
        let mut store = ParameterStore::with_policy(policy);
        let mut panel = ControlPanel::new(scene.name());
        let mut world = World::default();
        scene
            .setup(&mut store, &mut panel, &mut world)
            .with_context(|| format!("setting up scene '{}'", scene.name()))?;
        log::info!(
            "scene '{}' ready: {} parameters, {} nodes",
            scene.name(),
            store.len(),
            world.graph.len()
        );

        Ok(Self {
            scene,
            store,
            panel,
            world,
            scheduler: FrameScheduler::new(refresh_hz),
            clock: Clock::new(source),
            animation: AnimationState::default(),
            stats: EveryNTicks::new(STATS_INTERVAL),
        })
    }

    pub fn scene_name(&self) -> &'static str {
        self.scene.name()
    }

    pub fn start(&mut self) -> Result<(), SchedulerError> {
        self.scheduler.start()
    }

    pub fn stop(&mut self) {
        self.scheduler.stop();
    }

    pub fn dispose(&mut self) {
        self.scheduler.dispose();
    }

    pub fn state(&self) -> LoopState {
        self.scheduler.state()
    }

    pub fn store(&self) -> &ParameterStore {
        &self.store
    }

    pub fn panel(&self) -> &ControlPanel {
        &self.panel
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn animation(&self) -> &AnimationState {
        &self.animation
    }

    pub fn scheduler(&self) -> &FrameScheduler {
        &self.scheduler
    }

    pub fn time_to_next_refresh(&self) -> Duration {
        self.scheduler.time_to_next_refresh()
    }

    /// Output size changed, in physical pixels
    pub fn resize(&mut self, width: u32, height: u32) {
        self.world.camera.set_aspect(width, height);
    }

    /// A user edit, as if made on the panel. The scene sees it on the next tick.
    pub fn interact(&mut self, name: &str, value: impl Into<ParamValue>) -> Result<SetOutcome, ParamError> {
        self.panel.interact(&mut self.store, name, value)
    }

    /// Parse `input` with the parameter's own syntax and apply it as an edit
    pub fn set_from_str(&mut self, name: &str, input: &str) -> Result<SetOutcome, ParamError> {
        let value = self.store.spec(name)?.parse_str(name, input)?;
        self.interact(name, value)
    }

    /// Apply each preset entry as an edit. Entries that fail are collected
    /// and the rest still apply.
    pub fn apply_preset(&mut self, preset: &Preset) -> Vec<ParamError> {
        let mut failures = Vec::new();
        for (name, raw) in preset {
            let result = self
                .store
                .spec(name)
                .and_then(|spec| spec.coerce_json(name, raw))
                .and_then(|value| self.panel.interact(&mut self.store, name, value));
            if let Err(e) = result {
                log::warn!("preset entry '{}' skipped: {}", name, e);
                failures.push(e);
            }
        }
        failures
    }

    /// Run a tick if one is due. Returns the frame that ran, if any.
    pub fn poll(&mut self, renderer: &mut dyn Renderer) -> Result<Option<FrameInfo>> {
        let Some(request) = self.scheduler.poll(self.clock.now()) else {
            return Ok(None);
        };
        if request.dropped > 0 {
            log::debug!("tick {} dropped {} refreshes", request.number, request.dropped);
        }

        match self.tick(renderer) {
            Ok(frame) => {
                self.scheduler.request_next_tick();
                if self.stats.tick() {
                    log::debug!(
                        "{}: frame {} at {:.1} fps, {} dropped so far",
                        self.scene.name(),
                        frame.number,
                        frame.fps(),
                        self.scheduler.dropped_frames()
                    );
                }
                Ok(Some(frame))
            }
            Err(e) => {
                log::error!("tick {} of '{}' failed: {:#}", request.number, self.scene.name(), e);
                self.scheduler.stop();
                Err(e)
            }
        }
    }

    fn tick(&mut self, renderer: &mut dyn Renderer) -> Result<FrameInfo> {
        for change in self.panel.drain_changes() {
            log::debug!("apply {} = {}", change.name, change.value);
            self.scene
                .apply(&change, &self.store, &mut self.world)
                .with_context(|| format!("applying change to '{}'", change.name))?;
        }

        let frame = self.clock.tick();
        self.animation.advance(&frame);
        self.scene
            .update(&self.animation, &self.store, &mut self.world)
            .with_context(|| format!("updating '{}'", self.scene.name()))?;

        let World { camera, controls, graph, .. } = &mut self.world;
        controls.update(camera);
        renderer.render(graph, camera).context("rendering frame")?;
        Ok(frame)
    }
}

impl SceneRunner<ManualClock> {
    /// Step simulated time one refresh at a time until `frames` ticks have
    /// run. Starts the loop if needed.
    pub fn run_frames(&mut self, frames: u64, renderer: &mut dyn Renderer) -> Result<u64> {
        self.start()?;
        let step = self.scheduler.refresh_interval();
        let mut ran = 0;
        while ran < frames {
            if self.poll(renderer)?.is_some() {
                ran += 1;
            }
            if !self.scheduler.is_running() {
                break;
            }
            self.clock.source().advance(step);
        }
        Ok(ran)
    }
}
