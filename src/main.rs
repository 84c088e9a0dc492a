use anyhow::{Context, Result};
use clap::Parser;

use scene_lab::cli::Cli;
use scene_lab::config::ViewerConfig;
use scene_lab::core::{ManualClock, SystemTime, TimeSource};
use scene_lab::render::CanvasRenderer;
use scene_lab::runner::SceneRunner;
use scene_lab::scenes::SceneKind;
use scene_lab::viewer;

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    if cli.list_scenes {
        for kind in SceneKind::ALL {
            let name = clap::ValueEnum::to_possible_value(&kind)
                .map(|v| v.get_name().to_string())
                .unwrap_or_default();
            println!("{:<12} {}", name, kind.title());
        }
        return Ok(());
    }

    let config = ViewerConfig::from_cli(&cli)?;

    if cli.headless {
        let mut runner = build_runner(&cli, &config, ManualClock::new())?;
        let mut renderer = CanvasRenderer::new(config.width, config.height);
        runner.resize(config.width, config.height);

        let ran = runner.run_frames(cli.frames, &mut renderer)?;
        let world = runner.world();
        println!(
            "{}: {} frames over {:.2}s simulated, {} nodes ({} meshes), {} dropped",
            runner.scene_name(),
            ran,
            runner.animation().elapsed,
            world.graph.len(),
            world.graph.mesh_count(),
            runner.scheduler().dropped_frames()
        );
        return Ok(());
    }

    let runner = build_runner(&cli, &config, SystemTime::new())?;
    viewer::run(config, runner)
}

/// Set the configured scene up and apply the preset and `--set` values
fn build_runner<S: TimeSource>(cli: &Cli, config: &ViewerConfig, time: S) -> Result<SceneRunner<S>> {
    let scene = config.scene.create(&config.scene_context());
    let mut runner = SceneRunner::new(scene, time, config.fps, config.clamp_policy)?;

    if let Some(preset) = config.load_preset()? {
        let failures = runner.apply_preset(&preset);
        if !failures.is_empty() {
            println!("preset: {} entries skipped", failures.len());
        }
    }
    for (name, value) in &cli.set {
        runner
            .set_from_str(name, value)
            .with_context(|| format!("--set {name}={value}"))?;
    }
    Ok(runner)
}
