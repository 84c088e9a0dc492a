use std::f32::consts::TAU;

use approx::assert_relative_eq;
use scene_lab::animation::{bounce, LoopState};
use scene_lab::core::ManualClock;
use scene_lab::params::{ClampPolicy, ParamError, ParamValue};
use scene_lab::render::RecordingRenderer;
use scene_lab::{SceneContext, SceneKind, SceneRunner};

fn context() -> SceneContext {
    SceneContext {
        model_path: None,
        particle_count: 200,
        ring_count: 500,
        star_count: 100,
        ..SceneContext::default()
    }
}

fn runner(kind: SceneKind) -> (SceneRunner<ManualClock>, ManualClock) {
    let clock = ManualClock::new();
    let runner = SceneRunner::new(kind.create(&context()), clock.clone(), 60.0, ClampPolicy::Clamp).unwrap();
    (runner, clock)
}

// ============================================================================
// Control edits reach the rendered frame
// ============================================================================

#[test]
fn test_size_edit_scales_the_mesh() {
    let (mut runner, _clock) = runner(SceneKind::Controls);
    let mut renderer = RecordingRenderer::new();

    runner.interact("size", 0.1).unwrap();
    runner.run_frames(1, &mut renderer).unwrap();

    let shape = renderer.last().unwrap().find("shape").unwrap();
    assert_relative_eq!(shape.scale().x, 0.1, epsilon = 1e-5);
    assert_relative_eq!(shape.scale().z, 0.1, epsilon = 1e-5);
}

#[test]
fn test_hidden_mesh_is_not_drawn() {
    let (mut runner, _clock) = runner(SceneKind::Controls);
    let mut renderer = RecordingRenderer::new();

    runner.interact("visible", false).unwrap();
    runner.run_frames(1, &mut renderer).unwrap();
    assert!(renderer.last().unwrap().find("shape").is_none());

    runner.interact("visible", true).unwrap();
    runner.run_frames(1, &mut renderer).unwrap();
    assert!(renderer.last().unwrap().find("shape").is_some());
}

#[test]
fn test_shape_switch_replaces_the_mesh() {
    let (mut runner, _clock) = runner(SceneKind::Controls);
    let mut renderer = RecordingRenderer::new();
    let nodes_before = runner.world().graph.len();

    runner.interact("size", 0.5).unwrap();
    runner.interact("shape", "sphere").unwrap();
    runner.run_frames(1, &mut renderer).unwrap();

    let frame = renderer.last().unwrap();
    assert_eq!(frame.count_named("shape"), 1);
    let shape = frame.find("shape").unwrap();
    assert_eq!(shape.geometry, Some("sphere"));
    assert_relative_eq!(shape.scale().y, 0.5, epsilon = 1e-5);
    assert_eq!(runner.world().graph.len(), nodes_before);
}

#[test]
fn test_background_and_color_edits() {
    let (mut runner, _clock) = runner(SceneKind::Controls);
    let mut renderer = RecordingRenderer::new();

    runner.set_from_str("background", "#102030").unwrap();
    runner.set_from_str("color", "#ff8800").unwrap();
    runner.run_frames(1, &mut renderer).unwrap();

    let frame = renderer.last().unwrap();
    assert_eq!(frame.background.to_hex(), 0x102030);
    assert_eq!(frame.find("shape").unwrap().color.to_hex(), 0xff8800);
}

// ============================================================================
// Animation
// ============================================================================

#[test]
fn test_rotation_advances_once_per_tick() {
    let (mut runner, _clock) = runner(SceneKind::Controls);
    let mut renderer = RecordingRenderer::new();
    runner.interact("animation", "rotate").unwrap();

    let ticks = 700;
    runner.run_frames(ticks, &mut renderer).unwrap();

    let id = runner.world().graph.find_by_name("shape").unwrap();
    let rotation = runner.world().graph.node(id).unwrap().transform.rotation;
    let expected = (ticks as f32 * 0.01).rem_euclid(TAU);
    assert_relative_eq!(rotation.x, expected, epsilon = 1e-3);
    assert_relative_eq!(rotation.y, expected, epsilon = 1e-3);
}

#[test]
fn test_bounce_depends_only_on_elapsed_time() {
    let (mut runner, _clock) = runner(SceneKind::Controls);
    let mut renderer = RecordingRenderer::new();
    runner.interact("animation", "bounce").unwrap();
    runner.run_frames(30, &mut renderer).unwrap();

    let elapsed = runner.animation().elapsed;
    let frame = renderer.last().unwrap();
    assert_relative_eq!(
        frame.find("shape").unwrap().position().y,
        bounce(elapsed, 2.0, 2.0),
        epsilon = 1e-5
    );
}

#[test]
fn test_leaving_bounce_restores_height() {
    let (mut runner, _clock) = runner(SceneKind::Controls);
    let mut renderer = RecordingRenderer::new();
    runner.interact("posY", 1.5).unwrap();
    runner.interact("animation", "bounce").unwrap();
    runner.run_frames(10, &mut renderer).unwrap();

    runner.interact("animation", "none").unwrap();
    runner.run_frames(1, &mut renderer).unwrap();
    assert_relative_eq!(renderer.last().unwrap().find("shape").unwrap().position().y, 1.5);
}

// ============================================================================
// Loop lifecycle
// ============================================================================

#[test]
fn test_stop_and_resume() {
    let (mut runner, clock) = runner(SceneKind::Orbits);
    let mut renderer = RecordingRenderer::new();
    runner.run_frames(3, &mut renderer).unwrap();

    runner.stop();
    assert_eq!(runner.state(), LoopState::Stopped);
    for _ in 0..5 {
        clock.advance_secs(0.1);
        assert!(runner.poll(&mut renderer).unwrap().is_none());
    }
    assert_eq!(renderer.frame_count(), 3);

    runner.start().unwrap();
    assert!(runner.poll(&mut renderer).unwrap().is_some());
    assert_eq!(renderer.frame_count(), 4);
}

#[test]
fn test_disposed_runner_cannot_restart() {
    let (mut runner, _clock) = runner(SceneKind::Orbits);
    runner.dispose();
    assert!(runner.start().is_err());
    assert_eq!(runner.state(), LoopState::Disposed);
}

#[test]
fn test_render_failure_halts_the_loop() {
    let (mut runner, _clock) = runner(SceneKind::Particles);
    let mut renderer = RecordingRenderer::failing_on(2);

    let err = runner.run_frames(10, &mut renderer).unwrap_err();
    assert!(format!("{err:#}").contains("render failed"));
    assert_eq!(runner.state(), LoopState::Stopped);
    assert_eq!(renderer.frame_count(), 2);
}

#[test]
fn test_edits_while_stopped_apply_on_resume() {
    let (mut runner, _clock) = runner(SceneKind::Controls);
    let mut renderer = RecordingRenderer::new();
    runner.run_frames(1, &mut renderer).unwrap();
    runner.stop();

    runner.interact("wireframe", false).unwrap();
    runner.run_frames(1, &mut renderer).unwrap();
    assert!(!renderer.last().unwrap().find("shape").unwrap().wireframe);
}

// ============================================================================
// Parameter bounds through the runner
// ============================================================================

#[test]
fn test_out_of_range_edit_is_clamped() {
    let (mut runner, _clock) = runner(SceneKind::Controls);
    let outcome = runner.interact("size", 40.0).unwrap();
    assert_eq!(outcome.clamped_from, Some(40.0));
    assert_eq!(runner.store().number("size").unwrap(), 1.5);
}

#[test]
fn test_reject_policy_keeps_the_old_value() {
    let clock = ManualClock::new();
    let mut runner =
        SceneRunner::new(SceneKind::Controls.create(&context()), clock, 60.0, ClampPolicy::Reject).unwrap();

    let err = runner.interact("size", -3.0).unwrap_err();
    assert!(matches!(err, ParamError::OutOfRange { .. }));
    assert_eq!(runner.store().number("size").unwrap(), 1.0);
    assert_eq!(runner.panel().pending_changes(), 0);
}

#[test]
fn test_unknown_choice_is_rejected() {
    let (mut runner, _clock) = runner(SceneKind::Controls);
    let err = runner.interact("shape", "dodecahedron").unwrap_err();
    assert!(matches!(err, ParamError::InvalidChoice { .. }));
    assert_eq!(runner.store().choice("shape").unwrap(), "cube");
}

#[test]
fn test_unchanged_value_queues_nothing() {
    let (mut runner, _clock) = runner(SceneKind::Controls);
    let outcome = runner.interact("size", 1.0).unwrap();
    assert!(!outcome.changed);
    assert_eq!(runner.panel().pending_changes(), 0);
}

#[test]
fn test_action_toggles_visibility_each_press() {
    let (mut runner, _clock) = runner(SceneKind::Directional);
    let mut renderer = RecordingRenderer::new();

    runner.interact("visibleToggle", ParamValue::Trigger).unwrap();
    runner.run_frames(1, &mut renderer).unwrap();
    assert!(renderer.last().unwrap().find("sphere").is_none());

    runner.interact("visibleToggle", ParamValue::Trigger).unwrap();
    runner.run_frames(1, &mut renderer).unwrap();
    assert!(renderer.last().unwrap().find("sphere").is_some());
}

// ============================================================================
// Every scene
// ============================================================================

#[test]
fn test_every_scene_runs_headless() {
    for kind in SceneKind::ALL {
        let (mut runner, _clock) = runner(kind);
        let mut renderer = RecordingRenderer::keep_last(1);
        let ran = runner.run_frames(5, &mut renderer).unwrap();
        assert_eq!(ran, 5, "{kind:?}");
        assert!(!renderer.last().unwrap().draws.is_empty(), "{kind:?}");
    }
}

#[test]
fn test_model_scenes_run_without_a_model() {
    for kind in [SceneKind::Model, SceneKind::Moon] {
        let (mut runner, _clock) = runner(kind);
        let mut renderer = RecordingRenderer::new();
        runner.interact("model.scale", 1.0).unwrap();
        runner.run_frames(3, &mut renderer).unwrap();
        assert!(renderer.last().unwrap().find("vecna").is_none());
    }
}
