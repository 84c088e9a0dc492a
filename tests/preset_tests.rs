use std::fs;
use std::path::PathBuf;

use scene_lab::config::{load_preset, ViewerConfig};
use scene_lab::core::ManualClock;
use scene_lab::params::ClampPolicy;
use scene_lab::render::RecordingRenderer;
use scene_lab::{SceneContext, SceneKind, SceneRunner};

fn temp_file(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("scene-lab-{}-{}", std::process::id(), name));
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_preset_file_drives_the_scene() {
    let path = temp_file(
        "rect.json",
        r##"{ "intensity2": 7.5, "color3": "#00ff00", "wireframe": true, "roughness": "rough" }"##,
    );
    let preset = load_preset(&path).unwrap();
    fs::remove_file(&path).ok();

    let ctx = SceneContext {
        model_path: None,
        ..SceneContext::default()
    };
    let mut runner =
        SceneRunner::new(SceneKind::RectLights.create(&ctx), ManualClock::new(), 60.0, ClampPolicy::Clamp).unwrap();
    let failures = runner.apply_preset(&preset);
    assert_eq!(failures.len(), 1);

    let mut renderer = RecordingRenderer::new();
    runner.run_frames(1, &mut renderer).unwrap();

    let graph = &runner.world().graph;
    let red = graph.node(graph.find_by_name("rectLight2").unwrap()).unwrap();
    assert_eq!(red.as_light().unwrap().intensity, 7.5);
    let blue = graph.node(graph.find_by_name("rectLight3").unwrap()).unwrap();
    assert_eq!(blue.as_light().unwrap().color.to_hex(), 0x00ff00);
    assert!(renderer.last().unwrap().find("knot").unwrap().wireframe);
}

#[test]
fn test_config_file_round_trips_through_the_loader() {
    let path = temp_file(
        "viewer.json",
        r#"{ "scene": "particles", "fps": 30, "ring_count": 1000, "show_ui": false }"#,
    );
    let config = ViewerConfig::load(&path).unwrap();
    fs::remove_file(&path).ok();

    assert_eq!(config.scene, SceneKind::Particles);
    assert_eq!(config.scene_context().ring_count, 1000);
    assert!(!config.show_ui);
}

#[test]
fn test_malformed_preset_is_an_error() {
    let path = temp_file("broken.json", "{ not json");
    let result = load_preset(&path);
    fs::remove_file(&path).ok();
    assert!(result.is_err());
}
