use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::Vec3;
use scene_lab::animation::AnimationState;
use scene_lab::controls::ControlPanel;
use scene_lab::params::ParameterStore;
use scene_lab::scenes::{band_wave, ring_wave, ParticlesScene};
use scene_lab::{Scene, SceneContext, World};

fn rest_positions(count: usize) -> Vec<Vec3> {
    (0..count)
        .map(|i| {
            let a = i as f32 * 0.618;
            Vec3::new(a.cos() * 2.0, (i % 7) as f32 * 0.01, a.sin() * 2.0)
        })
        .collect()
}

fn bench_waves(c: &mut Criterion) {
    let mut group = c.benchmark_group("waves");
    for count in [5_000usize, 200_000].iter() {
        let rest = rest_positions(*count);
        let mut out = rest.clone();

        group.bench_with_input(BenchmarkId::new("ring", count), count, |b, _| {
            b.iter(|| ring_wave(black_box(&rest), &mut out, black_box(1.25)));
        });
        group.bench_with_input(BenchmarkId::new("band", count), count, |b, _| {
            b.iter(|| band_wave(black_box(&rest), &mut out, black_box(1.25)));
        });
    }
    group.finish();
}

fn bench_scene_update(c: &mut Criterion) {
    let ctx = SceneContext {
        model_path: None,
        ..SceneContext::default()
    };
    let mut scene = ParticlesScene::new(&ctx);
    let mut store = ParameterStore::new();
    let mut panel = ControlPanel::new("particles");
    let mut world = World::default();
    if let Err(e) = scene.setup(&mut store, &mut panel, &mut world) {
        panic!("particles setup failed: {e:#}");
    }

    let mut state = AnimationState::default();
    c.bench_function("particles_update_205k", |b| {
        b.iter(|| {
            state.elapsed += 1.0 / 60.0;
            scene.update(black_box(&state), &store, &mut world)
        });
    });
}

criterion_group!(benches, bench_waves, bench_scene_update);
criterion_main!(benches);
