//! Benchmarks for the tracking and analytics pipeline

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use crowdwatch::assignment::{associate, GreedySolver, HungarianSolver};
use crowdwatch::bbox::{iou_matrix, Bbox};
use crowdwatch::{CorePipeline, Detection, PipelineConfig};
use ndarray::Array2;
use std::hint::black_box;

fn create_test_frames(n_detections: usize, n_frames: usize) -> Vec<Vec<Detection>> {
    (0..n_frames)
        .map(|frame| {
            (0..n_detections)
                .map(|i| {
                    let x = (frame * 3 + i * 50) as f32;
                    let y = (frame * 2 + i * 30) as f32;
                    Detection::new(x, y, x + 40.0, y + 80.0, 0.8)
                })
                .collect()
        })
        .collect()
}

fn bench_pipeline_update(c: &mut Criterion) {
    let frames = create_test_frames(20, 10);

    c.bench_function("pipeline_update_20_detections", |b| {
        b.iter_batched(
            || CorePipeline::new(PipelineConfig::default()).unwrap(),
            |mut pipeline| {
                for frame in &frames {
                    let _output = pipeline.process_frame(black_box(frame)).unwrap();
                }
            },
            criterion::BatchSize::SmallInput,
        )
    });
}

fn bench_pipeline_various_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline_various_detection_counts");

    for &n_detections in &[5, 10, 20, 50, 100] {
        let frames = create_test_frames(n_detections, 10);

        group.bench_with_input(
            BenchmarkId::new("detections", n_detections),
            &frames,
            |b, frames| {
                b.iter_batched(
                    || CorePipeline::new(PipelineConfig::default()).unwrap(),
                    |mut pipeline| {
                        for frame in frames {
                            let _output = pipeline.process_frame(black_box(frame)).unwrap();
                        }
                    },
                    criterion::BatchSize::SmallInput,
                )
            },
        );
    }
    group.finish();
}

fn bench_iou_matrix(c: &mut Criterion) {
    let detections: Vec<Bbox> = (0..50)
        .map(|i| {
            let x = (i * 4) as f32;
            Bbox::new(x, x, x + 50.0, x + 30.0)
        })
        .collect();
    let tracks: Vec<Bbox> = (0..30)
        .map(|i| {
            let x = (i * 4) as f32 + 0.5;
            Bbox::new(x, x, x + 50.0, x + 30.0)
        })
        .collect();

    c.bench_function("iou_matrix_50x30", |b| {
        b.iter(|| iou_matrix(black_box(&detections), black_box(&tracks)))
    });
}

fn bench_assignment_solvers(c: &mut Criterion) {
    use rand::Rng;
    let mut group = c.benchmark_group("assignment_solvers");

    for &size in &[10, 50, 100] {
        let mut rng = rand::rng();
        let data: Vec<f32> = (0..size * size).map(|_| rng.random_range(0.0..1.0)).collect();
        let iou = Array2::from_shape_vec((size, size), data).unwrap();

        group.bench_with_input(BenchmarkId::new("hungarian", size), &iou, |b, iou| {
            b.iter(|| associate(black_box(iou.view()), 0.3, &HungarianSolver))
        });

        group.bench_with_input(BenchmarkId::new("greedy", size), &iou, |b, iou| {
            b.iter(|| associate(black_box(iou.view()), 0.3, &GreedySolver))
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_pipeline_update,
    bench_pipeline_various_sizes,
    bench_iou_matrix,
    bench_assignment_solvers
);
criterion_main!(benches);
