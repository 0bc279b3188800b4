use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use quadsample::{BoundingBox, FnEvaluator, NodeArena, Point, QuadTree, RandomLabel, Result, TreeConfig, sample_interior};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn ring(bounds: &BoundingBox, seed: u64) -> Result<Point> {
    let mut rng = StdRng::seed_from_u64(seed);
    let (x, y) = sample_interior(bounds, &mut rng)?;
    let r2 = (x - 0.5).powi(2) + (y - 0.5).powi(2);
    Ok(Point::new(x, y, if r2 < 0.1 { 1.0 } else { 0.0 }))
}

fn benchmark_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("refinement");
    group.sample_size(20);

    for max_depth in [5u32, 6, 7] {
        group.bench_with_input(BenchmarkId::new("ring", max_depth), &max_depth, |b, &max_depth| {
            b.iter(|| {
                let config = TreeConfig { max_depth, seed: Some(3), ..Default::default() };
                let mut tree = QuadTree::new(config, FnEvaluator(ring)).unwrap();
                tree.run().unwrap();
                tree.node_count()
            })
        });

        group.bench_with_input(BenchmarkId::new("random", max_depth), &max_depth, |b, &max_depth| {
            b.iter(|| {
                let config = TreeConfig { max_depth, seed: Some(3), ..Default::default() };
                let mut tree = QuadTree::new(config, RandomLabel).unwrap();
                tree.run().unwrap();
                tree.node_count()
            })
        });
    }
    group.finish();
}

fn benchmark_split(c: &mut Criterion) {
    c.bench_function("split_depth_8", |b| {
        b.iter(|| {
            let mut arena = NodeArena::new();
            let root = arena.add_root(BoundingBox::default(), 1);
            let mut frontier = vec![root];
            for _ in 1..8 {
                let mut next = Vec::with_capacity(frontier.len() * 4);
                for id in frontier {
                    arena.split(id);
                    next.extend(arena.children(id).into_iter().flatten());
                }
                frontier = next;
            }
            arena.len()
        })
    });
}

criterion_group!(benches, benchmark_run, benchmark_split);
criterion_main!(benches);
