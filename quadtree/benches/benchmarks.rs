use criterion::{black_box, criterion_group, criterion_main, Criterion};
use quadtree::quadtree::QuadTree;
use quadtree::shapes::Rectangle;
use rand::prelude::*;

const ENTITIES: usize = 10_000;

fn world() -> Rectangle {
    Rectangle::new(-20000.0, -20000.0, 100000.0, 100000.0)
}

fn random_entities(rng: &mut StdRng) -> Vec<Rectangle> {
    let spawn = Rectangle::new(-20000.0, -20000.0, 40000.0, 40000.0);
    (0..ENTITIES)
        .map(|_| spawn.random_rect_inside(256.0, 256.0, rng))
        .collect()
}

fn rebuild(quadtree: &mut QuadTree<usize>, entities: &[Rectangle]) {
    quadtree.clear();
    for (i, bounds) in entities.iter().enumerate() {
        let handle = quadtree.obtain_item_with(i, *bounds);
        quadtree.insert(handle);
    }
}

fn rebuild_benchmark(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(0);
    let entities = random_entities(&mut rng);
    let mut quadtree = QuadTree::new(world()).unwrap();

    c.bench_function("quadtree_rebuild_10k", |b| {
        b.iter(|| rebuild(&mut quadtree, black_box(&entities)))
    });
}

fn retrieve_benchmark(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(1);
    let entities = random_entities(&mut rng);
    let mut quadtree = QuadTree::new(world()).unwrap();
    rebuild(&mut quadtree, &entities);

    c.bench_function("quadtree_retrieve_camera", |b| {
        b.iter(|| {
            let camera = Rectangle::new(
                rng.gen_range(-20000.0..18080.0),
                rng.gen_range(-20000.0..18920.0),
                1920.0,
                1080.0,
            );
            black_box(quadtree.retrieve(camera).len());
        })
    });
}

fn linear_scan_benchmark(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(1);
    let entities = random_entities(&mut rng);

    c.bench_function("linear_scan_camera", |b| {
        b.iter(|| {
            let camera = Rectangle::new(
                rng.gen_range(-20000.0..18080.0),
                rng.gen_range(-20000.0..18920.0),
                1920.0,
                1080.0,
            );
            black_box(entities.iter().filter(|e| e.overlaps(&camera)).count());
        })
    });
}

fn frame_benchmark(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(2);
    let entities = random_entities(&mut rng);
    let mut quadtree = QuadTree::new(world()).unwrap();
    let camera = Rectangle::new(-960.0, -540.0, 1920.0, 1080.0);

    c.bench_function("quadtree_frame", |b| {
        b.iter(|| {
            rebuild(&mut quadtree, &entities);
            black_box(quadtree.retrieve(camera).len());
        })
    });
}

criterion_group!(
    benches,
    rebuild_benchmark,
    retrieve_benchmark,
    linear_scan_benchmark,
    frame_benchmark
);
criterion_main!(benches);
