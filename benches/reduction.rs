use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ndarray::Array;
use ndarray_rand::rand_distr::Normal;
use ndarray_rand::RandomExt;
use pathfold::net::network::Network;
use pathfold::prune::WeightPruner;
use pathfold::reduce::{firing_path, reduce, reduce_batch};
use rand::rngs::StdRng;
use rand::SeedableRng;

pub fn reduce_single(c: &mut Criterion) {
    let mut group = c.benchmark_group("reduce");
    group.sample_size(500);

    let mut rng = StdRng::seed_from_u64(42);
    let network = Network::<f32>::random(&[64, 128, 128, 64, 1], &mut rng).unwrap();
    let x = Array::random_using(64, Normal::new(0f32, 1f32).unwrap(), &mut rng);

    group.bench_function("firing path", |b| {
        b.iter(|| firing_path(&network, black_box(&x)).unwrap())
    });

    group.bench_function("reduce 64-128-128-64-1", |b| {
        b.iter(|| reduce(&network, black_box(&x)).unwrap())
    });
}

pub fn reduce_many(c: &mut Criterion) {
    let mut group = c.benchmark_group("reduce-batch");
    group.sample_size(50);

    let mut rng = StdRng::seed_from_u64(7);
    let network = Network::<f32>::random(&[16, 32, 32, 1], &mut rng).unwrap();
    let xs = Array::random_using((256, 16), Normal::new(0f32, 1f32).unwrap(), &mut rng);

    group.bench_function("reduce batch 256", |b| {
        b.iter(|| reduce_batch(&network, black_box(&xs)).unwrap())
    });
}

pub fn prune_first_layer(c: &mut Criterion) {
    let mut group = c.benchmark_group("prune");
    group.sample_size(500);

    let mut rng = StdRng::seed_from_u64(3);
    let network = Network::<f32>::random(&[256, 128, 1], &mut rng).unwrap();
    let pruner = WeightPruner::default();

    group.bench_function("column mask 256x128", |b| {
        b.iter(|| pruner.column_mask(black_box(network.layers()[0].func())))
    });
}

criterion_group!(benches, reduce_single, reduce_many, prune_first_layer);
criterion_main!(benches);
