use std::fs;

use criterion::{criterion_group, criterion_main, Criterion};

use earclip::Earcut;

fn load_fixture(name: &str) -> (Vec<f64>, Vec<usize>) {
    // load JSON
    type Coords = Vec<Vec<[f64; 2]>>;
    let s = fs::read_to_string("./tests/fixtures/".to_string() + name + ".json").unwrap();
    let rings = serde_json::from_str::<Coords>(&s).unwrap();

    // prepare input
    let num_rings = rings.len();
    let data: Vec<_> = rings.iter().flatten().flatten().copied().collect();
    let hole_indices: Vec<_> = rings
        .iter()
        .map(|x| x.len())
        .scan(0, |sum, e| {
            *sum += e;
            Some(*sum)
        })
        .take(num_rings - 1)
        .collect();

    (data, hole_indices)
}

fn bench(c: &mut Criterion) {
    let mut earcut = Earcut::new();
    let mut triangles = Vec::new();

    for (name, num_triangles) in [
        ("star", 94),
        ("circle-holes", 136),
        ("comb", 121),
        ("circle-square-holes", 2086),
    ] {
        let (data, hole_indices) = load_fixture(name);

        c.bench_function(name, |b| {
            b.iter(|| {
                earcut
                    .earcut(&data, &hole_indices, 2, &mut triangles)
                    .unwrap();
                assert_eq!(triangles.len(), num_triangles * 3)
            })
        });
    }

    // same inputs through the z-order index regardless of size
    let mut hashed = Earcut::with_hash_threshold(0);
    c.bench_function("comb-hashed", |b| {
        let (data, hole_indices) = load_fixture("comb");
        b.iter(|| {
            hashed
                .earcut(&data, &hole_indices, 2, &mut triangles)
                .unwrap();
        })
    });
}

criterion_group!(benches, bench);
criterion_main!(benches);
