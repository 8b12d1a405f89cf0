use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use weldtoe_core::{
    derive_profile, eval_iterative, eval_least_squares, IterativeConfig, LeastSquaresConfig,
    Profile,
};

/// Noisy tangent-arc fillet, the realistic shape for the iterative search.
fn make_fillet_fixture(radius: f64, flank_deg: f64, dx: f64, sigma: f64, seed: u64) -> Profile {
    let theta = flank_deg.to_radians();
    let x_t = radius * theta.sin();
    let y_t = radius * (1.0 - theta.cos());
    let mut rng = StdRng::seed_from_u64(seed);

    let n = ((x_t + 4.0) / dx).round() as usize + 1;
    let pts: Vec<[f64; 2]> = (0..n)
        .map(|i| {
            let x = -2.0 + i as f64 * dx;
            let y = if x <= 0.0 {
                0.0
            } else if x <= x_t {
                radius - (radius * radius - x * x).sqrt()
            } else {
                y_t + theta.tan() * (x - x_t)
            };
            let noise = if sigma > 0.0 {
                rng.gen_range(-sigma..sigma)
            } else {
                0.0
            };
            [x, y + noise]
        })
        .collect();
    Profile::new(pts).expect("fixture profile is valid")
}

fn bench_derivative(c: &mut Criterion) {
    let profile = make_fillet_fixture(1.0, 30.0, 0.01, 0.0, 5);

    c.bench_function("derive_601pts_nosmooth", |b| {
        b.iter(|| {
            let (g, k) = derive_profile(black_box(&profile), black_box(1.0)).unwrap();
            black_box((g.len(), k.len()))
        })
    });

    c.bench_function("derive_601pts_spline", |b| {
        b.iter(|| {
            let (g, k) = derive_profile(black_box(&profile), black_box(0.9)).unwrap();
            black_box((g.len(), k.len()))
        })
    });
}

fn bench_least_squares(c: &mut Criterion) {
    let profile = make_fillet_fixture(1.0, 30.0, 0.01, 0.0, 5);
    let cfg = LeastSquaresConfig::default();

    c.bench_function("least_squares_601pts", |b| {
        b.iter(|| {
            let res = eval_least_squares(black_box(&profile), black_box(&cfg)).unwrap();
            black_box(res.radius)
        })
    });
}

fn bench_iterative(c: &mut Criterion) {
    let cfg = IterativeConfig::default();
    let clean = make_fillet_fixture(1.0, 30.0, 0.02, 0.0, 5);
    let noisy = make_fillet_fixture(1.0, 30.0, 0.02, 0.002, 9);

    c.bench_function("iterative_search_clean", |b| {
        b.iter(|| {
            let res = eval_iterative(black_box(&clean), black_box(&cfg)).unwrap();
            black_box(res.map(|r| r.radius))
        })
    });

    c.bench_function("iterative_search_noisy", |b| {
        b.iter(|| {
            let res = eval_iterative(black_box(&noisy), black_box(&cfg)).unwrap();
            black_box(res.map(|r| r.radius))
        })
    });
}

criterion_group!(hotpaths, bench_derivative, bench_least_squares, bench_iterative);
criterion_main!(hotpaths);
