use criterion::{criterion_group, criterion_main, Criterion};
use runaway_geometry::analytic_field::{circular_tokamak, uniform_radii};
use runaway_geometry::averager::FluxSurfaceAverager;
use runaway_types::settings::{AveragerSettings, FluxGrid, QuadratureMethod};

fn bench_averaging(c: &mut Criterion) {
    let (r, r_f) = uniform_radii(16, 0.9);
    let field = circular_tokamak(&r, &r_f, 3.0, 2.3, 129, true);
    let fixed = FluxSurfaceAverager::new(field.clone(), AveragerSettings::default()).unwrap();
    let adaptive = FluxSurfaceAverager::new(
        field,
        AveragerSettings {
            quadrature: QuadratureMethod::Adaptive,
            ..Default::default()
        },
    )
    .unwrap();

    c.bench_function("fsa_fixed_all_radii", |b| {
        b.iter(|| {
            let mut acc = 0.0;
            for ir in 0..16 {
                acc += fixed
                    .calculate_flux_surface_average(ir, FluxGrid::Distribution, |bb, r, _| {
                        bb * bb / r
                    })
                    .unwrap();
            }
            acc
        })
    });

    c.bench_function("fsa_adaptive_all_radii", |b| {
        b.iter(|| {
            let mut acc = 0.0;
            for ir in 0..16 {
                acc += adaptive
                    .calculate_flux_surface_average(ir, FluxGrid::Distribution, |bb, r, _| {
                        bb * bb / r
                    })
                    .unwrap();
            }
            acc
        })
    });

    c.bench_function("bounce_integral_trapped", |b| {
        b.iter(|| {
            fixed
                .evaluate_p_xi_bounce_integral_at_p(8, 1.0, 0.2, FluxGrid::Distribution, |x, bb, _, _| {
                    x * bb
                })
                .unwrap()
        })
    });
}

criterion_group!(benches, bench_averaging);
criterion_main!(benches);
