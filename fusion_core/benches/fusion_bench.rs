use criterion::{black_box, criterion_group, criterion_main, Criterion};
use fusion_core::types::{DataPoint, SensorReading};
use fusion_core::{FusionConfig, FusionEkf};

/// Synthetic alternating lidar/radar stream for a target on a straight
/// 20 m/s course, one measurement every 50 ms.
fn make_stream(n: usize) -> Vec<DataPoint> {
    (0..n)
        .map(|i| {
            let t = i as u64 * 50_000;
            let x = 100.0 + 20.0 * (t as f64 / 1e6);
            let y = 50.0;
            if i % 2 == 0 {
                DataPoint::new(t, SensorReading::Lidar { x, y })
            } else {
                let rho = (x * x + y * y).sqrt();
                let phi = y.atan2(x);
                let drho = 20.0 * x / rho;
                DataPoint::new(t, SensorReading::Radar { rho, phi, drho })
            }
        })
        .collect()
}

fn bench_fusion(c: &mut Criterion) {
    let mut group = c.benchmark_group("fusion");

    for n in [100, 1_000, 10_000] {
        let stream = make_stream(n);
        group.bench_function(format!("{n}_measurements"), |b| {
            b.iter(|| {
                let mut ekf = FusionEkf::new(FusionConfig::default());
                for dp in &stream {
                    ekf.process(dp).unwrap();
                }
                black_box(ekf.get().copied())
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_fusion);
criterion_main!(benches);
