use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use pixops_image::Image;
use pixops_imgproc::{
    interpolation::{FillMode, InterpolationMode},
    parallel::ExecutionStrategy,
    warp::{warp_projective_with, Homography, ProjectiveTransformOptions},
};

fn bench_warp_projective(c: &mut Criterion) {
    let mut group = c.benchmark_group("WarpProjective");

    for (width, height) in [(256, 224), (512, 448), (1024, 896)].iter() {
        group.throughput(Throughput::Elements((*width * *height) as u64));

        let parameter_string = format!("{width}x{height}");

        // input image
        let image_size = [*width, *height].into();
        let data = (0..width * height * 3).map(|i| (i % 97) as f32 / 97.0).collect();
        let image = Image::<f32, 3>::new(image_size, data).unwrap();

        // output image
        let output = Image::<f32, 3>::from_size_val(image_size, 0.0).unwrap();
        let m = Homography::rotation(45f32.to_radians(), *width, *height);

        for (mode_name, interpolation) in [
            ("nearest", InterpolationMode::Nearest),
            ("bilinear", InterpolationMode::Bilinear),
        ] {
            let options = ProjectiveTransformOptions::new(interpolation, FillMode::Reflect);
            for (name, strategy) in [
                ("serial", ExecutionStrategy::Serial),
                ("parallel", ExecutionStrategy::Parallel),
            ] {
                group.bench_with_input(
                    BenchmarkId::new(format!("{mode_name}_{name}"), &parameter_string),
                    &(&image, &output),
                    |b, i| {
                        let (src, mut dst) = (i.0, i.1.clone());
                        b.iter(|| {
                            warp_projective_with(
                                black_box(src),
                                black_box(&mut dst),
                                black_box(&m),
                                black_box(&options),
                                strategy,
                            )
                        })
                    },
                );
            }
        }
    }
    group.finish();
}

criterion_group!(benches, bench_warp_projective);
criterion_main!(benches);
