use argh::FromArgs;

use pixops::{
    image::{Image, ImageSize},
    imgproc::{
        color::{self, HsvDelta},
        distance_transform::DistanceTransformExecutor,
        interpolation::{FillMode, InterpolationMode},
        parallel::ExecutionStrategy,
        warp::{self, ProjectiveTransformOptions},
    },
};

#[derive(FromArgs)]
/// Run the color, warp and distance transform kernels on a synthetic image
struct Args {
    /// width and height of the synthetic image
    #[argh(option, short = 's', default = "256")]
    size: usize,

    /// hue rotation in degrees
    #[argh(option, default = "30.0")]
    hue: f32,

    /// saturation factor
    #[argh(option, default = "1.5")]
    saturation: f32,

    /// luma shift in [-1, 1]
    #[argh(option, default = "0.0")]
    value: f32,

    /// rotation angle in degrees
    #[argh(option, short = 'a', default = "30.0")]
    angle: f32,

    /// interpolation mode: nearest or bilinear
    #[argh(option, default = "InterpolationMode::Bilinear")]
    interpolation: InterpolationMode,

    /// fill mode: constant, reflect, wrap or nearest
    #[argh(option, default = "FillMode::Constant")]
    fill: FillMode,

    /// number of worker threads, the global pool when omitted
    #[argh(option, short = 'j')]
    threads: Option<usize>,
}

/// A color gradient with a dark disk in the middle.
fn synthetic_image(size: usize) -> Result<Image<u8, 3>, Box<dyn std::error::Error>> {
    let center = size as f32 / 2.0;
    let radius = size as f32 / 4.0;
    let mut data = Vec::with_capacity(size * size * 3);
    for y in 0..size {
        for x in 0..size {
            let (dx, dy) = (x as f32 + 0.5 - center, y as f32 + 0.5 - center);
            if dx.hypot(dy) < radius {
                data.extend_from_slice(&[16, 16, 16]);
            } else {
                let r = (255 * x / size) as u8;
                let g = (255 * y / size) as u8;
                data.extend_from_slice(&[r, g, 255 - r / 2]);
            }
        }
    }
    Ok(Image::new(
        ImageSize {
            width: size,
            height: size,
        },
        data,
    )?)
}

fn mean(values: impl Iterator<Item = f32>) -> f32 {
    let (sum, n) = values.fold((0.0f64, 0usize), |(s, n), v| (s + v as f64, n + 1));
    if n == 0 {
        0.0
    } else {
        (sum / n as f64) as f32
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    let strategy = match args.threads {
        Some(n) => ExecutionStrategy::Fixed(n),
        None => ExecutionStrategy::Parallel,
    };

    let image = synthetic_image(args.size)?;
    log::info!("synthetic image {}", image.size());

    // color adjustment
    let delta = HsvDelta::new(args.hue.to_radians(), args.saturation, args.value);
    let mut adjusted = Image::<u8, 3>::from_size_val(image.size(), 0)?;
    color::adjust_hsv_with(&image, &mut adjusted, &delta, strategy)?;
    println!(
        "adjust_hsv {:?}: mean {:.2} -> {:.2}",
        delta,
        mean(image.as_slice().iter().map(|&v| v as f32)),
        mean(adjusted.as_slice().iter().map(|&v| v as f32)),
    );

    // projective warp
    let options = ProjectiveTransformOptions::new(args.interpolation, args.fill);
    let mut rotated = Image::<u8, 3>::from_size_val(image.size(), 0)?;
    warp::rotate(&adjusted, &mut rotated, args.angle.to_radians(), &options)?;
    println!(
        "rotate {} deg ({}, {}): mean {:.2}",
        args.angle,
        args.interpolation,
        args.fill,
        mean(rotated.as_slice().iter().map(|&v| v as f32)),
    );

    // distance transform of the pixels brighter than the disk
    let mask = Image::<u8, 1>::new(
        image.size(),
        rotated
            .as_slice()
            .chunks_exact(3)
            .map(|p| u8::from(p.iter().any(|&v| v > 32)))
            .collect(),
    )?;
    let distances = DistanceTransformExecutor::with_strategy(strategy).execute(&mask)?;
    let max = distances
        .as_slice()
        .iter()
        .copied()
        .fold(0.0f32, f32::max);
    println!(
        "distance_transform: max {:.2}, mean {:.2}",
        max,
        mean(distances.as_slice().iter().copied())
    );

    Ok(())
}
