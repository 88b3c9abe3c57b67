use std::time::Instant;

use pixops_image::{Image, ImageDtype, ImageError, ImageSize};

use crate::{
    error::KernelError,
    parallel::{self, ExecutionStrategy},
};

/// Lower envelope of the parabolas `(x - v[k])^2 + f(v[k])`.
///
/// `z[k]` is the left boundary of the interval where parabola `k` is the minimum.
#[derive(Debug, Default)]
struct Envelope {
    v: Vec<usize>,
    z: Vec<f64>,
}

/// Per-worker scratch for one line of either pass.
#[derive(Debug, Default)]
struct LineScratch {
    f: Vec<f64>,
    d: Vec<f64>,
    envelope: Envelope,
}

impl LineScratch {
    fn with_len(len: usize) -> Self {
        Self {
            f: vec![0.0; len],
            d: vec![0.0; len],
            envelope: Envelope::default(),
        }
    }
}

/// One-dimensional squared distance transform of a sampled function.
///
/// Computes `d(i) = min_j (i - j)^2 + f(j)` in linear time. Infinite entries never enter
/// the envelope, so a line without finite entries stays at `+inf`.
///
/// # Example
///
/// ```
/// use pixops_imgproc::distance_transform::transform_1d;
///
/// let inf = f64::INFINITY;
/// let d = transform_1d(&[inf, inf, 0.0, inf, inf]);
/// assert_eq!(d, vec![4.0, 1.0, 0.0, 1.0, 4.0]);
/// ```
pub fn transform_1d(f: &[f64]) -> Vec<f64> {
    let mut d = vec![0.0; f.len()];
    transform_1d_into(f, &mut d, &mut Envelope::default());
    d
}

fn transform_1d_into(f: &[f64], d: &mut [f64], envelope: &mut Envelope) {
    let Envelope { v, z } = envelope;
    v.clear();
    z.clear();

    for (q, &fq) in f.iter().enumerate() {
        if !fq.is_finite() {
            continue;
        }
        let qf = q as f64;
        let mut s = f64::NEG_INFINITY;
        while let (Some(&p), Some(&zk)) = (v.last(), z.last()) {
            let pf = p as f64;
            let candidate = ((fq + qf * qf) - (f[p] + pf * pf)) / (2.0 * qf - 2.0 * pf);
            if candidate <= zk {
                v.pop();
                z.pop();
            } else {
                s = candidate;
                break;
            }
        }
        v.push(q);
        z.push(s);
    }

    if v.is_empty() {
        d.fill(f64::INFINITY);
        return;
    }

    let mut k = 0;
    for (q, dq) in d.iter_mut().enumerate() {
        let qf = q as f64;
        while k + 1 < z.len() && z[k + 1] < qf {
            k += 1;
        }
        let p = v[k];
        let diff = qf - p as f64;
        *dq = diff * diff + f[p];
    }
}

#[inline]
fn is_foreground<T: ImageDtype>(x: T) -> bool {
    x.to_f32() > 0.0
}

/// Exact Euclidean distance transform of one `rows x cols` mask.
///
/// `columns` holds the squared column distances between the two passes, one contiguous
/// column after another.
pub(crate) fn distance_transform_slice<T: ImageDtype>(
    src: &[T],
    dst: &mut [f32],
    size: ImageSize,
    columns: &mut Vec<f64>,
    strategy: ExecutionStrategy,
) -> Result<(), KernelError> {
    let (rows, cols) = (size.height, size.width);
    if size.is_empty() {
        return Ok(());
    }

    columns.clear();
    columns.resize(rows * cols, 0.0);

    // both passes share one pool
    strategy.install(|strategy| two_passes(src, dst, size, columns, strategy))?
}

fn two_passes<T: ImageDtype>(
    src: &[T],
    dst: &mut [f32],
    size: ImageSize,
    columns: &mut [f64],
    strategy: ExecutionStrategy,
) -> Result<(), KernelError> {
    let (rows, cols) = (size.height, size.width);
    let start = Instant::now();

    // pass 1: squared distance to the nearest background pixel in the same column
    parallel::for_each_row_mut_init(
        strategy,
        columns,
        rows,
        || LineScratch::with_len(rows),
        |scratch, x, column| {
            for (y, f) in scratch.f.iter_mut().enumerate() {
                *f = if is_foreground(src[y * cols + x]) {
                    f64::INFINITY
                } else {
                    0.0
                };
            }
            transform_1d_into(&scratch.f, column, &mut scratch.envelope);
        },
    )?;

    let pass1 = start.elapsed();

    // pass 2: combine the column distances along each row
    let columns = &*columns;
    parallel::for_each_row_mut_init(
        strategy,
        dst,
        cols,
        || LineScratch::with_len(cols),
        |scratch, y, row| {
            for (x, f) in scratch.f.iter_mut().enumerate() {
                *f = columns[x * rows + y];
            }
            let LineScratch { f, d, envelope } = scratch;
            transform_1d_into(f, d, envelope);
            for (out, &sq) in row.iter_mut().zip(d.iter()) {
                *out = sq.sqrt() as f32;
            }
        },
    )?;

    log::debug!(
        "distance transform {size}: pass 1 {:?}, pass 2 {:?}",
        pass1,
        start.elapsed() - pass1
    );

    Ok(())
}

/// Reusable distance transform that keeps its intermediate buffer between calls.
///
/// Useful when transforming a stream of frames of the same size. The executor holds no
/// state that affects the result.
///
/// # Example
///
/// ```
/// use pixops_image::Image;
/// use pixops_imgproc::distance_transform::DistanceTransformExecutor;
///
/// let mask = Image::<u8, 1>::new([3, 1].into(), vec![0, 1, 1]).unwrap();
/// let mut executor = DistanceTransformExecutor::new();
/// let distances = executor.execute(&mask).unwrap();
/// assert_eq!(distances.as_slice(), &[0.0, 1.0, 2.0]);
/// ```
#[derive(Debug, Default)]
pub struct DistanceTransformExecutor {
    strategy: ExecutionStrategy,
    columns: Vec<f64>,
}

impl DistanceTransformExecutor {
    /// Create an executor using the default execution strategy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an executor using the given execution strategy.
    pub fn with_strategy(strategy: ExecutionStrategy) -> Self {
        Self {
            strategy,
            columns: Vec::new(),
        }
    }

    /// Compute the distance transform into a newly allocated image.
    pub fn execute<T: ImageDtype>(
        &mut self,
        src: &Image<T, 1>,
    ) -> Result<Image<f32, 1>, KernelError> {
        let mut dst = Image::from_size_val(src.size(), 0.0f32)?;
        self.execute_into(src, &mut dst)?;
        Ok(dst)
    }

    /// Compute the distance transform into `dst`, which must have the size of `src`.
    pub fn execute_into<T: ImageDtype>(
        &mut self,
        src: &Image<T, 1>,
        dst: &mut Image<f32, 1>,
    ) -> Result<(), KernelError> {
        if src.size() != dst.size() {
            return Err(ImageError::InvalidImageSize(
                src.cols(),
                src.rows(),
                dst.cols(),
                dst.rows(),
            )
            .into());
        }
        distance_transform_slice(
            src.as_slice(),
            dst.as_slice_mut(),
            src.size(),
            &mut self.columns,
            self.strategy,
        )
    }
}

/// Compute the exact Euclidean distance transform of a binary image.
///
/// A pixel is foreground when its value is greater than zero (`true` for `bool` masks).
/// Each output pixel holds the distance from the pixel center to the nearest background
/// pixel center, so background pixels are `0`.
///
/// Uses the separable lower-envelope algorithm of Felzenszwalb and Huttenlocher: a pass
/// over the columns followed by a pass over the rows.
///
/// # Arguments
///
/// * `src` - The input mask with shape (height, width, 1).
/// * `dst` - The output distances with shape (height, width, 1).
///
/// # Returns
///
/// If the image has no background pixel, every output is `f32::INFINITY`.
///
/// # Example
///
/// ```
/// use pixops_image::Image;
/// use pixops_imgproc::distance_transform::distance_transform;
///
/// let mut mask = Image::<f32, 1>::from_size_val([5, 5].into(), 1.0).unwrap();
/// mask.as_slice_mut()[2 * 5 + 2] = 0.0;
///
/// let mut dst = Image::<f32, 1>::from_size_val(mask.size(), 0.0).unwrap();
/// distance_transform(&mask, &mut dst).unwrap();
///
/// assert_eq!(dst.as_slice()[0], 8f32.sqrt());
/// ```
pub fn distance_transform<T: ImageDtype>(
    src: &Image<T, 1>,
    dst: &mut Image<f32, 1>,
) -> Result<(), KernelError> {
    distance_transform_with(src, dst, ExecutionStrategy::default())
}

/// Same as [`distance_transform`] with an explicit execution strategy.
pub fn distance_transform_with<T: ImageDtype>(
    src: &Image<T, 1>,
    dst: &mut Image<f32, 1>,
    strategy: ExecutionStrategy,
) -> Result<(), KernelError> {
    DistanceTransformExecutor::with_strategy(strategy).execute_into(src, dst)
}

// NOTE: only for testing, extremely slow
/// Brute-force distance transform, quadratic in the number of pixels.
pub fn distance_transform_vanilla<T: ImageDtype>(
    src: &Image<T, 1>,
) -> Result<Image<f32, 1>, KernelError> {
    let (rows, cols) = (src.rows(), src.cols());
    let data = src.as_slice();

    let background: Vec<(usize, usize)> = (0..rows)
        .flat_map(|y| (0..cols).map(move |x| (y, x)))
        .filter(|&(y, x)| !is_foreground(data[y * cols + x]))
        .collect();

    let mut dst = Image::from_size_val(src.size(), 0.0f32)?;
    for (i, out) in dst.as_slice_mut().iter_mut().enumerate() {
        let (y, x) = (i / cols, i % cols);
        let min_sq = background
            .iter()
            .map(|&(by, bx)| y.abs_diff(by).pow(2) + x.abs_diff(bx).pow(2))
            .min();
        *out = match min_sq {
            Some(sq) => (sq as f64).sqrt() as f32,
            None => f32::INFINITY,
        };
    }

    Ok(dst)
}
