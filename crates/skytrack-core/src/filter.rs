//! Separable Gaussian smoothing.

use imageproc::filter::separable_filter_equal;

use crate::{FloatImage, GrayImageView};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Normalized 1D Gaussian kernel of odd length `size`.
///
/// A non-positive `sigma` falls back to the size-derived value
/// `0.3 * ((size - 1) * 0.5 - 1) + 0.8`.
pub fn gaussian_kernel(size: usize, sigma: f32) -> Vec<f32> {
    let size = size.max(1) | 1;
    let half = (size / 2) as f32;
    let sigma = if sigma > 0.0 {
        sigma
    } else {
        0.3 * ((size as f32 - 1.0) * 0.5 - 1.0) + 0.8
    };
    let denom = 2.0 * sigma * sigma;
    let mut k: Vec<f32> = (0..size)
        .map(|i| {
            let d = i as f32 - half;
            (-(d * d) / denom).exp()
        })
        .collect();
    let sum: f32 = k.iter().sum();
    for v in &mut k {
        *v /= sum;
    }
    k
}

/// Blur a grayscale raster with a `size x size` Gaussian (replicated borders).
///
/// Both passes run on `f32` samples, so the result is not quantized.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(src), fields(width = src.width, height = src.height))
)]
pub fn gaussian_blur(src: &GrayImageView<'_>, size: usize, sigma: f32) -> FloatImage {
    if src.width == 0 || src.height == 0 {
        return FloatImage::new(src.width, src.height);
    }
    let kernel = gaussian_kernel(size, sigma);
    separable_filter_equal(&src.to_luma_f32(), kernel.as_slice()).into()
}
