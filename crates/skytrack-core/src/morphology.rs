//! Binary thresholding and square closing for blob gating.

use imageproc::contrast::{threshold, ThresholdType};
use imageproc::distance_transform::Norm;
use imageproc::morphology::close;

use crate::{GrayImage, GrayImageView};

/// `255` where the pixel is strictly above `thresh`, `0` elsewhere.
pub fn threshold_binary(src: &GrayImageView<'_>, thresh: u8) -> GrayImage {
    threshold(&src.to_luma(), thresh, ThresholdType::Binary).into()
}

/// Morphological closing (dilate, then erode) with a `size x size` square.
///
/// Even sizes round up to the next odd side. Pixels outside the raster
/// count as background for the dilation and never erode.
pub fn close_rect(src: &GrayImage, size: usize) -> GrayImage {
    if size <= 1 || src.is_empty() {
        return src.clone();
    }
    let k = u8::try_from(size / 2).unwrap_or(u8::MAX);
    close(&src.view().to_luma(), Norm::LInf, k).into()
}
