use std::path::Path;

use image::{ImageBuffer, Luma};
use imageproc::integral_image::{integral_image, integral_squared_image, sum_image_pixels};
use serde::{Deserialize, Serialize};
use skytrack_core::{GrayImage, GrayImageView, PixelRect};

use crate::detector::clamp_window;
use crate::{Candidate, DetectError, Detector};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Summed-area table with a zero first row and column.
type SumTable = ImageBuffer<Luma<u64>, Vec<u64>>;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateParams {
    /// Minimum normalized correlation (in `[-1, 1]`) for a match.
    pub threshold: f64,
}

impl Default for TemplateParams {
    fn default() -> Self {
        Self { threshold: 0.25 }
    }
}

/// Sliding-window matcher scored by zero-mean normalized cross-correlation.
#[derive(Clone, Debug)]
pub struct TemplateDetector {
    width: usize,
    height: usize,
    /// Template pixels minus their mean.
    centered: Vec<f64>,
    /// Sum of squares of `centered`.
    energy: f64,
    params: TemplateParams,
}

impl TemplateDetector {
    pub fn new(template: GrayImage, params: TemplateParams) -> Result<Self, DetectError> {
        if template.is_empty() {
            return Err(DetectError::EmptyTemplate);
        }
        let n = template.data.len() as f64;
        let mean = template.data.iter().map(|&v| v as f64).sum::<f64>() / n;
        let centered: Vec<f64> = template.data.iter().map(|&v| v as f64 - mean).collect();
        let energy: f64 = centered.iter().map(|v| v * v).sum();
        if energy <= f64::EPSILON {
            return Err(DetectError::FlatTemplate);
        }
        Ok(Self {
            width: template.width,
            height: template.height,
            centered,
            energy,
            params,
        })
    }

    /// Load the template from an image file (converted to 8-bit gray).
    pub fn from_path(path: impl AsRef<Path>, params: TemplateParams) -> Result<Self, DetectError> {
        let img = image::open(path.as_ref())?.to_luma8();
        Self::new(GrayImage::from(img), params)
    }

    pub fn template_size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn params(&self) -> &TemplateParams {
        &self.params
    }

    /// Best placement inside `window`: `(bbox, score)` regardless of the
    /// threshold. `None` when the template does not fit.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip(self, frame))
    )]
    pub fn best_match(&self, frame: &GrayImageView<'_>, window: PixelRect) -> Option<(PixelRect, f64)> {
        let window = clamp_window(frame, window)?;
        let (ww, wh) = (window.width as usize, window.height as usize);
        let (tw, th) = (self.width, self.height);
        if ww < tw || wh < th {
            return None;
        }
        let roi = frame.sub_image(window);
        let luma = roi.view().to_luma();
        let sums: SumTable = integral_image(&luma);
        let squares: SumTable = integral_squared_image(&luma);
        let n = (tw * th) as f64;

        let mut best: Option<(usize, usize, f64)> = None;
        for v in 0..=wh - th {
            for u in 0..=ww - tw {
                let (left, top) = (u as u32, v as u32);
                let (right, bottom) = ((u + tw - 1) as u32, (v + th - 1) as u32);
                let sum = sum_image_pixels(&sums, left, top, right, bottom)[0] as f64;
                let sum_sq = sum_image_pixels(&squares, left, top, right, bottom)[0] as f64;
                let patch_energy = sum_sq - sum * sum / n;
                let score = if patch_energy <= 1e-9 {
                    0.0
                } else {
                    self.cross(&roi, u, v) / (self.energy * patch_energy).sqrt()
                };
                if best.is_none_or(|(_, _, s)| score > s) {
                    best = Some((u, v, score));
                }
            }
        }
        best.map(|(u, v, score)| {
            (
                PixelRect::new(window.x + u as i32, window.y + v as i32, tw as i32, th as i32),
                score,
            )
        })
    }

    /// `sum(T' * I)` over the placement; equals the zero-mean cross term
    /// because `T'` sums to zero.
    fn cross(&self, roi: &GrayImage, u: usize, v: usize) -> f64 {
        let mut acc = 0.0;
        for ty in 0..self.height {
            let row = &roi.data[(v + ty) * roi.width + u..][..self.width];
            let trow = &self.centered[ty * self.width..(ty + 1) * self.width];
            for (&p, &t) in row.iter().zip(trow) {
                acc += t * p as f64;
            }
        }
        acc
    }
}

impl Detector for TemplateDetector {
    fn name(&self) -> &str {
        "template"
    }

    fn detect(&self, frame: &GrayImageView<'_>, window: PixelRect) -> Option<Candidate> {
        let (bbox, score) = self.best_match(frame, window)?;
        log::debug!("template best score {score:.3} at {bbox:?}");
        // A non-positive correlation is never a match, whatever the threshold.
        if score >= self.params.threshold && score > 0.0 {
            Some(Candidate { bbox, score })
        } else {
            None
        }
    }

    fn window_extent(&self) -> (u32, u32) {
        (self.width as u32, self.height as u32)
    }
}
