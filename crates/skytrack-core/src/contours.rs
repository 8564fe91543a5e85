//! External contour extraction from binary rasters.
//!
//! Suzuki-Abe border following from `imageproc`, keeping only outer borders
//! without a parent: a component inside the hole of another is skipped.

use ::image::{GrayImage as LumaImage, Luma};
use imageproc::contours::{find_contours, BorderType};
use imageproc::point::Point;

use crate::{GrayImage, PixelRect};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Closed boundary in the raster's local coordinates, one point per border
/// pixel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Contour {
    pub points: Vec<Point<i32>>,
}

impl Contour {
    pub fn bounding_rect(&self) -> Option<PixelRect> {
        PixelRect::bounding(self.points.as_slice())
    }
}

/// Outer boundaries of the 8-connected foreground (non-zero) components,
/// ordered by the raster position of each border's first pixel.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(binary), fields(width = binary.width, height = binary.height))
)]
pub fn find_external_contours(binary: &GrayImage) -> Vec<Contour> {
    if binary.is_empty() {
        return Vec::new();
    }
    // Outer borders only start to the right of a background pixel, so the
    // raster gets a one-pixel background frame.
    let (w, h) = (binary.width as u32, binary.height as u32);
    let padded = LumaImage::from_fn(w + 2, h + 2, |x, y| {
        if x == 0 || y == 0 || x > w || y > h {
            Luma([0])
        } else {
            Luma([binary.get(x as usize - 1, y as usize - 1)])
        }
    });

    let contours: Vec<Contour> = find_contours::<i32>(&padded)
        .into_iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
        .map(|c| Contour {
            points: c
                .points
                .into_iter()
                .map(|p| Point::new(p.x - 1, p.y - 1))
                .collect(),
        })
        .collect();
    log::trace!("{} external contours", contours.len());
    contours
}
