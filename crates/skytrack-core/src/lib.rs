//! Core raster types and imaging primitives for ROI-gated object tracking.
//!
//! This crate provides:
//! - an owned/borrowed grayscale raster (`GrayImage`, `GrayImageView`) with
//!   copies into `image` buffers,
//! - integer pixel geometry (`PixelPoint`, `PixelRect`),
//! - the classical stages of the contour detector: Gaussian blur, Canny
//!   edges, external contours, Douglas-Peucker approximation and a
//!   convexity test,
//! - binary thresholding and morphological closing for blob gating.
//!
//! Blur, contour following, polygon approximation and morphology run on
//! `imageproc`. Canny is implemented here because it consumes the already
//! smoothed `f32` raster. File decoding lives in the `skytrack` facade.

mod contours;
mod edges;
mod filter;
mod geometry;
mod logger;
mod morphology;
mod polygon;
mod raster;

pub use contours::{find_external_contours, Contour};
pub use edges::{canny, sobel_gradients, Gradients};
pub use filter::{gaussian_blur, gaussian_kernel};
pub use geometry::{PixelPoint, PixelRect};
pub use imageproc::point::Point;
pub use morphology::{close_rect, threshold_binary};
pub use polygon::{approx_closed, is_convex};
pub use raster::{FloatImage, GrayImage, GrayImageView};

#[cfg(feature = "tracing")]
pub use logger::{default_directives, init_tracing};

pub use logger::init_with_level;
