//! Owned and borrowed 8-bit rasters, plus conversions to `image` buffers
//! for the `imageproc` stages.

use ::image::{ImageBuffer, Luma};

use crate::PixelRect;

#[derive(Clone, Copy, Debug)]
pub struct GrayImageView<'a> {
    pub width: usize,
    pub height: usize,
    pub data: &'a [u8], // row-major, len = w*h
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GrayImage {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

/// Row-major `f32` raster used between filter stages.
#[derive(Clone, Debug)]
pub struct FloatImage {
    pub width: usize,
    pub height: usize,
    pub data: Vec<f32>,
}

impl<'a> GrayImageView<'a> {
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.width + x]
    }

    /// Full-frame rectangle of this view.
    #[inline]
    pub fn bounds(&self) -> PixelRect {
        PixelRect::full(self.width, self.height)
    }

    /// Copy the pixels of `rect` into an owned image.
    ///
    /// `rect` must lie inside the view.
    pub fn sub_image(&self, rect: PixelRect) -> GrayImage {
        debug_assert!(self.bounds().contains_rect(&rect));
        let x0 = rect.x as usize;
        let y0 = rect.y as usize;
        let w = rect.width as usize;
        let h = rect.height as usize;
        let mut data = Vec::with_capacity(w * h);
        for y in y0..y0 + h {
            let row = y * self.width;
            data.extend_from_slice(&self.data[row + x0..row + x0 + w]);
        }
        GrayImage {
            width: w,
            height: h,
            data,
        }
    }

    /// Copy into an `image` buffer.
    pub fn to_luma(&self) -> ::image::GrayImage {
        ImageBuffer::from_fn(self.width as u32, self.height as u32, |x, y| {
            Luma([self.get(x as usize, y as usize)])
        })
    }

    /// Copy into an `f32` buffer for filtering without intermediate rounding.
    pub fn to_luma_f32(&self) -> ImageBuffer<Luma<f32>, Vec<f32>> {
        ImageBuffer::from_fn(self.width as u32, self.height as u32, |x, y| {
            Luma([self.get(x as usize, y as usize) as f32])
        })
    }
}

impl From<::image::GrayImage> for GrayImage {
    fn from(img: ::image::GrayImage) -> Self {
        Self {
            width: img.width() as usize,
            height: img.height() as usize,
            data: img.into_raw(),
        }
    }
}

impl From<ImageBuffer<Luma<f32>, Vec<f32>>> for FloatImage {
    fn from(img: ImageBuffer<Luma<f32>, Vec<f32>>) -> Self {
        Self {
            width: img.width() as usize,
            height: img.height() as usize,
            data: img.into_raw(),
        }
    }
}

impl GrayImage {
    pub fn new(width: usize, height: usize) -> Self {
        Self::filled(width, height, 0)
    }

    pub fn filled(width: usize, height: usize, value: u8) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }

    #[inline]
    pub fn view(&self) -> GrayImageView<'_> {
        GrayImageView {
            width: self.width,
            height: self.height,
            data: &self.data,
        }
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.width + x]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: u8) {
        self.data[y * self.width + x] = value;
    }

    /// Paint `rect` (clipped to the image) with `value`.
    pub fn fill_rect(&mut self, rect: PixelRect, value: u8) {
        let Some(r) = rect.intersect(&PixelRect::full(self.width, self.height)) else {
            return;
        };
        for y in r.y as usize..r.bottom() as usize {
            let row = y * self.width;
            self.data[row + r.x as usize..row + r.right() as usize].fill(value);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl FloatImage {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0.0; width * height],
        }
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.data[y * self.width + x]
    }

    /// Sample with replicated borders.
    #[inline]
    pub fn get_clamped(&self, x: i64, y: i64) -> f32 {
        let x = x.clamp(0, self.width as i64 - 1) as usize;
        let y = y.clamp(0, self.height as i64 - 1) as usize;
        self.data[y * self.width + x]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sub_image_copies_rows() {
        let mut img = GrayImage::new(6, 4);
        for y in 0..4 {
            for x in 0..6 {
                img.set(x, y, (y * 10 + x) as u8);
            }
        }
        let sub = img.view().sub_image(PixelRect::new(2, 1, 3, 2));
        assert_eq!(sub.width, 3);
        assert_eq!(sub.height, 2);
        assert_eq!(sub.data, vec![12, 13, 14, 22, 23, 24]);
    }

    #[test]
    fn luma_conversion_keeps_layout() {
        let mut img = GrayImage::new(3, 2);
        img.set(2, 1, 7);
        let luma = img.view().to_luma();
        assert_eq!(luma.get_pixel(2, 1).0, [7]);
        assert_eq!(GrayImage::from(luma), img);
    }

    #[test]
    fn fill_rect_clips_to_bounds() {
        let mut img = GrayImage::new(4, 4);
        img.fill_rect(PixelRect::new(2, 2, 10, 10), 9);
        assert_eq!(img.get(3, 3), 9);
        assert_eq!(img.get(1, 1), 0);
        assert_eq!(img.data.iter().filter(|&&v| v == 9).count(), 4);
    }
}
