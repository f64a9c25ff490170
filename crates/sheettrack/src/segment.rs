//! Foreground segmentation: color frame → binary mask.
//!
//! The paper is assumed to be the dominant light, weakly saturated region.
//! Both strategies return a mask with the frame's dimensions, foreground 255.
//! An empty mask is a valid result; the contour stage decides whether a
//! target exists.

use image::{GrayImage, Luma, RgbImage};
use imageproc::distance_transform::Norm;

use crate::config::{SegmentConfig, SegmentStrategy};

const FOREGROUND: u8 = 255;

/// Segment `frame` with the configured strategy.
pub fn segment(frame: &RgbImage, config: &SegmentConfig) -> GrayImage {
    let mask = match config.strategy {
        SegmentStrategy::ColorRange => color_range_mask(frame, config),
        SegmentStrategy::GlobalThreshold => global_threshold_mask(frame),
    };
    tracing::debug!(
        strategy = ?config.strategy,
        foreground = foreground_count(&mask),
        "segmentation done"
    );
    mask
}

/// Saturation/value gate followed by one closing and one opening.
pub fn color_range_mask(frame: &RgbImage, config: &SegmentConfig) -> GrayImage {
    let blurred;
    let src = match config.blur_sigma {
        Some(sigma) if sigma > 0.0 => {
            blurred = imageproc::filter::gaussian_blur_f32(frame, sigma);
            &blurred
        }
        _ => frame,
    };

    let (w, h) = src.dimensions();
    let mut mask = GrayImage::new(w, h);
    for (x, y, px) in src.enumerate_pixels() {
        let (s, v) = saturation_value(px.0);
        if s <= config.saturation_max && v >= config.value_min {
            mask.put_pixel(x, y, Luma([FOREGROUND]));
        }
    }

    let k = config.kernel_radius;
    let closed = imageproc::morphology::close(&mask, Norm::LInf, k);
    imageproc::morphology::open(&closed, Norm::LInf, k)
}

/// Luma binarization at the Otsu level (strictly brighter pixels pass).
pub fn global_threshold_mask(frame: &RgbImage) -> GrayImage {
    let gray = image::imageops::grayscale(frame);
    let level = imageproc::contrast::otsu_level(&gray);
    tracing::trace!(level, "otsu level");
    let (w, h) = gray.dimensions();
    GrayImage::from_fn(w, h, |x, y| {
        if gray.get_pixel(x, y)[0] > level {
            Luma([FOREGROUND])
        } else {
            Luma([0])
        }
    })
}

/// Saturation and value on the 8-bit HSV scale (both in `0..=255`).
pub(crate) fn saturation_value(rgb: [u8; 3]) -> (u8, u8) {
    let max = rgb[0].max(rgb[1]).max(rgb[2]);
    let min = rgb[0].min(rgb[1]).min(rgb[2]);
    if max == 0 {
        return (0, 0);
    }
    let s = (255.0 * f32::from(max - min) / f32::from(max)).round();
    (s.clamp(0.0, 255.0) as u8, max)
}

pub(crate) fn foreground_count(mask: &GrayImage) -> usize {
    mask.as_raw().iter().filter(|&&v| v != 0).count()
}
