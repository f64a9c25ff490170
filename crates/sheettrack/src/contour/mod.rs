//! Contour extraction: binary mask → dominant region boundary → four corners.

mod extract;
pub mod geometry;

pub use extract::{
    extract_quadrilateral, find_external_contours, largest_contour, Contour, Extraction,
    ExtractionPath,
};
