use image::GrayImage;
use imageproc::contours::{find_contours, BorderType};
use crate::models::Contour;

/// Find the outermost contours of a binary image and their bounding rectangles
///
/// Holes and contours nested inside other contours are skipped. Results are in
/// raster-scan order of each contour's starting pixel.
pub fn find_external_contours(binary: &GrayImage) -> Vec<Contour> {
    find_contours::<u32>(binary)
        .into_iter()
        .filter(|c| matches!(c.border_type, BorderType::Outer) && c.parent.is_none())
        .filter_map(|c| {
            let first = c.points.first()?;
            let (min_x, min_y, max_x, max_y) = c.points.iter().fold(
                (first.x, first.y, first.x, first.y),
                |(min_x, min_y, max_x, max_y), p| {
                    (min_x.min(p.x), min_y.min(p.y), max_x.max(p.x), max_y.max(p.y))
                },
            );
            Some(Contour {
                min_x,
                min_y,
                max_x,
                max_y,
                point_count: c.points.len(),
            })
        })
        .collect()
}
