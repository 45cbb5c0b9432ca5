//! Edge-and-contour silhouette heuristic

use crate::contour::{approximate_closed, circularity, perimeter, polygon_area};
use crate::descriptor::{ImageDescriptor, SilhouetteClass};
use crate::palette::{dominant_color, FALLBACK_COLOR};
use crate::{Result, ShapeError};
use image::{DynamicImage, ImageError, ImageReader};
use imageproc::contours::{find_contours, BorderType, Contour};
use imageproc::distance_transform::Norm;
use imageproc::edges::canny;
use imageproc::morphology::dilate;
use imageproc::point::Point;
use std::path::Path;
use tracing::debug;

/// Lower hysteresis threshold for edge detection
pub const CANNY_LOW: f32 = 50.0;

/// Upper hysteresis threshold for edge detection
pub const CANNY_HIGH: f32 = 150.0;

/// Polygon approximation tolerance as a fraction of the contour perimeter
pub const TOLERANCE_RATIO: f64 = 0.02;

/// Minimum isoperimetric ratio for a many-sided outline to count as round
const ROUNDNESS_THRESHOLD: f64 = 0.92;

/// Fewest polygon vertices an outline needs before it can count as round
const MIN_ROUND_VERTICES: usize = 7;

/// Decode the image at `path` and classify it
pub fn classify<P: AsRef<Path>>(path: P) -> Result<ImageDescriptor> {
    let path = path.as_ref();
    let decode_error = |source| ShapeError::Decode {
        path: path.to_path_buf(),
        source,
    };
    // Format comes from the file content, falling back to the extension.
    let image = ImageReader::open(path)
        .and_then(|reader| reader.with_guessed_format())
        .map_err(|e| decode_error(ImageError::IoError(e)))?
        .decode()
        .map_err(decode_error)?;

    let descriptor = classify_image(&image);
    debug!(
        path = %path.display(),
        silhouette = %descriptor.silhouette,
        contours = descriptor.contour_count,
        "classified image"
    );
    Ok(descriptor)
}

/// Classify an already decoded image
pub fn classify_image(image: &DynamicImage) -> ImageDescriptor {
    let edges = canny(&image.to_luma8(), CANNY_LOW, CANNY_HIGH);
    // Close one-pixel breaks in the edge map so corners stay connected.
    let edges = dilate(&edges, Norm::LInf, 1);

    let outlines: Vec<Contour<i32>> = find_contours::<i32>(&edges)
        .into_iter()
        .filter(|contour| contour.parent.is_none() && contour.border_type == BorderType::Outer)
        .collect();

    let largest = outlines
        .iter()
        .map(|contour| (contour, polygon_area(&contour.points)))
        .max_by(|a, b| a.1.total_cmp(&b.1));

    let (silhouette, contour_area) = match largest {
        Some((contour, area)) => (silhouette_of(&contour.points), area),
        None => (SilhouetteClass::Complex, 0.0),
    };

    ImageDescriptor {
        width: image.width(),
        height: image.height(),
        dominant_color: dominant_color(&image.to_rgb8()).unwrap_or(FALLBACK_COLOR),
        silhouette,
        contour_area,
        contour_count: outlines.len(),
    }
}

fn silhouette_of(points: &[Point<i32>]) -> SilhouetteClass {
    if points.len() <= 4 {
        return SilhouetteClass::Circle;
    }

    let polygon = approximate_closed(points, TOLERANCE_RATIO * perimeter(points));
    match polygon.len() {
        0..=2 => SilhouetteClass::Circle,
        3 => SilhouetteClass::Triangle,
        4 => SilhouetteClass::Rectangle,
        n if n >= MIN_ROUND_VERTICES && circularity(&polygon) >= ROUNDNESS_THRESHOLD => {
            SilhouetteClass::Circle
        }
        _ => SilhouetteClass::Complex,
    }
}
