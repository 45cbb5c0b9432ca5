//! Structural descriptor produced by classification

use serde::{Deserialize, Serialize};

/// 8-bit RGB color
pub type Rgb = [u8; 3];

/// Coarse class of an image's dominant silhouette
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SilhouetteClass {
    Triangle,
    Circle,
    Rectangle,
    Complex,
}

impl SilhouetteClass {
    /// Lowercase name used in logs and reports
    pub fn as_str(self) -> &'static str {
        match self {
            SilhouetteClass::Triangle => "triangle",
            SilhouetteClass::Circle => "circle",
            SilhouetteClass::Rectangle => "rectangle",
            SilhouetteClass::Complex => "complex",
        }
    }
}

impl std::fmt::Display for SilhouetteClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of classifying one image
///
/// Immutable once produced; the caller that requested classification owns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageDescriptor {
    pub width: u32,
    pub height: u32,
    /// Most frequent color, or mid-gray when the palette is too large
    pub dominant_color: Rgb,
    pub silhouette: SilhouetteClass,
    /// Enclosed area of the largest external contour in square pixels
    pub contour_area: f64,
    /// Number of external contours found in the edge map
    pub contour_count: usize,
}

impl ImageDescriptor {
    /// Width divided by height
    pub fn aspect_ratio(&self) -> f64 {
        self.width as f64 / self.height.max(1) as f64
    }

    /// Fraction of the image covered by the largest contour
    pub fn coverage(&self) -> f64 {
        let total = self.width as f64 * self.height as f64;
        if total == 0.0 {
            return 0.0;
        }
        (self.contour_area / total).min(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_names() {
        assert_eq!(SilhouetteClass::Triangle.to_string(), "triangle");
        assert_eq!(SilhouetteClass::Complex.as_str(), "complex");
    }

    #[test]
    fn test_descriptor_serializes_snake_case() {
        let descriptor = ImageDescriptor {
            width: 200,
            height: 100,
            dominant_color: [255, 0, 0],
            silhouette: SilhouetteClass::Rectangle,
            contour_area: 5000.0,
            contour_count: 1,
        };

        let json = serde_json::to_value(&descriptor).unwrap();
        assert_eq!(json["silhouette"], "rectangle");
        assert_eq!(json["dominant_color"], serde_json::json!([255, 0, 0]));
        assert_eq!(descriptor.aspect_ratio(), 2.0);
        assert_eq!(descriptor.coverage(), 0.25);
    }
}
