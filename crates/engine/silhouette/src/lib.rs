//! Silhouette classification for raster images
//!
//! Reduces an image to a small structural descriptor: its dimensions, the
//! dominant color, and the class of its outermost silhouette (triangle,
//! circle, rectangle, or complex). The descriptor drives primitive selection
//! when the image is turned into a 3D asset.
//!
//! The classification is a heuristic built on edge detection and polygon
//! approximation. It is not a precise shape detector: rounded outlines may be
//! reported as [`SilhouetteClass::Complex`] and near-regular polygons with many
//! sides as [`SilhouetteClass::Circle`].
//!
//! # Example
//!
//! ```no_run
//! use silhouette::{classify, SilhouetteClass};
//!
//! let descriptor = classify("tree.png")?;
//! if descriptor.silhouette == SilhouetteClass::Triangle {
//!     println!("looks like a tree: {}x{}", descriptor.width, descriptor.height);
//! }
//! # Ok::<(), silhouette::ShapeError>(())
//! ```

pub mod classify;
pub mod contour;
pub mod descriptor;
pub mod palette;

pub use classify::{classify, classify_image, CANNY_HIGH, CANNY_LOW, TOLERANCE_RATIO};
pub use descriptor::{ImageDescriptor, Rgb, SilhouetteClass};
pub use palette::{dominant_color, FALLBACK_COLOR, MAX_PALETTE_COLORS};

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while classifying an image
#[derive(Debug, Error)]
pub enum ShapeError {
    #[error("could not decode image {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Result type alias for classification
pub type Result<T> = std::result::Result<T, ShapeError>;
