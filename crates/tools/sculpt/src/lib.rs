//! Image to animated 3D asset pipeline
//!
//! Each input image is classified by its silhouette, turned into a matching
//! mesh primitive inside a remote scene engine, textured with the image,
//! animated, and exported as a themed asset.
//!
//! # Features
//!
//! - **Classification**: contour-based silhouette and dominant color, via the
//!   `silhouette` crate
//! - **Protocol Client**: framed JSON commands over one TCP connection, with
//!   connect and per-command timeouts
//! - **Asset Builder**: geometry, texture or material fallback, keyframe
//!   animation, and export with a format fallback
//! - **Pipeline**: sequential batches with per-image failure isolation and a
//!   JSON report
//!
//! # Example
//!
//! ```no_run
//! use sculpt::prelude::*;
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let settings = Settings::from_env()?;
//!     let pipeline = Pipeline::new(settings);
//!
//!     let report = pipeline
//!         .process_directory(Path::new("images"), "christmas", AnimationKind::Dance)
//!         .await?;
//!
//!     println!("{report}");
//!     Ok(())
//! }
//! ```

pub mod animation;
pub mod builder;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod protocol;
pub mod report;
pub mod scene;

pub use animation::{AnimationClip, AnimationKind, Channel, Keyframe};
pub use builder::{asset_name, AssetBuilder, BuiltAsset, Surface};
pub use config::{EngineAddress, Settings};
pub use error::{BuildError, PipelineError, ProtocolError};
pub use pipeline::{discover_images, ContourClassifier, ImageClassifier, Pipeline};
pub use protocol::{
    Command, CommandKind, Connector, ExportRequest, Framing, ProtocolClient, Response,
    ResponseStatus, SceneEngine, TcpConnector,
};
pub use report::{AssetJob, BatchReport, JobStatus};
pub use scene::{ExportFormat, Material, Primitive};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::animation::AnimationKind;
    pub use crate::builder::{AssetBuilder, BuiltAsset};
    pub use crate::config::{EngineAddress, Settings};
    pub use crate::error::{BuildError, PipelineError, ProtocolError};
    pub use crate::pipeline::{ImageClassifier, Pipeline};
    pub use crate::protocol::{Command, Connector, ProtocolClient, SceneEngine};
    pub use crate::report::{AssetJob, BatchReport, JobStatus};
    pub use silhouette::{ImageDescriptor, SilhouetteClass};
}
