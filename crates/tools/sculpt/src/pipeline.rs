//! Batch orchestration: classify each image, build it, record the outcome

use crate::animation::AnimationKind;
use crate::builder::AssetBuilder;
use crate::config::Settings;
use crate::error::PipelineError;
use crate::protocol::{Connector, SceneEngine, TcpConnector};
use crate::report::{AssetJob, BatchReport};
use silhouette::{ImageDescriptor, ShapeError};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Image extensions picked up by directory discovery
pub const IMAGE_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// Produces a descriptor for an image file
pub trait ImageClassifier: Send + Sync {
    fn classify(&self, path: &Path) -> Result<ImageDescriptor, ShapeError>;
}

/// Contour-based classifier from the `silhouette` crate
#[derive(Debug, Clone, Copy, Default)]
pub struct ContourClassifier;

impl ImageClassifier for ContourClassifier {
    fn classify(&self, path: &Path) -> Result<ImageDescriptor, ShapeError> {
        silhouette::classify(path)
    }
}

/// Runs batches of images against one engine connection per batch
pub struct Pipeline<C = ContourClassifier, K = TcpConnector> {
    settings: Settings,
    classifier: C,
    connector: K,
}

impl Pipeline {
    /// Pipeline talking to the engine configured in `settings`
    pub fn new(settings: Settings) -> Self {
        let connector = TcpConnector::from_settings(&settings);
        Self::with_parts(settings, ContourClassifier, connector)
    }
}

impl<C, K> Pipeline<C, K>
where
    C: ImageClassifier,
    K: Connector,
{
    pub fn with_parts(settings: Settings, classifier: C, connector: K) -> Self {
        Self {
            settings,
            classifier,
            connector,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Build every image in order and report one job per image.
    ///
    /// Fails only when the engine cannot be reached at all; in that case no
    /// image is classified. Once the connection is lost mid-batch, the
    /// remaining images are recorded as skipped.
    pub async fn run_batch(
        &self,
        images: &[PathBuf],
        theme: &str,
        animation: AnimationKind,
    ) -> Result<BatchReport, PipelineError> {
        info!(images = images.len(), theme, %animation, "starting batch");

        let mut engine = self
            .connector
            .connect()
            .await
            .map_err(PipelineError::Connect)?;

        let mut report = BatchReport::new(theme, animation);
        let mut lost: Option<String> = None;

        for (index, source) in images.iter().enumerate() {
            let mut job = AssetJob::new(source.clone(), theme, animation);

            if let Some(reason) = &lost {
                job.fail(format!("skipped: {reason}"));
                report.push(job);
                continue;
            }

            match self.run_job(&mut engine, &mut job).await {
                Ok(()) => {
                    let done = index + 1;
                    info!(source = %source.display(), "asset {done}/{} done", images.len());
                    let more = done < images.len();
                    if more && !self.settings.asset_delay.is_zero() {
                        tokio::time::sleep(self.settings.asset_delay).await;
                    }
                }
                Err(err) => {
                    warn!(source = %source.display(), "asset failed: {err}");
                    if err.is_connection() {
                        lost = Some(err.to_string());
                    }
                    job.fail(err.to_string());
                }
            }
            report.push(job);
        }

        engine.close().await;
        info!(
            succeeded = report.succeeded(),
            failed = report.failed(),
            "batch finished"
        );
        Ok(report)
    }

    async fn run_job(
        &self,
        engine: &mut K::Engine,
        job: &mut AssetJob,
    ) -> Result<(), PipelineError> {
        let descriptor = self.classifier.classify(&job.source)?;
        debug!(
            source = %job.source.display(),
            silhouette = %descriptor.silhouette,
            color = ?descriptor.dominant_color,
            aspect = descriptor.aspect_ratio(),
            coverage = descriptor.coverage(),
            "classified"
        );
        job.descriptor = Some(descriptor.clone());

        let built = AssetBuilder::new(engine, &self.settings)
            .build(&job.source, &descriptor, &job.theme, job.animation)
            .await?;
        job.succeed(built);
        Ok(())
    }

    /// Build a single image as a batch of one.
    pub async fn process_image(
        &self,
        image: &Path,
        theme: &str,
        animation: AnimationKind,
    ) -> Result<BatchReport, PipelineError> {
        self.run_batch(&[image.to_path_buf()], theme, animation)
            .await
    }

    /// Build every image found directly inside `dir`.
    pub async fn process_directory(
        &self,
        dir: &Path,
        theme: &str,
        animation: AnimationKind,
    ) -> Result<BatchReport, PipelineError> {
        let images = discover_images(dir).await?;
        if images.is_empty() {
            return Err(PipelineError::NoImages(dir.to_path_buf()));
        }
        self.run_batch(&images, theme, animation).await
    }
}

/// Image files directly inside `dir`, sorted by path
pub async fn discover_images(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut images = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if entry.file_type().await?.is_file() && is_image(&path) {
            images.push(path);
        }
    }
    images.sort();
    Ok(images)
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
}
