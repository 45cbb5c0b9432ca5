//! Per-image job records and the batch report

use crate::animation::AnimationKind;
use crate::builder::{BuiltAsset, Surface};
use crate::scene::ExportFormat;
use serde::Serialize;
use silhouette::ImageDescriptor;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Succeeded,
    Failed,
}

/// One image's trip through the pipeline
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssetJob {
    pub source: PathBuf,
    pub theme: String,
    pub animation: AnimationKind,
    pub status: JobStatus,
    /// Set once classification succeeded
    pub descriptor: Option<ImageDescriptor>,
    /// Set once the asset was exported
    pub artifact: Option<PathBuf>,
    pub format: Option<ExportFormat>,
    pub surface: Option<Surface>,
    pub animated: bool,
    /// Why the job failed
    pub error: Option<String>,
    pub notes: Vec<String>,
}

impl AssetJob {
    pub fn new(
        source: impl Into<PathBuf>,
        theme: impl Into<String>,
        animation: AnimationKind,
    ) -> Self {
        Self {
            source: source.into(),
            theme: theme.into(),
            animation,
            status: JobStatus::Pending,
            descriptor: None,
            artifact: None,
            format: None,
            surface: None,
            animated: false,
            error: None,
            notes: Vec::new(),
        }
    }

    pub(crate) fn succeed(&mut self, asset: BuiltAsset) {
        self.status = JobStatus::Succeeded;
        self.artifact = Some(asset.artifact);
        self.format = Some(asset.format);
        self.surface = Some(asset.surface);
        self.animated = asset.animated;
        self.notes.extend(asset.notes);
    }

    pub(crate) fn fail(&mut self, error: impl Into<String>) {
        self.status = JobStatus::Failed;
        self.error = Some(error.into());
    }

    pub fn is_succeeded(&self) -> bool {
        self.status == JobStatus::Succeeded
    }
}

/// Outcome of a batch, one job per input image in input order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchReport {
    pub theme: String,
    pub animation: AnimationKind,
    pub jobs: Vec<AssetJob>,
}

impl BatchReport {
    pub fn new(theme: impl Into<String>, animation: AnimationKind) -> Self {
        Self {
            theme: theme.into(),
            animation,
            jobs: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, job: AssetJob) {
        self.jobs.push(job);
    }

    pub fn succeeded(&self) -> usize {
        self.count(JobStatus::Succeeded)
    }

    pub fn failed(&self) -> usize {
        self.count(JobStatus::Failed)
    }

    fn count(&self, status: JobStatus) -> usize {
        self.jobs.iter().filter(|job| job.status == status).count()
    }

    /// Artifacts of the succeeded jobs
    pub fn artifacts(&self) -> impl Iterator<Item = &PathBuf> {
        self.jobs.iter().filter_map(|job| job.artifact.as_ref())
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl std::fmt::Display for BatchReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} of {} assets built for theme `{}` ({} failed)",
            self.succeeded(),
            self.jobs.len(),
            self.theme,
            self.failed()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn built(name: &str) -> BuiltAsset {
        BuiltAsset {
            name: name.to_string(),
            artifact: PathBuf::from(format!("/out/xmas/{name}.usdz")),
            format: ExportFormat::Usdz,
            surface: Surface::Material("ImageMaterial".into()),
            animated: true,
            notes: vec!["texture not applied: boom".into()],
        }
    }

    #[test]
    fn test_counts_and_artifacts() {
        let mut report = BatchReport::new("xmas", AnimationKind::Dance);

        let mut ok = AssetJob::new("tree.png", "xmas", AnimationKind::Dance);
        ok.succeed(built("tree"));
        report.push(ok);

        let mut bad = AssetJob::new("broken.png", "xmas", AnimationKind::Dance);
        bad.fail("could not decode image");
        report.push(bad);

        assert_eq!(report.succeeded(), 1);
        assert_eq!(report.failed(), 1);
        assert_eq!(
            report.artifacts().collect::<Vec<_>>(),
            vec![&PathBuf::from("/out/xmas/tree.usdz")]
        );
        assert_eq!(report.to_string(), "1 of 2 assets built for theme `xmas` (1 failed)");
    }

    #[test]
    fn test_json_report() {
        let mut report = BatchReport::new("xmas", AnimationKind::Spin);
        let mut job = AssetJob::new("star.png", "xmas", AnimationKind::Spin);
        job.succeed(built("star"));
        report.push(job);

        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(json["animation"], "spin");
        assert_eq!(json["jobs"][0]["status"], "succeeded");
        assert_eq!(json["jobs"][0]["format"], "usdz");
        assert_eq!(json["jobs"][0]["surface"]["kind"], "material");
        assert_eq!(json["jobs"][0]["notes"][0], "texture not applied: boom");
    }
}
