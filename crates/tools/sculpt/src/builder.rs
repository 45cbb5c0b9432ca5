//! Turns an image descriptor into an exported, animated asset
//!
//! A build issues its commands in a fixed order against one engine:
//! create the primitive, dress it with the image (or a flat material),
//! attach the animation, and export it. Only geometry creation and export
//! can fail a build; the surface and animation steps degrade into notes.

use crate::animation::AnimationKind;
use crate::config::Settings;
use crate::error::{BuildError, ProtocolError};
use crate::protocol::{Command, ExportRequest, SceneEngine};
use crate::scene::{ExportFormat, Material, Primitive};
use serde::Serialize;
use silhouette::ImageDescriptor;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// How the surface of a built asset ended up
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum Surface {
    /// The source image, staged at this path, is UV-mapped onto the mesh
    Textured(PathBuf),
    /// A flat fallback material with this name
    Material(String),
    /// Neither texture nor material could be applied
    Bare,
}

/// Result of a successful build
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltAsset {
    pub name: String,
    pub artifact: PathBuf,
    pub format: ExportFormat,
    pub surface: Surface,
    pub animated: bool,
    /// Degradations that did not fail the build
    pub notes: Vec<String>,
}

/// Asset name derived from the image file stem
pub fn asset_name(source: &Path) -> String {
    source
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| "asset".to_string())
}

/// Builds assets through a borrowed engine connection
pub struct AssetBuilder<'a, E: SceneEngine> {
    engine: &'a mut E,
    settings: &'a Settings,
}

impl<'a, E: SceneEngine> AssetBuilder<'a, E> {
    pub fn new(engine: &'a mut E, settings: &'a Settings) -> Self {
        Self { engine, settings }
    }

    /// Build one asset from a classified image.
    ///
    /// A lost connection is returned as is at every step and is never
    /// replaced by a fallback.
    pub async fn build(
        &mut self,
        source: &Path,
        descriptor: &ImageDescriptor,
        theme: &str,
        animation: AnimationKind,
    ) -> Result<BuiltAsset, BuildError> {
        let name = asset_name(source);
        let primitive = Primitive::for_silhouette(descriptor.silhouette);
        info!(
            asset = %name,
            silhouette = %descriptor.silhouette,
            primitive = primitive.name(),
            %animation,
            "building asset"
        );

        self.create(&name, &primitive).await?;

        match self.dress_and_export(&name, source, theme, animation).await {
            Ok(asset) => Ok(asset),
            Err(err) => {
                if self.settings.cleanup_failed && !err.is_connection() {
                    self.remove(&name).await;
                }
                Err(err)
            }
        }
    }

    async fn create(&mut self, name: &str, primitive: &Primitive) -> Result<(), BuildError> {
        match self
            .engine
            .execute(Command::create_object(name, primitive))
            .await
        {
            Ok(_) => Ok(()),
            Err(ProtocolError::Command { detail, .. }) => Err(BuildError::CreateFailed {
                asset: name.to_string(),
                primitive: primitive.name(),
                detail,
            }),
            Err(err) => Err(err.into()),
        }
    }

    async fn dress_and_export(
        &mut self,
        name: &str,
        source: &Path,
        theme: &str,
        animation: AnimationKind,
    ) -> Result<BuiltAsset, BuildError> {
        let mut notes = Vec::new();
        let surface = self.apply_surface(name, source, &mut notes).await?;
        let animated = self.animate(name, animation, &mut notes).await?;
        let (artifact, format) = self.export(name, theme, &mut notes).await?;

        info!(asset = %name, artifact = %artifact.display(), %format, "asset exported");
        Ok(BuiltAsset {
            name: name.to_string(),
            artifact,
            format,
            surface,
            animated,
            notes,
        })
    }

    async fn apply_surface(
        &mut self,
        name: &str,
        source: &Path,
        notes: &mut Vec<String>,
    ) -> Result<Surface, BuildError> {
        match self.stage_texture(source).await {
            Ok(staged) => match self
                .engine
                .execute(Command::apply_texture(name, &staged))
                .await
            {
                Ok(_) => return Ok(Surface::Textured(staged)),
                Err(err) if err.is_connection() => return Err(err.into()),
                Err(err) => {
                    warn!(asset = %name, "texture failed, using material: {err}");
                    notes.push(format!("texture not applied: {err}"));
                }
            },
            Err(err) => {
                warn!(asset = %name, "could not stage texture, using material: {err}");
                notes.push(format!("texture not staged: {err}"));
            }
        }

        let material = Material::neutral_gray();
        match self
            .engine
            .execute(Command::apply_material(name, &material))
            .await
        {
            Ok(_) => Ok(Surface::Material(material.name)),
            Err(err) if err.is_connection() => Err(err.into()),
            Err(err) => {
                warn!(asset = %name, "fallback material failed: {err}");
                notes.push(format!("material not applied: {err}"));
                Ok(Surface::Bare)
            }
        }
    }

    /// Copy the source image into the texture staging directory.
    async fn stage_texture(&self, source: &Path) -> io::Result<PathBuf> {
        let staged = self.settings.staged_texture(source);
        tokio::fs::create_dir_all(&self.settings.texture_dir).await?;
        if staged != source {
            tokio::fs::copy(source, &staged).await?;
        }
        debug!(from = %source.display(), to = %staged.display(), "staged texture");
        Ok(staged)
    }

    async fn animate(
        &mut self,
        name: &str,
        animation: AnimationKind,
        notes: &mut Vec<String>,
    ) -> Result<bool, BuildError> {
        let clip = animation.clip();
        match self
            .engine
            .execute(Command::add_animation(name, &clip))
            .await
        {
            Ok(_) => Ok(true),
            Err(err) if err.is_connection() => Err(err.into()),
            Err(err) => {
                warn!(asset = %name, %animation, "animation skipped: {err}");
                notes.push(format!("{animation} animation skipped: {err}"));
                Ok(false)
            }
        }
    }

    async fn export(
        &mut self,
        name: &str,
        theme: &str,
        notes: &mut Vec<String>,
    ) -> Result<(PathBuf, ExportFormat), BuildError> {
        let theme_dir = self.settings.theme_dir(theme);
        tokio::fs::create_dir_all(&theme_dir)
            .await
            .map_err(|source| BuildError::OutputDir {
                path: theme_dir.clone(),
                source,
            })?;

        let primary = self.settings.primary_format;
        let fallback = self.settings.fallback_format;

        let primary_error = match self.export_as(name, theme, primary).await {
            Ok(path) => return Ok((path, primary)),
            Err(ProtocolError::Command { detail, .. }) => detail,
            Err(err) => return Err(err.into()),
        };

        warn!(asset = %name, "{primary} export failed, trying {fallback}: {primary_error}");
        match self.export_as(name, theme, fallback).await {
            Ok(path) => {
                notes.push(format!(
                    "exported as {fallback} after {primary} failed: {primary_error}"
                ));
                Ok((path, fallback))
            }
            Err(ProtocolError::Command {
                detail: fallback_error,
                ..
            }) => Err(BuildError::ExportFailed {
                primary,
                primary_error,
                fallback,
                fallback_error,
            }),
            Err(err) => Err(err.into()),
        }
    }

    async fn export_as(
        &mut self,
        name: &str,
        theme: &str,
        format: ExportFormat,
    ) -> Result<PathBuf, ProtocolError> {
        let path = self.settings.artifact_path(theme, name, format);
        let request = ExportRequest::new(format, path.clone());
        self.engine.execute(Command::export(name, &request)).await?;
        Ok(path)
    }

    /// Best-effort removal of a partially built object.
    async fn remove(&mut self, name: &str) {
        match self.engine.execute(Command::delete_object(name)).await {
            Ok(_) => debug!(asset = %name, "removed partial object"),
            Err(err) => warn!(asset = %name, "could not remove partial object: {err}"),
        }
    }
}
