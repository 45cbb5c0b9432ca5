use crate::protocol::Framing;
use crate::scene::ExportFormat;
use anyhow::Context;
use std::env;
use std::fmt::{self, Display};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Host and port of the scene engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineAddress {
    pub host: String,
    pub port: u16,
}

impl EngineAddress {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl Default for EngineAddress {
    fn default() -> Self {
        Self::new("localhost", 5000)
    }
}

impl fmt::Display for EngineAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Configuration for a pipeline run.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Base directory the other relative defaults hang off.
    pub project_root: PathBuf,
    /// Artifacts land in `<output_dir>/<theme>/<stem>.<ext>`.
    pub output_dir: PathBuf,
    /// Source images are copied here before being handed to the engine.
    pub texture_dir: PathBuf,
    pub engine: EngineAddress,
    pub framing: Framing,
    pub connect_timeout: Duration,
    pub command_timeout: Duration,
    /// Pause after each successful asset.
    pub asset_delay: Duration,
    /// Delete the partially built object when a job fails.
    pub cleanup_failed: bool,
    pub primary_format: ExportFormat,
    pub fallback_format: ExportFormat,
}

impl Default for Settings {
    fn default() -> Self {
        Self::new(".")
    }
}

impl Settings {
    /// Defaults rooted at `project_root`.
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        let project_root = project_root.into();
        Self {
            output_dir: project_root.join("3D_Assets"),
            texture_dir: env::temp_dir().join("sculpt_textures"),
            project_root,
            engine: EngineAddress::default(),
            framing: Framing::default(),
            connect_timeout: Duration::from_secs(5),
            command_timeout: Duration::from_secs(120),
            asset_delay: Duration::from_millis(1000),
            cleanup_failed: true,
            primary_format: ExportFormat::Usdz,
            fallback_format: ExportFormat::Glb,
        }
    }

    /// Builds settings from `SCULPT_*` environment variables, falling back to
    /// the defaults of [`Settings::new`].
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`Settings::from_env`] with an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let project_root = lookup("SCULPT_PROJECT_ROOT").unwrap_or_else(|| ".".into());
        let mut settings = Self::new(project_root);

        if let Some(dir) = lookup("SCULPT_OUTPUT_DIR") {
            settings.output_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup("SCULPT_TEXTURE_DIR") {
            settings.texture_dir = PathBuf::from(dir);
        }
        if let Some(host) = lookup("SCULPT_ENGINE_HOST") {
            settings.engine.host = host;
        }
        if let Some(port) = parse_var(&lookup, "SCULPT_ENGINE_PORT")? {
            settings.engine.port = port;
        }
        if let Some(framing) = lookup("SCULPT_FRAMING") {
            settings.framing = framing
                .parse()
                .map_err(|e: String| anyhow::anyhow!(e))
                .context("invalid SCULPT_FRAMING")?;
        }
        if let Some(secs) = parse_var(&lookup, "SCULPT_CONNECT_TIMEOUT_SECS")? {
            settings.connect_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = parse_var(&lookup, "SCULPT_COMMAND_TIMEOUT_SECS")? {
            settings.command_timeout = Duration::from_secs(secs);
        }
        if let Some(ms) = parse_var(&lookup, "SCULPT_ASSET_DELAY_MS")? {
            settings.asset_delay = Duration::from_millis(ms);
        }
        if let Some(cleanup) = parse_var(&lookup, "SCULPT_CLEANUP_FAILED")? {
            settings.cleanup_failed = cleanup;
        }

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(self.engine.port != 0, "engine port must be non-zero");
        anyhow::ensure!(
            !self.engine.host.is_empty(),
            "engine host must not be empty"
        );
        anyhow::ensure!(
            !self.command_timeout.is_zero(),
            "command timeout must be non-zero"
        );
        anyhow::ensure!(
            !self.connect_timeout.is_zero(),
            "connect timeout must be non-zero"
        );
        Ok(())
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn with_texture_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.texture_dir = dir.into();
        self
    }

    pub fn with_engine(mut self, engine: EngineAddress) -> Self {
        self.engine = engine;
        self
    }

    pub fn with_framing(mut self, framing: Framing) -> Self {
        self.framing = framing;
        self
    }

    pub fn with_command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    pub fn with_asset_delay(mut self, delay: Duration) -> Self {
        self.asset_delay = delay;
        self
    }

    pub fn with_cleanup_failed(mut self, cleanup: bool) -> Self {
        self.cleanup_failed = cleanup;
        self
    }

    /// Directory holding the artifacts of one theme.
    pub fn theme_dir(&self, theme: &str) -> PathBuf {
        self.output_dir.join(theme)
    }

    /// Artifact path for an asset in a given format.
    pub fn artifact_path(&self, theme: &str, asset: &str, format: ExportFormat) -> PathBuf {
        self.theme_dir(theme)
            .join(format!("{asset}.{}", format.extension()))
    }

    /// Staging path of a source image.
    pub fn staged_texture(&self, source: &Path) -> PathBuf {
        match source.file_name() {
            Some(name) => self.texture_dir.join(name),
            None => self.texture_dir.join("texture.png"),
        }
    }
}

fn parse_var<F, T>(lookup: &F, key: &str) -> anyhow::Result<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| anyhow::anyhow!("invalid {key}={raw}: {e}")),
        None => Ok(None),
    }
}
