//! Error types for the protocol, builder, and pipeline layers

use crate::protocol::CommandKind;
use crate::scene::ExportFormat;
use silhouette::ShapeError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors talking to the scene engine
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Transport unavailable: refused, timed out, closed, or broken mid-frame
    #[error("connection error: {0}")]
    Connection(String),

    /// The engine rejected the command or answered with something undecodable
    #[error("{kind} failed: {detail}")]
    Command { kind: CommandKind, detail: String },
}

impl ProtocolError {
    pub fn is_connection(&self) -> bool {
        matches!(self, ProtocolError::Connection(_))
    }
}

/// Errors that fail a single asset build
#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error("could not create {primitive} for `{asset}`: {detail}")]
    CreateFailed {
        asset: String,
        primitive: &'static str,
        detail: String,
    },

    #[error("export failed as {primary} ({primary_error}) and as {fallback} ({fallback_error})")]
    ExportFailed {
        primary: ExportFormat,
        primary_error: String,
        fallback: ExportFormat,
        fallback_error: String,
    },

    #[error("could not prepare output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl BuildError {
    /// True when the engine connection is gone and later jobs cannot run
    pub fn is_connection(&self) -> bool {
        matches!(self, BuildError::Protocol(err) if err.is_connection())
    }
}

/// Errors surfaced by the pipeline orchestrator
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("could not connect to scene engine: {0}")]
    Connect(#[source] ProtocolError),

    #[error(transparent)]
    Decode(#[from] ShapeError),

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error("no images found in {0}")]
    NoImages(PathBuf),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    pub fn is_connection(&self) -> bool {
        match self {
            PipelineError::Connect(_) => true,
            PipelineError::Build(err) => err.is_connection(),
            _ => false,
        }
    }
}
