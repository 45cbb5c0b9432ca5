//! Wire protocol of the scene engine
//!
//! Messages are JSON objects of the form `{"type": ..., "params": {...}}`,
//! answered by `{"status": ..., "result": ..., "message": ...}`. Only
//! `status` is required in a reply.

pub mod client;
pub mod command;
pub mod io;

pub use client::{ProtocolClient, TcpConnector, DEFAULT_COMMAND_TIMEOUT, DEFAULT_CONNECT_TIMEOUT};
pub use command::{Command, CommandKind, ExportRequest, Response, ResponseStatus};
pub use io::{Framing, MAX_FRAME_LEN};

use crate::error::ProtocolError;
use async_trait::async_trait;

/// Something that executes scene commands one at a time
#[async_trait]
pub trait SceneEngine: Send {
    /// Send one command and wait for its reply, whatever the reported status.
    async fn send(&mut self, command: Command) -> Result<Response, ProtocolError>;

    /// Send one command and require a success status.
    async fn execute(&mut self, command: Command) -> Result<Response, ProtocolError> {
        let kind = command.kind();
        self.send(command).await?.into_success(kind)
    }

    /// Release the connection. Calling it again does nothing.
    async fn close(&mut self);
}

/// Opens a [`SceneEngine`] for one pipeline run
#[async_trait]
pub trait Connector: Send + Sync {
    type Engine: SceneEngine;

    async fn connect(&self) -> Result<Self::Engine, ProtocolError>;
}
