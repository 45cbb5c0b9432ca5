//! Scene engine client over a framed JSON stream

use super::command::{Command, Response};
use super::io::{read_frame, write_message, Framing};
use super::{Connector, SceneEngine};
use crate::config::{EngineAddress, Settings};
use crate::error::ProtocolError;
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tracing::{debug, warn};

/// Default timeout for establishing the connection (5 seconds)
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default timeout for one command round trip (2 minutes)
/// Exports of textured, animated meshes can take a while
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(120);

/// One connection to the scene engine
///
/// Commands are sent one at a time and each reply is awaited before the next
/// command goes out. A transport failure or timeout drops the stream, after
/// which every send fails with [`ProtocolError::Connection`].
///
/// # Example
///
/// ```no_run
/// use sculpt::config::EngineAddress;
/// use sculpt::protocol::{Command, Framing, ProtocolClient, SceneEngine};
/// use std::time::Duration;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let address = EngineAddress::new("localhost", 5000);
///     let mut client = ProtocolClient::connect(
///         &address,
///         Framing::LengthPrefixed,
///         Duration::from_secs(5),
///         Duration::from_secs(120),
///     )
///     .await?;
///
///     client.execute(Command::execute_script("print('ready')")).await?;
///     client.close().await;
///     Ok(())
/// }
/// ```
pub struct ProtocolClient<S = TcpStream> {
    stream: Option<BufReader<S>>,
    framing: Framing,
    command_timeout: Duration,
    peer: String,
}

impl ProtocolClient<TcpStream> {
    /// Open a TCP connection to the engine
    pub async fn connect(
        address: &EngineAddress,
        framing: Framing,
        connect_timeout: Duration,
        command_timeout: Duration,
    ) -> Result<Self, ProtocolError> {
        let peer = address.to_string();
        debug!(%peer, ?framing, "connecting to scene engine");

        let stream = tokio::time::timeout(
            connect_timeout,
            TcpStream::connect((address.host.as_str(), address.port)),
        )
        .await
        .map_err(|_| {
            ProtocolError::Connection(format!(
                "timed out after {}s connecting to {peer}",
                connect_timeout.as_secs_f32()
            ))
        })?
        .map_err(|e| ProtocolError::Connection(format!("failed to connect to {peer}: {e}")))?;

        // Requests are small and strictly request/response.
        if let Err(e) = stream.set_nodelay(true) {
            warn!(%peer, "could not disable Nagle: {e}");
        }

        Ok(Self::from_stream(stream, framing, command_timeout).with_peer(peer))
    }
}

impl<S> ProtocolClient<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    /// Wrap an already connected stream
    pub fn from_stream(stream: S, framing: Framing, command_timeout: Duration) -> Self {
        Self {
            stream: Some(BufReader::new(stream)),
            framing,
            command_timeout,
            peer: "stream".to_string(),
        }
    }

    /// Set the name used for the peer in errors and logs
    pub fn with_peer(mut self, peer: impl Into<String>) -> Self {
        self.peer = peer.into();
        self
    }

    pub fn peer(&self) -> &str {
        &self.peer
    }

    pub fn framing(&self) -> Framing {
        self.framing
    }

    /// False once the client was closed or the transport failed
    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    async fn round_trip(&mut self, command: &Command) -> Result<Vec<u8>, ProtocolError> {
        let framing = self.framing;
        let timeout = self.command_timeout;
        let Some(stream) = self.stream.as_mut() else {
            return Err(ProtocolError::Connection(format!(
                "not connected to {}",
                self.peer
            )));
        };

        let exchange = async {
            write_message(stream.get_mut(), framing, command).await?;
            read_frame(stream, framing).await
        };

        let failure = match tokio::time::timeout(timeout, exchange).await {
            Ok(Ok(body)) => return Ok(body),
            Ok(Err(e)) => format!("{} with {}: {e}", command.kind(), self.peer),
            Err(_) => format!(
                "{} timed out after {}s waiting for {}",
                command.kind(),
                timeout.as_secs_f32(),
                self.peer
            ),
        };

        warn!(peer = %self.peer, "dropping engine connection: {failure}");
        self.stream = None;
        Err(ProtocolError::Connection(failure))
    }
}

#[async_trait]
impl<S> SceneEngine for ProtocolClient<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn send(&mut self, command: Command) -> Result<Response, ProtocolError> {
        let kind = command.kind();
        debug!(%kind, object = command.object_name(), "sending command");

        let body = self.round_trip(&command).await?;
        let value: Value = serde_json::from_slice(&body).map_err(|e| ProtocolError::Command {
            kind,
            detail: format!("malformed response: {e}"),
        })?;

        Response::from_value(value).map_err(|detail| ProtocolError::Command {
            kind,
            detail: format!("malformed response: {detail}"),
        })
    }

    async fn close(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            debug!(peer = %self.peer, "closing engine connection");
            if let Err(e) = stream.get_mut().shutdown().await {
                debug!(peer = %self.peer, "shutdown after close: {e}");
            }
        }
    }
}

/// Opens TCP connections using the configured address and timeouts
#[derive(Debug, Clone)]
pub struct TcpConnector {
    pub address: EngineAddress,
    pub framing: Framing,
    pub connect_timeout: Duration,
    pub command_timeout: Duration,
}

impl TcpConnector {
    pub fn new(address: EngineAddress) -> Self {
        Self {
            address,
            framing: Framing::default(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            command_timeout: DEFAULT_COMMAND_TIMEOUT,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            address: settings.engine.clone(),
            framing: settings.framing,
            connect_timeout: settings.connect_timeout,
            command_timeout: settings.command_timeout,
        }
    }
}

#[async_trait]
impl Connector for TcpConnector {
    type Engine = ProtocolClient<TcpStream>;

    async fn connect(&self) -> Result<Self::Engine, ProtocolError> {
        ProtocolClient::connect(
            &self.address,
            self.framing,
            self.connect_timeout,
            self.command_timeout,
        )
        .await
    }
}
