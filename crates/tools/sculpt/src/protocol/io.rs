//! Message framing over a byte stream
//!
//! Every JSON document is framed so a reply is read completely no matter how
//! large it is or how the transport splits it.

use serde::{Deserialize, Serialize};
use std::io;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Largest frame accepted from the engine (64 MiB)
pub const MAX_FRAME_LEN: usize = 64 * 1024 * 1024;

/// How messages are delimited on the stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Framing {
    /// 4-byte big-endian length followed by the JSON body
    #[default]
    LengthPrefixed,
    /// One compact JSON document per line
    NewlineDelimited,
}

impl std::str::FromStr for Framing {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "length" | "length-prefixed" => Ok(Framing::LengthPrefixed),
            "ndjson" | "newline" | "newline-delimited" => Ok(Framing::NewlineDelimited),
            other => Err(format!("unknown framing `{other}`")),
        }
    }
}

/// Serialize a message as JSON and write it as one frame.
pub async fn write_message<W, T>(stream: &mut W, framing: Framing, message: &T) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    let body = serde_json::to_vec(message).map_err(io::Error::other)?;
    write_frame(stream, framing, &body).await
}

/// Write one frame and flush it.
pub async fn write_frame<W>(stream: &mut W, framing: Framing, body: &[u8]) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    match framing {
        Framing::LengthPrefixed => {
            let len = u32::try_from(body.len())
                .map_err(|_| frame_too_large(body.len(), u32::MAX as usize))?;
            stream.write_all(&len.to_be_bytes()).await?;
            stream.write_all(body).await?;
        }
        Framing::NewlineDelimited => {
            if body.contains(&b'\n') {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "message body contains a newline",
                ));
            }
            stream.write_all(body).await?;
            stream.write_all(b"\n").await?;
        }
    }
    stream.flush().await
}

/// Read one complete frame body.
///
/// A stream that ends before the frame is complete yields
/// [`io::ErrorKind::UnexpectedEof`]; a frame above [`MAX_FRAME_LEN`] yields
/// [`io::ErrorKind::InvalidData`].
pub async fn read_frame<R>(stream: &mut R, framing: Framing) -> io::Result<Vec<u8>>
where
    R: AsyncBufRead + Unpin,
{
    read_frame_limited(stream, framing, MAX_FRAME_LEN).await
}

async fn read_frame_limited<R>(
    stream: &mut R,
    framing: Framing,
    limit: usize,
) -> io::Result<Vec<u8>>
where
    R: AsyncBufRead + Unpin,
{
    match framing {
        Framing::LengthPrefixed => {
            let mut len_buf = [0u8; 4];
            stream.read_exact(&mut len_buf).await?;
            let len = u32::from_be_bytes(len_buf) as usize;
            if len > limit {
                return Err(frame_too_large(len, limit));
            }

            let mut body = vec![0u8; len];
            stream.read_exact(&mut body).await?;
            Ok(body)
        }
        Framing::NewlineDelimited => {
            // Room for a full-size body and its newline, no more.
            let mut line = Vec::new();
            let read = (&mut *stream)
                .take(limit as u64 + 1)
                .read_until(b'\n', &mut line)
                .await?;
            let body_len = line.len() - usize::from(line.last() == Some(&b'\n'));
            if body_len > limit {
                return Err(frame_too_large(body_len, limit));
            }
            if read == 0 || line.last() != Some(&b'\n') {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "stream closed before end of message",
                ));
            }

            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            Ok(line)
        }
    }
}

fn frame_too_large(len: usize, limit: usize) -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidData,
        format!("frame of {len} bytes exceeds limit of {limit}"),
    )
}
