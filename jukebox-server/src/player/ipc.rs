//! JSON IPC wire codec and transport
//!
//! Requests are newline-delimited `{"command": [verb, args...]}` objects.
//! Replies carry `{"data": ..., "error": "success"}`; unsolicited event lines
//! (`{"event": ...}`) can be interleaved and are skipped.

use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::time::timeout;

/// Reply line from the player
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IpcReply {
    #[serde(default)]
    pub data: Value,
    pub error: String,
}

impl IpcReply {
    pub fn is_success(&self) -> bool {
        self.error == "success"
    }
}

/// Why a round trip produced no usable reply
#[derive(Debug, Error)]
pub enum IpcError {
    /// Nothing is listening on the IPC endpoint
    #[error("player unreachable: {0}")]
    Unreachable(#[source] std::io::Error),
    /// Connected, but no reply arrived in time
    #[error("player did not reply in time")]
    Timeout,
    /// Connected, but the exchange broke or returned garbage
    #[error("IPC protocol error: {0}")]
    Protocol(String),
}

/// Encode a command array as one request line
pub fn encode_command(args: &[Value]) -> String {
    let mut line = json!({ "command": args }).to_string();
    line.push('\n');
    line
}

/// Decode one line; `Ok(None)` for event lines
pub fn decode_line(line: &str) -> Result<Option<IpcReply>, IpcError> {
    let value: Value = serde_json::from_str(line.trim())
        .map_err(|e| IpcError::Protocol(format!("invalid JSON '{}': {}", line.trim(), e)))?;

    if value.get("error").is_none() {
        return Ok(None);
    }

    serde_json::from_value(value)
        .map(Some)
        .map_err(|e| IpcError::Protocol(e.to_string()))
}

/// Write one request and read lines until its reply arrives
pub async fn exchange<S>(stream: S, request: &str) -> Result<IpcReply, IpcError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut reader = BufReader::new(stream);

    reader
        .get_mut()
        .write_all(request.as_bytes())
        .await
        .map_err(|e| IpcError::Protocol(format!("write failed: {}", e)))?;
    reader
        .get_mut()
        .flush()
        .await
        .map_err(|e| IpcError::Protocol(format!("flush failed: {}", e)))?;

    let mut line = String::new();
    loop {
        line.clear();
        let read = reader
            .read_line(&mut line)
            .await
            .map_err(|e| IpcError::Protocol(format!("read failed: {}", e)))?;
        if read == 0 {
            return Err(IpcError::Protocol("connection closed before reply".to_string()));
        }
        if line.trim().is_empty() {
            continue;
        }
        if let Some(reply) = decode_line(&line)? {
            return Ok(reply);
        }
    }
}

/// Client for the player's IPC endpoint
///
/// Opens a fresh connection per request; the player may be replaced between calls.
#[derive(Debug, Clone)]
pub struct IpcClient {
    path: String,
    timeout: Duration,
}

impl IpcClient {
    pub fn new(path: impl Into<String>, timeout: Duration) -> Self {
        Self {
            path: path.into(),
            timeout,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Send `args` and wait (bounded) for the reply
    pub async fn request(&self, args: &[Value]) -> Result<IpcReply, IpcError> {
        let request = encode_command(args);

        let stream = match timeout(self.timeout, connect(&self.path)).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => return Err(IpcError::Unreachable(e)),
            Err(_) => {
                return Err(IpcError::Unreachable(std::io::Error::new(
                    std::io::ErrorKind::TimedOut,
                    "connect timed out",
                )))
            }
        };

        match timeout(self.timeout, exchange(stream, &request)).await {
            Ok(result) => result,
            Err(_) => Err(IpcError::Timeout),
        }
    }

    /// True when something accepts connections on the endpoint
    pub async fn is_reachable(&self) -> bool {
        matches!(timeout(self.timeout, connect(&self.path)).await, Ok(Ok(_)))
    }
}

#[cfg(unix)]
async fn connect(path: &str) -> std::io::Result<tokio::net::UnixStream> {
    tokio::net::UnixStream::connect(path).await
}

#[cfg(windows)]
async fn connect(
    path: &str,
) -> std::io::Result<tokio::net::windows::named_pipe::NamedPipeClient> {
    tokio::net::windows::named_pipe::ClientOptions::new().open(path)
}
