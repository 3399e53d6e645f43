//! Probe client for a local forward proxy.
//!
//! Dials the proxy, writes one request, then dumps every chunk the proxy
//! sends back until it closes the connection. Responses are never parsed:
//! each read is printed as-is, in arrival order.
//!
//! There is no retry and no timeout. A peer that neither sends nor closes
//! keeps the probe waiting on its read.

use bytes::{Bytes, BytesMut};
use std::io::Write;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::{debug, info, trace};

/// Maximum bytes taken from the connection per read
pub const CHUNK_SIZE: usize = 4096;

/// Line printed when the peer closes its side
pub const STREAM_END_MESSAGE: &str = "Something is wrong, or the stream end reached.";

/// Counters for one probe run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ProbeSummary {
    /// Number of non-empty reads
    pub chunks: usize,
    /// Total bytes received
    pub bytes: usize,
}

/// Probe client instance
pub struct ProbeClient {
    target: String,
    request: Bytes,
}

impl ProbeClient {
    /// Create a probe that sends `request` to `target` (host:port).
    pub fn new(target: impl Into<String>, request: Bytes) -> Self {
        ProbeClient {
            target: target.into(),
            request,
        }
    }

    /// Connect, send the request and print the reply to `out`.
    pub async fn run<W: Write>(&self, out: &mut W) -> Result<ProbeSummary, ProbeError> {
        let stream = TcpStream::connect(&self.target)
            .await
            .map_err(|source| ProbeError::Connect {
                target: self.target.clone(),
                source,
            })?;

        match stream.peer_addr() {
            Ok(peer) => info!(peer = %peer, "Connected"),
            Err(_) => info!(proxy = %self.target, "Connected"),
        }

        run_session(stream, &self.request, out).await
    }
}

/// Drive one exchange over an already-open stream.
///
/// The stream is shut down and dropped before returning, whether the
/// exchange ended at end-of-stream or on an error.
pub async fn run_session<S, W>(
    mut stream: S,
    request: &[u8],
    out: &mut W,
) -> Result<ProbeSummary, ProbeError>
where
    S: AsyncRead + AsyncWrite + Unpin,
    W: Write,
{
    let result = exchange(&mut stream, request, out).await;

    if let Err(e) = stream.shutdown().await {
        debug!(error = %e, "Shutdown failed");
    }
    drop(stream);
    info!("Connection closed");

    result
}

async fn exchange<S, W>(
    stream: &mut S,
    request: &[u8],
    out: &mut W,
) -> Result<ProbeSummary, ProbeError>
where
    S: AsyncRead + AsyncWrite + Unpin,
    W: Write,
{
    stream.write_all(request).await.map_err(ProbeError::Write)?;
    stream.flush().await.map_err(ProbeError::Write)?;
    trace!(bytes = request.len(), "Request sent");

    let mut summary = ProbeSummary::default();
    let mut buffer = BytesMut::with_capacity(CHUNK_SIZE);

    loop {
        buffer.resize(CHUNK_SIZE, 0);

        let n = stream.read(&mut buffer[..]).await.map_err(ProbeError::Read)?;
        if n == 0 {
            trace!("Connection closed by peer");
            writeln!(out, "{STREAM_END_MESSAGE}").map_err(ProbeError::Output)?;
            return Ok(summary);
        }

        buffer.truncate(n);
        let chunk = buffer.split().freeze();
        debug!(len = n, "Received chunk");

        // Bytes' Debug output is the escaped b"..." form
        writeln!(out, "Received: {:?}", chunk).map_err(ProbeError::Output)?;

        summary.chunks += 1;
        summary.bytes += n;
    }
}

/// Probe failures. None of them is retried.
#[derive(Debug)]
pub enum ProbeError {
    Connect {
        target: String,
        source: std::io::Error,
    },
    Write(std::io::Error),
    Read(std::io::Error),
    Output(std::io::Error),
}

impl std::fmt::Display for ProbeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProbeError::Connect { target, source } => {
                write!(f, "Failed to connect to '{}': {}", target, source)
            }
            ProbeError::Write(e) => write!(f, "Failed to send request: {}", e),
            ProbeError::Read(e) => write!(f, "Failed to read response: {}", e),
            ProbeError::Output(e) => write!(f, "Failed to write output: {}", e),
        }
    }
}

impl std::error::Error for ProbeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProbeError::Connect { source, .. } => Some(source),
            ProbeError::Write(e) | ProbeError::Read(e) | ProbeError::Output(e) => Some(e),
        }
    }
}
