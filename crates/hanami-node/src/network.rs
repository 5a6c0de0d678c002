//! Hanami messages over a byte stream.
//!
//! A message carries its own total size in the header, so a stream needs no
//! extra length prefix: read 16 bytes, check the magic and the declared size,
//! then read the remainder.
//!
//! ```text
//! serve()                        -- accept loop, stops on the shutdown future
//!  └─ handle_connection()        -- one task per peer
//!       └─ read_frame()          -- header, sniff, bounds, body
//!       └─ ErrorLogMessage::decode()
//!       └─ ErrorSink::report()
//! ```
//!
//! A frame that fails to decode is reported as a malformed message and the
//! connection is dropped; the byte stream cannot be resynchronised after a
//! bad frame.

use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;

use hanami_core::{
    is_hanami_protocol, ErrorLogMessage, ErrorReport, ErrorSink, HanamiMessage, MessageHeader,
    ProtocolError, HEADER_SIZE, MAGIC,
};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream, ToSocketAddrs};
use tracing::{debug, error, info, warn};

/// Component name used in reports raised by the connection handler.
pub const COMPONENT: &str = "hanami-node";

/// Errors raised while reading, writing, or decoding a frame.
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The first bytes are not a Hanami header.
    #[error("not a Hanami message (leading bytes {found:?})")]
    NotHanami { found: [u8; 6] },

    /// The header announces more bytes than the connection may send.
    #[error("declared size {declared} exceeds limit of {max} bytes")]
    Oversized { declared: u64, max: usize },

    /// The header announces fewer bytes than the header itself.
    #[error("declared size {declared} is smaller than the 16-byte header")]
    Undersized { declared: u64 },

    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

// ── Framing ───────────────────────────────────────────────────────────────────

/// Reads one complete message from `reader`.
///
/// Returns `Ok(None)` when the stream ends cleanly before the first header
/// byte.  The returned buffer holds exactly the declared size.
///
/// # Errors
///
/// - [`FrameError::Io`] for read failures and EOF inside a frame.
/// - [`FrameError::NotHanami`] if the magic does not match.
/// - [`FrameError::Undersized`] / [`FrameError::Oversized`] if the declared
///   size is outside `HEADER_SIZE..=max`.
pub async fn read_frame<R>(reader: &mut R, max: usize) -> Result<Option<Vec<u8>>, FrameError>
where
    R: AsyncRead + Unpin,
{
    let mut header = [0u8; HEADER_SIZE];
    let mut filled = 0;
    while filled < HEADER_SIZE {
        let n = reader.read(&mut header[filled..]).await?;
        if n == 0 {
            if filled == 0 {
                return Ok(None);
            }
            return Err(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                format!("stream closed after {filled} header bytes"),
            )
            .into());
        }
        filled += n;
    }

    if !is_hanami_protocol(&header) {
        let mut found = [0u8; MAGIC.len()];
        found.copy_from_slice(&header[..MAGIC.len()]);
        return Err(FrameError::NotHanami { found });
    }

    let declared = MessageHeader::parse(&header)?.size;
    if declared < HEADER_SIZE as u64 {
        return Err(FrameError::Undersized { declared });
    }
    if declared > max as u64 {
        return Err(FrameError::Oversized { declared, max });
    }

    // `declared <= max`, so it fits in usize.
    let mut frame = vec![0u8; declared as usize];
    frame[..HEADER_SIZE].copy_from_slice(&header);
    reader.read_exact(&mut frame[HEADER_SIZE..]).await?;
    Ok(Some(frame))
}

/// Writes one encoded message and flushes.
///
/// # Errors
///
/// [`FrameError::Io`] on write failure.
pub async fn write_frame<W>(writer: &mut W, bytes: &[u8]) -> Result<(), FrameError>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(bytes).await?;
    writer.flush().await?;
    Ok(())
}

// ── Server ────────────────────────────────────────────────────────────────────

/// Reads error-log messages from one peer until it disconnects.
///
/// Each decoded message is forwarded to `sink`.  The first bad frame is
/// reported to `sink` as a malformed message and ends the connection.
///
/// Returns the number of messages received.
///
/// # Errors
///
/// The [`FrameError`] that ended the connection.
pub async fn handle_connection<R>(
    mut reader: R,
    peer: impl Display,
    max_message_size: usize,
    sink: &dyn ErrorSink,
) -> Result<usize, FrameError>
where
    R: AsyncRead + Unpin,
{
    let mut received = 0;
    loop {
        let result = match read_frame(&mut reader, max_message_size).await {
            Ok(None) => return Ok(received),
            Ok(Some(frame)) => ErrorLogMessage::decode(&frame).map_err(FrameError::from),
            Err(e) => Err(e),
        };

        match result {
            Ok(msg) => {
                debug!("{peer}: error log from {} ({})", msg.user_uuid, msg.component);
                sink.report(&ErrorReport::from(&msg));
                received += 1;
            }
            Err(e) => {
                sink.report(&ErrorReport::new(
                    COMPONENT,
                    "malformed message",
                    format!("peer {peer}: {e}"),
                ));
                return Err(e);
            }
        }
    }
}

/// Accepts connections on `listener` until `shutdown` resolves.
///
/// Each connection runs [`handle_connection`] on its own task.
///
/// # Errors
///
/// Accept errors are logged and the loop continues; this only returns `Err`
/// if the listener's local address cannot be read.
pub async fn serve<F>(
    listener: TcpListener,
    max_message_size: usize,
    sink: Arc<dyn ErrorSink>,
    shutdown: F,
) -> std::io::Result<()>
where
    F: Future<Output = ()>,
{
    info!("listening on {}", listener.local_addr()?);
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("shutdown requested; stopping accept loop");
                return Ok(());
            }
            accepted = listener.accept() => match accepted {
                Ok((stream, peer)) => {
                    info!("connection from {peer}");
                    let sink = Arc::clone(&sink);
                    tokio::spawn(async move {
                        match handle_connection(stream, peer, max_message_size, sink.as_ref()).await {
                            Ok(n) => info!("{peer} closed after {n} message(s)"),
                            Err(e) => warn!("{peer} dropped: {e}"),
                        }
                    });
                }
                Err(e) => error!("accept error: {e}"),
            },
        }
    }
}

// ── Client ────────────────────────────────────────────────────────────────────

/// Connects to `addr` and sends one message.
///
/// # Errors
///
/// Encoding, connect, or write failures.
pub async fn send_message<A, M>(addr: A, msg: &M) -> Result<usize, FrameError>
where
    A: ToSocketAddrs,
    M: for<'a> HanamiMessage<'a>,
{
    let bytes = msg.encode()?;
    let mut stream = TcpStream::connect(addr).await?;
    write_frame(&mut stream, &bytes).await?;
    stream.shutdown().await?;
    Ok(bytes.len())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
