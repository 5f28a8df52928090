use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

use super::SessionError;
use crate::models::Transcript;

const READ_BUFFER_SIZE: usize = 64 * 1024;

/// Accumulate everything `reader` yields until `stop` is cancelled.
///
/// Each read is bounded by `poll` so cancellation is noticed within one
/// interval even when the server is silent. A timeout is not an error.
/// End-of-stream is: the server is not supposed to hang up on us while we
/// are still talking to it.
pub(crate) async fn drain<R>(
    mut reader: R,
    poll: Duration,
    stop: CancellationToken,
) -> Result<Transcript, SessionError>
where
    R: AsyncRead + Unpin,
{
    let mut transcript = Transcript::new();
    let mut buf = vec![0u8; READ_BUFFER_SIZE];

    while !stop.is_cancelled() {
        match timeout(poll, reader.read(&mut buf)).await {
            Err(_elapsed) => continue,
            Ok(Ok(0)) => return Err(SessionError::ConnectionClosed),
            Ok(Ok(n)) => transcript.append(&buf[..n]),
            Ok(Err(e)) => return Err(SessionError::Read(e)),
        }
    }

    tracing::debug!(bytes = transcript.len(), "Stopped draining session");
    Ok(transcript)
}
