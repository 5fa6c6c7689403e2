use std::io;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Longest frame accepted, excluding the `\n` or `\r\n` terminator.
pub const MAX_FRAME_LEN: usize = 4096;

pub(crate) const LINE_ENDINGS: &[char] = &['\n', '\r'];

/// Reads the next non-blank, newline-delimited frame.
///
/// Bytes belonging to a partial line stay buffered in `reader` until the rest
/// arrives, so a frame split across several TCP segments is returned once and
/// several frames packed into one segment come back one call at a time.
/// Returns `Ok(None)` once the peer has closed the stream.
pub async fn read_frame<R>(reader: &mut R) -> io::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    let mut line = Vec::new();
    loop {
        line.clear();
        let limit = (MAX_FRAME_LEN + 2) as u64;
        let bytes = (&mut *reader)
            .take(limit)
            .read_until(b'\n', &mut line)
            .await?;
        if bytes == 0 {
            return Ok(None);
        }

        let mut body = line.as_slice();
        if let Some(rest) = body.strip_suffix(b"\n") {
            body = rest;
        }
        if let Some(rest) = body.strip_suffix(b"\r") {
            body = rest;
        }
        if body.len() > MAX_FRAME_LEN {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("frame exceeds {MAX_FRAME_LEN} bytes"),
            ));
        }

        let text = String::from_utf8_lossy(&line);
        let trimmed = text.trim_end_matches(LINE_ENDINGS);
        if trimmed.is_empty() {
            continue;
        }

        return Ok(Some(trimmed.to_string()));
    }
}

pub async fn write_frame<W>(writer: &mut W, frame: &str) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    // One write per frame so the newline never trails behind in a separate segment.
    let mut encoded = Vec::with_capacity(frame.len() + 1);
    encoded.extend_from_slice(frame.as_bytes());
    encoded.push(b'\n');
    writer.write_all(&encoded).await?;
    writer.flush().await
}
