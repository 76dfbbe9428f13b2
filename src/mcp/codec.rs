//! Frame codec for the stdio tool protocol.
//!
//! Frame format: one JSON value per line, UTF-8, terminated by `\n`
//! (a trailing `\r` is tolerated). Blank lines are skipped. A final line
//! without a terminator is accepted at EOF.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Read one frame. Returns `None` on clean EOF.
///
/// A line longer than `max_frame_bytes` is drained from the stream and
/// reported as `InvalidData`, leaving the reader positioned at the next frame.
pub async fn read_frame<R: AsyncBufRead + Unpin>(
    reader: &mut R,
    max_frame_bytes: usize,
) -> std::io::Result<Option<Vec<u8>>> {
    loop {
        let mut buf = Vec::new();
        // Room for the payload plus a CRLF terminator.
        let limit = max_frame_bytes as u64 + 2;
        let n = (&mut *reader).take(limit).read_until(b'\n', &mut buf).await?;
        if n == 0 {
            return Ok(None);
        }

        let terminated = buf.last() == Some(&b'\n');
        if terminated {
            buf.pop();
            if buf.last() == Some(&b'\r') {
                buf.pop();
            }
        }
        if buf.len() > max_frame_bytes {
            if !terminated {
                discard_line(reader).await?;
            }
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("Frame too large: exceeds {} bytes", max_frame_bytes),
            ));
        }

        if buf.iter().all(u8::is_ascii_whitespace) {
            continue;
        }
        return Ok(Some(buf));
    }
}

/// Skip everything up to and including the next newline.
async fn discard_line<R: AsyncBufRead + Unpin>(reader: &mut R) -> std::io::Result<()> {
    loop {
        let available = reader.fill_buf().await?;
        if available.is_empty() {
            return Ok(());
        }
        match available.iter().position(|b| *b == b'\n') {
            Some(pos) => {
                reader.consume(pos + 1);
                return Ok(());
            }
            None => {
                let len = available.len();
                reader.consume(len);
            }
        }
    }
}

/// Write one frame. `payload` must not contain a raw newline.
pub async fn write_frame<W: AsyncWrite + Unpin>(
    writer: &mut W,
    payload: &[u8],
) -> std::io::Result<()> {
    writer.write_all(payload).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await?;
    Ok(())
}

/// Serialize `value` compactly and write it as one frame.
pub async fn write_json<W: AsyncWrite + Unpin>(
    writer: &mut W,
    value: &serde_json::Value,
) -> std::io::Result<()> {
    let encoded = serde_json::to_vec(value)?;
    write_frame(writer, &encoded).await
}
