use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

pub const DEFAULT_BUFFER_SIZE: usize = 4096;

/// Drains `reader` into `writer` through a single fixed-size buffer and
/// returns the number of bytes copied. IO errors are returned unchanged.
pub async fn copy_buffered<R, W>(
    reader: &mut R,
    writer: &mut W,
    buf_size: usize,
) -> std::io::Result<u64>
where
    R: AsyncRead + Unpin + ?Sized,
    W: AsyncWrite + Unpin + ?Sized,
{
    let mut buf = vec![0u8; buf_size.max(1)];
    let mut total: u64 = 0;

    loop {
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        writer.write_all(&buf[..n]).await?;
        total += n as u64;
    }

    writer.flush().await?;
    Ok(total)
}
