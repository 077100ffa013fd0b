use std::io;

use log::{debug, error, warn};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

pub const RELAY_BUFFER_SIZE: usize = 8192;

/// Bytes moved in each direction by one relay.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RelayStats {
    pub client_to_dest: u64,
    pub dest_to_client: u64,
}

/// Copies client -> destination on the calling task and destination ->
/// client on a spawned task, then waits for both. Every direction, however
/// it ends, half-closes the opposite stream so its peer sees EOF. A clean
/// end-of-data leaves the other direction running until its own EOF; an
/// error stops the other direction as well.
/// Errors are logged, not returned.
pub async fn relay<C, D>(conn_id: u64, client: C, dest: D) -> RelayStats
where
    C: AsyncRead + AsyncWrite + Send + 'static,
    D: AsyncRead + AsyncWrite + Send + 'static,
{
    let (mut client_read, mut client_write) = tokio::io::split(client);
    let (mut dest_read, mut dest_write) = tokio::io::split(dest);

    let mut reverse =
        tokio::spawn(async move { copy_half(&mut dest_read, &mut client_write).await });

    let forward = copy_half(&mut client_read, &mut dest_write);
    tokio::pin!(forward);

    let (forward_first, reverse_first) = tokio::select! {
        res = &mut forward => (Some(res), None),
        res = &mut reverse => (None, Some(res)),
    };

    let forward_result = match (forward_first, &reverse_first) {
        (Some(res), _) => Some(res),
        (None, Some(Ok(Ok(_)))) => Some(forward.await),
        // destination side failed, the client has nothing left to send to
        (None, _) => None,
    };

    let mut stats = RelayStats::default();
    match forward_result {
        Some(Ok(n)) => {
            debug!("= {} client -> destination finished after {} bytes", conn_id, n);
            stats.client_to_dest = n;
        }
        Some(Err(ref e)) => warn!("= {} client -> destination: {}", conn_id, e),
        None => debug!("= {} client -> destination stopped", conn_id),
    }

    let reverse_result = match reverse_first {
        Some(res) => res,
        None => {
            if matches!(forward_result, Some(Err(_))) {
                reverse.abort();
            }
            reverse.await
        }
    };

    match reverse_result {
        Ok(Ok(n)) => {
            debug!("= {} destination -> client finished after {} bytes", conn_id, n);
            stats.dest_to_client = n;
        }
        Ok(Err(e)) => warn!("= {} destination -> client: {}", conn_id, e),
        Err(e) if e.is_cancelled() => debug!("= {} destination -> client stopped", conn_id),
        Err(e) => error!("= {} destination -> client task failed: {}", conn_id, e),
    }

    stats
}

/// Read, write, repeat until the reader reports end-of-data or either side
/// fails, then shut down the writer.
async fn copy_half<R, W>(reader: &mut R, writer: &mut W) -> io::Result<u64>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let result = copy_until_eof(reader, writer).await;
    // peer may already be gone
    if let Err(e) = writer.shutdown().await {
        debug!("shutdown after copy: {}", e);
    }
    result
}

async fn copy_until_eof<R, W>(reader: &mut R, writer: &mut W) -> io::Result<u64>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = [0u8; RELAY_BUFFER_SIZE];
    let mut total = 0u64;
    loop {
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            return Ok(total);
        }
        writer.write_all(&buf[..n]).await?;
        total += n as u64;
    }
}
