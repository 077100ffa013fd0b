use std::{future::Future, io};

use log::debug;
use tokio::{
    io::{AsyncRead, AsyncWrite},
    net::{lookup_host, TcpStream},
};

use crate::address::DialFamily;

/// Opens the outbound leg of a session.
pub trait Dialer {
    type Stream: AsyncRead + AsyncWrite + Unpin + Send + 'static;

    /// `target` is `host:port`, with IPv6 hosts bracketed.
    fn dial(
        &self,
        family: DialFamily,
        target: &str,
    ) -> impl Future<Output = io::Result<Self::Stream>> + Send;
}

/// Dials plain TCP, restricted to the requested address family.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpDialer;

impl Dialer for TcpDialer {
    type Stream = TcpStream;

    fn dial(
        &self,
        family: DialFamily,
        target: &str,
    ) -> impl Future<Output = io::Result<TcpStream>> + Send {
        async move {
            let mut last_err = None;
            for addr in lookup_host(target).await?.filter(|addr| family.matches(addr)) {
                debug!("dialing {} {}", family, addr);
                match TcpStream::connect(addr).await {
                    Ok(stream) => return Ok(stream),
                    Err(e) => last_err = Some(e),
                }
            }
            Err(last_err.unwrap_or_else(|| {
                io::Error::new(
                    io::ErrorKind::AddrNotAvailable,
                    format!("no {} address found for {}", family, target),
                )
            }))
        }
    }
}
