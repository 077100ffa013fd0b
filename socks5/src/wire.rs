//! SOCKS5 constants and the exact-length read/write primitives every
//! handshake step is built on. No retries: a short read or write is fatal.

use anyhow::Result;
use bytes::BytesMut;
use log::debug;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::Socks5Error;

pub const SOCKS_VERSION: u8 = 0x05;
pub const NO_AUTHENTICATION: u8 = 0x00;
pub const NO_ACCEPTABLE_METHODS: u8 = 0xFF;
pub const RESERVED: u8 = 0x00;

pub const IPV4_ADDRESS: u8 = 0x01;
pub const DOMAIN_NAME: u8 = 0x03;
pub const IPV6_ADDRESS: u8 = 0x04;

/// Request commands (RFC 1928 section 4).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Connect = 0x01,
    Bind = 0x02,
    UdpAssociate = 0x03,
}

impl TryFrom<u8> for Command {
    type Error = Socks5Error;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            0x01 => Ok(Command::Connect),
            0x02 => Ok(Command::Bind),
            0x03 => Ok(Command::UdpAssociate),
            _ => Err(Socks5Error::BadCommand(value)),
        }
    }
}

/// Reply codes this server emits. RFC 1928 defines 0x01..=0x08; only
/// success and host-unreachable are ever sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    Succeeded = 0x00,
    HostUnreachable = 0x04,
}

/// Reads exactly `n` bytes. End-of-stream before `n` bytes is an error.
pub async fn read_exact<R>(reader: &mut R, n: usize) -> Result<BytesMut>
where
    R: AsyncRead + Unpin,
{
    let mut buf = BytesMut::zeroed(n);
    reader
        .read_exact(&mut buf)
        .await
        .map_err(|source| Socks5Error::ShortRead { wanted: n, source })?;
    debug!("< read {}", hex(&buf));
    Ok(buf)
}

/// Writes and flushes the whole buffer.
pub async fn write_exact<W>(writer: &mut W, data: &[u8]) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    debug!("> writing {}", hex(data));
    let wanted = data.len();
    writer
        .write_all(data)
        .await
        .map_err(|source| Socks5Error::ShortWrite { wanted, source })?;
    writer
        .flush()
        .await
        .map_err(|source| Socks5Error::ShortWrite { wanted, source })?;
    Ok(())
}

/// Space separated lowercase hex, e.g. `05 01 00`.
pub fn hex(data: &[u8]) -> String {
    data.iter()
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(" ")
}
