use std::{
    fmt::{self, Display, Formatter},
    net::{Ipv4Addr, Ipv6Addr, SocketAddr},
};

use anyhow::Result;
use bytes::{BufMut, Bytes, BytesMut};
use tokio::io::AsyncRead;

use crate::{
    error::Socks5Error,
    wire::{self, DOMAIN_NAME, IPV4_ADDRESS, IPV6_ADDRESS},
};

/// The ATYP tag of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressType {
    Ipv4 = 0x01,
    Domain = 0x03,
    Ipv6 = 0x04,
}

impl TryFrom<u8> for AddressType {
    type Error = Socks5Error;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            IPV4_ADDRESS => Ok(AddressType::Ipv4),
            DOMAIN_NAME => Ok(AddressType::Domain),
            IPV6_ADDRESS => Ok(AddressType::Ipv6),
            _ => Err(Socks5Error::BadAddressType(value)),
        }
    }
}

/// Network family the destination is dialed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialFamily {
    Ipv4,
    Ipv6,
    /// Let name resolution pick.
    Any,
}

impl DialFamily {
    pub fn matches(&self, addr: &SocketAddr) -> bool {
        match self {
            DialFamily::Ipv4 => addr.is_ipv4(),
            DialFamily::Ipv6 => addr.is_ipv6(),
            DialFamily::Any => true,
        }
    }
}

impl Display for DialFamily {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            DialFamily::Ipv4 => write!(f, "tcp4"),
            DialFamily::Ipv6 => write!(f, "tcp6"),
            DialFamily::Any => write!(f, "tcp"),
        }
    }
}

/// A destination address as it arrived on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetAddr {
    Ipv4(Ipv4Addr),
    Ipv6(Ipv6Addr),
    /// Name bytes without the length prefix. Never longer than 255.
    Domain(Bytes),
}

impl TargetAddr {
    /// Consumes exactly the bytes of one address field: 4 for IPv4,
    /// 16 for IPv6, `1 + L` for a domain of length `L`.
    pub async fn read_from<R>(reader: &mut R, atyp: AddressType) -> Result<Self>
    where
        R: AsyncRead + Unpin,
    {
        let address = match atyp {
            AddressType::Ipv4 => {
                let buf = wire::read_exact(reader, 4).await?;
                TargetAddr::Ipv4(Ipv4Addr::new(buf[0], buf[1], buf[2], buf[3]))
            }
            AddressType::Ipv6 => {
                let buf = wire::read_exact(reader, 16).await?;
                let mut octets = [0u8; 16];
                octets.copy_from_slice(&buf);
                TargetAddr::Ipv6(Ipv6Addr::from(octets))
            }
            AddressType::Domain => {
                let len = wire::read_exact(reader, 1).await?[0] as usize;
                let name = wire::read_exact(reader, len).await?;
                TargetAddr::Domain(name.freeze())
            }
        };
        Ok(address)
    }

    pub fn address_type(&self) -> AddressType {
        match self {
            TargetAddr::Ipv4(_) => AddressType::Ipv4,
            TargetAddr::Ipv6(_) => AddressType::Ipv6,
            TargetAddr::Domain(_) => AddressType::Domain,
        }
    }

    pub fn family(&self) -> DialFamily {
        match self {
            TargetAddr::Ipv4(_) => DialFamily::Ipv4,
            TargetAddr::Ipv6(_) => DialFamily::Ipv6,
            TargetAddr::Domain(_) => DialFamily::Any,
        }
    }

    /// Host part of a dial target. IPv6 is bracketed so `host:port` parses.
    pub fn host(&self) -> String {
        match self {
            TargetAddr::Ipv4(ip) => ip.to_string(),
            TargetAddr::Ipv6(ip) => format!("[{}]", ip),
            TargetAddr::Domain(name) => String::from_utf8_lossy(name).into_owned(),
        }
    }

    pub fn dial_target(&self, port: u16) -> String {
        format!("{}:{}", self.host(), port)
    }

    /// Appends the raw wire form, without the ATYP tag.
    pub fn write_to(&self, buf: &mut BytesMut) {
        match self {
            TargetAddr::Ipv4(ip) => buf.put_slice(&ip.octets()),
            TargetAddr::Ipv6(ip) => buf.put_slice(&ip.octets()),
            TargetAddr::Domain(name) => {
                buf.put_u8(name.len() as u8);
                buf.put_slice(name);
            }
        }
    }

    pub fn raw(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.serialized_len());
        self.write_to(&mut buf);
        buf.freeze()
    }

    pub fn serialized_len(&self) -> usize {
        match self {
            TargetAddr::Ipv4(_) => 4,
            TargetAddr::Ipv6(_) => 16,
            TargetAddr::Domain(name) => 1 + name.len(),
        }
    }
}

impl Display for TargetAddr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.host())
    }
}
