use std::io;

use thiserror::Error;

/// Coarse bucket a [`Socks5Error`] falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A read or write moved fewer bytes than required, or the transport failed.
    ShortIo,
    /// The client sent something the protocol does not allow.
    Protocol,
    /// The destination could not be dialed.
    Connect,
}

/// Everything that can end a session before the relay starts.
#[derive(Debug, Error)]
pub enum Socks5Error {
    /// Version byte was not 0x05. `stage` is "header" or "request".
    #[error("{stage}: VER expected 05 got {got:02x}")]
    BadVersion { stage: &'static str, got: u8 },
    /// Greeting announced zero methods.
    #[error("header: NMETHODS zero")]
    NoMethods,
    /// Offered methods did not include "no authentication".
    #[error("header: METHODS must contain 00 (NO AUTH REQUIRED): {}", crate::wire::hex(.offered))]
    NoAcceptableMethod { offered: Vec<u8> },
    #[error("request: CMD expected to be one of (01 02 03) got {0:02x}")]
    BadCommand(u8),
    #[error("request: RSV expected 00 got {0:02x}")]
    ReservedNonZero(u8),
    #[error("request: ATYP expected to be one of (01 03 04) got {0:02x}")]
    BadAddressType(u8),
    #[error("could not read {wanted} bytes from connection: {source}")]
    ShortRead {
        wanted: usize,
        #[source]
        source: io::Error,
    },
    #[error("could not write {wanted} bytes to connection: {source}")]
    ShortWrite {
        wanted: usize,
        #[source]
        source: io::Error,
    },
    #[error("could not connect to destination host {target}: {source}")]
    Connect {
        target: String,
        #[source]
        source: io::Error,
    },
}

impl Socks5Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ShortRead { .. } | Self::ShortWrite { .. } => ErrorKind::ShortIo,
            Self::Connect { .. } => ErrorKind::Connect,
            Self::BadVersion { .. }
            | Self::NoMethods
            | Self::NoAcceptableMethod { .. }
            | Self::BadCommand(_)
            | Self::ReservedNonZero(_)
            | Self::BadAddressType(_) => ErrorKind::Protocol,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_buckets() {
        assert_eq!(Socks5Error::NoMethods.kind(), ErrorKind::Protocol);
        assert_eq!(Socks5Error::BadAddressType(0x02).kind(), ErrorKind::Protocol);
        let short = Socks5Error::ShortRead {
            wanted: 4,
            source: io::ErrorKind::UnexpectedEof.into(),
        };
        assert_eq!(short.kind(), ErrorKind::ShortIo);
        let connect = Socks5Error::Connect {
            target: "127.0.0.1:1".to_string(),
            source: io::ErrorKind::ConnectionRefused.into(),
        };
        assert_eq!(connect.kind(), ErrorKind::Connect);
    }

    #[test]
    fn test_display_matches_wire_values() {
        let err = Socks5Error::BadVersion {
            stage: "header",
            got: 0x04,
        };
        assert_eq!(err.to_string(), "header: VER expected 05 got 04");

        let err = Socks5Error::NoAcceptableMethod {
            offered: vec![0x01, 0x02],
        };
        assert!(err.to_string().ends_with("01 02"));

        assert_eq!(
            Socks5Error::BadAddressType(0x02).to_string(),
            "request: ATYP expected to be one of (01 03 04) got 02"
        );
    }

    #[test]
    fn test_source_chain_keeps_io_error() {
        use std::error::Error as _;

        let err = Socks5Error::Connect {
            target: "127.0.0.1:1".to_string(),
            source: io::ErrorKind::ConnectionRefused.into(),
        };
        let source = err.source().and_then(|s| s.downcast_ref::<io::Error>());
        assert_eq!(
            source.map(io::Error::kind),
            Some(io::ErrorKind::ConnectionRefused)
        );
        assert!(Socks5Error::NoMethods.source().is_none());
    }
}
