//! SOCKS5 proxy server: no-authentication method negotiation, CONNECT
//! requests over IPv4, IPv6 and domain addresses, and a bidirectional relay.

pub mod address;
pub mod config;
pub mod dialer;
pub mod error;
pub mod logging;
pub mod relay;
pub mod server;
pub mod session;
pub mod wire;

pub use address::{AddressType, DialFamily, TargetAddr};
pub use dialer::{Dialer, TcpDialer};
pub use error::{ErrorKind, Socks5Error};
pub use relay::RelayStats;
pub use server::Server;
pub use session::{Request, Session};
