//! Per-connection SOCKS5 state machine: greeting, method selection,
//! request, dial, reply, relay. Every step runs strictly after the
//! previous one and any failure ends the session.

use std::net::SocketAddr;

use anyhow::Result;
use bytes::{Buf, BufMut, Bytes, BytesMut};
use log::{info, warn};
use tokio::io::{AsyncRead, AsyncWrite};

use crate::{
    address::{AddressType, TargetAddr},
    dialer::Dialer,
    error::Socks5Error,
    relay,
    wire::{
        self, Command, Reply, NO_ACCEPTABLE_METHODS, NO_AUTHENTICATION, RESERVED, SOCKS_VERSION,
    },
};

/// A parsed client request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub command: Command,
    pub address: TargetAddr,
    pub port: u16,
}

impl Request {
    pub fn dial_target(&self) -> String {
        self.address.dial_target(self.port)
    }

    /// The request echoed back with byte 1 set to `reply`. Address and
    /// port are the raw request bytes, not the address actually dialed.
    pub fn reply(&self, reply: Reply) -> Bytes {
        let mut buf = BytesMut::with_capacity(4 + self.address.serialized_len() + 2);
        buf.put_u8(SOCKS_VERSION);
        buf.put_u8(reply as u8);
        buf.put_u8(RESERVED);
        buf.put_u8(self.address.address_type() as u8);
        self.address.write_to(&mut buf);
        buf.put_u16(self.port);
        buf.freeze()
    }
}

/// One accepted client connection.
pub struct Session<S, D> {
    conn_id: u64,
    peer: SocketAddr,
    client: S,
    dialer: D,
}

impl<S, D> Session<S, D>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    D: Dialer + Sync,
{
    pub fn new(conn_id: u64, peer: SocketAddr, client: S, dialer: D) -> Self {
        Self {
            conn_id,
            peer,
            client,
            dialer,
        }
    }

    /// Runs the session to completion. Both streams are dropped when this
    /// returns, whichever path it takes.
    pub async fn handle(mut self) -> Result<()> {
        info!("< {} reading header", self.conn_id);
        self.negotiate_method().await?;

        info!("< {} reading request", self.conn_id);
        let request = self.read_request().await?;
        if request.command != Command::Connect {
            warn!(
                "= {} {:?} requested, handling as CONNECT",
                self.conn_id, request.command
            );
        }

        let target = request.dial_target();
        info!(
            "> {} connecting to {} ({})",
            self.conn_id,
            target,
            request.address.family()
        );
        let dialed = self.dialer.dial(request.address.family(), &target).await;
        let dest = match dialed {
            Ok(dest) => dest,
            Err(source) => {
                wire::write_exact(&mut self.client, &request.reply(Reply::HostUnreachable))
                    .await?;
                return Err(Socks5Error::Connect { target, source }.into());
            }
        };

        wire::write_exact(&mut self.client, &request.reply(Reply::Succeeded)).await?;

        info!(
            "= {} forwarding data {} <-> {}",
            self.conn_id, self.peer, target
        );
        let stats = relay::relay(self.conn_id, self.client, dest).await;
        info!(
            "= {} closing connections ({} bytes up, {} bytes down)",
            self.conn_id, stats.client_to_dest, stats.dest_to_client
        );
        Ok(())
    }

    /// Greeting and method selection. Only "no authentication" is offered;
    /// anything else gets `05 FF` and an error.
    async fn negotiate_method(&mut self) -> Result<()> {
        let header = wire::read_exact(&mut self.client, 2).await?;
        if header[0] != SOCKS_VERSION {
            return Err(Socks5Error::BadVersion {
                stage: "header",
                got: header[0],
            }
            .into());
        }
        let nmethods = header[1] as usize;
        if nmethods == 0 {
            return Err(Socks5Error::NoMethods.into());
        }

        let methods = wire::read_exact(&mut self.client, nmethods).await?;
        if !methods.contains(&NO_AUTHENTICATION) {
            wire::write_exact(&mut self.client, &[SOCKS_VERSION, NO_ACCEPTABLE_METHODS]).await?;
            return Err(Socks5Error::NoAcceptableMethod {
                offered: methods.to_vec(),
            }
            .into());
        }

        wire::write_exact(&mut self.client, &[SOCKS_VERSION, NO_AUTHENTICATION]).await?;
        Ok(())
    }

    async fn read_request(&mut self) -> Result<Request> {
        let header = wire::read_exact(&mut self.client, 4).await?;
        if header[0] != SOCKS_VERSION {
            return Err(Socks5Error::BadVersion {
                stage: "request",
                got: header[0],
            }
            .into());
        }
        let command = Command::try_from(header[1])?;
        if header[2] != RESERVED {
            return Err(Socks5Error::ReservedNonZero(header[2]).into());
        }
        let atyp = AddressType::try_from(header[3])?;

        let address = TargetAddr::read_from(&mut self.client, atyp).await?;
        let port = wire::read_exact(&mut self.client, 2).await?.get_u16();

        Ok(Request {
            command,
            address,
            port,
        })
    }
}
