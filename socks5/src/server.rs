use std::net::SocketAddr;

use anyhow::Result;
use log::{debug, error};
use tokio::net::TcpListener;

use crate::{
    dialer::{Dialer, TcpDialer},
    session::Session,
};

/// Accept loop. Owns the connection counter; each accepted stream gets
/// the next id and its own task.
pub struct Server<D = TcpDialer> {
    listener: TcpListener,
    dialer: D,
}

impl Server<TcpDialer> {
    pub async fn bind(addr: SocketAddr) -> Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self::with_dialer(listener, TcpDialer))
    }
}

impl<D> Server<D>
where
    D: Dialer + Clone + Send + Sync + 'static,
{
    pub fn with_dialer(listener: TcpListener, dialer: D) -> Self {
        Self { listener, dialer }
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Runs forever. A failing or panicking session only ends its own task.
    pub async fn run(self) -> Result<()> {
        let mut next_id: u64 = 0;
        loop {
            match self.listener.accept().await {
                Ok((socket, addr)) => {
                    let conn_id = next_id;
                    next_id += 1;
                    debug!("= {} accepted connection from {}", conn_id, addr);

                    let session = Session::new(conn_id, addr, socket, self.dialer.clone());
                    tokio::spawn(async move {
                        if let Err(e) = session.handle().await {
                            error!("= {} error handling request: {:#}", conn_id, e);
                        }
                    });
                }
                Err(e) => {
                    error!("Could not accept connection: {}", e);
                }
            }
        }
    }
}
