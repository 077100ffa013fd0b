use anyhow::Result;
use clap::Parser;
use log::{error, info};
use socks5::{config::Args, logging, Server};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(args.loglevel.into())?;

    let addr = args.listen_addr();
    let server = match Server::bind(addr).await {
        Ok(server) => server,
        Err(e) => {
            error!("Could not listen for connections on {}: {:#}", addr, e);
            std::process::exit(1);
        }
    };
    info!("Listening on {}", server.local_addr()?);

    server.run().await
}
