use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use clap::{Parser, ValueEnum};
use log::LevelFilter;

#[derive(Parser, Debug)]
#[command(name = "socks5")]
#[command(about = "SOCKS5 proxy server (no authentication, CONNECT)")]
pub struct Args {
    /// Port to listen on
    #[arg(long, default_value_t = 8888)]
    pub port: u16,

    /// Minimal log level to output
    #[arg(long, value_enum, ignore_case = true, default_value_t = LogLevel::Warn)]
    pub loglevel: LogLevel,
}

impl Args {
    /// All interfaces on the configured port.
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), self.port)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "UPPER")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Error => LevelFilter::Error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["socks5"]).unwrap();
        assert_eq!(args.port, 8888);
        assert_eq!(args.loglevel, LogLevel::Warn);
        assert_eq!(args.listen_addr(), "0.0.0.0:8888".parse::<SocketAddr>().unwrap());
    }

    #[test]
    fn test_flags() {
        let args = Args::try_parse_from([
            "socks5",
            "--port",
            "1080",
            "--loglevel",
            "DEBUG",
        ])
        .unwrap();
        assert_eq!(args.listen_addr(), "0.0.0.0:1080".parse::<SocketAddr>().unwrap());
        assert_eq!(LevelFilter::from(args.loglevel), LevelFilter::Debug);

        let args = Args::try_parse_from(["socks5", "--loglevel", "info"]).unwrap();
        assert_eq!(args.loglevel, LogLevel::Info);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(Args::try_parse_from(["socks5", "--loglevel", "TRACE"]).is_err());
        assert!(Args::try_parse_from(["socks5", "--port", "70000"]).is_err());
    }

    #[test]
    fn test_only_port_and_loglevel_flags() {
        assert!(Args::try_parse_from(["socks5", "--listen", "127.0.0.1"]).is_err());
        assert!(Args::try_parse_from(["socks5", "--host", "127.0.0.1"]).is_err());
    }
}
