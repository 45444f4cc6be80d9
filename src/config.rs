use std::fmt;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_PORT: u16 = 4221;

/// Settings fixed at startup and shared read-only with every connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory that `/files/{name}` reads from and writes into.
    pub directory: PathBuf,
    pub addr: SocketAddr,
    pub read_strategy: ReadStrategy,
}

/// How a connection reads requests off the socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadStrategy {
    /// Line by line, with the body framed by `Content-Length`. Supports
    /// persistent connections.
    #[default]
    Incremental,
    /// One bounded read per connection. The connection is closed after the
    /// first response.
    Bulk,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_PORT)),
            read_strategy: ReadStrategy::default(),
        }
    }
}

impl ReadStrategy {
    pub fn supports_keep_alive(self) -> bool {
        matches!(self, Self::Incremental)
    }
}

impl FromStr for ReadStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "incremental" => Ok(Self::Incremental),
            "bulk" => Ok(Self::Bulk),
            other => Err(format!(
                "unknown read strategy {:?}, expected `incremental` or `bulk`",
                other
            )),
        }
    }
}

impl fmt::Display for ReadStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Incremental => write!(f, "incremental"),
            Self::Bulk => write!(f, "bulk"),
        }
    }
}
