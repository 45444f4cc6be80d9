pub mod config;
pub mod connection;
pub mod encoding;
pub mod handlers;
pub mod headers;
pub mod message;
pub mod request;
pub mod response;
pub mod router;
pub mod server;

pub use config::{Config, ReadStrategy};
pub use headers::{HeaderName, Headers};
pub use message::{Message, ParseError};
pub use request::{Method, Request};
pub use response::{Response, Status};
pub use router::Router;
pub use server::Server;
