use std::fs;
use std::path::{Component, Path, PathBuf};

use tracing::{debug, warn};

use crate::config::Config;
use crate::encoding::{self, GZIP};
use crate::request::{Method, Request};
use crate::response::{Response, Status};
use crate::router::Router;

pub const USER_AGENT_PATH: &str = "/user-agent";
pub const ECHO_PREFIX: &str = "/echo/";
pub const FILES_PREFIX: &str = "/files/";

/// The server's route table, in match order.
pub fn routes(config: &Config) -> Router {
    let files = Files::new(config.directory.clone());
    Router::new()
        .exact("/", root)
        .prefix(FILES_PREFIX, move |req, res| files.handle(req, res))
        .exact(USER_AGENT_PATH, user_agent)
        .prefix(ECHO_PREFIX, echo)
}

pub fn root(_req: &Request, res: &mut Response) {
    res.with_status(Status::OK);
}

/// Replies with the client's `User-Agent`, or 404 if it sent none.
pub fn user_agent(req: &Request, res: &mut Response) {
    let agent = match req.headers().get("User-Agent") {
        Some(agent) => agent,
        None => {
            res.with_status(Status::NotFound);
            return;
        }
    };
    res.with_status(Status::OK)
        .as_text()
        .with_header("Content-Length", agent.len().to_string())
        .with_body(agent);
}

/// Replies with everything after `/echo/`, gzip-compressed if the client
/// accepts it.
pub fn echo(req: &Request, res: &mut Response) {
    let text = match req.path().strip_prefix(ECHO_PREFIX) {
        Some(text) => text,
        None => {
            res.with_status(Status::NotFound);
            return;
        }
    };

    let body = if encoding::accepts_gzip(req) {
        match encoding::gzip(text.as_bytes()) {
            Ok(compressed) => {
                res.with_header("Content-Encoding", GZIP);
                compressed
            }
            Err(error) => {
                warn!(?error, "failed to compress echo body.");
                res.with_status(Status::InternalServerError).with_body(Vec::new());
                return;
            }
        }
    } else {
        text.as_bytes().to_vec()
    };

    res.with_status(Status::OK)
        .as_text()
        .with_header("Content-Length", body.len().to_string())
        .with_body(body);
}

/// Serves `/files/{name}` out of a single directory.
#[derive(Debug, Clone)]
pub struct Files {
    directory: PathBuf,
}

impl Files {
    pub fn new<P: Into<PathBuf>>(directory: P) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn handle(&self, req: &Request, res: &mut Response) {
        let path = match req
            .path()
            .strip_prefix(FILES_PREFIX)
            .and_then(|name| self.resolve(name))
        {
            Some(path) => path,
            None => {
                debug!(path = req.path(), "file name does not resolve.");
                res.with_status(Status::NotFound);
                return;
            }
        };

        match req.method() {
            Method::Get => self.read(&path, res),
            Method::Post => self.write(&path, req.body(), res),
            _ => {
                res.with_status(Status::MethodNotAllowed);
            }
        }
    }

    /// Maps a file name onto the served directory. Names that are empty or
    /// step outside the directory don't resolve.
    fn resolve(&self, name: &str) -> Option<PathBuf> {
        let name = Path::new(name);
        let is_plain = name
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if name.as_os_str().is_empty() || !is_plain {
            return None;
        }
        Some(self.directory.join(name))
    }

    fn read(&self, path: &Path, res: &mut Response) {
        if !path.is_file() {
            res.with_status(Status::NotFound);
            return;
        }
        match fs::read(path) {
            Ok(content) => {
                res.with_status(Status::OK)
                    .as_octet_stream()
                    .with_header("Content-Length", content.len().to_string())
                    .with_body(content);
            }
            Err(error) => {
                warn!(?error, path = %path.display(), "failed to read file.");
                res.with_status(Status::InternalServerError)
                    .with_body("Internal Server Error: Could not read file");
            }
        }
    }

    fn write(&self, path: &Path, content: &[u8], res: &mut Response) {
        match fs::write(path, content) {
            Ok(()) => {
                debug!(path = %path.display(), len = content.len(), "wrote file.");
                res.with_status(Status::Created);
            }
            Err(error) => {
                warn!(?error, path = %path.display(), "failed to write file.");
                res.with_status(Status::InternalServerError)
                    .with_body("Internal Server Error: Could not write file");
            }
        }
    }
}
