use tracing::trace;

use crate::request::Request;
use crate::response::{Response, Status};

/// Shapes a response for a request. Handlers never touch the socket.
pub type Handler = Box<dyn Fn(&Request, &mut Response) + Send + Sync>;

/// An ordered list of path rules. Rules are tried in registration order and
/// the first match handles the request; with no match the response is 404.
#[derive(Default)]
pub struct Router {
    routes: Vec<Route>,
}

struct Route {
    pattern: Pattern,
    handler: Handler,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Pattern {
    Exact(String),
    Prefix(String),
}

impl Router {
    pub fn new() -> Self {
        Default::default()
    }

    /// Routes requests whose path equals `path`.
    pub fn exact<P, H>(self, path: P, handler: H) -> Self
    where
        P: Into<String>,
        H: Fn(&Request, &mut Response) + Send + Sync + 'static,
    {
        self.with_route(Pattern::Exact(path.into()), handler)
    }

    /// Routes requests whose path starts with `prefix`.
    pub fn prefix<P, H>(self, prefix: P, handler: H) -> Self
    where
        P: Into<String>,
        H: Fn(&Request, &mut Response) + Send + Sync + 'static,
    {
        self.with_route(Pattern::Prefix(prefix.into()), handler)
    }

    fn with_route<H>(mut self, pattern: Pattern, handler: H) -> Self
    where
        H: Fn(&Request, &mut Response) + Send + Sync + 'static,
    {
        self.routes.push(Route {
            pattern,
            handler: Box::new(handler),
        });
        self
    }

    pub fn route(&self, req: &Request, res: &mut Response) {
        match self.routes.iter().find(|r| r.pattern.matches(req.path())) {
            Some(route) => {
                trace!(pattern = ?route.pattern, path = req.path(), "route matched.");
                (route.handler)(req, res);
            }
            None => {
                trace!(path = req.path(), "no route matched.");
                res.with_status(Status::NotFound);
            }
        }
    }
}

impl Pattern {
    fn matches(&self, path: &str) -> bool {
        match self {
            Self::Exact(p) => path == p,
            Self::Prefix(p) => path.starts_with(p.as_str()),
        }
    }
}
