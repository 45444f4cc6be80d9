use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, info, trace};

use crate::config::ReadStrategy;
use crate::message::ParseError;
use crate::request::Request;
use crate::response::{Response, Status};
use crate::router::Router;

enum State {
    AwaitingRequest,
    Dispatching(Request),
    Writing { response: Response, close: bool },
    Closed,
}

/// Drives one connection: read a request, route it, write the response, and
/// repeat until the peer hangs up, asks to close, or sends something that
/// can't be parsed.
///
/// With [`ReadStrategy::Bulk`] the connection is closed after the first
/// response.
pub async fn serve<S>(stream: S, router: &Router, strategy: ReadStrategy) -> anyhow::Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut stream = BufReader::new(stream);
    let mut state = State::AwaitingRequest;
    loop {
        state = match state {
            State::AwaitingRequest => match read_request(&mut stream, strategy).await {
                Ok(Some(req)) => {
                    info!(
                        method = req.method().to_string(),
                        path = req.path(),
                        "successfully parsed request."
                    );
                    State::Dispatching(req)
                }
                Ok(None) => {
                    trace!("peer closed the stream.");
                    State::Closed
                }
                Err(ParseError::Io(error)) => {
                    debug!(?error, "error reading request.");
                    State::Closed
                }
                Err(error) => {
                    debug!(%error, "malformed request.");
                    let mut response = Response::new();
                    response.with_status(Status::BadRequest);
                    State::Writing {
                        response,
                        close: true,
                    }
                }
            },
            State::Dispatching(req) => {
                let mut response = Response::new();
                router.route(&req, &mut response);
                let close = req.wants_close() || !strategy.supports_keep_alive();
                State::Writing { response, close }
            }
            State::Writing {
                mut response,
                close,
            } => {
                if close {
                    response.with_header("Connection", "close");
                }
                let status = response.status().code();
                response.try_write_to(&mut stream).await?;
                info!(status, close, "successfully sent response.");
                if close {
                    State::Closed
                } else {
                    State::AwaitingRequest
                }
            }
            State::Closed => break,
        };
    }
    stream.shutdown().await?;
    Ok(())
}

async fn read_request<S>(
    stream: &mut BufReader<S>,
    strategy: ReadStrategy,
) -> Result<Option<Request>, ParseError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    match strategy {
        ReadStrategy::Incremental => Request::try_parse_from(stream).await,
        ReadStrategy::Bulk => Request::try_parse_bulk(stream).await,
    }
}
