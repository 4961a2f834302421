// Shared response handling for plex.tv and media-server requests.

use reqwest::StatusCode;
use tracing::{debug, trace};

use crate::error::Error;
use crate::tree::RawTree;

/// Check the status, then parse the body into a `RawTree`.
///
/// 401 becomes `Error::Authentication`; any other non-success status
/// becomes `Error::Api`. Both carry the text of the body's `<error>`
/// element when the body has one.
pub(crate) async fn read_tree(resp: reqwest::Response) -> Result<RawTree, Error> {
    let status = resp.status();
    let body = resp.text().await?;
    trace!(%status, bytes = body.len(), "response received");

    if status == StatusCode::UNAUTHORIZED {
        return Err(Error::Authentication {
            message: error_message(&body).unwrap_or_else(|| "unauthorized (HTTP 401)".into()),
        });
    }

    if !status.is_success() {
        debug!(%status, "request failed");
        return Err(Error::Api {
            status: status.as_u16(),
            message: error_message(&body),
        });
    }

    RawTree::parse(&body)
}

/// Classify a send failure, surfacing timeouts as their own variant.
pub(crate) fn send_error(err: reqwest::Error, timeout_secs: u64) -> Error {
    if err.is_timeout() {
        Error::Timeout { timeout_secs }
    } else {
        Error::Transport(err)
    }
}

/// Pull the message out of an error body such as
/// `<errors><error>Invalid token</error></errors>`.
fn error_message(body: &str) -> Option<String> {
    let tree = RawTree::parse(body).ok()?;
    tree.find("error")
        .and_then(|e| e.text.clone())
        .filter(|t| !t.trim().is_empty())
}
