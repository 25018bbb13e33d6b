use std::error::Error as _;

use thiserror::Error;

/// Raised from the redirect policy when a hop targets a local address.
#[derive(Debug, Error)]
#[error("redirect to {0} refused")]
pub struct BlockedRedirect(pub String);

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("request timed out")]
    Timeout,

    #[error("too many redirects")]
    RedirectLoop,

    #[error("redirect to local address {0} refused")]
    RedirectBlocked(String),

    #[error("http error {status}")]
    Http { status: reqwest::StatusCode },

    #[error("body too large ({0} bytes)")]
    BodyTooLarge(u64),

    #[error("unsupported content-type: {0}")]
    UnsupportedContentType(String),

    #[error("io error: {0}")]
    Io(String),
}

impl FetchError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }

    pub fn from_reqwest_error(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_redirect() {
            match blocked_redirect(&err) {
                Some(blocked) => Self::RedirectBlocked(blocked.0.clone()),
                None => Self::RedirectLoop,
            }
        } else if let Some(status) = err.status() {
            Self::Http { status }
        } else if err.is_connect() || err.is_request() {
            Self::Connect(err.to_string())
        } else {
            Self::Io(err.to_string())
        }
    }
}

fn blocked_redirect(err: &reqwest::Error) -> Option<&BlockedRedirect> {
    let mut source = err.source();
    while let Some(inner) = source {
        if let Some(blocked) = inner.downcast_ref::<BlockedRedirect>() {
            return Some(blocked);
        }
        source = inner.source();
    }
    None
}
