//! Errors surfaced by the YouTube API client.

use serde::Deserialize;

/// A failed API call, in the shape the views render.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request never produced a usable response (connection, TLS, decoding).
    #[error("{0}")]
    Transport(#[source] reqwest::Error),
    /// The API answered with a non-2xx status.
    #[error("{status} - {message}")]
    Server { status: u16, message: String },
}

// The request URL carries the API key, so it never leaves the client.
impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        ApiError::Transport(e.without_url())
    }
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Transport(e) => e.status().map(|s| s.as_u16()),
            ApiError::Server { status, .. } => Some(*status),
        }
    }

    /// Advice for the user on how to get past this error, if we have any.
    ///
    /// `signed_in` is whether the failing request carried a bearer token.
    pub fn suggested_fix(&self, signed_in: bool) -> Option<&'static str> {
        suggested_fix(self.status()?, signed_in)
    }

    /// Builds a [`ApiError::Server`] from a non-2xx response body.
    ///
    /// Google APIs wrap failures as `{"error": {"code": .., "message": ..}}`; anything
    /// else is passed through verbatim.
    pub(crate) fn from_response_body(status: u16, body: &str) -> Self {
        #[derive(Deserialize)]
        struct Envelope {
            error: Inner,
        }
        #[derive(Deserialize)]
        struct Inner {
            message: String,
        }

        let message = match serde_json::from_str::<Envelope>(body) {
            Ok(envelope) => envelope.error.message,
            Err(_) if body.trim().is_empty() => "unknown error".to_string(),
            Err(_) => body.trim().to_string(),
        };
        ApiError::Server { status, message }
    }
}

/// Maps well-known HTTP status codes to something the user can act on.
pub fn suggested_fix(status: u16, signed_in: bool) -> Option<&'static str> {
    match status {
        400 => Some("Please enter a valid value."),
        401 if signed_in => Some(
            "You're either unauthorized to edit this playlist or your access has expired; \
             please sign in with the correct YouTube account.",
        ),
        401 => Some("Please sign in."),
        403 => Some("I don't know what you're trying to do, but you can't do it."),
        404 => Some("Try another value."),
        _ => None,
    }
}
