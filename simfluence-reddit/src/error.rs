//! Error types for the Reddit client

use thiserror::Error;

pub type Result<T> = std::result::Result<T, RedditError>;

#[derive(Error, Debug)]
pub enum RedditError {
    /// Not a valid Reddit account name
    #[error("invalid Reddit username: '{0}'")]
    InvalidUsername(String),

    #[error("request to Reddit failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Reddit answered with a non-success status
    #[error("Reddit returned {status} for {endpoint}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("unexpected Reddit payload for {endpoint}: {source}")]
    Payload {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
}

impl RedditError {
    /// True when Reddit rejected the access token.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Status { status: 401 | 403, .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthorized_statuses() {
        let err = RedditError::Status {
            endpoint: "/user/x/about".into(),
            status: 401,
            body: String::new(),
        };
        assert!(err.is_unauthorized());

        let err = RedditError::Status {
            endpoint: "/user/x/about".into(),
            status: 500,
            body: String::new(),
        };
        assert!(!err.is_unauthorized());
    }
}
