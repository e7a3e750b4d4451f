use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BotError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    #[error("Reddit authentication failed: {0}")]
    RedditAuth(String),

    #[error("Reddit API error ({status}): {message}")]
    RedditApi { status: StatusCode, message: String },

    #[error("Reddit response error: {0}")]
    RedditResponse(String),

    #[error("HTTP request error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl BotError {
    /// Whether this error ends the whole run rather than a single inbox item.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        match self {
            BotError::Config(_)
            | BotError::EnvVar(_)
            | BotError::RedditAuth(_)
            | BotError::Url(_) => true,
            // 403 is per-thing (banned subreddit, locked thread); only 401 means the token is gone
            BotError::RedditApi { status, .. } => *status == StatusCode::UNAUTHORIZED,
            BotError::RedditResponse(_) | BotError::Reqwest(_) => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, BotError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_failures_are_fatal() {
        assert!(BotError::RedditAuth("invalid_grant".to_string()).is_fatal());
        assert!(
            BotError::RedditApi {
                status: StatusCode::UNAUTHORIZED,
                message: String::new(),
            }
            .is_fatal()
        );
    }

    #[test]
    fn item_level_failures_are_recoverable() {
        assert!(
            !BotError::RedditApi {
                status: StatusCode::TOO_MANY_REQUESTS,
                message: "slow down".to_string(),
            }
            .is_fatal()
        );
        assert!(
            !BotError::RedditApi {
                status: StatusCode::FORBIDDEN,
                message: "Forbidden".to_string(),
            }
            .is_fatal()
        );
        assert!(!BotError::RedditResponse("RATELIMIT".to_string()).is_fatal());
    }
}
