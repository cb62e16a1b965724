use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegError {
    /// Mailbox provider answered HTTP 429. Transient; the retry wrapper
    /// absorbs these up to its attempt budget.
    #[error("rate limited by mailbox provider")]
    RateLimited,

    #[error("mailbox provider error: {0}")]
    Provider(String),

    #[error("verification email not received within {0:?}")]
    VerificationTimeout(Duration),

    #[error("form driver error: {0}")]
    Driver(String),

    #[error("no verification code found in message")]
    ExtractionFailed,

    #[error("config error: {0}")]
    Config(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl RegError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, RegError::RateLimited)
    }
}
