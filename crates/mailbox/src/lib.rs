use async_trait::async_trait;

use regforge_core::{MessageSummary, RegError, VerificationMessage};

pub mod mailtm;
pub mod poller;
pub mod retry;

pub use mailtm::*;
pub use poller::*;
pub use retry::*;

/// Disposable-mailbox provider consumed by the registration job and the
/// verification poller. One instance per job attempt.
#[async_trait]
pub trait MailboxProvider: Send + Sync {
    /// Create a fresh mailbox and return its address.
    async fn provision(&mut self) -> Result<String, RegError>;

    /// Lightweight inbox listing, newest ordering as the provider returns it.
    async fn list_messages(&self) -> Result<Vec<MessageSummary>, RegError>;

    /// Full content fetch for one listed message.
    async fn fetch_message(&self, id: &str) -> Result<VerificationMessage, RegError>;
}

/// Hands out one provider per job attempt.
pub trait MailboxFactory: Send + Sync {
    fn create(&self) -> Box<dyn MailboxProvider>;
}
