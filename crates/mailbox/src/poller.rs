use std::time::{Duration, Instant};

use tracing::debug;

use regforge_core::{RegError, VerificationMessage};

use crate::MailboxProvider;

pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_millis(60_000);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(5_000);

/// Poll the mailbox until a message satisfies `predicate` or the deadline
/// elapses. Each cycle fetches the listing, then full content per entry in
/// listing order, short-circuiting on the first match. The provider exposes
/// no subscription mechanism, so polling is the only option.
pub async fn wait_for_message<P>(
    provider: &dyn MailboxProvider,
    predicate: P,
    timeout: Duration,
    interval: Duration,
) -> Result<VerificationMessage, RegError>
where
    P: Fn(&VerificationMessage) -> bool,
{
    let start = Instant::now();
    while start.elapsed() < timeout {
        let listing = provider.list_messages().await?;
        debug!(messages = listing.len(), "polled mailbox");
        for entry in &listing {
            let message = provider.fetch_message(&entry.id).await?;
            if predicate(&message) {
                return Ok(message);
            }
        }
        tokio::time::sleep(interval).await;
    }
    Err(RegError::VerificationTimeout(timeout))
}

/// Default predicate: case-insensitive match of subject, text, or HTML body
/// against the configured keyword set.
pub fn keyword_predicate(keywords: Vec<String>) -> impl Fn(&VerificationMessage) -> bool {
    let keywords: Vec<String> = keywords.into_iter().map(|k| k.to_lowercase()).collect();
    move |message: &VerificationMessage| {
        let subject = message.subject.to_lowercase();
        let text = message.text.to_lowercase();
        let html = message.html.to_lowercase();
        keywords
            .iter()
            .any(|kw| subject.contains(kw) || text.contains(kw) || html.contains(kw))
    }
}
