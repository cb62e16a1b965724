use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::{info, warn};

use regforge_core::{AppConfig, BatchHandle};
use regforge_engine::{AccountStore, BatchRunner, ChromeDriverFactory, EventSink};
use regforge_mailbox::{MailTmFactory, RetryPolicy};

pub async fn run(
    config: AppConfig,
    count: usize,
    concurrency: Option<usize>,
    output: Option<String>,
) -> Result<()> {
    let mut registration = config.registration;
    if let Some(n) = concurrency {
        registration.concurrency = n;
    }

    let accounts_path = output.unwrap_or(config.storage.accounts_path);
    let store = Arc::new(AccountStore::new(&accounts_path));

    let policy = RetryPolicy {
        max_attempts: config.mailbox.retry_attempts,
        delay: Duration::from_millis(config.mailbox.retry_delay_ms),
    };
    let mailboxes = Arc::new(MailTmFactory::new(policy)?.with_base_url(config.mailbox.base_url));
    let drivers = Arc::new(ChromeDriverFactory);

    let runner = BatchRunner::new(
        Arc::new(registration),
        mailboxes,
        drivers,
        Arc::clone(&store),
        EventSink::disabled(),
    );
    let handle = BatchHandle::new();

    // Ctrl-C cancels cooperatively; in-flight jobs finish their current step.
    {
        let handle = handle.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("interrupt received, cancelling batch after in-flight jobs finish");
                handle.cancel();
            }
        });
    }

    info!(count, concurrency = ?concurrency, "starting batch registration");
    let result = runner.run_batch(count, &handle).await?;

    info!(
        success = result.success,
        failed = result.failed,
        retried = result.retried,
        state = ?handle.state(),
        accounts_file = %store.path().display(),
        "batch finished"
    );
    Ok(())
}
