use std::time::Duration;

use regforge_core::{
    AccountRecord, JobOutcome, RegError, RegistrationConfig, UnverifiedPolicy, UserData,
};
use regforge_mailbox::{keyword_predicate, wait_for_message, MailboxProvider};

use crate::driver::{FormDriver, SessionConfig};
use crate::events::EventSink;
use crate::extract::extract_code;
use crate::store::AccountStore;

/// Stage reached by an attempt, logged on failure for diagnosis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStage {
    Init,
    MailboxProvisioned,
    FormSubmitted,
    AwaitingVerification,
    CodeExtracted,
    Verified,
}

/// One end-to-end registration attempt: provision mailbox, drive the form,
/// wait for the verification message, extract and submit the code, persist
/// the account. Every failure is folded into the outcome here; nothing
/// escapes to the worker pool. The driver is released on every exit path.
#[allow(clippy::too_many_arguments)]
pub async fn run_attempt(
    config: &RegistrationConfig,
    user: &mut UserData,
    mailbox: &mut dyn MailboxProvider,
    driver: &mut dyn FormDriver,
    store: &AccountStore,
    events: &EventSink,
    job_no: usize,
    attempt: u32,
) -> JobOutcome {
    let mut stage = JobStage::Init;
    let result = attempt_inner(config, user, mailbox, driver, store, events, job_no, &mut stage).await;
    driver.release().await;

    match result {
        Ok(outcome) => outcome,
        Err(e) => {
            events.error(format!(
                "account {} attempt {} failed at {:?}: {}",
                job_no, attempt, stage, e
            ));
            JobOutcome::failed(e.to_string())
        }
    }
}

#[allow(clippy::too_many_arguments)]
async fn attempt_inner(
    config: &RegistrationConfig,
    user: &mut UserData,
    mailbox: &mut dyn MailboxProvider,
    driver: &mut dyn FormDriver,
    store: &AccountStore,
    events: &EventSink,
    job_no: usize,
    stage: &mut JobStage,
) -> Result<JobOutcome, RegError> {
    let address = mailbox.provision().await?;
    user.email = Some(address.clone());
    *stage = JobStage::MailboxProvisioned;
    events.info(format!("account {}: mailbox ready: {}", job_no, address));

    let session = SessionConfig {
        headless: config.headless,
        proxy: config.proxy.clone(),
    };
    driver.open(&session).await?;
    driver
        .submit_registration(&config.target_url, &config.selectors, user)
        .await?;
    *stage = JobStage::FormSubmitted;
    events.info(format!("account {}: registration form submitted", job_no));

    *stage = JobStage::AwaitingVerification;
    events.info(format!("account {}: waiting for verification email", job_no));
    let message = wait_for_message(
        &*mailbox,
        keyword_predicate(config.keywords.clone()),
        Duration::from_millis(config.poll_timeout_ms),
        Duration::from_millis(config.poll_interval_ms),
    )
    .await?;
    events.info(format!(
        "account {}: verification email received: {}",
        job_no, message.subject
    ));

    match extract_code(message.body(), config.verification_pattern.as_deref()) {
        Some(code) => {
            *stage = JobStage::CodeExtracted;
            events.info(format!("account {}: extracted code {}", job_no, code));

            driver
                .submit_verification_code(
                    &config.selectors.verification_code,
                    &config.selectors.verification_submit,
                    &code,
                )
                .await?;
            *stage = JobStage::Verified;

            store
                .append(AccountRecord::new(address, user.password.clone(), true))
                .await?;
            events.info(format!("account {}: registered and verified", job_no));
            Ok(JobOutcome::verified(code))
        }
        None => match config.unverified_policy {
            UnverifiedPolicy::SaveUnverified => {
                // Registration itself succeeded; keep the account, flagged.
                store
                    .append(AccountRecord::new(address, user.password.clone(), false))
                    .await?;
                events.warn(format!(
                    "account {}: no code found in email, saved unverified",
                    job_no
                ));
                Ok(JobOutcome::unverified())
            }
            UnverifiedPolicy::Fail => Err(RegError::ExtractionFailed),
        },
    }
}
