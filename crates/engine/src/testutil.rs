//! Shared test doubles for the job and batch tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use regforge_core::{
    FieldSelectors, MessageSummary, RegError, RegistrationConfig, UserData, VerificationMessage,
};
use regforge_mailbox::{MailboxFactory, MailboxProvider};

use crate::driver::{DriverFactory, FormDriver, SessionConfig};

pub fn test_config() -> RegistrationConfig {
    RegistrationConfig {
        target_url: "https://example.test/register".into(),
        selectors: FieldSelectors {
            name: Some("input[name=name]".into()),
            email: "input[name=email]".into(),
            password: "input[name=password]".into(),
            submit: "button[type=submit]".into(),
            verification_code: "input[name=code]".into(),
            verification_submit: "button#verify".into(),
        },
        verification_pattern: None,
        max_retries: 2,
        concurrency: 1,
        proxy: None,
        captcha: None,
        keywords: vec!["verification".into(), "code".into(), "confirm".into()],
        unverified_policy: Default::default(),
        headless: true,
        poll_timeout_ms: 500,
        poll_interval_ms: 20,
    }
}

/// Mailbox with a fixed inbox; provisions unique addresses per instance.
pub struct MockMailbox {
    address: String,
    text: Option<String>,
}

#[async_trait]
impl MailboxProvider for MockMailbox {
    async fn provision(&mut self) -> Result<String, RegError> {
        Ok(self.address.clone())
    }

    async fn list_messages(&self) -> Result<Vec<MessageSummary>, RegError> {
        Ok(self
            .text
            .iter()
            .map(|_| MessageSummary { id: "m1".into(), subject: "Your verification code".into() })
            .collect())
    }

    async fn fetch_message(&self, id: &str) -> Result<VerificationMessage, RegError> {
        let text = self
            .text
            .clone()
            .ok_or_else(|| RegError::Provider(format!("no message {}", id)))?;
        Ok(VerificationMessage {
            id: id.into(),
            subject: "Your verification code".into(),
            text,
            html: String::new(),
        })
    }
}

pub struct MockMailboxFactory {
    counter: Arc<AtomicUsize>,
    text: Option<String>,
}

impl MockMailboxFactory {
    pub fn with_text(text: &str) -> Self {
        Self { counter: Arc::new(AtomicUsize::new(0)), text: Some(text.into()) }
    }

    pub fn empty_inbox() -> Self {
        Self { counter: Arc::new(AtomicUsize::new(0)), text: None }
    }
}

impl MailboxFactory for MockMailboxFactory {
    fn create(&self) -> Box<dyn MailboxProvider> {
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        Box::new(MockMailbox {
            address: format!("user{}@example.test", n),
            text: self.text.clone(),
        })
    }
}

/// Driver that records interactions; optionally fails registration or
/// sleeps to simulate slow page work.
pub struct MockDriver {
    fail_registration: bool,
    delay: Duration,
    releases: Arc<AtomicUsize>,
    codes: Arc<Mutex<Vec<String>>>,
    opens: Arc<AtomicUsize>,
}

#[async_trait]
impl FormDriver for MockDriver {
    async fn open(&mut self, _session: &SessionConfig) -> Result<(), RegError> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn submit_registration(
        &mut self,
        _target_url: &str,
        _selectors: &FieldSelectors,
        _user: &UserData,
    ) -> Result<(), RegError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.fail_registration {
            return Err(RegError::Driver("form submission failed".into()));
        }
        Ok(())
    }

    async fn submit_verification_code(
        &mut self,
        _code_selector: &str,
        _submit_selector: &str,
        code: &str,
    ) -> Result<(), RegError> {
        self.codes.lock().unwrap().push(code.to_string());
        Ok(())
    }

    async fn release(&mut self) {
        self.releases.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
pub struct MockDriverFactory {
    pub fail_registration: bool,
    pub delay: Duration,
    pub releases: Arc<AtomicUsize>,
    pub codes: Arc<Mutex<Vec<String>>>,
    pub opens: Arc<AtomicUsize>,
}

impl MockDriverFactory {
    pub fn failing_registration() -> Self {
        Self { fail_registration: true, ..Default::default() }
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self { delay, ..Default::default() }
    }
}

impl DriverFactory for MockDriverFactory {
    fn create(&self) -> Box<dyn FormDriver> {
        Box::new(MockDriver {
            fail_registration: self.fail_registration,
            delay: self.delay,
            releases: Arc::clone(&self.releases),
            codes: Arc::clone(&self.codes),
            opens: Arc::clone(&self.opens),
        })
    }
}
