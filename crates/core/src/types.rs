use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identity generated for one registration job. The mailbox address is
/// assigned once per attempt, after provisioning.
#[derive(Debug, Clone)]
pub struct UserData {
    pub name: String,
    pub password: String,
    pub email: Option<String>,
}

/// Outcome of a single registration attempt, consumed by the retry loop.
#[derive(Debug, Clone)]
pub struct JobOutcome {
    pub success: bool,
    pub code: Option<String>,
    pub verified: bool,
    pub error: Option<String>,
}

impl JobOutcome {
    pub fn verified(code: String) -> Self {
        Self { success: true, code: Some(code), verified: true, error: None }
    }

    pub fn unverified() -> Self {
        Self { success: true, code: None, verified: false, error: None }
    }

    pub fn failed(error: String) -> Self {
        Self { success: false, code: None, verified: false, error: Some(error) }
    }
}

/// Aggregated counters for one batch invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchResult {
    pub success: u64,
    pub failed: u64,
    /// Attempts beyond the first, one increment per retry.
    pub retried: u64,
}

impl BatchResult {
    pub fn completed(&self) -> u64 {
        self.success + self.failed
    }
}

/// Lightweight inbox listing entry.
#[derive(Debug, Clone)]
pub struct MessageSummary {
    pub id: String,
    pub subject: String,
}

/// Full message content, fetched per candidate.
#[derive(Debug, Clone)]
pub struct VerificationMessage {
    pub id: String,
    pub subject: String,
    pub text: String,
    pub html: String,
}

impl VerificationMessage {
    /// Extraction input: prefer plain text, fall back to the HTML body.
    pub fn body(&self) -> &str {
        if self.text.is_empty() { &self.html } else { &self.text }
    }
}

/// One saved account, append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountRecord {
    pub email: String,
    pub password: String,
    pub verified: bool,
    pub timestamp: DateTime<Utc>,
}

impl AccountRecord {
    pub fn new(email: String, password: String, verified: bool) -> Self {
        Self { email, password, verified, timestamp: Utc::now() }
    }
}
