use serde::Deserialize;
use url::Url;

use crate::error::RegError;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub registration: RegistrationConfig,
    #[serde(default)]
    pub mailbox: MailboxConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Batch-level configuration. Immutable for the duration of a batch.
#[derive(Debug, Deserialize, Clone)]
pub struct RegistrationConfig {
    /// Registration page of the target service.
    pub target_url: String,
    pub selectors: FieldSelectors,
    /// Custom verification-code regex, tried before the built-in heuristics.
    #[serde(default)]
    pub verification_pattern: Option<String>,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    #[serde(default)]
    pub proxy: Option<ProxyConfig>,
    #[serde(default)]
    pub captcha: Option<CaptchaConfig>,
    /// Keywords that identify the verification message (subject or body).
    #[serde(default = "default_keywords")]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub unverified_policy: UnverifiedPolicy,
    #[serde(default = "default_headless")]
    pub headless: bool,
    #[serde(default = "default_poll_timeout_ms")]
    pub poll_timeout_ms: u64,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

/// Driver-specific locators for the named form-field roles.
#[derive(Debug, Deserialize, Clone)]
pub struct FieldSelectors {
    #[serde(default)]
    pub name: Option<String>,
    pub email: String,
    pub password: String,
    pub submit: String,
    pub verification_code: String,
    pub verification_submit: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ProxyConfig {
    /// e.g. http://myproxy.example:3128 or socks5://127.0.0.1:9050
    pub server: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Placeholder until a solver service is wired up.
#[derive(Debug, Deserialize, Clone)]
pub struct CaptchaConfig {
    pub provider: String,
    pub api_key: String,
}

/// What to do when registration succeeded but no code could be extracted.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum UnverifiedPolicy {
    /// Save the account flagged unverified and report the attempt successful.
    #[default]
    SaveUnverified,
    /// Report the attempt failed; nothing is persisted.
    Fail,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MailboxConfig {
    #[serde(default = "default_mailbox_base_url")]
    pub base_url: String,
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

impl Default for MailboxConfig {
    fn default() -> Self {
        Self {
            base_url: default_mailbox_base_url(),
            retry_attempts: default_retry_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    #[serde(default = "default_accounts_path")]
    pub accounts_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            accounts_path: default_accounts_path(),
        }
    }
}

impl RegistrationConfig {
    /// Validate before any worker starts. The only error surfaced
    /// synchronously to the batch caller.
    pub fn validate(&self) -> Result<(), RegError> {
        Url::parse(&self.target_url)
            .map_err(|e| RegError::Config(format!("invalid target_url {:?}: {}", self.target_url, e)))?;
        if self.concurrency < 1 {
            return Err(RegError::Config("concurrency must be at least 1".into()));
        }
        for (role, selector) in [
            ("email", &self.selectors.email),
            ("password", &self.selectors.password),
            ("submit", &self.selectors.submit),
            ("verification_code", &self.selectors.verification_code),
            ("verification_submit", &self.selectors.verification_submit),
        ] {
            if selector.trim().is_empty() {
                return Err(RegError::Config(format!("selector for {} is empty", role)));
            }
        }
        if self.keywords.is_empty() {
            return Err(RegError::Config("keyword set must not be empty".into()));
        }
        Ok(())
    }
}

fn default_max_retries() -> u32 { 2 }
fn default_concurrency() -> usize { 1 }
fn default_headless() -> bool { true }
fn default_poll_timeout_ms() -> u64 { 60_000 }
fn default_poll_interval_ms() -> u64 { 5_000 }
fn default_mailbox_base_url() -> String { "https://api.mail.tm".to_string() }
fn default_retry_attempts() -> u32 { 3 }
fn default_retry_delay_ms() -> u64 { 5_000 }
fn default_accounts_path() -> String { "accounts.json".to_string() }

fn default_keywords() -> Vec<String> {
    [
        "verification", "code", "verify", "otp", "aktivasi", "kode",
        "konfirmasi", "confirm", "pin", "token",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RegistrationConfig {
        toml::from_str(
            r#"
            target_url = "https://example.com/register"

            [selectors]
            email = "input[name=email]"
            password = "input[name=password]"
            submit = "button[type=submit]"
            verification_code = "input[name=code]"
            verification_submit = "button#verify"
            "#,
        )
        .unwrap()
    }

    #[test]
    fn defaults_applied() {
        let config = sample();
        assert_eq!(config.max_retries, 2);
        assert_eq!(config.concurrency, 1);
        assert_eq!(config.unverified_policy, UnverifiedPolicy::SaveUnverified);
        assert!(config.keywords.iter().any(|k| k == "otp"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_bad_target_url() {
        let mut config = sample();
        config.target_url = "not a url".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_zero_concurrency() {
        let mut config = sample();
        config.concurrency = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_empty_selector() {
        let mut config = sample();
        config.selectors.submit = "  ".into();
        assert!(config.validate().is_err());
    }
}
