use async_trait::async_trait;
use rand::Rng;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::info;

use regforge_core::{MessageSummary, RegError, VerificationMessage};

use crate::retry::{with_retry, RetryPolicy};
use crate::{MailboxFactory, MailboxProvider};

const REQUEST_TIMEOUT_SECS: u64 = 15;

/// mail.tm disposable-mailbox client. One instance per job attempt; holds
/// the bearer token for the provisioned account.
pub struct MailTmClient {
    client: reqwest::Client,
    base_url: String,
    policy: RetryPolicy,
    token: Option<String>,
    address: Option<String>,
}

impl MailTmClient {
    pub fn new(client: reqwest::Client, base_url: String, policy: RetryPolicy) -> Self {
        Self {
            client,
            base_url,
            policy,
            token: None,
            address: None,
        }
    }

    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    fn check_status(path: &str, response: reqwest::Response) -> Result<reqwest::Response, RegError> {
        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            return Err(RegError::RateLimited);
        }
        if !response.status().is_success() {
            return Err(RegError::Provider(format!(
                "{} returned HTTP {}",
                path,
                response.status()
            )));
        }
        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, RegError> {
        let mut request = self.client.get(format!("{}{}", self.base_url, path));
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        let response = request
            .send()
            .await
            .map_err(|e| RegError::Provider(e.to_string()))?;
        Self::check_status(path, response)?
            .json::<T>()
            .await
            .map_err(|e| RegError::Provider(e.to_string()))
    }

    async fn post_json<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, RegError> {
        let response = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .json(body)
            .send()
            .await
            .map_err(|e| RegError::Provider(e.to_string()))?;
        Self::check_status(path, response)?
            .json::<T>()
            .await
            .map_err(|e| RegError::Provider(e.to_string()))
    }
}

#[async_trait]
impl MailboxProvider for MailTmClient {
    async fn provision(&mut self) -> Result<String, RegError> {
        let (address, token) = {
            let this = &*self;
            let domains: HydraList<DomainEntry> =
                with_retry(&this.policy, || this.get_json("/domains")).await?;
            let domain = domains
                .member
                .first()
                .map(|d| d.domain.clone())
                .ok_or_else(|| RegError::Provider("no domains available".into()))?;

            let address = format!("{}@{}", random_local_part(), domain);
            let account = CredentialsBody {
                address: address.clone(),
                password: random_password(),
            };

            let _created: serde_json::Value =
                with_retry(&this.policy, || this.post_json("/accounts", &account)).await?;
            let token: TokenResponse =
                with_retry(&this.policy, || this.post_json("/token", &account)).await?;
            (address, token)
        };

        self.token = Some(token.token);
        self.address = Some(address.clone());
        info!(address = %address, "mailbox provisioned");
        Ok(address)
    }

    async fn list_messages(&self) -> Result<Vec<MessageSummary>, RegError> {
        if self.token.is_none() {
            return Err(RegError::Provider("mailbox not provisioned".into()));
        }
        let listing: HydraList<MessageEntry> =
            with_retry(&self.policy, || self.get_json("/messages")).await?;
        Ok(listing
            .member
            .into_iter()
            .map(|m| MessageSummary { id: m.id, subject: m.subject })
            .collect())
    }

    async fn fetch_message(&self, id: &str) -> Result<VerificationMessage, RegError> {
        if self.token.is_none() {
            return Err(RegError::Provider("mailbox not provisioned".into()));
        }
        let path = format!("/messages/{}", id);
        let detail: MessageDetail = with_retry(&self.policy, || self.get_json(&path)).await?;
        Ok(VerificationMessage {
            id: detail.id,
            subject: detail.subject,
            text: detail.text.unwrap_or_default(),
            html: detail.html.unwrap_or_default().join(""),
        })
    }
}

/// Builds the shared HTTP client once and hands out per-job sessions.
pub struct MailTmFactory {
    client: reqwest::Client,
    base_url: String,
    policy: RetryPolicy,
}

impl MailTmFactory {
    pub fn new(policy: RetryPolicy) -> Result<Self, RegError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| RegError::Provider(e.to_string()))?;
        Ok(Self {
            client,
            base_url: "https://api.mail.tm".to_string(),
            policy,
        })
    }

    /// Point at a different API root (self-hosted instance, tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl MailboxFactory for MailTmFactory {
    fn create(&self) -> Box<dyn MailboxProvider> {
        Box::new(MailTmClient::new(
            self.client.clone(),
            self.base_url.clone(),
            self.policy,
        ))
    }
}

fn random_local_part() -> String {
    let mut rng = rand::thread_rng();
    let part: String = std::iter::repeat(())
        .map(|()| rng.sample(rand::distributions::Alphanumeric))
        .map(char::from)
        .take(10)
        .collect();
    part.to_lowercase()
}

fn random_password() -> String {
    let mut rng = rand::thread_rng();
    let body: String = std::iter::repeat(())
        .map(|()| rng.sample(rand::distributions::Alphanumeric))
        .map(char::from)
        .take(12)
        .collect();
    format!("{}!9", body)
}

#[derive(Debug, Deserialize)]
struct HydraList<T> {
    #[serde(rename = "hydra:member", default = "Vec::new")]
    member: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct DomainEntry {
    domain: String,
}

#[derive(Debug, Serialize)]
struct CredentialsBody {
    address: String,
    password: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    token: String,
}

#[derive(Debug, Deserialize)]
struct MessageEntry {
    id: String,
    #[serde(default)]
    subject: String,
}

#[derive(Debug, Deserialize)]
struct MessageDetail {
    id: String,
    #[serde(default)]
    subject: String,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    html: Option<Vec<String>>,
}
