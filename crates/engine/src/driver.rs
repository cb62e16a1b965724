use async_trait::async_trait;

use regforge_core::{FieldSelectors, ProxyConfig, RegError, UserData};

/// Session parameters passed through opaquely to the driver.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub headless: bool,
    pub proxy: Option<ProxyConfig>,
}

/// Narrow interface over the page-driving collaborator. One driver per job
/// attempt; `release` runs exactly once on every exit path.
#[async_trait]
pub trait FormDriver: Send {
    /// Establish the browser session.
    async fn open(&mut self, session: &SessionConfig) -> Result<(), RegError>;

    /// Navigate to the registration page, fill the form with the generated
    /// user data, and submit it.
    async fn submit_registration(
        &mut self,
        target_url: &str,
        selectors: &FieldSelectors,
        user: &UserData,
    ) -> Result<(), RegError>;

    /// Enter the extracted verification code and submit it.
    async fn submit_verification_code(
        &mut self,
        code_selector: &str,
        submit_selector: &str,
        code: &str,
    ) -> Result<(), RegError>;

    /// Tear down the session. Infallible; safe to call on a never-opened
    /// driver.
    async fn release(&mut self);
}

/// Hands out one driver per job attempt.
pub trait DriverFactory: Send + Sync {
    fn create(&self) -> Box<dyn FormDriver>;
}
