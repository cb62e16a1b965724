use std::time::Duration;

use tracing::info;

use regforge_core::{CaptchaConfig, RegError};

/// Placeholder for 2Captcha/Anti-Captcha integration. Returns a mock token
/// after a short delay; not wired into the registration flow yet.
pub async fn solve_captcha(config: &CaptchaConfig) -> Result<String, RegError> {
    info!(provider = %config.provider, "attempting to solve captcha");
    tokio::time::sleep(Duration::from_secs(2)).await;
    Ok("MOCK_CAPTCHA_TOKEN".to_string())
}
