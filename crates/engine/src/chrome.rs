use std::ffi::OsString;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use headless_chrome::{Browser, Tab};
use tracing::info;

use regforge_core::{FieldSelectors, RegError, UserData};

use crate::driver::{DriverFactory, FormDriver, SessionConfig};

/// Settle time after navigation and after submits, letting the page react.
const SETTLE_DELAY: Duration = Duration::from_secs(2);

/// Chrome-backed form driver. Fields are filled by injected JS so that
/// framework-bound inputs observe `input`/`change` events.
pub struct ChromeDriver {
    browser: Option<Browser>,
    tab: Option<Arc<Tab>>,
}

impl ChromeDriver {
    pub fn new() -> Self {
        Self { browser: None, tab: None }
    }

    fn tab(&self) -> Result<&Arc<Tab>, RegError> {
        self.tab
            .as_ref()
            .ok_or_else(|| RegError::Driver("driver session not opened".into()))
    }

    fn fill_field(tab: &Tab, selector: &str, value: &str) -> Result<(), RegError> {
        tab.evaluate(
            &format!(
                r#"
                const elem = document.querySelector('{}');
                if (elem) {{
                    elem.value = '{}';
                    elem.dispatchEvent(new Event('input', {{ bubbles: true }}));
                    elem.dispatchEvent(new Event('change', {{ bubbles: true }}));
                }} else {{
                    throw new Error('Element not found: {}');
                }}
                "#,
                selector, value, selector
            ),
            false,
        )
        .map_err(|e| RegError::Driver(e.to_string()))?;
        Ok(())
    }

    fn click(tab: &Tab, selector: &str) -> Result<(), RegError> {
        tab.evaluate(
            &format!(
                r#"
                const elem = document.querySelector('{}');
                if (elem) {{
                    elem.click();
                }} else {{
                    throw new Error('Element not found: {}');
                }}
                "#,
                selector, selector
            ),
            false,
        )
        .map_err(|e| RegError::Driver(e.to_string()))?;
        Ok(())
    }
}

impl Default for ChromeDriver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FormDriver for ChromeDriver {
    async fn open(&mut self, session: &SessionConfig) -> Result<(), RegError> {
        let mut extra_args: Vec<OsString> = vec![
            OsString::from("--no-sandbox"),
            OsString::from("--disable-dev-shm-usage"),
            OsString::from("--disable-gpu"),
            OsString::from("--disable-blink-features=AutomationControlled"),
        ];

        if let Some(proxy) = &session.proxy {
            extra_args.push(OsString::from(format!("--proxy-server={}", proxy.server)));
        }

        let mut builder = headless_chrome::LaunchOptionsBuilder::default();
        builder
            .headless(session.headless)
            .window_size(Some((1280, 720)))
            .args(extra_args.iter().map(|a| a.as_ref()).collect());

        // Use CHROME_PATH env var if set (for Docker/custom installs)
        if let Ok(chrome_path) = std::env::var("CHROME_PATH") {
            builder.path(Some(std::path::PathBuf::from(chrome_path)));
        }

        let launch_options = builder
            .build()
            .map_err(|e| RegError::Driver(e.to_string()))?;
        let browser = Browser::new(launch_options).map_err(|e| RegError::Driver(e.to_string()))?;
        let tab = browser.new_tab().map_err(|e| RegError::Driver(e.to_string()))?;

        self.browser = Some(browser);
        self.tab = Some(tab);
        Ok(())
    }

    async fn submit_registration(
        &mut self,
        target_url: &str,
        selectors: &FieldSelectors,
        user: &UserData,
    ) -> Result<(), RegError> {
        let tab = self.tab()?.clone();

        info!(url = %target_url, "navigating to registration page");
        tab.navigate_to(target_url)
            .map_err(|e| RegError::Driver(e.to_string()))?;
        tab.wait_until_navigated()
            .map_err(|e| RegError::Driver(e.to_string()))?;

        if let Some(name_selector) = &selectors.name {
            Self::fill_field(&tab, name_selector, &user.name)?;
        }
        let email = user
            .email
            .as_deref()
            .ok_or_else(|| RegError::Driver("no mailbox address assigned".into()))?;
        Self::fill_field(&tab, &selectors.email, email)?;
        Self::fill_field(&tab, &selectors.password, &user.password)?;
        Self::click(&tab, &selectors.submit)?;

        tokio::time::sleep(SETTLE_DELAY).await;
        Ok(())
    }

    async fn submit_verification_code(
        &mut self,
        code_selector: &str,
        submit_selector: &str,
        code: &str,
    ) -> Result<(), RegError> {
        let tab = self.tab()?.clone();

        info!("entering verification code");
        Self::fill_field(&tab, code_selector, code)?;
        Self::click(&tab, submit_selector)?;

        tokio::time::sleep(SETTLE_DELAY).await;
        Ok(())
    }

    async fn release(&mut self) {
        self.tab = None;
        // Dropping the Browser closes the Chrome process.
        self.browser = None;
    }
}

pub struct ChromeDriverFactory;

impl DriverFactory for ChromeDriverFactory {
    fn create(&self) -> Box<dyn FormDriver> {
        Box::new(ChromeDriver::new())
    }
}
