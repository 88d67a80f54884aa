//! WebDriver wire protocol client
//!
//! The concrete automation driver. Talks to a chromedriver-compatible remote
//! end over HTTP and drives the messenger.com login, checkpoint confirmation
//! and send flows. Every client owns exactly one remote WebDriver session;
//! nothing is shared between drivers, so session teardown can never affect a
//! neighbour.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use serde_json::{Value, json};

use crate::config::settings::WebDriverSettings;
use crate::session::driver::{AutomationDriver, DriverFactory, StepOutcome};
use crate::{Error, Result};

/// W3C element identifier key in element references
const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";
/// WebDriver key code for Enter
const ENTER: &str = "\u{E007}";

const LOGIN_URL: &str = "https://www.messenger.com/login";
const HOME_URL: &str = "https://www.messenger.com";

/// Retry step while polling for an element
const POLL_STEP: Duration = Duration::from_millis(500);
/// Pause for client-side navigation to settle after submitting a form
const SETTLE: Duration = Duration::from_secs(2);
/// Checkpoint pages occasionally re-render the submit button; bail out after
/// this many rounds and judge the landing URL instead
const MAX_CHECKPOINT_ROUNDS: usize = 5;

/// Creates one independent WebDriver session per driver
#[derive(Debug, Clone)]
pub struct WebDriverFactory {
    settings: WebDriverSettings,
    http: Client,
}

impl WebDriverFactory {
    /// Create a factory for the configured remote end.
    pub fn new(settings: WebDriverSettings) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");
        Self { settings, http }
    }
}

#[async_trait]
impl DriverFactory for WebDriverFactory {
    async fn create(&self) -> Result<Box<dyn AutomationDriver>> {
        let client = WebDriverClient::connect(&self.settings, self.http.clone()).await?;
        Ok(Box::new(client))
    }
}

/// One remote WebDriver session plus the messenger.com page flows.
#[derive(Debug)]
pub struct WebDriverClient {
    http: Client,
    base: String,
    element_wait: Duration,
    released: AtomicBool,
}

impl WebDriverClient {
    /// Open a fresh WebDriver session against the remote end.
    pub async fn connect(settings: &WebDriverSettings, http: Client) -> Result<Self> {
        let endpoint = settings.endpoint.trim_end_matches('/').to_string();
        url::Url::parse(&endpoint)?;

        let mut args = vec!["--no-sandbox", "--disable-dev-shm-usage"];
        if settings.headless {
            args.insert(0, "--headless=new");
        }
        let capabilities = json!({
            "capabilities": {
                "alwaysMatch": {
                    "browserName": "chrome",
                    "goog:chromeOptions": { "args": args }
                }
            }
        });

        let response = http
            .post(format!("{}/session", endpoint))
            .json(&capabilities)
            .send()
            .await?;
        let status = response.status();
        let payload: Value = response.json().await?;
        if !status.is_success() {
            return Err(wire_error(&payload["value"]));
        }
        let session_id = payload["value"]["sessionId"]
            .as_str()
            .ok_or_else(|| Error::driver("remote end returned no session id"))?
            .to_string();

        tracing::debug!(session_id, "webdriver session created");
        Ok(Self {
            http,
            base: format!("{}/session/{}", endpoint, session_id),
            element_wait: Duration::from_secs(settings.element_wait_secs),
            released: AtomicBool::new(false),
        })
    }

    /// Raw wire call; only transport and decoding errors surface here.
    async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<(StatusCode, Value)> {
        let mut request = self.http.request(method, format!("{}{}", self.base, path));
        if let Some(body) = body {
            request = request.json(&body);
        }
        let response = request.send().await?;
        let status = response.status();
        let payload: Value = response.json().await?;
        Ok((status, payload["value"].clone()))
    }

    /// Wire call that treats every non-success answer as a driver error.
    async fn command(&self, method: Method, path: &str, body: Option<Value>) -> Result<Value> {
        let (status, value) = self.execute(method, path, body).await?;
        if !status.is_success() {
            return Err(wire_error(&value));
        }
        Ok(value)
    }

    async fn navigate(&self, url: &str) -> Result<()> {
        self.command(Method::POST, "/url", Some(json!({ "url": url })))
            .await?;
        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        let value = self.command(Method::GET, "/url", None).await?;
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| Error::driver("remote end returned a non-string url"))
    }

    /// Locate a single element; absence is a normal outcome, not an error.
    async fn find(&self, using: &str, selector: &str) -> Result<Option<String>> {
        let (status, value) = self
            .execute(
                Method::POST,
                "/element",
                Some(json!({ "using": using, "value": selector })),
            )
            .await?;
        if !status.is_success() {
            if value["error"].as_str() == Some("no such element") {
                return Ok(None);
            }
            return Err(wire_error(&value));
        }
        Ok(value[ELEMENT_KEY].as_str().map(str::to_string))
    }

    async fn find_all(&self, using: &str, selector: &str) -> Result<Vec<String>> {
        let value = self
            .command(
                Method::POST,
                "/elements",
                Some(json!({ "using": using, "value": selector })),
            )
            .await?;
        let ids = value
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| item[ELEMENT_KEY].as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default();
        Ok(ids)
    }

    /// Poll for an element until it shows up or the wait budget runs out.
    async fn wait_for(&self, using: &str, selector: &str) -> Result<Option<String>> {
        let deadline = tokio::time::Instant::now() + self.element_wait;
        loop {
            if let Some(element) = self.find(using, selector).await? {
                return Ok(Some(element));
            }
            if tokio::time::Instant::now() >= deadline {
                return Ok(None);
            }
            tokio::time::sleep(POLL_STEP).await;
        }
    }

    async fn type_into(&self, element: &str, text: &str) -> Result<()> {
        self.command(
            Method::POST,
            &format!("/element/{}/value", element),
            Some(json!({ "text": text })),
        )
        .await?;
        Ok(())
    }

    async fn click(&self, element: &str) -> Result<()> {
        self.command(
            Method::POST,
            &format!("/element/{}/click", element),
            Some(json!({})),
        )
        .await?;
        Ok(())
    }

    async fn text_of(&self, element: &str) -> Result<String> {
        let value = self
            .command(Method::GET, &format!("/element/{}/text", element), None)
            .await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    /// First anchor whose text contains `needle`, case-insensitively.
    async fn link_with_text(&self, needle: &str) -> Result<Option<String>> {
        let needle = needle.to_lowercase();
        for anchor in self.find_all("tag name", "a").await? {
            if self.text_of(&anchor).await?.to_lowercase().contains(&needle) {
                return Ok(Some(anchor));
            }
        }
        Ok(None)
    }

    /// Last radio input on the page ("remember browser" prompt), if any.
    async fn last_radio_input(&self) -> Result<Option<String>> {
        Ok(self
            .find_all("css selector", "input[type='radio']")
            .await?
            .pop())
    }
}

/// Build a driver error out of a WebDriver error value.
fn wire_error(value: &Value) -> Error {
    let kind = value["error"].as_str().unwrap_or("unknown");
    let message = value["message"]
        .as_str()
        .and_then(|m| m.lines().next())
        .unwrap_or("");
    Error::driver(format!("{}: {}", kind, message))
}

#[async_trait]
impl AutomationDriver for WebDriverClient {
    async fn attempt_login(&self, username: &str, password: &str) -> Result<StepOutcome> {
        self.navigate(LOGIN_URL).await?;

        if self.current_url().await?.contains("/login") {
            let Some(email) = self.find("css selector", "#email").await? else {
                tracing::warn!("login form did not expose an email field");
                return Ok(StepOutcome::Failed);
            };
            let Some(pass) = self.find("css selector", "#pass").await? else {
                tracing::warn!("login form did not expose a password field");
                return Ok(StepOutcome::Failed);
            };
            self.type_into(&email, username).await?;
            self.type_into(&pass, password).await?;
            self.type_into(&pass, ENTER).await?;
            tokio::time::sleep(SETTLE).await;
        }

        let url = self.current_url().await?;
        if url.contains("/password") {
            tracing::warn!("credentials rejected");
            return Ok(StepOutcome::Failed);
        }
        if url.contains("/login") {
            // still on the login host: a checkpoint interstitial wants the
            // user to continue towards the code prompt
            if let Some(link) = self.link_with_text("continue").await? {
                self.click(&link).await?;
            }
            return Ok(StepOutcome::ConfirmationRequired);
        }
        Ok(StepOutcome::Completed)
    }

    async fn attempt_confirmation(&self, code: &str) -> Result<StepOutcome> {
        if !self.current_url().await?.contains("facebook.com") {
            tracing::warn!("confirmation attempted outside a checkpoint page");
            return Ok(StepOutcome::Failed);
        }
        let Some(code_field) = self.wait_for("css selector", "#approvals_code").await? else {
            return Ok(StepOutcome::Failed);
        };
        self.type_into(&code_field, code).await?;
        self.type_into(&code_field, ENTER).await?;

        let mut submit = self.find("css selector", "#checkpointSubmitButton").await?;
        let mut rounds = 0;
        while let Some(button) = submit {
            if self
                .find("css selector", "#approvals_code")
                .await?
                .is_some()
            {
                // the site rejected the code and asked again
                return Ok(StepOutcome::ConfirmationRequired);
            }
            if let Some(radio) = self.last_radio_input().await? {
                self.click(&radio).await?;
            }
            self.type_into(&button, ENTER).await?;
            tokio::time::sleep(POLL_STEP).await;

            submit = self.find("css selector", "#checkpointSubmitButton").await?;
            if submit.is_none() {
                submit = self.link_with_text("continue").await?;
            }
            rounds += 1;
            if rounds >= MAX_CHECKPOINT_ROUNDS {
                break;
            }
        }

        if self.current_url().await?.contains("messenger.com") {
            Ok(StepOutcome::Completed)
        } else {
            Ok(StepOutcome::Failed)
        }
    }

    async fn attempt_send(&self, recipient: &str, message: &str) -> Result<StepOutcome> {
        self.navigate(HOME_URL).await?;

        let Some(search) = self
            .find("css selector", "input[placeholder='Search Messenger']")
            .await?
        else {
            tracing::warn!("search box not found");
            return Ok(StepOutcome::Failed);
        };
        self.type_into(&search, recipient).await?;
        tokio::time::sleep(SETTLE).await;

        let recipient_xpath = format!(
            "/descendant::a/descendant::*[contains(translate(text(), \
             'ABCDEFGHIJKLMNOPQRSTUVWXYZ', 'abcdefghijklmnopqrstuvwxyz'), '{}') \
             and not(contains(text(), '\"'))]",
            recipient.to_lowercase()
        );
        let Some(target) = self.wait_for("xpath", &recipient_xpath).await? else {
            tracing::warn!(recipient, "recipient not found in search results");
            return Ok(StepOutcome::Failed);
        };
        self.click(&target).await?;
        tokio::time::sleep(SETTLE).await;

        let Some(message_box) = self
            .wait_for("xpath", "/descendant::*[@aria-label='Type a message...']")
            .await?
        else {
            tracing::warn!("message box not found");
            return Ok(StepOutcome::Failed);
        };
        self.click(&message_box).await?;
        self.type_into(&message_box, message).await?;
        self.type_into(&message_box, ENTER).await?;
        Ok(StepOutcome::Completed)
    }

    async fn release(&self) {
        if self.released.swap(true, Ordering::SeqCst) {
            return;
        }
        match self.execute(Method::DELETE, "", None).await {
            Ok((status, _)) if status.is_success() => {
                tracing::debug!("webdriver session closed");
            }
            Ok((status, _)) => {
                tracing::warn!(%status, "webdriver session teardown rejected");
            }
            Err(e) => {
                tracing::warn!(error = %e, "webdriver session teardown failed");
            }
        }
    }
}
