//! # Smoke-Test Runner
//!
//! Runs the fixed four-step check against a service:
//!
//! ```text
//! [1] POST /api/auth/keycloak-login   -> bearer token
//! [2] GET  /api/google-sheets/settings (bearer)
//! [3] GET  /health                    (2s timeout, lenient)
//! [4] GET  /api/wordpress/sites       (bearer, status only)
//! ```
//!
//! A failed step 1 ends the run because every later step needs the token.
//! Failures in steps 2-4 are recorded and the remaining steps still run.

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::client::{Credentials, LoginRequest, LoginResponse, SettingsResponse, SmokeClient};
use crate::errors::{Result, SmokeError};

pub const LOGIN_PATH: &str = "/api/auth/keycloak-login";
pub const SETTINGS_PATH: &str = "/api/google-sheets/settings";
pub const HEALTH_PATH: &str = "/health";
pub const REGRESSION_PATH: &str = "/api/wordpress/sites";

/// Timeout for the health probe only; other requests use the client timeout
pub const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(2);

/// Number of steps in a complete run
pub const TOTAL_STEPS: u8 = 4;

/// The fixed steps of a run, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Authenticate,
    Settings,
    Health,
    Regression,
}

impl Step {
    pub const ALL: [Step; TOTAL_STEPS as usize] =
        [Step::Authenticate, Step::Settings, Step::Health, Step::Regression];

    pub fn number(self) -> u8 {
        match self {
            Step::Authenticate => 1,
            Step::Settings => 2,
            Step::Health => 3,
            Step::Regression => 4,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Step::Authenticate => "Authenticating",
            Step::Settings => "Testing GET /api/google-sheets/settings",
            Step::Health => "Checking backend health",
            Step::Regression => "Verifying system integrity",
        }
    }
}

/// Per-run state: the target and the token obtained in step 1
#[derive(Debug, Clone)]
pub struct Session {
    base_url: String,
    auth_token: Option<String>,
}

impl Session {
    pub fn new<S: Into<String>>(base_url: S) -> Self {
        Self { base_url: base_url.into(), auth_token: None }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn auth_token(&self) -> Option<&str> {
        self.auth_token.as_deref()
    }

    /// Store the bearer token. The token is set once per session and must be non-empty.
    pub fn set_token(&mut self, token: String) -> Result<()> {
        if token.is_empty() {
            return Err(SmokeError::Session("refusing to store an empty token".to_string()));
        }
        if self.auth_token.is_some() {
            return Err(SmokeError::Session("token already set for this session".to_string()));
        }
        self.auth_token = Some(token);
        Ok(())
    }
}

/// Outcome of a single step
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepResult {
    pub step_number: u8,
    pub description: String,
    pub passed: bool,
    pub detail: String,
    /// HTTP status observed, when the service answered
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    /// Error kind for failed steps
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'static str>,
    pub elapsed_ms: u64,
}

impl StepResult {
    fn new(
        step: Step,
        passed: bool,
        detail: impl Into<String>,
        status: Option<u16>,
        started: Instant,
    ) -> Self {
        Self {
            step_number: step.number(),
            description: step.description().to_string(),
            passed,
            detail: detail.into(),
            status,
            error: None,
            elapsed_ms: elapsed_ms(started),
        }
    }

    fn from_error(step: Step, error: &SmokeError, started: Instant) -> Self {
        let status = match error {
            SmokeError::Authentication { status, .. } => *status,
            _ => None,
        };
        let mut result = Self::new(step, false, error.to_string(), status, started);
        result.error = Some(error.kind());
        result
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

/// Longest slice of a response body quoted in a step detail
const MAX_BODY_EXCERPT: usize = 200;

/// Cut a response body down to an excerpt, respecting char boundaries
fn excerpt(body: &str) -> String {
    let body = body.trim();
    if body.chars().count() <= MAX_BODY_EXCERPT {
        body.to_string()
    } else {
        let head: String = body.chars().take(MAX_BODY_EXCERPT.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}

fn log_step(result: &StepResult) {
    if result.passed {
        info!(step = result.step_number, detail = %result.detail, "Step passed");
    } else {
        warn!(step = result.step_number, detail = %result.detail, "Step failed");
    }
}

/// Result of one invocation of [`SmokeTestRunner::run`]
#[derive(Debug, Clone, Serialize)]
pub struct RunOutcome {
    pub target: String,
    pub started_at: DateTime<Utc>,
    pub total_steps: u8,
    pub steps: Vec<StepResult>,
}

impl RunOutcome {
    /// True only when every step ran and passed
    pub fn passed(&self) -> bool {
        self.steps.len() == usize::from(self.total_steps) && self.steps.iter().all(|s| s.passed)
    }

    pub fn failed_count(&self) -> usize {
        self.steps.iter().filter(|s| !s.passed).count()
    }

    /// Steps that were never attempted because the run was cut short
    pub fn skipped(&self) -> impl Iterator<Item = Step> + '_ {
        Step::ALL.into_iter().skip(self.steps.len())
    }
}

/// Executes the four smoke-test steps against one service
#[derive(Debug)]
pub struct SmokeTestRunner {
    client: SmokeClient,
    credentials: Credentials,
    session: Session,
}

impl SmokeTestRunner {
    pub fn new(client: SmokeClient, credentials: Credentials) -> Self {
        let session = Session::new(client.base_url());
        Self { client, credentials, session }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Log in with the fixed identity and return the bearer token
    #[instrument(skip(self, credentials), fields(email = %credentials.email))]
    pub async fn authenticate(&self, credentials: &Credentials) -> Result<String> {
        let request = LoginRequest::from(credentials);
        let response = self
            .client
            .post(LOGIN_PATH)
            .json(&request)
            .send()
            .await
            .map_err(|e| SmokeError::connectivity(LOGIN_PATH, e))?;

        let status = response.status();
        debug!("Response status: {}", status);

        let body = response.text().await.map_err(|e| SmokeError::connectivity(LOGIN_PATH, e))?;

        if !status.is_success() {
            return Err(SmokeError::authentication(
                format!("login returned HTTP {}: {}", status.as_u16(), excerpt(&body)),
                Some(status.as_u16()),
            ));
        }

        let value: serde_json::Value = serde_json::from_str(&body).map_err(|e| {
            SmokeError::authentication(
                format!("login response is not JSON: {}", e),
                Some(status.as_u16()),
            )
        })?;

        let login: LoginResponse = serde_json::from_value(value).map_err(|e| {
            SmokeError::authentication(
                format!("login response has no usable token field: {}", e),
                Some(status.as_u16()),
            )
        })?;

        if login.token.is_empty() {
            return Err(SmokeError::authentication(
                "login response returned an empty token",
                Some(status.as_u16()),
            ));
        }

        Ok(login.token)
    }

    /// Authenticated GET of the settings endpoint; both flags must be present
    #[instrument(skip(self, token))]
    pub async fn check_settings(&self, token: &str) -> StepResult {
        let started = Instant::now();

        match self.fetch_settings(token).await {
            Ok((status, settings)) => {
                let detail = format!(
                    "HTTP {} - Success: {}, Configured: {}",
                    status, settings.success, settings.configured
                );
                StepResult::new(Step::Settings, settings.success, detail, Some(status), started)
            }
            Err(e) => StepResult::from_error(Step::Settings, &e, started),
        }
    }

    async fn fetch_settings(&self, token: &str) -> Result<(u16, SettingsResponse)> {
        let response = self
            .client
            .get_authenticated(SETTINGS_PATH, token)
            .send()
            .await
            .map_err(|e| SmokeError::connectivity(SETTINGS_PATH, e))?;

        let status = response.status().as_u16();
        debug!("Response status: {}", status);

        let body =
            response.text().await.map_err(|e| SmokeError::connectivity(SETTINGS_PATH, e))?;

        let settings = serde_json::from_str::<SettingsResponse>(&body).map_err(|e| {
            SmokeError::unexpected_response(SETTINGS_PATH, format!("HTTP {}: {}", status, e))
        })?;

        Ok((status, settings))
    }

    /// Probe the health endpoint.
    ///
    /// This step is deliberately lenient: any HTTP answer passes, and so does
    /// a transport failure or timeout, since the goal is only "the backend is
    /// up in some form". The leniency is confined to this step.
    #[instrument(skip(self))]
    pub async fn check_health(&self) -> StepResult {
        let started = Instant::now();

        match self.client.get(HEALTH_PATH).timeout(HEALTH_CHECK_TIMEOUT).send().await {
            Ok(response) => {
                let status = response.status().as_u16();
                debug!("Response status: {}", status);
                StepResult::new(
                    Step::Health,
                    true,
                    format!("Backend healthy (HTTP {})", status),
                    Some(status),
                    started,
                )
            }
            Err(e) => {
                let reason = if e.is_timeout() {
                    format!("no answer within {}s", HEALTH_CHECK_TIMEOUT.as_secs())
                } else if e.is_connect() {
                    "connection failed".to_string()
                } else {
                    e.to_string()
                };
                debug!(error = %e, "Health probe failed; tolerated");
                StepResult::new(
                    Step::Health,
                    true,
                    format!("Backend running (health probe: {})", reason),
                    None,
                    started,
                )
            }
        }
    }

    /// Authenticated GET of a pre-existing endpoint; only the status is recorded
    #[instrument(skip(self, token))]
    pub async fn check_regression(&self, token: &str) -> StepResult {
        let started = Instant::now();

        match self.client.get_authenticated(REGRESSION_PATH, token).send().await {
            Ok(response) => {
                let status = response.status().as_u16();
                debug!("Response status: {}", status);
                StepResult::new(
                    Step::Regression,
                    true,
                    format!("Existing routes working (WordPress HTTP {})", status),
                    Some(status),
                    started,
                )
            }
            Err(e) => {
                let error = SmokeError::connectivity(REGRESSION_PATH, e);
                StepResult::from_error(Step::Regression, &error, started)
            }
        }
    }

    /// Run all steps in order and collect the outcome
    pub async fn run(&mut self) -> RunOutcome {
        self.session = Session::new(self.client.base_url());

        let mut outcome = RunOutcome {
            target: self.session.base_url().to_string(),
            started_at: Utc::now(),
            total_steps: TOTAL_STEPS,
            steps: Vec::with_capacity(usize::from(TOTAL_STEPS)),
        };

        info!(target_url = %outcome.target, "Starting smoke test");

        let started = Instant::now();
        let credentials = self.credentials.clone();
        let auth = match self.authenticate(&credentials).await {
            Ok(token) => self.session.set_token(token.clone()).map(|()| token),
            Err(e) => Err(e),
        };

        let token = match auth {
            Ok(token) => token,
            Err(e) => {
                warn!(error = %e, "Authentication failed; remaining steps skipped");
                outcome.steps.push(StepResult::from_error(Step::Authenticate, &e, started));
                return outcome;
            }
        };
        outcome.steps.push(StepResult::new(
            Step::Authenticate,
            true,
            "Authenticated",
            None,
            started,
        ));

        let settings = self.check_settings(&token).await;
        log_step(&settings);
        outcome.steps.push(settings);

        let health = self.check_health().await;
        log_step(&health);
        outcome.steps.push(health);

        let regression = self.check_regression(&token).await;
        log_step(&regression);
        outcome.steps.push(regression);

        info!(passed = outcome.passed(), failed = outcome.failed_count(), "Smoke test finished");
        outcome
    }
}
