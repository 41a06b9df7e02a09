//! # smokecheck
//!
//! Sequential HTTP smoke test for a backend's Google Sheets integration.
//! Logs in once, then checks the settings endpoint, the health endpoint, and
//! one pre-existing endpoint, and reports a pass/fail verdict per step.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use smokecheck::{ClientConfig, Credentials, SmokeClient, SmokeTestRunner};
//!
//! # async fn example() -> smokecheck::Result<()> {
//! let client = SmokeClient::new(ClientConfig::default())?;
//! let mut runner = SmokeTestRunner::new(client, Credentials::default());
//! let outcome = runner.run().await;
//! assert!(outcome.passed());
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod client;
pub mod errors;
pub mod runner;

pub use client::{ClientConfig, Credentials, SmokeClient};
pub use errors::{Result, SmokeError};
pub use runner::{RunOutcome, Session, SmokeTestRunner, Step, StepResult};

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
