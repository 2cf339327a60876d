//! Fairs Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared logging and diagnostics for the fairs ETL workspace.
//!
//! # Overview
//!
//! - **Logging**: `tracing` subscriber setup driven by `LOG_*` environment variables
//! - **Diagnostics**: the failure log that receives raw error detail which must
//!   never reach the user-facing error messages
//!
//! # Example
//!
//! ```no_run
//! use fairs_common::diagnostics::{FailureLog, FileFailureLog};
//! use fairs_common::logging::{init_logging, LogConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     init_logging(&LogConfig::from_env()?)?;
//!
//!     let failures = FileFailureLog::new("log.txt");
//!     failures.log_failure(&anyhow::anyhow!("connection refused"));
//!     Ok(())
//! }
//! ```

pub mod diagnostics;
pub mod logging;

pub use diagnostics::{FailureLog, FileFailureLog, TracingFailureLog};
