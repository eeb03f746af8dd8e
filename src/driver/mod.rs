//! Quote workflow driver.
//!
//! # Components
//!
//! | Type | Description |
//! |------|-------------|
//! | [`QuotePoster`] | Runs the workflow |
//! | [`QuoteBuilder`] | Fluent configuration builder |
//! | [`ChromeArgs`] | Fixed Chrome command line |
//! | [`Timeouts`] | Deadlines, intervals and settle delays |
//! | [`Stage`] | Workflow position |
//! | [`Teardown`] | Unconditional cleanup |
//!
//! # Example
//!
//! ```no_run
//! use x_quote::{QuotePoster, Result};
//!
//! # async fn example() -> Result<()> {
//! let poster = QuotePoster::builder()
//!     .tweet_url("https://x.com/jack/status/20")
//!     .comment("history")
//!     .submit(false)
//!     .build()?;
//!
//! let outcome = poster.run().await?;
//! assert_eq!(outcome.stage, x_quote::Stage::PreviewHeld);
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Submodules
// ============================================================================

/// Fluent builder for run configuration.
pub mod builder;

/// Workflow engine.
pub mod core;

/// Chrome flags and timeouts.
pub mod options;

/// Workflow stages.
pub mod stage;

/// Cleanup of a run.
pub mod teardown;

// ============================================================================
// Re-exports
// ============================================================================

pub use builder::QuoteBuilder;
pub use core::{QuoteOutcome, QuotePoster};
pub use options::{ChromeArgs, Timeouts};
pub use stage::{Stage, StageLog};
pub use teardown::{Teardown, best_effort};
