//! X quote-post automation over the Chrome DevTools Protocol.
//!
//! Launches a local Chrome with a persistent profile, drives the tweet page
//! through CDP and composes a quote post, either leaving it open for review
//! or posting it.
//!
//! # Architecture
//!
//! - One browser-level WebSocket per run, multiplexing page sessions
//!   (`Target.attachToTarget` with `flatten`)
//! - Replies are matched to requests by integer id; frames without an id
//!   are events and go to the event bus
//! - Every readiness check is a bounded poll ([`poll::wait_until`])
//! - Chrome and the socket are always released, whatever the outcome
//!
//! # Quick Start
//!
//! ```no_run
//! use x_quote::{QuotePoster, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let outcome = QuotePoster::builder()
//!         .tweet_url("https://x.com/jack/status/20")
//!         .comment("where it all began")
//!         .submit(true)
//!         .build()?
//!         .run()
//!         .await?;
//!
//!     println!("Done: {}", outcome.stage);
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`browser`] | Chrome discovery, process, page session |
//! | [`driver`] | Workflow engine and configuration |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`identifiers`] | Type-safe ID wrappers |
//! | [`poll`] | Bounded readiness polling |
//! | [`protocol`] | CDP message types |
//! | [`transport`] | WebSocket connection, dispatch, events |
//! | [`tweet`] | Tweet URL parsing |

// ============================================================================
// Modules
// ============================================================================

/// Chrome process and page control.
pub mod browser;

/// Workflow engine and configuration.
///
/// Use [`QuotePoster::builder()`] to configure a run.
pub mod driver;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Type-safe identifiers for protocol entities.
pub mod identifiers;

/// Bounded readiness polling.
pub mod poll;

/// CDP message types.
pub mod protocol;

/// WebSocket transport layer.
pub mod transport;

/// Tweet URL parsing.
pub mod tweet;

// ============================================================================
// Re-exports
// ============================================================================

// Browser types
pub use browser::{Page, ProcessGuard};

// Driver types
pub use driver::{ChromeArgs, QuoteBuilder, QuoteOutcome, QuotePoster, Stage, Timeouts};

// Error types
pub use error::{Error, Result};

// Identifier types
pub use identifiers::{RequestId, SessionId, TargetId};

// Transport types
pub use transport::{CallOptions, Connection};

// Tweet types
pub use tweet::TweetUrl;
