//! Builder for a quote run.
//!
//! # Example
//!
//! ```no_run
//! use x_quote::QuotePoster;
//!
//! # async fn example() -> x_quote::Result<()> {
//! let outcome = QuotePoster::builder()
//!     .tweet_url("https://x.com/jack/status/20")
//!     .comment("the one that started it")
//!     .build()?
//!     .run()
//!     .await?;
//! println!("finished at {}", outcome.stage);
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::path::PathBuf;

use crate::browser::{default_profile_dir, find_chrome};
use crate::error::{Error, Result};
use crate::tweet::TweetUrl;

use super::core::QuotePoster;
use super::options::Timeouts;

// ============================================================================
// QuoteBuilder
// ============================================================================

/// Builder for configuring a [`QuotePoster`].
///
/// Use [`QuotePoster::builder()`] to create a new builder.
#[derive(Debug, Default, Clone)]
pub struct QuoteBuilder {
    /// Tweet to quote, as typed by the user.
    tweet_url: Option<String>,
    /// Quote text.
    comment: Option<String>,
    /// Click post instead of holding a preview.
    submit: bool,
    /// Chrome user data dir.
    profile_dir: Option<PathBuf>,
    /// Chrome executable.
    chrome: Option<PathBuf>,
    /// Fixed remote debugging port.
    port: Option<u16>,
    /// Deadlines and delays.
    timeouts: Timeouts,
}

// ============================================================================
// QuoteBuilder Implementation
// ============================================================================

impl QuoteBuilder {
    /// Creates a builder with default settings.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the tweet to quote (`x.com` or `twitter.com` status URL).
    #[inline]
    #[must_use]
    pub fn tweet_url(mut self, url: impl Into<String>) -> Self {
        self.tweet_url = Some(url.into());
        self
    }

    /// Sets the quote text. Blank text means no comment.
    #[inline]
    #[must_use]
    pub fn comment(mut self, text: impl Into<String>) -> Self {
        self.comment = Some(text.into());
        self
    }

    /// Posts the quote instead of leaving it for review.
    #[inline]
    #[must_use]
    pub fn submit(mut self, submit: bool) -> Self {
        self.submit = submit;
        self
    }

    /// Sets the Chrome profile directory.
    #[inline]
    #[must_use]
    pub fn profile_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.profile_dir = Some(path.into());
        self
    }

    /// Sets the Chrome executable, skipping discovery.
    #[inline]
    #[must_use]
    pub fn chrome(mut self, path: impl Into<PathBuf>) -> Self {
        self.chrome = Some(path.into());
        self
    }

    /// Uses a fixed debugging port instead of allocating one.
    #[inline]
    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Replaces all timeouts.
    #[inline]
    #[must_use]
    pub fn timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if no tweet URL is set or a poll interval is zero
    /// - [`Error::InvalidTweetUrl`] if the tweet URL is not a status URL
    /// - [`Error::ChromeNotFound`] if no Chrome executable is available
    pub fn build(self) -> Result<QuotePoster> {
        let tweet = self.validate_tweet()?;
        let chrome = self.validate_chrome()?;
        self.timeouts.validate()?;

        let profile_dir = match self.profile_dir {
            Some(dir) => dir,
            None => default_profile_dir()?,
        };
        let comment = self
            .comment
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());

        Ok(QuotePoster::new(
            tweet,
            comment,
            self.submit,
            chrome,
            profile_dir,
            self.port,
            self.timeouts,
        ))
    }
}

// ============================================================================
// Validation
// ============================================================================

impl QuoteBuilder {
    fn validate_tweet(&self) -> Result<TweetUrl> {
        let url = self.tweet_url.as_deref().ok_or_else(|| {
            Error::config(
                "Tweet URL is required. Use .tweet_url() to set it.\n\
                 Example: QuotePoster::builder().tweet_url(\"https://x.com/user/status/123\")",
            )
        })?;
        TweetUrl::parse(url)
    }

    fn validate_chrome(&self) -> Result<PathBuf> {
        match &self.chrome {
            Some(path) if path.exists() => Ok(path.clone()),
            Some(path) => Err(Error::chrome_not_found(path)),
            None => find_chrome().ok_or(Error::ChromeNotFound { path: None }),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
