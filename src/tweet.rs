//! Tweet URL recognition and normalization.
//!
//! Accepts `https://x.com/<user>/status/<id>` and the legacy
//! `twitter.com` form, with or without scheme. The normalized URL always
//! uses `https://x.com` and carries no query string.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

static TWEET_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:x\.com|twitter\.com)/\w+/status/\d+").expect("valid tweet URL pattern")
});

// ============================================================================
// TweetUrl
// ============================================================================

/// A normalized tweet URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TweetUrl {
    url: Url,
}

impl TweetUrl {
    /// Returns `true` if `input` looks like a tweet URL.
    #[inline]
    #[must_use]
    pub fn matches(input: &str) -> bool {
        TWEET_URL_RE.is_match(input)
    }

    /// Parses and normalizes a tweet URL.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTweetUrl`] if `input` is not a tweet URL.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        if !Self::matches(trimmed) {
            return Err(Error::invalid_tweet_url(input));
        }

        let with_scheme = if trimmed.contains("://") {
            trimmed.to_string()
        } else {
            format!("https://{trimmed}")
        };

        let mut url = Url::parse(&with_scheme).map_err(|_| Error::invalid_tweet_url(input))?;

        let host = url.host_str().unwrap_or_default().to_ascii_lowercase();
        let host = host.strip_prefix("www.").unwrap_or(&host).to_string();
        if host != "x.com" && host != "twitter.com" {
            return Err(Error::invalid_tweet_url(input));
        }

        url.set_query(None);
        url.set_fragment(None);
        url.set_scheme("https")
            .map_err(|()| Error::invalid_tweet_url(input))?;
        url.set_host(Some("x.com"))
            .map_err(|_| Error::invalid_tweet_url(input))?;

        Ok(Self { url })
    }

    /// Returns the normalized URL.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }

    /// Returns the host (`x.com`).
    #[inline]
    #[must_use]
    pub fn host(&self) -> &str {
        self.url.host_str().unwrap_or("x.com")
    }
}

impl fmt::Display for TweetUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_x_url() {
        let url = TweetUrl::parse("https://x.com/jack/status/20").expect("parse");
        assert_eq!(url.as_str(), "https://x.com/jack/status/20");
        assert_eq!(url.host(), "x.com");
    }

    #[test]
    fn test_twitter_rewritten_and_query_stripped() {
        let url = TweetUrl::parse("https://twitter.com/jack/status/20?s=20&t=abc").expect("parse");
        assert_eq!(url.to_string(), "https://x.com/jack/status/20");
    }

    #[test]
    fn test_scheme_added() {
        let url = TweetUrl::parse("x.com/some_user/status/123").expect("parse");
        assert_eq!(url.as_str(), "https://x.com/some_user/status/123");
    }

    #[test]
    fn test_www_host() {
        let url = TweetUrl::parse("https://www.twitter.com/a/status/1").expect("parse");
        assert_eq!(url.as_str(), "https://x.com/a/status/1");
    }

    #[test]
    fn test_matches() {
        assert!(TweetUrl::matches("https://x.com/a/status/1"));
        assert!(!TweetUrl::matches("https://x.com/a"));
        assert!(!TweetUrl::matches("great thread"));
    }

    #[test]
    fn test_rejects_other_hosts() {
        let err = TweetUrl::parse("https://notx.com.evil/a/status/1").expect_err("host");
        assert!(matches!(err, Error::InvalidTweetUrl { .. }));
        assert!(TweetUrl::parse("hello").is_err());
    }
}
