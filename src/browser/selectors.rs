//! DOM selectors for X's tweet page.
//!
//! X marks its controls with `data-testid` attributes. They change without
//! notice, so every selector the workflow depends on lives here.

/// Retweet button in the tweet's action bar. Its presence means the tweet
/// rendered for a logged-in session.
pub const RETWEET_BUTTON: &str = r#"[data-testid="retweet"]"#;

/// "Quote" entry of the retweet dropdown (second menu item).
pub const QUOTE_MENU_ITEM: &str = r#"[data-testid="Dropdown"] [role="menuitem"]:nth-child(2)"#;

/// Compose text area of the quote dialog.
pub const COMPOSE_TEXTAREA: &str = r#"[data-testid="tweetTextarea_0"]"#;

/// Post button of the quote dialog.
pub const SUBMIT_BUTTON: &str = r#"[data-testid="tweetButton"]"#;
