//! Quote workflow engine.
//!
//! [`QuotePoster::run`] walks the [`Stage`] sequence:
//!
//! ```text
//! Launching -> PortReady -> Attached -> DomainsEnabled -> PageLoaded
//!   -> RetweetClicked -> QuoteMenuOpen -> ComposeOpen -> (CommentTyped)
//!   -> Submitted | PreviewHeld -> TornDown
//! ```
//!
//! Every UI step waits for its element with a bounded poll first; a miss
//! aborts the run. Whatever happens after Chrome is spawned, the run ends
//! with [`Teardown::run`].

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info, warn};

use crate::browser::selectors::{COMPOSE_TEXTAREA, QUOTE_MENU_ITEM, RETWEET_BUTTON, SUBMIT_BUTTON};
use crate::browser::{Page, ProcessGuard, free_port};
use crate::error::{Error, Result};
use crate::identifiers::TargetId;
use crate::poll::grace_delay;
use crate::protocol::{CreateTargetResult, GetTargetsResult, TargetCommand};
use crate::transport::discovery::wait_for_debugger_url;
use crate::transport::{CallOptions, Connection};
use crate::tweet::TweetUrl;

use super::builder::QuoteBuilder;
use super::options::{ChromeArgs, Timeouts};
use super::stage::{Stage, StageLog};
use super::teardown::Teardown;

// ============================================================================
// Types
// ============================================================================

/// Result of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteOutcome {
    /// Final workflow stage: [`Stage::Submitted`] or [`Stage::PreviewHeld`].
    pub stage: Stage,
    /// Every stage entered, in order, ending with [`Stage::TornDown`].
    pub stages: Vec<Stage>,
    /// Page the quote was composed in.
    pub target_id: TargetId,
    /// `true` if an already open page was reused.
    pub reused_target: bool,
    /// `true` if `Page.loadEventFired` was seen before the page was ready.
    pub load_event_seen: bool,
}

/// Workflow result before teardown.
struct Driven {
    stage: Stage,
    target_id: TargetId,
    reused_target: bool,
    load_event_seen: bool,
}

// ============================================================================
// QuotePoster
// ============================================================================

/// A configured quote run.
///
/// Built by [`QuoteBuilder`]; each [`run`](Self::run) launches its own
/// Chrome.
#[derive(Clone)]
pub struct QuotePoster {
    tweet: TweetUrl,
    comment: Option<String>,
    submit: bool,
    chrome: PathBuf,
    profile_dir: PathBuf,
    port: Option<u16>,
    timeouts: Timeouts,
}

impl fmt::Debug for QuotePoster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuotePoster")
            .field("tweet", &self.tweet.as_str())
            .field("has_comment", &self.comment.is_some())
            .field("submit", &self.submit)
            .field("chrome", &self.chrome)
            .field("profile_dir", &self.profile_dir)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// QuotePoster - Public API
// ============================================================================

impl QuotePoster {
    /// Creates a configuration builder.
    #[inline]
    #[must_use]
    pub fn builder() -> QuoteBuilder {
        QuoteBuilder::new()
    }

    pub(crate) fn new(
        tweet: TweetUrl,
        comment: Option<String>,
        submit: bool,
        chrome: PathBuf,
        profile_dir: PathBuf,
        port: Option<u16>,
        timeouts: Timeouts,
    ) -> Self {
        Self {
            tweet,
            comment,
            submit,
            chrome,
            profile_dir,
            port,
            timeouts,
        }
    }

    /// Returns the normalized tweet URL.
    #[inline]
    #[must_use]
    pub fn tweet(&self) -> &TweetUrl {
        &self.tweet
    }

    /// Returns the quote text, if any.
    #[inline]
    #[must_use]
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Returns `true` if the run posts the quote.
    #[inline]
    #[must_use]
    pub fn is_submit(&self) -> bool {
        self.submit
    }

    /// Returns the Chrome profile directory.
    #[inline]
    #[must_use]
    pub fn profile_dir(&self) -> &Path {
        &self.profile_dir
    }

    /// Returns the fixed debugging port, if one was configured.
    #[inline]
    #[must_use]
    pub fn port(&self) -> Option<u16> {
        self.port
    }

    /// Returns the timeouts.
    #[inline]
    #[must_use]
    pub fn timeouts(&self) -> &Timeouts {
        &self.timeouts
    }

    /// Runs the workflow once.
    ///
    /// Chrome and the connection are released before this returns, on
    /// success and on every error.
    ///
    /// # Errors
    ///
    /// - [`Error::ProcessLaunchFailed`] if Chrome cannot be spawned
    /// - [`Error::LaunchTimeout`] if the control port never answers
    /// - [`Error::NotLoggedIn`] if the tweet never renders
    /// - [`Error::ElementNotFound`] if a later UI step's element is missing
    /// - connection and protocol errors from any command
    pub async fn run(&self) -> Result<QuoteOutcome> {
        let mut log = StageLog::new();
        log.enter(Stage::Launching);

        tokio::fs::create_dir_all(&self.profile_dir).await?;
        let port = match self.port {
            Some(port) => port,
            None => free_port().await?,
        };

        info!(
            tweet = %self.tweet,
            port,
            profile = %self.profile_dir.display(),
            submit = self.submit,
            "Launching Chrome"
        );

        let args = ChromeArgs::new(port, &self.profile_dir, self.tweet.as_str()).to_args();
        let process = ProcessGuard::spawn(&self.chrome, &args)?;

        let mut teardown = Teardown::new(
            Some(process),
            self.timeouts.browser_close,
            self.timeouts.kill_grace,
        );

        let driven = self.drive(port, &mut teardown, &mut log).await;

        teardown.run().await;
        log.enter(Stage::TornDown);

        let driven = driven?;
        Ok(QuoteOutcome {
            stage: driven.stage,
            stages: log.into_stages(),
            target_id: driven.target_id,
            reused_target: driven.reused_target,
            load_event_seen: driven.load_event_seen,
        })
    }
}

// ============================================================================
// QuotePoster - Workflow
// ============================================================================

impl QuotePoster {
    async fn drive(&self, port: u16, teardown: &mut Teardown, log: &mut StageLog) -> Result<Driven> {
        let t = &self.timeouts;

        let ws_url = wait_for_debugger_url(port, t.launch, t.launch_poll).await?;
        log.enter(Stage::PortReady);

        let connection = Connection::connect(&ws_url, t.connect).await?;
        teardown.attach_connection(connection.clone());

        let load_event_seen = Arc::new(AtomicBool::new(false));
        register_listeners(&connection, &load_event_seen);

        let (target_id, reused_target) = self.find_or_create_target(&connection).await?;
        let page = Page::attach(&connection, target_id.clone(), t.command).await?;
        log.enter(Stage::Attached);

        page.enable_domains().await?;
        log.enter(Stage::DomainsEnabled);

        self.wait_for_tweet(&page).await?;
        debug!(load_event_seen = load_event_seen.load(Ordering::SeqCst), "Tweet rendered");
        log.enter(Stage::PageLoaded);

        page.click(RETWEET_BUTTON).await?;
        grace_delay(t.retweet_settle).await;
        log.enter(Stage::RetweetClicked);

        self.require(&page, "opening the quote menu", QUOTE_MENU_ITEM).await?;
        page.click(QUOTE_MENU_ITEM).await?;
        grace_delay(t.quote_settle).await;
        log.enter(Stage::QuoteMenuOpen);

        self.require(&page, "waiting for the quote composer", COMPOSE_TEXTAREA).await?;
        log.enter(Stage::ComposeOpen);

        if let Some(comment) = &self.comment {
            page.insert_text(COMPOSE_TEXTAREA, comment).await?;
            grace_delay(t.type_settle).await;
            log.enter(Stage::CommentTyped);
        }

        let stage = if self.submit {
            self.require(&page, "submitting the quote", SUBMIT_BUTTON).await?;
            page.click(SUBMIT_BUTTON).await?;
            grace_delay(t.submit_settle).await;
            info!(tweet = %self.tweet, "Quote posted");
            Stage::Submitted
        } else {
            info!(
                hold_ms = t.preview_hold.as_millis() as u64,
                "Quote composed, review it in the browser (pass --submit to post)"
            );
            grace_delay(t.preview_hold).await;
            Stage::PreviewHeld
        };
        log.enter(stage);

        Ok(Driven {
            stage,
            target_id,
            reused_target,
            load_event_seen: load_event_seen.load(Ordering::SeqCst),
        })
    }

    /// Reuses an open page on the tweet's site, else opens one.
    async fn find_or_create_target(&self, connection: &Connection) -> Result<(TargetId, bool)> {
        let options = CallOptions::new().timeout(self.timeouts.command);

        let reply = connection.send(TargetCommand::GetTargets, options.clone()).await?;
        let GetTargetsResult { target_infos } = serde_json::from_value(reply)?;

        let host = self.tweet.host();
        if let Some(existing) = target_infos
            .into_iter()
            .find(|target| target.is_page() && target.url.contains(host))
        {
            debug!(target_id = %existing.target_id, url = %existing.url, "Reusing open page");
            return Ok((existing.target_id, true));
        }

        let reply = connection
            .send(
                TargetCommand::CreateTarget {
                    url: self.tweet.as_str().to_string(),
                },
                options,
            )
            .await?;
        let CreateTargetResult { target_id } = serde_json::from_value(reply)?;
        debug!(%target_id, "Opened new page");
        Ok((target_id, false))
    }

    /// Waits for the retweet button, giving the user a second window to
    /// log in.
    async fn wait_for_tweet(&self, page: &Page) -> Result<()> {
        let t = &self.timeouts;

        grace_delay(t.page_grace).await;
        if page.wait_for(RETWEET_BUTTON, t.page_load, t.page_poll).await {
            return Ok(());
        }

        warn!(
            wait_ms = t.page_load.as_millis() as u64,
            "Tweet did not render, log in to X in the opened browser window"
        );
        if page.wait_for(RETWEET_BUTTON, t.page_load, t.page_poll).await {
            return Ok(());
        }

        Err(Error::NotLoggedIn)
    }

    /// Polls for `selector`, failing the run with a step error on a miss.
    async fn require(&self, page: &Page, step: &str, selector: &str) -> Result<()> {
        let t = &self.timeouts;
        if page.wait_for(selector, t.element, t.element_poll).await {
            Ok(())
        } else {
            Err(Error::element_not_found(step, selector))
        }
    }
}

// ============================================================================
// Event Listeners
// ============================================================================

fn register_listeners(connection: &Connection, load_event_seen: &Arc<AtomicBool>) {
    let seen = Arc::clone(load_event_seen);
    connection.on("Page.loadEventFired", move |event| {
        debug!(session_id = ?event.session_id, "Page load event");
        seen.store(true, Ordering::SeqCst);
        Ok(())
    });

    connection.on("Target.detachedFromTarget", |event| {
        let session_id = event.params.get("sessionId").and_then(|v| v.as_str());
        warn!(session_id = ?session_id, "Page session detached");
        Ok(())
    });
}
