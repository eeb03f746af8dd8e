//! Workflow stages.

use std::fmt;

use tracing::info;

/// Position of a run in the quote workflow.
///
/// Stages are entered in declaration order; `CommentTyped` is skipped
/// without a comment, and exactly one of `Submitted` / `PreviewHeld` is
/// reached on success.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    /// Chrome is being spawned.
    Launching,
    /// The control port answered with a debugger URL.
    PortReady,
    /// A page session exists.
    Attached,
    /// `Page` and `Runtime` are enabled.
    DomainsEnabled,
    /// The retweet button rendered.
    PageLoaded,
    /// The retweet menu was opened.
    RetweetClicked,
    /// "Quote" was chosen.
    QuoteMenuOpen,
    /// The compose box appeared.
    ComposeOpen,
    /// The comment was typed.
    CommentTyped,
    /// The quote was posted.
    Submitted,
    /// The composed quote was left open for review.
    PreviewHeld,
    /// Browser and connection are gone.
    TornDown,
}

impl Stage {
    /// Returns the stage name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Launching => "launching",
            Self::PortReady => "port-ready",
            Self::Attached => "attached",
            Self::DomainsEnabled => "domains-enabled",
            Self::PageLoaded => "page-loaded",
            Self::RetweetClicked => "retweet-clicked",
            Self::QuoteMenuOpen => "quote-menu-open",
            Self::ComposeOpen => "compose-open",
            Self::CommentTyped => "comment-typed",
            Self::Submitted => "submitted",
            Self::PreviewHeld => "preview-held",
            Self::TornDown => "torn-down",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stages a run has entered, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageLog {
    stages: Vec<Stage>,
}

impl StageLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records and logs entry into `stage`.
    pub fn enter(&mut self, stage: Stage) {
        info!(%stage, "Stage entered");
        self.stages.push(stage);
    }

    /// Consumes the log.
    #[must_use]
    pub fn into_stages(self) -> Vec<Stage> {
        self.stages
    }
}
