//! Browser process and page control.
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`launcher`] | Chrome discovery, debug port, profile location |
//! | [`process`] | [`ProcessGuard`] owning the Chrome child |
//! | [`page`] | [`Page`]: attached session with DOM helpers |
//! | [`selectors`] | X web UI selectors |

// ============================================================================
// Submodules
// ============================================================================

/// Chrome discovery and launch prerequisites.
pub mod launcher;

/// Attached page session.
pub mod page;

/// Chrome child process ownership.
pub mod process;

/// DOM selectors for the tweet page.
pub mod selectors;

// ============================================================================
// Re-exports
// ============================================================================

pub use launcher::{CHROME_PATH_ENV, default_profile_dir, find_chrome, free_port};
pub use page::Page;
pub use process::{DEFAULT_KILL_GRACE, ProcessGuard};
