use std::time::Duration;
use thiserror::Error;

/// Errors surfaced by the extraction engine.
///
/// Per-field and per-item absence is never an error: missing fields are
/// recorded as missing values and malformed grid items are skipped. Only
/// page-level and session-level failures reach the caller, and the session
/// is always closed before one of these propagates.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// Navigation failed, or the page loaded but lacks the marker proving
    /// it is the expected kind of page.
    #[error("invalid target page: {0}")]
    InvalidTarget(String),

    /// A required element never appeared within its timeout budget.
    #[error("element not found within {timeout:?}: {selector}")]
    ElementNotFound { selector: String, timeout: Duration },

    /// The embedded reviews document was not present on the page.
    #[error("embedded frame not found: {0}")]
    FrameNotFound(String),

    /// The reviews container never opened despite repeated trigger clicks.
    #[error("container did not open within {0:?}")]
    ContainerNotOpenable(Duration),

    /// The page is a valid product page but has no reviews section at all.
    #[error("product page has no reviews section")]
    NoReviews,

    /// The page has a reviews section whose count resolves to zero.
    #[error("product exists but has zero reviews")]
    NoReviewsAvailable,

    /// A whole-page structural extraction failed after the page was
    /// confirmed valid. Distinct from per-item tolerance: this is systemic
    /// (e.g. a layout change) and is not masked.
    #[error("page extraction failed: {0}")]
    ExtractionFailed(String),

    /// The session was already closed when an operation was attempted.
    #[error("session is closed")]
    SessionClosed,

    /// Could not establish a WebDriver session.
    #[error("webdriver connection failed: {0}")]
    Connect(#[from] fantoccini::error::NewSessionError),

    /// An unexpected WebDriver command failure.
    #[error("webdriver command failed: {0}")]
    WebDriver(#[from] fantoccini::error::CmdError),
}
