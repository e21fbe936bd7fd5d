//! Caller-facing failures of the chapter update protocol.
//!
//! These errors are transport agnostic. A UI shell maps `AuthExpired` to a
//! re-login prompt and surfaces the others with their status and body text;
//! no raw transport exception ever crosses this boundary.

/// Terminal outcome of a failed chapter update.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UpdateError {
    /// Token missing or rejected under every header convention; the session
    /// must re-authenticate.
    #[error("session credentials were rejected; sign in again")]
    AuthExpired,
    /// Backend reached a terminal non-2xx status not explained by the
    /// ladder's 401/404 handling.
    #[error("backend rejected the update (status {status}): {body}")]
    Rejected {
        /// Last HTTP status observed.
        status: u16,
        /// Best-effort extraction of the response body.
        body: String,
    },
    /// Transport-level failure (DNS, connection, timeout). Retrying the
    /// whole operation may help; the ladder itself never retries across
    /// these.
    #[error("backend unreachable: {message}")]
    Network {
        /// Transport diagnostic.
        message: String,
    },
    /// The aggregate fallback fetched the comic but found no chapter with
    /// the requested id.
    #[error("comic {comic_id} has no chapter {chapter_id}")]
    ChapterMissing {
        /// Parent comic id.
        comic_id: String,
        /// Missing chapter id.
        chapter_id: String,
    },
}
