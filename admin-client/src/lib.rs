//! Admin client core for the comic platform.
//!
//! Pairs a pure capability resolver with a resilient chapter update service
//! that probes an unreliable backend mutation surface through an explicit
//! attempt ladder, falling back to a whole-aggregate rewrite when the nested
//! chapter endpoint is unsupported.

pub mod domain;
pub mod outbound;

pub use domain::authorization::{can_manage_comic, is_admin_only, is_privileged};
pub use domain::chapter_update::{
    AppliedChapterFields, ChapterFields, ChapterMutation, ChapterUpdater,
};
pub use domain::error::UpdateError;
pub use outbound::comics::HttpComicsGateway;
