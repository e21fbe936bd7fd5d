//! Domain logic for capability decisions and chapter mutation.
//!
//! Purpose: keep every protocol decision (who may mutate, which request
//! variant to try next) in pure, adapter-agnostic code. Network transport is
//! reached only through the ports in [`ports`].
//!
//! Public surface:
//! - `authorization` — capability rules over heterogeneous user/ownership
//!   shapes.
//! - `chapter_update` — the resilient update ladder and aggregate fallback.
//! - `ports` — driven port consumed by the updater.
//! - `user` — principal normalization resolved once at the boundary.
//! - `UpdateError` (alias to `error::UpdateError`) — caller-facing failures.

pub mod authorization;
pub mod chapter_update;
pub mod error;
pub mod ports;
pub mod user;

pub use self::error::UpdateError;
pub use self::user::Principal;
