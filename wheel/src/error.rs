//! The one real fallible boundary: handle validation.
//!
//! The scheduling engine itself is total (`SPEC_FULL.md` §7) — every operation on a
//! plausibly-valid handle either does something or silently no-ops. The exception is a
//! handle that names a *different* wheel, or one whose slot has since been recycled
//! (stale); distinguishing those from "legitimately nothing to do" is useful enough to
//! expose, so it gets a real error type rather than folding into the no-op convention.

use snafu::Snafu;

/// A [`crate::Handle`] failed validation against the [`crate::Wheel`] it was presented to.
#[derive(Debug, Snafu, PartialEq, Eq, Clone, Copy)]
#[snafu(visibility(pub(crate)))]
pub enum WheelError {
    /// The handle was produced by a different `Wheel` instance.
    #[snafu(display("handle belongs to a different wheel instance"))]
    ForeignHandle,
    /// The handle's generation no longer matches its slot — the timeout it named was
    /// already stopped, or expired and was consumed via `next_expired`/`drain_all`.
    #[snafu(display("handle is stale: the timeout it named is no longer scheduled"))]
    StaleHandle,
}
