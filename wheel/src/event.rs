//! Events the wheel notifies an observer of.
//!
//! See `SPEC_FULL.md` §10.2: this replaces the original design's "global singleton counts
//! and stats" with an optional, explicit push target. A [`crate::Wheel`] with no observer
//! wired in (the default) pays for none of this beyond a zero-sized [`NoopSpout`].

use spout::Spout;

/// Which bin (or the expired queue) a record is in.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bin {
    /// One of the 64 wheel bins.
    Index(u8),
    /// The expired queue.
    Expired,
    /// The scratch staging queue used mid-`advance`. Observable from `touch` too, if it
    /// runs against a record still awaiting reclassification between `advance_partial`
    /// calls (`SPEC_FULL.md` §4.4, `DRAINING`).
    Staged,
}

/// A state transition the wheel notifies its observer of.
///
/// `slot` is the arena index of the affected record ([`crate::Handle`] without the
/// generation), stable for the lifetime of one occupancy of that slot — enough to
/// correlate a `Started`/`Rebinned*`/`Expired` sequence for the same timeout without the
/// observer needing to clone the payload.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WheelEvent {
    /// A timeout was scheduled into `bin`.
    Started {
        /// Arena slot of the scheduled timeout.
        slot: u32,
        /// Bin (or expired queue) it landed in.
        bin: Bin,
    },
    /// A timeout was cancelled before it expired.
    Stopped {
        /// Arena slot of the cancelled timeout.
        slot: u32,
    },
    /// A timeout moved from one bin to another during `advance` or `touch`.
    Rebinned {
        /// Arena slot of the moved timeout.
        slot: u32,
        /// Where it moved from.
        from: Bin,
        /// Where it moved to.
        to: Bin,
    },
    /// A timeout's expiry was reached; it is now on the expired queue.
    Expired {
        /// Arena slot of the expired timeout.
        slot: u32,
    },
    /// `drain_all` moved `count` still-pending timeouts straight to the expired queue.
    Drained {
        /// Number of timeouts moved.
        count: u32,
    },
}

/// The default observer: discards every event.
///
/// Zero-sized, so `Wheel<T>` (no observer specified) carries no runtime cost for the
/// notification hook.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSpout;

impl Spout<WheelEvent> for NoopSpout {
    #[inline]
    fn send(&mut self, _item: WheelEvent) {}
}
