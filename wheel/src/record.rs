//! The scheduled-timeout record and the handle callers use to name it.
//!
//! The wheel owns an arena of [`Slot`]s; a [`Handle`] is a generation-checked index into
//! that arena (see `SPEC_FULL.md` §10.5 for why this crate resolves the original design's
//! raw intrusive-node references this way).

use core::marker::PhantomData;

use crate::list::Node;

/// Stable reference to one scheduled timeout, returned by [`crate::Wheel::start`].
///
/// A handle is only ever valid for the [`crate::Wheel`] instance that produced it, and
/// only until the timeout it names is stopped or expires. Using it afterwards — even if
/// the arena slot has been recycled for a different timeout — is caught by the
/// generation check rather than silently operating on the wrong record.
pub struct Handle<T> {
    pub(crate) wheel_id: u32,
    pub(crate) index: u32,
    pub(crate) generation: u32,
    pub(crate) _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> core::fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Handle")
            .field("wheel_id", &self.wheel_id)
            .field("index", &self.index)
            .field("generation", &self.generation)
            .finish()
    }
}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.wheel_id == other.wheel_id
            && self.index == other.index
            && self.generation == other.generation
    }
}

impl<T> Eq for Handle<T> {}

/// One arena slot: either free (part of the free list) or occupied by a pending timeout.
pub(crate) enum SlotState<T> {
    Free {
        next_free: Option<u32>,
    },
    Occupied {
        expiry: u64,
        payload: T,
        node: Node,
        /// Whether this record currently sits in the processing queue (staged by a
        /// `stage()` call, not yet individually reclassified by `drain_processing`).
        ///
        /// A record's *bin* membership is recoverable from `expiry` and `last` alone, but
        /// the processing queue is a transient holding area visited during `DRAINING`
        /// (`SPEC_FULL.md` §4.4) that no expiry/last comparison can distinguish from the
        /// expired queue — this flag is the only source of truth for that distinction.
        in_processing: bool,
    },
}

pub(crate) struct Slot<T> {
    pub(crate) generation: u32,
    pub(crate) state: SlotState<T>,
}

impl<T> Slot<T> {
    pub(crate) fn occupied(&self) -> Option<(u64, &T, Node)> {
        match &self.state {
            SlotState::Occupied {
                expiry,
                payload,
                node,
                ..
            } => Some((*expiry, payload, *node)),
            SlotState::Free { .. } => None,
        }
    }
}
