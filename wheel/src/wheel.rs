//! The wheel engine: `new`, `start`, `stop`, `touch`, `advance`, `advance_partial`,
//! `wait`, `wait_with`, `drain_all`, `next_expired`.
//!
//! See `SPEC_FULL.md` §4.3 for the operation contracts this module implements, and §10.5
//! for the arena-plus-handle representation chosen for the intrusive linkage the original
//! design expressed with raw node pointers.

use alloc::vec::Vec;
use core::sync::atomic::{AtomicU32, Ordering};

use spout::Spout;

use crate::bits::order;
use crate::error::WheelError;
use crate::event::{Bin, NoopSpout, WheelEvent};
use crate::list::{self, Node, NodeId, NodeStore};
use crate::record::{Handle, Slot, SlotState};

/// Number of wheel bins: one per bit of the 64-bit expiry word (`SPEC_FULL.md` §3).
pub const BIN_COUNT: usize = 64;

/// `wait()`'s sentinel return value when the wheel has nothing pending.
pub const MAX_WAIT_SENTINEL: u64 = u64::MAX;

const EXPIRED_LIST: NodeId = BIN_COUNT as NodeId;
const PROCESSING_LIST: NodeId = BIN_COUNT as NodeId + 1;
const SENTINEL_COUNT: usize = BIN_COUNT + 2;

fn next_wheel_id() -> u32 {
    static NEXT: AtomicU32 = AtomicU32::new(1);
    NEXT.fetch_add(1, Ordering::Relaxed)
}

/// A hierarchical timer wheel.
///
/// Generic over an observer `O: Spout<WheelEvent>`, notified synchronously of every state
/// transition (`SPEC_FULL.md` §10.2); the default [`NoopSpout`] costs nothing.
pub struct Wheel<T, O = NoopSpout> {
    wheel_id: u32,
    last: u64,
    sentinels: [Node; SENTINEL_COUNT],
    slots: Vec<Slot<T>>,
    free_head: Option<u32>,
    observer: O,
}

impl<T, O> NodeStore for Wheel<T, O> {
    fn node(&self, id: NodeId) -> Node {
        if (id as usize) < SENTINEL_COUNT {
            self.sentinels[id as usize]
        } else {
            let slot = &self.slots[id as usize - SENTINEL_COUNT];
            match &slot.state {
                SlotState::Occupied { node, .. } => *node,
                SlotState::Free { .. } => {
                    unreachable!("list operation touched a free slot's linkage")
                }
            }
        }
    }

    fn set_node(&mut self, id: NodeId, node: Node) {
        if (id as usize) < SENTINEL_COUNT {
            self.sentinels[id as usize] = node;
        } else {
            let slot = &mut self.slots[id as usize - SENTINEL_COUNT];
            match &mut slot.state {
                SlotState::Occupied { node: n, .. } => *n = node,
                SlotState::Free { .. } => {
                    unreachable!("list operation touched a free slot's linkage")
                }
            }
        }
    }
}

impl<T> Default for Wheel<T, NoopSpout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Wheel<T, NoopSpout> {
    /// Create an empty wheel with no observer.
    ///
    /// Postcondition: `last == 0`, every bin and the expired/processing queues are empty
    /// (`SPEC_FULL.md` §4.3, `init`).
    #[must_use]
    pub fn new() -> Self {
        Self::with_observer(NoopSpout)
    }
}

impl<T, O: Spout<WheelEvent>> Wheel<T, O> {
    /// Create an empty wheel that notifies `observer` of every state transition.
    #[must_use]
    pub fn with_observer(observer: O) -> Self {
        let mut sentinels = [Node::detached(0); SENTINEL_COUNT];
        for (id, node) in sentinels.iter_mut().enumerate() {
            *node = Node::detached(id as NodeId);
        }
        Self {
            wheel_id: next_wheel_id(),
            last: 0,
            sentinels,
            slots: Vec::new(),
            free_head: None,
            observer,
        }
    }

    /// The engine's current notion of "now". Monotonically non-decreasing.
    #[inline]
    #[must_use]
    pub fn last(&self) -> u64 {
        self.last
    }

    /// Borrow the observer.
    #[inline]
    pub fn observer(&self) -> &O {
        &self.observer
    }

    /// Mutably borrow the observer.
    #[inline]
    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    fn bin_id(index: u32) -> NodeId {
        debug_assert!((index as usize) < BIN_COUNT);
        index
    }

    fn alloc_slot(&mut self, expiry: u64, payload: T) -> u32 {
        match self.free_head.take() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                let SlotState::Free { next_free } = slot.state else {
                    unreachable!("free list pointed at an occupied slot");
                };
                self.free_head = next_free;
                slot.state = SlotState::Occupied {
                    expiry,
                    payload,
                    node: Node::detached(index + SENTINEL_COUNT as u32),
                    in_processing: false,
                };
                index
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    state: SlotState::Occupied {
                        expiry,
                        payload,
                        node: Node::detached(index + SENTINEL_COUNT as u32),
                        in_processing: false,
                    },
                });
                index
            }
        }
    }

    fn free_slot(&mut self, index: u32) -> T {
        let slot = &mut self.slots[index as usize];
        slot.generation = slot.generation.wrapping_add(1);
        let old = core::mem::replace(
            &mut slot.state,
            SlotState::Free {
                next_free: self.free_head,
            },
        );
        self.free_head = Some(index);
        match old {
            SlotState::Occupied { payload, .. } => payload,
            SlotState::Free { .. } => unreachable!("double free of a wheel slot"),
        }
    }

    /// Check a handle without acting on it: is it valid for this wheel, and still live?
    pub fn validate(&self, handle: Handle<T>) -> Result<(), WheelError> {
        if handle.wheel_id != self.wheel_id {
            return Err(WheelError::ForeignHandle);
        }
        let slot = self
            .slots
            .get(handle.index as usize)
            .ok_or(WheelError::StaleHandle)?;
        if slot.generation != handle.generation {
            return Err(WheelError::StaleHandle);
        }
        Ok(())
    }

    /// Borrow the payload of a still-pending timeout, or `None` if `handle` is invalid.
    #[must_use]
    pub fn payload(&self, handle: Handle<T>) -> Option<&T> {
        self.validate(handle).ok()?;
        self.slots[handle.index as usize]
            .occupied()
            .map(|(_, p, _)| p)
    }

    /// The expiry a still-pending timeout was scheduled for, or `None` if `handle` is
    /// invalid.
    #[must_use]
    pub fn expiry(&self, handle: Handle<T>) -> Option<u64> {
        self.validate(handle).ok()?;
        self.slots[handle.index as usize]
            .occupied()
            .map(|(e, _, _)| e)
    }

    fn bin_of(&self, id: NodeId) -> Bin {
        if id < BIN_COUNT as NodeId {
            Bin::Index(id as u8)
        } else {
            Bin::Expired
        }
    }

    /// Route a freshly-populated, currently-detached slot into the bin (or expired
    /// queue) its expiry dictates under the current `last`. Returns the destination list.
    ///
    /// `route`'s destination is always a bin or the expired queue, never the processing
    /// queue, so it always clears `in_processing`.
    fn route(&mut self, index: u32) -> NodeId {
        let node_id = index + SENTINEL_COUNT as u32;
        let expiry = match &mut self.slots[index as usize].state {
            SlotState::Occupied {
                expiry,
                in_processing,
                ..
            } => {
                *in_processing = false;
                *expiry
            }
            SlotState::Free { .. } => unreachable!(),
        };
        let dst = if expiry <= self.last {
            EXPIRED_LIST
        } else {
            Self::bin_id(order(expiry ^ self.last))
        };
        list::push_back(self, dst, node_id);
        dst
    }

    /// Schedule `payload` to expire at `expiry`.
    ///
    /// O(1). Always succeeds (`SPEC_FULL.md` §4.3, `start`): either the expiry is already
    /// due and the record lands straight on the expired queue, or it's placed in the bin
    /// its distance from `last` dictates.
    pub fn start(&mut self, expiry: u64, payload: T) -> Handle<T> {
        let index = self.alloc_slot(expiry, payload);
        let dst = self.route(index);
        self.observer.send(WheelEvent::Started {
            slot: index,
            bin: self.bin_of(dst),
        });
        let generation = self.slots[index as usize].generation;
        Handle {
            wheel_id: self.wheel_id,
            index,
            generation,
            _marker: core::marker::PhantomData,
        }
    }

    /// Cancel a pending timeout, handing back its payload.
    ///
    /// A no-op returning `None` if `handle` is foreign, stale, or already consumed —
    /// callers don't need to track linkage state themselves (`SPEC_FULL.md` §4.3, `stop`).
    pub fn stop(&mut self, handle: Handle<T>) -> Option<T> {
        if self.validate(handle).is_err() {
            return None;
        }
        let node_id = handle.index + SENTINEL_COUNT as u32;
        list::unlink(self, node_id);
        self.observer
            .send(WheelEvent::Stopped { slot: handle.index });
        Some(self.free_slot(handle.index))
    }

    /// Reschedule a pending timeout to a new expiry, re-routing it as if it had just been
    /// `start`ed (`SPEC_FULL.md` §4.3, `touch`). No-op if `handle` is invalid.
    pub fn touch(&mut self, handle: Handle<T>, new_expiry: u64) {
        if self.validate(handle).is_err() {
            return;
        }
        let node_id = handle.index + SENTINEL_COUNT as u32;
        let (old_expiry, in_processing) = match &self.slots[handle.index as usize].state {
            SlotState::Occupied {
                expiry,
                in_processing,
                ..
            } => (*expiry, *in_processing),
            SlotState::Free { .. } => unreachable!(),
        };
        // A record mid-`DRAINING` (SPEC_FULL.md §4.4) sits in the processing queue, not
        // the expired queue, even once its expiry has fallen behind `last` — only
        // `drain_processing` moving it out tells the two apart.
        let from = if in_processing {
            Bin::Staged
        } else if old_expiry <= self.last {
            Bin::Expired
        } else {
            self.bin_of(Self::bin_id(order(old_expiry ^ self.last)))
        };
        list::unlink(self, node_id);
        match &mut self.slots[handle.index as usize].state {
            SlotState::Occupied { expiry, .. } => *expiry = new_expiry,
            SlotState::Free { .. } => unreachable!(),
        }
        let to_dst = self.route(handle.index);
        self.observer.send(WheelEvent::Rebinned {
            slot: handle.index,
            from,
            to: self.bin_of(to_dst),
        });
    }

    /// Advance the wheel's notion of "now" to `now`, migrating and expiring entries as
    /// described in `SPEC_FULL.md` §4.3. Returns whether the expired queue is non-empty
    /// afterwards.
    ///
    /// `now <= last` (including equality) is a no-op beyond reporting queue occupancy.
    pub fn advance(&mut self, now: u64) -> bool {
        if !list::is_empty(self, PROCESSING_LIST) {
            // A prior `advance_partial` left staged entries; conservative safety per
            // SPEC_FULL.md §4.3 treats them all as expired rather than re-evaluating
            // against a `last` that's about to move again.
            let count = self.flush_processing_as_expired();
            if count > 0 {
                self.observer.send(WheelEvent::Drained { count });
            }
        }

        if now <= self.last {
            return !list::is_empty(self, EXPIRED_LIST);
        }

        self.stage(now);
        self.last = now;
        self.drain_processing(usize::MAX);
        !list::is_empty(self, EXPIRED_LIST)
    }

    /// As [`Wheel::advance`], but performs at most `max_ops` re-bin/expire decisions from
    /// the staging queue before returning. Returns `true` if staged work remains.
    ///
    /// Note the return value's meaning differs from [`Wheel::advance`]'s: here it answers
    /// "is there more staged work", not "is the expired queue non-empty" (`SPEC_FULL.md`
    /// §4.3, `advance_partial`).
    pub fn advance_partial(&mut self, now: u64, max_ops: usize) -> bool {
        if list::is_empty(self, PROCESSING_LIST) && now > self.last {
            self.stage(now);
            self.last = now;
        }
        self.drain_processing(max_ops);
        !list::is_empty(self, PROCESSING_LIST)
    }

    /// Bin-0 wholesale expire, bulk-expire fully-elapsed bins, and stage the rest for
    /// re-evaluation against the new `last`. Leaves `self.last` unchanged — the caller
    /// updates it once staging is complete.
    fn stage(&mut self, now: u64) {
        list::splice_append(self, EXPIRED_LIST, Self::bin_id(0));

        let elapsed = (now - self.last).min(1u64 << 63);
        let elapsed_order = order(elapsed);
        for i in 1..elapsed_order {
            list::splice_append(self, EXPIRED_LIST, Self::bin_id(i));
        }

        let high = order(now ^ self.last);
        let mut i = elapsed_order;
        while i <= high {
            self.stage_bin_into_processing(Self::bin_id(i));
            i += 1;
        }
    }

    /// Move every record in `bin` onto the processing queue, marking each as staged.
    ///
    /// Unlike the bulk `splice_append` used for the wholesale-expire bins, this walks
    /// `bin`'s members one at a time: each is about to be individually reclassified by
    /// `drain_processing` anyway, so marking it staged here adds no new order of work,
    /// only an earlier one (`SPEC_FULL.md` §4.4).
    fn stage_bin_into_processing(&mut self, bin: NodeId) {
        while let Some(node_id) = list::pop_front(self, bin) {
            let index = node_id - SENTINEL_COUNT as NodeId;
            if let SlotState::Occupied { in_processing, .. } = &mut self.slots[index as usize].state
            {
                *in_processing = true;
            }
            list::push_back(self, PROCESSING_LIST, node_id);
        }
    }

    fn drain_processing(&mut self, max_ops: usize) {
        let mut ops = 0;
        while ops < max_ops {
            let Some(node_id) = list::pop_front(self, PROCESSING_LIST) else {
                break;
            };
            let index = node_id - SENTINEL_COUNT as NodeId;
            let expiry = match &mut self.slots[index as usize].state {
                SlotState::Occupied {
                    expiry,
                    in_processing,
                    ..
                } => {
                    *in_processing = false;
                    *expiry
                }
                SlotState::Free { .. } => unreachable!(),
            };
            if expiry <= self.last {
                list::push_back(self, EXPIRED_LIST, node_id);
                self.observer.send(WheelEvent::Expired { slot: index });
            } else {
                let dst = Self::bin_id(order(expiry ^ self.last));
                list::push_back(self, dst, node_id);
                self.observer.send(WheelEvent::Rebinned {
                    slot: index,
                    from: Bin::Staged,
                    to: self.bin_of(dst),
                });
            }
            ops += 1;
        }
    }

    fn flush_processing_as_expired(&mut self) -> u32 {
        let mut count = 0u32;
        while let Some(node_id) = list::pop_front(self, PROCESSING_LIST) {
            let index = node_id - SENTINEL_COUNT as NodeId;
            if let SlotState::Occupied { in_processing, .. } = &mut self.slots[index as usize].state
            {
                *in_processing = false;
            }
            list::push_back(self, EXPIRED_LIST, node_id);
            count += 1;
        }
        count
    }

    /// Smallest number of units the caller may sleep before anything in the wheel could
    /// need attention, ignoring the expired queue (`SPEC_FULL.md` §4.3, `wait`).
    ///
    /// Returns [`MAX_WAIT_SENTINEL`] if every bin is empty.
    #[must_use]
    pub fn wait(&self) -> u64 {
        for i in 0..BIN_COUNT as NodeId {
            if !list::is_empty(self, i) {
                let period = 1u64 << i;
                return period - (self.last & (period - 1));
            }
        }
        MAX_WAIT_SENTINEL
    }

    /// As [`Wheel::wait`], adjusted for a caller whose clock has already drifted past
    /// `last` without an intervening `advance` (`SPEC_FULL.md` §4.3, `wait_with`).
    #[must_use]
    pub fn wait_with(&self, now: u64) -> u64 {
        let w = self.wait();
        if w == MAX_WAIT_SENTINEL {
            return w;
        }
        w.saturating_sub(now.saturating_sub(self.last))
    }

    /// Move every pending timeout — every bin and the processing queue — onto the
    /// expired queue. After this call the wheel has no pending timeouts.
    pub fn drain_all(&mut self) {
        let mut count = 0u32;
        for i in 0..BIN_COUNT as NodeId {
            if !list::is_empty(self, i) {
                count += count_list(self, i);
                list::splice_append(self, EXPIRED_LIST, i);
            }
        }
        if !list::is_empty(self, PROCESSING_LIST) {
            count += self.clear_processing_flags();
            list::splice_append(self, EXPIRED_LIST, PROCESSING_LIST);
        }
        if count > 0 {
            self.observer.send(WheelEvent::Drained { count });
        }
    }

    /// Clear `in_processing` on every record currently staged, ahead of bulk-splicing the
    /// processing queue onto the expired queue. Returns how many records were cleared.
    fn clear_processing_flags(&mut self) -> u32 {
        let mut count = 0u32;
        let mut cur = self.node(PROCESSING_LIST).next;
        while cur != PROCESSING_LIST {
            let index = cur - SENTINEL_COUNT as NodeId;
            if let SlotState::Occupied { in_processing, .. } = &mut self.slots[index as usize].state
            {
                *in_processing = false;
            }
            count += 1;
            cur = self.node(cur).next;
        }
        count
    }

    /// Pop the next payload whose expiry is due, or `None` if the expired queue is empty.
    pub fn next_expired(&mut self) -> Option<T> {
        let node_id = list::pop_front(self, EXPIRED_LIST)?;
        let index = node_id - SENTINEL_COUNT as NodeId;
        Some(self.free_slot(index))
    }

    /// Number of timeouts currently tracked by the wheel (pending in a bin, staged, or
    /// sitting in the expired queue awaiting [`Wheel::next_expired`]).
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len() - free_list_len(self)
    }

    /// True if the wheel has no timeouts at all, pending or expired.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn free_list_len<T, O>(wheel: &Wheel<T, O>) -> usize {
    let mut count = 0;
    let mut cur = wheel.free_head;
    while let Some(index) = cur {
        count += 1;
        match &wheel.slots[index as usize].state {
            SlotState::Free { next_free } => cur = *next_free,
            SlotState::Occupied { .. } => unreachable!("free list cycle into an occupied slot"),
        }
    }
    count
}

fn count_list<T, O>(wheel: &Wheel<T, O>, list: NodeId) -> u32 {
    let mut count = 0u32;
    let mut cur = wheel.node(list).next;
    while cur != list {
        count += 1;
        cur = wheel.node(cur).next;
    }
    count
}
