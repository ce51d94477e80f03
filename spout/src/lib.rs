//! A minimal, composable push-based trait for sending items to a destination.
//!
//! A [`Spout`] is the receiving end of an overflow or notification channel: anything that
//! can accept a stream of pushed items without handing control back to the pusher. It is
//! deliberately smaller than `Extend` or `Sink` — one required method, `send` — so that
//! `no_std` crates can depend on it without pulling in allocation or async machinery.

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

#[cfg(feature = "alloc")]
extern crate alloc;

/// Push-based destination for a stream of items.
///
/// Implement this for anything that can receive items one at a time: a counter, a log
/// sink, a channel sender, another ring buffer. The default [`send_all`](Spout::send_all)
/// and [`flush`](Spout::flush) are no-ops beyond repeated `send`, so a minimal impl only
/// needs `send`.
pub trait Spout<T> {
    /// Accept one item.
    fn send(&mut self, item: T);

    /// Accept every item from an iterator, in order.
    ///
    /// Overridden by sinks that can batch (e.g. a channel sender that wants a single
    /// lock acquisition for the whole batch).
    #[inline]
    fn send_all<I: IntoIterator<Item = T>>(&mut self, items: I) {
        for item in items {
            self.send(item);
        }
    }

    /// Flush any buffered state. No-op for sinks that don't buffer.
    #[inline]
    fn flush(&mut self) {}
}

/// A spout that drops everything sent to it.
///
/// The default sink for types generic over `S: Spout<T>` that don't need overflow
/// handling — `send` costs nothing beyond the drop of `T`.
#[derive(Debug, Default, Clone, Copy)]
pub struct DropSpout;

impl<T> Spout<T> for DropSpout {
    #[inline]
    fn send(&mut self, _item: T) {}
}

/// A spout that collects everything sent to it into a `Vec`.
///
/// Useful in tests and for callers who want every pushed item retained rather than
/// observed and discarded.
#[cfg(feature = "alloc")]
#[derive(Debug, Default, Clone)]
pub struct CollectSpout<T>(alloc::vec::Vec<T>);

#[cfg(feature = "alloc")]
impl<T> CollectSpout<T> {
    /// Create an empty collecting spout.
    #[must_use]
    pub const fn new() -> Self {
        Self(alloc::vec::Vec::new())
    }

    /// Borrow everything collected so far, in send order.
    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.0
    }

    /// Take ownership of everything collected so far, leaving the spout empty.
    pub fn take(&mut self) -> alloc::vec::Vec<T> {
        core::mem::take(&mut self.0)
    }
}

#[cfg(feature = "alloc")]
impl<T> Spout<T> for CollectSpout<T> {
    #[inline]
    fn send(&mut self, item: T) {
        self.0.push(item);
    }
}

/// A spout that forwards every item to an `std::sync::mpsc::Sender`.
///
/// Send failures (the receiver was dropped) are swallowed — a disconnected channel
/// behaves like [`DropSpout`] rather than panicking, since a spout's contract is "accept
/// items", not "guarantee delivery".
#[cfg(feature = "std")]
#[derive(Debug, Clone)]
pub struct ChannelSpout<T>(std::sync::mpsc::Sender<T>);

#[cfg(feature = "std")]
impl<T> ChannelSpout<T> {
    /// Wrap an existing sender.
    #[must_use]
    pub const fn new(sender: std::sync::mpsc::Sender<T>) -> Self {
        Self(sender)
    }
}

#[cfg(feature = "std")]
impl<T> Spout<T> for ChannelSpout<T> {
    #[inline]
    fn send(&mut self, item: T) {
        let _ = self.0.send(item);
    }
}

/// A spout that forwards every item to an `std::sync::mpsc::SyncSender`, blocking the
/// sender when the channel is full.
#[cfg(feature = "std")]
#[derive(Debug, Clone)]
pub struct SyncChannelSpout<T>(std::sync::mpsc::SyncSender<T>);

#[cfg(feature = "std")]
impl<T> SyncChannelSpout<T> {
    /// Wrap an existing sync sender.
    #[must_use]
    pub const fn new(sender: std::sync::mpsc::SyncSender<T>) -> Self {
        Self(sender)
    }
}

#[cfg(feature = "std")]
impl<T> Spout<T> for SyncChannelSpout<T> {
    #[inline]
    fn send(&mut self, item: T) {
        let _ = self.0.send(item);
    }
}

/// Chains two spouts: every item goes to `first`, then a clone goes to `second`.
///
/// Requires `T: Clone` since both sinks need their own copy.
#[derive(Debug, Default, Clone, Copy)]
pub struct TeeSpout<A, B> {
    first: A,
    second: B,
}

impl<A, B> TeeSpout<A, B> {
    /// Tee items between two spouts.
    pub const fn new(first: A, second: B) -> Self {
        Self { first, second }
    }
}

impl<T: Clone, A: Spout<T>, B: Spout<T>> Spout<T> for TeeSpout<A, B> {
    #[inline]
    fn send(&mut self, item: T) {
        self.first.send(item.clone());
        self.second.send(item);
    }

    #[inline]
    fn flush(&mut self) {
        self.first.flush();
        self.second.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drop_spout_accepts_everything() {
        let mut s = DropSpout;
        s.send_all(0..1000);
    }

    #[cfg(feature = "alloc")]
    #[test]
    fn collect_spout_preserves_order() {
        let mut s = CollectSpout::new();
        s.send_all([1, 2, 3]);
        assert_eq!(s.items(), [1, 2, 3]);
        assert_eq!(s.take(), alloc::vec![1, 2, 3]);
        assert!(s.items().is_empty());
    }

    #[cfg(feature = "alloc")]
    #[test]
    fn tee_spout_forwards_to_both() {
        let mut tee = TeeSpout::new(CollectSpout::new(), CollectSpout::new());
        tee.send_all([1u32, 2, 3]);
        assert_eq!(tee.first.items(), [1, 2, 3]);
        assert_eq!(tee.second.items(), [1, 2, 3]);
    }
}
