//! A hierarchical timer wheel for tracking large populations of pending timeouts.
//!
//! The wheel tracks timeouts by their absolute expiry and reports, as the caller's
//! notion of "now" advances, which have elapsed. It is built for the inside of an event
//! loop or multiplexer: insertion and cancellation are O(1), and expiry is amortised
//! O(log Δ) per timeout regardless of how coarsely the caller advances time.
//!
//! ```
//! use wheel::Wheel;
//!
//! let mut w: Wheel<&str> = Wheel::new();
//! let soon = w.start(5, "soon");
//! let later = w.start(20, "later");
//!
//! assert_eq!(w.wait(), 4);
//! assert!(!w.advance(4));
//! w.stop(later);
//! assert!(w.advance(5));
//! assert_eq!(w.next_expired(), Some("soon"));
//! assert_eq!(w.next_expired(), None);
//! let _ = soon;
//! ```
//!
//! See `SPEC_FULL.md` in the repository root for the full contract, invariants, and the
//! design decisions behind the arena-plus-handle representation used here.

#![cfg_attr(not(any(feature = "std", test)), no_std)]
#![warn(missing_docs)]

extern crate alloc;

mod bits;
mod error;
mod event;
mod list;
mod record;
mod wheel;

pub use error::WheelError;
pub use event::{Bin, NoopSpout, WheelEvent};
pub use record::Handle;
pub use wheel::{BIN_COUNT, MAX_WAIT_SENTINEL, Wheel};
