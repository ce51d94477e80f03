//! Property tests for the invariants the engine is required to uphold
//! regardless of the sequence of operations applied to it (see `SPEC_FULL.md`
//! §8, P1-P5).

use proptest::prelude::*;
use wheel::Wheel;

#[derive(Debug, Clone)]
enum Op {
    Start { expiry: u64 },
    StopNth { nth: usize },
    TouchNth { nth: usize, new_expiry: u64 },
    Advance { now: u64 },
    DrainAll,
    NextExpired,
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0u64..64).prop_map(|expiry| Op::Start { expiry }),
        (0usize..16).prop_map(|nth| Op::StopNth { nth }),
        (0usize..16, 0u64..64).prop_map(|(nth, new_expiry)| Op::TouchNth { nth, new_expiry }),
        (0u64..64).prop_map(|now| Op::Advance { now }),
        Just(Op::DrainAll),
        Just(Op::NextExpired),
    ]
}

fn arb_ops() -> impl Strategy<Value = Vec<Op>> {
    proptest::collection::vec(arb_op(), 0..200)
}

proptest! {
    /// P1: `last` never goes backwards, no matter what sequence of operations runs.
    #[test]
    fn last_is_non_decreasing(ops in arb_ops()) {
        let mut w: Wheel<u32> = Wheel::new();
        let mut handles = Vec::new();
        let mut prev_last = w.last();
        for op in ops {
            apply(&mut w, &mut handles, op);
            let cur = w.last();
            prop_assert!(cur >= prev_last);
            prev_last = cur;
        }
    }

    /// `len()` is always a sound upper bound on the number of `start`s issued: nothing
    /// ever makes the wheel report more outstanding timeouts than were scheduled.
    #[test]
    fn len_never_exceeds_total_starts(ops in arb_ops()) {
        let mut w: Wheel<u32> = Wheel::new();
        let mut handles = Vec::new();
        for op in ops {
            apply(&mut w, &mut handles, op);
            prop_assert!(w.len() <= handles.len());
        }
    }

    /// P5: draining `advance_partial` one op at a time reaches the same externally
    /// observable state (same expired sequence) as a single `advance` call.
    #[test]
    fn advance_partial_matches_advance(
        expiries in proptest::collection::vec(0u64..500, 0..60),
        now in 0u64..500,
    ) {
        let mut a: Wheel<usize> = Wheel::new();
        let mut b: Wheel<usize> = Wheel::new();
        for (i, e) in expiries.iter().enumerate() {
            a.start(*e, i);
            b.start(*e, i);
        }

        a.advance(now);
        while b.advance_partial(now, 3) {}

        let mut expired_a = Vec::new();
        while let Some(v) = a.next_expired() {
            expired_a.push(v);
        }
        let mut expired_b = Vec::new();
        while let Some(v) = b.next_expired() {
            expired_b.push(v);
        }
        prop_assert_eq!(expired_a, expired_b);
    }

    /// `stop` followed immediately by nothing else leaves the wheel exactly as it
    /// was before the matching `start` (modulo the handle itself going stale).
    #[test]
    fn start_then_stop_is_an_identity(expiry in 0u64..1000) {
        let mut w: Wheel<u32> = Wheel::new();
        prop_assert!(w.is_empty());
        let h = w.start(expiry, 1);
        prop_assert_eq!(w.len(), 1);
        prop_assert_eq!(w.stop(h), Some(1));
        prop_assert!(w.is_empty());
        prop_assert_eq!(w.wait(), u64::MAX);
    }
}

fn apply(w: &mut Wheel<u32>, handles: &mut Vec<wheel::Handle<u32>>, op: Op) {
    match op {
        Op::Start { expiry } => {
            let h = w.start(expiry, handles.len() as u32);
            handles.push(h);
        }
        Op::StopNth { nth } => {
            if !handles.is_empty() {
                let h = handles[nth % handles.len()];
                w.stop(h);
            }
        }
        Op::TouchNth { nth, new_expiry } => {
            if !handles.is_empty() {
                let h = handles[nth % handles.len()];
                w.touch(h, new_expiry);
            }
        }
        Op::Advance { now } => {
            w.advance(now);
        }
        Op::DrainAll => {
            w.drain_all();
        }
        Op::NextExpired => {
            w.next_expired();
        }
    }
}
