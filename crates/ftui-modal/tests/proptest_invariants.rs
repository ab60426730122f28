//! Property tests: random operation sequences against the scheduler.
//!
//! After every step:
//! - shown identity keys are unique
//! - layer indices strictly increase bottom to top
//! - at most one descriptor is interactive
//! - a request is live exactly while its handle is unresolved
//! - no shown instance overtook an earlier queued request of its class

use std::collections::HashSet;
use std::time::Duration;

use ftui_modal::{
    ApplicationMode, Instant, ModalHandle, ModalRequest, ModalResultData, Scheduler,
    SchedulerConfig,
};
use proptest::prelude::*;

const KINDS: &[&str] = &[
    "critical", "blocking", "confirm", "dialog", "attention", "notice", "toast", "mystery",
];
const KEYS: &[&str] = &["save", "quit", "hint", "sync"];

#[derive(Debug, Clone)]
enum Op {
    Submit {
        kind: usize,
        key: Option<usize>,
        concurrent: bool,
        weight: i32,
    },
    Close {
        handle: usize,
        confirm: bool,
    },
    Dismiss,
    SetMode(Option<usize>),
    Tick(u64),
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (
            0..KINDS.len(),
            proptest::option::of(0..KEYS.len()),
            any::<bool>(),
            -3i32..=3,
        )
            .prop_map(|(kind, key, concurrent, weight)| Op::Submit {
                kind,
                key,
                concurrent,
                weight,
            }),
        2 => (0usize..64, any::<bool>()).prop_map(|(handle, confirm)| Op::Close { handle, confirm }),
        1 => Just(Op::Dismiss),
        1 => proptest::option::of(0..ApplicationMode::ALL.len()).prop_map(Op::SetMode),
        2 => (0u64..4_000).prop_map(Op::Tick),
    ]
}

fn arb_config() -> impl Strategy<Value = SchedulerConfig> {
    (0u64..3, any::<bool>()).prop_map(|(transition, escapable)| {
        SchedulerConfig::new()
            .exit_transition(Duration::from_millis(transition * 100))
            .critical_escapes_teardown(escapable)
    })
}

fn apply(s: &mut Scheduler, handles: &mut Vec<ModalHandle>, clock: &mut Instant, op: &Op) {
    match *op {
        Op::Submit {
            kind,
            key,
            concurrent,
            weight,
        } => {
            let mut request = ModalRequest::new(KINDS[kind]).layer_weight(weight);
            if let Some(key) = key {
                request = request.identity_key(KEYS[key]);
            }
            if concurrent {
                request = request.concurrent();
            }
            handles.push(s.submit(request).expect("valid request"));
        }
        Op::Close { handle, confirm } => {
            if handles.is_empty() {
                return;
            }
            let id = handles[handle % handles.len()].id();
            let result = if confirm {
                ModalResultData::Confirmed
            } else {
                ModalResultData::Dismissed
            };
            s.close(id, result);
        }
        Op::Dismiss => {
            s.dismiss_foreground();
        }
        Op::SetMode(mode) => s.set_mode(mode.map(|i| ApplicationMode::ALL[i])),
        Op::Tick(ms) => {
            *clock += Duration::from_millis(ms);
            s.tick(*clock);
        }
    }
}

fn check(s: &Scheduler, handles: &mut [ModalHandle]) -> Result<(), TestCaseError> {
    let mut keys = HashSet::new();
    for instance in s.stack().iter() {
        prop_assert!(
            keys.insert(instance.submission().identity_key().to_owned()),
            "identity {} shown twice",
            instance.submission().identity_key()
        );
    }

    let snapshot = s.snapshot();
    for pair in snapshot.instances.windows(2) {
        prop_assert!(pair[0].layer_index < pair[1].layer_index);
    }
    prop_assert!(snapshot.instances.iter().filter(|d| d.interactive).count() <= 1);

    for handle in handles.iter_mut() {
        let live = s.status(handle.id()).is_some();
        prop_assert_eq!(live, !handle.is_resolved(), "{} liveness", handle.id());
    }

    for instance in s.stack().iter() {
        let overtaken = s
            .queue()
            .iter()
            .any(|q| q.class() == instance.class() && q.id() < instance.id());
        prop_assert!(!overtaken, "{} admitted ahead of its class backlog", instance.id());
    }
    Ok(())
}

proptest! {
    #[test]
    fn invariants_hold_over_random_sequences(
        config in arb_config(),
        ops in proptest::collection::vec(arb_op(), 1..80),
    ) {
        let mut clock = Instant::now();
        let mut s = Scheduler::with_start(config, clock);
        let mut handles = Vec::new();
        for op in &ops {
            apply(&mut s, &mut handles, &mut clock, op);
            check(&s, &mut handles)?;
        }

        s.close_all();
        prop_assert!(s.is_idle());
        for handle in &mut handles {
            prop_assert!(handle.is_resolved());
        }
    }

    #[test]
    fn outcomes_never_change_once_settled(
        ops in proptest::collection::vec(arb_op(), 1..60),
    ) {
        let mut clock = Instant::now();
        let mut s = Scheduler::with_start(SchedulerConfig::default(), clock);
        let mut handles = Vec::new();
        let mut settled = Vec::new();
        for op in &ops {
            apply(&mut s, &mut handles, &mut clock, op);
            settled.resize(handles.len(), None);
            for (handle, seen) in handles.iter_mut().zip(settled.iter_mut()) {
                let now = handle.try_outcome();
                if let Some(prev) = seen.as_ref() {
                    prop_assert_eq!(Some(prev), now.as_ref());
                }
                *seen = now;
            }
        }
    }
}
