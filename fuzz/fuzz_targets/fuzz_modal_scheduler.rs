#![no_main]

use std::collections::HashSet;
use std::time::Duration;

use arbitrary::Arbitrary;
use ftui_modal::{
    ApplicationMode, Instant, ModalHandle, ModalId, ModalRequest, ModalResultData, Scheduler,
    SchedulerConfig,
};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
enum Op {
    Submit {
        kind: String,
        key: Option<String>,
        caller_id: Option<u8>,
        concurrent: bool,
        closable: bool,
        weight: i16,
        lifetime_ms: Option<u16>,
    },
    Close {
        handle: u8,
        custom: Option<String>,
    },
    CloseRaw(u8),
    Dismiss,
    SetMode(Option<u8>),
    Tick(u16),
    Drain,
    CloseAll,
}

#[derive(Debug, Arbitrary)]
struct Input {
    transition_ms: u8,
    critical_escapes: bool,
    ops: Vec<Op>,
}

fn assert_consistent(s: &Scheduler, handles: &mut [ModalHandle]) {
    let mut keys = HashSet::new();
    for instance in s.stack().iter() {
        assert!(keys.insert(instance.submission().identity_key().to_owned()));
    }
    let snapshot = s.snapshot();
    for pair in snapshot.instances.windows(2) {
        assert!(pair[0].layer_index < pair[1].layer_index);
    }
    // Ids may be reused once resolved; only the newest handle per id is live.
    let mut newest = HashSet::new();
    for handle in handles.iter_mut().rev() {
        if newest.insert(handle.id()) {
            assert_eq!(s.status(handle.id()).is_some(), !handle.is_resolved());
        } else {
            assert!(handle.is_resolved());
        }
    }
}

fuzz_target!(|input: Input| {
    if input.ops.len() > 512 {
        return;
    }
    let config = SchedulerConfig::new()
        .exit_transition(Duration::from_millis(u64::from(input.transition_ms)))
        .critical_escapes_teardown(input.critical_escapes);
    let mut clock = Instant::now();
    let mut s = Scheduler::with_start(config, clock);
    let mut handles: Vec<ModalHandle> = Vec::new();

    for op in input.ops {
        match op {
            Op::Submit {
                kind,
                key,
                caller_id,
                concurrent,
                closable,
                weight,
                lifetime_ms,
            } => {
                let mut request = ModalRequest::new(kind)
                    .closable(closable)
                    .layer_weight(i32::from(weight));
                if let Some(key) = key {
                    request = request.identity_key(key);
                }
                if let Some(raw) = caller_id {
                    request = request.with_id(ModalId::new(u64::from(raw)));
                }
                if concurrent {
                    request = request.concurrent();
                }
                if let Some(ms) = lifetime_ms {
                    request = request.auto_close_after(Duration::from_millis(u64::from(ms)));
                }
                // Invalid requests are rejected without touching state.
                if let Ok(handle) = s.submit(request) {
                    handles.push(handle);
                }
            }
            Op::Close { handle, custom } => {
                if let Some(h) = handles.get(usize::from(handle) % handles.len().max(1)) {
                    let result = custom.map_or(ModalResultData::Confirmed, ModalResultData::Custom);
                    s.close(h.id(), result);
                }
            }
            Op::CloseRaw(raw) => {
                s.close(ModalId::new(u64::from(raw)), ModalResultData::Dismissed);
            }
            Op::Dismiss => {
                s.dismiss_foreground();
            }
            Op::SetMode(mode) => {
                let mode = mode.map(|m| ApplicationMode::ALL[usize::from(m) % ApplicationMode::ALL.len()]);
                s.set_mode(mode);
            }
            Op::Tick(ms) => {
                clock += Duration::from_millis(u64::from(ms));
                s.tick(clock);
            }
            Op::Drain => {
                s.drain_queue();
            }
            Op::CloseAll => s.close_all(),
        }
        assert_consistent(&s, &mut handles);
    }

    s.close_all();
    assert!(s.is_idle());
    for handle in &mut handles {
        assert!(handle.is_resolved());
    }
});
