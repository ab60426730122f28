//! Structured log events emitted by the scheduler.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use ftui_modal::{ApplicationMode, ModalRequest, ModalResultData, Scheduler};
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

type Captured = Arc<Mutex<Vec<BTreeMap<String, String>>>>;

#[derive(Default)]
struct FieldVisitor {
    fields: BTreeMap<String, String>,
}

impl Visit for FieldVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.fields
            .insert(field.name().to_string(), format!("{value:?}"));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.fields.insert(field.name().to_string(), value.to_string());
    }
}

struct CaptureLayer {
    events: Captured,
}

impl<S: Subscriber> Layer<S> for CaptureLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);
        self.events.lock().expect("events lock").push(visitor.fields);
    }
}

fn capture(run: impl FnOnce()) -> Vec<BTreeMap<String, String>> {
    let events = Captured::default();
    let subscriber = tracing_subscriber::registry().with(CaptureLayer {
        events: Arc::clone(&events),
    });
    tracing::subscriber::with_default(subscriber, run);
    let captured = events.lock().expect("events lock").clone();
    captured
}

fn messages(events: &[BTreeMap<String, String>]) -> Vec<&str> {
    events
        .iter()
        .filter_map(|e| e.get("message").map(String::as_str))
        .collect()
}

#[test]
fn admission_and_close_are_logged_with_fields() {
    let events = capture(|| {
        let mut modals = Scheduler::default();
        let h = modals.submit(ModalRequest::new("confirm")).expect("accepted");
        modals.close(h.id(), ModalResultData::Confirmed);
    });

    let admitted = events
        .iter()
        .find(|e| e.get("message").map(String::as_str) == Some("modal admitted"))
        .expect("admission event");
    assert_eq!(admitted.get("class").map(String::as_str), Some("blocking"));
    assert_eq!(admitted.get("id").map(String::as_str), Some("modal#1"));

    let msgs = messages(&events);
    assert!(msgs.contains(&"modal submitted"));
    assert!(msgs.contains(&"modal closed"));
}

#[test]
fn suppressed_request_logs_queue_reason() {
    let events = capture(|| {
        let mut modals = Scheduler::default();
        modals.set_mode(Some(ApplicationMode::GuidedInput));
        let _h = modals.submit(ModalRequest::new("toast")).expect("accepted");
    });

    let queued = events
        .iter()
        .find(|e| e.get("message").map(String::as_str) == Some("modal queued"))
        .expect("queue event");
    assert_eq!(queued.get("reason").map(String::as_str), Some("Suppressed"));
    assert_eq!(
        queued.get("mode").map(String::as_str),
        Some("Some(GuidedInput)")
    );
}

#[test]
fn rejected_submission_warns() {
    let events = capture(|| {
        let mut modals = Scheduler::default();
        assert!(modals.submit(ModalRequest::new("  ")).is_err());
    });
    assert!(messages(&events).contains(&"rejected modal request with empty kind"));
}
