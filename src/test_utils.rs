//! Shared test utilities and arbitrary generators for property-based testing.

use crate::commands::Command;
use crate::persistence::event::LoggedCommand;
use crate::state::{QueueConfig, StaleEntryPolicy, apply};
use crate::types::{AppointmentId, EntryKind, EntryMeta, PendingAction, QueueState, QueuedEntry};
use proptest::prelude::*;
use serde_json::{Value, json};

pub fn arb_appointment_id() -> impl Strategy<Value = AppointmentId> {
    prop_oneof![
        3 => (0u64..6).prop_map(AppointmentId::Number),
        1 => "a-[0-2]".prop_map(AppointmentId::Text),
    ]
}

pub fn arb_entry_kind() -> impl Strategy<Value = EntryKind> {
    prop_oneof![
        Just(EntryKind::SyncAppointment),
        "[A-D]".prop_map(EntryKind::new),
    ]
}

pub fn arb_payload() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        (0i64..5).prop_map(|n| json!(n)),
        "[a-c]{1,3}".prop_map(|s| json!(s)),
        (0i64..3, "[a-c]{1,2}").prop_map(|(n, s)| json!({"n": n, "s": s})),
    ]
}

/// Metadata with arbitrary fields, `retry` included.
pub fn arb_meta() -> impl Strategy<Value = EntryMeta> {
    (
        prop::option::of(any::<bool>()),
        prop::collection::vec("[A-C]", 0..3),
        prop::option::of(arb_appointment_id()),
        prop::option::of((0i64..3).prop_map(|n| json!(n))),
    )
        .prop_map(|(retry, dismiss, appointment_id, origin)| {
            let mut meta = EntryMeta {
                retry,
                dismiss,
                appointment_id,
                ..EntryMeta::default()
            };
            if let Some(origin) = origin {
                meta.extra.insert("x_origin".to_string(), origin);
            }
            meta
        })
}

/// Metadata that always asks for retry.
pub fn arb_retry_meta() -> impl Strategy<Value = EntryMeta> {
    arb_meta().prop_map(|meta| meta.with_retry(true))
}

pub fn arb_pending_action() -> impl Strategy<Value = PendingAction> {
    (arb_entry_kind(), arb_payload()).prop_map(|(kind, payload)| PendingAction::new(kind, payload))
}

pub fn arb_entry() -> impl Strategy<Value = QueuedEntry> {
    (arb_pending_action(), arb_meta()).prop_map(|(action, meta)| action.into_entry(meta))
}

/// A reachable queue state: built by admitting retrying actions in order.
pub fn arb_queue_state() -> impl Strategy<Value = QueueState> {
    (
        any::<bool>(),
        prop::collection::vec((arb_pending_action(), arb_retry_meta()), 0..12),
    )
        .prop_map(|(connected, admissions)| {
            let config = QueueConfig::default();
            admissions.into_iter().fold(
                QueueState::initial().with_connected(connected),
                |state, (action, meta)| apply(&state, &Command::defer_action(action, meta), &config),
            )
        })
}

pub fn arb_command() -> impl Strategy<Value = Command> {
    prop_oneof![
        any::<bool>().prop_map(|connected| Command::ConnectivityChanged { connected }),
        (
            prop::option::of(arb_pending_action()),
            prop::option::of(arb_entry()),
            arb_meta()
        )
            .prop_map(|(prev_action, prev_procedure, meta)| Command::DeferForRetry {
                prev_action,
                prev_procedure,
                meta
            }),
        arb_entry().prop_map(|target| Command::RemoveFromQueue { target }),
        "[A-C]".prop_map(|trigger_kind| Command::DismissQueueEntries { trigger_kind }),
        prop::collection::vec(arb_appointment_id(), 0..4)
            .prop_map(|valid_ids| Command::PruneStaleEntries { valid_ids }),
        Just(Command::Unrecognized),
    ]
}

pub fn arb_logged_command() -> impl Strategy<Value = LoggedCommand> {
    (0u64..1000, arb_command(), any::<bool>()).prop_map(|(seq, command, keep_unscoped)| {
        let policy = if keep_unscoped {
            StaleEntryPolicy::KeepUnscoped
        } else {
            StaleEntryPolicy::DropUnscoped
        };
        LoggedCommand::applied(seq, command, &QueueConfig::default().with_stale_policy(policy))
    })
}
