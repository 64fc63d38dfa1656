//! Queued operation records.
//!
//! A `QueuedEntry` is one deferred operation awaiting retry or removal. The
//! payload is opaque to the queue and only ever compared structurally; the
//! metadata carries the few fields the transition rules inspect.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::ids::{AppointmentId, EntryKind};
use crate::state::equality::{same_entry, same_meta, same_payload};

/// Opaque operation-specific data.
///
/// Equality is deep: objects compare by key set and values, independent of
/// key order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Payload(pub Value);

impl Payload {
    /// A payload carrying no data (`null`).
    pub fn empty() -> Self {
        Payload(Value::Null)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        Payload(value)
    }
}

impl PartialEq for Payload {
    fn eq(&self, other: &Self) -> bool {
        same_payload(self, other)
    }
}

impl Eq for Payload {}

/// Metadata attached to a queued entry.
///
/// A missing `dismiss` list is the same as an empty one. Keys other than the
/// three known fields are kept in `extra` so that they take part in
/// structural equality and survive a snapshot round trip.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntryMeta {
    /// Whether the failing operation asked to be retried later.
    ///
    /// Read leniently: a value that is not a boolean is treated as unset.
    #[serde(default, deserialize_with = "lenient_flag", skip_serializing_if = "Option::is_none")]
    pub retry: Option<bool>,

    /// Trigger kinds that evict this entry when dismissed.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dismiss: Vec<String>,

    /// The appointment this entry refers to. Required for `SYNC_APPOINTMENT`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appointment_id: Option<AppointmentId>,

    /// Any other metadata supplied by the failing context.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EntryMeta {
    /// Metadata requesting a retry.
    pub fn retrying() -> Self {
        EntryMeta {
            retry: Some(true),
            ..EntryMeta::default()
        }
    }

    pub fn with_retry(mut self, retry: bool) -> Self {
        self.retry = Some(retry);
        self
    }

    pub fn with_appointment(mut self, id: impl Into<AppointmentId>) -> Self {
        self.appointment_id = Some(id.into());
        self
    }

    pub fn dismissed_by(mut self, trigger: impl Into<String>) -> Self {
        self.dismiss.push(trigger.into());
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// True only when `retry` was explicitly set to `true`.
    pub fn wants_retry(&self) -> bool {
        self.retry == Some(true)
    }

    pub fn is_dismissed_by(&self, trigger: &str) -> bool {
        self.dismiss.iter().any(|t| t == trigger)
    }
}

fn lenient_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<bool>, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Bool(flag)) => Some(flag),
        _ => None,
    })
}

impl PartialEq for EntryMeta {
    fn eq(&self, other: &Self) -> bool {
        same_meta(self, other)
    }
}

impl Eq for EntryMeta {}

/// An operation that failed and has not been given metadata yet.
///
/// This is the object form of a retry candidate: the metadata of the failing
/// context is attached to it on admission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingAction {
    pub kind: EntryKind,
    #[serde(default)]
    pub payload: Payload,
}

impl PendingAction {
    pub fn new(kind: impl Into<EntryKind>, payload: impl Into<Payload>) -> Self {
        PendingAction {
            kind: kind.into(),
            payload: payload.into(),
        }
    }

    /// Builds the canonical queued entry by attaching `meta`.
    pub fn into_entry(self, meta: EntryMeta) -> QueuedEntry {
        QueuedEntry {
            kind: self.kind,
            payload: self.payload,
            meta,
        }
    }
}

/// A buffered deferred operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueuedEntry {
    pub kind: EntryKind,
    #[serde(default)]
    pub payload: Payload,
    #[serde(default)]
    pub meta: EntryMeta,
}

impl QueuedEntry {
    /// Creates an entry with empty metadata.
    pub fn new(kind: impl Into<EntryKind>, payload: impl Into<Payload>) -> Self {
        QueuedEntry {
            kind: kind.into(),
            payload: payload.into(),
            meta: EntryMeta::default(),
        }
    }

    pub fn with_meta(mut self, meta: EntryMeta) -> Self {
        self.meta = meta;
        self
    }

    /// Shorthand for a `SYNC_APPOINTMENT` entry scoped to `id`, requesting retry.
    pub fn sync_appointment(id: impl Into<AppointmentId>, payload: impl Into<Payload>) -> Self {
        QueuedEntry {
            kind: EntryKind::SyncAppointment,
            payload: payload.into(),
            meta: EntryMeta::retrying().with_appointment(id),
        }
    }

    pub fn appointment_id(&self) -> Option<AppointmentId> {
        self.meta.appointment_id.clone()
    }
}

impl PartialEq for QueuedEntry {
    fn eq(&self, other: &Self) -> bool {
        same_entry(self, other)
    }
}

impl Eq for QueuedEntry {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_meta_fields_deserialize_to_defaults() {
        let entry: QueuedEntry = serde_json::from_value(json!({"kind": "PING"})).unwrap();
        assert_eq!(entry.kind, EntryKind::new("PING"));
        assert_eq!(entry.payload, Payload::empty());
        assert_eq!(entry.meta.retry, None);
        assert!(entry.meta.dismiss.is_empty());
        assert_eq!(entry.meta.appointment_id, None);
    }

    #[test]
    fn unknown_meta_keys_are_kept_in_extra() {
        let meta: EntryMeta = serde_json::from_value(json!({
            "retry": true,
            "appointment_id": 7,
            "origin": "calendar"
        }))
        .unwrap();

        assert!(meta.wants_retry());
        assert_eq!(meta.appointment_id, Some(AppointmentId::Number(7)));
        assert_eq!(meta.extra.get("origin"), Some(&json!("calendar")));

        let back = serde_json::to_value(&meta).unwrap();
        assert_eq!(back["origin"], json!("calendar"));
    }

    #[test]
    fn wants_retry_requires_explicit_true() {
        assert!(!EntryMeta::default().wants_retry());
        assert!(!EntryMeta::default().with_retry(false).wants_retry());
        assert!(EntryMeta::retrying().wants_retry());
    }

    #[test]
    fn non_boolean_retry_reads_as_unset() {
        for raw in [json!("yes"), json!(1), json!(null), json!({"on": true})] {
            let meta: EntryMeta = serde_json::from_value(json!({"retry": raw})).unwrap();
            assert_eq!(meta.retry, None);
            assert!(!meta.wants_retry());
        }
    }

    #[test]
    fn string_appointment_id_is_accepted() {
        let meta: EntryMeta = serde_json::from_value(json!({"appointment_id": "a-17"})).unwrap();
        assert_eq!(meta.appointment_id, Some(AppointmentId::from("a-17")));
        assert_eq!(serde_json::to_value(&meta).unwrap(), json!({"appointment_id": "a-17"}));
    }

    #[test]
    fn dismiss_membership() {
        let meta = EntryMeta::default().dismissed_by("LOGOUT");
        assert!(meta.is_dismissed_by("LOGOUT"));
        assert!(!meta.is_dismissed_by("LOGIN"));
    }

    #[test]
    fn pending_action_attaches_meta() {
        let entry = PendingAction::new("UPLOAD", json!({"id": 1}))
            .into_entry(EntryMeta::retrying().with_appointment(3u64));

        assert_eq!(entry.kind, EntryKind::new("UPLOAD"));
        assert_eq!(entry.appointment_id(), Some(AppointmentId::Number(3)));
        assert!(entry.meta.wants_retry());
    }

    #[test]
    fn entry_serializes_with_sparse_meta() {
        let entry = QueuedEntry::sync_appointment(5u64, json!({"notes": "x"}));
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(
            value,
            json!({
                "kind": "SYNC_APPOINTMENT",
                "payload": {"notes": "x"},
                "meta": {"retry": true, "appointment_id": 5}
            })
        );
    }
}
