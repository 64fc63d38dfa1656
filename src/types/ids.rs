//! Newtype wrappers for queue identifiers.
//!
//! These keep appointment ids and entry kinds from being confused with the
//! free-form strings and numbers that flow through payloads.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Wire tag of the kind with per-appointment uniqueness semantics.
pub const SYNC_APPOINTMENT: &str = "SYNC_APPOINTMENT";

/// Identifier of an external appointment that a queued entry refers to.
///
/// Opaque to the queue: the backend hands out either numbers or strings, and
/// ids are only ever compared for equality. A number never equals a string,
/// so `7` and `"7"` are different appointments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AppointmentId {
    Number(u64),
    Text(String),
}

impl fmt::Display for AppointmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentId::Number(n) => write!(f, "appointment:{n}"),
            AppointmentId::Text(s) => write!(f, "appointment:{s}"),
        }
    }
}

impl From<u64> for AppointmentId {
    fn from(n: u64) -> Self {
        AppointmentId::Number(n)
    }
}

impl From<&str> for AppointmentId {
    fn from(s: &str) -> Self {
        AppointmentId::Text(s.to_string())
    }
}

impl From<String> for AppointmentId {
    fn from(s: String) -> Self {
        AppointmentId::Text(s)
    }
}

/// Discriminant of a queued operation.
///
/// Only `SyncAppointment` carries special semantics (at most one queued entry
/// per appointment id). Every other domain tag is kept verbatim.
///
/// Serialized as a plain string: `"SYNC_APPOINTMENT"` or the custom tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntryKind {
    SyncAppointment,
    Other(String),
}

impl EntryKind {
    /// Creates a kind from its wire tag.
    pub fn new(tag: impl Into<String>) -> Self {
        let tag = tag.into();
        if tag == SYNC_APPOINTMENT {
            EntryKind::SyncAppointment
        } else {
            EntryKind::Other(tag)
        }
    }

    /// Returns the wire tag.
    pub fn as_str(&self) -> &str {
        match self {
            EntryKind::SyncAppointment => SYNC_APPOINTMENT,
            EntryKind::Other(tag) => tag,
        }
    }

    pub fn is_sync_appointment(&self) -> bool {
        matches!(self, EntryKind::SyncAppointment)
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for EntryKind {
    fn from(s: &str) -> Self {
        EntryKind::new(s)
    }
}

impl From<String> for EntryKind {
    fn from(s: String) -> Self {
        EntryKind::new(s)
    }
}

impl Serialize for EntryKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EntryKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(EntryKind::new)
    }
}
