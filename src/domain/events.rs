//! Domain events for the application.
//!
//! Absence lifecycle notifications are sent over the event bus; the SSE
//! endpoint relays them to connected clients.

use serde::Serialize;

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", content = "payload")]
pub enum NotificationEvent {
    /// First-time scheduling of an absence window.
    OutOfOfficeScheduled(AbsencePayload),

    /// An existing window was updated.
    OutOfOfficeChanged(AbsencePayload),

    /// A window was removed before or while running.
    OutOfOfficeCleared { absence_id: i32, user_id: String },

    /// The start-of-absence job fired.
    OutOfOfficeStarted { absence_id: i32, user_id: String },

    /// The end-of-absence job fired.
    OutOfOfficeEnded { absence_id: i32, user_id: String },

    Error { message: String },

    Info { message: String },
}

#[derive(Clone, Debug, Serialize)]
pub struct AbsencePayload {
    pub absence_id: i32,

    pub user_id: String,

    /// Epoch seconds of the computed start instant.
    pub start: i64,

    /// Epoch seconds of the computed end instant.
    pub end: i64,

    pub short_message: String,

    pub message: String,
}
