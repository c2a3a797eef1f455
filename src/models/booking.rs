use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;

use crate::services::store::{Document, FieldValue};

/// A booking record normalized from the document store. Known fields are
/// typed; everything else rides along opaquely in `extra`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: String,
    pub professional_id: String,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub scheduled_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, FieldValue>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
    /// Statuses this service does not know about pass through unchanged.
    Other(String),
}

impl BookingStatus {
    pub fn as_str(&self) -> &str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Other(s) => s,
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "pending" => BookingStatus::Pending,
            "confirmed" => BookingStatus::Confirmed,
            "completed" => BookingStatus::Completed,
            "cancelled" => BookingStatus::Cancelled,
            other => BookingStatus::Other(other.to_string()),
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, BookingStatus::Pending)
    }
}

impl Serialize for BookingStatus {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl Booking {
    /// Merges a store document into a `Booking`. The document identity wins
    /// over any `id` field stored in the record.
    pub fn from_document(doc: &Document) -> Self {
        let mut extra = doc.fields.clone();
        extra.remove("id");

        let professional_id = extra
            .remove("professionalId")
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default();

        let status = extra
            .remove("status")
            .and_then(|v| v.as_str().map(BookingStatus::from_str))
            .unwrap_or_else(|| BookingStatus::Other(String::new()));

        // Mixed shapes are expected from historical data: absent or
        // unparseable creation timestamps resolve to the Unix epoch.
        let created_at = extra
            .remove("createdAt")
            .as_ref()
            .and_then(parse_datetime)
            .unwrap_or(DateTime::UNIX_EPOCH);

        // The scheduling datetime gets no such fallback: records without a
        // usable value simply carry no ordering key.
        let scheduled_at = extra.remove("datetime").as_ref().and_then(parse_datetime);

        Self {
            id: doc.id.clone(),
            professional_id,
            status,
            created_at,
            scheduled_at,
            extra,
        }
    }
}

/// Reads a store value as a point in time: native timestamps directly,
/// strings via the date formats the web app has written over time, numbers
/// as epoch milliseconds.
fn parse_datetime(value: &FieldValue) -> Option<DateTime<Utc>> {
    match value {
        FieldValue::Timestamp(t) => Some(*t),
        FieldValue::Str(raw) => parse_datetime_str(raw),
        FieldValue::Int(millis) => DateTime::from_timestamp_millis(*millis),
        FieldValue::Double(millis) => DateTime::from_timestamp_millis(*millis as i64),
        _ => None,
    }
}

fn parse_datetime_str(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(t) = DateTime::parse_from_rfc3339(raw) {
        return Some(t.with_timezone(&Utc));
    }
    if let Ok(t) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(t.and_utc());
    }
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return d.and_hms_opt(0, 0, 0).map(|t| t.and_utc());
    }
    None
}
