//! QR payload generation for lectures.
//!
//! The payload is a small JSON document; scanners hand it back verbatim to
//! `POST /attendance/mark`. Only `lectureId` is read back, the remaining
//! fields make each regenerated code distinct.

use serde_json::json;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use uuid::Uuid;

pub fn generate_qr_payload(lecture_id: Uuid, title: &str, issued_at: OffsetDateTime) -> String {
    let timestamp = issued_at
        .format(&Rfc3339)
        .unwrap_or_else(|_| issued_at.unix_timestamp().to_string());

    json!({
        "lectureId": lecture_id.to_string(),
        "title": title,
        "timestamp": timestamp,
    })
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marker::parse_qr_payload;
    use time::macros::datetime;

    #[test]
    fn test_generated_payload_is_accepted_by_marker() {
        let lecture_id = Uuid::new_v4();
        let payload = generate_qr_payload(lecture_id, "Intro", datetime!(2025-03-03 9:00 UTC));
        assert_eq!(parse_qr_payload(&payload).unwrap(), lecture_id);
    }

    #[test]
    fn test_regenerated_payload_differs() {
        let lecture_id = Uuid::new_v4();
        let first = generate_qr_payload(lecture_id, "Intro", datetime!(2025-03-03 9:00 UTC));
        let second = generate_qr_payload(lecture_id, "Intro", datetime!(2025-03-03 9:05 UTC));
        assert_ne!(first, second);

        let value: serde_json::Value = serde_json::from_str(&second).unwrap();
        assert_eq!(value["timestamp"], "2025-03-03T09:05:00Z");
        assert_eq!(value["title"], "Intro");
    }
}
