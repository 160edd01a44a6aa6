use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Error body attached to failed repository responses.
///
/// Every field is optional: the client must cope with bodies carrying only a
/// `message`, only `detailMessages`, both, or neither. Fields are read one by
/// one, so a badly typed field never hides the others.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "Map<String, Value>")]
pub struct ServerErrorPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail_messages: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl ServerErrorPayload {
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn with_details(details: Vec<String>) -> Self {
        Self {
            detail_messages: Some(details),
            ..Self::default()
        }
    }

    /// Decodes a raw failure body.
    ///
    /// Returns `None` when there is no body at all (empty, whitespace or JSON
    /// `null`). A body that is present but not a JSON object yields an empty
    /// payload.
    pub fn from_body(body: &[u8]) -> Option<Self> {
        let text = String::from_utf8_lossy(body);
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }
        match serde_json::from_str::<Value>(trimmed) {
            Ok(Value::Null) => None,
            Ok(Value::Object(fields)) => Some(Self::from(fields)),
            _ => Some(Self::default()),
        }
    }

    /// The server message, if it is meaningful (longer than one UTF-16 unit).
    pub fn display_message(&self) -> Option<&str> {
        self.message
            .as_deref()
            .filter(|message| message.encode_utf16().count() > 1)
    }

    pub fn timestamp_utc(&self) -> Option<DateTime<Utc>> {
        self.timestamp
            .as_deref()
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|parsed| parsed.with_timezone(&Utc))
    }
}

impl From<Map<String, Value>> for ServerErrorPayload {
    fn from(fields: Map<String, Value>) -> Self {
        let text = |key: &str| fields.get(key).and_then(Value::as_str).map(str::to_string);
        Self {
            message: text("message"),
            detail_messages: fields.get("detailMessages").and_then(detail_lines),
            // Framework error bodies carry the numeric code under `status`.
            status: fields.get("status").and_then(scalar_text),
            status_code: fields
                .get("statusCode")
                .and_then(Value::as_u64)
                .and_then(|code| u16::try_from(code).ok()),
            timestamp: text("timestamp"),
        }
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

// The server declares detail messages as an untyped collection; anything that
// is not a string is rendered as JSON text.
fn detail_lines(value: &Value) -> Option<Vec<String>> {
    let items = value.as_array()?;
    Some(
        items
            .iter()
            .map(|item| match item {
                Value::String(text) => text.clone(),
                other => other.to_string(),
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_null_bodies_are_absent() {
        assert_eq!(ServerErrorPayload::from_body(b""), None);
        assert_eq!(ServerErrorPayload::from_body(b"  \n"), None);
        assert_eq!(ServerErrorPayload::from_body(b"null"), None);
    }

    #[test]
    fn non_json_body_is_present_but_empty() {
        let payload = ServerErrorPayload::from_body(b"<html>Bad Gateway</html>").expect("body");
        assert_eq!(payload, ServerErrorPayload::default());
    }

    #[test]
    fn decodes_full_api_error() {
        let body = br##"{
            "status": "BAD_REQUEST",
            "statusCode": 400,
            "message": "The provided device description does not comply to the schema.",
            "detailMessages": ["#/name: expected type: String", 3],
            "timestamp": "2024-03-01T10:15:30.123Z"
        }"##;
        let payload = ServerErrorPayload::from_body(body).expect("body");
        assert_eq!(payload.status.as_deref(), Some("BAD_REQUEST"));
        assert_eq!(payload.status_code, Some(400));
        assert_eq!(
            payload.detail_messages,
            Some(vec!["#/name: expected type: String".to_string(), "3".to_string()])
        );
        assert!(payload.timestamp_utc().is_some());
    }

    #[test]
    fn framework_error_body_keeps_its_message() {
        let body = br#"{
            "timestamp": "2024-03-01T10:15:30.123+00:00",
            "status": 405,
            "error": "Method Not Allowed",
            "message": "Request method 'PUT' not supported",
            "path": "/deviceDescriptions"
        }"#;
        let payload = ServerErrorPayload::from_body(body).expect("body");
        assert_eq!(
            payload.display_message(),
            Some("Request method 'PUT' not supported")
        );
        assert_eq!(payload.status.as_deref(), Some("405"));
        assert_eq!(payload.status_code, None);
        assert_eq!(payload.detail_messages, None);
    }

    #[test]
    fn badly_typed_fields_do_not_hide_the_others() {
        let payload = ServerErrorPayload::from_body(
            br#"{"message": 5, "detailMessages": ["name: must not be blank"], "statusCode": "x"}"#,
        )
        .expect("body");
        assert_eq!(payload.message, None);
        assert_eq!(
            payload.detail_messages,
            Some(vec!["name: must not be blank".to_string()])
        );

        let payload = ServerErrorPayload::from_body(
            br#"{"message": "Name already exists", "detailMessages": "oops", "timestamp": 17}"#,
        )
        .expect("body");
        assert_eq!(payload.display_message(), Some("Name already exists"));
        assert_eq!(payload.detail_messages, None);
        assert_eq!(payload.timestamp, None);
    }

    #[test]
    fn decodes_through_serde_as_well() {
        let payload: ServerErrorPayload =
            serde_json::from_str(r#"{"status": 404, "message": "Not Found"}"#).expect("decode");
        assert_eq!(payload.message.as_deref(), Some("Not Found"));
        assert_eq!(payload.status.as_deref(), Some("404"));
    }

    #[test]
    fn single_character_message_is_not_displayed() {
        assert_eq!(ServerErrorPayload::with_message("x").display_message(), None);
        assert_eq!(
            ServerErrorPayload::with_message("Name already exists").display_message(),
            Some("Name already exists")
        );
    }

    #[test]
    fn message_length_counts_utf16_units() {
        assert_eq!(ServerErrorPayload::with_message("é").display_message(), None);
        assert_eq!(
            ServerErrorPayload::with_message("\u{1F525}").display_message(),
            Some("\u{1F525}")
        );
    }
}
