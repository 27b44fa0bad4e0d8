use chrono::{DateTime, NaiveDateTime, Utc};
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};

/// Server-assigned note identifier.
///
/// Opaque to the client. The backend may encode it as a JSON number or a
/// string; both decode to the same textual form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NoteId(String);

impl NoteId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for NoteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for NoteId {
    type Err = std::convert::Infallible;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl<'de> Deserialize<'de> for NoteId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(OpaqueIdVisitor).map(Self)
    }
}

/// Owner identifier echoed back by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'de> Deserialize<'de> for UserId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(OpaqueIdVisitor).map(Self)
    }
}

struct OpaqueIdVisitor;

impl Visitor<'_> for OpaqueIdVisitor {
    type Value = String;

    fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("a string or integer identifier")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<String, E> {
        if v.is_empty() {
            return Err(E::invalid_value(de::Unexpected::Str(v), &self));
        }
        Ok(v.to_string())
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<String, E> {
        Ok(v.to_string())
    }
}

/// A persisted note as returned by the backend.
///
/// A `Note` always carries an identifier and a creation timestamp; unsaved
/// editor state is a [`NoteDraft`] instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_favorite: bool,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(
        default,
        with = "timestamp::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_email: Option<String>,
}

impl Note {
    /// The fields a client is allowed to write back.
    pub fn payload(&self) -> NotePayload {
        NotePayload {
            title: self.title.clone(),
            content: self.content.clone(),
            is_favorite: self.is_favorite,
        }
    }

    /// First `max_chars` characters of the content, for list previews.
    pub fn preview(&self, max_chars: usize) -> String {
        let mut chars = self.content.chars();
        let head: String = chars.by_ref().take(max_chars).collect();
        if chars.next().is_some() {
            format!("{head}...")
        } else {
            head
        }
    }
}

/// Request body for create and update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotePayload {
    pub title: String,
    pub content: String,
    pub is_favorite: bool,
}

/// Editor buffer. Never persisted by itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteDraft {
    pub title: String,
    pub content: String,
    pub is_favorite: bool,
}

impl NoteDraft {
    pub fn from_note(note: &Note) -> Self {
        Self {
            title: note.title.clone(),
            content: note.content.clone(),
            is_favorite: note.is_favorite,
        }
    }

    pub fn has_title(&self) -> bool {
        !self.title.trim().is_empty()
    }

    pub fn to_payload(&self) -> NotePayload {
        NotePayload {
            title: self.title.clone(),
            content: self.content.clone(),
            is_favorite: self.is_favorite,
        }
    }
}

/// Per-user counters from `GET /api/notes/stats`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteStats {
    #[serde(default)]
    pub user_email: Option<String>,
    pub total_notes: u64,
    pub favorite_notes: u64,
}

/// Acknowledgment returned by `POST /api/notes/{id}/send-email`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailReceipt {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub note_id: Option<NoteId>,
    #[serde(default)]
    pub note_title: Option<String>,
    #[serde(default)]
    pub sent_to: Option<String>,
}

impl EmailReceipt {
    pub fn summary(&self) -> String {
        self.message
            .clone()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| "Note sent successfully!".to_string())
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// RFC 3339 timestamps; zone-less values are read as UTC.
mod timestamp {
    use super::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| naive.and_utc())
    }

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&value.to_rfc3339_opts(chrono::SecondsFormat::AutoSi, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        parse(&raw).ok_or_else(|| de::Error::custom(format!("invalid timestamp: {raw}")))
    }

    pub mod option {
        use super::{DateTime, Utc};
        use serde::{Deserialize, Deserializer, Serializer, de};

        pub fn serialize<S: Serializer>(
            value: &Option<DateTime<Utc>>,
            s: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(v) => super::serialize(v, s),
                None => s.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            d: D,
        ) -> Result<Option<DateTime<Utc>>, D::Error> {
            match Option::<String>::deserialize(d)? {
                Some(raw) => super::parse(&raw)
                    .map(Some)
                    .ok_or_else(|| de::Error::custom(format!("invalid timestamp: {raw}"))),
                None => Ok(None),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_note_decodes_spec_example() {
        let note: Note = serde_json::from_value(json!({
            "id": "n1",
            "title": "Groceries",
            "content": "milk, eggs",
            "isFavorite": false,
            "createdAt": "2024-01-01T00:00:00Z"
        }))
        .unwrap();

        assert_eq!(note.id.as_str(), "n1");
        assert_eq!(note.title, "Groceries");
        assert!(!note.is_favorite);
        assert_eq!(note.created_at.to_rfc3339(), "2024-01-01T00:00:00+00:00");
        assert!(note.updated_at.is_none());
    }

    #[test]
    fn test_numeric_id_and_naive_timestamp() {
        let note: Note = serde_json::from_value(json!({
            "id": 42,
            "title": "t",
            "content": null,
            "isFavorite": null,
            "createdAt": "2024-03-05T10:11:12.123456",
            "updatedAt": "2024-03-06T00:00:00",
            "userId": 7,
            "userEmail": "a@example.com"
        }))
        .unwrap();

        assert_eq!(note.id, NoteId::new("42"));
        assert_eq!(note.content, "");
        assert!(!note.is_favorite);
        assert_eq!(note.user_id.as_ref().map(UserId::as_str), Some("7"));
        assert!(note.updated_at.is_some());
    }

    #[test]
    fn test_empty_id_rejected() {
        let result: Result<Note, _> = serde_json::from_value(json!({
            "id": "",
            "title": "t",
            "createdAt": "2024-01-01T00:00:00Z"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_payload_uses_camel_case() {
        let payload = NotePayload {
            title: "a".into(),
            content: "b".into(),
            is_favorite: true,
        };
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({"title": "a", "content": "b", "isFavorite": true})
        );
    }

    #[test]
    fn test_draft_title_check() {
        let mut draft = NoteDraft::default();
        assert!(!draft.has_title());
        draft.title = "   \t".into();
        assert!(!draft.has_title());
        draft.title = " x ".into();
        assert!(draft.has_title());
    }

    #[test]
    fn test_preview_truncates_on_char_boundary() {
        let note: Note = serde_json::from_value(json!({
            "id": "1",
            "title": "t",
            "content": "héllo wörld",
            "createdAt": "2024-01-01T00:00:00Z"
        }))
        .unwrap();
        assert_eq!(note.preview(5), "héllo...");
        assert_eq!(note.preview(100), "héllo wörld");
    }

    #[test]
    fn test_receipt_summary_fallback() {
        assert_eq!(EmailReceipt::default().summary(), "Note sent successfully!");
        let receipt = EmailReceipt {
            message: Some("Note sent successfully to a@b.c".into()),
            ..Default::default()
        };
        assert_eq!(receipt.summary(), "Note sent successfully to a@b.c");
    }
}
