use std::sync::atomic::{AtomicU32, Ordering};

use chrono::{DateTime, TimeZone, Utc};
use jt_core::{Note, NoteId, Principal};
use serde_json::{Value, json};

static TEST_COUNTER: AtomicU32 = AtomicU32::new(0);

pub fn unique_id(prefix: &str) -> String {
    let id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
    format!("{}-{}", prefix, id)
}

pub fn unique_email() -> String {
    format!("{}@example.com", unique_id("user"))
}

/// Fixed creation time so fixtures compare equal across runs.
pub fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 14, 9, 26, 53)
        .single()
        .unwrap_or_default()
}

pub fn principal(uid: &str, email: &str) -> Principal {
    Principal {
        uid: uid.to_string(),
        email: Some(email.to_string()),
        display_name: None,
    }
}

pub fn note(id: &str, title: &str) -> Note {
    note_with(id, title, "", false)
}

pub fn note_with(id: &str, title: &str, content: &str, is_favorite: bool) -> Note {
    Note {
        id: NoteId::new(id),
        title: title.to_string(),
        content: content.to_string(),
        is_favorite,
        created_at: fixed_time(),
        updated_at: None,
        user_id: None,
        user_email: None,
    }
}

/// A note as the backend renders it on the wire.
pub fn note_json(id: u64, title: &str, content: &str, is_favorite: bool) -> Value {
    json!({
        "id": id,
        "title": title,
        "content": content,
        "isFavorite": is_favorite,
        "createdAt": "2024-03-14T09:26:53.123456",
        "updatedAt": "2024-03-14T09:26:53.123456",
        "userId": 7,
        "userEmail": "ada@example.com"
    })
}
