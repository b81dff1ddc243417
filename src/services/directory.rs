//! Contact normalization: raw upstream user records to canonical contacts.

use serde::Serialize;
use serde_json::Value;

use crate::upstream::RawUser;

/// Canonical directory contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Contact {
    pub name: String,
    pub extension: String,
    pub email: String,
    pub tags: Vec<String>,
    #[serde(rename = "isAgent")]
    pub is_agent: bool,
}

/// Map raw user records to contacts. Pure; has no failure mode.
///
/// Records without a presence id are dropped entirely. Output order
/// preserves input order among the retained records.
pub fn normalize(users: Vec<RawUser>) -> Vec<Contact> {
    users.into_iter().filter_map(contact_from).collect()
}

fn contact_from(user: RawUser) -> Option<Contact> {
    let extension = user.presence_id.filter(|id| !id.is_empty())?;

    let first = user.first_name.unwrap_or_default();
    let last = user.last_name.unwrap_or_default();
    let name = format!("{first} {last}").trim().to_string();

    let tags = tag_names(user.tags);

    Some(Contact {
        name,
        extension,
        email: user.email.unwrap_or_default(),
        tags,
        is_agent: user.is_agent.unwrap_or(false),
    })
}

/// Extract tag names from the raw tags value. A tags field that is not a
/// list yields no tags, and any entry that is not an object with a string
/// `name` field is silently skipped.
fn tag_names(tags: Option<Value>) -> Vec<String> {
    let Some(Value::Array(entries)) = tags else {
        return Vec::new();
    };
    entries.into_iter().filter_map(tag_name).collect()
}

fn tag_name(tag: Value) -> Option<String> {
    tag.get("name").and_then(Value::as_str).map(str::to_owned)
}
