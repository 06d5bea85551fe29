use crate::backend::{Collection, StoredDocument};
use crate::error::{ServiceError, ServiceResult};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Document field holding the owning user id.
pub const OWNER_FIELD: &str = "userId";
/// Document field linking a list item to its list.
pub const LIST_FIELD: &str = "listId";

/// A type mirrored from one hosted collection.
pub trait Record: Serialize + DeserializeOwned {
    const KIND: &'static str;
    const COLLECTION: Collection;

    fn id(&self) -> &str;
    fn set_id(&mut self, id: String);

    fn from_document(doc: StoredDocument) -> ServiceResult<Self> {
        let mut record: Self = serde_json::from_value(serde_json::Value::Object(doc.fields))
            .map_err(|source| ServiceError::Decode {
                kind: Self::KIND,
                source,
            })?;
        record.set_id(doc.id);
        Ok(record)
    }

    fn to_fields(&self) -> ServiceResult<serde_json::Map<String, serde_json::Value>> {
        match serde_json::to_value(self) {
            Ok(serde_json::Value::Object(map)) => Ok(map),
            Ok(_) => Err(ServiceError::Validation("record must serialize to an object")),
            Err(source) => Err(ServiceError::Decode {
                kind: Self::KIND,
                source,
            }),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(skip)]
    pub id: String,
    #[serde(rename = "userId")]
    pub owner: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub time: Option<NaiveTime>,
    #[serde(default)]
    pub duration_minutes: Option<u32>,
    #[serde(default)]
    pub archived: bool,
    pub created_at: DateTime<Utc>,
}

impl Record for Task {
    const KIND: &'static str = "task";
    const COLLECTION: Collection = Collection::Tasks;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

/// Input for creating a task.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub duration_minutes: Option<u32>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct List {
    #[serde(skip)]
    pub id: String,
    pub name: String,
    #[serde(rename = "userId")]
    pub owner: String,
    pub created_at: DateTime<Utc>,
    /// Item ids in display order.
    #[serde(default)]
    pub item_order: Vec<String>,
}

impl Record for List {
    const KIND: &'static str = "list";
    const COLLECTION: Collection = Collection::Lists;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListItem {
    #[serde(skip)]
    pub id: String,
    pub list_id: String,
    #[serde(rename = "userId")]
    pub owner: String,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

impl Record for ListItem {
    const KIND: &'static str = "list item";
    const COLLECTION: Collection = Collection::ListItems;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

/// Avatars offered on the settings page.
pub const AVATARS: [&str; 6] = ["fox", "owl", "cat", "panda", "koala", "otter"];

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDetails {
    #[serde(skip)]
    pub uid: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub avatar: usize,
    pub created_at: DateTime<Utc>,
}

impl UserDetails {
    pub fn avatar_name(&self) -> &'static str {
        AVATARS[self.avatar % AVATARS.len()]
    }
}

impl Record for UserDetails {
    const KIND: &'static str = "user details";
    const COLLECTION: Collection = Collection::UserDetails;

    fn id(&self) -> &str {
        &self.uid
    }

    fn set_id(&mut self, id: String) {
        self.uid = id;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_task_reads_sparse_document() {
        let doc = StoredDocument {
            id: "t1".to_string(),
            fields: json!({
                "userId": "u1",
                "title": "Stretch",
                "createdAt": "2026-10-01T08:00:00Z"
            })
            .as_object()
            .cloned()
            .unwrap(),
        };
        let task = Task::from_document(doc).unwrap();
        assert_eq!(task.id, "t1");
        assert_eq!(task.owner, "u1");
        assert!(!task.completed);
        assert!(!task.archived);
        assert_eq!(task.date, None);
    }

    #[test]
    fn test_id_is_not_stored_in_fields() {
        let item = ListItem {
            id: "i1".to_string(),
            list_id: "l1".to_string(),
            owner: "u1".to_string(),
            text: "Milk".to_string(),
            completed: false,
            created_at: Utc::now(),
        };
        let fields = item.to_fields().unwrap();
        assert!(!fields.contains_key("id"));
        assert_eq!(fields.get(LIST_FIELD), Some(&json!("l1")));
        assert_eq!(fields.get(OWNER_FIELD), Some(&json!("u1")));
    }

    #[test]
    fn test_avatar_index_wraps() {
        let details = UserDetails {
            uid: "u1".to_string(),
            name: String::new(),
            avatar: AVATARS.len() + 1,
            created_at: Utc::now(),
        };
        assert_eq!(details.avatar_name(), AVATARS[1]);
    }
}
