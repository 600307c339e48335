//! User listing, quota and info records.

use crate::domain::accounting::bucket::Quota;
use crate::domain::accounting::schema::{as_record, string_field, u64_field};
use crate::domain::errors::RecordError;
use serde_json::Value;
use std::collections::HashSet;

/// Users currently listed by the gateway, in listing order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveUsers {
    ordered: Vec<String>,
    index: HashSet<String>,
}

impl ActiveUsers {
    pub fn new(uids: impl IntoIterator<Item = String>) -> Self {
        let mut users = Self::default();
        for uid in uids {
            if users.index.insert(uid.clone()) {
                users.ordered.push(uid);
            }
        }
        users
    }

    /// Reads `user?list` (`{"keys": [...]}`) or `metadata/user` (`[...]`).
    /// `None` when the payload has neither shape.
    pub fn from_listing(value: &Value) -> Option<Self> {
        let keys = match value {
            Value::Object(record) => record.get("keys")?.as_array()?,
            Value::Array(keys) => keys,
            _ => return None,
        };
        Some(Self::new(
            keys.iter().filter_map(Value::as_str).map(str::to_string),
        ))
    }

    pub fn contains(&self, uid: &str) -> bool {
        self.index.contains(uid)
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ordered.iter().map(String::as_str)
    }
}

/// Storage consumed by a user, from the optional `stats` block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserStats {
    pub total_bytes: u64,
    pub total_objects: u64,
}

/// `user?uid=<uid>&stats=True`, with string fields defaulted to empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserInfo {
    pub display_name: String,
    pub email: String,
    /// Nautilus and later only
    pub storage_class: String,
    pub stats: Option<UserStats>,
}

impl UserInfo {
    pub fn from_value(value: &Value) -> Result<Self, RecordError> {
        let record = as_record(value, "user info")?;
        let text = |key: &'static str| -> Result<String, RecordError> {
            Ok(string_field(record, "user info", &[key])?.unwrap_or_default())
        };

        let stats = match record.get("stats") {
            None | Some(Value::Null) => None,
            Some(stats) => Some(user_stats(stats)?),
        };

        Ok(Self {
            display_name: text("display_name")?,
            email: text("email")?,
            storage_class: text("default_storage_class")?,
            stats,
        })
    }
}

fn user_stats(value: &Value) -> Result<UserStats, RecordError> {
    let stats = as_record(value, "user stats")?;
    let total_bytes = match u64_field(stats, "user stats", "size_actual")? {
        Some(bytes) => bytes,
        None => match u64_field(stats, "user stats", "size_kb_actual")? {
            Some(kb) => kb.saturating_mul(1024),
            None => u64_field(stats, "user stats", "size")?.unwrap_or(0),
        },
    };

    Ok(UserStats {
        total_bytes,
        total_objects: u64_field(stats, "user stats", "num_objects")?.unwrap_or(0),
    })
}

/// Everything fetched for one listed user. A failed lookup leaves its half empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub uid: String,
    pub quota: Option<Quota>,
    pub info: Option<UserInfo>,
}
