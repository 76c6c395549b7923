#![allow(dead_code)]

use scgapi::{AuthInfo, DataObject, ObjectBinding, Timestamp};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

/// Contact-shaped entity with server-managed fields
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Contact {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub external_id: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub primary_mdn: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_date: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_update_date: Option<Timestamp>,
    #[serde(skip)]
    pub binding: ObjectBinding,
}

impl DataObject for Contact {
    fn resource_path() -> &'static str {
        "scg-external-api/api/v1/contacts"
    }

    fn read_only_fields() -> &'static [&'static str] {
        &["id", "created_date", "last_update_date"]
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn binding(&self) -> &ObjectBinding {
        &self.binding
    }

    fn binding_mut(&mut self) -> &mut ObjectBinding {
        &mut self.binding
    }
}

/// Keyword-shaped entity whose `case_value` field is named `case` on the
/// wire
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Keyword {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub case_value: String,
    #[serde(skip)]
    pub binding: ObjectBinding,
}

impl DataObject for Keyword {
    fn resource_path() -> &'static str {
        "scg-external-api/api/v1/keywords"
    }

    fn read_only_fields() -> &'static [&'static str] {
        &["id"]
    }

    fn field_mapping() -> &'static [(&'static str, &'static str)] {
        &[("case_value", "case")]
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn binding(&self) -> &ObjectBinding {
        &self.binding
    }

    fn binding_mut(&mut self) -> &mut ObjectBinding {
        &mut self.binding
    }
}

/// Attachment-shaped entity used by the file transfer tests
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Attachment {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub file_name: String,
    #[serde(default)]
    pub state: String,
    #[serde(skip)]
    pub binding: ObjectBinding,
}

impl DataObject for Attachment {
    fn resource_path() -> &'static str {
        "scg-external-api/api/v1/messaging/attachments"
    }

    fn read_only_fields() -> &'static [&'static str] {
        &["id", "state"]
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn binding(&self) -> &ObjectBinding {
        &self.binding
    }

    fn binding_mut(&mut self) -> &mut ObjectBinding {
        &mut self.binding
    }
}

/// Credentials with the standard test consumer key/secret
pub fn auth_with_token(token: &str) -> Arc<AuthInfo> {
    Arc::new(AuthInfo::new("ckey", "csecret", token))
}

/// Page envelope holding contacts CT-a .. CT-(b-1)
pub fn contact_page(ids: std::ops::Range<i64>, total: i64) -> serde_json::Value {
    let list: Vec<serde_json::Value> = ids
        .map(|n| {
            json!({
                "id": format!("CT-{}", n),
                "first_name": format!("First{}", n),
                "last_name": "Lovelace",
                "primary_mdn": format!("15550000{:03}", n),
                "created_date": 1597242491747i64,
            })
        })
        .collect();
    let limit = list.len();

    json!({ "list": list, "limit": limit, "total": total })
}
