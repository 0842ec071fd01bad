use std::net::IpAddr;

use chrono::{DateTime, Utc};
use folio_models::contact::{ContactMessage, ContactMessageDraft, ContactMessageId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Body of a contact form submission. Only JSON objects are accepted.
///
/// Missing and `null` fields are both `None`. Numbers and booleans are
/// accepted in place of strings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct ApiContactMessageDraft {
    pub name: Option<String>,
    pub email: Option<String>,
    pub subject: Option<String>,
    pub message: Option<String>,
}

impl TryFrom<Map<String, Value>> for ApiContactMessageDraft {
    type Error = InvalidTextField;

    fn try_from(mut fields: Map<String, Value>) -> Result<Self, Self::Error> {
        let mut field = |name: &'static str| text_field(name, fields.remove(name));
        Ok(Self {
            name: field("name")?,
            email: field("email")?,
            subject: field("subject")?,
            message: field("message")?,
        })
    }
}

fn text_field(
    name: &'static str,
    value: Option<Value>,
) -> Result<Option<String>, InvalidTextField> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => Ok(Some(text)),
        Some(Value::Number(number)) => Ok(Some(number.to_string())),
        Some(Value::Bool(value)) => Ok(Some(value.to_string())),
        Some(Value::Array(_) | Value::Object(_)) => Err(InvalidTextField(name)),
    }
}

#[derive(Debug, Error)]
#[error("{0} must be a string")]
pub struct InvalidTextField(&'static str);

impl From<ApiContactMessageDraft> for ContactMessageDraft {
    fn from(value: ApiContactMessageDraft) -> Self {
        Self {
            name: value.name,
            email: value.email,
            subject: value.subject,
            message: value.message,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiContactMessage {
    pub id: ContactMessageId,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub read: bool,
    pub ip: Option<IpAddr>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ContactMessage> for ApiContactMessage {
    fn from(value: ContactMessage) -> Self {
        Self {
            id: value.id,
            name: value.author.name.into_inner(),
            email: value.author.email.into_inner(),
            subject: value.subject.into_inner(),
            message: value.content.into_inner(),
            read: value.read,
            ip: value.ip,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

/// Returned after a successful submission.
#[derive(Debug, Clone, Serialize)]
pub struct ApiContactMessageReceipt {
    pub id: ContactMessageId,
    pub name: String,
}

impl From<ContactMessage> for ApiContactMessageReceipt {
    fn from(value: ContactMessage) -> Self {
        Self {
            id: value.id,
            name: value.author.name.into_inner(),
        }
    }
}
