use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::users::repo::User;

/// Request body for user creation.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
    pub cellphone: String,
}

/// Partial update; absent fields keep their stored values.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub password: Option<String>,
    pub cellphone: Option<String>,
}

/// One entry of a bulk-create batch.
#[derive(Debug, Deserialize)]
pub struct BulkUserEntry {
    pub name: String,
    pub email: String,
    pub password: String,
    pub cellphone: String,
}

/// Search parameters accepted by the findUsers endpoint. Dates are RFC 3339.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FindUsersQuery {
    pub status: Option<String>,
    pub name: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub created_before: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub created_after: Option<OffsetDateTime>,
}

/// Uniform `{code, message}` envelope every service operation produces.
/// Only the message is written to the response body; the code becomes the
/// HTTP status.
#[derive(Debug, Serialize)]
pub struct Reply {
    pub code: u16,
    pub message: ReplyMessage,
}

/// Payload side of the envelope: a human-readable string or user data.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ReplyMessage {
    Text(String),
    User(Option<User>),
    Users(Vec<User>),
}

impl Reply {
    pub fn text(code: u16, message: impl Into<String>) -> Self {
        Self {
            code,
            message: ReplyMessage::Text(message.into()),
        }
    }

    pub fn user(user: Option<User>) -> Self {
        Self {
            code: 200,
            message: ReplyMessage::User(user),
        }
    }

    pub fn users(users: Vec<User>) -> Self {
        Self {
            code: 200,
            message: ReplyMessage::Users(users),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reply_message_serializes_untagged() {
        let text = serde_json::to_value(ReplyMessage::Text("User deleted successfully".into()))
            .expect("serialize text");
        assert_eq!(text, serde_json::json!("User deleted successfully"));

        let missing = serde_json::to_value(ReplyMessage::User(None)).expect("serialize null");
        assert_eq!(missing, serde_json::Value::Null);

        let empty = serde_json::to_value(ReplyMessage::Users(Vec::new())).expect("serialize list");
        assert_eq!(empty, serde_json::json!([]));
    }

    #[test]
    fn find_query_accepts_camel_case_dates() {
        let query: FindUsersQuery = serde_json::from_value(serde_json::json!({
            "status": "true",
            "createdAfter": "2024-06-01T00:00:00Z"
        }))
        .expect("deserialize query");
        assert_eq!(query.status.as_deref(), Some("true"));
        assert!(query.created_before.is_none());
        assert!(query.created_after.is_some());
    }
}
