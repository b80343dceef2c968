use serde::{Deserialize, Serialize};

use crate::users::repo_types::User;

/// Request body for creating a user. Fields are optional so that missing
/// keys surface as a validation failure rather than a deserialization one.
#[derive(Debug, Default, Deserialize)]
pub struct CreateUserRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Fail,
}

/// `{status, message}` envelope.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub status: Status,
    pub message: String,
}

impl MessageResponse {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: Status::Success,
            message: message.into(),
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            status: Status::Fail,
            message: message.into(),
        }
    }
}

/// `{status, data}` envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T> {
    pub status: Status,
    pub data: T,
}

impl<T> DataResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            status: Status::Success,
            data,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserList {
    pub users: Vec<User>,
}
