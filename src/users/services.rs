use crate::users::{
    dto::CreateUserRequest,
    repo::StoreError,
    repo_types::NewUser,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("missing or empty field: {0}")]
    MissingField(&'static str),
}

fn required(value: Option<String>, field: &'static str) -> Result<String, ValidationError> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ValidationError::MissingField(field)),
    }
}

impl CreateUserRequest {
    /// Check required fields and produce the insertable form. Both fields are
    /// stored trimmed, so responses echo the trimmed email.
    pub fn validate(self) -> Result<NewUser, ValidationError> {
        let username = required(self.username, "username")?;
        let email = required(self.email, "email")?;
        Ok(NewUser { username, email })
    }
}

/// Parse a path segment as a user id. Anything non-numeric cannot match a
/// user, so it is reported as not found.
pub fn parse_user_id(raw: &str) -> Result<i64, StoreError> {
    raw.parse::<i64>().map_err(|_| StoreError::NotFound)
}
