//! # User Registry Records
//!
//! Registered users and their roles. Passwords and sessions live outside the
//! engine; a `User` only carries what the workflow needs to build an `Actor`.

use crate::primitives::{MAX_NAME_LENGTH, MAX_USERNAME_LENGTH};
use crate::types::{Actor, Role, SsbjError, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fields supplied when registering a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub username: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub department: String,
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub department: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Validate `fields` and build the record.
    ///
    /// Usernames are ASCII letters, digits, `.`, `_` and `-`. An empty full
    /// name falls back to the username.
    pub fn register(id: UserId, fields: &NewUser, now: DateTime<Utc>) -> Result<Self, SsbjError> {
        let username = validate_username(&fields.username)?;
        let full_name = match fields.full_name.trim() {
            "" => username.clone(),
            name => bounded("full name", name)?,
        };
        Ok(Self {
            id,
            username,
            full_name,
            email: bounded("email", fields.email.trim())?,
            department: bounded("department", fields.department.trim())?,
            role: fields.role,
            created_at: now,
        })
    }

    #[must_use]
    pub fn actor(&self) -> Actor {
        Actor::new(self.id, self.role)
    }
}

fn validate_username(raw: &str) -> Result<String, SsbjError> {
    let username = raw.trim();
    if username.is_empty() {
        return Err(SsbjError::InvalidInput("username is required".to_string()));
    }
    if username.len() > MAX_USERNAME_LENGTH {
        return Err(SsbjError::InvalidInput(format!(
            "username length {} exceeds maximum {} bytes",
            username.len(),
            MAX_USERNAME_LENGTH
        )));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
    {
        return Err(SsbjError::InvalidInput(format!(
            "username '{}' contains invalid characters",
            username
        )));
    }
    Ok(username.to_string())
}

fn bounded(field: &str, value: &str) -> Result<String, SsbjError> {
    if value.len() > MAX_NAME_LENGTH {
        return Err(SsbjError::InvalidInput(format!(
            "{} length {} exceeds maximum {} bytes",
            field,
            value.len(),
            MAX_NAME_LENGTH
        )));
    }
    Ok(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fields(username: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            full_name: String::new(),
            email: "sato@example.jp".to_string(),
            department: "Sustainability".to_string(),
            role: Role::Assessor,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 8, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    #[test]
    fn full_name_defaults_to_username() {
        let user = User::register(UserId(4), &fields("  k.sato "), now()).expect("register");
        assert_eq!(user.username, "k.sato");
        assert_eq!(user.full_name, "k.sato");
        assert_eq!(user.actor(), Actor::new(UserId(4), Role::Assessor));
    }

    #[test]
    fn rejects_bad_usernames() {
        for name in ["", "   ", "has space", "semi;colon"] {
            assert!(matches!(
                User::register(UserId(1), &fields(name), now()),
                Err(SsbjError::InvalidInput(_))
            ));
        }
        let long = "a".repeat(MAX_USERNAME_LENGTH + 1);
        assert!(User::register(UserId(1), &fields(&long), now()).is_err());
    }
}
