use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Privilege level attached to a user.
///
/// The set is closed: a role read from storage or from a token that is not
/// one of these variants fails to parse instead of producing a new level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Admin => "ADMIN",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "USER" => Ok(Role::User),
            "ADMIN" => Ok(Role::Admin),
            other => Err(DomainError::Validation(format!("unknown role: {other}"))),
        }
    }
}

/// User entity - a registered developer.
///
/// `hashed_password` is `None` for accounts created through an external
/// identity provider; those accounts can never pass a credential check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub image: Option<String>,
    pub bio: Option<String>,
    #[serde(skip_serializing, default)]
    pub hashed_password: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    fn build(
        email: String,
        name: Option<String>,
        image: Option<String>,
        hashed_password: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email,
            name,
            image,
            bio: None,
            hashed_password,
            role: Role::User,
            created_at: now,
            updated_at: now,
        }
    }

    /// Create a credential-backed user at registration.
    pub fn with_password(email: String, name: Option<String>, hashed_password: String) -> Self {
        Self::build(email, name, None, Some(hashed_password))
    }

    /// Create a user on first sign-in through an external identity provider.
    pub fn from_external(email: String, name: Option<String>, image: Option<String>) -> Self {
        Self::build(email, name, image, None)
    }

    pub fn has_password(&self) -> bool {
        self.hashed_password.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parses_only_known_values() {
        assert_eq!("USER".parse::<Role>().unwrap(), Role::User);
        assert_eq!("ADMIN".parse::<Role>().unwrap(), Role::Admin);
        assert!("admin".parse::<Role>().is_err());
        assert!("SUPERUSER".parse::<Role>().is_err());
    }

    #[test]
    fn role_serializes_screaming_case() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"ADMIN\"");
        assert!(serde_json::from_str::<Role>("\"OWNER\"").is_err());
    }

    #[test]
    fn external_user_has_no_password() {
        let user = User::from_external("a@b.dev".into(), Some("A".into()), None);
        assert!(!user.has_password());
        assert_eq!(user.role, Role::User);
    }

    #[test]
    fn hashed_password_is_never_serialized() {
        let user = User::with_password("a@b.dev".into(), None, "$argon2id$secret".into());
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2id"));
    }
}
