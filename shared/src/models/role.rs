//! Role Model

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use super::RecordId;

/// Access level attached to a signed-in identity.
///
/// Unauthenticated sessions have no role at all (`Option<Role>::None`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum Role {
    #[serde(rename = "admin")]
    Admin,
    /// Counter staff; the least-privileged signed-in role
    #[default]
    #[serde(rename = "visitante")]
    Attendant,
}

impl Role {
    /// Resolve a stored role name; anything unrecognized is least-privileged
    pub fn parse_lenient(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "admin" => Role::Admin,
            "atendente" | "visitante" => Role::Attendant,
            other => {
                tracing::warn!(role = %other, "Unknown role, using least-privileged");
                Role::Attendant
            }
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Attendant => "visitante",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.map(|r| Role::parse_lenient(&r)).unwrap_or_default())
    }
}

/// Side profile stored per identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct UserProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Role,
}

impl UserProfile {
    /// Profile written for self-registered accounts
    pub fn new_attendant(email: Option<String>) -> Self {
        Self {
            email,
            role: Role::Attendant,
        }
    }
}

/// User account as listed by the admin endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    #[serde(alias = "_id", alias = "uid")]
    pub id: RecordId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(rename = "nome", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Role,
}

/// Provision user payload (POST /users)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserCreate {
    /// Identity id when the account already exists at the identity provider
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(rename = "nome", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub role: Role,
}

/// Update role payload (PUT /users/{id}/role)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleUpdate {
    pub role: Role,
}

/// Update password payload (PUT /users/{id}/password)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordUpdate {
    pub password: String,
}
