use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

use super::EmpId;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr, ToSchema,
)]
pub enum Role {
    Admin,
    Faculty,
}

/// A login account. Usernames are stored lower-cased.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAccount {
    pub username: String,
    /// Argon2 PHC string.
    pub password_hash: String,
    pub role: Role,
    pub emp_id: Option<EmpId>,
}

/// Registration waiting for an administrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingUser {
    pub username: String,
    pub password_hash: String,
    pub emp_id: EmpId,
    pub requested_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[schema(example = "asha")]
    pub username: String,
    pub password: String,
    pub confirm_password: String,
    #[schema(example = 1)]
    pub emp_id: EmpId,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Account view without the password hash.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub username: String,
    pub role: Role,
    pub emp_id: Option<EmpId>,
}

impl From<&UserAccount> for UserProfile {
    fn from(account: &UserAccount) -> Self {
        UserProfile {
            username: account.username.clone(),
            role: account.role,
            emp_id: account.emp_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PendingUserView {
    pub username: String,
    pub emp_id: EmpId,
    #[schema(format = "date-time", value_type = String)]
    pub requested_at: DateTime<Utc>,
}

impl From<&PendingUser> for PendingUserView {
    fn from(pending: &PendingUser) -> Self {
        PendingUserView {
            username: pending.username.clone(),
            emp_id: pending.emp_id,
            requested_at: pending.requested_at,
        }
    }
}

/// Outcome of a registration.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum Registration {
    Created { profile: UserProfile },
    Requested { username: String },
}
