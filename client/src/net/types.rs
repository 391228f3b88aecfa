//! Wire DTOs for the identity/data service boundary.
//!
//! DESIGN
//! ======
//! These types mirror the hosted service's JSON payloads. `User` keeps every
//! attribute it does not model explicitly so a persisted snapshot round-trips
//! without loss.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Identity record as returned by the service. Opaque beyond `id`/`email`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: Map<String, Value>,
    /// Remaining service-defined attributes (`role`, `created_at`, ...).
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl User {
    /// Display name stored in signup metadata, if any.
    pub fn metadata_full_name(&self) -> Option<&str> {
        self.user_metadata.get("full_name").and_then(Value::as_str)
    }
}

/// Active token pair plus the identity it belongs to.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    /// Lifetime in seconds from issue.
    #[serde(default)]
    pub expires_in: Option<i64>,
    /// Absolute expiry in unix seconds.
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub user: User,
}

impl Session {
    /// Fill `expires_at` from `expires_in` when the service only sent a lifetime.
    #[must_use]
    pub fn with_expiry_from(mut self, now_secs: i64) -> Self {
        if self.expires_at.is_none() {
            self.expires_at = self.expires_in.map(|ttl| now_secs + ttl);
        }
        self
    }

    /// Whether the token expires within `margin_secs` of `now_secs`.
    /// Sessions without a known expiry never need refreshing.
    pub fn expires_within(&self, now_secs: i64, margin_secs: i64) -> bool {
        self.expires_at.is_some_and(|at| at - now_secs <= margin_secs)
    }
}

/// One row of `user_profiles`, keyed by the user id.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub role_id: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub preferences: Value,
    #[serde(default)]
    pub is_active: bool,
}

/// One row of `roles`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Role {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Either `["perm", ...]` or `{"perm": true, ...}`.
    #[serde(default)]
    pub permissions: Value,
}

impl Role {
    /// Whether `permission` is granted by this role's permission document.
    pub fn grants(&self, permission: &str) -> bool {
        match &self.permissions {
            Value::Array(items) => items.iter().any(|p| p.as_str() == Some(permission)),
            Value::Object(map) => map.get(permission).is_some_and(is_truthy),
            _ => false,
        }
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Null => false,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Session-change notification kinds pushed by the identity client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthChangeEvent {
    SignedIn,
    SignedOut,
    TokenRefreshed,
    UserUpdated,
    PasswordRecovery,
}

impl AuthChangeEvent {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SignedIn => "SIGNED_IN",
            Self::SignedOut => "SIGNED_OUT",
            Self::TokenRefreshed => "TOKEN_REFRESHED",
            Self::UserUpdated => "USER_UPDATED",
            Self::PasswordRecovery => "PASSWORD_RECOVERY",
        }
    }
}

/// `(event_name, session_or_absent)` pair delivered to subscribers.
#[derive(Clone, Debug, PartialEq)]
pub struct AuthEvent {
    pub event: AuthChangeEvent,
    pub session: Option<Session>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Self-service signup; `full_name` lands in the identity's metadata.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub full_name: String,
}

/// Result of login/registration. Registration may yield no session when the
/// service requires email confirmation first.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AuthOutcome {
    pub user: Option<User>,
    pub session: Option<Session>,
}

/// Payload returned by the custom `login` procedure.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct LoginGrant {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub user: User,
}

/// Arguments of the `register_tenant` procedure: company plus administrator.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TenantRegistration {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub company_name: String,
    pub company_cuit: String,
    pub company_fiscal_address: String,
    pub company_real_address: String,
    pub company_phone: String,
    pub company_responsable: String,
    pub company_vat_condition: String,
    pub company_employee_count: u32,
}

/// Payload returned by the `register_tenant` procedure.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct TenantGrant {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub tenant_id: Option<String>,
}

/// A registered tenant with its administrator's installed session.
#[derive(Clone, Debug, PartialEq)]
pub struct TenantRegistered {
    pub tenant_id: Option<String>,
    pub user_id: String,
    pub session: Session,
}
