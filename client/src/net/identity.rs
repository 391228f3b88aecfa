//! The external identity/data service, as seen by the auth core.
//!
//! SYSTEM CONTEXT
//! ==============
//! Credential verification, token issuance and row storage live in a hosted
//! backend. This trait is the whole surface the gateway needs from it;
//! `SupabaseClient` talks to the real service and tests script a fake.

use serde_json::Value;

use super::auth_events::AuthSubscription;
use super::error::ServiceError;
use super::types::{AuthOutcome, Credentials, LoginGrant, Profile, Session, TenantGrant, TenantRegistration, User};

/// Capabilities of the hosted identity service and its client-side session.
///
/// Futures are not required to be `Send`: the browser runtime is single
/// threaded and every implementation is driven from one task queue.
#[allow(async_fn_in_trait)]
pub trait IdentityService {
    /// Exchange credentials for a token pair via the custom `login` procedure.
    async fn login_rpc(&self, credentials: &Credentials) -> Result<LoginGrant, ServiceError>;

    /// Create a tenant and its administrator via `register_tenant`.
    async fn register_tenant_rpc(&self, registration: &TenantRegistration) -> Result<TenantGrant, ServiceError>;

    /// Install a token pair as the client's active session.
    async fn set_session(&self, access_token: &str, refresh_token: &str) -> Result<Session, ServiceError>;

    /// Create a new identity with `metadata` as its user metadata.
    async fn sign_up(&self, email: &str, password: &str, metadata: Value) -> Result<AuthOutcome, ServiceError>;

    /// Revoke the active session.
    async fn sign_out(&self) -> Result<(), ServiceError>;

    /// Ask the service to send a password-reset message.
    async fn reset_password_for_email(&self, email: &str, redirect_to: Option<&str>) -> Result<(), ServiceError>;

    /// Change the current identity's password.
    async fn update_password(&self, new_password: &str) -> Result<User, ServiceError>;

    /// Identity behind the active session, validated by the service.
    async fn get_user(&self) -> Result<Option<User>, ServiceError>;

    /// The active session held by the client, refreshed if near expiry.
    async fn get_session(&self) -> Result<Option<Session>, ServiceError>;

    /// Single `user_profiles` row by id; `NotFound` when absent.
    async fn fetch_profile(&self, user_id: &str) -> Result<Profile, ServiceError>;

    /// Register for session-change notifications.
    fn subscribe(&self) -> AuthSubscription;
}
