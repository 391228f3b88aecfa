//! Auth gateway: the only code that talks to the identity service.
//!
//! ERROR HANDLING
//! ==============
//! User-initiated actions (login, register, logout, password flows) return
//! `AuthError` so the caller can surface the message. Ambient reads
//! (current user/session, profile lookup) log and return `None`: an absent
//! session or a not-yet-provisioned profile is a normal state, and these
//! reads happen on every page load.

#[cfg(test)]
#[path = "auth_gateway_test.rs"]
mod auth_gateway_test;

use leptos::logging::{error, warn};
use serde_json::json;

use super::auth_events::AuthSubscription;
use super::error::{AuthError, ServiceError};
use super::identity::IdentityService;
use super::types::{AuthOutcome, Credentials, Profile, Registration, Session, TenantRegistered, TenantRegistration, User};

/// Path appended to the app origin for password-reset links.
pub const RESET_PASSWORD_PATH: &str = "/reset-password";

pub struct AuthGateway<S> {
    service: S,
    reset_redirect: Option<String>,
}

impl<S: IdentityService> AuthGateway<S> {
    pub fn new(service: S) -> Self {
        Self { service, reset_redirect: None }
    }

    /// Password-reset links will point at `{origin}/reset-password`.
    #[must_use]
    pub fn with_reset_origin(mut self, origin: &str) -> Self {
        self.reset_redirect = Some(format!("{}{RESET_PASSWORD_PATH}", origin.trim_end_matches('/')));
        self
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Exchange credentials through the custom login procedure, then install
    /// the returned tokens as the client's active session.
    ///
    /// # Errors
    ///
    /// Returns `AuthError` if the procedure or the session install fails.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthOutcome, AuthError> {
        let credentials = Credentials { email: email.to_owned(), password: password.to_owned() };
        let grant = self.service.login_rpc(&credentials).await.map_err(|e| action_error("login", e))?;
        let session = self
            .service
            .set_session(&grant.access_token, grant.refresh_token.as_deref().unwrap_or_default())
            .await
            .map_err(|e| action_error("login", e))?;
        Ok(AuthOutcome { user: Some(grant.user), session: Some(session) })
    }

    /// Create a new identity with `full_name` stored as profile metadata.
    ///
    /// # Errors
    ///
    /// Returns `AuthError` when the service rejects the signup (e.g. duplicate email).
    pub async fn register(&self, registration: &Registration) -> Result<AuthOutcome, AuthError> {
        self.service
            .sign_up(
                &registration.email,
                &registration.password,
                json!({ "full_name": registration.full_name }),
            )
            .await
            .map_err(|e| action_error("register", e))
    }

    /// Create a tenant plus administrator and sign the administrator in.
    ///
    /// # Errors
    ///
    /// Returns `AuthError` if the procedure or the session install fails.
    pub async fn register_tenant(&self, registration: &TenantRegistration) -> Result<TenantRegistered, AuthError> {
        let grant = self
            .service
            .register_tenant_rpc(registration)
            .await
            .map_err(|e| action_error("tenant registration", e))?;
        let session = self
            .service
            .set_session(&grant.access_token, grant.refresh_token.as_deref().unwrap_or_default())
            .await
            .map_err(|e| action_error("tenant registration", e))?;
        let user_id = grant.user_id.unwrap_or_else(|| session.user.id.clone());
        Ok(TenantRegistered { tenant_id: grant.tenant_id, user_id, session })
    }

    /// Revoke the active session at the service. Local state is left alone.
    ///
    /// # Errors
    ///
    /// Returns `AuthError` if the revoke call fails.
    pub async fn logout(&self) -> Result<(), AuthError> {
        self.service.sign_out().await.map_err(|e| action_error("logout", e))
    }

    /// Request an out-of-band password-reset message.
    ///
    /// # Errors
    ///
    /// Returns `AuthError` if the service rejects the request.
    pub async fn reset_password(&self, email: &str) -> Result<(), AuthError> {
        self.service
            .reset_password_for_email(email, self.reset_redirect.as_deref())
            .await
            .map_err(|e| action_error("password reset", e))
    }

    /// Change the authenticated identity's password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError` if there is no session or the service rejects it.
    pub async fn update_password(&self, new_password: &str) -> Result<User, AuthError> {
        self.service
            .update_password(new_password)
            .await
            .map_err(|e| action_error("password update", e))
    }

    pub async fn current_user(&self) -> Option<User> {
        match self.service.get_user().await {
            Ok(user) => user,
            Err(e) => {
                warn!("failed to read current user: {e}");
                None
            }
        }
    }

    pub async fn current_session(&self) -> Option<Session> {
        match self.service.get_session().await {
            Ok(session) => session,
            Err(e) => {
                warn!("failed to read current session: {e}");
                None
            }
        }
    }

    /// Profile row for `user_id`, or `None` if missing or unreadable.
    pub async fn user_profile(&self, user_id: &str) -> Option<Profile> {
        match self.service.fetch_profile(user_id).await {
            Ok(profile) => Some(profile),
            Err(e) => {
                warn!("failed to load profile for {user_id}: {e}");
                None
            }
        }
    }

    /// Subscribe to session-change notifications.
    pub fn on_auth_state_change(&self) -> AuthSubscription {
        self.service.subscribe()
    }
}

fn action_error(action: &str, err: ServiceError) -> AuthError {
    error!("{action} error: {err}");
    AuthError::from(err)
}
