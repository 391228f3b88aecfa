//! Auth orchestrator: wires the gateway to the session store.
//!
//! SYSTEM CONTEXT
//! ==============
//! One instance is built by the root component and shared through context.
//! `run` is spawned once per application lifetime; pages call the action
//! wrappers (`login`, `logout`, ...) and read results from the store.
//!
//! ARCHITECTURE
//! ============
//! `run` latches before doing any async work, subscribes to push events,
//! reconciles the store with the client's ambient session, then applies
//! events until `shutdown` releases the subscription. Events that arrive
//! while the boot reads are in flight stay queued on the subscription and
//! are applied afterwards, so the newest service state wins.
//!
//! ERROR HANDLING
//! ==============
//! Boot and push paths never fail: the gateway collapses read errors into
//! "absent". Action wrappers propagate `AuthError` after `loading` has been
//! restored by the store's drop guard.

#[cfg(test)]
#[path = "orchestrator_test.rs"]
mod orchestrator_test;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use leptos::logging::log;

use super::auth::AuthStore;
use crate::net::auth_events::SubscriptionHandle;
use crate::net::auth_gateway::AuthGateway;
use crate::net::error::AuthError;
use crate::net::identity::IdentityService;
use crate::net::types::{AuthEvent, AuthOutcome, Registration, Session, TenantRegistered, TenantRegistration, User};

struct Inner<S> {
    gateway: AuthGateway<S>,
    store: AuthStore,
    started: Cell<bool>,
    subscription: RefCell<Option<SubscriptionHandle>>,
}

/// Shared coordinator; clones refer to the same instance and latch.
pub struct AuthOrchestrator<S> {
    inner: Rc<Inner<S>>,
}

impl<S> Clone for AuthOrchestrator<S> {
    fn clone(&self) -> Self {
        Self { inner: Rc::clone(&self.inner) }
    }
}

impl<S: IdentityService> AuthOrchestrator<S> {
    pub fn new(gateway: AuthGateway<S>, store: AuthStore) -> Self {
        Self {
            inner: Rc::new(Inner {
                gateway,
                store,
                started: Cell::new(false),
                subscription: RefCell::new(None),
            }),
        }
    }

    pub fn store(&self) -> &AuthStore {
        &self.inner.store
    }

    pub fn gateway(&self) -> &AuthGateway<S> {
        &self.inner.gateway
    }

    /// Boot, then keep the store in sync with pushed session changes until
    /// `shutdown`. Only the first call on an instance does anything.
    pub async fn run(&self) {
        if self.inner.started.replace(true) {
            return;
        }
        let mut subscription = self.inner.gateway.on_auth_state_change();
        *self.inner.subscription.borrow_mut() = Some(subscription.handle());

        self.bootstrap().await;

        while let Some(event) = subscription.next().await {
            self.apply_event(event).await;
        }
    }

    /// Release the push subscription. Safe to call repeatedly.
    pub fn shutdown(&self) {
        if let Some(handle) = self.inner.subscription.borrow_mut().take() {
            handle.unsubscribe();
        }
    }

    /// Reconcile the store with the client's current session.
    async fn bootstrap(&self) {
        let store = &self.inner.store;
        let _loading = store.loading_scope();

        let session = self.inner.gateway.current_session().await;
        let user = self.inner.gateway.current_user().await;

        match (session, user) {
            (Some(session), Some(user)) => {
                let user_id = user.id.clone();
                store.set_user(Some(user));
                store.set_session(Some(session));
                let profile = self.inner.gateway.user_profile(&user_id).await;
                store.set_profile(profile);
            }
            _ => {
                store.set_user(None);
                store.set_session(None);
                store.set_profile(None);
            }
        }
    }

    /// Overwrite session and user from a pushed event, then refresh profile.
    pub async fn apply_event(&self, event: AuthEvent) {
        log!("auth event: {}", event.event.as_str());
        let store = &self.inner.store;
        let user = event.session.as_ref().map(|s| s.user.clone());
        store.set_session(event.session);
        store.set_user(user.clone());
        match user {
            Some(user) => {
                let profile = self.inner.gateway.user_profile(&user.id).await;
                store.set_profile(profile);
            }
            None => store.set_profile(None),
        }
    }

    /// # Errors
    ///
    /// Propagates the gateway's `AuthError`; the store is untouched on failure.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthOutcome, AuthError> {
        let _loading = self.inner.store.loading_scope();
        let outcome = self.inner.gateway.login(email, password).await?;
        self.install(outcome.user.clone(), outcome.session.clone()).await;
        Ok(outcome)
    }

    /// # Errors
    ///
    /// Propagates the gateway's `AuthError`; the store is untouched on failure.
    pub async fn register(&self, registration: &Registration) -> Result<AuthOutcome, AuthError> {
        let _loading = self.inner.store.loading_scope();
        let outcome = self.inner.gateway.register(registration).await?;
        self.install(outcome.user.clone(), outcome.session.clone()).await;
        Ok(outcome)
    }

    /// # Errors
    ///
    /// Propagates the gateway's `AuthError`; the store is untouched on failure.
    pub async fn register_tenant(&self, registration: &TenantRegistration) -> Result<TenantRegistered, AuthError> {
        let _loading = self.inner.store.loading_scope();
        let registered = self.inner.gateway.register_tenant(registration).await?;
        let session: Session = registered.session.clone();
        self.install(Some(session.user.clone()), Some(session)).await;
        Ok(registered)
    }

    /// Revoke at the service, then clear local identity.
    ///
    /// # Errors
    ///
    /// Propagates the gateway's `AuthError`; local state is kept on failure.
    pub async fn logout(&self) -> Result<(), AuthError> {
        let _loading = self.inner.store.loading_scope();
        self.inner.gateway.logout().await?;
        self.inner.store.logout();
        Ok(())
    }

    /// # Errors
    ///
    /// Propagates the gateway's `AuthError`.
    pub async fn reset_password(&self, email: &str) -> Result<(), AuthError> {
        let _loading = self.inner.store.loading_scope();
        self.inner.gateway.reset_password(email).await
    }

    /// # Errors
    ///
    /// Propagates the gateway's `AuthError`.
    pub async fn update_password(&self, new_password: &str) -> Result<User, AuthError> {
        let _loading = self.inner.store.loading_scope();
        self.inner.gateway.update_password(new_password).await
    }

    async fn install(&self, user: Option<User>, session: Option<Session>) {
        let store = &self.inner.store;
        let user_id = user.as_ref().map(|u| u.id.clone());
        store.set_user(user);
        store.set_session(session);
        if let Some(user_id) = user_id {
            let profile = self.inner.gateway.user_profile(&user_id).await;
            store.set_profile(profile);
        }
    }
}
