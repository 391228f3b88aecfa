//! Session store: the single source of truth for who is signed in.
//!
//! SYSTEM CONTEXT
//! ==============
//! Route guards, the header and the access gate read `AuthState` through the
//! `RwSignal` exposed by `AuthStore::state`; only the orchestrator writes it.
//!
//! DESIGN
//! ======
//! `user`, `session` and `profile` are persisted to durable storage after
//! every write. `authenticated` and `loading` are never trusted from storage:
//! rehydration recomputes the former from the restored user and forces the
//! latter off so a crashed mid-login tab cannot boot into a spinner. A
//! restored profile is dropped unless it belongs to the restored user.
//!
//! `loading` is counted: overlapping scopes (boot plus a login, say) keep it
//! on until the last one ends.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use std::cell::Cell;
use std::rc::Rc;

use leptos::prelude::*;
use serde::{Deserialize, Serialize};

use crate::net::types::{Profile, Session, User};
use crate::util::storage::{KeyValueStorage, load_json, save_json};

/// Storage key of the persisted snapshot.
pub const AUTH_STORAGE_KEY: &str = "auth-storage";
const AUTH_STORAGE_VERSION: u32 = 0;

/// Authentication state for the current browser user.
///
/// Invariant: `authenticated == user.is_some()`. A present `profile` belongs
/// to the present `user`, though it may lag behind it while being fetched.
#[derive(Clone, Debug, PartialEq)]
pub struct AuthState {
    pub user: Option<User>,
    pub session: Option<Session>,
    pub profile: Option<Profile>,
    pub loading: bool,
    pub authenticated: bool,
}

impl Default for AuthState {
    fn default() -> Self {
        Self { user: None, session: None, profile: None, loading: true, authenticated: false }
    }
}

impl AuthState {
    pub fn user_id(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.id.as_str())
    }

    /// Name to show for the signed-in user: profile name, then email.
    pub fn display_name(&self) -> Option<&str> {
        self.profile
            .as_ref()
            .and_then(|p| p.full_name.as_deref())
            .filter(|n| !n.is_empty())
            .or_else(|| self.user.as_ref().and_then(|u| u.email.as_deref()))
    }
}

/// Persisted subset of `AuthState`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthSnapshot {
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub session: Option<Session>,
    #[serde(default)]
    pub profile: Option<Profile>,
}

#[derive(Debug, Serialize, Deserialize)]
struct PersistedAuth {
    state: AuthSnapshot,
    #[serde(default)]
    version: u32,
}

/// Reactive, persisted holder of `AuthState`.
///
/// Cheap to clone; clones share the same signal and storage. Build one per
/// application (or per test) and pass it down explicitly.
#[derive(Clone)]
pub struct AuthStore {
    state: RwSignal<AuthState>,
    storage: Rc<dyn KeyValueStorage>,
    in_flight: Rc<Cell<usize>>,
}

impl AuthStore {
    /// Fresh store in its boot state (`loading == true`), nothing read yet.
    pub fn new(storage: Rc<dyn KeyValueStorage>) -> Self {
        Self { state: RwSignal::new(AuthState::default()), storage, in_flight: Rc::new(Cell::new(0)) }
    }

    /// Restore the persisted snapshot and recompute derived flags.
    ///
    /// Always leaves `loading == false` and
    /// `authenticated == user.is_some()`, whatever was stored. A profile
    /// without a matching user is discarded.
    pub fn rehydrate(&self) {
        let snapshot = load_json::<PersistedAuth>(self.storage.as_ref(), AUTH_STORAGE_KEY)
            .map(|p| p.state)
            .unwrap_or_default();
        let profile = snapshot
            .profile
            .filter(|p| snapshot.user.as_ref().is_some_and(|u| u.id == p.id));
        self.state.update(|s| {
            s.authenticated = snapshot.user.is_some();
            s.user = snapshot.user;
            s.session = snapshot.session;
            s.profile = profile;
            s.loading = false;
        });
    }

    /// Read handle for reactive consumers.
    pub fn state(&self) -> RwSignal<AuthState> {
        self.state
    }

    /// Current state without subscribing.
    pub fn snapshot(&self) -> AuthState {
        self.state.get_untracked()
    }

    pub fn set_user(&self, user: Option<User>) {
        self.write(|s| {
            s.authenticated = user.is_some();
            s.user = user;
        });
    }

    pub fn set_session(&self, session: Option<Session>) {
        self.write(|s| s.session = session);
    }

    pub fn set_profile(&self, profile: Option<Profile>) {
        self.write(|s| s.profile = profile);
    }

    pub fn set_loading(&self, loading: bool) {
        self.write(|s| s.loading = loading);
    }

    /// Clear identity in one write. `loading` is left to the caller.
    pub fn logout(&self) {
        self.write(|s| {
            s.user = None;
            s.session = None;
            s.profile = None;
            s.authenticated = false;
        });
    }

    /// Set `loading` until the returned guard, and every other guard still
    /// alive, has been dropped.
    pub fn loading_scope(&self) -> LoadingGuard {
        self.in_flight.set(self.in_flight.get() + 1);
        self.set_loading(true);
        LoadingGuard { store: self.clone() }
    }

    fn write(&self, f: impl FnOnce(&mut AuthState)) {
        self.state.update(f);
        self.persist();
    }

    fn persist(&self) {
        let record = self.state.with_untracked(|s| PersistedAuth {
            state: AuthSnapshot { user: s.user.clone(), session: s.session.clone(), profile: s.profile.clone() },
            version: AUTH_STORAGE_VERSION,
        });
        save_json(self.storage.as_ref(), AUTH_STORAGE_KEY, &record);
    }
}

/// Resets `loading` to false when the last live guard is dropped, including
/// on early return, panic, or when the owning future is dropped mid-flight.
pub struct LoadingGuard {
    store: AuthStore,
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        let remaining = self.store.in_flight.get().saturating_sub(1);
        self.store.in_flight.set(remaining);
        if remaining == 0 {
            self.store.set_loading(false);
        }
    }
}
