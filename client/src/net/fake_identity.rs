//! Scripted in-memory identity service for unit tests.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use futures::channel::oneshot;
use serde_json::{Value, json};

use super::auth_events::{AuthEventHub, AuthSubscription};
use super::error::ServiceError;
use super::identity::IdentityService;
use super::types::{
    AuthChangeEvent, AuthEvent, AuthOutcome, Credentials, LoginGrant, Profile, Session, TenantGrant,
    TenantRegistration, User,
};

pub fn user(id: &str) -> User {
    serde_json::from_value(json!({ "id": id, "email": format!("{id}@x.com") })).unwrap()
}

pub fn session(token: &str, user_id: &str) -> Session {
    Session {
        access_token: token.to_owned(),
        refresh_token: Some(format!("r-{token}")),
        token_type: Some("bearer".to_owned()),
        expires_in: Some(3600),
        expires_at: None,
        user: user(user_id),
    }
}

pub fn profile(user_id: &str, role_id: Option<&str>) -> Profile {
    Profile {
        id: user_id.to_owned(),
        full_name: Some(format!("User {user_id}")),
        role_id: role_id.map(str::to_owned),
        department: None,
        position: None,
        avatar_url: None,
        preferences: Value::Null,
        is_active: true,
    }
}

pub fn api_error(status: u16, message: &str) -> ServiceError {
    ServiceError::Api { status, message: message.to_owned() }
}

#[derive(Default)]
pub struct FakeState {
    pub login: RefCell<Option<Result<LoginGrant, ServiceError>>>,
    pub tenant: RefCell<Option<Result<TenantGrant, ServiceError>>>,
    pub set_session_error: RefCell<Option<ServiceError>>,
    pub sign_up: RefCell<Option<Result<AuthOutcome, ServiceError>>>,
    pub sign_out_error: RefCell<Option<ServiceError>>,
    pub reset_error: RefCell<Option<ServiceError>>,
    pub update_error: RefCell<Option<ServiceError>>,
    pub read_error: RefCell<Option<ServiceError>>,
    pub session: RefCell<Option<Session>>,
    pub user: RefCell<Option<User>>,
    pub profiles: RefCell<HashMap<String, Profile>>,
    pub get_session_calls: Cell<usize>,
    pub get_user_calls: Cell<usize>,
    pub profile_requests: RefCell<Vec<String>>,
    pub login_requests: RefCell<Vec<Credentials>>,
    pub sign_up_metadata: RefCell<Vec<Value>>,
    pub reset_requests: RefCell<Vec<(String, Option<String>)>>,
    pub installed: RefCell<Vec<(String, String)>>,
    pub sign_out_calls: Cell<usize>,
    /// Pushed from inside the next `get_session`, i.e. mid-boot.
    pub emit_during_get_session: RefCell<Option<AuthEvent>>,
    /// Calls that block until the paired sender fires (or is dropped).
    pub gates: RefCell<HashMap<&'static str, oneshot::Receiver<()>>>,
    pub hub: AuthEventHub,
}

/// Cloneable handle; clones share scripted responses and call records.
#[derive(Clone, Default)]
pub struct FakeIdentity {
    pub state: Rc<FakeState>,
}

impl FakeIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ambient(self, session: Option<Session>, user: Option<User>) -> Self {
        *self.state.session.borrow_mut() = session;
        *self.state.user.borrow_mut() = user;
        self
    }

    pub fn with_profile(self, profile: Profile) -> Self {
        self.state.profiles.borrow_mut().insert(profile.id.clone(), profile);
        self
    }

    pub fn login_returns(&self, result: Result<LoginGrant, ServiceError>) {
        *self.state.login.borrow_mut() = Some(result);
    }

    /// Hold the next call to `op` until the returned sender is used.
    pub fn gate(&self, op: &'static str) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.state.gates.borrow_mut().insert(op, rx);
        tx
    }

    async fn pass_gate(&self, op: &'static str) {
        let gate = self.state.gates.borrow_mut().remove(op);
        if let Some(rx) = gate {
            let _ = rx.await;
        }
    }

    pub fn emit(&self, event: AuthChangeEvent, session: Option<Session>) {
        self.state.hub.emit(&AuthEvent { event, session });
    }

    pub fn profile_requests(&self) -> Vec<String> {
        self.state.profile_requests.borrow().clone()
    }

    fn check_read_error(&self) -> Result<(), ServiceError> {
        match self.state.read_error.borrow().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn install(&self, access_token: &str, refresh_token: &str, user: User) -> Session {
        self.state
            .installed
            .borrow_mut()
            .push((access_token.to_owned(), refresh_token.to_owned()));
        let session = Session {
            access_token: access_token.to_owned(),
            refresh_token: Some(refresh_token.to_owned()).filter(|r| !r.is_empty()),
            token_type: Some("bearer".to_owned()),
            expires_in: None,
            expires_at: None,
            user: user.clone(),
        };
        *self.state.session.borrow_mut() = Some(session.clone());
        *self.state.user.borrow_mut() = Some(user);
        session
    }
}

impl IdentityService for FakeIdentity {
    async fn login_rpc(&self, credentials: &Credentials) -> Result<LoginGrant, ServiceError> {
        self.state.login_requests.borrow_mut().push(credentials.clone());
        self.pass_gate("login_rpc").await;
        self.state
            .login
            .borrow()
            .clone()
            .unwrap_or_else(|| Err(api_error(400, "Invalid login credentials")))
    }

    async fn register_tenant_rpc(&self, _registration: &TenantRegistration) -> Result<TenantGrant, ServiceError> {
        self.state
            .tenant
            .borrow()
            .clone()
            .unwrap_or_else(|| Err(api_error(400, "tenant registration disabled")))
    }

    async fn set_session(&self, access_token: &str, refresh_token: &str) -> Result<Session, ServiceError> {
        if let Some(err) = self.state.set_session_error.borrow().clone() {
            return Err(err);
        }
        let user_id = self
            .state
            .login
            .borrow()
            .as_ref()
            .and_then(|r| r.as_ref().ok())
            .map(|g| g.user.id.clone())
            .or_else(|| {
                self.state
                    .tenant
                    .borrow()
                    .as_ref()
                    .and_then(|r| r.as_ref().ok())
                    .and_then(|g| g.user_id.clone())
            })
            .unwrap_or_else(|| "anonymous".to_owned());
        let session = self.install(access_token, refresh_token, user(&user_id));
        self.emit(AuthChangeEvent::SignedIn, Some(session.clone()));
        Ok(session)
    }

    async fn sign_up(&self, _email: &str, _password: &str, metadata: Value) -> Result<AuthOutcome, ServiceError> {
        self.state.sign_up_metadata.borrow_mut().push(metadata);
        self.state
            .sign_up
            .borrow()
            .clone()
            .unwrap_or_else(|| Err(api_error(422, "User already registered")))
    }

    async fn sign_out(&self) -> Result<(), ServiceError> {
        self.state.sign_out_calls.set(self.state.sign_out_calls.get() + 1);
        if let Some(err) = self.state.sign_out_error.borrow().clone() {
            return Err(err);
        }
        *self.state.session.borrow_mut() = None;
        *self.state.user.borrow_mut() = None;
        Ok(())
    }

    async fn reset_password_for_email(&self, email: &str, redirect_to: Option<&str>) -> Result<(), ServiceError> {
        self.state
            .reset_requests
            .borrow_mut()
            .push((email.to_owned(), redirect_to.map(str::to_owned)));
        match self.state.reset_error.borrow().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn update_password(&self, _new_password: &str) -> Result<User, ServiceError> {
        if let Some(err) = self.state.update_error.borrow().clone() {
            return Err(err);
        }
        self.state.user.borrow().clone().ok_or(ServiceError::SessionMissing)
    }

    async fn get_user(&self) -> Result<Option<User>, ServiceError> {
        self.state.get_user_calls.set(self.state.get_user_calls.get() + 1);
        self.check_read_error()?;
        Ok(self.state.user.borrow().clone())
    }

    async fn get_session(&self) -> Result<Option<Session>, ServiceError> {
        self.state.get_session_calls.set(self.state.get_session_calls.get() + 1);
        self.pass_gate("get_session").await;
        if let Some(event) = self.state.emit_during_get_session.borrow_mut().take() {
            self.state.hub.emit(&event);
        }
        self.check_read_error()?;
        Ok(self.state.session.borrow().clone())
    }

    async fn fetch_profile(&self, user_id: &str) -> Result<Profile, ServiceError> {
        self.state.profile_requests.borrow_mut().push(user_id.to_owned());
        self.pass_gate("fetch_profile").await;
        self.state
            .profiles
            .borrow()
            .get(user_id)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound(format!("user_profiles row {user_id}")))
    }

    fn subscribe(&self) -> AuthSubscription {
        self.state.hub.subscribe()
    }
}
