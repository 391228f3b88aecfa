//! Hosted identity client: auth endpoints plus row reads over REST.
//!
//! SYSTEM CONTEXT
//! ==============
//! `SupabaseClient` is the production `IdentityService`. It owns the client's
//! ambient session (in memory and under `sb-auth-token` in durable storage)
//! and the push hub that notifies subscribers when that session changes.
//!
//! Client-side (hydrate): real HTTP calls via `gloo-net`, a background
//! refresh ticker, and session detection in the URL fragment.
//! Server-side (SSR) and native tests: every network call fails with
//! `ServiceError::Unavailable`; the local session bookkeeping still works.
//!
//! ERROR HANDLING
//! ==============
//! Non-success responses become `ServiceError::Api` carrying the service's
//! own message. A refresh token the service rejects clears the session and
//! emits `SIGNED_OUT` rather than leaving a dead session around.

#![allow(clippy::unused_async)]

#[cfg(test)]
#[path = "supabase_test.rs"]
mod supabase_test;

use std::cell::RefCell;
use std::rc::Rc;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use leptos::logging::{log, warn};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use super::auth_events::{AuthEventHub, AuthSubscription};
use super::error::ServiceError;
use super::identity::IdentityService;
use super::types::{
    AuthChangeEvent, AuthEvent, AuthOutcome, Credentials, LoginGrant, Profile, Session, TenantGrant,
    TenantRegistration, User,
};
use crate::config::ServiceConfig;
use crate::util::storage::{BrowserStorage, KeyValueStorage, load_json, save_json};

/// Durable-storage key of the ambient session.
pub const SESSION_STORAGE_KEY: &str = "sb-auth-token";
/// Background refresh tick.
pub const REFRESH_TICK_MS: u32 = 30_000;
/// Sessions expiring within this many seconds are refreshed.
pub const REFRESH_MARGIN_SECS: i64 = 90;

const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Method {
    Get,
    Post,
    Put,
}

/// Tokens delivered in a redirect's URL fragment (email confirmation,
/// magic link, password recovery).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FragmentSession {
    pub access_token: String,
    pub refresh_token: String,
    pub recovery: bool,
}

/// Parse `#access_token=…&refresh_token=…&type=…`. `None` when the fragment
/// carries no access token.
pub fn parse_session_fragment(fragment: &str) -> Option<FragmentSession> {
    let mut access_token = None;
    let mut refresh_token = None;
    let mut recovery = false;
    for pair in fragment.trim_start_matches('#').split('&') {
        let (key, raw) = pair.split_once('=').unwrap_or((pair, ""));
        let value = urlencoding::decode(raw).map_or_else(|_| raw.to_owned(), std::borrow::Cow::into_owned);
        match key {
            "access_token" => access_token = Some(value),
            "refresh_token" => refresh_token = Some(value),
            "type" => recovery = value == "recovery",
            _ => {}
        }
    }
    Some(FragmentSession {
        access_token: access_token.filter(|t| !t.is_empty())?,
        refresh_token: refresh_token.unwrap_or_default(),
        recovery,
    })
}

/// `exp` claim of a JWT access token. The signature is not checked.
pub fn token_expiry(access_token: &str) -> Option<i64> {
    let payload = access_token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    let claims: Value = serde_json::from_slice(&bytes).ok()?;
    claims.get("exp").and_then(Value::as_i64)
}

/// Whether `session` should be refreshed now.
pub fn refresh_due(session: &Session, now_secs: i64) -> bool {
    session.refresh_token.as_deref().is_some_and(|t| !t.is_empty())
        && session.expires_within(now_secs, REFRESH_MARGIN_SECS)
}

fn profile_path(user_id: &str) -> String {
    format!("user_profiles?id=eq.{}&select=*", urlencoding::encode(user_id))
}

fn recover_path(redirect_to: Option<&str>) -> String {
    match redirect_to {
        Some(url) => format!("recover?redirect_to={}", urlencoding::encode(url)),
        None => "recover".to_owned(),
    }
}

/// Map a response to its JSON body or a `ServiceError`. Blank bodies are `null`.
fn decode_response(status: u16, body: &str, single_object: bool) -> Result<Value, ServiceError> {
    let success = (200..300).contains(&status);
    let value = if body.trim().is_empty() {
        Value::Null
    } else {
        match serde_json::from_str(body) {
            Ok(value) => value,
            Err(e) if success => return Err(ServiceError::Decode(e.to_string())),
            Err(_) => {
                return Err(ServiceError::Api { status, message: body.trim().to_owned() });
            }
        }
    };
    if success {
        Ok(value)
    } else if single_object && status == 406 {
        Err(ServiceError::NotFound("row".to_owned()))
    } else {
        Err(ServiceError::from_response(status, &value))
    }
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, ServiceError> {
    serde_json::from_value(value).map_err(|e| ServiceError::Decode(e.to_string()))
}

/// The service refuses this refresh token for good.
fn rejected_refresh(err: &ServiceError) -> bool {
    matches!(err, ServiceError::Api { status: 400 | 401 | 403, .. })
}

#[allow(clippy::cast_possible_truncation)]
fn now_secs() -> i64 {
    #[cfg(feature = "hydrate")]
    {
        (js_sys::Date::now() / 1000.0) as i64
    }
    #[cfg(not(feature = "hydrate"))]
    {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map_or(0, |d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
    }
}

struct ClientInner {
    config: ServiceConfig,
    storage: Rc<dyn KeyValueStorage>,
    session: RefCell<Option<Session>>,
    pending_fragment: RefCell<Option<FragmentSession>>,
    hub: AuthEventHub,
}

/// Identity client bound to one service project. Clones share the session.
#[derive(Clone)]
pub struct SupabaseClient {
    inner: Rc<ClientInner>,
}

impl SupabaseClient {
    /// Client over `storage`, restoring any persisted session.
    pub fn new(config: ServiceConfig, storage: Rc<dyn KeyValueStorage>) -> Self {
        let session = load_json::<Session>(storage.as_ref(), SESSION_STORAGE_KEY);
        Self {
            inner: Rc::new(ClientInner {
                config,
                storage,
                session: RefCell::new(session),
                pending_fragment: RefCell::new(None),
                hub: AuthEventHub::new(),
            }),
        }
    }

    /// Browser client: `localStorage` persistence, URL session detection
    /// and background token refresh.
    pub fn connect(config: ServiceConfig) -> Self {
        let client = Self::new(config, Rc::new(BrowserStorage));
        #[cfg(feature = "hydrate")]
        {
            if let Some(fragment) = take_location_fragment() {
                client.queue_url_fragment(&fragment);
            }
            client.start_auto_refresh();
        }
        client
    }

    /// Remember a redirect fragment; it is installed by the next `get_session`.
    pub fn queue_url_fragment(&self, fragment: &str) {
        if let Some(found) = parse_session_fragment(fragment) {
            *self.inner.pending_fragment.borrow_mut() = Some(found);
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.inner.config
    }

    /// Ambient session without any refresh.
    pub fn session(&self) -> Option<Session> {
        self.inner.session.borrow().clone()
    }

    fn access_token(&self) -> Option<String> {
        self.inner.session.borrow().as_ref().map(|s| s.access_token.clone())
    }

    fn store_session(&self, session: Session) -> Session {
        save_json(self.inner.storage.as_ref(), SESSION_STORAGE_KEY, &session);
        *self.inner.session.borrow_mut() = Some(session.clone());
        session
    }

    fn clear_session(&self) {
        self.inner.storage.remove(SESSION_STORAGE_KEY);
        *self.inner.session.borrow_mut() = None;
    }

    fn emit(&self, event: AuthChangeEvent, session: Option<Session>) {
        log!("identity client: {}", event.as_str());
        self.inner.hub.emit(&AuthEvent { event, session });
    }

    /// Validate `access_token` against the service and make it ambient.
    async fn install_tokens(&self, access_token: &str, refresh_token: &str) -> Result<Session, ServiceError> {
        let value = self
            .request(Method::Get, &self.inner.config.auth_url("user"), Some(access_token), None, false)
            .await?;
        let user: User = decode(value)?;
        let session = Session {
            access_token: access_token.to_owned(),
            refresh_token: Some(refresh_token.to_owned()).filter(|t| !t.is_empty()),
            token_type: Some("bearer".to_owned()),
            expires_in: None,
            expires_at: token_expiry(access_token),
            user,
        };
        Ok(self.store_session(session))
    }

    async fn consume_url_fragment(&self) {
        let Some(found) = self.inner.pending_fragment.borrow_mut().take() else {
            return;
        };
        match self.install_tokens(&found.access_token, &found.refresh_token).await {
            Ok(session) => {
                let event = if found.recovery { AuthChangeEvent::PasswordRecovery } else { AuthChangeEvent::SignedIn };
                self.emit(event, Some(session));
            }
            Err(e) => warn!("ignoring session from URL: {e}"),
        }
    }

    /// Exchange the ambient refresh token for a new session.
    ///
    /// # Errors
    ///
    /// `SessionMissing` without a refresh token; otherwise the service error.
    /// A rejected token also clears the session and emits `SIGNED_OUT`.
    pub async fn refresh_session(&self) -> Result<Session, ServiceError> {
        let refresh_token = self
            .session()
            .and_then(|s| s.refresh_token)
            .filter(|t| !t.is_empty())
            .ok_or(ServiceError::SessionMissing)?;
        let url = self.inner.config.auth_url("token?grant_type=refresh_token");
        let body = json!({ "refresh_token": refresh_token });
        match self.request(Method::Post, &url, None, Some(&body), false).await {
            Ok(value) => {
                let session = decode::<Session>(value)?.with_expiry_from(now_secs());
                let session = self.store_session(session);
                self.emit(AuthChangeEvent::TokenRefreshed, Some(session.clone()));
                Ok(session)
            }
            Err(err) if rejected_refresh(&err) => {
                warn!("refresh token rejected, signing out: {err}");
                self.clear_session();
                self.emit(AuthChangeEvent::SignedOut, None);
                Err(err)
            }
            Err(err) => Err(err),
        }
    }

    /// One background tick: refresh when the ambient session is near expiry.
    pub async fn refresh_if_due(&self) {
        if !self.session().is_some_and(|s| refresh_due(&s, now_secs())) {
            return;
        }
        if let Err(e) = self.refresh_session().await {
            warn!("background token refresh failed: {e}");
        }
    }

    #[cfg(feature = "hydrate")]
    fn start_auto_refresh(&self) {
        let weak = Rc::downgrade(&self.inner);
        wasm_bindgen_futures::spawn_local(async move {
            loop {
                gloo_timers::future::TimeoutFuture::new(REFRESH_TICK_MS).await;
                let Some(inner) = weak.upgrade() else {
                    break;
                };
                SupabaseClient { inner }.refresh_if_due().await;
            }
        });
    }

    #[cfg(feature = "hydrate")]
    async fn request(
        &self,
        method: Method,
        url: &str,
        bearer: Option<&str>,
        body: Option<&Value>,
        single_object: bool,
    ) -> Result<Value, ServiceError> {
        use gloo_net::http::Request;

        let transport = |e: gloo_net::Error| ServiceError::Transport(e.to_string());
        let anon_key = self.inner.config.anon_key.as_str();
        let authorization = format!("Bearer {}", bearer.unwrap_or(anon_key));
        let builder = match method {
            Method::Get => Request::get(url),
            Method::Post => Request::post(url),
            Method::Put => Request::put(url),
        }
        .header("apikey", anon_key)
        .header("Authorization", &authorization)
        .header("Accept", if single_object { SINGLE_OBJECT } else { "application/json" });

        let response = match body {
            Some(body) => builder.json(body).map_err(transport)?.send().await,
            None => builder.send().await,
        }
        .map_err(transport)?;
        let status = response.status();
        let text = response.text().await.map_err(transport)?;
        decode_response(status, &text, single_object)
    }

    #[cfg(not(feature = "hydrate"))]
    #[allow(clippy::unused_self)]
    async fn request(
        &self,
        method: Method,
        url: &str,
        bearer: Option<&str>,
        body: Option<&Value>,
        single_object: bool,
    ) -> Result<Value, ServiceError> {
        let _ = (method, url, bearer, body, single_object);
        Err(ServiceError::Unavailable)
    }
}

/// Read the address-bar fragment if it carries a session, then strip it.
#[cfg(feature = "hydrate")]
fn take_location_fragment() -> Option<String> {
    let window = web_sys::window()?;
    let location = window.location();
    let hash = location.hash().ok()?;
    parse_session_fragment(&hash)?;
    let path = format!(
        "{}{}",
        location.pathname().unwrap_or_default(),
        location.search().unwrap_or_default()
    );
    if let Ok(history) = window.history() {
        let _ = history.replace_state_with_url(&wasm_bindgen::JsValue::NULL, "", Some(&path));
    }
    Some(hash)
}

impl IdentityService for SupabaseClient {
    async fn login_rpc(&self, credentials: &Credentials) -> Result<LoginGrant, ServiceError> {
        let body = json!({ "email": credentials.email, "password": credentials.password });
        let value = self
            .request(Method::Post, &self.inner.config.rpc_url("login"), None, Some(&body), false)
            .await?;
        decode(value)
    }

    async fn register_tenant_rpc(&self, registration: &TenantRegistration) -> Result<TenantGrant, ServiceError> {
        let body = serde_json::to_value(registration).map_err(|e| ServiceError::Decode(e.to_string()))?;
        let value = self
            .request(Method::Post, &self.inner.config.rpc_url("register_tenant"), None, Some(&body), false)
            .await?;
        decode(value)
    }

    async fn set_session(&self, access_token: &str, refresh_token: &str) -> Result<Session, ServiceError> {
        let session = self.install_tokens(access_token, refresh_token).await?;
        self.emit(AuthChangeEvent::SignedIn, Some(session.clone()));
        Ok(session)
    }

    async fn sign_up(&self, email: &str, password: &str, metadata: Value) -> Result<AuthOutcome, ServiceError> {
        let body = json!({ "email": email, "password": password, "data": metadata });
        let value = self
            .request(Method::Post, &self.inner.config.auth_url("signup"), None, Some(&body), false)
            .await?;
        // Confirmation-pending signups return the bare user.
        if value.get("access_token").is_none() {
            let user: User = decode(value)?;
            return Ok(AuthOutcome { user: Some(user), session: None });
        }
        let session = decode::<Session>(value)?.with_expiry_from(now_secs());
        let session = self.store_session(session);
        self.emit(AuthChangeEvent::SignedIn, Some(session.clone()));
        Ok(AuthOutcome { user: Some(session.user.clone()), session: Some(session) })
    }

    async fn sign_out(&self) -> Result<(), ServiceError> {
        if let Some(token) = self.access_token() {
            let url = self.inner.config.auth_url("logout");
            match self.request(Method::Post, &url, Some(&token), None, false).await {
                Ok(_) | Err(ServiceError::Api { status: 401 | 404, .. }) => {}
                Err(err) => return Err(err),
            }
        }
        self.clear_session();
        self.emit(AuthChangeEvent::SignedOut, None);
        Ok(())
    }

    async fn reset_password_for_email(&self, email: &str, redirect_to: Option<&str>) -> Result<(), ServiceError> {
        let url = self.inner.config.auth_url(&recover_path(redirect_to));
        self.request(Method::Post, &url, None, Some(&json!({ "email": email })), false)
            .await?;
        Ok(())
    }

    async fn update_password(&self, new_password: &str) -> Result<User, ServiceError> {
        let token = self.access_token().ok_or(ServiceError::SessionMissing)?;
        let body = json!({ "password": new_password });
        let value = self
            .request(Method::Put, &self.inner.config.auth_url("user"), Some(&token), Some(&body), false)
            .await?;
        let user: User = decode(value)?;
        let updated = self.session().map(|mut session| {
            session.user = user.clone();
            self.store_session(session)
        });
        self.emit(AuthChangeEvent::UserUpdated, updated);
        Ok(user)
    }

    async fn get_user(&self) -> Result<Option<User>, ServiceError> {
        let Some(token) = self.access_token() else {
            return Ok(None);
        };
        let value = self
            .request(Method::Get, &self.inner.config.auth_url("user"), Some(&token), None, false)
            .await?;
        decode(value).map(Some)
    }

    async fn get_session(&self) -> Result<Option<Session>, ServiceError> {
        self.consume_url_fragment().await;
        let Some(session) = self.session() else {
            return Ok(None);
        };
        if !refresh_due(&session, now_secs()) {
            return Ok(Some(session));
        }
        match self.refresh_session().await {
            Ok(session) => Ok(Some(session)),
            Err(err) if rejected_refresh(&err) => Ok(None),
            Err(err) => Err(err),
        }
    }

    async fn fetch_profile(&self, user_id: &str) -> Result<Profile, ServiceError> {
        let url = self.inner.config.rest_url(&profile_path(user_id));
        let token = self.access_token();
        let value = self
            .request(Method::Get, &url, token.as_deref(), None, true)
            .await
            .map_err(|e| match e {
                ServiceError::NotFound(_) => ServiceError::NotFound(format!("user_profiles row {user_id}")),
                other => other,
            })?;
        decode(value)
    }

    fn subscribe(&self) -> AuthSubscription {
        self.inner.hub.subscribe()
    }
}
