use super::*;
use crate::net::fake_identity::{session, user};
use crate::util::storage::MemoryStorage;
use futures::executor::block_on;

fn config() -> ServiceConfig {
    ServiceConfig::from_values(Some("https://db.example.test"), Some("anon"))
}

fn client_with(storage: &MemoryStorage) -> SupabaseClient {
    SupabaseClient::new(config(), Rc::new(storage.clone()))
}

fn jwt_with_exp(exp: i64) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(format!(r#"{{"sub":"u1","exp":{exp}}}"#));
    format!("{header}.{payload}.signature")
}

// =============================================================
// Pure helpers
// =============================================================

#[test]
fn recovery_fragment_is_flagged() {
    let found = parse_session_fragment("#access_token=aaa&refresh_token=rrr&expires_in=3600&type=recovery").unwrap();
    assert_eq!(found.access_token, "aaa");
    assert_eq!(found.refresh_token, "rrr");
    assert!(found.recovery);
}

#[test]
fn signup_fragment_is_not_recovery() {
    let found = parse_session_fragment("access_token=aaa&type=signup").unwrap();
    assert!(!found.recovery);
    assert_eq!(found.refresh_token, "");
}

#[test]
fn fragment_values_are_percent_decoded() {
    let found = parse_session_fragment("#access_token=a%2Eb%2Ec&refresh_token=r%3D").unwrap();
    assert_eq!(found.access_token, "a.b.c");
    assert_eq!(found.refresh_token, "r=");
}

#[test]
fn fragment_without_access_token_is_ignored() {
    assert_eq!(parse_session_fragment(""), None);
    assert_eq!(parse_session_fragment("#section-2"), None);
    assert_eq!(parse_session_fragment("#access_token=&refresh_token=r"), None);
    assert_eq!(parse_session_fragment("#error=access_denied&error_description=expired"), None);
}

#[test]
fn token_expiry_reads_exp_claim() {
    assert_eq!(token_expiry(&jwt_with_exp(1_700_000_000)), Some(1_700_000_000));
    assert_eq!(token_expiry("opaque-token"), None);
    assert_eq!(token_expiry("a.!!!.c"), None);
}

#[test]
fn refresh_due_needs_refresh_token_and_near_expiry() {
    let mut s = session("t1", "u1");
    assert!(!refresh_due(&s, 1_000), "no known expiry");

    s.expires_at = Some(1_000 + REFRESH_MARGIN_SECS + 1);
    assert!(!refresh_due(&s, 1_000));

    s.expires_at = Some(1_000 + REFRESH_MARGIN_SECS);
    assert!(refresh_due(&s, 1_000));

    s.refresh_token = None;
    assert!(!refresh_due(&s, 1_000));
}

#[test]
fn endpoint_paths() {
    assert_eq!(profile_path("u 1"), "user_profiles?id=eq.u%201&select=*");
    assert_eq!(recover_path(None), "recover");
    assert_eq!(
        recover_path(Some("https://app.test/reset-password")),
        "recover?redirect_to=https%3A%2F%2Fapp.test%2Freset-password"
    );
}

#[test]
fn decode_response_success_and_blank_bodies() {
    assert_eq!(decode_response(200, r#"{"id":"u1"}"#, false).unwrap()["id"], "u1");
    assert_eq!(decode_response(204, "", false).unwrap(), Value::Null);
    assert!(matches!(decode_response(200, "<html>", false), Err(ServiceError::Decode(_))));
}

#[test]
fn decode_response_maps_errors() {
    assert_eq!(
        decode_response(400, r#"{"error":"invalid_grant","error_description":"Invalid Refresh Token"}"#, false),
        Err(ServiceError::Api { status: 400, message: "Invalid Refresh Token".to_owned() })
    );
    assert_eq!(
        decode_response(502, "Bad Gateway", false),
        Err(ServiceError::Api { status: 502, message: "Bad Gateway".to_owned() })
    );
    assert!(matches!(decode_response(406, r#"{"code":"PGRST116"}"#, true), Err(ServiceError::NotFound(_))));
    assert!(matches!(decode_response(406, "{}", false), Err(ServiceError::Api { status: 406, .. })));
}

#[test]
fn rejected_refresh_covers_client_errors_only() {
    assert!(rejected_refresh(&ServiceError::Api { status: 400, message: String::new() }));
    assert!(rejected_refresh(&ServiceError::Api { status: 401, message: String::new() }));
    assert!(!rejected_refresh(&ServiceError::Api { status: 500, message: String::new() }));
    assert!(!rejected_refresh(&ServiceError::Transport("offline".to_owned())));
}

// =============================================================
// Ambient session bookkeeping (no network)
// =============================================================

#[test]
fn new_restores_persisted_session() {
    let storage = MemoryStorage::new();
    storage.set(SESSION_STORAGE_KEY, &serde_json::to_string(&session("t1", "u1")).unwrap());

    let client = client_with(&storage);

    assert_eq!(client.session().unwrap().access_token, "t1");
}

#[test]
fn corrupt_persisted_session_is_ignored() {
    let storage = MemoryStorage::new();
    storage.set(SESSION_STORAGE_KEY, "not json");
    assert!(client_with(&storage).session().is_none());
}

#[test]
fn get_session_returns_ambient_session_when_fresh() {
    let storage = MemoryStorage::new();
    let mut s = session("t1", "u1");
    s.expires_at = Some(now_secs() + 3_600);
    storage.set(SESSION_STORAGE_KEY, &serde_json::to_string(&s).unwrap());
    let client = client_with(&storage);

    let got = block_on(client.get_session()).unwrap().unwrap();
    assert_eq!(got.access_token, "t1");
}

#[test]
fn get_session_surfaces_refresh_transport_failure() {
    let storage = MemoryStorage::new();
    let mut s = session("t1", "u1");
    s.expires_at = Some(now_secs() + 10);
    storage.set(SESSION_STORAGE_KEY, &serde_json::to_string(&s).unwrap());
    let client = client_with(&storage);

    assert_eq!(block_on(client.get_session()), Err(ServiceError::Unavailable));
    // Not a rejection: the session is kept for a later retry.
    assert!(client.session().is_some());
}

#[test]
fn signed_out_reads_are_empty() {
    let client = client_with(&MemoryStorage::new());
    assert_eq!(block_on(client.get_session()), Ok(None));
    assert_eq!(block_on(client.get_user()), Ok(None));
}

#[test]
fn refresh_without_token_is_session_missing() {
    let client = client_with(&MemoryStorage::new());
    assert_eq!(block_on(client.refresh_session()), Err(ServiceError::SessionMissing));
}

#[test]
fn update_password_without_session_is_session_missing() {
    let client = client_with(&MemoryStorage::new());
    assert_eq!(block_on(client.update_password("n3w")), Err(ServiceError::SessionMissing));
}

#[test]
fn sign_out_without_session_clears_and_notifies() {
    let storage = MemoryStorage::new();
    let client = client_with(&storage);
    let mut sub = client.subscribe();

    block_on(client.sign_out()).unwrap();

    let event = block_on(sub.next()).unwrap();
    assert_eq!(event.event, AuthChangeEvent::SignedOut);
    assert!(event.session.is_none());
    assert!(storage.get(SESSION_STORAGE_KEY).is_none());
}

#[test]
fn sign_out_keeps_session_when_revoke_cannot_be_sent() {
    let storage = MemoryStorage::new();
    storage.set(SESSION_STORAGE_KEY, &serde_json::to_string(&session("t1", "u1")).unwrap());
    let client = client_with(&storage);

    assert_eq!(block_on(client.sign_out()), Err(ServiceError::Unavailable));
    assert!(client.session().is_some());
    assert!(storage.get(SESSION_STORAGE_KEY).is_some());
}

#[test]
fn network_calls_are_unavailable_off_browser() {
    let client = client_with(&MemoryStorage::new());
    let credentials = Credentials { email: "a@x.com".to_owned(), password: "pw".to_owned() };
    assert_eq!(block_on(client.login_rpc(&credentials)), Err(ServiceError::Unavailable));
    assert_eq!(block_on(client.fetch_profile("u1")), Err(ServiceError::Unavailable));
    assert_eq!(block_on(client.set_session("t", "r")), Err(ServiceError::Unavailable));
}

#[test]
fn queued_fragment_is_consumed_once() {
    let client = client_with(&MemoryStorage::new());
    client.queue_url_fragment("#access_token=aaa&refresh_token=rrr");
    assert!(client.inner.pending_fragment.borrow().is_some());

    // Installing needs the network; the fragment is dropped either way.
    assert_eq!(block_on(client.get_session()), Ok(None));
    assert!(client.inner.pending_fragment.borrow().is_none());
}

#[test]
fn unrelated_fragment_is_not_queued() {
    let client = client_with(&MemoryStorage::new());
    client.queue_url_fragment("#pricing");
    assert!(client.inner.pending_fragment.borrow().is_none());
}

#[test]
fn clones_share_ambient_session() {
    let storage = MemoryStorage::new();
    let client = client_with(&storage);
    let other = client.clone();

    client.store_session(session("t1", "u1"));

    assert_eq!(other.session().unwrap().user, user("u1"));
    assert!(storage.get(SESSION_STORAGE_KEY).is_some());
}
