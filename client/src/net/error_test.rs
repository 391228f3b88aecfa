use super::*;
use serde_json::json;

#[test]
fn error_body_message_prefers_auth_fields_in_order() {
    assert_eq!(error_body_message(&json!({ "msg": "a", "message": "b" })).as_deref(), Some("a"));
    assert_eq!(
        error_body_message(&json!({ "error": "invalid_grant", "error_description": "Invalid login credentials" }))
            .as_deref(),
        Some("Invalid login credentials")
    );
    assert_eq!(
        error_body_message(&json!({ "code": "P0001", "message": "invalid email or password" })).as_deref(),
        Some("invalid email or password")
    );
    assert_eq!(error_body_message(&json!({ "error": "bad" })).as_deref(), Some("bad"));
}

#[test]
fn error_body_message_skips_blank_and_non_string_values() {
    assert_eq!(error_body_message(&json!({ "msg": "  ", "message": "real" })).as_deref(), Some("real"));
    assert_eq!(error_body_message(&json!({ "code": 400 })), None);
    assert_eq!(error_body_message(&json!("plain")), None);
}

#[test]
fn from_response_falls_back_to_status_text() {
    let err = ServiceError::from_response(502, &json!({}));
    assert_eq!(err.to_string(), "request failed: 502");
    let err = ServiceError::from_response(400, &json!({ "msg": "User already registered" }));
    assert_eq!(err, ServiceError::Api { status: 400, message: "User already registered".to_owned() });
}

#[test]
fn unauthorized_detection_covers_401_and_403() {
    assert!(ServiceError::Api { status: 401, message: "x".to_owned() }.is_unauthorized());
    assert!(ServiceError::Api { status: 403, message: "x".to_owned() }.is_unauthorized());
    assert!(!ServiceError::Api { status: 400, message: "x".to_owned() }.is_unauthorized());
    assert!(!ServiceError::Transport("offline".to_owned()).is_unauthorized());
}

#[test]
fn auth_error_takes_underlying_message() {
    let err: AuthError = ServiceError::Api { status: 400, message: "Invalid login credentials".to_owned() }.into();
    assert_eq!(err.to_string(), "Invalid login credentials");
}

#[test]
fn auth_error_uses_fallback_for_blank_messages() {
    let err: AuthError = ServiceError::Transport(String::new()).into();
    assert_eq!(err.message, FALLBACK_ERROR_MESSAGE);
    assert_eq!(AuthError::new("  ").message, FALLBACK_ERROR_MESSAGE);
}
