use super::*;
use crate::net::fake_identity::profile;
use serde_json::json;

fn role(id: &str, name: &str, permissions: serde_json::Value) -> Role {
    Role { id: id.to_owned(), name: name.to_owned(), description: None, permissions }
}

// =============================================================
// Parity mode
// =============================================================

#[test]
fn parity_denies_everything_without_profile() {
    let gate = AccessGate::new(None);
    assert!(!gate.has_role(ROLE_ADMIN));
    assert!(!gate.has_permission("documents.read"));
    assert!(!gate.is_admin());
}

#[test]
fn parity_denies_profile_without_role() {
    let p = profile("u1", None);
    let gate = AccessGate::new(Some(&p));
    assert!(!gate.has_role(ROLE_AUDITOR));
    assert!(!gate.is_quality_manager());
}

#[test]
fn parity_treats_blank_role_id_as_unassigned() {
    let p = profile("u1", Some(""));
    assert!(!AccessGate::new(Some(&p)).is_admin());
}

#[test]
fn parity_passes_every_check_for_any_assigned_role() {
    let p = profile("u1", Some("r-viewer"));
    let gate = AccessGate::new(Some(&p));
    assert!(gate.has_role("anything"));
    assert!(gate.has_permission("anything"));
    assert!(gate.is_admin());
    assert!(gate.is_quality_manager());
    assert!(gate.is_project_manager());
    assert!(gate.is_auditor());
}

#[test]
fn from_state_reads_store_profile() {
    let state = AuthState { profile: Some(profile("u1", Some("r1"))), ..AuthState::default() };
    assert!(AccessGate::from_state(&state).is_admin());
    assert!(!AccessGate::from_state(&AuthState::default()).is_admin());
}

// =============================================================
// Resolved mode
// =============================================================

#[test]
fn resolved_matches_role_name() {
    let p = profile("u1", Some("r1"));
    let gate = AccessGate::with_role(Some(&p), Some(role("r1", ROLE_AUDITOR, json!([]))));
    assert!(gate.is_auditor());
    assert!(!gate.is_admin());
    assert!(!gate.is_project_manager());
}

#[test]
fn resolved_checks_permission_array_and_object() {
    let p = profile("u1", Some("r1"));
    let listed = AccessGate::with_role(Some(&p), Some(role("r1", "editor", json!(["documents.read"]))));
    assert!(listed.has_permission("documents.read"));
    assert!(!listed.has_permission("documents.write"));

    let flagged = AccessGate::with_role(
        Some(&p),
        Some(role("r1", "editor", json!({ "documents.read": true, "documents.write": false }))),
    );
    assert!(flagged.has_permission("documents.read"));
    assert!(!flagged.has_permission("documents.write"));
}

#[test]
fn resolved_ignores_role_for_a_different_id() {
    let p = profile("u1", Some("r1"));
    let gate = AccessGate::with_role(Some(&p), Some(role("r2", ROLE_ADMIN, json!(["*"]))));
    assert!(!gate.is_admin());
    assert!(!gate.has_permission("*"));
}

#[test]
fn resolved_without_role_row_denies() {
    let p = profile("u1", Some("r1"));
    let gate = AccessGate::with_role(Some(&p), None);
    assert!(!gate.is_admin());
    assert!(!gate.has_permission("documents.read"));
}
