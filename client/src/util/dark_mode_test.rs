use super::*;

#[test]
fn stored_preference_overrides_system() {
    assert!(resolve_preference(Some("dark"), false));
    assert!(!resolve_preference(Some("light"), true));
}

#[test]
fn missing_or_unknown_preference_follows_system() {
    assert!(resolve_preference(None, true));
    assert!(!resolve_preference(None, false));
    assert!(resolve_preference(Some("true"), true));
}

#[test]
fn preference_values() {
    assert_eq!(preference_value(true), "dark");
    assert_eq!(preference_value(false), "light");
}

#[cfg(not(feature = "hydrate"))]
#[test]
fn read_preference_is_false_in_non_hydrate_tests() {
    assert!(!read_preference());
}

#[test]
fn toggle_flips_boolean_value() {
    assert!(toggle(false));
    assert!(!toggle(true));
}
