use super::*;

#[test]
fn unset_port_uses_default() {
    let config = HostConfig::from_port(None).unwrap();
    assert_eq!(config.port, DEFAULT_PORT);
    assert_eq!(config.site_addr, SocketAddr::from(([0, 0, 0, 0], 3000)));
}

#[test]
fn blank_port_uses_default() {
    assert_eq!(HostConfig::from_port(Some("  ")).unwrap().port, DEFAULT_PORT);
}

#[test]
fn explicit_port_is_trimmed_and_parsed() {
    let config = HostConfig::from_port(Some(" 8080 ")).unwrap();
    assert_eq!(config.port, 8080);
    assert_eq!(config.site_addr.port(), 8080);
}

#[test]
fn invalid_port_is_a_typed_error() {
    let err = HostConfig::from_port(Some("eighty")).unwrap_err();
    assert!(matches!(&err, ConfigError::InvalidPort { value, .. } if value == "eighty"));
    assert!(err.to_string().starts_with("invalid PORT \"eighty\""));
}

#[test]
fn out_of_range_port_is_rejected() {
    assert!(HostConfig::from_port(Some("70000")).is_err());
}

#[test]
fn from_env_reads_port_variable() {
    unsafe { std::env::set_var("PORT", "4321") };
    let config = HostConfig::from_env();
    unsafe { std::env::remove_var("PORT") };
    assert_eq!(config.unwrap().port, 4321);
}
