use super::*;

// =============================================================================
// env_bool / env_parse: unique env var names avoid races with parallel tests.
// =============================================================================

#[test]
fn env_bool_true_variants() {
    for (i, val) in ["1", "true", "yes", "on", "  TRUE "].iter().enumerate() {
        let key = format!("__TEST_TG_EB_TRUE_{i}__");
        unsafe { std::env::set_var(&key, val) };
        assert_eq!(env_bool(&key), Some(true), "expected true for {val:?}");
        unsafe { std::env::remove_var(&key) };
    }
}

#[test]
fn env_bool_false_variants() {
    for (i, val) in ["0", "false", "no", "Off"].iter().enumerate() {
        let key = format!("__TEST_TG_EB_FALSE_{i}__");
        unsafe { std::env::set_var(&key, val) };
        assert_eq!(env_bool(&key), Some(false), "expected false for {val:?}");
        unsafe { std::env::remove_var(&key) };
    }
}

#[test]
fn env_bool_invalid_or_unset_is_none() {
    let key = "__TEST_TG_EB_INVALID_311__";
    unsafe { std::env::set_var(key, "maybe") };
    assert_eq!(env_bool(key), None);
    unsafe { std::env::remove_var(key) };
    assert_eq!(env_bool("__TEST_TG_EB_UNSET_312__"), None);
}

#[test]
fn env_parse_falls_back_on_garbage() {
    let key = "__TEST_TG_EP_GARBAGE_401__";
    unsafe { std::env::set_var(key, "not-a-number") };
    assert_eq!(env_parse(key, 42_u16), 42);
    unsafe { std::env::remove_var(key) };
}

#[test]
fn env_parse_reads_value() {
    let key = "__TEST_TG_EP_VALUE_402__";
    unsafe { std::env::set_var(key, " 8080 ") };
    assert_eq!(env_parse(key, 3000_u16), 8080);
    unsafe { std::env::remove_var(key) };
}

// =============================================================================
// BackendConfig
// =============================================================================

#[test]
fn backend_config_requires_both_parts() {
    let t = BackendTimeouts::default();
    assert!(BackendConfig::from_parts(None, Some("key"), t).is_none());
    assert!(BackendConfig::from_parts(Some("https://x.supabase.co"), None, t).is_none());
    assert!(BackendConfig::from_parts(Some("   "), Some("key"), t).is_none());
    assert!(BackendConfig::from_parts(Some("https://x.supabase.co"), Some(""), t).is_none());
}

#[test]
fn backend_config_trims_trailing_slash() {
    let config =
        BackendConfig::from_parts(Some("https://x.supabase.co/"), Some("pk"), BackendTimeouts::default()).unwrap();
    assert_eq!(config.url, "https://x.supabase.co");
    assert_eq!(config.key, "pk");
    assert!(config.is_https());
}

#[test]
fn backend_config_http_is_not_https() {
    let config =
        BackendConfig::from_parts(Some("http://localhost:54321"), Some("pk"), BackendTimeouts::default()).unwrap();
    assert!(!config.is_https());
}

#[test]
fn default_timeouts() {
    let t = BackendTimeouts::default();
    assert_eq!(t.request_secs, DEFAULT_BACKEND_REQUEST_TIMEOUT_SECS);
    assert_eq!(t.connect_secs, DEFAULT_BACKEND_CONNECT_TIMEOUT_SECS);
}
