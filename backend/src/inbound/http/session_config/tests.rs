//! Unit tests for session configuration parsing.

use std::collections::HashMap;
use std::io::Write;

use mockable::MockEnv;
use rstest::{fixture, rstest};
use tempfile::NamedTempFile;

use super::*;

fn key_file(len: usize) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp key file");
    file.write_all(&vec![b'k'; len]).expect("write key");
    file
}

fn path_of(file: &NamedTempFile) -> String {
    file.path().to_str().expect("UTF-8 temp path").to_owned()
}

fn mock_env(vars: HashMap<&'static str, String>) -> MockEnv {
    let mut env = MockEnv::new();
    env.expect_string()
        .times(0..)
        .returning(move |key| vars.get(key).cloned());
    env
}

#[fixture]
fn good_key() -> NamedTempFile {
    key_file(SESSION_KEY_MIN_LEN)
}

fn release_vars(key: &NamedTempFile) -> HashMap<&'static str, String> {
    HashMap::from([
        (KEY_FILE_ENV, path_of(key)),
        (COOKIE_SECURE_ENV, "1".to_owned()),
        (SAMESITE_ENV, "Strict".to_owned()),
        (ALLOW_EPHEMERAL_ENV, "0".to_owned()),
    ])
}

#[rstest]
fn release_accepts_explicit_settings(good_key: NamedTempFile) {
    let mut vars = release_vars(&good_key);
    vars.insert(TTL_HOURS_ENV, "12".to_owned());
    let settings =
        session_settings_from_env(&mock_env(vars), BuildMode::Release).expect("valid settings");
    assert!(settings.cookie_secure);
    assert_eq!(settings.same_site, SameSite::Strict);
    assert_eq!(settings.ttl, Duration::hours(12));
}

#[rstest]
#[case(COOKIE_SECURE_ENV)]
#[case(SAMESITE_ENV)]
#[case(ALLOW_EPHEMERAL_ENV)]
fn release_requires_every_toggle(good_key: NamedTempFile, #[case] missing: &'static str) {
    let mut vars = release_vars(&good_key);
    vars.remove(missing);
    let err = session_settings_from_env(&mock_env(vars), BuildMode::Release)
        .err()
        .expect("missing toggle rejected");
    assert!(matches!(err, SessionConfigError::MissingEnv { name } if name == missing));
}

#[rstest]
#[case(COOKIE_SECURE_ENV, "maybe")]
#[case(SAMESITE_ENV, "sideways")]
#[case(ALLOW_EPHEMERAL_ENV, "")]
#[case(TTL_HOURS_ENV, "0")]
fn release_rejects_malformed_values(
    good_key: NamedTempFile,
    #[case] name: &'static str,
    #[case] value: &str,
) {
    let mut vars = release_vars(&good_key);
    vars.insert(name, value.to_owned());
    let err = session_settings_from_env(&mock_env(vars), BuildMode::Release)
        .err()
        .expect("malformed toggle rejected");
    assert!(matches!(err, SessionConfigError::InvalidEnv { name: got, .. } if got == name));
}

#[rstest]
fn release_refuses_ephemeral_keys(good_key: NamedTempFile) {
    let mut vars = release_vars(&good_key);
    vars.insert(ALLOW_EPHEMERAL_ENV, "yes".to_owned());
    let err = session_settings_from_env(&mock_env(vars), BuildMode::Release)
        .err()
        .expect("ephemeral rejected");
    assert!(matches!(err, SessionConfigError::EphemeralNotAllowed));
}

#[rstest]
fn release_refuses_same_site_none_without_secure(good_key: NamedTempFile) {
    let mut vars = release_vars(&good_key);
    vars.insert(COOKIE_SECURE_ENV, "0".to_owned());
    vars.insert(SAMESITE_ENV, "None".to_owned());
    let err = session_settings_from_env(&mock_env(vars), BuildMode::Release)
        .err()
        .expect("insecure None rejected");
    assert!(matches!(err, SessionConfigError::InsecureSameSiteNone));
}

#[rstest]
fn release_refuses_short_keys() {
    let short = key_file(SESSION_KEY_MIN_LEN - 1);
    let err = session_settings_from_env(&mock_env(release_vars(&short)), BuildMode::Release)
        .err()
        .expect("short key rejected");
    assert!(matches!(
        err,
        SessionConfigError::KeyTooShort { length, .. } if length == SESSION_KEY_MIN_LEN - 1
    ));
}

#[rstest]
fn release_reports_unreadable_key_files() {
    let dir = tempfile::tempdir().expect("temp dir");
    let missing = dir.path().join("absent");
    let mut vars = HashMap::from([
        (COOKIE_SECURE_ENV, "1".to_owned()),
        (SAMESITE_ENV, "Lax".to_owned()),
        (ALLOW_EPHEMERAL_ENV, "0".to_owned()),
    ]);
    vars.insert(KEY_FILE_ENV, missing.to_string_lossy().into_owned());
    let err = session_settings_from_env(&mock_env(vars), BuildMode::Release)
        .err()
        .expect("missing key rejected");
    assert!(matches!(err, SessionConfigError::KeyRead { .. }));
}

#[rstest]
fn debug_falls_back_to_development_defaults() {
    let dir = tempfile::tempdir().expect("temp dir");
    let vars = HashMap::from([(
        KEY_FILE_ENV,
        dir.path().join("absent").to_string_lossy().into_owned(),
    )]);
    let settings =
        session_settings_from_env(&mock_env(vars), BuildMode::Debug).expect("debug defaults");
    assert!(settings.cookie_secure);
    assert_eq!(settings.same_site, SameSite::Lax);
    assert_eq!(settings.ttl, Duration::hours(DEFAULT_TTL_HOURS));
}

#[rstest]
fn debug_tolerates_malformed_values(good_key: NamedTempFile) {
    let vars = HashMap::from([
        (KEY_FILE_ENV, path_of(&good_key)),
        (COOKIE_SECURE_ENV, "maybe".to_owned()),
        (SAMESITE_ENV, "sideways".to_owned()),
        (TTL_HOURS_ENV, "-3".to_owned()),
    ]);
    let settings =
        session_settings_from_env(&mock_env(vars), BuildMode::Debug).expect("debug defaults");
    assert!(settings.cookie_secure);
    assert_eq!(settings.same_site, SameSite::Lax);
    assert_eq!(settings.ttl, Duration::hours(DEFAULT_TTL_HOURS));
}

#[rstest]
fn same_key_material_derives_the_same_key(good_key: NamedTempFile) {
    let first = session_settings_from_env(&mock_env(release_vars(&good_key)), BuildMode::Release)
        .expect("settings");
    let second = session_settings_from_env(&mock_env(release_vars(&good_key)), BuildMode::Release)
        .expect("settings");
    assert_eq!(
        fingerprint::key_fingerprint(&first.key),
        fingerprint::key_fingerprint(&second.key)
    );
}
