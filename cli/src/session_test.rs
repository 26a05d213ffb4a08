use super::*;

fn sample() -> Session {
    Session {
        token: "abc.def.ghi".into(),
        user: SessionUser {
            id: Uuid::new_v4(),
            name: "Ann".into(),
            email: "ann@example.com".into(),
            phone: "5551234567".into(),
        },
    }
}

#[test]
fn save_then_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("session.json");
    let session = sample();

    save(&path, &session).unwrap();
    assert_eq!(load(&path).unwrap(), Some(session));
}

#[test]
fn missing_file_is_no_session() {
    let dir = tempfile::tempdir().unwrap();
    assert_eq!(load(&dir.path().join("absent.json")).unwrap(), None);
}

#[test]
fn clear_removes_and_tolerates_missing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    save(&path, &sample()).unwrap();

    clear(&path).unwrap();
    assert!(!path.exists());
    clear(&path).unwrap();
}

#[test]
fn corrupt_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    std::fs::write(&path, "{not json").unwrap();
    assert!(matches!(load(&path), Err(CliError::InvalidJson(_))));
}

#[test]
fn display_name_falls_back_to_email() {
    let mut user = sample().user;
    assert_eq!(user.display_name(), "Ann");
    user.name = " ".into();
    assert_eq!(user.display_name(), "ann@example.com");
}

#[test]
fn default_path_ends_in_huddle_dir() {
    let path = default_path();
    assert!(path.ends_with(".huddle/session.json"));
}

#[cfg(unix)]
#[test]
fn saved_session_is_owner_only() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    std::fs::write(&path, "stale").unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();

    let session = sample();
    save(&path, &session).unwrap();
    let mode = std::fs::metadata(&path).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
    assert_eq!(load(&path).unwrap(), Some(session));
}
