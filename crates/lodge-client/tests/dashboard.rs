mod support;

use axum::body::Bytes;
use axum::http::{header, Method, StatusCode};
use serde_json::json;

use lodge_client_lib::error::ClientError;
use lodge_client_lib::nav::Route;
use lodge_client_lib::notify::ToastLevel;
use lodge_client_lib::views::{DashboardMode, DashboardView, ModalEvent};
use support::{Canned, MockBackend, Seed};

fn users() -> serde_json::Value {
    json!([
        {"id": 1, "email": "user1@test.com", "username": "user1", "role": "MASON"},
        {"id": 2, "email": "user2@test.com", "username": "user2", "role": "SILVER"}
    ])
}

#[tokio::test]
async fn test_member_view_never_lists_users() {
    let mock = MockBackend::start().await;
    mock.on_json(Method::GET, "/users/", 200, users());
    let state = mock.state(Seed::member("GOLDEN", false));

    let view = DashboardView::mount(&state).await.unwrap();

    assert_eq!(view.mode, DashboardMode::Member);
    assert_eq!(view.title(), "User Dashboard");
    assert!(view.users.is_empty());
    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn test_inquisitor_view_lists_users() {
    let mock = MockBackend::start().await;
    mock.on_json(Method::GET, "/users/", 200, users());
    let state = mock.state(Seed::member("GOLDEN", true));

    let view = DashboardView::mount(&state).await.unwrap();

    assert_eq!(view.title(), "Inquisitor Dashboard");
    assert_eq!(view.users.len(), 2);
    assert_eq!(view.users[0].email, "user1@test.com");
    assert!(!view.loading_users);
    assert!(!view.can_nominate());
}

#[tokio::test]
async fn test_listing_401_asks_for_login() {
    let mock = MockBackend::start().await;
    mock.on_json(
        Method::GET,
        "/users/",
        401,
        json!({"detail": "Invalid token."}),
    );
    let state = mock.state(Seed::member("MASON", true));

    let view = DashboardView::mount(&state).await.unwrap();

    assert!(view.users.is_empty());
    assert!(state.notifier.contains(
        ToastLevel::Error,
        "Authentication error. Please log in again."
    ));
}

#[tokio::test]
async fn test_nominate_selected_user() {
    let mock = MockBackend::start().await;
    mock.on_json(Method::GET, "/users/", 200, users());
    mock.on_json(
        Method::POST,
        "/votes/nominate-ban/",
        201,
        json!({"id": 1, "target_username": "user1"}),
    );
    let state = mock.state(Seed::member("MASON", true));
    let mut view = DashboardView::mount(&state).await.unwrap();

    assert!(matches!(
        view.nominate(&state).await,
        Err(ClientError::Unavailable(_))
    ));

    view.select_user(1);
    let receipt = view.nominate(&state).await.unwrap().unwrap();

    assert_eq!(receipt.id, 1);
    assert!(state.notifier.contains(
        ToastLevel::Success,
        "User user1 nominated. Voting started (ID: 1)"
    ));
    let sent = mock.requests_to(Method::POST, "/votes/nominate-ban/");
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].json(), json!({"target_user_id": 1}));
}

#[tokio::test]
async fn test_nomination_rejection_is_verbatim() {
    let mock = MockBackend::start().await;
    mock.on_json(Method::GET, "/users/", 200, users());
    mock.on_json(
        Method::POST,
        "/votes/nominate-ban/",
        400,
        json!({"detail": "Already nominated"}),
    );
    let state = mock.state(Seed::member("MASON", true));
    let mut view = DashboardView::mount(&state).await.unwrap();

    view.select_user(2);
    assert!(view.nominate(&state).await.unwrap().is_none());

    assert_eq!(state.notifier.messages(), vec!["Already nominated".to_string()]);
    assert!(!view.nominating);
}

#[tokio::test]
async fn test_architect_controls_visibility() {
    let mock = MockBackend::start().await;
    for (role, visible) in [
        ("MASON", false),
        ("SILVER", false),
        ("GOLDEN", false),
        ("ARCHITECT", true),
    ] {
        let state = mock.state(Seed::member(role, false));
        let view = DashboardView::mount(&state).await.unwrap();
        assert_eq!(view.shows_architect_actions(), visible, "{role}");
    }
}

#[tokio::test]
async fn test_compromised_aborts_without_side_effects() {
    let mock = MockBackend::start().await;
    mock.on_json(Method::POST, "/compromised/", 200, json!({"status": "ok"}));
    let state = mock.state(Seed::member("ARCHITECT", false));
    let mut view = DashboardView::mount(&state).await.unwrap();

    for event in [ModalEvent::Cancel, ModalEvent::Backdrop, ModalEvent::Escape] {
        view.request_compromised().unwrap();
        assert!(!view.handle_modal(&state, event).await.unwrap());
        assert!(!view.compromise_modal.is_open());
    }

    assert!(mock.requests().is_empty());
    assert!(state.session().unwrap().is_entry_verified());
}

#[tokio::test]
async fn test_compromised_confirm_runs_protocol() {
    let mock = MockBackend::start().await;
    mock.on_json(Method::POST, "/compromised/", 200, json!({"status": "ok"}));
    let state = mock.state(Seed::member("ARCHITECT", false));
    let mut view = DashboardView::mount(&state).await.unwrap();

    view.request_compromised().unwrap();
    assert!(view
        .handle_modal(&state, ModalEvent::Confirm)
        .await
        .unwrap());

    assert_eq!(mock.requests_to(Method::POST, "/compromised/").len(), 1);
    assert!(state.session().unwrap().storage().is_empty().unwrap());
    assert_eq!(state.navigator.current(), Route::Entry);
}

#[tokio::test]
async fn test_export_backup_writes_server_file() {
    let mock = MockBackend::start().await;
    mock.on(
        Method::GET,
        "/backup/",
        Canned {
            status: StatusCode::OK,
            body: Bytes::from_static(b"SQLite format 3\0payload"),
            headers: vec![
                (header::CONTENT_TYPE, "application/octet-stream".into()),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"db_backup.sqlite3\"".into(),
                ),
            ],
        },
    );
    let state = mock.state(Seed::member("ARCHITECT", false));
    let mut view = DashboardView::mount(&state).await.unwrap();
    let dir = tempfile::tempdir().unwrap();

    let path = view
        .export_backup(&state, dir.path())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(path, dir.path().join("db_backup.sqlite3"));
    assert_eq!(std::fs::read(&path).unwrap(), b"SQLite format 3\0payload");
    assert_eq!(state.notifier.toasts()[0].level, ToastLevel::Success);
}

#[tokio::test]
async fn test_backup_requires_architect() {
    let mock = MockBackend::start().await;
    let state = mock.state(Seed::member("GOLDEN", true));
    mock.on_json(Method::GET, "/users/", 200, users());
    let mut view = DashboardView::mount(&state).await.unwrap();
    let dir = tempfile::tempdir().unwrap();

    assert!(matches!(
        view.export_backup(&state, dir.path()).await,
        Err(ClientError::NotPermitted(_))
    ));
    assert!(mock.requests_to(Method::GET, "/backup/").is_empty());
}

#[tokio::test]
async fn test_import_backup_uploads_file_field() {
    let mock = MockBackend::start().await;
    mock.on_json(Method::POST, "/backup/", 200, json!({"status": "restored"}));
    let state = mock.state(Seed::member("ARCHITECT", false));
    let mut view = DashboardView::mount(&state).await.unwrap();

    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("restore.sqlite3");
    std::fs::write(&file, b"backup-bytes").unwrap();

    assert!(view.import_backup(&state, &file).await.unwrap());

    let sent = mock.requests_to(Method::POST, "/backup/");
    assert_eq!(sent.len(), 1);
    assert!(sent[0]
        .content_type
        .as_deref()
        .unwrap()
        .starts_with("multipart/form-data"));
    let body = String::from_utf8_lossy(&sent[0].body);
    assert!(body.contains("name=\"file\""));
    assert!(body.contains("filename=\"restore.sqlite3\""));
    assert!(body.contains("backup-bytes"));
    assert!(state
        .notifier
        .contains(ToastLevel::Success, "Backup restored successfully."));
}

#[tokio::test]
async fn test_import_failure_reported() {
    let mock = MockBackend::start().await;
    mock.on_json(Method::POST, "/backup/", 400, json!({"error": "Invalid backup file"}));
    let state = mock.state(Seed::member("ARCHITECT", false));
    let mut view = DashboardView::mount(&state).await.unwrap();

    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("broken.sqlite3");
    std::fs::write(&file, b"junk").unwrap();

    assert!(!view.import_backup(&state, &file).await.unwrap());
    assert!(state.notifier.contains(
        ToastLevel::Error,
        "Backup restore failed: Invalid backup file"
    ));
}

fn backup_with_disposition(disposition: &str) -> Canned {
    Canned {
        status: StatusCode::OK,
        body: Bytes::from_static(b"SQLite format 3\0payload"),
        headers: vec![
            (header::CONTENT_TYPE, "application/octet-stream".into()),
            (header::CONTENT_DISPOSITION, disposition.into()),
        ],
    }
}

#[tokio::test]
async fn test_export_dot_dot_name_falls_back_to_default() {
    let mock = MockBackend::start().await;
    mock.on(
        Method::GET,
        "/backup/",
        backup_with_disposition("attachment; filename=\"..\""),
    );
    let state = mock.state(Seed::member("ARCHITECT", false));
    let mut view = DashboardView::mount(&state).await.unwrap();
    let dir = tempfile::tempdir().unwrap();

    let path = view
        .export_backup(&state, dir.path())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(path.parent(), Some(dir.path()));
    let name = path.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("lodge_backup_"), "{name}");
    assert!(name.ends_with(".sqlite3"), "{name}");
    assert_eq!(std::fs::read(&path).unwrap(), b"SQLite format 3\0payload");
    assert!(state
        .notifier
        .contains(ToastLevel::Success, &format!("Backup downloaded: {name}")));
}

#[tokio::test]
async fn test_export_write_failure_is_notified() {
    let mock = MockBackend::start().await;
    mock.on(
        Method::GET,
        "/backup/",
        backup_with_disposition("attachment; filename=\"db_backup.sqlite3\""),
    );
    let state = mock.state(Seed::member("ARCHITECT", false));
    let mut view = DashboardView::mount(&state).await.unwrap();
    let dir = tempfile::tempdir().unwrap();
    let not_a_dir = dir.path().join("occupied");
    std::fs::write(&not_a_dir, b"file").unwrap();

    assert!(view
        .export_backup(&state, &not_a_dir)
        .await
        .unwrap()
        .is_none());

    let toasts = state.notifier.toasts();
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].level, ToastLevel::Error);
    assert!(toasts[0].message.starts_with("Backup export failed: "));
}
