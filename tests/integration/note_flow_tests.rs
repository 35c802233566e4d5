use crate::test_utils::{error_message, register, send, service, test_settings};
use axum::http::{Method, StatusCode};
use portal_backend::{config::Settings, ServiceKind};
use serde_json::json;
use tempfile::TempDir;

async fn write_three_notes(notas: &axum::Router, token: &str) -> Vec<String> {
    let mut ids = Vec::new();
    for plan in ["uno", "dos", "tres"] {
        let (status, note) = send(
            notas,
            Method::POST,
            "/citas/c1/nota",
            Some(token),
            Some(json!({ "S": "dolor", "P": plan })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        ids.push(note["id"].as_str().unwrap().to_string());
    }
    ids
}

async fn notes_flow(settings: Settings) {
    let auth = service(ServiceKind::Auth, test_settings());
    let notas = service(ServiceKind::Notas, settings);
    let (user_id, token) = register(&auth, "medico@x.com").await;

    let (status, note) = send(
        &notas,
        Method::POST,
        "/citas/c1/nota",
        Some(&token),
        Some(json!({ "S": "dolor de cabeza", "O": "", "A": "migraña" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(note["citaId"], "c1");
    assert_eq!(note["autorId"], user_id.as_str());
    assert_eq!(note["S"], "dolor de cabeza");
    assert!(note["O"].is_null());
    assert!(note["P"].is_null());

    let ids = write_three_notes(&notas, &token).await;
    let (status, list) = send(&notas, Method::GET, "/citas/c1/nota", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let listed: Vec<&str> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["id"].as_str().unwrap())
        .collect();
    assert_eq!(listed.len(), 4);
    assert_eq!(listed[0], ids[2]);
    assert_eq!(listed[3], note["id"].as_str().unwrap());

    let (status, other) = send(&notas, Method::GET, "/citas/c2/nota", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(other, json!([]));
}

#[tokio::test]
async fn test_notes_in_memory() {
    notes_flow(test_settings()).await;
}

#[tokio::test]
async fn test_notes_on_disk() {
    let dir = TempDir::new().unwrap();
    let settings = Settings {
        notes_dir: Some(dir.path().to_path_buf()),
        ..test_settings()
    };
    notes_flow(settings).await;
}

#[tokio::test]
async fn test_empty_note_is_rejected() {
    let auth = service(ServiceKind::Auth, test_settings());
    let notas = service(ServiceKind::Notas, test_settings());
    let (_, token) = register(&auth, "medico@x.com").await;

    for body in [json!({}), json!({ "S": "", "O": "  " })] {
        let (status, err) = send(&notas, Method::POST, "/citas/c1/nota", Some(&token), Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error_message(&err), "At least one of S, O, A, P is required");
    }

    let (_, list) = send(&notas, Method::GET, "/citas/c1/nota", Some(&token), None).await;
    assert_eq!(list, json!([]));
}

#[tokio::test]
async fn test_unsafe_appointment_id_is_rejected() {
    let auth = service(ServiceKind::Auth, test_settings());
    let notas = service(ServiceKind::Notas, test_settings());
    let (_, token) = register(&auth, "medico@x.com").await;

    let (status, _) = send(
        &notas,
        Method::POST,
        "/citas/bad.id/nota",
        Some(&token),
        Some(json!({ "S": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_notes_require_a_session() {
    let notas = service(ServiceKind::Notas, test_settings());
    let (status, body) = send(&notas, Method::GET, "/citas/c1/nota", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_message(&body), "No token");
}
