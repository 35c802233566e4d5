use crate::test_utils::{error_message, register, send, service, test_settings};
use axum::http::{Method, StatusCode};
use portal_backend::ServiceKind;
use serde_json::json;

#[tokio::test]
async fn test_patient_books_and_lists_appointment() {
    let auth = service(ServiceKind::Auth, test_settings());
    let citas = service(ServiceKind::Citas, test_settings());
    let (user_id, token) = register(&auth, "a@x.com").await;

    let (status, cita) = send(
        &citas,
        Method::POST,
        "/citas",
        Some(&token),
        Some(json!({ "medicoId": "m1", "fechaHora": "2025-01-01T10:00:00Z" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(cita["pacienteId"], user_id.as_str());
    assert_eq!(cita["medicoId"], "m1");
    assert_eq!(cita["estado"], "pendiente");
    assert!(cita["id"].is_string());
    assert!(cita["createdAt"].is_string());

    let (status, list) = send(&citas, Method::GET, "/citas", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let list = list.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["id"], cita["id"]);
}

#[tokio::test]
async fn test_listing_is_scoped_to_caller_and_sorted() {
    let auth = service(ServiceKind::Auth, test_settings());
    let citas = service(ServiceKind::Citas, test_settings());
    let (_, alice) = register(&auth, "alice@x.com").await;
    let (_, bob) = register(&auth, "bob@x.com").await;

    for fecha in ["2025-01-01T10:00:00Z", "2025-03-01T10:00:00Z", "2025-02-01T10:00:00Z"] {
        let (status, _) = send(
            &citas,
            Method::POST,
            "/citas",
            Some(&alice),
            Some(json!({ "medicoId": "m1", "fechaHora": fecha, "motivo": "control" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, list) = send(&citas, Method::GET, "/citas", Some(&alice), None).await;
    let fechas: Vec<&str> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["fechaHora"].as_str().unwrap())
        .collect();
    assert_eq!(fechas.len(), 3);
    assert!(fechas[0].starts_with("2025-03-01"));
    assert!(fechas[1].starts_with("2025-02-01"));
    assert!(fechas[2].starts_with("2025-01-01"));

    let (status, list) = send(&citas, Method::GET, "/citas", Some(&bob), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list, json!([]));
}

#[tokio::test]
async fn test_appointment_validation() {
    let auth = service(ServiceKind::Auth, test_settings());
    let citas = service(ServiceKind::Citas, test_settings());
    let (_, token) = register(&auth, "a@x.com").await;

    let (status, body) = send(
        &citas,
        Method::POST,
        "/citas",
        Some(&token),
        Some(json!({ "medicoId": "m1" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_message(&body), "medicoId and fechaHora are required");

    for incomplete in [
        json!({ "fechaHora": "2025-01-01T10:00:00Z" }),
        json!({ "medicoId": "", "fechaHora": "2025-01-01T10:00:00Z" }),
    ] {
        let (status, body) = send(&citas, Method::POST, "/citas", Some(&token), Some(incomplete)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error_message(&body), "medicoId and fechaHora are required");
    }

    let (status, _) = send(
        &citas,
        Method::POST,
        "/citas",
        Some(&token),
        Some(json!({ "medicoId": "m1", "fechaHora": "next tuesday" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, list) = send(&citas, Method::GET, "/citas", Some(&token), None).await;
    assert_eq!(list, json!([]));
}

#[tokio::test]
async fn test_appointments_require_a_session() {
    let citas = service(ServiceKind::Citas, test_settings());

    let (status, body) = send(&citas, Method::GET, "/citas", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_message(&body), "No token");

    let (status, body) = send(
        &citas,
        Method::POST,
        "/citas",
        Some("forged"),
        Some(json!({ "medicoId": "m1", "fechaHora": "2025-01-01T10:00:00Z" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_message(&body), "Invalid token");
}
