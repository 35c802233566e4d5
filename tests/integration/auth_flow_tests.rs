use crate::test_utils::{error_message, register, send, send_raw, service, test_settings, TEST_SECRET};
use axum::http::{Method, StatusCode};
use chrono::Utc;
use portal_backend::{auth::TokenService, ServiceKind};
use portal_common::{Claims, Role, TokenKind};
use serde_json::json;
use std::time::Duration;

#[tokio::test]
async fn test_register_then_me_round_trip() {
    let auth = service(ServiceKind::Auth, test_settings());
    let (status, body) = send(
        &auth,
        Method::POST,
        "/auth/register",
        None,
        Some(json!({ "email": "a@x.com", "password": "secret1", "rol": "paciente", "nombre": "A" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["email"], "a@x.com");
    assert_eq!(body["user"]["rol"], "paciente");
    assert!(body["user"].get("passwordHash").is_none());
    let token = body["accessToken"].as_str().unwrap();

    for path in ["/me", "/auth/me"] {
        let (status, me) = send(&auth, Method::GET, path, Some(token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(me["user"]["id"], body["user"]["id"]);
        assert_eq!(me["user"]["email"], "a@x.com");
        assert_eq!(me["user"]["nombre"], "A");
    }
}

#[tokio::test]
async fn test_register_defaults_role_and_name() {
    let auth = service(ServiceKind::Auth, test_settings());
    let (status, body) = send(
        &auth,
        Method::POST,
        "/register",
        None,
        Some(json!({ "email": "b@x.com", "password": "pw" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["rol"], "paciente");
    assert_eq!(body["user"]["nombre"], "Usuario");
}

#[tokio::test]
async fn test_duplicate_email_is_conflict() {
    let auth = service(ServiceKind::Auth, test_settings());
    register(&auth, "a@x.com").await;

    for email in ["a@x.com", " A@X.COM "] {
        let (status, body) = send(
            &auth,
            Method::POST,
            "/auth/register",
            None,
            Some(json!({ "email": email, "password": "other" })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "DUP_001");
        assert_eq!(error_message(&body), "Email already registered");
    }
}

#[tokio::test]
async fn test_concurrent_identical_registrations_yield_one_user() {
    let auth = service(ServiceKind::Auth, test_settings());
    let mut tasks = tokio::task::JoinSet::new();
    for _ in 0..8 {
        let auth = auth.clone();
        tasks.spawn(async move {
            send(
                &auth,
                Method::POST,
                "/auth/register",
                None,
                Some(json!({ "email": "race@x.com", "password": "secret1" })),
            )
            .await
            .0
        });
    }

    let mut created = 0;
    let mut conflicts = 0;
    while let Some(status) = tasks.join_next().await {
        match status.unwrap() {
            StatusCode::CREATED => created += 1,
            StatusCode::CONFLICT => conflicts += 1,
            other => panic!("unexpected status {other}"),
        }
    }
    assert_eq!(created, 1);
    assert_eq!(conflicts, 7);
}

#[tokio::test]
async fn test_registration_validation() {
    let auth = service(ServiceKind::Auth, test_settings());
    let cases = [
        json!({ "password": "secret1" }),
        json!({ "email": "", "password": "secret1" }),
        json!({ "email": "a@x.com" }),
        json!({ "email": "not-an-email", "password": "secret1" }),
        json!({ "email": "a@x.com", "password": "secret1", "rol": "superuser" }),
    ];
    for case in cases {
        let (status, body) = send(&auth, Method::POST, "/auth/register", None, Some(case.clone())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "accepted {case}");
        assert_eq!(body["error"]["code"], "VAL_001");
    }

    let (status, body) = send(
        &auth,
        Method::POST,
        "/auth/register",
        None,
        Some(json!({ "email": "a@x.com", "password": "secret1", "rol": "superuser" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(error_message(&body).contains("medico"));
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let auth = service(ServiceKind::Auth, test_settings());
    let (status, body) = send_raw(&auth, "/auth/login", "{not json").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VAL_001");
}

#[tokio::test]
async fn test_login_success_and_uniform_failures() {
    let auth = service(ServiceKind::Auth, test_settings());
    let (id, _) = register(&auth, "a@x.com").await;

    let (status, body) = send(
        &auth,
        Method::POST,
        "/login",
        None,
        Some(json!({ "email": "A@x.com", "password": "secret1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["id"], id.as_str());
    let token = body["accessToken"].as_str().unwrap();
    let (status, _) = send(&auth, Method::GET, "/me", Some(token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (wrong_status, wrong) = send(
        &auth,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "email": "a@x.com", "password": "secret2" })),
    )
    .await;
    let (unknown_status, unknown) = send(
        &auth,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "email": "nobody@x.com", "password": "secret1" })),
    )
    .await;
    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong, unknown);
    assert_eq!(error_message(&wrong), "Invalid credentials");
}

#[tokio::test]
async fn test_oversized_password_login_is_invalid_credentials() {
    let auth = service(ServiceKind::Auth, test_settings());
    register(&auth, "a@x.com").await;
    let long = "x".repeat(1025);

    for email in ["a@x.com", "nobody@x.com"] {
        let (status, body) = send(
            &auth,
            Method::POST,
            "/auth/login",
            None,
            Some(json!({ "email": email, "password": long })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["code"], "AUTH_001");
        assert_eq!(error_message(&body), "Invalid credentials");
    }
}

#[tokio::test]
async fn test_login_requires_both_fields() {
    let auth = service(ServiceKind::Auth, test_settings());
    let (status, _) = send(
        &auth,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "email": "a@x.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_me_rejects_bad_tokens() {
    let auth = service(ServiceKind::Auth, test_settings());

    let (status, body) = send(&auth, Method::GET, "/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_message(&body), "No token");

    let foreign = TokenService::new(b"someone-else", Duration::from_secs(60), Duration::from_secs(60));
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: "u1".into(),
        email: "a@x.com".into(),
        rol: Role::Patient,
        nombre: "A".into(),
        kind: Some(TokenKind::Access),
        iat: now - 120,
        exp: now + 600,
    };
    let wrong_secret = foreign.sign(&claims).unwrap();

    let ours = TokenService::new(TEST_SECRET.as_bytes(), Duration::from_secs(60), Duration::from_secs(60));
    let expired = ours
        .sign(&Claims {
            exp: now - 1,
            ..claims.clone()
        })
        .unwrap();

    for token in [wrong_secret, expired] {
        let (status, body) = send(&auth, Method::GET, "/me", Some(&token), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(error_message(&body), "Invalid token");
    }
}

#[tokio::test]
async fn test_register_token_mode() {
    let mut settings = test_settings();
    settings.registration_token = TokenKind::Register;
    let auth = service(ServiceKind::Auth, settings);

    let (status, body) = send(
        &auth,
        Method::POST,
        "/auth/register",
        None,
        Some(json!({ "email": "a@x.com", "password": "secret1" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body.get("accessToken").is_none());
    assert!(body["message"].is_string());
    let register_token = body["registerToken"].as_str().unwrap();

    let (status, body) = send(&auth, Method::GET, "/me", Some(register_token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_message(&body), "Invalid token");

    let (status, _) = send(
        &auth,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "email": "a@x.com", "password": "secret1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_token_from_auth_is_accepted_by_other_services() {
    let auth = service(ServiceKind::Auth, test_settings());
    let citas = service(ServiceKind::Citas, test_settings());
    let (_, token) = register(&auth, "a@x.com").await;

    let (status, body) = send(&citas, Method::GET, "/citas", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}
