mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use chrono::Utc;
use club_os_backend::{
    domain::services::auth_service::NewAccount,
    error::{AppError, RuleViolation},
};
use common::{parse_body, session_cookie, TestApp};
use serde_json::json;
use tower::ServiceExt;

#[tokio::test]
async fn test_login_me_logout() {
    let app = TestApp::new().await;
    app.seed_users().await;

    let (status, body) = app.post_json("/auth/login", json!({
        "email": "rahul@techclub.com", "password": "wrong",
    }), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "unauthorized");

    let (status, body) = app.post_json("/auth/login", json!({ "email": "rahul@techclub.com" }), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "missing_fields");

    let session = app.login("Rahul@TechClub.com", "tech123").await;

    let (status, body) = app.get("/auth/me", Some(&session)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["email"], "rahul@techclub.com");
    assert_eq!(body["user"]["role"], "president");
    assert_eq!(body["user"]["club"], "Tech Club");
    assert!(body["user"].get("password_hash").is_none());

    let (status, _) = app.post_json("/auth/logout", json!({}), Some(&session)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.get("/auth/me", Some(&session)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(app.count("SELECT COUNT(*) FROM sessions").await, 0);
}

#[tokio::test]
async fn test_login_sets_http_only_session_cookie() {
    let app = TestApp::new().await;
    app.seed_users().await;

    let response = app.router.clone().oneshot(
        Request::builder()
            .method("POST")
            .uri("/auth/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({ "email": "admin@clubos.com", "password": "admin123" }).to_string()))
            .unwrap()
    ).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let raw = response.headers().get(header::SET_COOKIE).unwrap().to_str().unwrap().to_string();
    assert!(raw.contains("HttpOnly"));
    assert!(raw.contains("SameSite=Lax"));
    assert!(raw.contains("Path=/"));

    let cookie = session_cookie(&response).unwrap();
    let raw_id = cookie.trim_start_matches("session=");
    assert_eq!(raw_id.len(), 64);

    // Only the hash is stored.
    let stored: String = sqlx::query_scalar("SELECT token_hash FROM sessions")
        .fetch_one(&app.pool).await.unwrap();
    assert_ne!(stored, raw_id);
    assert_eq!(stored, app.state.auth_service.hash_token(raw_id));

    let body = parse_body(response).await;
    assert_eq!(body["user"]["role"], "admin");
}

#[tokio::test]
async fn test_expired_session_is_rejected() {
    let app = TestApp::new().await;
    app.seed_users().await;

    let session = app.login("admin@clubos.com", "admin123").await;
    sqlx::query("UPDATE sessions SET expires_at = ?")
        .bind(chrono::Utc::now() - chrono::Duration::hours(1))
        .execute(&app.pool).await.unwrap();

    let (status, _) = app.get("/auth/me", Some(&session)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(app.count("SELECT COUNT(*) FROM sessions").await, 0);
}

#[tokio::test]
async fn test_unknown_session_is_unauthorized() {
    let app = TestApp::new().await;

    let (status, body) = app.get("/auth/me", Some("session=forged")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "unauthorized");
}

#[tokio::test]
async fn test_signup_with_invitation_joins_club() {
    let app = TestApp::new().await;
    let token = app.invite("carol@x.com", "Carol", "Tech Club", "Rahul Kumar").await;

    let response = app.router.clone().oneshot(
        Request::builder()
            .method("POST")
            .uri("/auth/signup")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({
                "name": "Carol",
                "email": "carol@x.com",
                "password": "secret99",
                "invitationToken": token,
            }).to_string()))
            .unwrap()
    ).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let session = session_cookie(&response).expect("signup opens a session");

    let body = parse_body(response).await;
    assert_eq!(body["invitationAccepted"], true);
    assert_eq!(body["user"]["role"], "member");
    assert_eq!(body["user"]["club"], "Tech Club");

    let membership = app.state.membership_repo
        .find_by_email_and_club("carol@x.com", "Tech Club").await.unwrap();
    assert!(membership.is_some());

    let sent = app.email.sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[1].to_email, "carol@x.com");
    assert_eq!(sent[1].subject, "Welcome to Club OS!");

    let (status, body) = app.get("/auth/me", Some(&session)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["name"], "Carol");
}

#[tokio::test]
async fn test_signup_survives_welcome_email_failure() {
    let app = TestApp::new().await;
    app.email.set_failing(true);

    let (status, body) = app.post_json("/auth/signup", json!({
        "name": "Dev", "email": "dev@x.com", "password": "secret99",
    }), None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["invitationAccepted"], false);
    assert!(body["user"]["club"].is_null());

    assert_eq!(app.count("SELECT COUNT(*) FROM users").await, 1);
    assert_eq!(app.count("SELECT COUNT(*) FROM mail_logs WHERE status = 'FAILED'").await, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_signups_with_two_invitations_create_one_account() {
    let app = TestApp::new().await;
    let tech = app.invite("carol@x.com", "Carol", "Tech Club", "Rahul Kumar").await;
    let sports = app.invite("carol@x.com", "Carol", "Sports Club", "Amit Singh").await;

    let signup = |token: String| {
        let router = app.router.clone();
        async move {
            router.oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/auth/signup")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(json!({
                        "name": "Carol",
                        "email": "carol@x.com",
                        "password": "secret99",
                        "invitationToken": token,
                    }).to_string()))
                    .unwrap()
            ).await.unwrap().status()
        }
    };

    let (first, second) = tokio::join!(signup(tech), signup(sports));
    let created = [first, second].iter().filter(|s| **s == StatusCode::CREATED).count();
    assert_eq!(created, 1, "statuses: {} {}", first, second);

    assert_eq!(app.count("SELECT COUNT(*) FROM users WHERE email = 'carol@x.com'").await, 1);
    assert_eq!(app.count("SELECT COUNT(*) FROM memberships WHERE email = 'carol@x.com'").await, 1);
    assert_eq!(app.count("SELECT COUNT(*) FROM invitations WHERE email = 'carol@x.com' AND status = 'accepted'").await, 1);
    assert_eq!(app.count("SELECT COUNT(*) FROM invitations WHERE email = 'carol@x.com' AND status = 'pending'").await, 1);

    // The account's club matches the one membership that was created.
    let user = app.state.user_repo.find_by_email("carol@x.com").await.unwrap().unwrap();
    let club = user.club.clone().unwrap();
    let membership = app.state.membership_repo.find_by_email_and_club("carol@x.com", &club).await.unwrap();
    assert!(membership.is_some());
}

#[tokio::test]
async fn test_failed_account_insert_leaves_invitation_pending() {
    let app = TestApp::new().await;
    let token = app.invite("carol@x.com", "Carol", "Tech Club", "Rahul Kumar").await;

    // Someone registers the address between the availability check and acceptance.
    app.session_as("Carol", "carol@x.com", "member", None).await;

    let prepared = app.state.auth_service.prepare_account(NewAccount {
        email: "carol@x.com".to_string(),
        name: "Carol".to_string(),
        password: "secret99".to_string(),
        role: "member".to_string(),
        club: None,
    }).unwrap();
    let result = app.state.invitation_service.accept_for_new_user(&token, &prepared).await;
    assert!(matches!(result, Err(AppError::Rule(RuleViolation::EmailAlreadyRegistered))));

    let invitation = app.state.invitation_repo.find_by_token(&token).await.unwrap().unwrap();
    assert!(invitation.is_pending());
    assert!(invitation.accepted_at.is_none());
    assert_eq!(app.count("SELECT COUNT(*) FROM memberships").await, 0);
    assert_eq!(app.count("SELECT COUNT(*) FROM users WHERE email = 'carol@x.com'").await, 1);

    // The same invitation is still usable afterwards.
    let (status, _) = app.post_json("/invitation/accept", json!({
        "token": token, "userEmail": "carol@x.com", "userName": "Carol",
    }), None).await;
    assert_eq!(status, StatusCode::OK);
    let accepted = app.state.invitation_repo.find_by_token(&token).await.unwrap().unwrap();
    assert!(accepted.accepted_at.unwrap() <= Utc::now());
}

#[tokio::test]
async fn test_signup_rejections() {
    let app = TestApp::new().await;
    app.seed_users().await;

    let (status, body) = app.post_json("/auth/signup", json!({
        "name": "Rahul", "email": "rahul@techclub.com", "password": "secret99",
    }), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "email_already_registered");

    let (status, body) = app.post_json("/auth/signup", json!({
        "name": "Short", "email": "short@x.com", "password": "abc",
    }), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_input");

    // Pending invitation without its token
    app.invite("carol@x.com", "Carol", "Tech Club", "Rahul Kumar").await;
    let (status, body) = app.post_json("/auth/signup", json!({
        "name": "Carol", "email": "carol@x.com", "password": "secret99",
    }), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "email_already_registered");

    let (status, body) = app.post_json("/auth/signup", json!({
        "name": "Zed", "email": "zed@x.com", "password": "secret99", "invitationToken": "inv_0_bogus",
    }), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "invitation_not_found");

    let zed = app.state.user_repo.find_by_email("zed@x.com").await.unwrap();
    assert!(zed.is_none());
}

#[tokio::test]
async fn test_members_roster_and_removal() {
    let app = TestApp::new().await;
    app.seed_users().await;

    let token = app.invite("bob@x.com", "Bob", "Tech Club", "Rahul Kumar").await;
    app.post_json("/invitation/accept", json!({
        "token": token, "userEmail": "bob@x.com", "userName": "Bob",
    }), None).await;

    let (status, _) = app.get("/clubs/Tech%20Club/members", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let priya = app.login("priya@cultural.com", "cultural123").await;
    let (status, body) = app.get("/clubs/Tech%20Club/members", Some(&priya)).await;
    assert_eq!(status, StatusCode::OK);
    let members = body.as_array().unwrap().clone();
    assert_eq!(members.len(), 1);
    let member_id = members[0]["id"].as_str().unwrap().to_string();

    let uri = format!("/clubs/Tech%20Club/members/{}", member_id);
    let (status, _) = app.delete(&uri, Some(&priya)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Wrong club in the path
    let rahul = app.login("rahul@techclub.com", "tech123").await;
    let amit = app.login("amit@sports.com", "sports123").await;
    let (status, _) = app.delete(&format!("/clubs/Sports%20Club/members/{}", member_id), Some(&amit)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app.delete(&uri, Some(&rahul)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "deleted");

    let (status, _) = app.delete(&uri, Some(&rahul)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(app.count("SELECT COUNT(*) FROM memberships").await, 0);
}
