use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use serde_json::json;

use photogram_server::entity::user;
use photogram_server::utils::jwt;

use crate::common::{JWT_SECRET, TestApp, routes};

mod registration {
    use super::*;

    #[tokio::test]
    async fn new_user_can_register_and_gets_owner_projection_back() {
        let app = TestApp::spawn().await;

        let res = app.register("alice", "secret123").await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert!(res.body["id"].is_number());
        assert_eq!(res.body["username"], "alice");
        assert_eq!(res.body["email"], "alice@example.com");
        assert_eq!(res.body["age"], 25);
        assert!(res.body["created_at"].is_string());
        assert!(res.body.get("password").is_none());
    }

    #[tokio::test]
    async fn stored_password_is_never_the_plaintext() {
        let app = TestApp::spawn().await;
        app.register("alice", "secret123").await;

        let stored = user::Entity::find()
            .filter(user::Column::Username.eq("alice"))
            .one(&app.db)
            .await
            .unwrap()
            .unwrap();

        assert_ne!(stored.password, "secret123");
        assert!(!stored.password.contains("secret123"));
    }

    #[tokio::test]
    async fn registering_the_same_email_twice_is_a_conflict() {
        let app = TestApp::spawn().await;
        let first = app.register("alice", "secret123").await;
        assert_eq!(first.status, 201, "{}", first.text);

        let res = app
            .post_without_token(
                routes::REGISTER,
                &json!({
                    "username": "alice2",
                    "email": "alice@example.com",
                    "password": "secret123",
                    "age": 30,
                }),
            )
            .await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn registering_a_taken_username_is_a_conflict() {
        let app = TestApp::spawn().await;
        app.register("alice", "secret123").await;

        let res = app
            .post_without_token(
                routes::REGISTER,
                &json!({
                    "username": "alice",
                    "email": "other@example.com",
                    "password": "secret123",
                    "age": 30,
                }),
            )
            .await;

        assert_eq!(res.status, 409);
    }

    #[tokio::test]
    async fn invalid_fields_are_rejected() {
        let app = TestApp::spawn().await;
        let cases = [
            json!({"username": "bob", "email": "not-an-email", "password": "secret123", "age": 20}),
            json!({"username": "bob", "email": "bob@example.com", "password": "12345", "age": 20}),
            json!({"username": "bob", "email": "bob@example.com", "password": "secret123", "age": 7}),
            json!({"username": "", "email": "bob@example.com", "password": "secret123", "age": 20}),
        ];

        for body in cases {
            let res = app.post_without_token(routes::REGISTER, &body).await;
            assert_eq!(res.status, 400, "{body}: {}", res.text);
            assert_eq!(res.body["code"], "VALIDATION_ERROR");
        }
    }

    #[tokio::test]
    async fn username_may_contain_spaces() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(
                routes::REGISTER,
                &json!({"username": "Alice Smith", "email": "alice@example.com", "password": "secret123", "age": 30}),
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["username"], "Alice Smith");
    }

    #[tokio::test]
    async fn missing_json_fields_are_a_validation_error() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(routes::REGISTER, &json!({"username": "bob"}))
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }
}

mod login {
    use super::*;

    #[tokio::test]
    async fn correct_credentials_yield_token_with_user_id() {
        let app = TestApp::spawn().await;
        let reg = app.register("alice", "secret123").await;

        let res = app
            .post_without_token(
                routes::LOGIN,
                &json!({"email": "alice@example.com", "password": "secret123"}),
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        let token = res.body["token"].as_str().unwrap();
        let claims = jwt::verify(token, JWT_SECRET).unwrap();
        assert_eq!(claims.uid, reg.id());
        assert_eq!(claims.email, "alice@example.com");
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_look_the_same() {
        let app = TestApp::spawn().await;
        app.register("alice", "secret123").await;

        let wrong_password = app
            .post_without_token(
                routes::LOGIN,
                &json!({"email": "alice@example.com", "password": "nope123"}),
            )
            .await;
        let unknown_email = app
            .post_without_token(
                routes::LOGIN,
                &json!({"email": "nobody@example.com", "password": "secret123"}),
            )
            .await;

        assert_eq!(wrong_password.status, 401);
        assert_eq!(wrong_password.body["code"], "INVALID_CREDENTIALS");
        assert_eq!(unknown_email.status, 401);
        assert_eq!(unknown_email.body, wrong_password.body);
    }
}

mod authentication {
    use super::*;

    #[tokio::test]
    async fn me_returns_the_verified_claims() {
        let app = TestApp::spawn().await;
        let (user_id, token) = app.create_authenticated_user("alice").await;

        let res = app.get_with_token(routes::ME, &token).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["id"], user_id);
        assert_eq!(res.body["email"], "alice@example.com");
    }

    #[tokio::test]
    async fn missing_header_is_token_missing() {
        let app = TestApp::spawn().await;

        let res = app.get_without_token(routes::ME).await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_MISSING");
    }

    #[tokio::test]
    async fn malformed_or_forged_tokens_are_rejected() {
        let app = TestApp::spawn().await;
        let (_, token) = app.create_authenticated_user("alice").await;
        let forged = jwt::sign(1, "alice@example.com", "some-other-secret", 1).unwrap();
        let expired = jwt::sign(1, "alice@example.com", JWT_SECRET, -2).unwrap();

        for header in [
            token.clone(),
            format!("Token {token}"),
            "Bearer ".to_string(),
            "Bearer garbage".to_string(),
            format!("Bearer {forged}"),
            format!("Bearer {expired}"),
        ] {
            let res = app.get_with_header(routes::ME, &header).await;
            assert_eq!(res.status, 401, "{header}");
            assert_eq!(res.body["code"], "TOKEN_INVALID", "{header}");
        }
    }
}
