use std::sync::Arc;

use common::storage::memory::MemoryBackend;
use reqwest::Method;

use crate::common::{FilePart, Framing, MAX_UPLOAD_BYTES, TestApp, routes};

mod create {
    use super::*;

    #[tokio::test]
    async fn owner_can_upload_a_photo() {
        let app = TestApp::spawn().await;
        let (user_id, token) = app.create_authenticated_user("alice").await;

        let res = app
            .send_photo_form(
                Method::POST,
                routes::PHOTOS,
                &[("title", "Sunset"), ("caption", "From the pier")],
                Some(FilePart::png("sunset.PNG")),
                &token,
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["title"], "Sunset");
        assert_eq!(res.body["user_id"], user_id);
        let url = res.body["photo_url"].as_str().unwrap();
        assert!(url.starts_with(&app.url("/media/photos/")), "{url}");
        assert!(url.ends_with(".png"));
        assert_eq!(app.stored_files().len(), 1);
    }

    #[tokio::test]
    async fn stored_photo_is_served_from_media() {
        let app = TestApp::spawn().await;
        let (_, token) = app.create_authenticated_user("alice").await;
        let photo = app.create_photo(&token, "Sunset").await;

        let url = photo["photo_url"].as_str().unwrap();
        let res = app.client.get(url).send().await.unwrap();

        assert_eq!(res.status(), 200);
        assert_eq!(
            res.bytes().await.unwrap().as_ref(),
            FilePart::png("x.png").bytes.as_slice()
        );
    }

    #[tokio::test]
    async fn disallowed_extension_never_reaches_storage() {
        let backend = Arc::new(MemoryBackend::new());
        let app = TestApp::spawn_with_backend(backend.clone()).await;
        let (_, token) = app.create_authenticated_user("alice").await;

        let res = app
            .send_photo_form(
                Method::POST,
                routes::PHOTOS,
                &[("title", "Anim"), ("caption", "Moving")],
                Some(FilePart::new("x.gif", b"GIF89a".to_vec())),
                &token,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
        assert!(backend.put_calls().is_empty());
    }

    #[tokio::test]
    async fn declared_oversized_upload_is_rejected_before_storage() {
        let backend = Arc::new(MemoryBackend::new());
        let app = TestApp::spawn_with_backend(backend.clone()).await;
        let (_, token) = app.create_authenticated_user("alice").await;

        let res = app
            .send_raw_upload(
                &token,
                FilePart::new("big.png", vec![0u8; 3 * 1024 * 1024]),
                Framing::DeclaredOnly,
            )
            .await;

        assert_eq!(res.status, 413, "{}", res.text);
        assert_eq!(res.body["code"], "PAYLOAD_TOO_LARGE");
        assert!(backend.put_calls().is_empty());
        let list = app.get_with_token(routes::PHOTOS, &token).await;
        assert_eq!(list.body.as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn streamed_oversized_upload_is_rejected_before_storage() {
        let backend = Arc::new(MemoryBackend::new());
        let app = TestApp::spawn_with_backend(backend.clone()).await;
        let (_, token) = app.create_authenticated_user("alice").await;

        let res = app
            .send_raw_upload(
                &token,
                FilePart::new("big.png", vec![0u8; 3 * 1024 * 1024]),
                Framing::Chunked,
            )
            .await;

        assert_eq!(res.status, 413, "{}", res.text);
        assert_eq!(res.body["code"], "PAYLOAD_TOO_LARGE");
        assert!(backend.put_calls().is_empty());
        let list = app.get_with_token(routes::PHOTOS, &token).await;
        assert_eq!(list.body.as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn streamed_upload_within_limit_is_stored() {
        let backend = Arc::new(MemoryBackend::new());
        let app = TestApp::spawn_with_backend(backend.clone()).await;
        let (_, token) = app.create_authenticated_user("alice").await;

        let res = app
            .send_raw_upload(&token, FilePart::png("small.png"), Framing::Chunked)
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["title"], "Raw");
        assert_eq!(backend.put_calls().len(), 1);
    }

    #[tokio::test]
    async fn staged_writes_are_not_served() {
        let app = TestApp::spawn().await;
        let (_, token) = app.create_authenticated_user("alice").await;
        app.create_photo(&token, "Sunset").await;
        std::fs::write(app.media_root().join("staging").join("leftover"), b"partial").unwrap();

        let res = app
            .client
            .get(app.url("/media/staging/leftover"))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), 404);
        assert_eq!(app.stored_files().len(), 1);
    }

    #[tokio::test]
    async fn file_just_under_the_limit_is_accepted() {
        let app = TestApp::spawn().await;
        let (_, token) = app.create_authenticated_user("alice").await;

        let res = app
            .send_photo_form(
                Method::POST,
                routes::PHOTOS,
                &[("title", "Big"), ("caption", "But fine")],
                Some(FilePart::new("big.jpg", vec![7u8; MAX_UPLOAD_BYTES - 4096])),
                &token,
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
    }

    #[tokio::test]
    async fn blank_title_is_rejected_before_storage() {
        let backend = Arc::new(MemoryBackend::new());
        let app = TestApp::spawn_with_backend(backend.clone()).await;
        let (_, token) = app.create_authenticated_user("alice").await;

        let res = app
            .send_photo_form(
                Method::POST,
                routes::PHOTOS,
                &[("title", " "), ("caption", "Caption")],
                Some(FilePart::png("a.png")),
                &token,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["message"], "title is required");
        assert!(backend.put_calls().is_empty());
    }

    #[tokio::test]
    async fn missing_file_is_rejected() {
        let app = TestApp::spawn().await;
        let (_, token) = app.create_authenticated_user("alice").await;

        let res = app
            .send_photo_form(
                Method::POST,
                routes::PHOTOS,
                &[("title", "T"), ("caption", "C")],
                None,
                &token,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["message"], "photo is required");
    }

    #[tokio::test]
    async fn json_body_is_an_invalid_content_type() {
        let app = TestApp::spawn().await;
        let (_, token) = app.create_authenticated_user("alice").await;

        let res = app
            .post_with_token(
                routes::PHOTOS,
                &serde_json::json!({"title": "T", "caption": "C"}),
                &token,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "BAD_REQUEST");
        assert_eq!(res.body["message"], "invalid content type");
    }

    #[tokio::test]
    async fn storage_failure_is_a_dependency_failure_and_saves_nothing() {
        let backend = Arc::new(MemoryBackend::new());
        backend.fail_next_puts(1);
        let app = TestApp::spawn_with_backend(backend.clone()).await;
        let (_, token) = app.create_authenticated_user("alice").await;

        let res = app
            .send_photo_form(
                Method::POST,
                routes::PHOTOS,
                &[("title", "T"), ("caption", "C")],
                Some(FilePart::png("a.png")),
                &token,
            )
            .await;

        assert_eq!(res.status, 502);
        assert_eq!(res.body["code"], "DEPENDENCY_FAILURE");
        let list = app.get_with_token(routes::PHOTOS, &token).await;
        assert_eq!(list.body.as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn requires_authentication() {
        let app = TestApp::spawn().await;

        let res = app.get_without_token(routes::PHOTOS).await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_MISSING");
    }
}

mod read {
    use super::*;

    #[tokio::test]
    async fn list_includes_owner_projection_without_password() {
        let app = TestApp::spawn().await;
        let (alice_id, alice) = app.create_authenticated_user("alice").await;
        let (_, bob) = app.create_authenticated_user("bob").await;
        app.create_photo(&alice, "First").await;
        app.create_photo(&alice, "Second").await;

        let res = app.get_with_token(routes::PHOTOS, &bob).await;

        assert_eq!(res.status, 200);
        let photos = res.body.as_array().unwrap();
        assert_eq!(photos.len(), 2);
        assert_eq!(photos[0]["title"], "First");
        assert_eq!(photos[0]["user"]["id"], alice_id);
        assert_eq!(photos[0]["user"]["username"], "alice");
        assert!(photos[0]["user"].get("password").is_none());
    }

    #[tokio::test]
    async fn get_one_and_missing_one() {
        let app = TestApp::spawn().await;
        let (_, token) = app.create_authenticated_user("alice").await;
        let photo = app.create_photo(&token, "Sunset").await;
        let id = photo["id"].as_i64().unwrap() as i32;

        let found = app.get_with_token(&routes::photo(id), &token).await;
        let missing = app.get_with_token(&routes::photo(id + 100), &token).await;

        assert_eq!(found.status, 200);
        assert_eq!(found.body["photo_url"], photo["photo_url"]);
        assert_eq!(found.body["user"]["email"], "alice@example.com");
        assert_eq!(missing.status, 404);
        assert_eq!(missing.body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn non_numeric_id_is_a_bad_request() {
        let app = TestApp::spawn().await;
        let (_, token) = app.create_authenticated_user("alice").await;

        let res = app.get_with_token("/api/v1/photos/abc", &token).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "BAD_REQUEST");
    }
}

mod update {
    use super::*;

    #[tokio::test]
    async fn without_a_file_keeps_the_stored_url() {
        let app = TestApp::spawn().await;
        let (_, token) = app.create_authenticated_user("alice").await;
        let photo = app.create_photo(&token, "Sunset").await;
        let id = photo["id"].as_i64().unwrap() as i32;

        let res = app
            .send_photo_form(
                Method::PUT,
                &routes::photo(id),
                &[("title", "Dawn"), ("caption", "Earlier")],
                None,
                &token,
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["title"], "Dawn");
        assert_eq!(res.body["photo_url"], photo["photo_url"]);
        assert_eq!(app.stored_files().len(), 1);
    }

    #[tokio::test]
    async fn with_a_file_replaces_the_blob_and_deletes_the_old_one_once() {
        let backend = Arc::new(MemoryBackend::new());
        let app = TestApp::spawn_with_backend(backend.clone()).await;
        let (_, token) = app.create_authenticated_user("alice").await;
        let photo = app.create_photo(&token, "Sunset").await;
        let id = photo["id"].as_i64().unwrap() as i32;
        let old_url = photo["photo_url"].as_str().unwrap().to_string();
        let old_key = app.storage.public_url().key_for(&old_url).unwrap().to_string();

        let res = app
            .send_photo_form(
                Method::PUT,
                &routes::photo(id),
                &[("title", "Sunset"), ("caption", "Reshot")],
                Some(FilePart::new("new.jpeg", b"JPEGDATA".to_vec())),
                &token,
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        let new_url = res.body["photo_url"].as_str().unwrap();
        assert_ne!(new_url, old_url);
        assert!(new_url.ends_with(".jpeg"));
        assert_eq!(backend.delete_calls(), vec![old_key.clone()]);
        assert!(!backend.contains(&old_key));
        assert_eq!(backend.len(), 1);
    }

    #[tokio::test]
    async fn by_someone_else_is_forbidden_and_uploads_nothing() {
        let backend = Arc::new(MemoryBackend::new());
        let app = TestApp::spawn_with_backend(backend.clone()).await;
        let (_, alice) = app.create_authenticated_user("alice").await;
        let (_, bob) = app.create_authenticated_user("bob").await;
        let photo = app.create_photo(&alice, "Sunset").await;
        let id = photo["id"].as_i64().unwrap() as i32;

        let res = app
            .send_photo_form(
                Method::PUT,
                &routes::photo(id),
                &[("title", "Mine now"), ("caption", "Hijacked")],
                Some(FilePart::png("b.png")),
                &bob,
            )
            .await;

        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "PERMISSION_DENIED");
        assert_eq!(backend.put_calls().len(), 1);
    }

    #[tokio::test]
    async fn of_missing_photo_is_not_found() {
        let app = TestApp::spawn().await;
        let (_, token) = app.create_authenticated_user("alice").await;

        let res = app
            .send_photo_form(
                Method::PUT,
                &routes::photo(999),
                &[("title", "T"), ("caption", "C")],
                None,
                &token,
            )
            .await;

        assert_eq!(res.status, 404);
    }
}

mod delete {
    use super::*;

    #[tokio::test]
    async fn owner_can_delete_and_blob_is_removed() {
        let app = TestApp::spawn().await;
        let (_, token) = app.create_authenticated_user("alice").await;
        let photo = app.create_photo(&token, "Sunset").await;
        let id = photo["id"].as_i64().unwrap() as i32;

        let res = app.delete_with_token(&routes::photo(id), &token).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(
            res.body["message"],
            format!("photo with id {id} has been deleted")
        );
        assert!(app.stored_files().is_empty());
        let gone = app.get_with_token(&routes::photo(id), &token).await;
        assert_eq!(gone.status, 404);
    }

    #[tokio::test]
    async fn failed_blob_delete_keeps_the_photo() {
        let backend = Arc::new(MemoryBackend::new());
        let app = TestApp::spawn_with_backend(backend.clone()).await;
        let (_, token) = app.create_authenticated_user("alice").await;
        let photo = app.create_photo(&token, "Sunset").await;
        let id = photo["id"].as_i64().unwrap() as i32;
        backend.set_fail_deletes(true);

        let res = app.delete_with_token(&routes::photo(id), &token).await;

        assert_eq!(res.status, 502);
        assert_eq!(res.body["code"], "DEPENDENCY_FAILURE");
        let still_there = app.get_with_token(&routes::photo(id), &token).await;
        assert_eq!(still_there.status, 200);
        assert_eq!(still_there.body["photo_url"], photo["photo_url"]);
    }

    #[tokio::test]
    async fn by_someone_else_is_forbidden() {
        let app = TestApp::spawn().await;
        let (_, alice) = app.create_authenticated_user("alice").await;
        let (_, bob) = app.create_authenticated_user("bob").await;
        let photo = app.create_photo(&alice, "Sunset").await;
        let id = photo["id"].as_i64().unwrap() as i32;

        let res = app.delete_with_token(&routes::photo(id), &bob).await;

        assert_eq!(res.status, 403);
        assert_eq!(app.stored_files().len(), 1);
    }

    #[tokio::test]
    async fn twice_is_not_found() {
        let app = TestApp::spawn().await;
        let (_, token) = app.create_authenticated_user("alice").await;
        let photo = app.create_photo(&token, "Sunset").await;
        let id = photo["id"].as_i64().unwrap() as i32;

        app.delete_with_token(&routes::photo(id), &token).await;
        let res = app.delete_with_token(&routes::photo(id), &token).await;

        assert_eq!(res.status, 404);
    }
}
