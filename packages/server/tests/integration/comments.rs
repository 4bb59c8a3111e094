use serde_json::json;

use crate::common::{TestApp, routes};

async fn photo_of(app: &TestApp, token: &str) -> i32 {
    app.create_photo(token, "Sunset").await["id"].as_i64().unwrap() as i32
}

#[tokio::test]
async fn anyone_can_comment_on_someone_elses_photo() {
    let app = TestApp::spawn().await;
    let (_, owner) = app.create_authenticated_user("owner").await;
    let (commenter_id, commenter) = app.create_authenticated_user("commenter").await;
    let photo_id = photo_of(&app, &owner).await;

    let res = app
        .post_with_token(
            &routes::comments(photo_id),
            &json!({"message": "Lovely colours!"}),
            &commenter,
        )
        .await;

    assert_eq!(res.status, 201, "{}", res.text);
    assert_eq!(res.body["message"], "Lovely colours!");
    assert_eq!(res.body["user_id"], commenter_id);
    assert_eq!(res.body["photo_id"], photo_id);
}

#[tokio::test]
async fn photo_owner_cannot_edit_or_delete_anothers_comment() {
    let app = TestApp::spawn().await;
    let (_, owner) = app.create_authenticated_user("owner").await;
    let (_, commenter) = app.create_authenticated_user("commenter").await;
    let photo_id = photo_of(&app, &owner).await;
    let comment_id = app.create_comment(photo_id, &commenter, "Nice").await;

    let update = app
        .put_with_token(
            &routes::comment(photo_id, comment_id),
            &json!({"message": "Edited by owner"}),
            &owner,
        )
        .await;
    let delete = app
        .delete_with_token(&routes::comment(photo_id, comment_id), &owner)
        .await;

    assert_eq!(update.status, 403);
    assert_eq!(update.body["code"], "PERMISSION_DENIED");
    assert_eq!(delete.status, 403);
    let unchanged = app
        .get_with_token(&routes::comment(photo_id, comment_id), &owner)
        .await;
    assert_eq!(unchanged.body["message"], "Nice");
}

#[tokio::test]
async fn author_can_edit_and_delete_their_comment() {
    let app = TestApp::spawn().await;
    let (_, owner) = app.create_authenticated_user("owner").await;
    let (_, commenter) = app.create_authenticated_user("commenter").await;
    let photo_id = photo_of(&app, &owner).await;
    let comment_id = app.create_comment(photo_id, &commenter, "Nice").await;

    let update = app
        .put_with_token(
            &routes::comment(photo_id, comment_id),
            &json!({"message": "Very nice"}),
            &commenter,
        )
        .await;
    assert_eq!(update.status, 200, "{}", update.text);
    assert_eq!(update.body["message"], "Very nice");

    let delete = app
        .delete_with_token(&routes::comment(photo_id, comment_id), &commenter)
        .await;
    assert_eq!(delete.status, 200);
    assert_eq!(
        delete.body["message"],
        format!("comment with id {comment_id} has been deleted")
    );

    let gone = app
        .get_with_token(&routes::comment(photo_id, comment_id), &commenter)
        .await;
    assert_eq!(gone.status, 404);
}

#[tokio::test]
async fn list_shows_authors_for_one_photo_only() {
    let app = TestApp::spawn().await;
    let (_, owner) = app.create_authenticated_user("owner").await;
    let (commenter_id, commenter) = app.create_authenticated_user("commenter").await;
    let first = photo_of(&app, &owner).await;
    let second = photo_of(&app, &owner).await;
    app.create_comment(first, &commenter, "On first").await;
    app.create_comment(second, &owner, "On second").await;

    let res = app.get_with_token(&routes::comments(first), &owner).await;

    assert_eq!(res.status, 200);
    let comments = res.body.as_array().unwrap();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0]["message"], "On first");
    assert_eq!(comments[0]["user"]["id"], commenter_id);
    assert_eq!(comments[0]["user"]["username"], "commenter");
}

#[tokio::test]
async fn comment_under_the_wrong_photo_is_not_found() {
    let app = TestApp::spawn().await;
    let (_, owner) = app.create_authenticated_user("owner").await;
    let first = photo_of(&app, &owner).await;
    let second = photo_of(&app, &owner).await;
    let comment_id = app.create_comment(first, &owner, "Hello").await;

    let res = app
        .get_with_token(&routes::comment(second, comment_id), &owner)
        .await;
    let delete = app
        .delete_with_token(&routes::comment(second, comment_id), &owner)
        .await;

    assert_eq!(res.status, 404);
    assert_eq!(delete.status, 404);
}

#[tokio::test]
async fn authorship_is_checked_before_the_comment_is_loaded() {
    let app = TestApp::spawn().await;
    let (_, owner) = app.create_authenticated_user("owner").await;
    let (_, stranger) = app.create_authenticated_user("stranger").await;
    let first = photo_of(&app, &owner).await;
    let second = photo_of(&app, &owner).await;
    let comment_id = app.create_comment(first, &owner, "Hello").await;

    // Addressed under the wrong photo, so only the owner lookup can answer.
    let update = app
        .put_with_token(
            &routes::comment(second, comment_id),
            &json!({"message": "Hijacked"}),
            &stranger,
        )
        .await;
    let delete = app
        .delete_with_token(&routes::comment(second, comment_id), &stranger)
        .await;

    assert_eq!(update.status, 403);
    assert_eq!(update.body["code"], "PERMISSION_DENIED");
    assert_eq!(delete.status, 403);
    let res = app
        .get_with_token(&routes::comment(first, comment_id), &owner)
        .await;
    assert_eq!(res.body["message"], "Hello");
}

#[tokio::test]
async fn commenting_on_a_missing_photo_is_not_found() {
    let app = TestApp::spawn().await;
    let (_, token) = app.create_authenticated_user("alice").await;

    let res = app
        .post_with_token(&routes::comments(999), &json!({"message": "Hi"}), &token)
        .await;

    assert_eq!(res.status, 404);
    assert_eq!(res.body["message"], "Photo not found");
}

#[tokio::test]
async fn blank_message_is_rejected() {
    let app = TestApp::spawn().await;
    let (_, token) = app.create_authenticated_user("alice").await;
    let photo_id = photo_of(&app, &token).await;

    let res = app
        .post_with_token(&routes::comments(photo_id), &json!({"message": "  "}), &token)
        .await;

    assert_eq!(res.status, 400);
    assert_eq!(res.body["message"], "message is required");
}

#[tokio::test]
async fn comments_on_a_deleted_photo_are_not_reachable() {
    let app = TestApp::spawn().await;
    let (_, token) = app.create_authenticated_user("alice").await;
    let photo_id = photo_of(&app, &token).await;
    let comment_id = app.create_comment(photo_id, &token, "Hello").await;

    let deleted = app.delete_with_token(&routes::photo(photo_id), &token).await;
    assert_eq!(deleted.status, 200);

    let res = app
        .get_with_token(&routes::comment(photo_id, comment_id), &token)
        .await;
    assert_eq!(res.status, 404);
}
