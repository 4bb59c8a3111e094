use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::config::AppConfig;
use crate::handlers;
use crate::state::AppState;

pub fn routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .nest("/users", user_routes())
        .nest("/photos", photo_routes(config))
        .nest("/social-medias", social_media_routes())
}

fn user_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::user::register))
        .routes(routes!(handlers::user::login))
        .routes(routes!(handlers::user::me))
}

fn photo_routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::photo::list_photos,
            handlers::photo::create_photo
        ))
        .routes(routes!(
            handlers::photo::get_photo,
            handlers::photo::update_photo,
            handlers::photo::delete_photo
        ))
        .nest("/{photo_id}/comments", comment_routes())
        .layer(handlers::photo::photo_body_limit(
            config.storage.max_upload_bytes,
        ))
}

fn comment_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::comment::list_comments,
            handlers::comment::create_comment
        ))
        .routes(routes!(
            handlers::comment::get_comment,
            handlers::comment::update_comment,
            handlers::comment::delete_comment
        ))
}

fn social_media_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::social_media::list_social_medias,
            handlers::social_media::create_social_media
        ))
        .routes(routes!(
            handlers::social_media::get_social_media,
            handlers::social_media::update_social_media,
            handlers::social_media::delete_social_media
        ))
}
