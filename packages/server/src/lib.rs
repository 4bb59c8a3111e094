pub mod config;
pub mod database;
pub mod entity;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;


use common::StorageBackendKind;
use common::storage::filesystem::FilesystemBackend;
use tower_http::services::ServeDir;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_axum::router::OpenApiRouter;
use utoipa_scalar::{Scalar, Servable as ScalarServable};
use utoipa_swagger_ui::SwaggerUi;

use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Photogram API",
        version = "1.0.0",
        description = "Photo sharing API: users, photos, comments and social media links"
    ),
    tags(
        (name = "Users", description = "Registration, login and caller identity"),
        (name = "Photos", description = "Photo upload and management"),
        (name = "Comments", description = "Comments on photos"),
        (name = "Social Medias", description = "Social media links of users"),
    ),
    modifiers(&SecurityAddon),
)]
struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_default();
        components.add_security_scheme(
            "jwt",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

/// Build the application router.
///
/// With the filesystem backend, stored objects (never staged writes) are
/// served from `/media`.
pub fn build_router(state: AppState) -> axum::Router {
    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .nest("/api", routes::api_routes(&state.config))
        .split_for_parts();

    let storage = &state.config.storage;
    let media = (storage.backend == StorageBackendKind::Filesystem)
        .then(|| ServeDir::new(FilesystemBackend::objects_dir(&storage.filesystem.root)));

    let router = router
        .with_state(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api.clone()))
        .merge(Scalar::with_url("/scalar", api));

    match media {
        Some(dir) => router.nest_service("/media", dir),
        None => router,
    }
}
