use axum::Json;
use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

use crate::{
    api::{classify, errors::ErrorResponse, verify},
    auth::{dtos, handlers as auth_handlers},
    dataset::{dtos as dataset_dtos, handlers as dataset_handlers},
    entities::{DatasetItem, NewDatasetItem, TagStats},
    health,
    inference::ClassScore,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "adevar",
        description = "Fake-news classification for Romanian news text and articles"
    ),
    paths(
        health::health_check,
        auth_handlers::register,
        auth_handlers::login,
        verify::verify_url,
        classify::classify_text,
        classify::classify_url,
        dataset_handlers::submit_feedback,
        dataset_handlers::list_items,
        dataset_handlers::stats,
        dataset_handlers::update_item,
        dataset_handlers::delete_item,
        dataset_handlers::replace_items,
    ),
    components(schemas(
        ErrorResponse,
        health::HealthResponse,
        dtos::RegisterRequest,
        dtos::LoginRequest,
        dtos::LoginResponse,
        verify::VerifyUrlRequest,
        verify::VerifyUrlResponse,
        classify::ClassifyTextRequest,
        classify::ClassifyUrlRequest,
        classify::ClassifyResponse,
        ClassScore,
        dataset_dtos::FeedbackRequest,
        dataset_dtos::MessageResponse,
        dataset_dtos::DatasetListResponse,
        dataset_dtos::DatasetStatsResponse,
        dataset_dtos::ReplaceDatasetRequest,
        DatasetItem,
        NewDatasetItem,
        TagStats,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "classify", description = "Text and article classification"),
        (name = "safety", description = "URL safety checks"),
        (name = "datasets", description = "Curation dataset"),
        (name = "auth", description = "Accounts and tokens"),
        (name = "health", description = "Liveness")
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
