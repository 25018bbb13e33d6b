use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::info;

use crate::{
    api::errors::{ApiError, ErrorResponse},
    app_state::AppState,
    auth::{AdminUser, AuthenticatedUser},
    dataset::dtos::{
        DatasetListResponse, DatasetStatsResponse, FeedbackRequest, ListQuery, MessageResponse,
        ReplaceDatasetRequest,
    },
    entities::{DatasetItem, NewDatasetItem},
    inference::LabelTable,
};

/// Trimmed content, or a 400 when the content is blank or the tag is not a known label.
fn validated<'a>(labels: &LabelTable, content: &'a str, tag: &str) -> Result<&'a str, ApiError> {
    let content = content.trim();
    if content.is_empty() {
        return Err(ApiError::Validation("Missing content parameter".to_string()));
    }
    if !labels.contains(tag) {
        return Err(ApiError::Validation(format!("Unknown tag '{}'", tag)));
    }
    Ok(content)
}

fn item_not_found(id: i64) -> ApiError {
    ApiError::NotFound(format!("Dataset item {} not found", id))
}

#[utoipa::path(
    post,
    path = "/v1/datasets/feedback",
    tag = "datasets",
    request_body = FeedbackRequest,
    security(("bearer" = [])),
    responses(
        (status = 201, description = "Feedback stored", body = MessageResponse),
        (status = 400, description = "Empty content or unknown tag", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    )
)]
pub async fn submit_feedback(
    user: AuthenticatedUser,
    State(state): State<AppState>,
    Json(payload): Json<FeedbackRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let content = validated(&state.labels, &payload.content, &payload.tag)?;

    let item = state
        .dataset_repo
        .insert(content, &payload.tag, &user.email)
        .await?;
    info!(item_id = item.id, tag = %item.tag, "feedback stored");

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "Data saved successfully".to_string(),
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/v1/datasets",
    tag = "datasets",
    params(ListQuery),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Newest dataset items first", body = DatasetListResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    )
)]
pub async fn list_items(
    _user: AuthenticatedUser,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<DatasetListResponse>, ApiError> {
    let items = state
        .dataset_repo
        .list(query.limit(), query.offset())
        .await?;
    let total = state.dataset_repo.count().await?;

    Ok(Json(DatasetListResponse { items, total }))
}

#[utoipa::path(
    get,
    path = "/v1/datasets/stats",
    tag = "datasets",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Per-tag counts and average content length", body = DatasetStatsResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    )
)]
pub async fn stats(
    _user: AuthenticatedUser,
    State(state): State<AppState>,
) -> Result<Json<DatasetStatsResponse>, ApiError> {
    let tags = state.dataset_repo.tag_stats().await?;
    let total_items = tags.iter().map(|t| t.count).sum();

    Ok(Json(DatasetStatsResponse { total_items, tags }))
}

#[utoipa::path(
    put,
    path = "/v1/datasets/{id}",
    tag = "datasets",
    params(("id" = i64, Path, description = "Dataset item id")),
    request_body = NewDatasetItem,
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Item updated", body = DatasetItem),
        (status = 400, description = "Empty content or unknown tag", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Caller is not an admin", body = ErrorResponse),
        (status = 404, description = "No item with this id", body = ErrorResponse)
    )
)]
pub async fn update_item(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<NewDatasetItem>,
) -> Result<Json<DatasetItem>, ApiError> {
    let content = validated(&state.labels, &payload.content, &payload.tag)?;

    let item = state
        .dataset_repo
        .update(id, content, &payload.tag, &admin.email)
        .await?
        .ok_or_else(|| item_not_found(id))?;
    info!(item_id = item.id, tag = %item.tag, "dataset item updated");

    Ok(Json(item))
}

#[utoipa::path(
    delete,
    path = "/v1/datasets/{id}",
    tag = "datasets",
    params(("id" = i64, Path, description = "Dataset item id")),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Item deleted", body = MessageResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Caller is not an admin", body = ErrorResponse),
        (status = 404, description = "No item with this id", body = ErrorResponse)
    )
)]
pub async fn delete_item(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    if !state.dataset_repo.delete(id).await? {
        return Err(item_not_found(id));
    }
    info!(item_id = id, by = %admin.email, "dataset item deleted");

    Ok(Json(MessageResponse {
        message: "Data deleted successfully".to_string(),
    }))
}

/// Every item is validated before the table is touched; an empty list clears it.
#[utoipa::path(
    put,
    path = "/v1/datasets",
    tag = "datasets",
    request_body = ReplaceDatasetRequest,
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Dataset replaced", body = MessageResponse),
        (status = 400, description = "An item has empty content or an unknown tag", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Caller is not an admin", body = ErrorResponse)
    )
)]
pub async fn replace_items(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Json(payload): Json<ReplaceDatasetRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let items = payload
        .items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let content = validated(&state.labels, &item.content, &item.tag).map_err(|e| {
                ApiError::Validation(format!("Item {}: {}", index, e))
            })?;
            Ok(NewDatasetItem {
                content: content.to_string(),
                tag: item.tag.clone(),
            })
        })
        .collect::<Result<Vec<_>, ApiError>>()?;

    let inserted = state.dataset_repo.replace_all(&items, &admin.email).await?;
    info!(inserted, by = %admin.email, "dataset replaced");

    Ok(Json(MessageResponse {
        message: "Data saved successfully".to_string(),
    }))
}
