use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::entities::{DatasetItem, NewDatasetItem, TagStats};

pub const DEFAULT_PAGE_SIZE: i64 = 100;
pub const MAX_PAGE_SIZE: i64 = 500;

#[derive(Debug, Deserialize, ToSchema)]
pub struct FeedbackRequest {
    #[serde(default)]
    #[schema(example = "Guvernul a anunțat că toate școlile se închid mâine.")]
    pub content: String,
    #[serde(default)]
    #[schema(example = "fake_news")]
    pub tag: String,
}

/// Replaces the whole dataset.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ReplaceDatasetRequest {
    #[serde(default)]
    pub items: Vec<NewDatasetItem>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// Page size, at most 500.
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl ListQuery {
    pub fn limit(&self) -> i64 {
        self.limit
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE)
    }

    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DatasetListResponse {
    pub items: Vec<DatasetItem>,
    pub total: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DatasetStatsResponse {
    pub total_items: i64,
    pub tags: Vec<TagStats>,
}
