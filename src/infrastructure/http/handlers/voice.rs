//! Voice HTTP Handlers

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::domain::{Voice, VoiceFilter};
use crate::infrastructure::http::dto::ApiResponse;
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

#[derive(Debug, Deserialize)]
pub struct VoiceListQuery {
    pub gender: Option<String>,
    pub locale: Option<String>,
    pub language: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct VoiceResponse {
    pub short_name: String,
    pub gender: String,
    pub locale: String,
    pub friendly_name: String,
    pub content_categories: Vec<String>,
    pub voice_personalities: Vec<String>,
}

impl From<&Voice> for VoiceResponse {
    fn from(voice: &Voice) -> Self {
        Self {
            short_name: voice.short_name.clone(),
            gender: voice.gender.clone(),
            locale: voice.locale.clone(),
            friendly_name: voice.friendly_name.clone(),
            content_categories: voice.voice_tag.content_categories.clone(),
            voice_personalities: voice.voice_tag.voice_personalities.clone(),
        }
    }
}

/// 获取音色列表（可按 gender / locale / language 过滤）
pub async fn list_voices(
    State(state): State<Arc<AppState>>,
    Query(query): Query<VoiceListQuery>,
) -> Result<Json<ApiResponse<Vec<VoiceResponse>>>, ApiError> {
    let voices = state.cached_voices().await?;

    let filter = VoiceFilter {
        gender: query.gender,
        locale: query.locale,
        language: query.language,
    };

    let mut responses: Vec<VoiceResponse> = voices
        .iter()
        .filter(|v| filter.matches(v))
        .map(VoiceResponse::from)
        .collect();
    responses.sort_by(|a, b| a.short_name.cmp(&b.short_name));

    Ok(Json(ApiResponse::success(responses)))
}
