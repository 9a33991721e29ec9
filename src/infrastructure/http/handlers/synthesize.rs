//! Synthesize HTTP Handler

use axum::extract::State;
use axum::Json;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::domain::{BoundaryKind, SpeechConfig, SubtitleMaker, DEFAULT_VOICE};
use crate::infrastructure::http::dto::ApiResponse;
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;
use crate::infrastructure::tts::create_synthesizer;

fn default_voice() -> String {
    DEFAULT_VOICE.to_string()
}

fn default_boundary() -> BoundaryKind {
    BoundaryKind::Sentence
}

#[derive(Debug, Deserialize)]
pub struct SynthesizeRequest {
    pub text: String,

    #[serde(default = "default_voice")]
    pub voice: String,

    /// 语速百分比
    #[serde(default)]
    pub rate: i32,

    /// 音量百分比
    #[serde(default)]
    pub volume: i32,

    /// 音调 Hz
    #[serde(default)]
    pub pitch: i32,

    /// 边界模式："word" / "sentence"
    #[serde(default = "default_boundary")]
    pub boundary: BoundaryKind,

    /// 是否附带 SRT 字幕
    #[serde(default)]
    pub subtitles: bool,
}

#[derive(Debug, Serialize)]
pub struct SynthesizeResponse {
    pub audio_base64: String,
    pub content_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitles: Option<String>,
}

/// 合成语音
///
/// 整段文本走完整管线（清理 → 转义 → 分片 → 逐片会话），
/// 聚合音频后以 base64 返回，可选生成 SRT 字幕
pub async fn synthesize(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SynthesizeRequest>,
) -> Result<Json<ApiResponse<SynthesizeResponse>>, ApiError> {
    if req.text.trim().is_empty() {
        return Err(ApiError::BadRequest("Text is required".to_string()));
    }

    let config = SpeechConfig::new(req.voice.clone())
        .with_rate(req.rate)
        .with_volume(req.volume)
        .with_pitch(req.pitch)
        .with_boundary(req.boundary);

    let mut synthesizer = create_synthesizer(&req.text, config, state.session_config.clone())?;

    tracing::debug!(
        voice = %req.voice,
        text_len = req.text.len(),
        chunks = synthesizer.chunk_count(),
        "Starting synthesis"
    );

    let mut stream = synthesizer.stream(CancellationToken::new());
    let mut submaker = SubtitleMaker::new();
    let audio = stream.collect(Some(&mut submaker)).await?;

    tracing::info!(
        voice = %req.voice,
        audio_size = audio.len(),
        cues = submaker.cues().len(),
        "Synthesis completed"
    );

    Ok(Json(ApiResponse::success(SynthesizeResponse {
        audio_base64: BASE64.encode(&audio),
        content_type: "audio/mpeg".to_string(),
        subtitles: if req.subtitles {
            Some(submaker.to_srt())
        } else {
            None
        },
    })))
}
