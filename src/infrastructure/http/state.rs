//! Application State

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

use crate::application::TtsError;
use crate::domain::Voice;
use crate::infrastructure::tts::EdgeSessionConfig;
use crate::infrastructure::voices::{list_voices, VoiceListConfig};

struct VoicesCacheEntry {
    fetched_at: Instant,
    voices: Arc<Vec<Voice>>,
}

/// 应用状态
pub struct AppState {
    /// 每次合成会话的超时配置
    pub session_config: EdgeSessionConfig,
    /// 音色目录请求配置
    pub voice_list_config: VoiceListConfig,

    voices_cache: RwLock<Option<VoicesCacheEntry>>,
    voices_cache_ttl: Duration,
}

impl AppState {
    pub fn new(
        session_config: EdgeSessionConfig,
        voice_list_config: VoiceListConfig,
        voices_cache_ttl: Duration,
    ) -> Self {
        Self {
            session_config,
            voice_list_config,
            voices_cache: RwLock::new(None),
            voices_cache_ttl,
        }
    }

    /// 取音色目录，带 TTL 缓存
    pub async fn cached_voices(&self) -> Result<Arc<Vec<Voice>>, TtsError> {
        {
            let cache = self.voices_cache.read().await;
            if let Some(entry) = cache.as_ref() {
                if entry.fetched_at.elapsed() < self.voices_cache_ttl {
                    return Ok(entry.voices.clone());
                }
            }
        }

        let voices = Arc::new(list_voices(&self.voice_list_config).await?);

        let mut cache = self.voices_cache.write().await;
        *cache = Some(VoicesCacheEntry {
            fetched_at: Instant::now(),
            voices: voices.clone(),
        });
        tracing::info!(count = voices.len(), "Voice catalog refreshed");

        Ok(voices)
    }
}
