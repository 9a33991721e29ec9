//! 音色目录获取
//!
//! 拉取服务端 `/voices/list` 目录。收到 403 时先用响应的 Date 头
//! 校准时钟偏移，再重试一次（令牌窗口错位是 403 的常见原因）

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;

use crate::application::TtsError;
use crate::domain::{Voice, VoiceFilter};
use crate::infrastructure::drm::Drm;
use crate::infrastructure::wire::constants::{
    voice_list_headers, SEC_MS_GEC_VERSION, VOICE_LIST_URL,
};

/// 目录请求配置
#[derive(Debug, Clone)]
pub struct VoiceListConfig {
    /// 请求超时
    pub timeout: Duration,
}

impl Default for VoiceListConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
        }
    }
}

/// 单次拉取的失败原因（模块内部分类）
enum FetchError {
    Forbidden { date: Option<String> },
    Status(u16),
    Transport(String),
    Decode(String),
}

impl From<FetchError> for TtsError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::Forbidden { .. } => TtsError::VoiceList("forbidden: status 403".to_string()),
            FetchError::Status(code) => {
                TtsError::VoiceList(format!("unexpected status code: {}", code))
            }
            FetchError::Transport(msg) => TtsError::VoiceList(msg),
            FetchError::Decode(msg) => TtsError::VoiceList(format!("invalid catalog: {}", msg)),
        }
    }
}

/// 执行一次目录请求
async fn fetch_voices(client: &Client, drm: &Drm) -> Result<Vec<Voice>, FetchError> {
    let url = format!(
        "{}&Sec-MS-GEC={}&Sec-MS-GEC-Version={}",
        VOICE_LIST_URL,
        drm.generate_sec_ms_gec(),
        SEC_MS_GEC_VERSION
    );

    let mut request = client.get(&url);
    for (name, value) in voice_list_headers() {
        request = request.header(name, value);
    }

    let response = request
        .send()
        .await
        .map_err(|e| FetchError::Transport(e.to_string()))?;

    let status = response.status();
    if status.as_u16() == 403 {
        let date = response
            .headers()
            .get("Date")
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        return Err(FetchError::Forbidden { date });
    }
    if !status.is_success() {
        return Err(FetchError::Status(status.as_u16()));
    }

    response
        .json::<Vec<Voice>>()
        .await
        .map_err(|e| FetchError::Decode(e.to_string()))
}

/// 列出全部可用音色（使用进程级时钟状态）
pub async fn list_voices(config: &VoiceListConfig) -> Result<Vec<Voice>, TtsError> {
    list_voices_with_drm(config, Drm::global()).await
}

/// 列出全部可用音色（使用指定时钟状态）
pub async fn list_voices_with_drm(
    config: &VoiceListConfig,
    drm: Arc<Drm>,
) -> Result<Vec<Voice>, TtsError> {
    let client = Client::builder()
        .timeout(config.timeout)
        .build()
        .map_err(|e| TtsError::VoiceList(e.to_string()))?;

    match fetch_voices(&client, &drm).await {
        Ok(voices) => Ok(voices),
        Err(FetchError::Forbidden { date }) => {
            // 校准时钟后重试一次，让新令牌落进正确的时间窗口
            drm.calibrate_from_date_header(date.as_deref())?;
            tracing::info!(
                skew = drm.clock_skew_seconds(),
                "Voice list forbidden, retrying after clock calibration"
            );
            fetch_voices(&client, &drm).await.map_err(TtsError::from)
        }
        Err(e) => Err(e.into()),
    }
}

/// 音色管理器：持有目录并按条件筛选
pub struct VoicesManager {
    voices: Vec<Voice>,
}

impl VoicesManager {
    /// 拉取目录创建
    pub async fn create(config: &VoiceListConfig) -> Result<Self, TtsError> {
        Ok(Self {
            voices: list_voices(config).await?,
        })
    }

    /// 使用自备目录创建（测试 / 离线场景）
    pub fn with_voices(voices: Vec<Voice>) -> Self {
        Self { voices }
    }

    pub fn voices(&self) -> &[Voice] {
        &self.voices
    }

    /// 按条件筛选
    pub fn find(&self, filter: &VoiceFilter) -> Vec<&Voice> {
        self.voices.iter().filter(|v| filter.matches(v)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::VoiceTag;

    fn voice(short_name: &str, gender: &str, locale: &str) -> Voice {
        Voice {
            name: short_name.to_string(),
            short_name: short_name.to_string(),
            gender: gender.to_string(),
            locale: locale.to_string(),
            suggested_codec: String::new(),
            friendly_name: String::new(),
            status: "GA".to_string(),
            voice_tag: VoiceTag::default(),
        }
    }

    #[test]
    fn test_manager_find_by_language() {
        let manager = VoicesManager::with_voices(vec![
            voice("zh-CN-XiaoxiaoNeural", "Female", "zh-CN"),
            voice("zh-TW-HsiaoChenNeural", "Female", "zh-TW"),
            voice("en-US-GuyNeural", "Male", "en-US"),
        ]);

        let filter = VoiceFilter {
            language: Some("zh".to_string()),
            ..Default::default()
        };
        let found = manager.find(&filter);
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|v| v.locale.starts_with("zh")));
    }

    #[test]
    fn test_manager_find_combined_filter() {
        let manager = VoicesManager::with_voices(vec![
            voice("zh-CN-XiaoxiaoNeural", "Female", "zh-CN"),
            voice("zh-CN-YunxiNeural", "Male", "zh-CN"),
        ]);

        let filter = VoiceFilter {
            gender: Some("Male".to_string()),
            locale: Some("zh-CN".to_string()),
            ..Default::default()
        };
        let found = manager.find(&filter);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].short_name, "zh-CN-YunxiNeural");
    }

    #[test]
    fn test_fetch_error_mapping() {
        let err: TtsError = FetchError::Status(500).into();
        assert!(matches!(err, TtsError::VoiceList(msg) if msg.contains("500")));

        let err: TtsError = FetchError::Forbidden { date: None }.into();
        assert!(matches!(err, TtsError::VoiceList(msg) if msg.contains("403")));
    }
}
