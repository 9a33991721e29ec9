//! TTS 配置 - 音色、韵律参数与边界模式
//!
//! 在构造合成请求前完成验证：韵律参数必须带符号，
//! 短音色名规范化为服务端接受的完整形式

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use super::chunk::BoundaryKind;

/// 默认音色
pub const DEFAULT_VOICE: &str = "en-US-EmmaMultilingualNeural";

/// 短音色名：`ll-RR-NameNeural`
///
/// region 段允许大小写混合，兼容 `iu-Cans-CA` / `iu-Latn-CA`
/// 这类带书写系统子标签的 locale
static SHORT_VOICE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([a-z]{2,})-([A-Za-z]{2,})-(.+Neural)$").unwrap());

/// 服务端接受的完整音色名
static FULL_VOICE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^Microsoft Server Speech Text to Speech Voice \(.+,.+\)$").unwrap());

static RATE_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[+-]\d+%$").unwrap());
static VOLUME_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[+-]\d+%$").unwrap());
static PITCH_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[+-]\d+Hz$").unwrap());

/// 配置验证错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid voice format: {0}")]
    InvalidVoice(String),

    #[error("invalid rate format: {0}")]
    InvalidRate(String),

    #[error("invalid volume format: {0}")]
    InvalidVolume(String),

    #[error("invalid pitch format: {0}")]
    InvalidPitch(String),
}

/// TTS 配置
///
/// rate / volume 渲染为 `±N%`，pitch 渲染为 `±NHz`，符号必填
#[derive(Debug, Clone)]
pub struct SpeechConfig {
    pub voice: String,
    pub rate: String,
    pub volume: String,
    pub pitch: String,
    pub boundary: BoundaryKind,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            voice: DEFAULT_VOICE.to_string(),
            rate: "+0%".to_string(),
            volume: "+0%".to_string(),
            pitch: "+0Hz".to_string(),
            boundary: BoundaryKind::Sentence,
        }
    }
}

impl SpeechConfig {
    /// 创建配置；空音色名回退为默认音色
    pub fn new(voice: impl Into<String>) -> Self {
        let voice = voice.into();
        Self {
            voice: if voice.is_empty() {
                DEFAULT_VOICE.to_string()
            } else {
                voice
            },
            ..Default::default()
        }
    }

    /// 设置语速（百分比，带符号渲染）
    pub fn with_rate(mut self, percent: i32) -> Self {
        self.rate = format!("{:+}%", percent);
        self
    }

    /// 设置音量（百分比，带符号渲染）
    pub fn with_volume(mut self, percent: i32) -> Self {
        self.volume = format!("{:+}%", percent);
        self
    }

    /// 设置音调（Hz，带符号渲染）
    pub fn with_pitch(mut self, hertz: i32) -> Self {
        self.pitch = format!("{:+}Hz", hertz);
        self
    }

    /// 设置边界模式
    pub fn with_boundary(mut self, boundary: BoundaryKind) -> Self {
        self.boundary = boundary;
        self
    }

    /// 验证配置并把音色名规范化为服务端的完整形式
    pub fn validate_and_normalize(&mut self) -> Result<(), ConfigError> {
        self.voice = normalize_voice(&self.voice)?;

        if !RATE_PATTERN.is_match(&self.rate) {
            return Err(ConfigError::InvalidRate(self.rate.clone()));
        }
        if !VOLUME_PATTERN.is_match(&self.volume) {
            return Err(ConfigError::InvalidVolume(self.volume.clone()));
        }
        if !PITCH_PATTERN.is_match(&self.pitch) {
            return Err(ConfigError::InvalidPitch(self.pitch.clone()));
        }

        Ok(())
    }
}

/// 规范化音色名
///
/// 短名重写为 `Microsoft Server Speech Text to Speech Voice (ll-RR, Name)`。
/// 名称段仍含 `-` 时（如 `zh-CN-liaoning-XiaobeiNeural`），
/// region 吸收第一段：lang=`zh`、region=`CN-liaoning`、name=`XiaobeiNeural`
pub fn normalize_voice(voice: &str) -> Result<String, ConfigError> {
    let normalized = match SHORT_VOICE_PATTERN.captures(voice) {
        Some(caps) => {
            let lang = &caps[1];
            let mut region = caps[2].to_string();
            let mut name = caps[3].to_string();

            if let Some(idx) = name.find('-') {
                region = format!("{}-{}", region, &name[..idx]);
                name = name[idx + 1..].to_string();
            }

            format!(
                "Microsoft Server Speech Text to Speech Voice ({}-{}, {})",
                lang, region, name
            )
        }
        None => voice.to_string(),
    };

    if !FULL_VOICE_PATTERN.is_match(&normalized) {
        return Err(ConfigError::InvalidVoice(normalized));
    }

    Ok(normalized)
}
