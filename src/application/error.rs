//! 引擎错误定义
//!
//! 统一的合成错误分类。除音色目录获取时的一次性时钟校准外，
//! 会话内不做本地恢复，错误经错误信号传递给消费者；
//! 已经交付的部分输出保留

use thiserror::Error;

use crate::domain::ConfigError;

/// TTS 引擎错误
#[derive(Debug, Error)]
pub enum TtsError {
    /// 音色格式非法（构造期，不可重试）
    #[error("invalid voice format: {0}")]
    InvalidVoice(String),

    /// 语速格式非法（构造期，不可重试）
    #[error("invalid rate format: {0}")]
    InvalidRate(String),

    /// 音量格式非法（构造期，不可重试）
    #[error("invalid volume format: {0}")]
    InvalidVolume(String),

    /// 音调格式非法（构造期，不可重试）
    #[error("invalid pitch format: {0}")]
    InvalidPitch(String),

    /// 帧可识别但判别值未知（元数据类型 / Path），会话级致命
    #[error("unknown response from server: {0}")]
    UnknownResponse(String),

    /// 帧结构非法（缺长度、长度不一致、Content-Type 错误），致命
    #[error("unexpected response from server: {0}")]
    UnexpectedResponse(String),

    /// 会话正常关闭但从未收到音频帧
    #[error("no audio received from server")]
    NoAudioReceived,

    /// 服务端日期缺失或无法解析，时钟校准失败
    #[error("clock skew adjustment error: {0}")]
    SkewAdjustment(String),

    /// WebSocket 连接 / 读写 / 超时错误
    #[error("websocket error: {0}")]
    WebSocket(String),

    /// 音色目录获取失败
    #[error("voice list error: {0}")]
    VoiceList(String),

    /// 单次流只能被消费一次
    #[error("stream can only be called once")]
    StreamAlreadyCalled,

    /// 外部取消
    #[error("synthesis cancelled")]
    Cancelled,
}

impl From<ConfigError> for TtsError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::InvalidVoice(v) => Self::InvalidVoice(v),
            ConfigError::InvalidRate(v) => Self::InvalidRate(v),
            ConfigError::InvalidVolume(v) => Self::InvalidVolume(v),
            ConfigError::InvalidPitch(v) => Self::InvalidPitch(v),
        }
    }
}
