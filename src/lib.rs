//! Readaloud - Edge Read Aloud TTS 客户端引擎
//!
//! 架构设计: Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - 文本预处理（清理 / 转义 / 分片）、SSML 构造
//! - 音色规范化与目录模型
//! - 字幕组装（边界事件 → SRT）
//!
//! 应用层 (application/):
//! - Ports: 会话引擎端口（SpeechSessionPort）
//! - Synthesizer: 单次消费的流聚合器，跨 chunk 偏移补偿
//! - SpeechStream: 拉取式结果流（音频 | 边界事件）
//!
//! 基础设施层 (infrastructure/):
//! - DRM: 时钟偏移校正与 Sec-MS-GEC 能力令牌
//! - Wire: 文本帧 / 二进制帧编解码
//! - TTS: WebSocket 会话引擎适配器
//! - Voices: 音色目录获取（403 时校准时钟后重试）
//! - HTTP: RESTful API 外观
//!
//! # 基本用法
//!
//! ```no_run
//! use readaloud::{create_synthesizer, EdgeSessionConfig, SpeechConfig, SubtitleMaker};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = SpeechConfig::new("zh-CN-XiaoxiaoNeural").with_rate(10);
//! let mut synthesizer = create_synthesizer("你好，世界！", config, EdgeSessionConfig::default())?;
//!
//! let mut stream = synthesizer.stream(CancellationToken::new());
//! let mut submaker = SubtitleMaker::new();
//! let audio = stream.collect(Some(&mut submaker)).await?;
//!
//! std::fs::write("output.mp3", &audio)?;
//! std::fs::write("output.srt", submaker.to_srt())?;
//! # Ok(())
//! # }
//! ```

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use application::{
    SessionState, SpeechSessionPort, SpeechStream, StreamSinkError, Synthesizer, TtsError,
};
pub use config::{load_config, AppConfig};
pub use domain::{
    BoundaryKind, Cue, SpeechConfig, SubtitleError, SubtitleMaker, TtsChunk, Voice, VoiceFilter,
    DEFAULT_VOICE,
};
pub use infrastructure::{
    create_synthesizer, list_voices, Drm, EdgeSessionConfig, EdgeSpeechSession, VoiceListConfig,
    VoicesManager,
};
