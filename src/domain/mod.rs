//! Domain Layer - 领域层
//!
//! 纯逻辑，无 I/O：
//! - chunk: 流式数据块模型
//! - speech: TTS 配置与音色规范化
//! - text: 文本清理、转义与分片
//! - ssml: SSML 构造
//! - voice: 音色目录模型
//! - subtitle: 字幕组装

pub mod chunk;
pub mod speech;
pub mod ssml;
pub mod subtitle;
pub mod text;
pub mod voice;

pub use chunk::{BoundaryKind, TtsChunk};
pub use speech::{normalize_voice, ConfigError, SpeechConfig, DEFAULT_VOICE};
pub use subtitle::{Cue, SubtitleError, SubtitleMaker};
pub use voice::{Voice, VoiceFilter, VoiceTag};
