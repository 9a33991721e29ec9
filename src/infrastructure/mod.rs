//! Infrastructure Layer - 基础设施层
//!
//! 提供端口的具体实现与外部接口：
//! - drm: 时钟偏移校正与能力令牌
//! - wire: 帧协议编解码与服务端点常量
//! - tts: WebSocket 会话引擎（及测试用 Fake）
//! - voices: 音色目录获取
//! - http: RESTful API 外观

pub mod drm;
pub mod http;
pub mod tts;
pub mod voices;
pub mod wire;

pub use drm::Drm;
pub use http::{AppState, HttpServer, ServerConfig};
pub use tts::{create_synthesizer, EdgeSessionConfig, EdgeSpeechSession};
pub use voices::{list_voices, VoiceListConfig, VoicesManager};
