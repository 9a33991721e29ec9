//! TTS 会话适配器
//!
//! `SpeechSessionPort` 的具体实现：Edge WebSocket 会话与测试用 Fake

mod edge_session;
mod fake_session;

pub use edge_session::{EdgeSessionConfig, EdgeSpeechSession};
pub use fake_session::{FakeSessionConfig, FakeSpeechSession};

use std::sync::Arc;

use crate::application::{Synthesizer, TtsError};
use crate::domain::SpeechConfig;

/// 创建接入 Edge 服务的合成器（便捷入口）
pub fn create_synthesizer(
    text: &str,
    config: SpeechConfig,
    session_config: EdgeSessionConfig,
) -> Result<Synthesizer, TtsError> {
    let session = Arc::new(EdgeSpeechSession::new(session_config));
    Synthesizer::new(session, text, config)
}
