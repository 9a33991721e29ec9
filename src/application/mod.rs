//! Application Layer - 合成编排
//!
//! 包含：
//! - ports: 会话引擎端口（SpeechSessionPort、SessionState）
//! - synthesizer: 单次消费的流聚合器
//! - stream: 拉取式结果流与消费辅助
//! - error: 引擎错误分类

pub mod error;
pub mod ports;
pub mod stream;
pub mod synthesizer;

pub use error::TtsError;
pub use ports::{SessionState, SpeechSessionPort, INTER_CHUNK_SILENCE_TICKS};
pub use stream::{SpeechStream, StreamSinkError, DEFAULT_QUEUE_CAPACITY};
pub use synthesizer::Synthesizer;
