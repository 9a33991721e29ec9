//! Application Ports - 出站端口定义
//!
//! 会话引擎的抽象接口，具体实现在 infrastructure/tts 层

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::error::TtsError;
use crate::domain::{SpeechConfig, TtsChunk};

/// turn.end 后追加的跨 chunk 静音补偿（100ns 单位）
pub const INTER_CHUNK_SILENCE_TICKS: u64 = 8_750_000;

/// 每个聚合器实例的会话状态
///
/// 不变量：消费者看到的 offset 跨 chunk 单调不减
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    /// 当前正在合成的分片（已转义）
    pub partial_text: String,

    /// 叠加到当前 chunk 所有边界 offset 上的补偿值
    pub offset_compensation: u64,

    /// 最近一条边界的 `offset + duration`，
    /// 用于为下一个 chunk 的补偿播种
    pub last_duration_offset: u64,
}

impl SessionState {
    /// turn.end：用最近边界的结束点加固定静音量作为下一 chunk 的补偿
    pub fn advance_compensation(&mut self) {
        self.offset_compensation = self.last_duration_offset + INTER_CHUNK_SILENCE_TICKS;
    }
}

/// 会话端口
///
/// 一次调用合成 `state.partial_text` 的一个完整会话：
/// 把音频与边界事件按到达顺序发送到 `sink`，在状态中维护偏移补偿
#[async_trait]
pub trait SpeechSessionPort: Send + Sync {
    async fn synthesize_chunk(
        &self,
        config: &SpeechConfig,
        state: &mut SessionState,
        sink: &mpsc::Sender<TtsChunk>,
        cancel: &CancellationToken,
    ) -> Result<(), TtsError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_compensation_adds_silence_gap() {
        let mut state = SessionState {
            last_duration_offset: 1_000_000,
            ..Default::default()
        };
        state.advance_compensation();
        assert_eq!(state.offset_compensation, 1_000_000 + 8_750_000);
    }
}
