//! Fake Speech Session - 用于测试的会话适配器
//!
//! 不访问网络，按脚本回放固定的音频与边界事件，
//! 并模拟真实会话的偏移补偿行为

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::application::{SessionState, SpeechSessionPort, TtsError};
use crate::domain::{BoundaryKind, SpeechConfig, TtsChunk};

/// Fake 会话配置
#[derive(Debug, Clone)]
pub struct FakeSessionConfig {
    /// 每个 chunk 会话发出的音频字节
    pub audio: Vec<u8>,
    /// 每个 chunk 会话发出的边界事件数
    pub boundaries_per_chunk: usize,
    /// 每条边界的时长（100ns 单位）
    pub boundary_duration: u64,
    /// 边界类型
    pub boundary_kind: BoundaryKind,
    /// 第 N 个 chunk（0 起始）直接以 NoAudioReceived 失败
    pub fail_on_chunk: Option<usize>,
}

impl Default for FakeSessionConfig {
    fn default() -> Self {
        Self {
            audio: vec![0xff, 0xf3, 0x44, 0xc4],
            boundaries_per_chunk: 2,
            boundary_duration: 1_000_000,
            boundary_kind: BoundaryKind::Sentence,
            fail_on_chunk: None,
        }
    }
}

/// Fake 会话适配器
pub struct FakeSpeechSession {
    config: FakeSessionConfig,
    calls: AtomicUsize,
}

impl FakeSpeechSession {
    pub fn new(config: FakeSessionConfig) -> Self {
        Self {
            config,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(FakeSessionConfig::default())
    }

    /// 已执行的 chunk 会话数
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl SpeechSessionPort for FakeSpeechSession {
    async fn synthesize_chunk(
        &self,
        _config: &SpeechConfig,
        state: &mut SessionState,
        sink: &mpsc::Sender<TtsChunk>,
        cancel: &CancellationToken,
    ) -> Result<(), TtsError> {
        let call = self.calls.fetch_add(1, Ordering::Relaxed);

        if cancel.is_cancelled() {
            return Err(TtsError::Cancelled);
        }
        if self.config.fail_on_chunk == Some(call) {
            return Err(TtsError::NoAudioReceived);
        }

        tracing::debug!(
            call,
            text_len = state.partial_text.len(),
            "FakeSpeechSession: replaying scripted chunk"
        );

        sink.send(TtsChunk::Audio(self.config.audio.clone()))
            .await
            .map_err(|_| TtsError::Cancelled)?;

        // 与真实会话一致：本地 offset 从 0 计，出口处叠加补偿
        let mut local_offset = 0u64;
        for i in 0..self.config.boundaries_per_chunk {
            let offset = local_offset + state.offset_compensation;
            let duration = self.config.boundary_duration;

            sink.send(TtsChunk::Boundary {
                kind: self.config.boundary_kind,
                offset,
                duration,
                text: format!("segment {}", i + 1),
            })
            .await
            .map_err(|_| TtsError::Cancelled)?;

            state.last_duration_offset = offset + duration;
            local_offset += duration;
        }

        state.advance_compensation();
        Ok(())
    }
}
