//! 流聚合器
//!
//! 驱动会话引擎逐个合成文本分片，把全部事件汇成一条统一的结果流。
//! 偏移补偿跨 chunk 传递，保证消费者看到的时间轴单调不减

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::error::TtsError;
use super::ports::{SessionState, SpeechSessionPort};
use super::stream::{SpeechStream, DEFAULT_QUEUE_CAPACITY};
use crate::domain::{text, SpeechConfig};

/// 合成器（单次消费）
pub struct Synthesizer {
    config: SpeechConfig,
    texts: Vec<String>,
    session: Arc<dyn SpeechSessionPort>,
    stream_was_called: bool,
}

impl std::fmt::Debug for Synthesizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Synthesizer")
            .field("config", &self.config)
            .field("texts", &self.texts)
            .field("stream_was_called", &self.stream_was_called)
            .finish()
    }
}

impl Synthesizer {
    /// 创建合成器：验证配置并完成文本清理、转义与分片
    pub fn new(
        session: Arc<dyn SpeechSessionPort>,
        text: &str,
        mut config: SpeechConfig,
    ) -> Result<Self, TtsError> {
        config.validate_and_normalize()?;
        let texts = text::prepare_text(text, text::DEFAULT_BYTE_BUDGET);

        Ok(Self {
            config,
            texts,
            session,
            stream_was_called: false,
        })
    }

    /// 预处理后的分片数
    pub fn chunk_count(&self) -> usize {
        self.texts.len()
    }

    /// 启动合成，返回结果流
    ///
    /// 每个实例最多调用一次；重复调用得到的流只会给出
    /// `StreamAlreadyCalled`。取消信号中止当前阻塞操作，
    /// 流以 `Cancelled` 结束
    pub fn stream(&mut self, cancel: CancellationToken) -> SpeechStream {
        let (chunk_tx, chunk_rx) = mpsc::channel(DEFAULT_QUEUE_CAPACITY);
        let (err_tx, err_rx) = mpsc::channel(1);

        if self.stream_was_called {
            let _ = err_tx.try_send(TtsError::StreamAlreadyCalled);
            return SpeechStream::new(chunk_rx, err_rx);
        }
        self.stream_was_called = true;

        let session = self.session.clone();
        let config = self.config.clone();
        let texts = self.texts.clone();

        tokio::spawn(async move {
            let mut state = SessionState::default();

            for text in texts {
                state.partial_text = text;

                if let Err(e) = session
                    .synthesize_chunk(&config, &mut state, &chunk_tx, &cancel)
                    .await
                {
                    tracing::debug!(error = %e, "Synthesis stream aborted");
                    let _ = err_tx.try_send(e);
                    return;
                }
            }
        });

        SpeechStream::new(chunk_rx, err_rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BoundaryKind, TtsChunk};
    use crate::infrastructure::tts::{FakeSessionConfig, FakeSpeechSession};

    fn fake_synthesizer(text: &str, config: FakeSessionConfig) -> Synthesizer {
        Synthesizer::new(
            Arc::new(FakeSpeechSession::new(config)),
            text,
            SpeechConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_invalid_config_rejected_at_construction() {
        let session = Arc::new(FakeSpeechSession::new(FakeSessionConfig::default()));
        let config = SpeechConfig {
            rate: "10%".to_string(),
            ..Default::default()
        };
        let err = Synthesizer::new(session, "hello", config).unwrap_err();
        assert!(matches!(err, TtsError::InvalidRate(_)));
    }

    #[tokio::test]
    async fn test_stream_is_single_shot() {
        let mut synthesizer = fake_synthesizer("hello world", FakeSessionConfig::default());

        let mut first = synthesizer.stream(CancellationToken::new());
        while let Some(item) = first.next().await {
            item.unwrap();
        }

        let mut second = synthesizer.stream(CancellationToken::new());
        assert!(matches!(
            second.next().await,
            Some(Err(TtsError::StreamAlreadyCalled))
        ));
    }

    #[tokio::test]
    async fn test_offsets_monotone_across_chunks() {
        // 超过 4096 字节预算，强制多 chunk 会话
        let text = "word ".repeat(1200);
        let mut synthesizer = fake_synthesizer(&text, FakeSessionConfig::default());
        assert!(synthesizer.chunk_count() >= 2);

        let mut stream = synthesizer.stream(CancellationToken::new());
        let mut offsets: Vec<u64> = Vec::new();
        let mut audio_chunks = 0usize;
        let mut first_is_audio = None;

        while let Some(item) = stream.next().await {
            match item.unwrap() {
                TtsChunk::Audio(_) => {
                    first_is_audio.get_or_insert(true);
                    audio_chunks += 1;
                }
                TtsChunk::Boundary { offset, .. } => {
                    first_is_audio.get_or_insert(false);
                    offsets.push(offset);
                }
            }
        }

        // Fake 会话每个 chunk 先发音频，首个事件必须是音频
        assert_eq!(first_is_audio, Some(true));
        assert_eq!(audio_chunks, synthesizer.chunk_count());
        assert!(offsets.windows(2).all(|w| w[0] <= w[1]), "offsets: {:?}", offsets);
    }

    #[tokio::test]
    async fn test_partial_output_kept_on_failure() {
        let text = "word ".repeat(1200);
        let config = FakeSessionConfig {
            fail_on_chunk: Some(1),
            ..Default::default()
        };
        let mut synthesizer = fake_synthesizer(&text, config);
        assert!(synthesizer.chunk_count() >= 2);

        let mut stream = synthesizer.stream(CancellationToken::new());
        let mut delivered = 0usize;
        let mut failure = None;

        while let Some(item) = stream.next().await {
            match item {
                Ok(_) => delivered += 1,
                Err(e) => failure = Some(e),
            }
        }

        // 第一个 chunk 的输出完整保留，之后才是错误
        assert!(delivered > 0);
        assert!(matches!(failure, Some(TtsError::NoAudioReceived)));
    }

    #[tokio::test]
    async fn test_cancellation_fails_stream() {
        let cancel = CancellationToken::new();
        cancel.cancel();

        let mut synthesizer = fake_synthesizer("hello", FakeSessionConfig::default());
        let mut stream = synthesizer.stream(cancel);

        let mut last_err = None;
        while let Some(item) = stream.next().await {
            if let Err(e) = item {
                last_err = Some(e);
            }
        }
        assert!(matches!(last_err, Some(TtsError::Cancelled)));
    }

    #[tokio::test]
    async fn test_boundary_kind_follows_config() {
        let config = FakeSessionConfig {
            boundary_kind: BoundaryKind::Word,
            ..Default::default()
        };
        let mut synthesizer = fake_synthesizer("hello", config);
        let mut stream = synthesizer.stream(CancellationToken::new());

        let mut kinds = Vec::new();
        while let Some(item) = stream.next().await {
            if let TtsChunk::Boundary { kind, .. } = item.unwrap() {
                kinds.push(kind);
            }
        }
        assert!(!kinds.is_empty());
        assert!(kinds.iter().all(|k| *k == BoundaryKind::Word));
    }
}
