//! 合成结果流
//!
//! 拉取式消费接口。内部由后台任务向有界队列推送事件，
//! 错误走独立信号，值通道关闭后仍需排空

use thiserror::Error;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;

use super::error::TtsError;
use crate::domain::{SubtitleError, SubtitleMaker, TtsChunk};

/// chunk 队列容量（有界，允许引擎积累少量余量而不拖住消费者）
pub const DEFAULT_QUEUE_CAPACITY: usize = 100;

/// 流消费辅助方法的错误
#[derive(Debug, Error)]
pub enum StreamSinkError {
    #[error(transparent)]
    Tts(#[from] TtsError),

    #[error("audio sink error: {0}")]
    Sink(#[from] std::io::Error),

    #[error(transparent)]
    Subtitle(#[from] SubtitleError),
}

/// 合成结果流（冷流，每个 Synthesizer 实例最多产生一次）
pub struct SpeechStream {
    chunks: mpsc::Receiver<TtsChunk>,
    errors: mpsc::Receiver<TtsError>,
}

impl SpeechStream {
    pub(crate) fn new(chunks: mpsc::Receiver<TtsChunk>, errors: mpsc::Receiver<TtsError>) -> Self {
        Self { chunks, errors }
    }

    /// 取下一个事件
    ///
    /// 值通道排空后检查错误信号；`None` 表示流正常结束。
    /// 失败前已交付的事件不会被丢弃
    pub async fn next(&mut self) -> Option<Result<TtsChunk, TtsError>> {
        match self.chunks.recv().await {
            Some(chunk) => Some(Ok(chunk)),
            None => self.errors.recv().await.map(Err),
        }
    }

    /// 音频写入 writer，边界事件喂给字幕生成器
    pub async fn write_to<W>(
        &mut self,
        writer: &mut W,
        mut submaker: Option<&mut SubtitleMaker>,
    ) -> Result<(), StreamSinkError>
    where
        W: AsyncWrite + Unpin,
    {
        while let Some(item) = self.next().await {
            match item? {
                TtsChunk::Audio(data) => {
                    writer.write_all(&data).await?;
                }
                chunk => {
                    if let Some(maker) = submaker.as_deref_mut() {
                        maker.feed(&chunk)?;
                    }
                }
            }
        }
        Ok(())
    }

    /// 聚合全部音频字节；边界事件喂给字幕生成器
    pub async fn collect(
        &mut self,
        mut submaker: Option<&mut SubtitleMaker>,
    ) -> Result<Vec<u8>, StreamSinkError> {
        let mut audio = Vec::new();
        while let Some(item) = self.next().await {
            match item? {
                TtsChunk::Audio(data) => audio.extend_from_slice(&data),
                chunk => {
                    if let Some(maker) = submaker.as_deref_mut() {
                        maker.feed(&chunk)?;
                    }
                }
            }
        }
        Ok(audio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::BoundaryKind;

    fn make_stream(
        capacity: usize,
    ) -> (
        mpsc::Sender<TtsChunk>,
        mpsc::Sender<TtsError>,
        SpeechStream,
    ) {
        let (chunk_tx, chunk_rx) = mpsc::channel(capacity);
        let (err_tx, err_rx) = mpsc::channel(1);
        (chunk_tx, err_tx, SpeechStream::new(chunk_rx, err_rx))
    }

    #[tokio::test]
    async fn test_next_preserves_order_then_ends() {
        let (chunk_tx, err_tx, mut stream) = make_stream(8);

        chunk_tx.send(TtsChunk::Audio(vec![1])).await.unwrap();
        chunk_tx.send(TtsChunk::Audio(vec![2])).await.unwrap();
        drop(chunk_tx);
        drop(err_tx);

        assert_eq!(stream.next().await.unwrap().unwrap(), TtsChunk::Audio(vec![1]));
        assert_eq!(stream.next().await.unwrap().unwrap(), TtsChunk::Audio(vec![2]));
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn test_error_signal_drained_after_value_channel_closes() {
        let (chunk_tx, err_tx, mut stream) = make_stream(8);

        chunk_tx.send(TtsChunk::Audio(vec![1])).await.unwrap();
        err_tx.send(TtsError::NoAudioReceived).await.unwrap();
        drop(chunk_tx);
        drop(err_tx);

        // 已交付的部分输出先于错误给出
        assert!(stream.next().await.unwrap().is_ok());
        assert!(matches!(
            stream.next().await,
            Some(Err(TtsError::NoAudioReceived))
        ));
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn test_collect_splits_audio_and_boundaries() {
        let (chunk_tx, err_tx, mut stream) = make_stream(8);

        chunk_tx.send(TtsChunk::Audio(vec![1, 2])).await.unwrap();
        chunk_tx
            .send(TtsChunk::Boundary {
                kind: BoundaryKind::Sentence,
                offset: 0,
                duration: 10_000_000,
                text: "hi".to_string(),
            })
            .await
            .unwrap();
        chunk_tx.send(TtsChunk::Audio(vec![3])).await.unwrap();
        drop(chunk_tx);
        drop(err_tx);

        let mut maker = SubtitleMaker::new();
        let audio = stream.collect(Some(&mut maker)).await.unwrap();
        assert_eq!(audio, vec![1, 2, 3]);
        assert_eq!(maker.cues().len(), 1);
    }

    #[tokio::test]
    async fn test_write_to_sinks_audio() {
        let (chunk_tx, err_tx, mut stream) = make_stream(8);

        chunk_tx.send(TtsChunk::Audio(vec![0xaa, 0xbb])).await.unwrap();
        drop(chunk_tx);
        drop(err_tx);

        let mut sink = Vec::new();
        stream.write_to(&mut sink, None).await.unwrap();
        assert_eq!(sink, vec![0xaa, 0xbb]);
    }
}
