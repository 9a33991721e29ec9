//! Edge 合成会话 - WebSocket 会话引擎
//!
//! 实现 `SpeechSessionPort`：每个文本分片打开一条 WebSocket 会话，
//! 发送配置帧与 SSML 帧，消费音频与元数据帧直到 turn.end

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::time;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;

use crate::application::{SessionState, SpeechSessionPort, TtsError};
use crate::domain::ssml::build_ssml;
use crate::domain::{text, BoundaryKind, SpeechConfig, TtsChunk};
use crate::infrastructure::drm::Drm;
use crate::infrastructure::wire::constants::{wss_headers, SEC_MS_GEC_VERSION, WSS_URL};
use crate::infrastructure::wire::{
    connect_id, date_to_string, parse_binary_frame, parse_text_frame, speech_config_frame,
    ssml_frame, MetadataResponse,
};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Edge 会话配置
#[derive(Debug, Clone)]
pub struct EdgeSessionConfig {
    /// 握手超时
    pub connect_timeout: Duration,
    /// 单次读取超时（每次读取前重置）
    pub receive_timeout: Duration,
}

impl Default for EdgeSessionConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            receive_timeout: Duration::from_secs(60),
        }
    }
}

impl EdgeSessionConfig {
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_receive_timeout(mut self, timeout: Duration) -> Self {
        self.receive_timeout = timeout;
        self
    }
}

/// Edge 合成会话适配器
pub struct EdgeSpeechSession {
    config: EdgeSessionConfig,
    drm: Arc<Drm>,
}

impl EdgeSpeechSession {
    /// 创建会话适配器（使用进程级时钟状态）
    pub fn new(config: EdgeSessionConfig) -> Self {
        Self::with_drm(config, Drm::global())
    }

    /// 使用指定时钟状态创建
    pub fn with_drm(config: EdgeSessionConfig, drm: Arc<Drm>) -> Self {
        Self { config, drm }
    }

    /// 拼出带鉴权参数的会话 URL
    fn session_url(&self) -> String {
        format!(
            "{}&ConnectionId={}&Sec-MS-GEC={}&Sec-MS-GEC-Version={}",
            WSS_URL,
            connect_id(),
            self.drm.generate_sec_ms_gec(),
            SEC_MS_GEC_VERSION
        )
    }

    /// 建立 WebSocket 连接
    ///
    /// 握手被拒且带 HTTP 响应时，先用其 Date 头校准时钟再上抛错误，
    /// 让上层的重试拿到正确的令牌窗口
    async fn dial(&self, cancel: &CancellationToken) -> Result<WsStream, TtsError> {
        let mut request = self
            .session_url()
            .into_client_request()
            .map_err(|e| TtsError::WebSocket(format!("invalid websocket request: {}", e)))?;

        for (name, value) in wss_headers() {
            let value = HeaderValue::from_str(&value)
                .map_err(|e| TtsError::WebSocket(format!("invalid header value: {}", e)))?;
            request.headers_mut().insert(name, value);
        }

        let connect = time::timeout(self.config.connect_timeout, connect_async(request));
        tokio::select! {
            _ = cancel.cancelled() => Err(TtsError::Cancelled),
            result = connect => match result {
                Err(_) => Err(TtsError::WebSocket("handshake timed out".to_string())),
                Ok(Err(e)) => {
                    if let tungstenite::Error::Http(response) = &e {
                        let date = response
                            .headers()
                            .get("Date")
                            .and_then(|v| v.to_str().ok());
                        if date.is_some() {
                            let _ = self.drm.calibrate_from_date_header(date);
                        }
                    }
                    Err(TtsError::WebSocket(format!("websocket dial error: {}", e)))
                }
                Ok(Ok((ws, _response))) => Ok(ws),
            },
        }
    }

    /// 发送一个出站帧
    async fn send_frame(
        &self,
        ws: &mut WsStream,
        cancel: &CancellationToken,
        message: Message,
        context: &str,
    ) -> Result<(), TtsError> {
        tokio::select! {
            _ = cancel.cancelled() => Err(TtsError::Cancelled),
            result = ws.send(message) => {
                result.map_err(|e| TtsError::WebSocket(format!("{}: {}", context, e)))
            }
        }
    }

    /// 向消费者队列投递事件（可被取消打断）
    async fn emit(
        &self,
        sink: &mpsc::Sender<TtsChunk>,
        cancel: &CancellationToken,
        chunk: TtsChunk,
    ) -> Result<(), TtsError> {
        tokio::select! {
            _ = cancel.cancelled() => Err(TtsError::Cancelled),
            result = sink.send(chunk) => result.map_err(|_| TtsError::Cancelled),
        }
    }

    /// 会话主循环：发送请求帧，消费响应直到 turn.end 或通道关闭
    async fn run_session(
        &self,
        config: &SpeechConfig,
        state: &mut SessionState,
        sink: &mpsc::Sender<TtsChunk>,
        cancel: &CancellationToken,
        ws: &mut WsStream,
    ) -> Result<(), TtsError> {
        let config_frame = speech_config_frame(&date_to_string(), config.boundary);
        self.send_frame(ws, cancel, Message::Text(config_frame), "write config error")
            .await?;

        let ssml = build_ssml(config, &state.partial_text);
        let request = ssml_frame(&connect_id(), &date_to_string(), &ssml);
        self.send_frame(ws, cancel, Message::Text(request), "write ssml error")
            .await?;

        let mut audio_received = false;

        loop {
            let message = tokio::select! {
                _ = cancel.cancelled() => return Err(TtsError::Cancelled),
                result = time::timeout(self.config.receive_timeout, ws.next()) => match result {
                    Err(_) => return Err(TtsError::WebSocket("receive timed out".to_string())),
                    Ok(None) => break,
                    Ok(Some(Err(e))) => {
                        return Err(TtsError::WebSocket(format!("read message error: {}", e)))
                    }
                    Ok(Some(Ok(message))) => message,
                },
            };

            match message {
                Message::Text(data) => {
                    let (headers, body) = match parse_text_frame(data.as_bytes()) {
                        Some(parsed) => parsed,
                        None => continue,
                    };

                    match headers.get("Path").map(String::as_str) {
                        Some("audio.metadata") => {
                            let chunk = parse_metadata_frame(body, state.offset_compensation)?;
                            if let TtsChunk::Boundary {
                                offset, duration, ..
                            } = &chunk
                            {
                                state.last_duration_offset = offset + duration;
                            }
                            self.emit(sink, cancel, chunk).await?;
                        }
                        Some("turn.end") => {
                            state.advance_compensation();
                            break;
                        }
                        Some("response") | Some("turn.start") => {}
                        other => {
                            return Err(TtsError::UnknownResponse(format!(
                                "unknown path: {}",
                                other.unwrap_or("")
                            )))
                        }
                    }
                }
                Message::Binary(data) => {
                    let (headers, body) = parse_binary_frame(&data)?;

                    if headers.get("Path").map(String::as_str) != Some("audio") {
                        return Err(TtsError::UnexpectedResponse(
                            "binary message path is not audio".to_string(),
                        ));
                    }

                    match headers.get("Content-Type").map(String::as_str) {
                        Some("audio/mpeg") => {
                            if body.is_empty() {
                                return Err(TtsError::UnexpectedResponse(
                                    "audio content type but no data".to_string(),
                                ));
                            }
                            audio_received = true;
                            self.emit(sink, cancel, TtsChunk::Audio(body.to_vec())).await?;
                        }
                        None => {
                            // 无 Content-Type 的空帧是保活
                            if !body.is_empty() {
                                return Err(TtsError::UnexpectedResponse(
                                    "no content type but has data".to_string(),
                                ));
                            }
                        }
                        Some(other) => {
                            return Err(TtsError::UnexpectedResponse(format!(
                                "unexpected content type: {}",
                                other
                            )))
                        }
                    }
                }
                Message::Close(_) => break,
                _ => {}
            }
        }

        if !audio_received {
            return Err(TtsError::NoAudioReceived);
        }
        Ok(())
    }
}

#[async_trait]
impl SpeechSessionPort for EdgeSpeechSession {
    async fn synthesize_chunk(
        &self,
        config: &SpeechConfig,
        state: &mut SessionState,
        sink: &mpsc::Sender<TtsChunk>,
        cancel: &CancellationToken,
    ) -> Result<(), TtsError> {
        tracing::debug!(
            text_len = state.partial_text.len(),
            offset_compensation = state.offset_compensation,
            "Opening synthesis session"
        );

        let mut ws = self.dial(cancel).await?;
        let result = self.run_session(config, state, sink, cancel, &mut ws).await;

        // 所有退出路径都释放连接
        let _ = ws.close(None).await;

        if result.is_ok() {
            tracing::debug!(
                last_duration_offset = state.last_duration_offset,
                "Synthesis session completed"
            );
        }
        result
    }
}

/// 解析 audio.metadata 帧
///
/// 每帧只取第一条可识别的边界记录，后续条目丢弃；
/// `SessionEnd` 跳过，其他类型为未知响应
fn parse_metadata_frame(body: &[u8], offset_compensation: u64) -> Result<TtsChunk, TtsError> {
    let response: MetadataResponse = serde_json::from_slice(body)
        .map_err(|e| TtsError::UnexpectedResponse(format!("malformed metadata: {}", e)))?;

    for entry in &response.metadata {
        if let Some(kind) = BoundaryKind::from_metadata_type(&entry.entry_type) {
            return Ok(TtsChunk::Boundary {
                kind,
                offset: entry.data.offset + offset_compensation,
                duration: entry.data.duration,
                text: text::unescape_xml(&entry.data.text.text),
            });
        }
        if entry.entry_type == "SessionEnd" {
            continue;
        }
        return Err(TtsError::UnknownResponse(format!(
            "unknown metadata type: {}",
            entry.entry_type
        )));
    }

    Err(TtsError::UnexpectedResponse(
        "no boundary metadata found".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata_json(entries: &str) -> Vec<u8> {
        format!(r#"{{"Metadata":[{}]}}"#, entries).into_bytes()
    }

    #[test]
    fn test_config_defaults() {
        let config = EdgeSessionConfig::default();
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
        assert_eq!(config.receive_timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_config_builder() {
        let config = EdgeSessionConfig::default()
            .with_connect_timeout(Duration::from_secs(5))
            .with_receive_timeout(Duration::from_secs(30));
        assert_eq!(config.connect_timeout, Duration::from_secs(5));
        assert_eq!(config.receive_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_session_url_carries_auth_parameters() {
        let session = EdgeSpeechSession::with_drm(
            EdgeSessionConfig::default(),
            Arc::new(Drm::new()),
        );
        let url = session.session_url();
        assert!(url.contains("TrustedClientToken="));
        assert!(url.contains("&ConnectionId="));
        assert!(url.contains("&Sec-MS-GEC="));
        assert!(url.contains(&format!("&Sec-MS-GEC-Version={}", SEC_MS_GEC_VERSION)));
    }

    #[test]
    fn test_parse_metadata_applies_compensation() {
        let body = metadata_json(
            r#"{"Type":"WordBoundary","Data":{"Offset":100,"Duration":50,"text":{"Text":"hi"}}}"#,
        );
        let chunk = parse_metadata_frame(&body, 1_000).unwrap();
        assert_eq!(
            chunk,
            TtsChunk::Boundary {
                kind: BoundaryKind::Word,
                offset: 1_100,
                duration: 50,
                text: "hi".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_metadata_unescapes_text() {
        let body = metadata_json(
            r#"{"Type":"SentenceBoundary","Data":{"Offset":0,"Duration":1,"text":{"Text":"Tom &amp; Jerry"}}}"#,
        );
        let chunk = parse_metadata_frame(&body, 0).unwrap();
        assert!(matches!(
            chunk,
            TtsChunk::Boundary { ref text, .. } if text == "Tom & Jerry"
        ));
    }

    #[test]
    fn test_parse_metadata_emits_only_first_entry() {
        let body = metadata_json(
            r#"{"Type":"WordBoundary","Data":{"Offset":1,"Duration":1,"text":{"Text":"first"}}},
               {"Type":"WordBoundary","Data":{"Offset":2,"Duration":1,"text":{"Text":"second"}}}"#,
        );
        let chunk = parse_metadata_frame(&body, 0).unwrap();
        assert!(matches!(
            chunk,
            TtsChunk::Boundary { ref text, .. } if text == "first"
        ));
    }

    #[test]
    fn test_parse_metadata_skips_session_end_before_boundary() {
        let body = metadata_json(
            r#"{"Type":"SessionEnd"},
               {"Type":"SentenceBoundary","Data":{"Offset":7,"Duration":1,"text":{"Text":"x"}}}"#,
        );
        let chunk = parse_metadata_frame(&body, 0).unwrap();
        assert!(matches!(chunk, TtsChunk::Boundary { offset: 7, .. }));
    }

    #[test]
    fn test_parse_metadata_unknown_type_is_fatal() {
        let body = metadata_json(r#"{"Type":"ParagraphBoundary"}"#);
        let err = parse_metadata_frame(&body, 0).unwrap_err();
        assert!(matches!(err, TtsError::UnknownResponse(_)));
    }

    #[test]
    fn test_parse_metadata_without_boundary_is_unexpected() {
        let body = metadata_json(r#"{"Type":"SessionEnd"}"#);
        let err = parse_metadata_frame(&body, 0).unwrap_err();
        assert!(matches!(err, TtsError::UnexpectedResponse(_)));

        let err = parse_metadata_frame(&metadata_json(""), 0).unwrap_err();
        assert!(matches!(err, TtsError::UnexpectedResponse(_)));
    }

    #[test]
    fn test_parse_metadata_malformed_json() {
        let err = parse_metadata_frame(b"not json", 0).unwrap_err();
        assert!(matches!(err, TtsError::UnexpectedResponse(_)));
    }
}
