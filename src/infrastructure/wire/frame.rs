//! 帧编解码
//!
//! 双工通道上承载两种帧：
//! - 文本帧：CRLF 分隔的 `Key:Value` 头块，空行（`\r\n\r\n`）后接 UTF-8 body
//! - 二进制帧：前两字节大端 `u16` 为头块长度，随后是文本式头块与 body

use std::collections::HashMap;

use chrono::Utc;

use crate::application::TtsError;
use crate::domain::BoundaryKind;
use crate::infrastructure::drm::generate_muid;

/// 帧头集合
pub type FrameHeaders = HashMap<String, String>;

/// 解析 CRLF 分隔的头块；每行按第一个 `:` 拆分，值不做修剪
fn parse_headers(block: &[u8]) -> FrameHeaders {
    let mut headers = FrameHeaders::new();
    for line in block.split(|&b| b == b'\n') {
        let line = match line.strip_suffix(b"\r") {
            Some(stripped) => stripped,
            None => line,
        };
        if let Some(colon) = line.iter().position(|&b| b == b':') {
            let key = String::from_utf8_lossy(&line[..colon]).into_owned();
            let value = String::from_utf8_lossy(&line[colon + 1..]).into_owned();
            headers.insert(key, value);
        }
    }
    headers
}

/// 解析文本帧
///
/// 扫描第一个 `\r\n\r\n`：之前是头块，之后是 body。
/// 找不到分隔符的帧返回 `None`（会话循环直接忽略）
pub fn parse_text_frame(data: &[u8]) -> Option<(FrameHeaders, &[u8])> {
    let separator = data.windows(4).position(|w| w == b"\r\n\r\n")?;
    let headers = parse_headers(&data[..separator]);
    Some((headers, &data[separator + 4..]))
}

/// 解析二进制帧
///
/// 前两字节为大端头块长度；`2 + header_len` 超出帧长的帧非法
pub fn parse_binary_frame(data: &[u8]) -> Result<(FrameHeaders, &[u8]), TtsError> {
    if data.len() < 2 {
        return Err(TtsError::UnexpectedResponse(
            "binary message missing header length".to_string(),
        ));
    }

    let header_len = u16::from_be_bytes([data[0], data[1]]) as usize;
    if 2 + header_len > data.len() {
        return Err(TtsError::UnexpectedResponse(
            "binary message header length exceeds frame length".to_string(),
        ));
    }

    let headers = parse_headers(&data[2..2 + header_len]);
    Ok((headers, &data[2 + header_len..]))
}

/// 发送时刻的 JavaScript 风格日期串（UTC）
pub fn date_to_string() -> String {
    Utc::now()
        .format("%a %b %d %Y %H:%M:%S GMT+0000 (Coordinated Universal Time)")
        .to_string()
}

/// 生成会话级请求标识（32 位大写十六进制）
pub fn connect_id() -> String {
    generate_muid()
}

/// 构造 speech.config 请求帧
///
/// 按边界模式恰好启用 sentence / word 之一
pub fn speech_config_frame(timestamp: &str, boundary: BoundaryKind) -> String {
    let (sentence_enabled, word_enabled) = match boundary {
        BoundaryKind::Sentence => ("true", "false"),
        BoundaryKind::Word => ("false", "true"),
    };

    format!(
        "X-Timestamp:{timestamp}\r\n\
         Content-Type:application/json; charset=utf-8\r\n\
         Path:speech.config\r\n\r\n\
         {{\"context\":{{\"synthesis\":{{\"audio\":{{\"metadataoptions\":\
         {{\"sentenceBoundaryEnabled\":\"{sentence_enabled}\",\"wordBoundaryEnabled\":\"{word_enabled}\"}},\
         \"outputFormat\":\"audio-24khz-48kbitrate-mono-mp3\"}}}}}}}}\r\n"
    )
}

/// 构造 SSML 请求帧
///
/// 时间戳后跟字面量 `Z`（config 帧没有，这个差异是刻意的）
pub fn ssml_frame(request_id: &str, timestamp: &str, ssml: &str) -> String {
    format!(
        "X-RequestId:{request_id}\r\n\
         Content-Type:application/ssml+xml\r\n\
         X-Timestamp:{timestamp}Z\r\n\
         Path:ssml\r\n\r\n\
         {ssml}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_text_frame() {
        let frame = b"Path:audio.metadata\r\nContent-Type:application/json\r\n\r\n{\"a\":1}";
        let (headers, body) = parse_text_frame(frame).unwrap();

        assert_eq!(headers.get("Path").map(String::as_str), Some("audio.metadata"));
        assert_eq!(
            headers.get("Content-Type").map(String::as_str),
            Some("application/json")
        );
        assert_eq!(body, b"{\"a\":1}");
    }

    #[test]
    fn test_parse_text_frame_without_separator() {
        assert!(parse_text_frame(b"Path:turn.start\r\n").is_none());
    }

    #[test]
    fn test_header_value_split_on_first_colon() {
        let frame = b"X-Timestamp:Mon Jan 02 2006 15:04:05\r\n\r\n";
        let (headers, _) = parse_text_frame(frame).unwrap();
        assert_eq!(
            headers.get("X-Timestamp").map(String::as_str),
            Some("Mon Jan 02 2006 15:04:05")
        );
    }

    #[test]
    fn test_parse_binary_frame() {
        let header_block = b"Path:audio\r\nContent-Type:audio/mpeg\r\n";
        let mut frame = Vec::new();
        frame.extend_from_slice(&(header_block.len() as u16).to_be_bytes());
        frame.extend_from_slice(header_block);
        frame.extend_from_slice(&[0xff, 0xf3, 0x01]);

        let (headers, body) = parse_binary_frame(&frame).unwrap();
        assert_eq!(headers.get("Path").map(String::as_str), Some("audio"));
        assert_eq!(
            headers.get("Content-Type").map(String::as_str),
            Some("audio/mpeg")
        );
        assert_eq!(body, &[0xff, 0xf3, 0x01]);
    }

    #[test]
    fn test_parse_binary_frame_rejects_short_frame() {
        let err = parse_binary_frame(&[0x00]).unwrap_err();
        assert!(matches!(err, TtsError::UnexpectedResponse(_)));
    }

    #[test]
    fn test_parse_binary_frame_rejects_inconsistent_length() {
        // 宣称 100 字节头块，实际帧只有 6 字节
        let frame = [0x00, 0x64, b'P', b'a', b't', b'h'];
        let err = parse_binary_frame(&frame).unwrap_err();
        assert!(matches!(err, TtsError::UnexpectedResponse(_)));
    }

    #[test]
    fn test_speech_config_frame_sentence_mode() {
        let frame = speech_config_frame("DATE", BoundaryKind::Sentence);
        assert!(frame.starts_with("X-Timestamp:DATE\r\n"));
        assert!(frame.contains("Path:speech.config\r\n\r\n"));
        assert!(frame.contains("\"sentenceBoundaryEnabled\":\"true\""));
        assert!(frame.contains("\"wordBoundaryEnabled\":\"false\""));
        assert!(frame.contains("\"outputFormat\":\"audio-24khz-48kbitrate-mono-mp3\""));
    }

    #[test]
    fn test_speech_config_frame_word_mode() {
        let frame = speech_config_frame("DATE", BoundaryKind::Word);
        assert!(frame.contains("\"sentenceBoundaryEnabled\":\"false\""));
        assert!(frame.contains("\"wordBoundaryEnabled\":\"true\""));
    }

    #[test]
    fn test_speech_config_frame_body_is_valid_json() {
        let frame = speech_config_frame("DATE", BoundaryKind::Sentence);
        let (_, body) = parse_text_frame(frame.as_bytes()).unwrap();
        let value: serde_json::Value = serde_json::from_slice(body).unwrap();
        assert_eq!(
            value["context"]["synthesis"]["audio"]["outputFormat"],
            "audio-24khz-48kbitrate-mono-mp3"
        );
    }

    #[test]
    fn test_ssml_frame_appends_z_to_timestamp() {
        let frame = ssml_frame("REQID", "DATE", "<speak/>");
        assert!(frame.contains("X-RequestId:REQID\r\n"));
        assert!(frame.contains("X-Timestamp:DATEZ\r\n"));
        assert!(frame.contains("Content-Type:application/ssml+xml\r\n"));
        assert!(frame.ends_with("Path:ssml\r\n\r\n<speak/>"));
    }

    #[test]
    fn test_date_to_string_shape() {
        let date = date_to_string();
        assert!(date.contains("GMT+0000 (Coordinated Universal Time)"));
        // "Mon Jan 02 2006 15:04:05 ..." 前缀：星期 月份 两位日
        let parts: Vec<&str> = date.split(' ').collect();
        assert_eq!(parts[2].len(), 2);
        assert_eq!(parts[3].len(), 4);
    }

    #[test]
    fn test_connect_id_shape() {
        let id = connect_id();
        assert_eq!(id.len(), 32);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
