//! 流式数据块 - TTS 会话返回的音频与边界元数据

use serde::{Deserialize, Serialize};

/// 边界类型（词边界 / 句边界）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryKind {
    Word,
    Sentence,
}

impl BoundaryKind {
    /// 服务端元数据中的类型名
    pub fn as_metadata_type(&self) -> &'static str {
        match self {
            Self::Word => "WordBoundary",
            Self::Sentence => "SentenceBoundary",
        }
    }

    /// 从服务端元数据类型名解析
    pub fn from_metadata_type(s: &str) -> Option<Self> {
        match s {
            "WordBoundary" => Some(Self::Word),
            "SentenceBoundary" => Some(Self::Sentence),
            _ => None,
        }
    }
}

impl std::fmt::Display for BoundaryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_metadata_type())
    }
}

/// TTS 数据块
///
/// `offset` / `duration` 以 100 纳秒为单位（服务端原始单位，
/// 已叠加跨 chunk 的偏移补偿）
#[derive(Debug, Clone, PartialEq)]
pub enum TtsChunk {
    /// MP3 音频数据（原样转发，不做解码）
    Audio(Vec<u8>),
    /// 词/句边界事件
    Boundary {
        kind: BoundaryKind,
        offset: u64,
        duration: u64,
        text: String,
    },
}

impl TtsChunk {
    pub fn is_audio(&self) -> bool {
        matches!(self, Self::Audio(_))
    }

    pub fn is_boundary(&self) -> bool {
        matches!(self, Self::Boundary { .. })
    }
}
