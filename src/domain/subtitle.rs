//! 字幕组装
//!
//! 消费边界事件生成带时间轴的字幕，渲染为标准 SRT 文本。
//! 服务端时间单位为 100 纳秒，除以 10 得到微秒

use chrono::TimeDelta;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use super::chunk::{BoundaryKind, TtsChunk};

static MULTI_NEWLINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{2,}").unwrap());

/// 字幕组装错误
#[derive(Debug, Error)]
pub enum SubtitleError {
    /// 喂入了非边界数据块
    #[error("expected a WordBoundary or SentenceBoundary chunk")]
    NotBoundary,

    /// 同一篇字幕只允许一种边界类型（由第一条事件决定）
    #[error("expected cue kind '{expected}', but got '{got}'")]
    CueKindMismatch {
        expected: BoundaryKind,
        got: BoundaryKind,
    },
}

/// 单条字幕
#[derive(Debug, Clone, PartialEq)]
pub struct Cue {
    /// 1 起始序号（排序前分配）
    pub index: usize,
    pub start: TimeDelta,
    pub end: TimeDelta,
    pub content: String,
}

impl Cue {
    /// 渲染为一个 SRT 块：`INDEX\nSTART --> END\nCONTENT\n\n`
    pub fn to_srt_block(&self) -> String {
        format!(
            "{}\n{} --> {}\n{}\n\n",
            self.index,
            format_srt_timestamp(self.start),
            format_srt_timestamp(self.end),
            sanitize_content(&self.content)
        )
    }
}

/// 修整字幕内容：去掉首尾换行，连续空行折叠为单个换行
fn sanitize_content(content: &str) -> String {
    let trimmed = content.trim_matches('\n');
    MULTI_NEWLINE.replace_all(trimmed, "\n").into_owned()
}

/// `TimeDelta` → `HH:MM:SS,mmm`（秒数截断，毫秒取模）
pub fn format_srt_timestamp(d: TimeDelta) -> String {
    let total_seconds = d.num_seconds();
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    let milliseconds = d.num_milliseconds() % 1000;

    format!(
        "{:02}:{:02}:{:02},{:03}",
        hours, minutes, seconds, milliseconds
    )
}

/// `HH:MM:SS,mmm` → `TimeDelta`
pub fn parse_srt_timestamp(s: &str) -> Option<TimeDelta> {
    let (clock, millis) = s.split_once(',')?;
    let mut parts = clock.splitn(3, ':');

    let hours: i64 = parts.next()?.parse().ok()?;
    let minutes: i64 = parts.next()?.parse().ok()?;
    let seconds: i64 = parts.next()?.parse().ok()?;
    let millis: i64 = millis.parse().ok()?;

    Some(TimeDelta::milliseconds(
        (hours * 3600 + minutes * 60 + seconds) * 1000 + millis,
    ))
}

/// 排序并重建索引
///
/// 按 (start, end, 原始序号) 排序；丢弃空内容、负起点和
/// `start >= end` 的条目，幸存者从 `start_index` 连续编号
fn sort_and_reindex(cues: &[Cue], start_index: usize) -> Vec<Cue> {
    let mut sorted: Vec<Cue> = cues.to_vec();
    sorted.sort_by(|a, b| {
        a.start
            .cmp(&b.start)
            .then(a.end.cmp(&b.end))
            .then(a.index.cmp(&b.index))
    });

    let mut result: Vec<Cue> = Vec::with_capacity(sorted.len());
    for cue in sorted {
        if cue.content.trim().is_empty() {
            continue;
        }
        if cue.start < TimeDelta::zero() {
            continue;
        }
        if cue.start >= cue.end {
            continue;
        }

        result.push(Cue {
            index: start_index + result.len(),
            ..cue
        });
    }
    result
}

/// 组合全部字幕为 SRT 文本
pub fn compose_srt(cues: &[Cue], reindex: bool, start_index: usize) -> String {
    let cues = if reindex {
        sort_and_reindex(cues, start_index)
    } else {
        cues.to_vec()
    };

    let mut out = String::new();
    for cue in &cues {
        out.push_str(&cue.to_srt_block());
    }
    out
}

/// 字幕生成器
///
/// 逐条接收边界事件；第一条事件决定整篇字幕的边界类型
#[derive(Debug, Default)]
pub struct SubtitleMaker {
    cues: Vec<Cue>,
    kind: Option<BoundaryKind>,
}

impl SubtitleMaker {
    pub fn new() -> Self {
        Self::default()
    }

    /// 喂入一个边界数据块
    pub fn feed(&mut self, chunk: &TtsChunk) -> Result<(), SubtitleError> {
        let (kind, offset, duration, text) = match chunk {
            TtsChunk::Boundary {
                kind,
                offset,
                duration,
                text,
            } => (*kind, *offset, *duration, text),
            TtsChunk::Audio(_) => return Err(SubtitleError::NotBoundary),
        };

        match self.kind {
            None => self.kind = Some(kind),
            Some(expected) if expected != kind => {
                return Err(SubtitleError::CueKindMismatch { expected, got: kind });
            }
            Some(_) => {}
        }

        // 100ns → 微秒
        let start_micros = (offset / 10) as i64;
        let end_micros = ((offset + duration) / 10) as i64;

        self.cues.push(Cue {
            index: self.cues.len() + 1,
            start: TimeDelta::microseconds(start_micros),
            end: TimeDelta::microseconds(end_micros),
            content: text.clone(),
        });

        Ok(())
    }

    pub fn cues(&self) -> &[Cue] {
        &self.cues
    }

    pub fn cue_kind(&self) -> Option<BoundaryKind> {
        self.kind
    }

    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }

    /// 生成 SRT 文本
    pub fn to_srt(&self) -> String {
        compose_srt(&self.cues, true, 1)
    }
}
