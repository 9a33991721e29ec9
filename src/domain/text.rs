//! 文本预处理
//!
//! 提供发送给合成服务前的文本管线：
//! 1. 清理服务端不接受的控制字符
//! 2. XML 转义
//! 3. 按字节预算安全分片（不切断 UTF-8 字符和 XML 实体）

/// 默认单个请求的文本字节预算
pub const DEFAULT_BYTE_BUDGET: usize = 4096;

/// 清理服务端不兼容的控制字符
///
/// U+0000–U+0008、U+000B–U+000C、U+000E–U+001F 替换为空格；
/// 制表符、换行、回车原样保留
pub fn remove_incompatible_characters(text: &str) -> String {
    text.chars()
        .map(|c| {
            let code = c as u32;
            if code <= 8 || (11..=12).contains(&code) || (14..=31).contains(&code) {
                ' '
            } else {
                c
            }
        })
        .collect()
}

/// XML 文本转义
pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// XML 反转义（服务端元数据文本使用；兼容数字实体写法）
pub fn unescape_xml(text: &str) -> String {
    text.replace("&quot;", "\"")
        .replace("&#34;", "\"")
        .replace("&apos;", "'")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

/// 在 limit 范围内查找最后的换行符或空格
fn last_newline_or_space(bytes: &[u8], limit: usize) -> Option<usize> {
    bytes[..limit]
        .iter()
        .rposition(|&b| b == b'\n')
        .or_else(|| bytes[..limit].iter().rposition(|&b| b == b' '))
}

/// limit 以内最大的合法 UTF-8 前缀长度
fn safe_utf8_split_point(text: &str, limit: usize) -> usize {
    let mut split = limit;
    while split > 0 && !text.is_char_boundary(split) {
        split -= 1;
    }
    split
}

/// 调整分割点以避免切断 XML 实体
///
/// 只要 `text[..split]` 中存在 `&` 且该 `&` 与分割点之间没有 `;`，
/// 就把分割点回退到该 `&`
fn adjust_for_xml_entity(bytes: &[u8], mut split: usize) -> usize {
    while split > 0 {
        match bytes[..split].iter().rposition(|&b| b == b'&') {
            Some(amp) => {
                if bytes[amp..split].contains(&b';') {
                    break;
                }
                split = amp;
            }
            None => break,
        }
    }
    split
}

/// 按字节预算分割已转义文本
///
/// 分割点优先级：
/// 1. 预算内最后一个换行符
/// 2. 预算内最后一个空格
/// 3. 预算内最大的合法 UTF-8 前缀
///
/// 之后做实体保护回退；`split == 0` 时强制前进一个字节。
/// 每个分片都去除首尾空白，空分片丢弃
pub fn split_text_by_byte_length(text: &str, byte_length: usize) -> Vec<String> {
    if byte_length == 0 {
        return Vec::new();
    }

    let mut rest = text;
    let mut result = Vec::new();

    while rest.len() > byte_length {
        let bytes = rest.as_bytes();
        let mut split = match last_newline_or_space(bytes, byte_length) {
            Some(at) => at,
            None => safe_utf8_split_point(rest, byte_length),
        };
        split = adjust_for_xml_entity(bytes, split);

        if split == 0 {
            split = 1;
        }
        // 预算小于一个多字节字符时向前对齐到字符边界，保证前进
        while split < rest.len() && !rest.is_char_boundary(split) {
            split += 1;
        }

        let (chunk, tail) = rest.split_at(split);
        let chunk = chunk.trim();
        if !chunk.is_empty() {
            result.push(chunk.to_string());
        }
        rest = tail;
    }

    let remaining = rest.trim();
    if !remaining.is_empty() {
        result.push(remaining.to_string());
    }

    result
}

/// 完整管线：清理 + 转义 + 分片
pub fn prepare_text(text: &str, byte_length: usize) -> Vec<String> {
    let cleaned = remove_incompatible_characters(text);
    let escaped = escape_xml(&cleaned);
    split_text_by_byte_length(&escaped, byte_length)
}
