//! 音色目录数据模型
//!
//! 服务端 `/voices/list` 返回的音色描述及筛选条件

use serde::{Deserialize, Serialize};

/// 音色标签（内容分类 / 个性）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VoiceTag {
    #[serde(rename = "ContentCategories", default)]
    pub content_categories: Vec<String>,

    #[serde(rename = "VoicePersonalities", default)]
    pub voice_personalities: Vec<String>,
}

/// 服务端音色描述
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Voice {
    #[serde(rename = "Name")]
    pub name: String,

    /// 短标识，如 `zh-CN-XiaoxiaoNeural`
    #[serde(rename = "ShortName")]
    pub short_name: String,

    #[serde(rename = "Gender")]
    pub gender: String,

    #[serde(rename = "Locale")]
    pub locale: String,

    #[serde(rename = "SuggestedCodec", default)]
    pub suggested_codec: String,

    #[serde(rename = "FriendlyName", default)]
    pub friendly_name: String,

    #[serde(rename = "Status", default)]
    pub status: String,

    #[serde(rename = "VoiceTag", default)]
    pub voice_tag: VoiceTag,
}

impl Voice {
    /// locale 的第一段作为语言代码（`zh-CN` → `zh`）
    pub fn language(&self) -> &str {
        self.locale.split('-').next().unwrap_or(&self.locale)
    }
}

/// 音色筛选条件；`None` 字段表示不限制
#[derive(Debug, Clone, Default)]
pub struct VoiceFilter {
    pub gender: Option<String>,
    pub locale: Option<String>,
    pub language: Option<String>,
}

impl VoiceFilter {
    pub fn matches(&self, voice: &Voice) -> bool {
        if let Some(gender) = &self.gender {
            if &voice.gender != gender {
                return false;
            }
        }
        if let Some(locale) = &self.locale {
            if &voice.locale != locale {
                return false;
            }
        }
        if let Some(language) = &self.language {
            if voice.language() != language {
                return false;
            }
        }
        true
    }
}
