//! audio.metadata 帧的 JSON 模型
//!
//! 服务端格式：
//! `{"Metadata":[{"Type":"WordBoundary","Data":{"Offset":...,"Duration":...,"text":{"Text":"..."}}}]}`

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct MetadataResponse {
    #[serde(rename = "Metadata", default)]
    pub metadata: Vec<MetadataEntry>,
}

#[derive(Debug, Deserialize)]
pub struct MetadataEntry {
    #[serde(rename = "Type")]
    pub entry_type: String,

    #[serde(rename = "Data", default)]
    pub data: MetadataPayload,
}

#[derive(Debug, Default, Deserialize)]
pub struct MetadataPayload {
    /// 100ns 单位
    #[serde(rename = "Offset", default)]
    pub offset: u64,

    /// 100ns 单位
    #[serde(rename = "Duration", default)]
    pub duration: u64,

    #[serde(rename = "text", default)]
    pub text: MetadataText,
}

#[derive(Debug, Default, Deserialize)]
pub struct MetadataText {
    #[serde(rename = "Text", default)]
    pub text: String,
}
