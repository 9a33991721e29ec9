//! Wire Protocol - 帧协议层
//!
//! 双工通道的帧编解码、服务端点常量与元数据模型

pub mod constants;
pub mod frame;
pub mod metadata;

pub use frame::{
    connect_id, date_to_string, parse_binary_frame, parse_text_frame, speech_config_frame,
    ssml_frame, FrameHeaders,
};
pub use metadata::{MetadataEntry, MetadataResponse};
