//! 服务端点与浏览器仿真常量
//!
//! 这些值在服务端的白名单校验范围内，必须逐字节一致

use crate::infrastructure::drm::generate_muid;

/// 信任客户端令牌（服务端固定值）
pub const TRUSTED_CLIENT_TOKEN: &str = "6A5AA1D4EAFF4E9FB37E23D68491D6F4";

/// WebSocket 合成端点（已带 TrustedClientToken 参数）
pub const WSS_URL: &str = "wss://speech.platform.bing.com/consumer/speech/synthesize/\
                           readaloud/edge/v1?TrustedClientToken=6A5AA1D4EAFF4E9FB37E23D68491D6F4";

/// 音色目录端点（已带 trustedclienttoken 参数）
pub const VOICE_LIST_URL: &str = "https://speech.platform.bing.com/consumer/speech/synthesize/\
                                  readaloud/voices/list?trustedclienttoken=6A5AA1D4EAFF4E9FB37E23D68491D6F4";

/// 仿真的 Chromium / Edge 版本
pub const CHROMIUM_FULL_VERSION: &str = "143.0.3650.75";
pub const CHROMIUM_MAJOR_VERSION: &str = "143";

/// `Sec-MS-GEC-Version` 参数值
pub const SEC_MS_GEC_VERSION: &str = "1-143.0.3650.75";

/// 浏览器 User-Agent
pub fn user_agent() -> String {
    format!(
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
         Chrome/{major}.0.0.0 Safari/537.36 Edg/{major}.0.0.0",
        major = CHROMIUM_MAJOR_VERSION
    )
}

/// 所有出站请求共用的基础头
pub fn base_headers() -> Vec<(&'static str, String)> {
    vec![
        ("User-Agent", user_agent()),
        ("Accept-Encoding", "gzip, deflate, br, zstd".to_string()),
        ("Accept-Language", "en-US,en;q=0.9".to_string()),
    ]
}

/// WebSocket 升级请求头（含每次请求随机的 MUID cookie）
pub fn wss_headers() -> Vec<(&'static str, String)> {
    let mut headers = base_headers();
    headers.push(("Pragma", "no-cache".to_string()));
    headers.push(("Cache-Control", "no-cache".to_string()));
    headers.push((
        "Origin",
        "chrome-extension://jdiccldimpdaibmpdkjnbmckianbfold".to_string(),
    ));
    headers.push(("Cookie", format!("muid={};", generate_muid())));
    headers
}

/// 音色目录请求头（含每次请求随机的 MUID cookie）
pub fn voice_list_headers() -> Vec<(&'static str, String)> {
    let mut headers = base_headers();
    headers.push(("Authority", "speech.platform.bing.com".to_string()));
    headers.push((
        "Sec-CH-UA",
        format!(
            r#"" Not;A Brand";v="99", "Microsoft Edge";v="{major}", "Chromium";v="{major}""#,
            major = CHROMIUM_MAJOR_VERSION
        ),
    ));
    headers.push(("Sec-CH-UA-Mobile", "?0".to_string()));
    headers.push(("Accept", "*/*".to_string()));
    headers.push(("Sec-Fetch-Site", "none".to_string()));
    headers.push(("Sec-Fetch-Mode", "cors".to_string()));
    headers.push(("Sec-Fetch-Dest", "empty".to_string()));
    headers.push(("Cookie", format!("muid={};", generate_muid())));
    headers
}
