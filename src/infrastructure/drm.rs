//! DRM - 时钟偏移校正与能力令牌
//!
//! 服务端的反滥用检查要求 `Sec-MS-GEC` 令牌基于正确的时间窗口。
//! 本模块维护进程级的时钟偏移量，从服务端响应的 Date 头校准，
//! 并据校正后的时间派生令牌

use std::sync::{Arc, RwLock};

use chrono::{DateTime, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::application::TtsError;
use crate::infrastructure::wire::constants::TRUSTED_CLIENT_TOKEN;

/// Windows 文件时间纪元与 Unix 纪元的偏移（秒）
const WIN_EPOCH_SECS: f64 = 11_644_473_600.0;

/// 令牌时间窗口（秒）
const TOKEN_WINDOW_SECS: i64 = 300;

/// 进程级默认实例
static GLOBAL_DRM: Lazy<Arc<Drm>> = Lazy::new(|| Arc::new(Drm::new()));

/// 时钟状态
///
/// 偏移量读取取共享锁，校准取独占锁
#[derive(Debug, Default)]
pub struct Drm {
    clock_skew_seconds: RwLock<f64>,
}

impl Drm {
    pub fn new() -> Self {
        Self::default()
    }

    /// 进程级默认实例（需要独立时钟状态的调用方可自建实例注入）
    pub fn global() -> Arc<Drm> {
        GLOBAL_DRM.clone()
    }

    /// 调整时钟偏移
    pub fn adjust_clock_skew(&self, delta_seconds: f64) {
        let mut skew = self
            .clock_skew_seconds
            .write()
            .unwrap_or_else(|e| e.into_inner());
        *skew += delta_seconds;
    }

    /// 当前偏移量
    pub fn clock_skew_seconds(&self) -> f64 {
        *self
            .clock_skew_seconds
            .read()
            .unwrap_or_else(|e| e.into_inner())
    }

    /// 校正后的 Unix 时间戳（秒）
    pub fn unix_timestamp(&self) -> f64 {
        Utc::now().timestamp() as f64 + self.clock_skew_seconds()
    }

    /// 从服务端响应的 Date 头校准时钟
    ///
    /// 头缺失或无法解析时返回 `SkewAdjustment`
    pub fn calibrate_from_date_header(&self, date: Option<&str>) -> Result<(), TtsError> {
        let date = date
            .ok_or_else(|| TtsError::SkewAdjustment("no server date in headers".to_string()))?;

        let server_timestamp = parse_rfc2616_date(date).ok_or_else(|| {
            TtsError::SkewAdjustment(format!("failed to parse server date: {}", date))
        })?;

        let client_timestamp = self.unix_timestamp();
        self.adjust_clock_skew(server_timestamp - client_timestamp);

        tracing::debug!(
            server = server_timestamp,
            skew = self.clock_skew_seconds(),
            "Clock skew calibrated from server date"
        );
        Ok(())
    }

    /// 生成 `Sec-MS-GEC` 令牌
    ///
    /// 校正时间 + Windows 纪元偏移，向下取整到 5 分钟窗口，
    /// 换算为 100ns tick 后与 TrustedClientToken 拼接，
    /// 取 SHA-256 的大写十六进制
    pub fn generate_sec_ms_gec(&self) -> String {
        let mut ticks = self.unix_timestamp();
        ticks += WIN_EPOCH_SECS;
        ticks -= (ticks as i64 % TOKEN_WINDOW_SECS) as f64;
        ticks *= 1e7;

        // 整数形式拼接，不带小数点
        let payload = format!("{:.0}{}", ticks, TRUSTED_CLIENT_TOKEN);
        let digest = Sha256::digest(payload.as_bytes());
        hex::encode_upper(digest)
    }
}

/// 解析 RFC 2616 日期（两种常见 HTTP 日期写法）
pub fn parse_rfc2616_date(date: &str) -> Option<f64> {
    if let Ok(parsed) = DateTime::parse_from_rfc2822(date) {
        return Some(parsed.timestamp() as f64);
    }
    NaiveDateTime::parse_from_str(date, "%a, %d %b %Y %H:%M:%S GMT")
        .ok()
        .map(|naive| naive.and_utc().timestamp() as f64)
}

/// 生成随机 MUID / 连接标识（32 位大写十六进制，128 bit 随机）
pub fn generate_muid() -> String {
    Uuid::new_v4().simple().to_string().to_uppercase()
}
