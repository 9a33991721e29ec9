//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,

    /// TTS 会话配置
    #[serde(default)]
    pub tts: TtsConfig,

    /// 音色目录配置
    #[serde(default)]
    pub voices: VoicesConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,

    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    /// 获取服务器地址
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// TTS 会话配置
#[derive(Debug, Clone, Deserialize)]
pub struct TtsConfig {
    /// WebSocket 握手超时（秒）
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// 单次读取超时（秒）
    #[serde(default = "default_receive_timeout")]
    pub receive_timeout_secs: u64,
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_receive_timeout() -> u64 {
    60
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: default_connect_timeout(),
            receive_timeout_secs: default_receive_timeout(),
        }
    }
}

/// 音色目录配置
#[derive(Debug, Clone, Deserialize)]
pub struct VoicesConfig {
    /// 目录请求超时（秒）
    #[serde(default = "default_voices_timeout")]
    pub timeout_secs: u64,

    /// 目录缓存时间（秒）
    #[serde(default = "default_voices_cache")]
    pub cache_secs: u64,
}

fn default_voices_timeout() -> u64 {
    30
}

fn default_voices_cache() -> u64 {
    600
}

impl Default for VoicesConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_voices_timeout(),
            cache_secs: default_voices_cache(),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 5080);
        assert_eq!(config.tts.connect_timeout_secs, 10);
        assert_eq!(config.tts.receive_timeout_secs, 60);
        assert_eq!(config.voices.cache_secs, 600);
    }

    #[test]
    fn test_server_addr() {
        let config = ServerConfig::default();
        assert_eq!(config.addr(), "0.0.0.0:5080");
    }
}
