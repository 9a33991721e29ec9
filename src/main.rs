//! Readaloud - Edge Read Aloud TTS 服务
//!
//! HTTP 外观入口：
//! - /api/voice/list      音色目录
//! - /api/tts/synthesize  整段合成

use std::time::Duration;

use readaloud::config::{load_config, print_config};
use readaloud::infrastructure::http::{AppState, HttpServer, ServerConfig};
use readaloud::infrastructure::tts::EdgeSessionConfig;
use readaloud::infrastructure::voices::VoiceListConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    // 初始化日志
    let log_filter = format!(
        "{},readaloud={},tower_http=debug",
        config.log.level, config.log.level
    );
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter)),
        )
        .init();

    tracing::info!("Readaloud - Edge Read Aloud TTS 服务");
    print_config(&config);

    // 会话与目录配置
    let session_config = EdgeSessionConfig::default()
        .with_connect_timeout(Duration::from_secs(config.tts.connect_timeout_secs))
        .with_receive_timeout(Duration::from_secs(config.tts.receive_timeout_secs));

    let voice_list_config = VoiceListConfig {
        timeout: Duration::from_secs(config.voices.timeout_secs),
    };

    // 创建 HTTP 服务器
    let server_config = ServerConfig::new(&config.server.host, config.server.port);
    let state = AppState::new(
        session_config,
        voice_list_config,
        Duration::from_secs(config.voices.cache_secs),
    );

    let server = HttpServer::new(server_config, state);

    tracing::info!("Starting HTTP server...");

    // 启动服务器（带优雅关闭）
    server
        .run_with_shutdown(async {
            tokio::signal::ctrl_c()
                .await
                .expect("Failed to listen for ctrl-c");
            tracing::info!("Received shutdown signal");
        })
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}
