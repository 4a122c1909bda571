//! # 贺卡后端 — 服务入口
//!
//! 本文件仅负责日志、配置与服务初始化。
//! 业务逻辑分布在各子模块中，详见 `lib.rs` 架构文档。

use card_backend::config::AppConfig;
use card_backend::error::AppError;
use card_backend::http::{self, AppState};

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(err) = run().await {
        log::error!("❌ 服务启动失败: {err}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    let config = AppConfig::load()?;
    log::info!("setup: config loaded {:?}", config);

    let state = AppState::from_config(&config)?;
    let info = state.uploads.dir_info();
    log::info!(
        "setup: upload dir {} ({} files, {} bytes)",
        info.path,
        info.file_count,
        info.total_size
    );
    let music = state.uploads.music_dir_info();
    log::info!(
        "setup: music dir {} ({} files, {} bytes)",
        music.path,
        music.file_count,
        music.total_size
    );

    let app = http::router(state, config.max_content_length);

    let addr = config.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!("🚀 服务已启动: http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log::info!("服务已停止");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        log::warn!("监听退出信号失败: {err}");
        std::future::pending::<()>().await;
    }
    log::info!("收到退出信号，正在关闭服务…");
}
