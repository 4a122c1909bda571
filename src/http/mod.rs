//! # HTTP 层
//!
//! ## 设计思路
//!
//! 路由、请求体上限、CORS 集中在这里装配；各处理函数只做参数适配，
//! 业务落在 `image_handler` / `storage` / `cards` 中。
//!
//! ## 路由一览
//!
//! | 方法 | 路径 | 处理函数 |
//! |------|------|----------|
//! | GET | `/`、`/card.html` | [`assets::index`] |
//! | GET | `/api/health` | [`health`] |
//! | POST | `/api/save_card` | [`cards::save_card`] |
//! | GET | `/api/cards/{card_id}` | [`cards::get_card`] |
//! | POST | `/api/upload_photo` | [`uploads::upload_photo`] |
//! | POST | `/api/upload_music` | [`uploads::upload_music`] |
//! | GET | `/uploads/{filename}` | [`assets::uploaded_file`] |
//! | GET | `/music/{filename}` | [`assets::music_file`] |

pub mod assets;
pub mod cards;
pub mod cors;
pub mod uploads;

use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::{Json, Router, middleware};
use serde_json::{Value, json};

use crate::cards::CardStore;
use crate::config::AppConfig;
use crate::error::AppError;
use crate::image_handler::{FitConfig, ImageFitter};
use crate::storage::UploadStore;

/// 请求处理共享状态，所有字段在启动时构造一次。
#[derive(Debug, Clone)]
pub struct AppState {
    pub fitter: ImageFitter,
    pub uploads: UploadStore,
    pub cards: CardStore,
    pub page_path: Arc<PathBuf>,
}

impl AppState {
    /// 根据配置构造各组件，并确保上传目录存在。
    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        let fit_config = FitConfig {
            max_file_size: config.max_content_length as u64,
            ..FitConfig::default()
        };
        let fitter = ImageFitter::new(fit_config)?;

        let uploads = UploadStore::new(&config.upload_dir, &config.music_dir);
        uploads.ensure_dirs()?;

        Ok(Self {
            fitter,
            cards: CardStore::new(&config.upload_dir),
            uploads,
            page_path: Arc::new(config.page_path.clone()),
        })
    }
}

/// 装配完整路由。
pub fn router(state: AppState, max_content_length: usize) -> Router {
    Router::new()
        .route("/", get(assets::index))
        .route("/card.html", get(assets::index))
        .route("/api/health", get(health))
        .route("/api/save_card", post(cards::save_card))
        .route("/api/cards/{card_id}", get(cards::get_card))
        .route("/api/upload_photo", post(uploads::upload_photo))
        .route("/api/upload_music", post(uploads::upload_music))
        .route("/uploads/{filename}", get(assets::uploaded_file))
        .route("/music/{filename}", get(assets::music_file))
        .layer(DefaultBodyLimit::max(max_content_length))
        .layer(middleware::from_fn(cors::cors))
        .with_state(state)
}

pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "app": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
