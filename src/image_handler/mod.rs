//! # 图片适配模块（image_handler）
//!
//! ## 设计思路
//!
//! 该模块将“解码校验 → 几何布局 → 重采样合成 → 内存编码”按职责拆分为多个子模块，
//! 对上层只暴露一个无状态的 `ImageFitter`。
//!
//! - `handler`：编排整条处理流水线（含阶段耗时日志）
//! - `geometry`：等比缩放比例、缩放尺寸与居中偏移（纯函数）
//! - `pipeline`：签名校验、像素限制、解码、Lanczos 重采样、画布合成
//! - `encoder`：按原格式（或回退 JPEG）在内存中完整编码
//! - `config/error/source`：配置、错误、中间数据模型
//!
//! ## 新同事快速上手
//!
//! ```text
//! POST /api/upload_photo
//!    ↓
//! http/uploads.rs（字段/扩展名校验）
//!    ↓
//! handler.rs（spawn_blocking + 阶段耗时日志）
//!    ├─ pipeline.rs（解码 + 像素限制 + 重采样 + 合成）
//!    │    └─ geometry.rs（ratio / new_w / new_h / x / y）
//!    └─ encoder.rs（PNG / JPEG / GIF）
//!    ↓
//! storage.rs（整块写入上传目录）
//! ```
//!
//! 整个模块不触碰磁盘：失败时不会留下任何半成品文件。

mod config;
mod encoder;
mod error;
mod geometry;
mod handler;
mod pipeline;
mod source;

pub use config::{
    BACKGROUND_RGB, FitConfig, JPEG_QUALITY, MAX_DECODED_PIXELS, TARGET_HEIGHT, TARGET_WIDTH,
};
pub use error::ImageError;
pub use geometry::{FitLayout, compute_layout};
pub use handler::ImageFitter;
pub use source::{FittedImage, RawUpload, SourceImage};
