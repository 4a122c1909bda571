//! 统一错误类型模块
//!
//! # 设计思路
//!
//! 定义全局统一的 `AppError` 枚举，替代各模块中分散的
//! `.map_err(|e| e.to_string())`、`format!(...)`、`expect()` 等不一致模式。
//!
//! 所有 HTTP 处理函数统一返回 `Result<T, AppError>`，
//! 前端通过 `{ "success": false, "message": ... }` 获得一致的错误结构。
//!
//! # 实现思路
//!
//! - 使用 `thiserror` 派生可读错误消息。
//! - 为 `ImageError`、`std::io::Error` 等提供 `From` 转换，无需手动 map。
//! - 实现 `IntoResponse`：按错误类别映射 HTTP 状态码，服务端错误写入日志。

use axum::Json;
use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::image_handler::ImageError;

/// 应用级统一错误类型
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// 请求参数不合法（缺少文件、文件名为空、扩展名不允许）
    #[error("{0}")]
    Validation(String),

    /// 请求的卡片或文件不存在
    #[error("{0}")]
    NotFound(String),

    /// 图片适配流水线错误（解码 / 编码）
    #[error("{0}")]
    Image(#[from] ImageError),

    /// 文件系统 I/O 错误
    #[error("文件系统错误: {0}")]
    Io(#[from] std::io::Error),

    /// JSON 序列化 / 反序列化失败
    #[error("JSON 处理失败: {0}")]
    Json(#[from] serde_json::Error),

    /// multipart 请求体读取失败
    #[error("上传数据读取失败: {0}")]
    Multipart(#[from] MultipartError),

    /// 存储目录不可用或数据损坏
    #[error("存储错误: {0}")]
    Storage(String),

    /// 启动配置错误
    #[error("配置错误: {0}")]
    Config(String),
}

/// 错误响应体
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub message: String,
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Multipart(err) => err.status(),
            Self::Image(_) | Self::Io(_) | Self::Json(_) | Self::Storage(_) | Self::Config(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// 给 5xx 错误加上操作前缀，例如 “上传失败: ...”，与前端既有文案保持一致。
    pub fn with_context(self, context: &str) -> ContextError {
        ContextError {
            context: context.to_string(),
            inner: self,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.to_string();
        render(status, message)
    }
}

/// 带操作上下文的错误，仅用于 HTTP 层渲染。
#[derive(Debug)]
pub struct ContextError {
    context: String,
    inner: AppError,
}

impl IntoResponse for ContextError {
    fn into_response(self) -> Response {
        let status = self.inner.status_code();
        let message = if status.is_server_error() {
            format!("{}: {}", self.context, self.inner)
        } else {
            self.inner.to_string()
        };
        render(status, message)
    }
}

fn render(status: StatusCode, message: String) -> Response {
    if status.is_server_error() {
        log::error!("❌ 请求处理失败 ({}): {}", status.as_u16(), message);
    } else {
        log::warn!("⚠️ 请求被拒绝 ({}): {}", status.as_u16(), message);
    }

    (
        status,
        Json(ErrorBody {
            success: false,
            message,
        }),
    )
        .into_response()
}
