//! 静态内容：单页 HTML 与已上传文件。
//!
//! `Content-Type` 先用 `infer` 按文件签名判断，识别不了再看扩展名。

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};

use super::AppState;
use crate::error::AppError;
use crate::filename::extension;

/// `GET /` 与 `GET /card.html`
pub async fn index(State(state): State<AppState>) -> Result<Response, AppError> {
    let bytes = match tokio::fs::read(state.page_path.as_path()).await {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Err(AppError::NotFound(format!(
                "找不到页面: {}",
                state.page_path.display()
            )));
        }
        Err(err) => return Err(err.into()),
    };

    Ok(([(header::CONTENT_TYPE, "text/html; charset=utf-8")], bytes).into_response())
}

/// `GET /uploads/{filename}`
pub async fn uploaded_file(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response, AppError> {
    let bytes = state.uploads.read_upload(&filename).await?;
    Ok(file_response(&filename, bytes))
}

/// `GET /music/{filename}`
pub async fn music_file(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response, AppError> {
    let bytes = state.uploads.read_music(&filename).await?;
    Ok(file_response(&filename, bytes))
}

fn file_response(filename: &str, bytes: Vec<u8>) -> Response {
    let content_type = content_type_for(filename, &bytes);
    ([(header::CONTENT_TYPE, content_type)], bytes).into_response()
}

pub(crate) fn content_type_for(filename: &str, bytes: &[u8]) -> &'static str {
    if let Some(kind) = infer::get(bytes) {
        return kind.mime_type();
    }

    match extension(filename).as_deref() {
        Some("json") => "application/json",
        Some("html") | Some("htm") => "text/html; charset=utf-8",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("mp3") => "audio/mpeg",
        Some("wav") => "audio/wav",
        _ => "application/octet-stream",
    }
}
