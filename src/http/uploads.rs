//! 上传接口：照片（经图片适配器处理）与音乐（原样保存）。
//!
//! 校验顺序固定：缺少文件字段 → 文件名为空 → 扩展名不在白名单，
//! 三者都以 400 返回，不会进入图片适配流程。

use axum::Json;
use axum::body::Bytes;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use chrono::Utc;
use serde::Serialize;

use super::AppState;
use crate::error::{AppError, ContextError};
use crate::filename::{
    MUSIC_EXTENSIONS, PHOTO_EXTENSIONS, allowed_file, music_upload_name, photo_upload_name,
};
use crate::image_handler::RawUpload;

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub filename: String,
    pub url: String,
}

/// 从表单中取出的文件字段
struct UploadedFile {
    file_name: String,
    bytes: Bytes,
}

/// `POST /api/upload_photo`，表单字段 `photo`
pub async fn upload_photo(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, ContextError> {
    handle_photo(&state, multipart)
        .await
        .map(Json)
        .map_err(|e| e.with_context("上传失败"))
}

/// `POST /api/upload_music`，表单字段 `music`
pub async fn upload_music(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, ContextError> {
    handle_music(&state, multipart)
        .await
        .map(Json)
        .map_err(|e| e.with_context("上传失败"))
}

async fn handle_photo(
    state: &AppState,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<UploadResponse, AppError> {
    let file = take_file(multipart, "photo", "没有上传文件").await?;
    validate_file_name(&file.file_name, PHOTO_EXTENSIONS)?;

    let filename = photo_upload_name(&file.file_name, Utc::now());
    log::info!(
        "📷 收到照片上传: {} ({} bytes) -> {}",
        file.file_name,
        file.bytes.len(),
        filename
    );

    let fitted = state
        .fitter
        .process_blocking(RawUpload {
            bytes: file.bytes,
            source_hint: file.file_name,
        })
        .await?;

    state.uploads.save_photo(&filename, &fitted.bytes).await?;

    Ok(UploadResponse {
        success: true,
        url: format!("/uploads/{}", filename),
        filename,
    })
}

async fn handle_music(
    state: &AppState,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<UploadResponse, AppError> {
    let file = take_file(multipart, "music", "没有上传音乐文件").await?;
    validate_file_name(&file.file_name, MUSIC_EXTENSIONS)?;

    let filename = music_upload_name(&file.file_name);
    log::info!(
        "🎵 收到音乐上传: {} ({} bytes) -> {}",
        file.file_name,
        file.bytes.len(),
        filename
    );

    state.uploads.save_music(&filename, &file.bytes).await?;

    Ok(UploadResponse {
        success: true,
        url: format!("/music/{}", filename),
        filename,
    })
}

/// 读取指定名称的文件字段。
///
/// 没有 `filename` 参数的同名字段是普通表单值，不算上传文件。
async fn take_file(
    multipart: Result<Multipart, MultipartRejection>,
    field_name: &str,
    missing_message: &str,
) -> Result<UploadedFile, AppError> {
    let mut multipart = multipart.map_err(|e| {
        log::debug!("multipart 解析被拒绝: {}", e.body_text());
        AppError::Validation(missing_message.to_string())
    })?;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(field_name) {
            continue;
        }
        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue;
        };

        let bytes = field.bytes().await?;
        return Ok(UploadedFile { file_name, bytes });
    }

    Err(AppError::Validation(missing_message.to_string()))
}

fn validate_file_name(file_name: &str, allowed: &[&str]) -> Result<(), AppError> {
    if file_name.is_empty() {
        return Err(AppError::Validation("没有选择文件".to_string()));
    }

    if !allowed_file(file_name, allowed) {
        return Err(AppError::Validation(format!(
            "不支持的文件类型，仅允许: {}",
            allowed.join(", ")
        )));
    }

    Ok(())
}
