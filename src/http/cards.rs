//! 卡片接口：保存与按 ID 读取。

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use serde::Serialize;
use serde_json::Value;

use super::AppState;
use crate::error::{AppError, ContextError};

#[derive(Debug, Serialize)]
pub struct SaveCardResponse {
    pub success: bool,
    pub card_id: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct GetCardResponse {
    pub success: bool,
    pub data: Value,
}

/// `POST /api/save_card`
///
/// 请求体按原始字节读取后自行解析，非法 JSON 返回 400 且仍是统一的错误结构。
pub async fn save_card(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<SaveCardResponse>, ContextError> {
    let card: Value = serde_json::from_slice(&body).map_err(|e| {
        AppError::Validation(format!("请求体不是有效的 JSON: {}", e)).with_context("保存失败")
    })?;

    let card_id = state
        .cards
        .save(&card)
        .await
        .map_err(|e| e.with_context("保存失败"))?;

    Ok(Json(SaveCardResponse {
        success: true,
        card_id,
        message: "卡片保存成功".to_string(),
    }))
}

/// `GET /api/cards/{card_id}`
pub async fn get_card(
    State(state): State<AppState>,
    Path(card_id): Path<String>,
) -> Result<Json<GetCardResponse>, ContextError> {
    let data = state
        .cards
        .load(&card_id)
        .await
        .map_err(|e| e.with_context("读取失败"))?;

    Ok(Json(GetCardResponse {
        success: true,
        data,
    }))
}
