//! 卡片存储模块
//!
//! # 设计思路
//!
//! 卡片内容是前端定义的任意 JSON 文档，后端不解读结构，只负责按 ID 存取。
//! 每张卡片一个文件：`<upload_dir>/card_<uuid>.json`。
//!
//! # 实现思路
//!
//! - 保存时生成 UUID v4，`serde_json::to_string_pretty` 写入（中文原样保留）。
//! - 读取时先校验 ID 形态，非 UUID 一律视为“找不到”，同时杜绝路径拼接风险。
//! - 不支持更新与删除，也不做并发写保护：每次保存都是新 ID 的新文件。

use std::path::PathBuf;

use serde_json::Value;
use uuid::Uuid;

use crate::error::AppError;

#[derive(Debug, Clone)]
pub struct CardStore {
    dir: PathBuf,
}

impl CardStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn card_path(&self, card_id: &Uuid) -> PathBuf {
        self.dir.join(format!("card_{}.json", card_id))
    }

    /// 保存卡片并返回新生成的 ID
    pub async fn save(&self, card: &Value) -> Result<String, AppError> {
        let card_id = Uuid::new_v4();
        let path = self.card_path(&card_id);

        let content = serde_json::to_string_pretty(card)?;
        tokio::fs::write(&path, content).await?;

        log::info!("📝 卡片已保存: {}", path.display());
        Ok(card_id.to_string())
    }

    /// 按 ID 读取卡片
    pub async fn load(&self, card_id: &str) -> Result<Value, AppError> {
        let not_found = || AppError::NotFound("找不到卡片".to_string());

        let Ok(parsed_id) = Uuid::parse_str(card_id) else {
            log::warn!("⚠️ 卡片 ID 格式不合法: {}", card_id);
            return Err(not_found());
        };

        let path = self.card_path(&parsed_id);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                log::warn!("⚠️ 找不到卡片文件: {}", path.display());
                return Err(not_found());
            }
            Err(err) => return Err(err.into()),
        };

        serde_json::from_str(&content)
            .map_err(|e| AppError::Storage(format!("卡片文件已损坏 '{}': {}", path.display(), e)))
    }
}
