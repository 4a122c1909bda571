//! 上传目录管理模块
//!
//! # 设计思路
//!
//! 统一管理照片与音乐两个上传目录：启动时自动创建，写入时只接受整块数据，
//! 读取时只按“确切文件名”查找，不允许任何路径成分。
//!
//! # 实现思路
//!
//! - 目录不存在时自动 `create_dir_all`，避免上层判断。
//! - 写入的数据已在内存中完整生成（图片编码 / 音频原始字节），不会出现半成品文件。
//! - 名称校验拒绝空名、`..`、路径分隔符，不合法的名字等同于“不存在”。
//! - 所有可能失败的操作均返回 `Result`，不使用 `expect()` / `unwrap()`。

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::AppError;

/// 存储目录信息
#[derive(Debug, Clone, Serialize)]
pub struct StorageInfo {
    pub path: String,
    pub total_size: u64,
    pub file_count: u64,
}

/// 上传文件存储
#[derive(Debug, Clone)]
pub struct UploadStore {
    upload_dir: PathBuf,
    music_dir: PathBuf,
}

impl UploadStore {
    pub fn new(upload_dir: impl Into<PathBuf>, music_dir: impl Into<PathBuf>) -> Self {
        Self {
            upload_dir: upload_dir.into(),
            music_dir: music_dir.into(),
        }
    }

    /// 确保上传目录存在
    pub fn ensure_dirs(&self) -> Result<(), AppError> {
        for dir in [&self.upload_dir, &self.music_dir] {
            if !dir.exists() {
                fs::create_dir_all(dir).map_err(|e| {
                    AppError::Storage(format!("创建目录 '{}' 失败: {}", dir.display(), e))
                })?;
            }
        }
        Ok(())
    }

    /// 保存处理后的照片，返回完整路径
    pub async fn save_photo(&self, name: &str, bytes: &[u8]) -> Result<PathBuf, AppError> {
        let path = resolve(&self.upload_dir, name)
            .ok_or_else(|| AppError::Storage(format!("文件名不合法: {}", name)))?;
        tokio::fs::write(&path, bytes).await?;
        log::info!("💾 照片已保存: {} ({} bytes)", path.display(), bytes.len());
        Ok(path)
    }

    /// 原样保存音乐文件，返回完整路径
    pub async fn save_music(&self, name: &str, bytes: &[u8]) -> Result<PathBuf, AppError> {
        let path = resolve(&self.music_dir, name)
            .ok_or_else(|| AppError::Storage(format!("文件名不合法: {}", name)))?;
        tokio::fs::write(&path, bytes).await?;
        log::info!("🎵 音乐已保存: {} ({} bytes)", path.display(), bytes.len());
        Ok(path)
    }

    /// 按确切文件名读取上传目录中的文件
    pub async fn read_upload(&self, name: &str) -> Result<Vec<u8>, AppError> {
        read_exact_name(&self.upload_dir, name).await
    }

    /// 按确切文件名读取音乐目录中的文件
    pub async fn read_music(&self, name: &str) -> Result<Vec<u8>, AppError> {
        read_exact_name(&self.music_dir, name).await
    }

    /// 获取上传目录信息（路径 + 占用大小 + 文件数），不含子目录
    pub fn dir_info(&self) -> StorageInfo {
        dir_info(&self.upload_dir)
    }

    pub fn music_dir_info(&self) -> StorageInfo {
        dir_info(&self.music_dir)
    }
}

/// 校验文件名只包含单个路径成分，并拼接到目录下
fn resolve(dir: &Path, name: &str) -> Option<PathBuf> {
    let valid = !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains('/')
        && !name.contains('\\')
        && !name.contains('\0');

    valid.then(|| dir.join(name))
}

async fn read_exact_name(dir: &Path, name: &str) -> Result<Vec<u8>, AppError> {
    let not_found = || AppError::NotFound(format!("找不到文件: {}", name));
    let path = resolve(dir, name).ok_or_else(not_found)?;

    match tokio::fs::metadata(&path).await {
        Ok(meta) if meta.is_file() => {}
        Ok(_) => return Err(not_found()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Err(not_found()),
        Err(err) => return Err(err.into()),
    }

    Ok(tokio::fs::read(&path).await?)
}

fn dir_info(dir: &Path) -> StorageInfo {
    let mut total_size: u64 = 0;
    let mut file_count: u64 = 0;

    if let Ok(entries) = fs::read_dir(dir) {
        for entry in entries.flatten() {
            if let Ok(metadata) = entry.metadata() {
                if metadata.is_file() {
                    total_size += metadata.len();
                    file_count += 1;
                }
            }
        }
    }

    StorageInfo {
        path: dir.to_string_lossy().to_string(),
        total_size,
        file_count,
    }
}
