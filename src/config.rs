//! 服务配置模块
//!
//! # 设计思路
//!
//! 上传目录、监听端口、请求体上限等原本散落在全局的值，统一收敛到 `AppConfig`，
//! 在 `main.rs` 构造一次后注入各组件，不再使用全局可变状态。
//!
//! # 实现思路
//!
//! 三层覆盖，后者优先：
//! 1. `Default`：与线上部署一致的默认值
//! 2. 可选 JSON 配置文件（`CARD_CONFIG` 指向的路径），解析失败回退默认值并告警
//! 3. 环境变量：`HOST`、`PORT`、`UPLOAD_FOLDER`、`MUSIC_FOLDER`、`CARD_PAGE`、`MAX_CONTENT_LENGTH`

use std::fs;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// 请求体大小上限：16 MiB
pub const DEFAULT_MAX_CONTENT_LENGTH: usize = 16 * 1024 * 1024;

/// 服务配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// 监听地址
    pub host: String,
    /// 监听端口
    pub port: u16,
    /// 图片与卡片 JSON 的存储目录
    pub upload_dir: PathBuf,
    /// 音乐文件存储目录
    pub music_dir: PathBuf,
    /// 单页应用 HTML 路径
    pub page_path: PathBuf,
    /// 请求体大小上限（字节）
    pub max_content_length: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            upload_dir: PathBuf::from("uploads"),
            music_dir: PathBuf::from("uploads/music"),
            page_path: PathBuf::from("card.html"),
            max_content_length: DEFAULT_MAX_CONTENT_LENGTH,
        }
    }
}

impl AppConfig {
    /// 按“默认值 → 配置文件 → 环境变量”的顺序加载配置。
    pub fn load() -> Result<Self, AppError> {
        let base = match std::env::var("CARD_CONFIG") {
            Ok(path) if !path.is_empty() => load_config_from_path(Path::new(&path)),
            _ => Self::default(),
        };
        base.apply_env(|key| std::env::var(key).ok())
    }

    /// 用环境变量覆盖配置。`lookup` 便于测试注入。
    pub fn apply_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        if let Some(host) = lookup("HOST").filter(|v| !v.is_empty()) {
            self.host = host;
        }
        if let Some(port) = lookup("PORT").filter(|v| !v.is_empty()) {
            self.port = port
                .trim()
                .parse()
                .map_err(|e| AppError::Config(format!("PORT 无效 '{}': {}", port, e)))?;
        }
        if let Some(dir) = lookup("UPLOAD_FOLDER").filter(|v| !v.is_empty()) {
            self.upload_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup("MUSIC_FOLDER").filter(|v| !v.is_empty()) {
            self.music_dir = PathBuf::from(dir);
        }
        if let Some(page) = lookup("CARD_PAGE").filter(|v| !v.is_empty()) {
            self.page_path = PathBuf::from(page);
        }
        if let Some(limit) = lookup("MAX_CONTENT_LENGTH").filter(|v| !v.is_empty()) {
            self.max_content_length = limit.trim().parse().map_err(|e| {
                AppError::Config(format!("MAX_CONTENT_LENGTH 无效 '{}': {}", limit, e))
            })?;
        }

        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.max_content_length == 0 {
            return Err(AppError::Config("MAX_CONTENT_LENGTH 不能为 0".to_string()));
        }
        self.host
            .parse::<IpAddr>()
            .map_err(|e| AppError::Config(format!("HOST 无效 '{}': {}", self.host, e)))?;
        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, AppError> {
        let ip = self
            .host
            .parse::<IpAddr>()
            .map_err(|e| AppError::Config(format!("HOST 无效 '{}': {}", self.host, e)))?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

/// 读取 JSON 配置文件；文件缺失或格式错误时回退默认值。
pub(crate) fn load_config_from_path(config_path: &Path) -> AppConfig {
    match fs::read_to_string(config_path) {
        Ok(content) => match serde_json::from_str(&content) {
            Ok(config) => config,
            Err(err) => {
                log::warn!(
                    "⚠️ 配置文件解析失败，使用默认配置: {} ({})",
                    config_path.display(),
                    err
                );
                AppConfig::default()
            }
        },
        Err(err) => {
            log::warn!(
                "⚠️ 配置文件读取失败，使用默认配置: {} ({})",
                config_path.display(),
                err
            );
            AppConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::time::{SystemTime, UNIX_EPOCH};

    use super::*;

    fn unique_temp_dir() -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock error")
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("card-backend-config-test-{nanos}"));
        fs::create_dir_all(&dir).expect("create temp dir");
        dir
    }

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_deployment() {
        let config = AppConfig::default();

        assert_eq!(config.port, 5000);
        assert_eq!(config.upload_dir, PathBuf::from("uploads"));
        assert_eq!(config.music_dir, PathBuf::from("uploads/music"));
        assert_eq!(config.max_content_length, 16 * 1024 * 1024);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn env_overrides_defaults() {
        let config = AppConfig::default()
            .apply_env(env(&[("PORT", "8080"), ("UPLOAD_FOLDER", "/srv/uploads"), ("HOST", "127.0.0.1")]))
            .expect("apply env");

        assert_eq!(config.port, 8080);
        assert_eq!(config.upload_dir, PathBuf::from("/srv/uploads"));
        assert_eq!(
            config.socket_addr().expect("socket addr"),
            "127.0.0.1:8080".parse::<SocketAddr>().expect("parse addr")
        );
    }

    #[test]
    fn invalid_port_is_rejected() {
        let result = AppConfig::default().apply_env(env(&[("PORT", "not-a-port")]));
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn config_file_is_partial_and_bad_file_falls_back() {
        let dir = unique_temp_dir();
        let config_path = dir.join("config.json");

        fs::write(&config_path, r#"{ "port": 9000, "music_dir": "audio" }"#).expect("write config");
        let loaded = load_config_from_path(&config_path);
        assert_eq!(loaded.port, 9000);
        assert_eq!(loaded.music_dir, PathBuf::from("audio"));
        assert_eq!(loaded.upload_dir, PathBuf::from("uploads"));

        fs::write(&config_path, "not-json").expect("write invalid config");
        assert_eq!(load_config_from_path(&config_path), AppConfig::default());

        let _ = fs::remove_dir_all(dir);
    }
}
