//! 上传文件名处理模块
//!
//! # 设计思路
//!
//! 上传文件名来自客户端，不可信。落盘前统一经过：
//! 扩展名白名单 → 文件名净化 → 加唯一前缀，避免路径穿越与重名覆盖。
//!
//! # 实现思路
//!
//! - 白名单判断只看最后一个扩展名，大小写不敏感。
//! - 净化规则：仅保留 ASCII，路径分隔符视为空白，空白折叠为 `_`，
//!   去掉 `[A-Za-z0-9_.-]` 以外的字符，再去掉首尾的 `.` 和 `_`。
//! - 非法字符过滤使用 `once_cell::sync::Lazy` 预编译的正则。

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use uuid::Uuid;

/// 照片上传允许的扩展名
pub const PHOTO_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif"];
/// 音乐上传允许的扩展名
pub const MUSIC_EXTENSIONS: &[&str] = &["mp3", "wav"];

static UNSAFE_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9_.-]").expect("filename pattern is valid"));

/// 净化后为空时使用的占位名
const FALLBACK_NAME: &str = "upload";

/// 返回文件名最后一个扩展名（小写），没有 `.` 时返回 `None`
pub fn extension(filename: &str) -> Option<String> {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
}

/// 判断文件名的扩展名是否在白名单内
pub fn allowed_file(filename: &str, allowed: &[&str]) -> bool {
    match extension(filename) {
        Some(ext) => allowed.contains(&ext.as_str()),
        None => false,
    }
}

/// 将客户端文件名净化为可安全落盘的名字，可能返回空串
pub fn secure_filename(filename: &str) -> String {
    let ascii: String = filename
        .chars()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();

    let joined = ascii.split_whitespace().collect::<Vec<_>>().join("_");
    let stripped = UNSAFE_CHARS.replace_all(&joined, "");

    stripped.trim_matches(|c| c == '.' || c == '_').to_string()
}

fn secure_or_fallback(filename: &str) -> String {
    let name = secure_filename(filename);
    if name.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        name
    }
}

/// 照片落盘名：`<unix 秒>.<微秒>_<净化后的原名>`
pub fn photo_upload_name(original: &str, now: DateTime<Utc>) -> String {
    format!(
        "{}.{:06}_{}",
        now.timestamp(),
        now.timestamp_subsec_micros(),
        secure_or_fallback(original)
    )
}

/// 音乐落盘名：`<uuid>_<净化后的原名>`
pub fn music_upload_name(original: &str) -> String {
    format!("{}_{}", Uuid::new_v4(), secure_or_fallback(original))
}
