//! # 数据源与中间模型
//!
//! ## 设计思路
//!
//! 将“外部输入”和“流水线中间结果”解耦：
//! - `RawUpload` 表示已接收但未解码的上传字节
//! - `SourceImage` 表示解码后的原图及其来源格式
//! - `FittedImage` 表示合成并编码完成、可直接落盘的结果

use bytes::Bytes;
use image::{DynamicImage, ImageFormat};

/// 接收阶段输出：原始字节与来源标识。
pub struct RawUpload {
    /// 上传的原始字节。
    pub bytes: Bytes,
    /// 来源提示（用于日志与诊断），一般是原始文件名。
    pub source_hint: String,
}

/// 解码阶段输出：原图与格式标签。
pub struct SourceImage {
    pub image: DynamicImage,
    /// 无法判定格式时为 `None`，编码阶段回退到 JPEG。
    pub format: Option<ImageFormat>,
}

impl SourceImage {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// 编码阶段输出：画布尺寸与已编码字节。
#[derive(Debug, Clone)]
pub struct FittedImage {
    /// 画布宽度（像素）。
    pub width: u32,
    /// 画布高度（像素）。
    pub height: u32,
    /// 实际使用的输出格式。
    pub format: ImageFormat,
    /// 完整编码后的文件内容。
    pub bytes: Vec<u8>,
}
