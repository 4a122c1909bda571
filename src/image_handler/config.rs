//! # 配置模块
//!
//! ## 设计思路
//!
//! 将画布尺寸、背景色、重采样滤镜与编码参数集中到 `FitConfig`。
//! 这些值在生产中固定不变，但以构造参数的形式注入，而不是散落的全局常量，
//! 便于测试构造更小的画布或更严格的资源上限。
//!
//! ## 实现思路
//!
//! - `Default` 即生产配置：800×450、(245,245,245)、Lanczos3、质量 85。
//! - `validate` 在服务启动时拒绝无意义的配置（零尺寸画布、质量越界）。

use image::imageops::FilterType;

use super::ImageError;

/// 目标画布宽度（像素）。
pub const TARGET_WIDTH: u32 = 800;
/// 目标画布高度（像素），16:9。
pub const TARGET_HEIGHT: u32 = 450;
/// 留白背景色。
pub const BACKGROUND_RGB: [u8; 3] = [245, 245, 245];
/// 有损格式的输出质量。
pub const JPEG_QUALITY: u8 = 85;
/// 解码像素上限，与常见图片库的解压炸弹阈值一致。
pub const MAX_DECODED_PIXELS: u64 = 89_478_485;

/// 图片适配配置。
#[derive(Debug, Clone)]
pub struct FitConfig {
    /// 画布宽度。
    pub target_width: u32,
    /// 画布高度。
    pub target_height: u32,
    /// 留白填充色（RGB）。
    pub background: [u8; 3],
    /// 重采样滤镜，默认 Lanczos3。
    pub resize_filter: FilterType,
    /// JPEG 输出质量（1..=100）。
    pub jpeg_quality: u8,
    /// 是否启用体积优化（PNG 最高压缩 + 自适应过滤）。
    pub optimize: bool,
    /// 上传字节上限，与 HTTP 层的请求体上限保持一致。
    pub max_file_size: u64,
    /// 解码前按文件头尺寸检查的像素上限（`width * height`）。
    pub max_decoded_pixels: u64,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            target_width: TARGET_WIDTH,
            target_height: TARGET_HEIGHT,
            background: BACKGROUND_RGB,
            resize_filter: FilterType::Lanczos3,
            jpeg_quality: JPEG_QUALITY,
            optimize: true,
            max_file_size: 16 * 1024 * 1024,
            max_decoded_pixels: MAX_DECODED_PIXELS,
        }
    }
}

impl FitConfig {
    pub fn validate(&self) -> Result<(), ImageError> {
        if self.target_width == 0 || self.target_height == 0 {
            return Err(ImageError::InvalidFormat(format!(
                "画布尺寸无效：{}x{}",
                self.target_width, self.target_height
            )));
        }

        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(ImageError::InvalidFormat(format!(
                "输出质量越界：{}（可选：1..=100）",
                self.jpeg_quality
            )));
        }

        if self.max_decoded_pixels == 0 {
            return Err(ImageError::ResourceLimit("像素上限不能为 0".to_string()));
        }

        Ok(())
    }
}
