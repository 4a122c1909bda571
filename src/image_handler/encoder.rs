//! # 编码模块
//!
//! ## 设计思路
//!
//! 画布在内存中完整编码后才交给存储层，编码失败时磁盘上不会留下半成品。
//!
//! ## 实现思路
//!
//! - 输出格式沿用原图格式（PNG / JPEG / GIF），无法判定或无法编码时回退 JPEG。
//! - JPEG 使用配置质量（默认 85）；PNG 在开启优化时使用最高压缩 + 自适应过滤。
//! - GIF 需要 RGBA 帧，单帧编码。

use image::codecs::gif::GifEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilterType, PngEncoder};
use image::{DynamicImage, Frame, ImageFormat, RgbImage};

use super::source::FittedImage;
use super::{ImageError, ImageFitter};

/// NeuQuant 采样速度（1 最慢最精细，30 最快）。
const GIF_QUANTIZE_SPEED: i32 = 10;

impl ImageFitter {
    /// 选择输出格式：仅保留可稳定编码的上传格式，其余一律 JPEG。
    pub(crate) fn output_format(source_format: Option<ImageFormat>) -> ImageFormat {
        match source_format {
            Some(ImageFormat::Png) => ImageFormat::Png,
            Some(ImageFormat::Gif) => ImageFormat::Gif,
            _ => ImageFormat::Jpeg,
        }
    }

    pub(crate) fn encode_canvas(
        &self,
        canvas: &RgbImage,
        source_format: Option<ImageFormat>,
    ) -> Result<FittedImage, ImageError> {
        let format = Self::output_format(source_format);
        let (width, height) = canvas.dimensions();
        let mut buffer = Vec::with_capacity((width as usize) * (height as usize) / 4);

        match format {
            ImageFormat::Png => {
                let encoder = if self.config.optimize {
                    PngEncoder::new_with_quality(
                        &mut buffer,
                        CompressionType::Best,
                        PngFilterType::Adaptive,
                    )
                } else {
                    PngEncoder::new(&mut buffer)
                };
                canvas
                    .write_with_encoder(encoder)
                    .map_err(|e| ImageError::Encode(format!("PNG 编码失败：{}", e)))?;
            }
            ImageFormat::Gif => {
                let frame = Frame::new(DynamicImage::ImageRgb8(canvas.clone()).to_rgba8());
                // GIF 结尾标记在 encoder drop 时写入。
                let mut encoder = GifEncoder::new_with_speed(&mut buffer, GIF_QUANTIZE_SPEED);
                encoder
                    .encode_frame(frame)
                    .map_err(|e| ImageError::Encode(format!("GIF 编码失败：{}", e)))?;
            }
            _ => {
                let encoder = JpegEncoder::new_with_quality(&mut buffer, self.config.jpeg_quality);
                canvas
                    .write_with_encoder(encoder)
                    .map_err(|e| ImageError::Encode(format!("JPEG 编码失败：{}", e)))?;
            }
        }

        if buffer.is_empty() {
            return Err(ImageError::Encode("编码结果为空".to_string()));
        }

        Ok(FittedImage {
            width,
            height,
            format,
            bytes: buffer,
        })
    }
}
