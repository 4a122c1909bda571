//! # 解码与合成流水线模块
//!
//! ## 设计思路
//!
//! 将“字节 → 原图 → 缩放 → 画布合成”的过程集中管理，并在关键节点增加资源上限控制。
//! 优先做尺寸检查，再进行完整解码，降低恶意输入触发高内存开销的风险。
//!
//! ## 实现思路
//!
//! 1. 文件签名校验 + 猜测格式 + 读取 header 尺寸
//! 2. 按像素上限快速拒绝
//! 3. 完整解码
//! 4. 按布局结果用 Lanczos3 重采样（`fast_image_resize`，失败回退 `image`）
//! 5. 创建纯色画布并不透明粘贴到居中位置

use fast_image_resize as fr;
use image::imageops::FilterType;
use image::{DynamicImage, ImageBuffer, ImageReader, Rgb, RgbImage};
use std::io::Cursor;

use super::geometry::{FitLayout, compute_layout};
use super::source::{RawUpload, SourceImage};
use super::{ImageError, ImageFitter};

impl ImageFitter {
    /// 将上传字节解码为原图，并保留来源格式标签。
    pub(crate) fn decode_source(&self, raw: &RawUpload) -> Result<SourceImage, ImageError> {
        let config = &self.config;

        if raw.bytes.len() as u64 > config.max_file_size {
            return Err(ImageError::ResourceLimit(format!(
                "文件过大：{:.2} MB（限制：{:.2} MB）",
                raw.bytes.len() as f64 / 1024.0 / 1024.0,
                config.max_file_size as f64 / 1024.0 / 1024.0
            )));
        }
        Self::validate_image_signature(&raw.bytes)?;

        let format = image::guess_format(&raw.bytes).ok();

        let (header_width, header_height) = Self::inspect_dimensions_from_memory(&raw.bytes)?;
        self.validate_pixel_limits(header_width, header_height)?;

        let image = ImageReader::new(Cursor::new(&raw.bytes[..]))
            .with_guessed_format()
            .map_err(|e| ImageError::InvalidFormat(format!("无法识别图片格式：{}", e)))?
            .decode()
            .map_err(|e| ImageError::Decode(format!("图片解码失败：{}", e)))?;

        let source = SourceImage { image, format };
        self.validate_pixel_limits(source.width(), source.height())?;

        log::debug!(
            "🖼️ 图片解码成功 - 来源: {} 格式: {:?} 尺寸: {}x{}",
            raw.source_hint,
            source.format,
            source.width(),
            source.height()
        );

        Ok(source)
    }

    /// 将原图等比缩放并居中粘贴到固定尺寸画布上。
    pub(crate) fn compose_canvas(&self, source: &SourceImage) -> Result<(RgbImage, FitLayout), ImageError> {
        let config = &self.config;
        let layout = compute_layout(
            source.width(),
            source.height(),
            config.target_width,
            config.target_height,
        )?;

        let resized = self.resample(&source.image, layout.new_width, layout.new_height);

        let mut canvas = RgbImage::from_pixel(
            config.target_width,
            config.target_height,
            Rgb(config.background),
        );
        image::imageops::replace(&mut canvas, &resized, layout.x as i64, layout.y as i64);

        log::debug!(
            "🧩 画布合成：{}x{} -> {}x{} @ ({}, {}) ratio={:.4}",
            source.width(),
            source.height(),
            layout.new_width,
            layout.new_height,
            layout.x,
            layout.y,
            layout.ratio
        );

        Ok((canvas, layout))
    }

    /// 仅通过内存中的图片头信息读取宽高。
    ///
    /// 用于在完整解码前做像素限制检查。
    fn inspect_dimensions_from_memory(bytes: &[u8]) -> Result<(u32, u32), ImageError> {
        let reader = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| ImageError::InvalidFormat(format!("无法识别图片格式：{}", e)))?;

        reader
            .into_dimensions()
            .map_err(|e| ImageError::InvalidFormat(format!("无法读取图片尺寸：{}", e)))
    }

    fn validate_image_signature(bytes: &[u8]) -> Result<(), ImageError> {
        if bytes.is_empty() {
            return Err(ImageError::InvalidFormat("图片内容为空".to_string()));
        }

        let kind = infer::get(bytes)
            .ok_or_else(|| ImageError::InvalidFormat("无法识别图片类型".to_string()))?;

        if kind.matcher_type() != infer::MatcherType::Image {
            return Err(ImageError::InvalidFormat(format!(
                "文件签名不是图片类型：{}",
                kind.mime_type()
            )));
        }

        Ok(())
    }

    /// 校验像素数量是否超过配置上限。
    fn validate_pixel_limits(&self, width: u32, height: u32) -> Result<(), ImageError> {
        let pixels = (width as u64)
            .checked_mul(height as u64)
            .ok_or_else(|| ImageError::ResourceLimit("图片像素数溢出".to_string()))?;

        if pixels > self.config.max_decoded_pixels {
            return Err(ImageError::ResourceLimit(format!(
                "图片像素过大：{} 像素（限制：{} 像素）",
                pixels, self.config.max_decoded_pixels
            )));
        }

        Ok(())
    }

    /// 重采样到目标尺寸，输出三通道 RGB（粘贴时不做 alpha 混合）。
    fn resample(&self, image: &DynamicImage, target_width: u32, target_height: u32) -> RgbImage {
        let filter = self.config.resize_filter;

        match Self::resize_with_fast_image_resize(image, target_width, target_height, filter) {
            Ok(resized) => resized,
            Err(err) => {
                log::warn!(
                    "⚠️ fast_image_resize 重采样失败，回退 image::resize_exact：{}",
                    err
                );
                image
                    .resize_exact(target_width, target_height, filter)
                    .to_rgb8()
            }
        }
    }

    fn resize_with_fast_image_resize(
        image: &DynamicImage,
        target_width: u32,
        target_height: u32,
        filter: FilterType,
    ) -> Result<RgbImage, ImageError> {
        let src = image.to_rgb8();
        let (src_width, src_height) = src.dimensions();

        let src_image = fr::images::Image::from_vec_u8(
            src_width,
            src_height,
            src.into_raw(),
            fr::PixelType::U8x3,
        )
        .map_err(|e| ImageError::Decode(format!("构建源图像缓冲失败：{}", e)))?;

        let mut dst_image = fr::images::Image::new(target_width, target_height, fr::PixelType::U8x3);

        let mut resizer = fr::Resizer::new();
        let options = fr::ResizeOptions::new().resize_alg(fr::ResizeAlg::Convolution(
            Self::to_fast_filter(filter),
        ));

        resizer
            .resize(&src_image, &mut dst_image, Some(&options))
            .map_err(|e| ImageError::Decode(format!("fast_image_resize 执行失败：{}", e)))?;

        ImageBuffer::<Rgb<u8>, Vec<u8>>::from_raw(target_width, target_height, dst_image.into_vec())
            .ok_or_else(|| ImageError::Decode("fast_image_resize 输出缓冲长度异常".to_string()))
    }

    fn to_fast_filter(filter: FilterType) -> fr::FilterType {
        match filter {
            FilterType::Nearest => fr::FilterType::Box,
            FilterType::Triangle => fr::FilterType::Bilinear,
            FilterType::CatmullRom => fr::FilterType::CatmullRom,
            FilterType::Gaussian => fr::FilterType::Mitchell,
            FilterType::Lanczos3 => fr::FilterType::Lanczos3,
        }
    }
}
