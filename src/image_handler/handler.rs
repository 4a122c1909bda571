//! # 核心编排模块
//!
//! ## 设计思路
//!
//! `ImageFitter` 只负责流程编排，不依赖 HTTP 层，也不触碰磁盘。
//! 处理链路固定为：
//! 1. 解码（含签名与像素上限校验）
//! 2. 计算布局并合成画布
//! 3. 在内存中完整编码
//!
//! ## 实现思路
//!
//! - 配置为只读 `Arc<FitConfig>`，多个请求可并发调用同一实例，无需加锁。
//! - 记录 `decode/fit/encode/total` 阶段耗时，便于性能诊断。
//! - CPU 密集的图片处理经 `spawn_blocking` 移出异步运行时。

use std::sync::Arc;
use std::time::Instant;

use super::source::{FittedImage, RawUpload};
use super::{FitConfig, ImageError};

/// 图片适配器：任意尺寸原图 → 固定尺寸、居中留白的画布。
#[derive(Debug, Clone)]
pub struct ImageFitter {
    pub(super) config: Arc<FitConfig>,
}

impl ImageFitter {
    /// 根据配置创建适配器，配置非法时直接拒绝。
    ///
    /// # 示例
    /// ```rust,no_run
    /// use card_backend::image_handler::{FitConfig, ImageFitter};
    ///
    /// let fitter = ImageFitter::new(FitConfig::default())?;
    /// # Ok::<(), card_backend::image_handler::ImageError>(())
    /// ```
    pub fn new(config: FitConfig) -> Result<Self, ImageError> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(config),
        })
    }

    /// 处理主入口：解码 → 合成 → 编码，全程只在内存中进行。
    pub fn process(&self, raw: RawUpload) -> Result<FittedImage, ImageError> {
        let total_start = Instant::now();

        let decode_start = Instant::now();
        let source = self.decode_source(&raw)?;
        let decode_elapsed = decode_start.elapsed();

        let fit_start = Instant::now();
        let (canvas, layout) = self.compose_canvas(&source)?;
        let fit_elapsed = fit_start.elapsed();

        let encode_start = Instant::now();
        let fitted = self.encode_canvas(&canvas, source.format)?;
        let encode_elapsed = encode_start.elapsed();

        log::info!(
            "✅ 图片适配完成 - 来源: {} {}x{} -> {}x{}（内容 {}x{} @ {},{}）格式: {:?} 大小: {}KB decode={}ms fit={}ms encode={}ms total={}ms",
            raw.source_hint,
            source.width(),
            source.height(),
            fitted.width,
            fitted.height,
            layout.new_width,
            layout.new_height,
            layout.x,
            layout.y,
            fitted.format,
            fitted.bytes.len() / 1024,
            decode_elapsed.as_millis(),
            fit_elapsed.as_millis(),
            encode_elapsed.as_millis(),
            total_start.elapsed().as_millis()
        );

        Ok(fitted)
    }

    /// 在阻塞线程池中执行 `process`，供异步请求处理器调用。
    pub async fn process_blocking(&self, raw: RawUpload) -> Result<FittedImage, ImageError> {
        let fitter = self.clone();
        tokio::task::spawn_blocking(move || fitter.process(raw))
            .await
            .map_err(|e| ImageError::Task(format!("图片处理线程执行失败：{}", e)))?
    }
}
