//! # 布局计算模块
//!
//! ## 设计思路
//!
//! 将“等比缩放 + 居中”的几何计算独立为纯函数，与像素处理完全分离，
//! 方便对任意尺寸做性质测试。
//!
//! ## 实现思路
//!
//! 1. `ratio = min(TW / w, TH / h)`（contain 适配，不裁剪）
//! 2. `new_w = floor(w * ratio)`，`new_h = floor(h * ratio)`
//! 3. `x = (TW - new_w) / 2`，`y = (TH - new_h) / 2`（整数截断）
//!
//! 截断必须保留：不同实现之间需要逐像素一致的摆放位置。

use super::ImageError;

/// 一次适配的几何结果。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitLayout {
    /// 实际采用的缩放比例。
    pub ratio: f64,
    /// 缩放后宽度。
    pub new_width: u32,
    /// 缩放后高度。
    pub new_height: u32,
    /// 粘贴位置（左上角）横坐标。
    pub x: u32,
    /// 粘贴位置（左上角）纵坐标。
    pub y: u32,
}

/// 计算原图在画布上的缩放尺寸与居中位置。
///
/// 极端长宽比下某一轴截断为 0 时钳制为 1 像素，保证缩放有定义且不超出画布。
pub fn compute_layout(
    width: u32,
    height: u32,
    target_width: u32,
    target_height: u32,
) -> Result<FitLayout, ImageError> {
    if width == 0 || height == 0 {
        return Err(ImageError::InvalidFormat(format!(
            "图片尺寸无效：{}x{}",
            width, height
        )));
    }

    let width_ratio = target_width as f64 / width as f64;
    let height_ratio = target_height as f64 / height as f64;
    let ratio = width_ratio.min(height_ratio);

    let new_width = ((width as f64 * ratio) as u32).clamp(1, target_width);
    let new_height = ((height as f64 * ratio) as u32).clamp(1, target_height);

    Ok(FitLayout {
        ratio,
        new_width,
        new_height,
        x: (target_width - new_width) / 2,
        y: (target_height - new_height) / 2,
    })
}
