// 该文件是 Guijian （轨检） 项目的一部分。
// src/frame.rs - NHWC RGB 帧定义
//
// 本文件根据 Apache 许可证第 2.0 版（以下简称“许可证”）授权使用；
// 除非遵守该许可证条款，否则您不得使用本文件。
// 您可通过以下网址获取许可证副本：
// http://www.apache.org/licenses/LICENSE-2.0
// 除非适用法律要求或书面同意，根据本许可协议分发的软件均按“原样”提供，
// 不附带任何形式的明示或暗示的保证或条件。
// 有关许可权限与限制的具体条款，请参阅本许可协议。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, Wareless Group

use image::{DynamicImage, RgbImage};

const RGB_CHANNELS: usize = 3;

/// 一帧待检测的 RGB 图像（行优先、通道交错）
///
/// 帧在每次检测时构造一次，之后各阶段只读取，不会原地修改。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbFrame {
  width: u32,
  height: u32,
  data: Box<[u8]>,
}

impl RgbFrame {
  /// 从原始 RGB 字节构造，长度不匹配时返回 `None`
  pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
    if data.len() != RGB_CHANNELS * width as usize * height as usize {
      return None;
    }

    Some(Self {
      width,
      height,
      data: data.into_boxed_slice(),
    })
  }

  /// 构造一个纯色帧
  pub fn filled(width: u32, height: u32, color: [u8; 3]) -> Self {
    let data = color
      .iter()
      .copied()
      .cycle()
      .take(RGB_CHANNELS * width as usize * height as usize)
      .collect::<Vec<_>>();

    Self {
      width,
      height,
      data: data.into_boxed_slice(),
    }
  }

  pub fn width(&self) -> u32 {
    self.width
  }

  pub fn height(&self) -> u32 {
    self.height
  }

  pub fn channels(&self) -> usize {
    RGB_CHANNELS
  }

  pub fn dimensions(&self) -> (u32, u32) {
    (self.width, self.height)
  }

  pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
    let idx = (y as usize * self.width as usize + x as usize) * RGB_CHANNELS;
    [self.data[idx], self.data[idx + 1], self.data[idx + 2]]
  }

  /// 按行优先顺序遍历所有像素
  pub fn pixels(&self) -> impl Iterator<Item = [u8; 3]> + '_ {
    self
      .data
      .chunks_exact(RGB_CHANNELS)
      .map(|p| [p[0], p[1], p[2]])
  }

  pub fn as_nhwc(&self) -> &[u8] {
    &self.data
  }
}

impl From<RgbImage> for RgbFrame {
  fn from(image: RgbImage) -> Self {
    let (width, height) = image.dimensions();
    Self {
      width,
      height,
      data: image.into_raw().into_boxed_slice(),
    }
  }
}

// 透明通道在此处被丢弃，后续阶段只读取 RGB
impl From<DynamicImage> for RgbFrame {
  fn from(image: DynamicImage) -> Self {
    RgbFrame::from(image.to_rgb8())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use image::Rgb;

  #[test]
  fn from_raw_rejects_length_mismatch() {
    assert!(RgbFrame::from_raw(2, 2, vec![0u8; 11]).is_none());
    assert!(RgbFrame::from_raw(2, 2, vec![0u8; 12]).is_some());
  }

  #[test]
  fn pixel_addressing_is_row_major() {
    let image = RgbImage::from_fn(3, 2, |x, y| Rgb([x as u8, y as u8, 7]));
    let frame = RgbFrame::from(image);
    assert_eq!(frame.dimensions(), (3, 2));
    assert_eq!(frame.pixel(2, 1), [2, 1, 7]);
    assert_eq!(frame.pixels().nth(4), Some([1, 1, 7]));
  }

  #[test]
  fn filled_frame_repeats_color() {
    let frame = RgbFrame::filled(4, 3, [10, 20, 30]);
    assert_eq!(frame.as_nhwc().len(), 36);
    assert!(frame.pixels().all(|p| p == [10, 20, 30]));
  }
}
