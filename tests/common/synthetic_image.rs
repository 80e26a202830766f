// 该文件是 Guijian （轨检） 项目的一部分。
// tests/common/synthetic_image.rs - 合成测试图像
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

use std::io::Cursor;

use base64::Engine;
use guijian::frame::RgbFrame;
use image::{ImageFormat, Rgb, RgbImage};

/// 黑色背景上的一条水平亮线，坐标范围均为闭区间
pub fn horizontal_line(
  width: u32,
  height: u32,
  xs: (u32, u32),
  ys: (u32, u32),
  value: u8,
) -> RgbImage {
  RgbImage::from_fn(width, height, |x, y| {
    if (xs.0..=xs.1).contains(&x) && (ys.0..=ys.1).contains(&y) {
      Rgb([value, value, value])
    } else {
      Rgb([0, 0, 0])
    }
  })
}

/// 200x200 帧，亮线 x 20..=180，y 95..=99
pub fn rail_crack_image() -> RgbImage {
  horizontal_line(200, 200, (20, 180), (95, 99), 200)
}

pub fn rail_crack_frame() -> RgbFrame {
  RgbFrame::from(rail_crack_image())
}

pub fn encode_png(image: &RgbImage) -> Vec<u8> {
  let mut buffer = Vec::new();
  image
    .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
    .expect("PNG 编码失败");
  buffer
}

pub fn png_data_url(image: &RgbImage) -> String {
  format!(
    "data:image/png;base64,{}",
    base64::engine::general_purpose::STANDARD.encode(encode_png(image))
  )
}
