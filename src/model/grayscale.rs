// 该文件是 Guijian （轨检） 项目的一部分。
// src/model/grayscale.rs - 灰度转换
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

use super::plane::{GrayscaleBuffer, Plane};
use crate::frame::RgbFrame;

// ITU-R BT.601 亮度系数
const LUMA_R: f64 = 0.299;
const LUMA_G: f64 = 0.587;
const LUMA_B: f64 = 0.114;

#[inline]
pub fn luminance([r, g, b]: [u8; 3]) -> f64 {
  LUMA_R * r as f64 + LUMA_G * g as f64 + LUMA_B * b as f64
}

/// 将 RGB 帧转换为灰度缓冲区，不做取整或截断
pub fn to_grayscale(frame: &RgbFrame) -> GrayscaleBuffer {
  let data = frame.pixels().map(luminance).collect::<Vec<_>>();
  // 长度由 RgbFrame 的不变式保证
  Plane::from_vec(frame.width() as usize, frame.height() as usize, data)
    .unwrap_or_else(|| Plane::new(frame.width() as usize, frame.height() as usize))
}
