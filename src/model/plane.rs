// 该文件是 Guijian （轨检） 项目的一部分。
// src/model/plane.rs - 单通道浮点图像平面
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

/// 行优先的 `f64` 平面，`data.len() == width * height`
#[derive(Debug, Clone, PartialEq)]
pub struct Plane {
  width: usize,
  height: usize,
  data: Vec<f64>,
}

/// 灰度缓冲区，每个像素一个亮度值
pub type GrayscaleBuffer = Plane;

/// Sobel 梯度幅值缓冲区，边框像素恒为 0
pub type EdgeMagnitudeBuffer = Plane;

impl Plane {
  pub fn new(width: usize, height: usize) -> Self {
    Self {
      width,
      height,
      data: vec![0.0; width * height],
    }
  }

  /// 从已有数据构造，长度不匹配时返回 `None`
  pub fn from_vec(width: usize, height: usize, data: Vec<f64>) -> Option<Self> {
    (data.len() == width * height).then_some(Self {
      width,
      height,
      data,
    })
  }

  pub fn width(&self) -> usize {
    self.width
  }

  pub fn height(&self) -> usize {
    self.height
  }

  pub fn len(&self) -> usize {
    self.data.len()
  }

  pub fn is_empty(&self) -> bool {
    self.data.is_empty()
  }

  #[inline]
  pub fn get(&self, x: usize, y: usize) -> f64 {
    self.data[y * self.width + x]
  }

  #[inline]
  pub fn set(&mut self, x: usize, y: usize, value: f64) {
    self.data[y * self.width + x] = value;
  }

  #[inline]
  pub fn row(&self, y: usize) -> &[f64] {
    let start = y * self.width;
    &self.data[start..start + self.width]
  }

  #[inline]
  pub fn row_mut(&mut self, y: usize) -> &mut [f64] {
    let start = y * self.width;
    &mut self.data[start..start + self.width]
  }

  pub fn as_slice(&self) -> &[f64] {
    &self.data
  }
}
