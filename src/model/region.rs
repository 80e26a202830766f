// 该文件是 Guijian （轨检） 项目的一部分。
// src/model/region.rs - 边缘连通区域提取
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

//! 对阈值化后的梯度幅值做 4 邻域洪水填充
//!
//! 按行优先顺序扫描种子像素，使用显式栈迭代填充。区域按种子被发现的
//! 顺序返回；区域内部像素顺序由遍历顺序决定，不保证稳定。

use tracing::trace;

use super::plane::EdgeMagnitudeBuffer;

/// 一个连通区域，像素以行优先下标 `y * width + x` 表示
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
  pixels: Vec<usize>,
}

/// 区域的包围盒与像素数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionBounds {
  pub min_x: usize,
  pub min_y: usize,
  pub max_x: usize,
  pub max_y: usize,
  pub pixel_count: usize,
}

impl Region {
  pub fn from_pixels(pixels: Vec<usize>) -> Self {
    Self { pixels }
  }

  pub fn len(&self) -> usize {
    self.pixels.len()
  }

  pub fn is_empty(&self) -> bool {
    self.pixels.is_empty()
  }

  pub fn pixels(&self) -> &[usize] {
    &self.pixels
  }

  /// 计算包围盒，空区域返回 `None`
  pub fn bounds(&self, width: usize) -> Option<RegionBounds> {
    if self.pixels.is_empty() || width == 0 {
      return None;
    }

    let mut bounds = RegionBounds {
      min_x: usize::MAX,
      min_y: usize::MAX,
      max_x: 0,
      max_y: 0,
      pixel_count: self.pixels.len(),
    };
    for &idx in &self.pixels {
      let (x, y) = (idx % width, idx / width);
      bounds.min_x = bounds.min_x.min(x);
      bounds.max_x = bounds.max_x.max(x);
      bounds.min_y = bounds.min_y.min(y);
      bounds.max_y = bounds.max_y.max(y);
    }
    Some(bounds)
  }
}

/// 提取所有幅值严格大于 `threshold` 的 4 连通区域，只保留像素数 `> min_pixels` 的区域
///
/// 被丢弃的小区域中的像素仍标记为已访问，不会再次作为种子。
pub fn extract_regions(
  edges: &EdgeMagnitudeBuffer,
  threshold: f64,
  min_pixels: usize,
) -> Vec<Region> {
  let (w, h) = (edges.width(), edges.height());
  let magnitude = edges.as_slice();
  let mut visited = vec![false; magnitude.len()];
  let mut stack = Vec::with_capacity(64);
  let mut regions = Vec::new();

  for seed in 0..magnitude.len() {
    if visited[seed] || magnitude[seed] <= threshold {
      continue;
    }

    let pixels = flood_fill(magnitude, &mut visited, &mut stack, seed, w, h, threshold);
    if pixels.len() > min_pixels {
      regions.push(Region { pixels });
    } else {
      trace!("丢弃小区域: 种子 {}, {} 像素", seed, pixels.len());
    }
  }

  regions
}

fn flood_fill(
  magnitude: &[f64],
  visited: &mut [bool],
  stack: &mut Vec<usize>,
  seed: usize,
  w: usize,
  h: usize,
  threshold: f64,
) -> Vec<usize> {
  let mut pixels = Vec::new();
  stack.clear();
  stack.push(seed);

  while let Some(idx) = stack.pop() {
    if visited[idx] {
      continue;
    }
    visited[idx] = true;
    if magnitude[idx] <= threshold {
      continue;
    }
    pixels.push(idx);

    let (x, y) = (idx % w, idx / w);
    if x + 1 < w {
      stack.push(idx + 1);
    }
    if x > 0 {
      stack.push(idx - 1);
    }
    if y + 1 < h {
      stack.push(idx + w);
    }
    if y > 0 {
      stack.push(idx - w);
    }
  }

  pixels
}
