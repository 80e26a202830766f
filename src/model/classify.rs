// 该文件是 Guijian （轨检） 项目的一部分。
// src/model/classify.rs - 裂缝分类
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

use tracing::trace;

use super::region::{Region, RegionBounds};
use super::{CrackDetection, CrackKind, Severity};

const LONGITUDINAL_MIN_ASPECT: f64 = 3.0;
const TRANSVERSE_MAX_ASPECT: f64 = 0.3;
const NETWORK_MIN_PIXELS: usize = 200;
const DIAGONAL_HIGH_PIXELS: usize = 100;

const LONGITUDINAL_HIGH_WIDTH: usize = 100;
const LONGITUDINAL_MEDIUM_WIDTH: usize = 50;
const TRANSVERSE_HIGH_HEIGHT: usize = 80;
const TRANSVERSE_MEDIUM_HEIGHT: usize = 40;

const CONFIDENCE_BASE: f64 = 0.3;
const CONFIDENCE_MAX: f64 = 0.95;
const CONFIDENCE_PIXEL_SCALE: f64 = 500.0;
const CONFIDENCE_AREA_SCALE: f64 = 10000.0;

/// 包围盒几何量，宽高取 `max - min`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrackGeometry {
  pub x: usize,
  pub y: usize,
  pub width: usize,
  pub height: usize,
  pub pixel_count: usize,
}

impl From<RegionBounds> for CrackGeometry {
  fn from(b: RegionBounds) -> Self {
    Self {
      x: b.min_x,
      y: b.min_y,
      width: b.max_x - b.min_x,
      height: b.max_y - b.min_y,
      pixel_count: b.pixel_count,
    }
  }
}

impl CrackGeometry {
  /// 宽高比；高度为 0 时视为无穷大
  pub fn aspect_ratio(&self) -> f64 {
    if self.height == 0 {
      f64::INFINITY
    } else {
      self.width as f64 / self.height as f64
    }
  }

  /// 按优先级依次匹配：纵向、横向、网状、斜向
  pub fn classify(&self) -> (CrackKind, Severity) {
    let aspect = self.aspect_ratio();

    if aspect > LONGITUDINAL_MIN_ASPECT {
      let severity = if self.width > LONGITUDINAL_HIGH_WIDTH {
        Severity::High
      } else if self.width > LONGITUDINAL_MEDIUM_WIDTH {
        Severity::Medium
      } else {
        Severity::Low
      };
      (CrackKind::Longitudinal, severity)
    } else if aspect < TRANSVERSE_MAX_ASPECT {
      let severity = if self.height > TRANSVERSE_HIGH_HEIGHT {
        Severity::High
      } else if self.height > TRANSVERSE_MEDIUM_HEIGHT {
        Severity::Medium
      } else {
        Severity::Low
      };
      (CrackKind::Transverse, severity)
    } else if self.pixel_count > NETWORK_MIN_PIXELS {
      (CrackKind::Network, Severity::Critical)
    } else if self.pixel_count > DIAGONAL_HIGH_PIXELS {
      (CrackKind::Diagonal, Severity::High)
    } else {
      (CrackKind::Diagonal, Severity::Medium)
    }
  }

  /// 置信度，上限 0.95，保留两位小数
  pub fn confidence(&self) -> f64 {
    let raw = CONFIDENCE_BASE
      + self.pixel_count as f64 / CONFIDENCE_PIXEL_SCALE
      + (self.width * self.height) as f64 / CONFIDENCE_AREA_SCALE;
    (raw.min(CONFIDENCE_MAX) * 100.0).round() / 100.0
  }
}

/// 对一个区域做分析，像素数小于 `min_pixels` 时丢弃
pub fn analyze_region(
  region: &Region,
  frame_width: usize,
  min_pixels: usize,
  id: u32,
) -> Option<CrackDetection> {
  if region.len() < min_pixels {
    return None;
  }

  let geometry = CrackGeometry::from(region.bounds(frame_width)?);
  let (kind, severity) = geometry.classify();
  Some(CrackDetection {
    id,
    x: geometry.x as u32,
    y: geometry.y as u32,
    width: geometry.width as u32,
    height: geometry.height as u32,
    confidence: geometry.confidence(),
    severity,
    kind,
  })
}

/// 分析所有区域，保留发现顺序，并为保留下来的检测重新从 1 连续编号
pub fn analyze_regions(
  regions: &[Region],
  frame_width: usize,
  min_pixels: usize,
) -> Vec<CrackDetection> {
  let mut detections = Vec::with_capacity(regions.len());
  for region in regions {
    let id = detections.len() as u32 + 1;
    match analyze_region(region, frame_width, min_pixels, id) {
      Some(detection) => detections.push(detection),
      None => trace!("区域像素数 {} 小于 {}, 跳过", region.len(), min_pixels),
    }
  }
  detections
}
