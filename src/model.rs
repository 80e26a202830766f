// 该文件是 Guijian （轨检） 项目的一部分。
// src/model.rs - 检测模型与结果定义
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

use serde::{Deserialize, Serialize};

use crate::frame::RgbFrame;

pub trait Model {
  type Input;
  type Output;
  type Error;

  fn infer(&self, input: &Self::Input) -> Result<Self::Output, Self::Error>;
}

pub trait WithLabel: Sized + std::fmt::Debug {
  fn to_label_str(&self) -> &'static str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
  Low,
  Medium,
  High,
  Critical,
}

impl WithLabel for Severity {
  fn to_label_str(&self) -> &'static str {
    match self {
      Severity::Low => "low",
      Severity::Medium => "medium",
      Severity::High => "high",
      Severity::Critical => "critical",
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrackKind {
  /// 沿行进方向延伸，宽高比 > 3
  Longitudinal,
  /// 横跨行进方向，宽高比 < 0.3
  Transverse,
  Diagonal,
  /// 大面积交织裂纹
  Network,
}

impl WithLabel for CrackKind {
  fn to_label_str(&self) -> &'static str {
    match self {
      CrackKind::Longitudinal => "longitudinal",
      CrackKind::Transverse => "transverse",
      CrackKind::Diagonal => "diagonal",
      CrackKind::Network => "network",
    }
  }
}

/// 自动抓拍所需的最低置信度
pub const SIGNIFICANT_CONFIDENCE: f64 = 0.85;

/// 单个裂缝检测结果，坐标以帧左上角为原点
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrackDetection {
  /// 本帧内从 1 开始的连续编号
  pub id: u32,
  pub x: u32,
  pub y: u32,
  pub width: u32,
  pub height: u32,
  /// `[0.30, 0.95]`，保留两位小数
  pub confidence: f64,
  pub severity: Severity,
  #[serde(rename = "type")]
  pub kind: CrackKind,
}

impl CrackDetection {
  /// 高置信度或高严重程度的检测需要抓拍留档
  pub fn is_significant(&self) -> bool {
    self.confidence >= SIGNIFICANT_CONFIDENCE || self.severity >= Severity::High
  }
}

/// 一次检测的完整输出
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionResult {
  pub detections: Vec<CrackDetection>,
  /// 毫秒，包含解码时间
  pub processing_time: f64,
  pub frame_width: u32,
  pub frame_height: u32,
}

impl DetectionResult {
  pub fn is_empty(&self) -> bool {
    self.detections.is_empty()
  }

  pub fn len(&self) -> usize {
    self.detections.len()
  }

  pub fn has_significant(&self) -> bool {
    self.detections.iter().any(CrackDetection::is_significant)
  }
}

/// 检测结果及其对应的解码帧，供输出端绘制使用
#[derive(Debug, Clone)]
pub struct Inspection {
  pub frame: RgbFrame,
  pub result: DetectionResult,
}

pub mod classify;
pub mod grayscale;
pub mod plane;
pub mod region;
pub mod sobel;

mod crack;
pub use self::crack::{
  CancelToken, CrackDetector, CrackDetectorBuilder, DetectError, DetectorParams,
  DetectorParamsError, detect,
};

#[cfg(test)]
mod tests {
  use super::*;

  fn sample() -> CrackDetection {
    CrackDetection {
      id: 1,
      x: 19,
      y: 94,
      width: 162,
      height: 6,
      confidence: 0.62,
      severity: Severity::Medium,
      kind: CrackKind::Longitudinal,
    }
  }

  #[test]
  fn significance_rule() {
    let mut d = sample();
    assert!(!d.is_significant());
    d.confidence = 0.85;
    assert!(d.is_significant());
    d.confidence = 0.5;
    d.severity = Severity::High;
    assert!(d.is_significant());
    d.severity = Severity::Critical;
    assert!(d.is_significant());
  }

  #[test]
  fn wire_format_uses_reference_field_names() {
    let result = DetectionResult {
      detections: vec![sample()],
      processing_time: 3.5,
      frame_width: 640,
      frame_height: 480,
    };
    let value = serde_json::to_value(&result).unwrap();
    assert_eq!(value["processingTime"], 3.5);
    assert_eq!(value["frameWidth"], 640);
    assert_eq!(value["frameHeight"], 480);
    assert_eq!(value["detections"][0]["type"], "longitudinal");
    assert_eq!(value["detections"][0]["severity"], "medium");
    assert_eq!(value["detections"][0]["confidence"], 0.62);

    let back: DetectionResult = serde_json::from_value(value).unwrap();
    assert_eq!(back, result);
  }
}
