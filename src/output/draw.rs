// 该文件是 Guijian （轨检） 项目的一部分。
// src/output/draw.rs - 裂缝检测结果可视化
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

use std::path::Path;

use ab_glyph::{FontArc, PxScale};
use image::{ImageBuffer, Rgb, RgbImage};
use imageproc::{
  drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_text_mut},
  rect::Rect,
};
use thiserror::Error;

use crate::{
  frame::RgbFrame,
  model::{CrackDetection, Inspection, Severity, WithLabel},
  output::overlay::{OVERLAY_MERGE_GAP, OVERLAY_PAD, merge_for_display},
};

const LABEL_FONT_SIZE: f32 = 16.0;
const LABEL_TEXT_HEIGHT: i32 = 20;
const LABEL_CHAR_WIDTH: f32 = 8.5; // 粗略估计
const LABEL_TEXT_VERTICAL_PADDING: i32 = 2;
const BORDER_THICKNESS: u32 = 2;

#[derive(Error, Debug)]
pub enum DrawError {
  #[error("读取字体文件失败: {0}")]
  IoError(#[from] std::io::Error),
  #[error("字体文件无效: {0}")]
  InvalidFont(#[from] ab_glyph::InvalidFont),
}

/// 各严重程度对应的框线颜色
pub fn severity_color(severity: Severity) -> Rgb<u8> {
  match severity {
    Severity::Critical => Rgb([0xDC, 0x26, 0x26]),
    Severity::High => Rgb([0xEA, 0x58, 0x0C]),
    Severity::Medium => Rgb([0xF5, 0x9E, 0x0B]),
    Severity::Low => Rgb([0x05, 0x96, 0x69]),
  }
}

pub struct Draw {
  font: Option<FontArc>,
  font_size: f32,
  merge: bool,
}

impl Default for Draw {
  fn default() -> Self {
    Self {
      font: None,
      font_size: LABEL_FONT_SIZE,
      merge: true,
    }
  }
}

impl Draw {
  /// 加载字体后在检测框上方绘制标签；未加载字体时只画框
  pub fn with_font_file(mut self, path: &Path) -> Result<Self, DrawError> {
    let data = std::fs::read(path)?;
    self.font = Some(FontArc::try_from_vec(data)?);
    Ok(self)
  }

  pub fn with_merge(mut self, merge: bool) -> Self {
    self.merge = merge;
    self
  }

  pub fn draw_inspection(&self, inspection: &Inspection) -> RgbImage {
    let mut image = inspection.frame.to_rgb_image();
    let boxes = if self.merge {
      merge_for_display(
        &inspection.result.detections,
        OVERLAY_PAD,
        OVERLAY_MERGE_GAP,
      )
    } else {
      inspection.result.detections.clone()
    };

    for detection in boxes.iter() {
      self.draw_detection(&mut image, detection);
    }
    image
  }

  fn draw_detection(&self, image: &mut RgbImage, detection: &CrackDetection) {
    let (w, h) = image.dimensions();
    if w == 0 || h == 0 || detection.x >= w || detection.y >= h {
      return;
    }

    let x_max = (detection.x + detection.width).min(w);
    let y_max = (detection.y + detection.height).min(h);
    let color = severity_color(detection.severity);

    for thickness in 0..BORDER_THICKNESS {
      let x = detection.x + thickness;
      let y = detection.y + thickness;
      if x + thickness >= x_max || y + thickness >= y_max {
        break;
      }
      let rect = Rect::at(x as i32, y as i32).of_size(x_max - x - thickness, y_max - y - thickness);
      draw_hollow_rect_mut(image, rect, color);
    }

    if let Some(font) = &self.font {
      let label = format!(
        "{} {} {:.1}%",
        detection.severity.to_label_str().to_uppercase(),
        detection.kind.to_label_str(),
        detection.confidence * 100.0
      );

      let text_width = (label.len() as f32 * LABEL_CHAR_WIDTH) as i32;
      let label_x = detection.x as i32;
      let label_y = (detection.y as i32 - LABEL_TEXT_HEIGHT).max(0);
      let label_width = text_width.min(w as i32 - label_x).max(0) as u32;

      if label_width > 0 {
        let rect = Rect::at(label_x, label_y).of_size(label_width, LABEL_TEXT_HEIGHT as u32);
        draw_filled_rect_mut(image, rect, color);
        draw_text_mut(
          image,
          Rgb([255u8, 255u8, 255u8]),
          label_x,
          label_y + LABEL_TEXT_VERTICAL_PADDING,
          PxScale::from(self.font_size),
          font,
          &label,
        );
      }
    }
  }
}

pub trait ToRgbImage {
  fn to_rgb_image(&self) -> RgbImage;
}

impl ToRgbImage for RgbFrame {
  fn to_rgb_image(&self) -> RgbImage {
    ImageBuffer::from_fn(self.width(), self.height(), |x, y| Rgb(self.pixel(x, y)))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::model::{CrackKind, DetectionResult};

  fn inspection(detections: Vec<CrackDetection>) -> Inspection {
    Inspection {
      frame: RgbFrame::filled(60, 40, [0, 0, 0]),
      result: DetectionResult {
        detections,
        processing_time: 1.0,
        frame_width: 60,
        frame_height: 40,
      },
    }
  }

  fn crack(x: u32, y: u32, width: u32, height: u32, severity: Severity) -> CrackDetection {
    CrackDetection {
      id: 1,
      x,
      y,
      width,
      height,
      confidence: 0.5,
      severity,
      kind: CrackKind::Longitudinal,
    }
  }

  #[test]
  fn border_uses_severity_color() {
    let draw = Draw::default().with_merge(false);
    let image = draw.draw_inspection(&inspection(vec![crack(10, 10, 20, 10, Severity::High)]));

    assert_eq!(*image.get_pixel(10, 10), severity_color(Severity::High));
    assert_eq!(*image.get_pixel(11, 11), severity_color(Severity::High));
    assert_eq!(*image.get_pixel(29, 19), severity_color(Severity::High));
    // 框内部保持原样
    assert_eq!(*image.get_pixel(20, 15), Rgb([0, 0, 0]));
  }

  #[test]
  fn boxes_are_clamped_to_frame() {
    let draw = Draw::default().with_merge(false);
    let image = draw.draw_inspection(&inspection(vec![
      crack(50, 30, 40, 40, Severity::Critical),
      crack(70, 50, 5, 5, Severity::Low),
    ]));
    assert_eq!(*image.get_pixel(59, 39), severity_color(Severity::Critical));
  }

  #[test]
  fn merged_overlay_is_dilated() {
    let image = Draw::default().draw_inspection(&inspection(vec![crack(
      20,
      20,
      10,
      4,
      Severity::Medium,
    )]));
    assert_eq!(*image.get_pixel(8, 8), severity_color(Severity::Medium));
    assert_eq!(*image.get_pixel(20, 20), Rgb([0, 0, 0]));
  }

  #[test]
  fn missing_font_file_is_an_error() {
    let result = Draw::default().with_font_file(Path::new("/nonexistent/font.ttf"));
    assert!(matches!(result, Err(DrawError::IoError(_))));
  }
}
