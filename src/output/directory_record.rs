// 该文件是 Guijian （轨检） 项目的一部分。
// src/output/directory_record.rs - 按日期归档的抓拍记录
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

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::{
  FromUrl, FromUrlWithScheme,
  input::url_path,
  model::{DetectionResult, Inspection},
  output::{
    Render,
    draw::{Draw, DrawError, ToRgbImage},
  },
};

#[derive(Error, Debug)]
pub enum DirectoryRecordOutputError {
  #[error("URI 方案不匹配")]
  SchemeMismatch,
  #[error("图像错误: {0}")]
  ImageError(#[from] image::ImageError),
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("JSON 序列化错误: {0}")]
  JsonError(#[from] serde_json::Error),
  #[error("绘制配置错误: {0}")]
  DrawError(#[from] DrawError),
}

/// 与每张抓拍图像同名的 JSON 记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureRecord {
  pub timestamp: DateTime<Utc>,
  pub image: String,
  pub significant: bool,
  pub result: DetectionResult,
}

/// 何时保存一帧
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Trigger {
  Significant,
  Any,
  Always,
}

impl Trigger {
  fn accepts(&self, result: &DetectionResult) -> bool {
    match self {
      Trigger::Significant => result.has_significant(),
      Trigger::Any => !result.is_empty(),
      Trigger::Always => true,
    }
  }
}

pub struct DirectoryRecordOutput {
  directory: PathBuf,
  draw: Draw,
  trigger: Trigger,
  raw: bool,
  frame_counter: AtomicU32,
}

impl FromUrlWithScheme for DirectoryRecordOutput {
  const SCHEME: &'static str = "folder";
}

impl FromUrl for DirectoryRecordOutput {
  type Error = DirectoryRecordOutputError;

  fn from_url(uri: &url::Url) -> Result<Self, Self::Error> {
    if uri.scheme() != Self::SCHEME {
      return Err(DirectoryRecordOutputError::SchemeMismatch);
    }

    let mut trigger = Trigger::Significant;
    let mut raw = false;
    let mut draw = Draw::default();
    for (k, v) in uri.query_pairs() {
      match k.as_ref() {
        "always" => trigger = Trigger::Always,
        "any" if trigger != Trigger::Always => trigger = Trigger::Any,
        "record" => raw = true,
        "font" => draw = draw.with_font_file(Path::new(v.as_ref()))?,
        "merge" => draw = draw.with_merge(v != "false" && v != "0"),
        _ => {}
      }
    }

    Ok(DirectoryRecordOutput {
      directory: url_path(uri),
      draw,
      trigger,
      raw,
      frame_counter: AtomicU32::new(0),
    })
  }
}

impl DirectoryRecordOutput {
  fn frame_id(&self) -> u32 {
    (self.frame_counter.fetch_add(1, Ordering::Relaxed) + 1) & 0xFFFF
  }

  fn frame_path(&self, now: &DateTime<Utc>) -> Result<PathBuf, DirectoryRecordOutputError> {
    let directory = self
      .directory
      .join(now.year().to_string())
      .join(format!("{:02}", now.month()))
      .join(format!("{:02}", now.day()));
    std::fs::create_dir_all(&directory)?;

    Ok(directory.join(format!(
      "{}-{:04X}.png",
      now.format("%H-%M-%S"),
      self.frame_id()
    )))
  }
}

impl Render<Inspection> for DirectoryRecordOutput {
  type Error = DirectoryRecordOutputError;

  fn render_result(&self, result: &Inspection) -> Result<(), Self::Error> {
    if !self.trigger.accepts(&result.result) {
      return Ok(());
    }

    let now = Utc::now();
    let path = self.frame_path(&now)?;
    let image = if self.raw {
      result.frame.to_rgb_image()
    } else {
      self.draw.draw_inspection(result)
    };
    image.save(&path)?;

    let record = CaptureRecord {
      timestamp: now,
      image: path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default(),
      significant: result.result.has_significant(),
      result: result.result.clone(),
    };
    std::fs::write(
      path.with_extension("json"),
      serde_json::to_vec_pretty(&record)?,
    )?;

    info!(
      "抓拍 {} 处裂缝，保存到 {}",
      result.result.len(),
      path.display()
    );
    Ok(())
  }
}
