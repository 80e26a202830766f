// 该文件是 Guijian （轨检） 项目的一部分。
// src/output/log_output.rs - 日志输出
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

use thiserror::Error;
use tracing::{info, warn};
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  model::{Inspection, WithLabel},
  output::Render,
};

#[derive(Error, Debug)]
pub enum LogOutputError {
  #[error("URI 方案不匹配: {0}")]
  SchemeMismatch(String),
}

pub struct LogOutput;

impl FromUrlWithScheme for LogOutput {
  const SCHEME: &'static str = "log";
}

impl FromUrl for LogOutput {
  type Error = LogOutputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      return Err(LogOutputError::SchemeMismatch(url.scheme().to_string()));
    }
    Ok(LogOutput)
  }
}

impl Render<Inspection> for LogOutput {
  type Error = LogOutputError;

  fn render_result(&self, result: &Inspection) -> Result<(), Self::Error> {
    let result = &result.result;
    info!(
      "检测完成: {} 处裂缝, 耗时 {:.2} ms, 帧尺寸 {}x{}",
      result.len(),
      result.processing_time,
      result.frame_width,
      result.frame_height
    );

    for crack in result.detections.iter() {
      if crack.is_significant() {
        warn!(
          id = crack.id,
          x = crack.x,
          y = crack.y,
          width = crack.width,
          height = crack.height,
          "严重裂缝: {} {} 置信度 {:.2}",
          crack.severity.to_label_str(),
          crack.kind.to_label_str(),
          crack.confidence
        );
      } else {
        info!(
          id = crack.id,
          x = crack.x,
          y = crack.y,
          width = crack.width,
          height = crack.height,
          "裂缝: {} {} 置信度 {:.2}",
          crack.severity.to_label_str(),
          crack.kind.to_label_str(),
          crack.confidence
        );
      }
    }
    Ok(())
  }
}
