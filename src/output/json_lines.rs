// 该文件是 Guijian （轨检） 项目的一部分。
// src/output/json_lines.rs - 以 JSON Lines 格式追加检测结果
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

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::sync::Mutex;

use thiserror::Error;
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  input::url_path,
  model::Inspection,
  output::Render,
};

#[derive(Error, Debug)]
pub enum JsonLinesOutputError {
  #[error("URI 方案不匹配: {0}")]
  SchemeMismatch(String),
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("JSON 序列化错误: {0}")]
  JsonError(#[from] serde_json::Error),
  #[error("输出文件锁已损坏")]
  Poisoned,
}

enum Sink {
  Stdout,
  File(Mutex<BufWriter<File>>),
}

/// 每帧一行 JSON；路径为空时写到标准输出
pub struct JsonLinesOutput {
  sink: Sink,
}

impl FromUrlWithScheme for JsonLinesOutput {
  const SCHEME: &'static str = "jsonl";
}

impl FromUrl for JsonLinesOutput {
  type Error = JsonLinesOutputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      return Err(JsonLinesOutputError::SchemeMismatch(url.scheme().to_string()));
    }

    let path = url_path(url);
    if path.as_os_str().is_empty() || path.as_os_str() == "-" {
      return Ok(Self { sink: Sink::Stdout });
    }

    if let Some(parent) = path.parent()
      && !parent.as_os_str().is_empty()
    {
      std::fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    Ok(Self {
      sink: Sink::File(Mutex::new(BufWriter::new(file))),
    })
  }
}

impl Render<Inspection> for JsonLinesOutput {
  type Error = JsonLinesOutputError;

  fn render_result(&self, result: &Inspection) -> Result<(), Self::Error> {
    let line = serde_json::to_string(&result.result)?;
    match &self.sink {
      Sink::Stdout => {
        let mut out = std::io::stdout().lock();
        writeln!(out, "{line}")?;
        out.flush()?;
      }
      Sink::File(file) => {
        let mut file = file.lock().map_err(|_| JsonLinesOutputError::Poisoned)?;
        writeln!(file, "{line}")?;
        file.flush()?;
      }
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{frame::RgbFrame, model::DetectionResult};

  #[test]
  fn appends_one_line_per_frame() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("results.jsonl");
    let url = Url::parse(&format!("jsonl://{}", target.display())).unwrap();
    let output = JsonLinesOutput::from_url(&url).unwrap();

    let inspection = Inspection {
      frame: RgbFrame::filled(4, 4, [0, 0, 0]),
      result: DetectionResult {
        detections: Vec::new(),
        processing_time: 1.25,
        frame_width: 4,
        frame_height: 4,
      },
    };
    output.render_result(&inspection).unwrap();
    output.render_result(&inspection).unwrap();

    let text = std::fs::read_to_string(&target).unwrap();
    let lines = text.lines().collect::<Vec<_>>();
    assert_eq!(lines.len(), 2);
    let parsed: DetectionResult = serde_json::from_str(lines[1]).unwrap();
    assert_eq!(parsed, inspection.result);
  }
}
