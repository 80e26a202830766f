// 该文件是 Guijian （轨检） 项目的一部分。
// src/output/save_image_file.rs - 保存标注图像文件
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

use thiserror::Error;
use tracing::info;
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  input::url_path,
  model::Inspection,
  output::{
    Render,
    draw::{Draw, DrawError},
  },
};

pub struct SaveImageFileOutput {
  path: PathBuf,
  draw: Draw,
}

#[derive(Error, Debug)]
pub enum SaveImageFileError {
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("图像错误: {0}")]
  ImageError(#[from] image::ImageError),
  #[error("绘制配置错误: {0}")]
  DrawError(#[from] DrawError),
  #[error("URI 方案不匹配: {0}")]
  SchemeMismatch(String),
}

impl FromUrlWithScheme for SaveImageFileOutput {
  const SCHEME: &'static str = "image";
}

impl FromUrl for SaveImageFileOutput {
  type Error = SaveImageFileError;

  fn from_url(uri: &Url) -> Result<Self, Self::Error> {
    if uri.scheme() != Self::SCHEME {
      return Err(SaveImageFileError::SchemeMismatch(format!(
        "期望保存方式 '{}', 实际保存方式 '{}'",
        Self::SCHEME,
        uri.scheme()
      )));
    }

    let mut draw = Draw::default();
    for (k, v) in uri.query_pairs() {
      match k.as_ref() {
        "font" => draw = draw.with_font_file(Path::new(v.as_ref()))?,
        "merge" => draw = draw.with_merge(v != "false" && v != "0"),
        _ => {}
      }
    }

    Ok(SaveImageFileOutput {
      path: url_path(uri),
      draw,
    })
  }
}

impl SaveImageFileOutput {
  pub fn path(&self) -> &Path {
    &self.path
  }

  fn save_image(&self, image: image::RgbImage) -> Result<(), SaveImageFileError> {
    if let Some(parent) = self.path.parent()
      && !parent.as_os_str().is_empty()
    {
      std::fs::create_dir_all(parent)?;
    }

    image.save(&self.path)?;
    info!("保存图像到文件: {}", self.path.display());

    Ok(())
  }
}

impl Render<Inspection> for SaveImageFileOutput {
  type Error = SaveImageFileError;

  fn render_result(&self, result: &Inspection) -> Result<(), Self::Error> {
    let image = self.draw.draw_inspection(result);
    self.save_image(image)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{frame::RgbFrame, model::DetectionResult};

  #[test]
  fn writes_annotated_png() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("nested/out.png");
    let url = Url::parse(&format!("image://{}?merge=false", target.display())).unwrap();
    let output = SaveImageFileOutput::from_url(&url).unwrap();
    assert_eq!(output.path(), target.as_path());

    let inspection = Inspection {
      frame: RgbFrame::filled(8, 6, [10, 20, 30]),
      result: DetectionResult {
        detections: Vec::new(),
        processing_time: 0.5,
        frame_width: 8,
        frame_height: 6,
      },
    };
    output.render_result(&inspection).unwrap();

    let saved = image::open(&target).unwrap().to_rgb8();
    assert_eq!(saved.dimensions(), (8, 6));
    assert_eq!(saved.get_pixel(3, 3).0, [10, 20, 30]);
  }

  #[test]
  fn rejects_missing_font() {
    let url = Url::parse("image:///tmp/out.png?font=/nonexistent.ttf").unwrap();
    assert!(matches!(
      SaveImageFileOutput::from_url(&url),
      Err(SaveImageFileError::DrawError(_))
    ));
  }
}
