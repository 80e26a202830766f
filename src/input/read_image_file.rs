// 该文件是 Guijian （轨检） 项目的一部分。
// src/input/read_image_file.rs - 图像文件输入
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

use std::path::PathBuf;

use thiserror::Error;
use tracing::error;
use url::Url;

use super::{ImageSource, url_path};
use crate::{FromUrl, FromUrlWithScheme};

#[derive(Error, Debug)]
pub enum ImageFileInputError {
  #[error("URI 方案不匹配")]
  SchemaMismatch,
  #[error("缺少图像文件路径")]
  MissingPath,
}

/// 从单个图像文件读取帧
///
/// 带有 `?follow` 参数时会反复读取同一路径，适用于由采集进程不断覆盖的
/// “最新一帧”文件。
pub struct ImageFileInput {
  path: PathBuf,
  follow: bool,
  consumed: bool,
}

impl FromUrlWithScheme for ImageFileInput {
  const SCHEME: &'static str = "image";
}

impl FromUrl for ImageFileInput {
  type Error = ImageFileInputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      error!(
        "URI scheme mismatch: expected '{}', found '{}'",
        Self::SCHEME,
        url.scheme()
      );
      return Err(ImageFileInputError::SchemaMismatch);
    }

    let path = url_path(url);
    if path.as_os_str().is_empty() {
      return Err(ImageFileInputError::MissingPath);
    }

    let follow = url.query_pairs().any(|(k, _)| k == "follow");

    Ok(ImageFileInput {
      path,
      follow,
      consumed: false,
    })
  }
}

impl Iterator for ImageFileInput {
  type Item = ImageSource;

  fn next(&mut self) -> Option<Self::Item> {
    if self.consumed && !self.follow {
      return None;
    }

    self.consumed = true;
    Some(ImageSource::File(self.path.clone()))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn follow_mode_repeats_path() {
    let url = Url::parse("image:///var/run/camera/latest.jpg?follow").unwrap();
    let input = ImageFileInput::from_url(&url).unwrap();
    let sources = input.take(3).collect::<Vec<_>>();
    assert_eq!(sources.len(), 3);
    assert!(sources.iter().all(|s| matches!(
      s,
      ImageSource::File(p) if p == &PathBuf::from("/var/run/camera/latest.jpg")
    )));
  }

  #[test]
  fn scheme_is_checked() {
    let url = Url::parse("folder:///tmp").unwrap();
    assert!(matches!(
      ImageFileInput::from_url(&url),
      Err(ImageFileInputError::SchemaMismatch)
    ));
  }
}
