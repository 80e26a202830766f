// 该文件是 Guijian （轨检） 项目的一部分。
// src/input/directory.rs - 图像目录输入
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
use tracing::{info, warn};
use url::Url;

use super::{ImageSource, url_path};
use crate::{FromUrl, FromUrlWithScheme};

const IMAGE_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "bmp", "gif", "webp"];

#[derive(Error, Debug)]
pub enum DirectoryInputError {
  #[error("URI 方案不匹配")]
  SchemeMismatch,
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("目录中没有图像文件: {0}")]
  NoImages(PathBuf),
}

/// 按文件名顺序读取目录中的所有图像，`?loop` 时循环播放
pub struct DirectoryInput {
  files: Vec<PathBuf>,
  cursor: usize,
  looping: bool,
}

impl FromUrlWithScheme for DirectoryInput {
  const SCHEME: &'static str = "folder";
}

impl FromUrl for DirectoryInput {
  type Error = DirectoryInputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      return Err(DirectoryInputError::SchemeMismatch);
    }

    let looping = url.query_pairs().any(|(k, _)| k == "loop");
    let mut input = DirectoryInput::scan(&url_path(url))?;
    input.looping = looping;
    Ok(input)
  }
}

impl DirectoryInput {
  pub fn scan(directory: &Path) -> Result<Self, DirectoryInputError> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(directory)? {
      let path = entry?.path();
      if path.is_file() && is_image_file(&path) {
        files.push(path);
      }
    }

    if files.is_empty() {
      warn!("目录中没有图像文件: {}", directory.display());
      return Err(DirectoryInputError::NoImages(directory.to_path_buf()));
    }

    files.sort();
    info!("目录 {} 中共有 {} 张图像", directory.display(), files.len());

    Ok(DirectoryInput {
      files,
      cursor: 0,
      looping: false,
    })
  }

  pub fn len(&self) -> usize {
    self.files.len()
  }

  pub fn is_empty(&self) -> bool {
    self.files.is_empty()
  }
}

fn is_image_file(path: &Path) -> bool {
  path
    .extension()
    .and_then(|ext| ext.to_str())
    .map(|ext| {
      let ext = ext.to_ascii_lowercase();
      IMAGE_EXTENSIONS.contains(&ext.as_str())
    })
    .unwrap_or(false)
}

impl Iterator for DirectoryInput {
  type Item = ImageSource;

  fn next(&mut self) -> Option<Self::Item> {
    if self.cursor >= self.files.len() {
      if !self.looping || self.files.is_empty() {
        return None;
      }
      self.cursor = 0;
    }

    let path = self.files[self.cursor].clone();
    self.cursor += 1;
    Some(ImageSource::File(path))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn lists_images_in_name_order() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["b.png", "a.JPG", "notes.txt", "c.bmp"] {
      std::fs::write(dir.path().join(name), b"x").unwrap();
    }

    let input = DirectoryInput::scan(dir.path()).unwrap();
    assert_eq!(input.len(), 3);
    assert!(!input.is_empty());
    let names = input
      .map(|s| match s {
        ImageSource::File(p) => p.file_name().unwrap().to_string_lossy().into_owned(),
        other => panic!("unexpected source {}", other),
      })
      .collect::<Vec<_>>();
    assert_eq!(names, vec!["a.JPG", "b.png", "c.bmp"]);
  }

  #[test]
  fn loop_mode_cycles() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("only.png"), b"x").unwrap();

    let url = Url::from_directory_path(dir.path()).unwrap();
    let url = Url::parse(&format!("folder://{}?loop", url.path())).unwrap();
    let input = DirectoryInput::from_url(&url).unwrap();
    assert_eq!(input.take(4).count(), 4);
  }

  #[test]
  fn empty_directory_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
      DirectoryInput::scan(dir.path()),
      Err(DirectoryInputError::NoImages(_))
    ));
  }
}
