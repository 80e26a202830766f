// 该文件是 Guijian （轨检） 项目的一部分。
// src/input.rs - 图像帧输入与解码
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

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::{FromUrl, FromUrlWithScheme, frame::RgbFrame};

mod data_url;
mod directory;
mod loader;
mod read_image_file;

pub use self::data_url::{DataUrlInput, decode_data_url};
pub use self::directory::{DirectoryInput, DirectoryInputError};
pub use self::loader::ImageCodecLoader;
pub use self::read_image_file::{ImageFileInput, ImageFileInputError};

#[cfg(feature = "v4l2_input")]
mod v4l2_source;
#[cfg(feature = "v4l2_input")]
pub use self::v4l2_source::{V4l2Input, V4l2InputError};

/// 待解码的图像来源
#[derive(Debug, Clone)]
pub enum ImageSource {
  /// `data:image/...;base64,...` 形式的内联图像
  DataUrl(String),
  /// 内存中的已编码图像（PNG、JPEG 等）
  Bytes(Vec<u8>),
  /// 磁盘上的图像文件，解码时才读取
  File(PathBuf),
  /// 已解码的像素，例如摄像头采集帧
  Raw(RgbFrame),
}

impl fmt::Display for ImageSource {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ImageSource::DataUrl(url) => write!(f, "data URL ({} 字节)", url.len()),
      ImageSource::Bytes(bytes) => write!(f, "内存图像 ({} 字节)", bytes.len()),
      ImageSource::File(path) => write!(f, "图像文件 {}", path.display()),
      ImageSource::Raw(frame) => write!(f, "原始帧 {}x{}", frame.width(), frame.height()),
    }
  }
}

impl From<Vec<u8>> for ImageSource {
  fn from(bytes: Vec<u8>) -> Self {
    ImageSource::Bytes(bytes)
  }
}

impl From<PathBuf> for ImageSource {
  fn from(path: PathBuf) -> Self {
    ImageSource::File(path)
  }
}

impl From<RgbFrame> for ImageSource {
  fn from(frame: RgbFrame) -> Self {
    ImageSource::Raw(frame)
  }
}

#[derive(Error, Debug)]
pub enum DecodeError {
  #[error("图像数据为空")]
  Empty,
  #[error("无效的 data URL: {0}")]
  InvalidDataUrl(String),
  #[error("Base64 解码错误: {0}")]
  Base64(#[from] base64::DecodeError),
  #[error("I/O 错误: {0}")]
  Io(#[from] std::io::Error),
  #[error("图像解码错误: {0}")]
  Image(#[from] image::ImageError),
  #[error("帧尺寸不匹配: 期望 {expected:?}, 实际 {actual:?}")]
  ShapeMismatch {
    expected: (u32, u32),
    actual: (u32, u32),
  },
}

/// 将图像来源解码并缩放到指定画布尺寸
///
/// 不同运行环境可以提供自己的实现，其余流水线只依赖得到的 [`RgbFrame`]。
pub trait FrameLoader {
  fn load(&self, source: &ImageSource, width: u32, height: u32) -> Result<RgbFrame, DecodeError>;
}

impl<L: FrameLoader + ?Sized> FrameLoader for &L {
  fn load(&self, source: &ImageSource, width: u32, height: u32) -> Result<RgbFrame, DecodeError> {
    (**self).load(source, width, height)
  }
}

#[derive(Error, Debug)]
pub enum InputError {
  #[error("图像文件输入错误: {0}")]
  ImageFileInputError(#[from] ImageFileInputError),
  #[error("目录输入错误: {0}")]
  DirectoryInputError(#[from] DirectoryInputError),
  #[cfg(feature = "v4l2_input")]
  #[error("V4L2 输入错误: {0}")]
  V4l2InputError(#[from] V4l2InputError),
  #[error("URI 方案不匹配: {0}")]
  SchemeMismatch(String),
}

pub enum InputWrapper {
  ReadImageFile(ImageFileInput),
  Directory(DirectoryInput),
  DataUrl(DataUrlInput),
  #[cfg(feature = "v4l2_input")]
  V4l2(V4l2Input),
}

impl FromUrl for InputWrapper {
  type Error = InputError;

  fn from_url(url: &url::Url) -> Result<Self, Self::Error> {
    match url.scheme() {
      ImageFileInput::SCHEME => Ok(InputWrapper::ReadImageFile(ImageFileInput::from_url(url)?)),
      DirectoryInput::SCHEME => Ok(InputWrapper::Directory(DirectoryInput::from_url(url)?)),
      DataUrlInput::SCHEME => Ok(InputWrapper::DataUrl(DataUrlInput::from_url(url)?)),
      #[cfg(feature = "v4l2_input")]
      V4l2Input::SCHEME => Ok(InputWrapper::V4l2(V4l2Input::from_url(url)?)),
      other => Err(InputError::SchemeMismatch(other.to_string())),
    }
  }
}

impl Iterator for InputWrapper {
  type Item = ImageSource;

  fn next(&mut self) -> Option<Self::Item> {
    match self {
      InputWrapper::ReadImageFile(input) => input.next(),
      InputWrapper::Directory(input) => input.next(),
      InputWrapper::DataUrl(input) => input.next(),
      #[cfg(feature = "v4l2_input")]
      InputWrapper::V4l2(input) => input.next(),
    }
  }
}

/// 将 URL 路径部分还原为本地路径（处理 `%20` 等转义）
pub(crate) fn url_path(url: &url::Url) -> PathBuf {
  let path = url.path();
  match urlencoding::decode(path) {
    Ok(decoded) => PathBuf::from(decoded.into_owned()),
    Err(_) => PathBuf::from(path),
  }
}
