// 该文件是 Guijian （轨检） 项目的一部分。
// src/input/loader.rs - 基于 image 编解码器的帧加载
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

use std::borrow::Cow;

use image::{RgbImage, imageops::FilterType};
use tracing::debug;

use super::{DecodeError, FrameLoader, ImageSource, decode_data_url};
use crate::frame::RgbFrame;

/// 使用 `image` crate 解码，并按双线性插值缩放到目标画布
#[derive(Debug, Clone, Copy)]
pub struct ImageCodecLoader {
  filter: FilterType,
}

impl Default for ImageCodecLoader {
  fn default() -> Self {
    Self {
      filter: FilterType::Triangle,
    }
  }
}

impl ImageCodecLoader {
  pub fn with_filter(mut self, filter: FilterType) -> Self {
    self.filter = filter;
    self
  }

  fn decode(source: &ImageSource) -> Result<RgbImage, DecodeError> {
    let bytes: Cow<[u8]> = match source {
      ImageSource::DataUrl(text) => Cow::Owned(decode_data_url(text)?),
      ImageSource::Bytes(bytes) => Cow::Borrowed(bytes),
      ImageSource::File(path) => Cow::Owned(std::fs::read(path)?),
      ImageSource::Raw(frame) => {
        let (width, height) = frame.dimensions();
        return RgbImage::from_raw(width, height, frame.as_nhwc().to_vec())
          .ok_or(DecodeError::Empty);
      }
    };

    if bytes.is_empty() {
      return Err(DecodeError::Empty);
    }

    let image = image::load_from_memory(&bytes)?;
    debug!(
      "图像解码完成: {}x{} {:?}",
      image.width(),
      image.height(),
      image.color()
    );
    Ok(image.to_rgb8())
  }
}

impl FrameLoader for ImageCodecLoader {
  fn load(&self, source: &ImageSource, width: u32, height: u32) -> Result<RgbFrame, DecodeError> {
    let image = Self::decode(source)?;
    if image.width() == 0 || image.height() == 0 {
      return Err(DecodeError::Empty);
    }

    if image.dimensions() == (width, height) {
      return Ok(RgbFrame::from(image));
    }

    debug!(
      "缩放图像 {}x{} -> {}x{}",
      image.width(),
      image.height(),
      width,
      height
    );
    let resized = image::imageops::resize(&image, width, height, self.filter);
    Ok(RgbFrame::from(resized))
  }
}
