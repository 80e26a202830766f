// 该文件是 Guijian （轨检） 项目的一部分。
// src/input/v4l2_source.rs - V4L2 摄像头输入源
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

use std::pin::Pin;

use thiserror::Error;
use tracing::{error, info};
use url::Url;
use v4l::FourCC;
use v4l::buffer::Type;
use v4l::io::mmap::Stream;
use v4l::io::traits::CaptureStream;
use v4l::prelude::*;
use v4l::video::Capture;

use super::{ImageSource, url_path};
use crate::{FromUrl, FromUrlWithScheme, frame::RgbFrame};

const DEFAULT_CAPTURE_WIDTH: u32 = 640;
const DEFAULT_CAPTURE_HEIGHT: u32 = 480;
const CAPTURE_BUFFERS: u32 = 4;

#[derive(Error, Debug)]
pub enum V4l2InputError {
  #[error("URI 方案不匹配")]
  SchemeMismatch,
  #[error("无效的采集参数: {0}")]
  InvalidParam(String),
  #[error("设备 I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
}

/// V4L2 摄像头输入，`v4l2:///dev/video0?width=640&height=480`
///
/// 由于 v4l 库的 Stream 需要引用 Device，我们使用 Pin<Box<Device>> 来保证
/// Device 的内存地址稳定，从而可以安全地创建引用它的 Stream。
pub struct V4l2Input {
  device: Pin<Box<Device>>,
  stream: Option<Stream<'static>>,
  width: u32,
  height: u32,
}

impl FromUrlWithScheme for V4l2Input {
  const SCHEME: &'static str = "v4l2";
}

impl FromUrl for V4l2Input {
  type Error = V4l2InputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      return Err(V4l2InputError::SchemeMismatch);
    }

    let mut width = DEFAULT_CAPTURE_WIDTH;
    let mut height = DEFAULT_CAPTURE_HEIGHT;
    for (k, v) in url.query_pairs() {
      match k.as_ref() {
        "width" => {
          width = v
            .parse()
            .map_err(|_| V4l2InputError::InvalidParam(format!("width={}", v)))?
        }
        "height" => {
          height = v
            .parse()
            .map_err(|_| V4l2InputError::InvalidParam(format!("height={}", v)))?
        }
        _ => {}
      }
    }

    let device_path = url_path(url);
    V4l2Input::open(&device_path.to_string_lossy(), width, height)
  }
}

impl V4l2Input {
  pub fn open(device_path: &str, width: u32, height: u32) -> Result<Self, V4l2InputError> {
    info!("打开摄像头设备: {}", device_path);
    let device = Box::pin(Device::with_path(device_path)?);

    let mut format = device.format()?;
    format.width = width;
    format.height = height;
    format.fourcc = FourCC::new(b"YUYV");
    let format = device.set_format(&format)?;
    info!("摄像头采集格式: {}x{} {}", format.width, format.height, format.fourcc);

    let mut source = Self {
      device,
      stream: None,
      width: format.width,
      height: format.height,
    };

    // SAFETY: device 被 Pin<Box> 固定在堆上不会移动；stream 存储在同一个结构体中，
    // 并在 Drop 中先于 device 释放
    let device_ref: &Device = &source.device;
    let stream = unsafe {
      let device_static: &'static Device = std::mem::transmute(device_ref);
      Stream::with_buffers(device_static, Type::VideoCapture, CAPTURE_BUFFERS)?
    };

    source.stream = Some(stream);
    Ok(source)
  }

  /// mmap 缓冲区可能带有尾部填充，只取一帧 YUYV 数据
  fn frame_bytes(buffer: &[u8], width: u32, height: u32) -> &[u8] {
    let len = (width as usize * height as usize * 2).min(buffer.len());
    &buffer[..len]
  }

  /// 将 YUYV 格式转换为 RGB
  fn yuyv_to_rgb(yuyv: &[u8], width: u32, height: u32) -> Vec<u8> {
    let mut rgb = Vec::with_capacity((width * height * 3) as usize);

    for chunk in yuyv.chunks_exact(4) {
      let u = chunk[1] as f32 - 128.0;
      let v = chunk[3] as f32 - 128.0;

      for y in [chunk[0] as f32, chunk[2] as f32] {
        let r = (y + 1.402 * v).clamp(0.0, 255.0) as u8;
        let g = (y - 0.344 * u - 0.714 * v).clamp(0.0, 255.0) as u8;
        let b = (y + 1.772 * u).clamp(0.0, 255.0) as u8;
        rgb.extend_from_slice(&[r, g, b]);
      }
    }

    rgb
  }
}

impl Drop for V4l2Input {
  fn drop(&mut self) {
    self.stream.take();
  }
}

impl Iterator for V4l2Input {
  type Item = ImageSource;

  fn next(&mut self) -> Option<Self::Item> {
    let stream = self.stream.as_mut()?;

    match stream.next() {
      Ok((buffer, _meta)) => {
        let rgb = Self::yuyv_to_rgb(
          Self::frame_bytes(buffer, self.width, self.height),
          self.width,
          self.height,
        );
        match RgbFrame::from_raw(self.width, self.height, rgb) {
          Some(frame) => Some(ImageSource::Raw(frame)),
          None => {
            error!("摄像头帧长度与采集格式不符，停止采集");
            None
          }
        }
      }
      Err(e) => {
        error!("无法捕获帧: {}", e);
        None
      }
    }
  }
}
