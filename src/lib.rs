// 该文件是 Guijian （轨检） 项目的一部分。
// src/lib.rs - 库主文件
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

//! 基于图像的轨道裂缝检测
//!
//! 每帧依次执行：解码与缩放、灰度转换、Sobel 边缘检测、4 邻域洪水填充
//! 提取区域、按几何特征分类。检测器不保存跨调用状态。
//!
//! ```no_run
//! use guijian::{detect, input::ImageSource};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let source = ImageSource::File("frame.jpg".into());
//! let result = detect(&source, 640, 480)?;
//! for crack in &result.detections {
//!   println!("{:?} {:?} at ({}, {})", crack.kind, crack.severity, crack.x, crack.y);
//! }
//! # Ok(())
//! # }
//! ```

pub mod args;
pub mod frame;
pub mod input;
pub mod model;
pub mod output;
pub mod task;

pub use model::{
  CrackDetection, CrackDetector, CrackKind, DetectError, DetectionResult, Severity, detect,
};

pub trait FromUrl {
  type Error;
  fn from_url(url: &url::Url) -> Result<Self, Self::Error>
  where
    Self: Sized;
}

pub trait FromUrlWithScheme: FromUrl {
  const SCHEME: &'static str;
}
