// 该文件是 Guijian （轨检） 项目的一部分。
// src/model/crack.rs - 裂缝检测流水线
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

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use thiserror::Error;
use tracing::{debug, info};
use url::Url;

use super::{
  CrackDetection, DetectionResult, Inspection, Model,
  classify::analyze_regions,
  grayscale::to_grayscale,
  plane::EdgeMagnitudeBuffer,
  region::extract_regions,
  sobel::sobel_magnitude,
};
use crate::{
  FromUrl, FromUrlWithScheme,
  frame::RgbFrame,
  input::{DecodeError, FrameLoader, ImageCodecLoader, ImageSource},
};

const DEFAULT_WIDTH: u32 = 640;
const DEFAULT_HEIGHT: u32 = 480;
const DEFAULT_EDGE_THRESHOLD: f64 = 50.0;
const DEFAULT_MIN_REGION_PIXELS: usize = 10;
const DEFAULT_MIN_CRACK_PIXELS: usize = 20;

#[derive(Error, Debug)]
pub enum DetectError {
  #[error("帧解码失败: {0}")]
  Decode(#[from] DecodeError),
  #[error("无效的帧尺寸: {width}x{height}")]
  Dimension { width: u32, height: u32 },
  #[error("检测已取消")]
  Cancelled,
}

#[derive(Error, Debug)]
pub enum DetectorParamsError {
  #[error("URI 方案不匹配: 期望 '{expected}', 实际 '{found}'")]
  SchemeMismatch {
    expected: &'static str,
    found: String,
  },
  #[error("无效的检测参数 {key}={value}")]
  InvalidValue { key: String, value: String },
  #[error("未知的检测参数: {0}")]
  UnknownKey(String),
}

/// 检测参数，默认对应 640x480 摄像头帧
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectorParams {
  /// 工作分辨率，输入图像会被缩放到此尺寸
  pub width: u32,
  pub height: u32,
  /// 梯度幅值必须严格大于该值
  pub edge_threshold: f64,
  /// 洪水填充阶段：像素数必须严格大于该值
  pub min_region_pixels: usize,
  /// 分类阶段：像素数小于该值的区域被丢弃
  pub min_crack_pixels: usize,
}

impl Default for DetectorParams {
  fn default() -> Self {
    Self {
      width: DEFAULT_WIDTH,
      height: DEFAULT_HEIGHT,
      edge_threshold: DEFAULT_EDGE_THRESHOLD,
      min_region_pixels: DEFAULT_MIN_REGION_PIXELS,
      min_crack_pixels: DEFAULT_MIN_CRACK_PIXELS,
    }
  }
}

impl DetectorParams {
  pub fn with_size(mut self, width: u32, height: u32) -> Self {
    self.width = width;
    self.height = height;
    self
  }

  /// 阈值必须是非负有限数，否则任意像素都会被当作边缘
  pub fn validate(&self) -> Result<(), DetectorParamsError> {
    if !self.edge_threshold.is_finite() || self.edge_threshold < 0.0 {
      return Err(DetectorParamsError::InvalidValue {
        key: "threshold".to_string(),
        value: self.edge_threshold.to_string(),
      });
    }
    Ok(())
  }

  fn set(&mut self, key: &str, value: &str) -> Result<(), DetectorParamsError> {
    let invalid = || DetectorParamsError::InvalidValue {
      key: key.to_string(),
      value: value.to_string(),
    };
    match key {
      "width" => self.width = value.parse().map_err(|_| invalid())?,
      "height" => self.height = value.parse().map_err(|_| invalid())?,
      "threshold" => {
        self.edge_threshold = value.parse().map_err(|_| invalid())?;
        self.validate()?;
      }
      "min_region" => self.min_region_pixels = value.parse().map_err(|_| invalid())?,
      "min_crack" => self.min_crack_pixels = value.parse().map_err(|_| invalid())?,
      other => return Err(DetectorParamsError::UnknownKey(other.to_string())),
    }
    Ok(())
  }
}

/// 协作式取消标志，在各阶段之间检查
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn cancel(&self) {
    self.0.store(true, Ordering::SeqCst);
  }

  pub fn is_cancelled(&self) -> bool {
    self.0.load(Ordering::SeqCst)
  }
}

/// 通过 `crack:?width=640&height=480&threshold=50` 形式的 URL 配置检测器
#[derive(Debug, Clone, Default)]
pub struct CrackDetectorBuilder {
  params: DetectorParams,
  cancel: Option<CancelToken>,
}

impl FromUrlWithScheme for CrackDetectorBuilder {
  const SCHEME: &'static str = "crack";
}

impl FromUrl for CrackDetectorBuilder {
  type Error = DetectorParamsError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      return Err(DetectorParamsError::SchemeMismatch {
        expected: Self::SCHEME,
        found: url.scheme().to_string(),
      });
    }

    let mut params = DetectorParams::default();
    for (k, v) in url.query_pairs() {
      params.set(&k, &v)?;
    }

    Ok(CrackDetectorBuilder {
      params,
      cancel: None,
    })
  }
}

impl CrackDetectorBuilder {
  pub fn new(params: DetectorParams) -> Self {
    Self {
      params,
      cancel: None,
    }
  }

  pub fn params(&self) -> &DetectorParams {
    &self.params
  }

  pub fn cancel_token(mut self, token: CancelToken) -> Self {
    self.cancel = Some(token);
    self
  }

  pub fn build(self) -> CrackDetector {
    self.build_with_loader(ImageCodecLoader::default())
  }

  pub fn build_with_loader<L: FrameLoader>(self, loader: L) -> CrackDetector<L> {
    info!(
      "创建裂缝检测器: {}x{}, 边缘阈值 {}, 最小区域 {} / {} 像素",
      self.params.width,
      self.params.height,
      self.params.edge_threshold,
      self.params.min_region_pixels,
      self.params.min_crack_pixels
    );
    CrackDetector {
      params: self.params,
      loader,
      cancel: self.cancel,
    }
  }
}

/// 无跨调用状态的裂缝检测器，可在多个线程上并发调用
pub struct CrackDetector<L = ImageCodecLoader> {
  params: DetectorParams,
  loader: L,
  cancel: Option<CancelToken>,
}

impl<L: FrameLoader> CrackDetector<L> {
  pub fn params(&self) -> &DetectorParams {
    &self.params
  }

  /// 解码、检测并返回结果
  pub fn detect(&self, source: &ImageSource) -> Result<DetectionResult, DetectError> {
    self.inspect(source).map(|inspection| inspection.result)
  }

  /// 与 [`detect`](Self::detect) 相同，同时返回解码后的帧
  pub fn inspect(&self, source: &ImageSource) -> Result<Inspection, DetectError> {
    let DetectorParams { width, height, .. } = self.params;
    if width == 0 || height == 0 {
      return Err(DetectError::Dimension { width, height });
    }

    let start = Instant::now();
    let frame = self.loader.load(source, width, height)?;
    if frame.dimensions() != (width, height) {
      return Err(
        DecodeError::ShapeMismatch {
          expected: (width, height),
          actual: frame.dimensions(),
        }
        .into(),
      );
    }
    let detections = self.analyze(&frame)?;
    let processing_time = start.elapsed().as_secs_f64() * 1000.0;

    debug!(
      "{} 检测完成: {} 处裂缝, 耗时 {:.2}ms",
      source,
      detections.len(),
      processing_time
    );

    Ok(Inspection {
      frame,
      result: DetectionResult {
        detections,
        processing_time,
        frame_width: width,
        frame_height: height,
      },
    })
  }

  /// 对已解码的帧执行灰度、边缘、区域、分类四个阶段
  pub fn analyze(&self, frame: &RgbFrame) -> Result<Vec<CrackDetection>, DetectError> {
    let gray = to_grayscale(frame);
    self.check_cancelled()?;
    let edges = sobel_magnitude(&gray);
    self.check_cancelled()?;
    self.detections_from_edges(&edges)
  }

  /// 从梯度幅值开始执行区域提取与分类
  pub fn detections_from_edges(
    &self,
    edges: &EdgeMagnitudeBuffer,
  ) -> Result<Vec<CrackDetection>, DetectError> {
    let regions = extract_regions(
      edges,
      self.params.edge_threshold,
      self.params.min_region_pixels,
    );
    self.check_cancelled()?;
    debug!("找到 {} 个候选区域", regions.len());
    Ok(analyze_regions(
      &regions,
      edges.width(),
      self.params.min_crack_pixels,
    ))
  }

  fn check_cancelled(&self) -> Result<(), DetectError> {
    match &self.cancel {
      Some(token) if token.is_cancelled() => Err(DetectError::Cancelled),
      _ => Ok(()),
    }
  }
}

impl<L: FrameLoader> Model for CrackDetector<L> {
  type Input = ImageSource;
  type Output = Inspection;
  type Error = DetectError;

  fn infer(&self, input: &Self::Input) -> Result<Self::Output, Self::Error> {
    self.inspect(input)
  }
}

/// 使用默认参数和默认解码器对一帧做检测
pub fn detect(source: &ImageSource, width: u32, height: u32) -> Result<DetectionResult, DetectError> {
  CrackDetectorBuilder::new(DetectorParams::default().with_size(width, height))
    .build()
    .detect(source)
}
