// 该文件是 Guijian （轨检） 项目的一部分。
// src/args.rs - 命令行检测参数
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

use clap::Args;
use url::Url;

use crate::{
  FromUrl,
  model::{CrackDetectorBuilder, DetectorParams, DetectorParamsError},
};

/// 各个可执行程序共享的检测参数
#[derive(Args, Debug, Clone)]
pub struct DetectorArgs {
  /// 检测器配置 URL，例如 crack:?width=640&height=480&threshold=50
  /// 给出时忽略下面的单项参数
  #[arg(long, value_name = "DETECTOR")]
  pub detector: Option<Url>,

  /// 工作分辨率宽度（像素）
  #[arg(long, default_value = "640", value_name = "PIXELS")]
  pub width: u32,

  /// 工作分辨率高度（像素）
  #[arg(long, default_value = "480", value_name = "PIXELS")]
  pub height: u32,

  /// Sobel 梯度幅值阈值
  #[arg(long, default_value = "50.0", value_name = "THRESHOLD")]
  pub edge_threshold: f64,

  /// 洪水填充阶段保留区域的最小像素数（严格大于）
  #[arg(long, default_value = "10", value_name = "COUNT")]
  pub min_region_pixels: usize,

  /// 分类阶段保留区域的最小像素数
  #[arg(long, default_value = "20", value_name = "COUNT")]
  pub min_crack_pixels: usize,
}

impl DetectorArgs {
  pub fn builder(&self) -> Result<CrackDetectorBuilder, DetectorParamsError> {
    match &self.detector {
      Some(url) => CrackDetectorBuilder::from_url(url),
      None => {
        let params = DetectorParams {
          width: self.width,
          height: self.height,
          edge_threshold: self.edge_threshold,
          min_region_pixels: self.min_region_pixels,
          min_crack_pixels: self.min_crack_pixels,
        };
        params.validate()?;
        Ok(CrackDetectorBuilder::new(params))
      }
    }
  }
}
