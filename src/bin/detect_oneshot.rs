// 该文件是 Guijian （轨检） 项目的一部分。
// src/bin/detect_oneshot.rs - 单帧裂缝检测
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

use anyhow::Result;
use clap::Parser;
use url::Url;

use guijian::{
  FromUrl,
  args::DetectorArgs,
  input::InputWrapper,
  output::OutputWrapper,
  task::{OneShotTask, Task},
};
use tracing::info;

/// 对输入的第一帧执行一次裂缝检测
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 输入来源，例如 image:///path/to/frame.jpg
  #[arg(long, value_name = "SOURCE")]
  pub input: Url,
  /// 输出目标，可重复指定
  #[arg(long, value_name = "OUTPUT", default_value = "log:")]
  pub output: Vec<Url>,

  #[command(flatten)]
  pub detector: DetectorArgs,
}

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = Args::parse();

  info!("输入来源: {}", args.input);
  for output in args.output.iter() {
    info!("输出目标: {}", output);
  }

  let input = InputWrapper::from_url(&args.input)?;
  let model = args.detector.builder()?.build();
  let output = args
    .output
    .iter()
    .map(OutputWrapper::from_url)
    .collect::<Result<Vec<_>, _>>()?;

  OneShotTask.run_task(input, model, output)?;

  Ok(())
}
