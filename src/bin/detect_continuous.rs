// 该文件是 Guijian （轨检） 项目的一部分。
// src/bin/detect_continuous.rs - 按固定间隔持续检测
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

use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use url::Url;

use guijian::{
  FromUrl,
  args::DetectorArgs,
  input::InputWrapper,
  model::CancelToken,
  output::OutputWrapper,
  task::{ContinuousTask, Task},
};
use tracing::info;

/// 持续从输入取帧检测，直到输入耗尽或按下 Ctrl-C
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 输入来源，例如 folder:///captures?loop 或 v4l2:///dev/video0
  #[arg(long, value_name = "SOURCE")]
  pub input: Url,
  /// 输出目标，可重复指定
  #[arg(long, value_name = "OUTPUT", default_value = "log:")]
  pub output: Vec<Url>,

  /// 两次检测之间的间隔（毫秒）
  #[arg(long, default_value = "2000", value_name = "MILLIS")]
  pub interval_ms: u64,

  #[arg(long, value_name = "FRAME_NUMBER")]
  pub frame_number: Option<usize>,

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

  let cancel = CancelToken::new();
  let input = InputWrapper::from_url(&args.input)?;
  let model = args.detector.builder()?.cancel_token(cancel.clone()).build();
  let output = args
    .output
    .iter()
    .map(OutputWrapper::from_url)
    .collect::<Result<Vec<_>, _>>()?;

  ContinuousTask::default()
    .with_frame_number(args.frame_number)
    .with_interval(Duration::from_millis(args.interval_ms))
    .with_cancel_token(cancel)
    .run_task(input, model, output)?;

  Ok(())
}
