// 该文件是 Guijian （轨检） 项目的一部分。
// src/task.rs - 检测任务调度
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

use std::{
  sync::mpsc::{self, RecvTimeoutError},
  thread,
  time::{Duration, Instant},
};
use tracing::{info, warn};

use crate::{model::CancelToken, model::Model, output::Render};

/// 自动检测的默认间隔
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(2);
const DEFAULT_REPEAT_TIMES: usize = 1000;
const WARMUP_ROUNDS: usize = 2;

pub trait Task<I, M, O>: Sized {
  type Error;
  fn run_task(self, input: I, model: M, output: O) -> Result<(), Self::Error>;
}

/// 取一帧检测一次，对应界面上的“立即检测”
pub struct OneShotTask;

impl<
  F,
  D,
  ME: std::error::Error + Sync + Send + 'static,
  RE: std::error::Error + Sync + Send + 'static,
  I: Iterator<Item = F>,
  M: Model<Input = F, Output = D, Error = ME>,
  O: Render<D, Error = RE>,
> Task<I, M, O> for OneShotTask
{
  type Error = anyhow::Error;

  fn run_task(self, mut input: I, model: M, output: O) -> Result<(), Self::Error> {
    info!("开始任务...");
    let frame = input.next().ok_or_else(|| anyhow::anyhow!("没有输入帧"))?;
    info!("输入帧获取成功，开始检测...");
    let now = Instant::now();
    let result = model.infer(&frame)?;
    let elapsed = now.elapsed();
    info!("检测完成，耗时: {:.2?}", elapsed);
    output.render_result(&result)?;
    info!("输出完成，总耗时: {:.2?}", now.elapsed());

    Ok(())
  }
}

/// 对同一帧反复检测，统计平均耗时
#[derive(Debug)]
pub struct RepeatShotTask {
  repeat: usize,
}

impl Default for RepeatShotTask {
  fn default() -> Self {
    Self {
      repeat: DEFAULT_REPEAT_TIMES,
    }
  }
}

impl RepeatShotTask {
  pub fn with_repeat(mut self, repeat: usize) -> Self {
    self.repeat = repeat.max(1);
    self
  }
}

impl<
  F,
  D,
  ME: std::error::Error + Sync + Send + 'static,
  RE: std::error::Error + Sync + Send + 'static,
  I: Iterator<Item = F>,
  M: Model<Input = F, Output = D, Error = ME>,
  O: Render<D, Error = RE>,
> Task<I, M, O> for RepeatShotTask
{
  type Error = anyhow::Error;

  fn run_task(self, mut input: I, model: M, output: O) -> Result<(), Self::Error> {
    info!("开始任务...");
    let frame = input.next().ok_or_else(|| anyhow::anyhow!("没有输入帧"))?;
    info!("输入帧获取成功，重复检测 {} 次...", self.repeat);
    let mut times = Vec::with_capacity(self.repeat);
    for i in 0..self.repeat {
      let now = Instant::now();
      let result = model.infer(&frame)?;
      let elapsed = now.elapsed();
      info!("({})检测完成，耗时: {:.2?}", i, elapsed);
      output.render_result(&result)?;
      times.push(elapsed);
    }

    // 前几轮包含缓存预热
    let skip = if times.len() > WARMUP_ROUNDS {
      WARMUP_ROUNDS
    } else {
      0
    };
    let counted = &times[skip..];
    warn!(
      "平均检测时间: {:.2?}",
      counted.iter().sum::<Duration>() / counted.len() as u32
    );

    Ok(())
  }
}

/// 按固定间隔持续检测，直到输入耗尽、达到帧数或收到中断
///
/// 单帧检测失败只记录警告，不终止任务；输出失败则直接返回错误。
#[derive(Debug)]
pub struct ContinuousTask {
  frame_number: Option<usize>,
  interval: Duration,
  cancel: CancelToken,
  handle_signal: bool,
}

impl Default for ContinuousTask {
  fn default() -> Self {
    Self {
      frame_number: None,
      interval: DEFAULT_INTERVAL,
      cancel: CancelToken::new(),
      handle_signal: true,
    }
  }
}

impl ContinuousTask {
  pub fn with_frame_number(mut self, frame_number: Option<usize>) -> Self {
    self.frame_number = frame_number;
    self
  }

  pub fn with_interval(mut self, interval: Duration) -> Self {
    self.interval = interval;
    self
  }

  /// 与检测器共用同一个标志，中断时正在进行的检测也会尽快退出
  pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
    self.cancel = cancel;
    self
  }

  /// Ctrl-C 处理函数每个进程只能注册一次
  pub fn with_signal_handler(mut self, enabled: bool) -> Self {
    self.handle_signal = enabled;
    self
  }
}

impl<
  F,
  D,
  ME: std::error::Error + Sync + Send + 'static,
  RE: std::error::Error + Sync + Send + 'static,
  I: Iterator<Item = F>,
  M: Model<Input = F, Output = D, Error = ME>,
  O: Render<D, Error = RE>,
> Task<I, M, O> for ContinuousTask
{
  type Error = anyhow::Error;

  fn run_task(self, input: I, model: M, output: O) -> Result<(), Self::Error> {
    info!("开始任务，检测间隔 {:.2?}", self.interval);
    let (tx, rx) = mpsc::channel();

    if self.handle_signal {
      let cancel = self.cancel.clone();
      ctrlc::set_handler(move || {
        info!("收到中断信号，准备退出...");
        cancel.cancel();
        let _ = tx.send(());
        thread::spawn(|| {
          thread::sleep(Duration::from_secs(30));
          warn!("强制退出程序");
          std::process::exit(1);
        });
      })?;
    } else {
      drop(tx);
    }

    let mut frame_index = 0usize;
    let mut failures = 0usize;
    for frame in input {
      let started = Instant::now();
      frame_index = frame_index.wrapping_add(1);
      info!("处理第 {} 帧图像", frame_index);

      match model.infer(&frame) {
        Ok(result) => {
          let elapsed = started.elapsed();
          output.render_result(&result)?;
          info!(
            "检测完成，耗时: {:.2?} / {:.2?}",
            elapsed,
            started.elapsed()
          );
        }
        Err(e) if self.cancel.is_cancelled() => {
          warn!("检测被中断: {}", e);
          break;
        }
        Err(e) => {
          failures += 1;
          warn!("第 {} 帧检测失败，跳过: {}", frame_index, e);
        }
      }

      if self.frame_number.is_some_and(|n| frame_index >= n) {
        info!("达到指定帧数 {}, 退出任务循环", frame_index);
        break;
      }
      if self.cancel.is_cancelled() {
        warn!("中断信号接收，退出任务循环");
        break;
      }

      let remaining = self.interval.saturating_sub(started.elapsed());
      match rx.recv_timeout(remaining) {
        Ok(()) => {
          warn!("中断信号接收，退出任务循环");
          break;
        }
        Err(RecvTimeoutError::Timeout) => {}
        Err(RecvTimeoutError::Disconnected) => thread::sleep(remaining),
      }
    }

    info!("任务完成，共处理 {} 帧，失败 {} 帧", frame_index, failures);
    Ok(())
  }
}
