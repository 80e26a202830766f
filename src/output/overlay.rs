// 该文件是 Guijian （轨检） 项目的一部分。
// src/output/overlay.rs - 显示用检测框后处理
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

use crate::model::CrackDetection;

/// 膨胀像素数
pub const OVERLAY_PAD: u32 = 12;
/// 允许合并的最大水平间隙
pub const OVERLAY_MERGE_GAP: u32 = 18;

/// 膨胀并合并水平相邻的检测框，减少同一条裂缝被断开显示
///
/// 只影响叠加显示，不修改检测结果本身。合并后的框保留靠左一框的
/// 编号、类型与严重程度，置信度取两者最大值。
pub fn merge_for_display(detections: &[CrackDetection], pad: u32, gap: u32) -> Vec<CrackDetection> {
  let mut dilated = detections
    .iter()
    .map(|d| CrackDetection {
      x: d.x.saturating_sub(pad),
      y: d.y.saturating_sub(pad),
      width: d.width + pad * 2,
      height: d.height + pad * 2,
      ..d.clone()
    })
    .collect::<Vec<_>>();
  dilated.sort_by_key(|d| d.x);

  let mut merged: Vec<CrackDetection> = Vec::with_capacity(dilated.len());
  for d in dilated {
    if let Some(last) = merged.last_mut() {
      let last_right = last.x as i64 + last.width as i64;
      let vertical_overlap = !(d.y > last.y + last.height || last.y > d.y + d.height);
      if vertical_overlap && d.x as i64 - last_right <= gap as i64 {
        let min_x = last.x.min(d.x);
        let min_y = last.y.min(d.y);
        let max_x = (last.x + last.width).max(d.x + d.width);
        let max_y = (last.y + last.height).max(d.y + d.height);
        last.x = min_x;
        last.y = min_y;
        last.width = max_x - min_x;
        last.height = max_y - min_y;
        last.confidence = last.confidence.max(d.confidence);
        continue;
      }
    }
    merged.push(d);
  }

  merged
}
