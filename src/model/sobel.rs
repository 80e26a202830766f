// 该文件是 Guijian （轨检） 项目的一部分。
// src/model/sobel.rs - Sobel 边缘检测
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

//! Sobel 梯度幅值
//!
//! 仅计算内部像素 `1 <= x <= w-2, 1 <= y <= h-2`，边框像素保持为 0，
//! 不做填充、镜像或环绕。

use super::plane::{EdgeMagnitudeBuffer, GrayscaleBuffer, Plane};

type Kernel3 = [[f64; 3]; 3];

const SOBEL_KERNEL_X: Kernel3 = [[-1.0, 0.0, 1.0], [-2.0, 0.0, 2.0], [-1.0, 0.0, 1.0]];
const SOBEL_KERNEL_Y: Kernel3 = [[-1.0, -2.0, -1.0], [0.0, 0.0, 0.0], [1.0, 2.0, 1.0]];

pub fn sobel_magnitude(gray: &GrayscaleBuffer) -> EdgeMagnitudeBuffer {
  let (w, h) = (gray.width(), gray.height());
  let mut mag = Plane::new(w, h);
  if w < 3 || h < 3 {
    return mag;
  }

  for y in 1..h - 1 {
    let rows = [gray.row(y - 1), gray.row(y), gray.row(y + 1)];
    let out = mag.row_mut(y);
    for x in 1..w - 1 {
      let mut gx = 0.0;
      let mut gy = 0.0;
      for (ky, row) in rows.iter().enumerate() {
        for kx in 0..3 {
          let value = row[x + kx - 1];
          gx += value * SOBEL_KERNEL_X[ky][kx];
          gy += value * SOBEL_KERNEL_Y[ky][kx];
        }
      }
      out[x] = (gx * gx + gy * gy).sqrt();
    }
  }

  mag
}

#[cfg(test)]
mod tests {
  use super::*;

  fn plane_from_fn(w: usize, h: usize, f: impl Fn(usize, usize) -> f64) -> Plane {
    let mut plane = Plane::new(w, h);
    for y in 0..h {
      for x in 0..w {
        plane.set(x, y, f(x, y));
      }
    }
    plane
  }

  #[test]
  fn border_pixels_stay_zero() {
    let gray = plane_from_fn(9, 7, |x, y| ((x * 37 + y * 91) % 255) as f64);
    let mag = sobel_magnitude(&gray);
    for y in 0..7 {
      for x in 0..9 {
        if x == 0 || y == 0 || x == 8 || y == 6 {
          assert_eq!(mag.get(x, y), 0.0, "border ({}, {})", x, y);
        }
      }
    }
    assert!(mag.as_slice().iter().any(|v| *v > 0.0));
  }

  #[test]
  fn uniform_image_has_no_edges() {
    let gray = plane_from_fn(6, 6, |_, _| 128.0);
    assert!(sobel_magnitude(&gray).as_slice().iter().all(|v| *v == 0.0));
  }

  #[test]
  fn vertical_step_response() {
    // 左暗右亮，阶跃位于 x = 3
    let gray = plane_from_fn(6, 5, |x, _| if x >= 3 { 100.0 } else { 0.0 });
    let mag = sobel_magnitude(&gray);
    assert_eq!(mag.get(1, 2), 0.0);
    assert_eq!(mag.get(2, 2), 400.0);
    assert_eq!(mag.get(3, 2), 400.0);
    assert_eq!(mag.get(4, 2), 0.0);
  }

  #[test]
  fn diagonal_kernel_weights() {
    // 只有右下角像素为 1，中心 (1,1) 的 gx = gy = 1
    let gray = plane_from_fn(3, 3, |x, y| if x == 2 && y == 2 { 1.0 } else { 0.0 });
    let mag = sobel_magnitude(&gray);
    assert_eq!(mag.get(1, 1), 2.0_f64.sqrt());
  }

  #[test]
  fn tiny_images_are_all_border() {
    let gray = plane_from_fn(2, 5, |x, _| x as f64 * 200.0);
    let mag = sobel_magnitude(&gray);
    assert_eq!(mag.len(), 10);
    assert!(mag.as_slice().iter().all(|v| *v == 0.0));
  }
}
