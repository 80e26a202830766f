// 该文件是 Guijian （轨检） 项目的一部分。
// tests/pipeline.rs - 端到端检测流程测试
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

mod common;

use common::synthetic_image::{
  encode_png, horizontal_line, png_data_url, rail_crack_frame, rail_crack_image,
};
use guijian::{
  CrackKind, DetectError, Severity, detect,
  input::{DecodeError, ImageSource},
  model::{CrackDetectorBuilder, DetectorParams},
};

#[test]
fn bright_line_is_one_longitudinal_crack() {
  let result = detect(&ImageSource::Raw(rail_crack_frame()), 200, 200).unwrap();

  assert_eq!((result.frame_width, result.frame_height), (200, 200));
  assert!(result.processing_time >= 0.0);
  assert_eq!(result.detections.len(), 1);

  let crack = &result.detections[0];
  assert_eq!(crack.id, 1);
  assert_eq!((crack.x, crack.y), (19, 94));
  assert_eq!((crack.width, crack.height), (162, 6));
  assert_eq!(crack.kind, CrackKind::Longitudinal);
  assert_eq!(crack.severity, Severity::High);
  assert_eq!(crack.confidence, 0.95);
  assert!(crack.is_significant());
}

#[test]
fn encoded_sources_match_raw_frames() {
  let raw = detect(&ImageSource::Raw(rail_crack_frame()), 200, 200).unwrap();
  let png = detect(&ImageSource::Bytes(encode_png(&rail_crack_image())), 200, 200).unwrap();
  let data_url = detect(
    &ImageSource::DataUrl(png_data_url(&rail_crack_image())),
    200,
    200,
  )
  .unwrap();

  assert_eq!(raw.detections, png.detections);
  assert_eq!(raw.detections, data_url.detections);
}

#[test]
fn detection_is_deterministic() {
  let detector = CrackDetectorBuilder::new(DetectorParams::default().with_size(200, 200)).build();
  let source = ImageSource::Raw(rail_crack_frame());
  let first = detector.detect(&source).unwrap();
  let second = detector.detect(&source).unwrap();
  assert_eq!(first.detections, second.detections);
}

#[test]
fn uniform_frame_has_no_cracks() {
  let blank = horizontal_line(64, 48, (0, 0), (0, 0), 0);
  let result = detect(&ImageSource::Bytes(encode_png(&blank)), 64, 48).unwrap();
  assert!(result.is_empty());
  assert!(!result.has_significant());
}

#[test]
fn faint_line_stays_below_threshold() {
  // 亮度差 10，最大梯度 40 不超过阈值 50
  let faint = horizontal_line(100, 100, (10, 90), (48, 52), 10);
  let result = detect(&ImageSource::Raw(faint.into()), 100, 100).unwrap();
  assert!(result.is_empty());
}

#[test]
fn decode_failures_are_reported() {
  assert!(matches!(
    detect(&ImageSource::Bytes(Vec::new()), 64, 48),
    Err(DetectError::Decode(DecodeError::Empty))
  ));
  assert!(matches!(
    detect(&ImageSource::Bytes(b"not an image".to_vec()), 64, 48),
    Err(DetectError::Decode(DecodeError::Image(_)))
  ));
  assert!(matches!(
    detect(
      &ImageSource::DataUrl("data:image/png;base64,@@@".to_string()),
      64,
      48
    ),
    Err(DetectError::Decode(DecodeError::Base64(_)))
  ));
  assert!(matches!(
    detect(&ImageSource::DataUrl("hello".to_string()), 64, 48),
    Err(DetectError::Decode(DecodeError::InvalidDataUrl(_)))
  ));
}

#[test]
fn zero_dimensions_are_rejected() {
  let source = ImageSource::Raw(rail_crack_frame());
  assert!(matches!(
    detect(&source, 0, 480),
    Err(DetectError::Dimension { width: 0, height: 480 })
  ));
  assert!(matches!(
    detect(&source, 640, 0),
    Err(DetectError::Dimension { .. })
  ));
}

#[test]
fn frames_are_resampled_to_working_resolution() {
  let result = detect(&ImageSource::Raw(rail_crack_frame()), 400, 300).unwrap();
  assert_eq!((result.frame_width, result.frame_height), (400, 300));
  assert!(!result.is_empty());
  for crack in result.detections.iter() {
    assert!(crack.x + crack.width <= 400);
    assert!(crack.y + crack.height <= 300);
  }
}

#[test]
fn detector_can_be_shared_between_threads() {
  let detector = CrackDetectorBuilder::new(DetectorParams::default().with_size(200, 200)).build();
  let expected = detector
    .detect(&ImageSource::Raw(rail_crack_frame()))
    .unwrap()
    .detections;

  std::thread::scope(|scope| {
    let handles = (0..4)
      .map(|_| {
        scope.spawn(|| {
          detector
            .detect(&ImageSource::Raw(rail_crack_frame()))
            .unwrap()
            .detections
        })
      })
      .collect::<Vec<_>>();
    for handle in handles {
      assert_eq!(handle.join().unwrap(), expected);
    }
  });
}
